/*
This code is part of the WatershedTools hydrologic analysis library.
Created: 03/05/2026
Last Modified: 19/08/2026
License: MIT
*/
use super::read_network_file;
use crate::tools::*;
use std::env;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path;
use std::time::Instant;
use watershed_common::structures::{ContributingStream, DrainageNetwork};
use watershed_common::utils::get_formatted_elapsed_time;

/// This tool derives the contributor relation of a drainage network
/// (`--input`) from its reach endpoint topology: an upstream reach
/// contributes to every reach whose `from_node` matches its `to_node`. The
/// relation is written as JSON records (`--output`), one per
/// upstream/downstream pair, in the form consumed by the `StreamSequence`
/// tool and by the stream parameter tables of the simulation database.
///
/// # See Also
/// `StreamSequence`
pub struct ContributingStreams {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl ContributingStreams {
    pub fn new() -> ContributingStreams {
        // public constructor
        let name = "ContributingStreams".to_string();
        let toolbox = "Stream Network Analysis".to_string();
        let description =
            "Derives the upstream contributor relation of a drainage network from its node topology."
                .to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Network File".to_owned(),
            flags: vec!["-i".to_owned(), "--input".to_owned()],
            description: "Input drainage network JSON file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Json),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output contributor relation JSON file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Json),
            default_value: None,
            optional: false,
        });

        let sep: String = path::MAIN_SEPARATOR.to_string();
        let p = format!("{}", env::current_dir().unwrap().display());
        let e = format!("{}", env::current_exe().unwrap().display());
        let mut short_exe = e
            .replace(&p, "")
            .replace(".exe", "")
            .replace(".", "")
            .replace(&sep, "");
        if e.contains(".exe") {
            short_exe += ".exe";
        }
        let usage = format!(
            ">>.*{0} -r={1} -v --wd=\"*path*to*data*\" -i=watershed.json -o=contributing_channels.json",
            short_exe, name
        )
        .replace("*", &sep);

        ContributingStreams {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl WatershedTool for ContributingStreams {
    fn get_source_file(&self) -> String {
        String::from(file!())
    }

    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        let mut s = String::from("{\"parameters\": [");
        for i in 0..self.parameters.len() {
            if i < self.parameters.len() - 1 {
                s.push_str(&(self.parameters[i].to_string()));
                s.push_str(",");
            } else {
                s.push_str(&(self.parameters[i].to_string()));
            }
        }
        s.push_str("]}");
        s
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error> {
        let mut input_file = String::new();
        let mut output_file = String::new();

        if args.len() == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Tool run with no parameters.",
            ));
        }
        for i in 0..args.len() {
            let mut arg = args[i].replace("\"", "");
            arg = arg.replace("\'", "");
            let cmd = arg.split("="); // in case an equals sign was used
            let vec = cmd.collect::<Vec<&str>>();
            let mut keyval = false;
            if vec.len() > 1 {
                keyval = true;
            }
            let flag_val = vec[0].to_lowercase().replace("--", "-");
            if flag_val == "-i" || flag_val == "-input" {
                input_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            }
        }

        if verbose {
            println!("***************{}", "*".repeat(self.get_tool_name().len()));
            println!("* Welcome to {} *", self.get_tool_name());
            println!("***************{}", "*".repeat(self.get_tool_name().len()));
        }

        let sep: String = path::MAIN_SEPARATOR.to_string();

        if !input_file.contains(&sep) && !input_file.contains("/") {
            input_file = format!("{}{}", working_directory, input_file);
        }
        if !output_file.contains(&sep) && !output_file.contains("/") {
            output_file = format!("{}{}", working_directory, output_file);
        }

        if verbose {
            println!("Reading network data...")
        };
        let network_file = read_network_file(&input_file)?;

        let start = Instant::now();

        let relation = DrainageNetwork::derive_relation(&network_file.reaches);

        let out = RelationFile {
            delineation: network_file.delineation,
            discretization: network_file.discretization,
            contributors: relation,
        };

        if verbose {
            println!(
                "Found {} contributing stream pairs among {} reaches",
                out.contributors.len(),
                network_file.reaches.len()
            );
        }

        let elapsed_time = get_formatted_elapsed_time(start);

        if verbose {
            println!("Saving data...")
        };
        let json = serde_json::to_string_pretty(&out)
            .map_err(|e| Error::new(ErrorKind::InvalidData, format!("{}", e)))?;
        fs::write(&output_file, json)?;
        if verbose {
            println!("Output file written");
            println!("{}", &format!("Elapsed Time (excluding I/O): {}", elapsed_time));
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct RelationFile {
    delineation: String,
    discretization: String,
    contributors: Vec<ContributingStream>,
}
