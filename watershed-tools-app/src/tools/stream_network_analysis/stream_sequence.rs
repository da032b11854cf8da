/*
This code is part of the WatershedTools hydrologic analysis library.
Created: 03/05/2026
Last Modified: 19/08/2026
License: MIT
*/
use super::{read_network_file, NetworkFile};
use crate::tools::*;
use std::env;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use watershed_common::algorithms::calculate_stream_sequence;
use watershed_common::structures::{DrainageNetwork, StreamId};
use watershed_common::utils::get_formatted_elapsed_time;

/// This tool assigns a routing sequence number to every stream reach of one
/// or more drainage networks (`--networks`). The sequence is a total order
/// over the reaches in which every reach appears after all of its upstream
/// contributors; the watershed outlet receives the highest number. The
/// rainfall-runoff simulation consumes this order directly, processing
/// reaches from the headwaters down to the outlet.
///
/// Each input network file carries the reach records, node records, and
/// optionally an explicit contributor relation of one
/// delineation/discretization/parameterization triple. When the relation is
/// absent it is derived from the reach endpoint topology (see the
/// `ContributingStreams` tool). The outlet reach is identified by matching
/// the reach topology keys against the node marked `node_type = "outlet"`.
///
/// Independent networks share no state and are processed in parallel, using
/// up to the number of processors allowed by the `max_procs` setting.
///
/// # See Also
/// `ContributingStreams`
pub struct StreamSequence {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl StreamSequence {
    pub fn new() -> StreamSequence {
        // public constructor
        let name = "StreamSequence".to_string();
        let toolbox = "Stream Network Analysis".to_string();
        let description =
            "Assigns an upstream-before-downstream routing sequence to each stream reach."
                .to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Network Files".to_owned(),
            flags: vec!["--networks".to_owned()],
            description: "Input drainage network JSON files, separated by ';' or ','.".to_owned(),
            parameter_type: ParameterType::FileList(ParameterFileType::Json),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output sequence JSON file; only used with a single input network."
                .to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Json),
            default_value: None,
            optional: true,
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
        let usage = format!(">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --networks=watershed.json -o=sequence.json
>>.*{0} -r={1} -v --wd=\"*path*to*data*\" --networks=\"south_fork.json;north_fork.json\"", short_exe, name).replace("*", &sep);

        StreamSequence {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl WatershedTool for StreamSequence {
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
        let mut networks_string = String::new();
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
            if flag_val == "-networks" || flag_val == "-i" || flag_val == "-input" {
                networks_string = if keyval {
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

        let mut progress: usize;
        let mut old_progress: usize = 1;

        if networks_string.trim().is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "No input network files specified (--networks).",
            ));
        }

        let mut network_files: Vec<String> = networks_string
            .split(|c| c == ';' || c == ',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for file_name in network_files.iter_mut() {
            if !file_name.contains(&sep) && !file_name.contains("/") {
                *file_name = format!("{}{}", working_directory, file_name);
            }
        }
        let num_networks = network_files.len();
        if num_networks == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "No input network files specified (--networks).",
            ));
        }

        if !output_file.is_empty() && num_networks > 1 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The --output flag can only be used with a single input network.",
            ));
        }
        if !output_file.is_empty() && !output_file.contains(&sep) && !output_file.contains("/") {
            output_file = format!("{}{}", working_directory, output_file);
        }

        let output_files: Vec<String> = if output_file.is_empty() {
            network_files
                .iter()
                .map(|f| derived_output_name(f))
                .collect()
        } else {
            vec![output_file]
        };

        let start = Instant::now();

        let mut num_procs = num_cpus::get() as isize;
        let configs = watershed_common::configs::get_configs()?;
        let max_procs = configs.max_procs;
        if max_procs > 0 && max_procs < num_procs {
            num_procs = max_procs;
        }
        if num_procs > num_networks as isize {
            num_procs = num_networks as isize;
        }

        // Networks are independent; each worker thread takes a strided share
        // of the input files.
        let inputs = Arc::new(network_files);
        let outputs = Arc::new(output_files);
        let (tx, rx) = mpsc::channel();
        for tid in 0..num_procs {
            let inputs = inputs.clone();
            let outputs = outputs.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                for i in (0..num_networks).filter(|i| *i as isize % num_procs == tid) {
                    let result = sequence_network(&inputs[i], &outputs[i]);
                    tx.send((i, result)).unwrap();
                }
            });
        }

        for n in 0..num_networks {
            let (i, result) = rx.recv().expect("Error receiving data from thread.");
            let num_sequenced = result?;
            if verbose {
                println!(
                    "{}: sequenced {} stream reaches",
                    inputs[i], num_sequenced
                );
                if num_networks > 1 {
                    progress = (100.0_f64 * (n + 1) as f64 / num_networks as f64) as usize;
                    if progress != old_progress {
                        println!("Progress: {}%", progress);
                        old_progress = progress;
                    }
                }
            }
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!("{}", &format!("Elapsed Time (including I/O): {}", elapsed_time));
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct SequenceRecord {
    stream_id: StreamId,
    sequence: usize,
}

#[derive(Serialize, Deserialize, Debug)]
struct SequenceFile {
    delineation: String,
    discretization: String,
    parameterization: String,
    sequences: Vec<SequenceRecord>,
}

fn derived_output_name(input_file: &str) -> String {
    if input_file.to_lowercase().ends_with(".json") {
        let i = input_file.len() - ".json".len();
        format!("{}_sequence.json", &input_file[..i])
    } else {
        format!("{}_sequence.json", input_file)
    }
}

/// Sequences one drainage network and writes the resulting records,
/// ordered from the most upstream reach (sequence 1) to the outlet
/// (sequence N). Returns the number of sequenced reaches.
fn sequence_network(input_file: &str, output_file: &str) -> Result<usize, Error> {
    let NetworkFile {
        delineation,
        discretization,
        parameterization,
        reaches,
        nodes,
        contributors,
    } = read_network_file(input_file)?;

    let network = if contributors.is_empty() {
        DrainageNetwork::from_topology(reaches, nodes)
    } else {
        DrainageNetwork::with_relation(reaches, nodes, &contributors)
    };

    let outlet_id = network
        .find_outlet()
        .map_err(|e| Error::new(ErrorKind::InvalidData, format!("{}: {}", input_file, e)))?
        .stream_id;

    let sequence = calculate_stream_sequence(outlet_id, &network)
        .map_err(|e| Error::new(ErrorKind::InvalidData, format!("{}: {}", input_file, e)))?;

    let mut records: Vec<SequenceRecord> = sequence
        .into_iter()
        .map(|(stream_id, sequence)| SequenceRecord {
            stream_id,
            sequence,
        })
        .collect();
    records.sort_by_key(|r| r.sequence);
    let num_sequenced = records.len();

    let out = SequenceFile {
        delineation,
        discretization,
        parameterization,
        sequences: records,
    };
    let json = serde_json::to_string_pretty(&out)
        .map_err(|e| Error::new(ErrorKind::InvalidData, format!("{}", e)))?;
    fs::write(output_file, json)?;

    Ok(num_sequenced)
}
