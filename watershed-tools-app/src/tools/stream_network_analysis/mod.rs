/*
This code is part of the WatershedTools hydrologic analysis library.
Created: 03/05/2026
Last Modified: 19/08/2026
License: MIT
*/

// private sub-module defined in other files
mod contributing_streams;
mod stream_sequence;

// exports identifiers from private sub-modules in the current module namespace
pub use self::contributing_streams::ContributingStreams;
pub use self::stream_sequence::StreamSequence;

use std::fs;
use std::io::{Error, ErrorKind};
use watershed_common::structures::{ContributingStream, Reach, StreamNode};

/// On-disk description of one drainage network: the identifying
/// delineation/discretization/parameterization triple, the reach and node
/// records of the discretization, and (optionally) an explicit contributor
/// relation. When the relation is absent it is derived from the reach
/// endpoint topology.
#[derive(Serialize, Deserialize, Debug)]
pub struct NetworkFile {
    pub delineation: String,
    pub discretization: String,
    pub parameterization: String,
    pub reaches: Vec<Reach>,
    pub nodes: Vec<StreamNode>,
    #[serde(default)]
    pub contributors: Vec<ContributingStream>,
}

pub fn read_network_file(file_name: &str) -> Result<NetworkFile, Error> {
    let contents = fs::read_to_string(file_name)?;
    serde_json::from_str(&contents).map_err(|e| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Error parsing network file {}: {}", file_name, e),
        )
    })
}
