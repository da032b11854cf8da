/*
This code is part of the WatershedTools hydrologic analysis library.
Created: 03/05/2026
Last Modified: 19/08/2026
License: MIT
*/
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Identifier of a stream reach within one watershed discretization.
pub type StreamId = i64;

/// The node type value marking the watershed's terminal node.
pub const OUTLET_NODE_TYPE: &str = "outlet";

/// A single stream segment in the drainage network. The `arcid`,
/// `grid_code`, `from_node` and `to_node` values are the topology keys
/// produced by the stream delineation and are used to match a reach
/// against the nodes collection when locating the outlet.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reach {
    pub stream_id: StreamId,
    pub arcid: i64,
    pub grid_code: i64,
    pub from_node: i64,
    pub to_node: i64,
}

/// A junction record from the discretization's nodes collection. The node
/// carrying `node_type = "outlet"` designates the terminal reach of the
/// network.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StreamNode {
    pub arcid: i64,
    pub grid_code: i64,
    pub from_node: i64,
    pub to_node: i64,
    pub node_type: String,
}

/// One record of the contributor relation: `contributing_stream` drains
/// directly into `stream_id`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributingStream {
    pub stream_id: StreamId,
    pub contributing_stream: StreamId,
}

/// Errors raised when the drainage network topology is inconsistent.
/// None of these are recoverable; a partial stream ordering is unusable
/// by downstream routing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Zero, or more than one, reach matched the outlet node marker.
    #[error("expected exactly one outlet reach, found {matches}")]
    AmbiguousOutlet { matches: usize },

    /// The contributor relation references a stream id that is not among
    /// the network's reaches.
    #[error("stream {stream_id} is referenced by the network but is not among its reaches")]
    UnknownContributor { stream_id: StreamId },

    /// Traversal from the outlet finalized fewer (or more) reaches than
    /// the network declares; the contributor relation is disconnected or
    /// contains a cycle.
    #[error("sequenced {sequenced} of {expected} reaches; the contributor relation is disconnected or cyclic")]
    IncompleteSequencing { expected: usize, sequenced: usize },
}

/// Read access to a drainage network, as needed by the stream sequencing
/// algorithm. Implemented by `DrainageNetwork`; test code may supply its
/// own implementation.
pub trait DrainageSource {
    /// Total number of reaches the network declares.
    fn reach_count(&self) -> usize;

    /// Whether `stream_id` names a reach of this network.
    fn is_reach(&self, stream_id: StreamId) -> bool;

    /// The reaches draining directly into `stream_id`; empty for a
    /// headwater reach.
    fn contributors(&self, stream_id: StreamId) -> &[StreamId];
}

/// An in-memory drainage network: the reach set for one discretization,
/// its junction nodes, and the upstream contributor relation.
#[derive(Debug, Clone)]
pub struct DrainageNetwork {
    reaches: Vec<Reach>,
    nodes: Vec<StreamNode>,
    index: HashMap<StreamId, usize>,
    contributors: HashMap<StreamId, Vec<StreamId>>,
}

impl DrainageNetwork {
    /// Creates a network from reaches, nodes, and an explicit contributor
    /// relation. Relation records are kept in input order; the sequencing
    /// contract does not depend on the tie-break order among contributors
    /// of the same reach.
    pub fn with_relation(
        reaches: Vec<Reach>,
        nodes: Vec<StreamNode>,
        relation: &[ContributingStream],
    ) -> DrainageNetwork {
        let mut contributors: HashMap<StreamId, Vec<StreamId>> = HashMap::new();
        for record in relation {
            contributors
                .entry(record.stream_id)
                .or_insert_with(Vec::new)
                .push(record.contributing_stream);
        }
        let index = reaches
            .iter()
            .enumerate()
            .map(|(i, r)| (r.stream_id, i))
            .collect::<HashMap<StreamId, usize>>();
        DrainageNetwork {
            reaches,
            nodes,
            index,
            contributors,
        }
    }

    /// Creates a network deriving the contributor relation from reach
    /// endpoints: an upstream reach contributes to every reach whose
    /// `from_node` equals its `to_node`.
    pub fn from_topology(reaches: Vec<Reach>, nodes: Vec<StreamNode>) -> DrainageNetwork {
        let relation = DrainageNetwork::derive_relation(&reaches);
        DrainageNetwork::with_relation(reaches, nodes, &relation)
    }

    /// Derives the contributor relation from reach endpoint topology.
    pub fn derive_relation(reaches: &[Reach]) -> Vec<ContributingStream> {
        let mut downstream_of_node: HashMap<i64, Vec<StreamId>> = HashMap::new();
        for reach in reaches {
            downstream_of_node
                .entry(reach.from_node)
                .or_insert_with(Vec::new)
                .push(reach.stream_id);
        }
        let mut relation = Vec::new();
        for reach in reaches {
            if let Some(receivers) = downstream_of_node.get(&reach.to_node) {
                for &receiver in receivers {
                    if receiver != reach.stream_id {
                        relation.push(ContributingStream {
                            stream_id: receiver,
                            contributing_stream: reach.stream_id,
                        });
                    }
                }
            }
        }
        relation
    }

    pub fn reaches(&self) -> &[Reach] {
        &self.reaches
    }

    pub fn nodes(&self) -> &[StreamNode] {
        &self.nodes
    }

    pub fn get_reach(&self, stream_id: StreamId) -> Option<&Reach> {
        self.index.get(&stream_id).map(|&i| &self.reaches[i])
    }

    /// Locates the unique reach draining to the watershed's terminal node.
    /// Candidate nodes are those with `node_type = "outlet"`; a reach
    /// matches a candidate when all four topology keys agree. Fails with
    /// `AmbiguousOutlet` unless exactly one reach matches.
    pub fn find_outlet(&self) -> Result<&Reach, TopologyError> {
        let mut matched: Vec<usize> = Vec::new();
        for node in &self.nodes {
            if node.node_type != OUTLET_NODE_TYPE {
                continue;
            }
            for (i, reach) in self.reaches.iter().enumerate() {
                if reach.arcid == node.arcid
                    && reach.grid_code == node.grid_code
                    && reach.from_node == node.from_node
                    && reach.to_node == node.to_node
                    && !matched.contains(&i)
                {
                    matched.push(i);
                }
            }
        }
        if matched.len() != 1 {
            return Err(TopologyError::AmbiguousOutlet {
                matches: matched.len(),
            });
        }
        Ok(&self.reaches[matched[0]])
    }
}

impl DrainageSource for DrainageNetwork {
    fn reach_count(&self) -> usize {
        self.reaches.len()
    }

    fn is_reach(&self, stream_id: StreamId) -> bool {
        self.index.contains_key(&stream_id)
    }

    fn contributors(&self, stream_id: StreamId) -> &[StreamId] {
        self.contributors
            .get(&stream_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn reach(stream_id: StreamId, from_node: i64, to_node: i64) -> Reach {
        Reach {
            stream_id,
            arcid: stream_id,
            grid_code: stream_id,
            from_node,
            to_node,
        }
    }

    fn outlet_node_for(r: &Reach) -> StreamNode {
        StreamNode {
            arcid: r.arcid,
            grid_code: r.grid_code,
            from_node: r.from_node,
            to_node: r.to_node,
            node_type: "outlet".to_string(),
        }
    }

    // A small Y-shaped network: 24 and 34 join into 14, which drains to
    // the terminal node 1.
    fn y_network() -> (Vec<Reach>, Vec<StreamNode>) {
        let reaches = vec![reach(14, 2, 1), reach(24, 3, 2), reach(34, 4, 2)];
        let nodes = vec![outlet_node_for(&reaches[0])];
        (reaches, nodes)
    }

    #[test]
    fn test_find_outlet() {
        let (reaches, nodes) = y_network();
        let network = DrainageNetwork::from_topology(reaches, nodes);
        let outlet = network.find_outlet().unwrap();
        assert_eq!(outlet.stream_id, 14);
    }

    #[test]
    fn test_find_outlet_no_match() {
        let (reaches, _) = y_network();
        let network = DrainageNetwork::from_topology(reaches, vec![]);
        assert_eq!(
            network.find_outlet(),
            Err(TopologyError::AmbiguousOutlet { matches: 0 })
        );
    }

    #[test]
    fn test_find_outlet_multiple_matches() {
        let (mut reaches, nodes) = y_network();
        // a second reach sharing the outlet's topology keys
        let mut duplicate = reaches[0];
        duplicate.stream_id = 99;
        reaches.push(duplicate);
        let network = DrainageNetwork::from_topology(reaches, nodes);
        assert_eq!(
            network.find_outlet(),
            Err(TopologyError::AmbiguousOutlet { matches: 2 })
        );
    }

    #[test]
    fn test_derive_relation() {
        let (reaches, _) = y_network();
        let relation = DrainageNetwork::derive_relation(&reaches);
        assert_eq!(relation.len(), 2);
        assert!(relation.contains(&ContributingStream {
            stream_id: 14,
            contributing_stream: 24
        }));
        assert!(relation.contains(&ContributingStream {
            stream_id: 14,
            contributing_stream: 34
        }));
    }

    #[test]
    fn test_contributors_lookup() {
        let (reaches, nodes) = y_network();
        let network = DrainageNetwork::from_topology(reaches, nodes);
        let mut upstream = network.contributors(14).to_vec();
        upstream.sort();
        assert_eq!(upstream, vec![24, 34]);
        // headwaters have no contributors
        assert!(network.contributors(24).is_empty());
        assert!(network.contributors(34).is_empty());
        // unknown ids resolve to an empty slice, not a panic
        assert!(network.contributors(999).is_empty());
    }

    #[test]
    fn test_explicit_relation_overrides_topology() {
        let (reaches, nodes) = y_network();
        let relation = vec![ContributingStream {
            stream_id: 14,
            contributing_stream: 24,
        }];
        let network = DrainageNetwork::with_relation(reaches, nodes, &relation);
        assert_eq!(network.contributors(14), &[24]);
    }

    #[test]
    fn test_reach_serde_round_trip() {
        let r = reach(14, 2, 1);
        let json = serde_json::to_string(&r).unwrap();
        let back: Reach = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
