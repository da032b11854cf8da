/*
This code is part of the WatershedTools hydrologic analysis library.
Created: 03/05/2026
Last Modified: 19/08/2026
License: MIT
*/
use crate::structures::{DrainageSource, StreamId, TopologyError};
use std::collections::{HashMap, HashSet, VecDeque};

/// Assigns each reach of a drainage network a sequence number from 1..N
/// such that every reach is numbered strictly lower than all reaches
/// downstream of it; the outlet reach receives the highest number, N.
/// The resulting order is the routing order of the rainfall-runoff
/// simulation: when a reach is processed, all of its contributors have
/// already been processed.
///
/// The traversal is an iterative depth-first post-order walk of the
/// upstream-pointing contributor graph, starting from the outlet. Two
/// stacks are used in place of recursion, since the recursion depth would
/// otherwise track the depth of the network: `pending` holds reaches whose
/// contributors have not all resolved yet, and `ordered` collects reaches
/// in finished order. A reach is expanded on its first visit; when it is
/// seen on top of `pending` a second time, all contributors pushed above
/// it have resolved and it is finalized. A reach reachable along more
/// than one upstream path may be pushed onto `pending` repeatedly, but is
/// finalized only once.
///
/// Fails with `UnknownContributor` when the outlet or a contributor id is
/// not a reach of the network, and with `IncompleteSequencing` when the
/// number of finalized reaches differs from `reach_count()` (a
/// disconnected reach or a cycle in the contributor relation). A partial
/// ordering is never returned.
pub fn calculate_stream_sequence<S: DrainageSource + ?Sized>(
    outlet_id: StreamId,
    network: &S,
) -> Result<HashMap<StreamId, usize>, TopologyError> {
    let expected = network.reach_count();
    if !network.is_reach(outlet_id) {
        return Err(TopologyError::UnknownContributor {
            stream_id: outlet_id,
        });
    }

    let mut visited: HashSet<StreamId> = HashSet::with_capacity(expected);
    let mut finalized: HashSet<StreamId> = HashSet::with_capacity(expected);
    let mut pending: Vec<StreamId> = Vec::with_capacity(expected);
    let mut ordered: VecDeque<StreamId> = VecDeque::with_capacity(expected);

    pending.push(outlet_id);
    while let Some(&current) = pending.last() {
        if visited.contains(&current) {
            // Every contributor pushed above this reach has resolved.
            pending.pop();
            if finalized.insert(current) {
                ordered.push_back(current);
            }
            continue;
        }
        visited.insert(current);

        let upstream = network.contributors(current);
        if upstream.is_empty() {
            // headwater reach
            pending.pop();
            finalized.insert(current);
            ordered.push_back(current);
        } else {
            for &contributor in upstream {
                if !network.is_reach(contributor) {
                    return Err(TopologyError::UnknownContributor {
                        stream_id: contributor,
                    });
                }
                pending.push(contributor);
            }
        }
    }

    if ordered.len() != expected {
        return Err(TopologyError::IncompleteSequencing {
            expected,
            sequenced: ordered.len(),
        });
    }

    // The outlet finishes last and sits at the back of the queue; numbering
    // from the front gives the deepest-finished reach sequence 1 and the
    // outlet sequence N.
    let mut sequence: HashMap<StreamId, usize> = HashMap::with_capacity(expected);
    let mut next = 1usize;
    while let Some(stream_id) = ordered.pop_front() {
        sequence.insert(stream_id, next);
        next += 1;
    }
    Ok(sequence)
}

#[cfg(test)]
mod test {
    use super::calculate_stream_sequence;
    use crate::structures::{DrainageSource, StreamId, TopologyError};
    use std::collections::HashMap;

    struct TestNetwork {
        count: usize,
        reaches: Vec<StreamId>,
        links: HashMap<StreamId, Vec<StreamId>>,
    }

    impl TestNetwork {
        /// `edges` lists (downstream, contributors) pairs; `count` is the
        /// declared network size, which the tests may deliberately set
        /// different from the connected reach count.
        fn new(reaches: &[StreamId], edges: &[(StreamId, &[StreamId])], count: usize) -> Self {
            let mut links = HashMap::new();
            for (downstream, ups) in edges {
                links.insert(*downstream, ups.to_vec());
            }
            TestNetwork {
                count,
                reaches: reaches.to_vec(),
                links,
            }
        }
    }

    impl DrainageSource for TestNetwork {
        fn reach_count(&self) -> usize {
            self.count
        }

        fn is_reach(&self, stream_id: StreamId) -> bool {
            self.reaches.contains(&stream_id)
        }

        fn contributors(&self, stream_id: StreamId) -> &[StreamId] {
            self.links
                .get(&stream_id)
                .map(|v| v.as_slice())
                .unwrap_or(&[])
        }
    }

    #[test]
    fn test_linear_chain() {
        // 3 flows into 2, 2 flows into the outlet 1
        let network = TestNetwork::new(&[1, 2, 3], &[(1, &[2]), (2, &[3])], 3);
        let seq = calculate_stream_sequence(1, &network).unwrap();
        assert_eq!(seq[&3], 1);
        assert_eq!(seq[&2], 2);
        assert_eq!(seq[&1], 3);
    }

    #[test]
    fn test_single_confluence() {
        // headwaters 2 and 3 join at the outlet 1
        let network = TestNetwork::new(&[1, 2, 3], &[(1, &[2, 3])], 3);
        let seq = calculate_stream_sequence(1, &network).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq[&1], 3);
        // the headwaters take 1 and 2 in either order
        let mut low = vec![seq[&2], seq[&3]];
        low.sort();
        assert_eq!(low, vec![1, 2]);
    }

    #[test]
    fn test_diamond_finalized_once() {
        // 4 is reachable through both 2 and 3; it must receive exactly one
        // sequence number and the total must be 4, not 5
        let network = TestNetwork::new(
            &[1, 2, 3, 4],
            &[(1, &[2, 3]), (2, &[4]), (3, &[4])],
            4,
        );
        let seq = calculate_stream_sequence(1, &network).unwrap();
        assert_eq!(seq.len(), 4);
        assert_eq!(seq[&1], 4);
        assert!(seq[&4] < seq[&2]);
        assert!(seq[&4] < seq[&3]);
        let mut values: Vec<usize> = seq.values().copied().collect();
        values.sort();
        assert_eq!(values, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_permutation_and_topological_order() {
        // a full binary drainage tree of depth 3, outlet 1
        let edges: Vec<(StreamId, Vec<StreamId>)> = (1..=7)
            .map(|id| (id, vec![2 * id, 2 * id + 1]))
            .collect();
        let reaches: Vec<StreamId> = (1..=15).collect();
        let edge_refs: Vec<(StreamId, &[StreamId])> = edges
            .iter()
            .map(|(id, ups)| (*id, ups.as_slice()))
            .collect();
        let network = TestNetwork::new(&reaches, &edge_refs, 15);
        let seq = calculate_stream_sequence(1, &network).unwrap();

        // values are exactly 1..=15
        let mut values: Vec<usize> = seq.values().copied().collect();
        values.sort();
        assert_eq!(values, (1..=15).collect::<Vec<usize>>());

        // every contributor is numbered below its downstream reach
        for (downstream, ups) in &edges {
            for upstream in ups {
                assert!(
                    seq[upstream] < seq[downstream],
                    "reach {} should be sequenced before reach {}",
                    upstream,
                    downstream
                );
            }
        }
        assert_eq!(seq[&1], 15);
    }

    #[test]
    fn test_headwater_only_network() {
        let network = TestNetwork::new(&[7], &[], 1);
        let seq = calculate_stream_sequence(7, &network).unwrap();
        assert_eq!(seq[&7], 1);
    }

    #[test]
    fn test_disconnected_reach_fails() {
        // reach 5 is declared but nothing connects it to the outlet
        let network = TestNetwork::new(&[1, 2, 3, 4, 5], &[(1, &[2, 3]), (2, &[4])], 5);
        assert_eq!(
            calculate_stream_sequence(1, &network),
            Err(TopologyError::IncompleteSequencing {
                expected: 5,
                sequenced: 4
            })
        );
    }

    #[test]
    fn test_unknown_contributor_fails() {
        let network = TestNetwork::new(&[1, 2], &[(1, &[2]), (2, &[9])], 2);
        assert_eq!(
            calculate_stream_sequence(1, &network),
            Err(TopologyError::UnknownContributor { stream_id: 9 })
        );
    }

    #[test]
    fn test_unknown_outlet_fails() {
        let network = TestNetwork::new(&[1, 2], &[(1, &[2])], 2);
        assert_eq!(
            calculate_stream_sequence(42, &network),
            Err(TopologyError::UnknownContributor { stream_id: 42 })
        );
    }
}
