//! Bounded neighborhood sampling for visualization.

use crate::graph::LinkGraph;
use std::collections::HashSet;

/// Induced subgraph over the seeds plus up to `cap` successors per seed.
///
/// Successors are taken in the graph's stable iteration order, first `cap`
/// encountered. Membership is purely structural: scores play no part here
/// (rendering may size nodes by PageRank, but never pick them by it). Seeds
/// absent from the graph are ignored.
pub fn sample_neighborhood(graph: &LinkGraph, seeds: &[String], cap: usize) -> LinkGraph {
    let mut retained: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for seed in seeds {
        if graph.contains(seed) && seen.insert(seed.as_str()) {
            retained.push(seed.as_str());
        }
    }
    for seed in seeds {
        for succ in graph.successors(seed).take(cap) {
            if seen.insert(succ) {
                retained.push(succ);
            }
        }
    }

    graph.induced(&retained)
}
