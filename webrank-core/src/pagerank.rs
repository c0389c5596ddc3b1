//! PageRank over a [`LinkGraph`] snapshot.

use crate::graph::LinkGraph;
use petgraph::Direction;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct PageRankConfig {
    pub damping: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Power-iteration result. Scores are indexed by the graph's node order and
/// sum to 1.0 within `tolerance * n` for a non-empty graph.
///
/// `iterations` and `residual` are convergence diagnostics: if `residual` is
/// still above the configured tolerance the iteration cap was hit and the
/// scores are the best effort at that point, not a failure.
#[derive(Debug, Clone)]
pub struct PageRank {
    pub scores: Vec<f64>,
    pub iterations: usize,
    pub residual: f64,
}

/// Classic power-iteration PageRank with uniform teleport.
///
/// Nodes with no out-links redistribute their whole mass uniformly across all
/// nodes each round; without that correction the score vector leaks mass and
/// stops summing to 1. Self-loops count toward a node's own out-degree and
/// feed its own next-round score.
pub fn pagerank(graph: &LinkGraph, config: PageRankConfig) -> PageRank {
    let n = graph.node_count();
    if n == 0 {
        return PageRank {
            scores: Vec::new(),
            iterations: 0,
            residual: 0.0,
        };
    }
    let n_f64 = n as f64;
    let raw = graph.raw();

    let successors: Vec<Vec<usize>> = raw
        .node_indices()
        .map(|u| {
            raw.neighbors_directed(u, Direction::Outgoing)
                .map(|v| v.index())
                .collect()
        })
        .collect();

    let mut scores = vec![1.0 / n_f64; n];
    let mut next = vec![0.0; n];
    let mut iterations = 0;
    let mut residual = 0.0;

    for _ in 0..config.max_iterations {
        iterations += 1;

        let dangling_sum: f64 = successors
            .iter()
            .enumerate()
            .filter(|(_, out)| out.is_empty())
            .map(|(u, _)| scores[u])
            .sum();
        let teleport = (1.0 - config.damping) / n_f64;
        let dangling_contrib = config.damping * dangling_sum / n_f64;
        next.fill(teleport + dangling_contrib);

        for (u, out) in successors.iter().enumerate() {
            if !out.is_empty() {
                let share = config.damping * scores[u] / out.len() as f64;
                for &v in out {
                    next[v] += share;
                }
            }
        }

        residual = scores
            .iter()
            .zip(next.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();
        std::mem::swap(&mut scores, &mut next);
        if residual < config.tolerance {
            break;
        }
    }

    debug!(iterations, residual, "pagerank converged");
    PageRank {
        scores,
        iterations,
        residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(pr: &PageRank) -> f64 {
        pr.scores.iter().sum()
    }

    #[test]
    fn empty_graph_yields_empty_scores() {
        let g = LinkGraph::new();
        let pr = pagerank(&g, PageRankConfig::default());
        assert!(pr.scores.is_empty());
        assert_eq!(pr.iterations, 0);
    }

    #[test]
    fn scores_sum_to_one() {
        let mut g = LinkGraph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "c");
        g.add_edge("c", "a");
        g.add_edge("a", "c");
        let pr = pagerank(&g, PageRankConfig::default());
        assert!((total(&pr) - 1.0).abs() < 1e-4 * 3.0, "sum={}", total(&pr));
    }

    #[test]
    fn dangling_node_does_not_leak_mass() {
        // ring a -> b -> c -> a plus a dangling sink d
        let mut g = LinkGraph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "c");
        g.add_edge("c", "a");
        g.add_edge("a", "d");
        let pr = pagerank(&g, PageRankConfig::default());
        assert!((total(&pr) - 1.0).abs() < 1e-4 * 4.0, "sum={}", total(&pr));
    }

    #[test]
    fn self_loop_is_an_ordinary_out_edge() {
        let mut g = LinkGraph::new();
        g.add_edge("a", "a");
        g.add_edge("a", "b");
        g.add_edge("b", "a");
        let pr = pagerank(&g, PageRankConfig::default());
        assert!((total(&pr) - 1.0).abs() < 1e-4 * 2.0);
        assert!(pr.scores.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn well_linked_node_outranks_its_sources() {
        // s1 fans out to a and b; a and b link each other, so both collect
        // recirculating mass while s1 only gets teleport.
        let mut g = LinkGraph::new();
        g.add_edge("s1", "a");
        g.add_edge("s1", "b");
        g.add_edge("a", "b");
        g.add_edge("b", "a");
        let pr = pagerank(&g, PageRankConfig::default());
        let by_url = g.score_map(&pr.scores);
        assert!(by_url["b"] > by_url["s1"]);
        assert!(by_url["a"] > by_url["s1"]);
    }

    #[test]
    fn reports_convergence_diagnostics() {
        let mut g = LinkGraph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "a");
        let pr = pagerank(&g, PageRankConfig::default());
        assert!(pr.iterations >= 1);
        assert!(pr.residual < 1e-6);

        let capped = pagerank(
            &g,
            PageRankConfig {
                max_iterations: 1,
                ..PageRankConfig::default()
            },
        );
        assert_eq!(capped.iterations, 1);
        assert_eq!(capped.scores.len(), 2);
    }
}
