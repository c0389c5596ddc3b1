use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Directed link graph over canonical page URLs.
///
/// Nodes come into existence only as edge endpoints; parallel edges are
/// collapsed on insert and self-loops are allowed. Node iteration follows
/// insertion order, so the same edge stream always produces the same node
/// ordering.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
    seen_edges: HashSet<(NodeIndex, NodeIndex)>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, url: &str) -> NodeIndex {
        if let Some(&ix) = self.index.get(url) {
            return ix;
        }
        let ix = self.graph.add_node(url.to_string());
        self.index.insert(url.to_string(), ix);
        ix
    }

    /// Insert a directed edge, creating endpoints as needed.
    ///
    /// Returns `true` if the edge was new. Re-adding an existing edge is a
    /// no-op, so the crawl loop can feed every discovered link without
    /// pre-deduplication. Self-loops are accepted.
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        let s = self.intern(source);
        let t = self.intern(target);
        if !self.seen_edges.insert((s, t)) {
            return false;
        }
        self.graph.add_edge(s, t, ());
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    /// All node URLs in insertion order.
    ///
    /// Positions in this iteration match the indices of the score vectors the
    /// centrality engines return.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.graph
            .node_indices()
            .map(move |ix| self.graph[ix].as_str())
    }

    /// Direct out-neighbors of `url`; empty for unknown URLs.
    pub fn successors<'a>(&'a self, url: &str) -> impl Iterator<Item = &'a str> {
        self.index.get(url).copied().into_iter().flat_map(move |ix| {
            self.graph
                .neighbors_directed(ix, Direction::Outgoing)
                .map(move |n| self.graph[n].as_str())
        })
    }

    /// Direct in-neighbors of `url`; empty for unknown URLs.
    pub fn predecessors<'a>(&'a self, url: &str) -> impl Iterator<Item = &'a str> {
        self.index.get(url).copied().into_iter().flat_map(move |ix| {
            self.graph
                .neighbors_directed(ix, Direction::Incoming)
                .map(move |n| self.graph[n].as_str())
        })
    }

    /// Out-degree of `url`; 0 for unknown URLs.
    pub fn out_degree(&self, url: &str) -> usize {
        self.index
            .get(url)
            .map(|&ix| self.graph.neighbors_directed(ix, Direction::Outgoing).count())
            .unwrap_or(0)
    }

    /// In-degree of `url`; 0 for unknown URLs.
    pub fn in_degree(&self, url: &str) -> usize {
        self.index
            .get(url)
            .map(|&ix| self.graph.neighbors_directed(ix, Direction::Incoming).count())
            .unwrap_or(0)
    }

    /// Pair each node URL with its entry in an index-aligned score vector.
    ///
    /// Out-of-range indices (e.g. a score vector from a partial engine run)
    /// fall back to 0.0.
    pub fn score_map(&self, scores: &[f64]) -> HashMap<String, f64> {
        self.nodes()
            .enumerate()
            .map(|(i, url)| (url.to_string(), scores.get(i).copied().unwrap_or(0.0)))
            .collect()
    }

    /// Node-induced subgraph on `retained`, in the given order.
    ///
    /// URLs not present in this graph are skipped. Every retained node is
    /// carried over even if none of its edges survive the restriction, so a
    /// seed with no retained neighbors still renders.
    pub fn induced(&self, retained: &[&str]) -> LinkGraph {
        let mut sub = LinkGraph::new();
        let mut kept: HashSet<NodeIndex> = HashSet::with_capacity(retained.len());
        for &url in retained {
            if let Some(&ix) = self.index.get(url) {
                sub.intern(url);
                kept.insert(ix);
            }
        }
        for edge in self.graph.edge_indices() {
            if let Some((s, t)) = self.graph.edge_endpoints(edge)
                && kept.contains(&s)
                && kept.contains(&t)
            {
                sub.add_edge(self.graph[s].as_str(), self.graph[t].as_str());
            }
        }
        sub
    }

    pub(crate) fn raw(&self) -> &DiGraph<String, ()> {
        &self.graph
    }
}
