//! Joins structural metrics into ranked, export-ready rows.

use crate::graph::LinkGraph;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use url::Url;

/// One ranked table row per graph node. Built only by [`assemble`]; read-only
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedRow {
    pub label: String,
    pub url: String,
    pub in_degree: usize,
    pub out_degree: usize,
    pub pagerank: f64,
    pub betweenness: f64,
}

/// Human label for a page URL: the final path segment with underscores read
/// as spaces. Falls back to the host, then the raw string.
pub fn page_label(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(segment) = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
        {
            return segment.replace('_', " ");
        }
        if let Some(host) = parsed.host_str() {
            return host.to_string();
        }
    }
    url.to_string()
}

/// Assemble one row per node and sort into the final ranking.
///
/// Sort key: descending (pagerank, betweenness), then ascending URL so that
/// exact score ties still order deterministically. Score vectors are indexed
/// by the graph's node order; missing entries count as 0.0 rather than
/// failing, so a truncated engine run degrades instead of crashing.
pub fn assemble(
    graph: &LinkGraph,
    pagerank_scores: &[f64],
    betweenness_scores: &[f64],
) -> Vec<RankedRow> {
    let mut rows: Vec<RankedRow> = graph
        .nodes()
        .enumerate()
        .map(|(i, url)| RankedRow {
            label: page_label(url),
            url: url.to_string(),
            in_degree: graph.in_degree(url),
            out_degree: graph.out_degree(url),
            pagerank: pagerank_scores.get(i).copied().unwrap_or(0.0),
            betweenness: betweenness_scores.get(i).copied().unwrap_or(0.0),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.pagerank
            .partial_cmp(&a.pagerank)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.betweenness
                    .partial_cmp(&a.betweenness)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.url.cmp(&b.url))
    });
    rows
}
