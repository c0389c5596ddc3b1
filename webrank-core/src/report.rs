//! Persisted artifacts: ranked CSV table, JSON report, neighborhood SVG.

use crate::graph::LinkGraph;
use crate::rank::RankedRow;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run metadata carried into the JSON report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub seeds: Vec<String>,
    pub node_count: usize,
    pub edge_count: usize,
    pub pagerank_iterations: usize,
    pub pagerank_residual: f64,
}

/// Write the top `top_k` rows as CSV with the canonical column set.
pub fn write_csv(rows: &[RankedRow], top_k: usize, path: &Path) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "label",
        "url",
        "in_degree",
        "out_degree",
        "pagerank",
        "betweenness",
    ])?;
    for row in rows.iter().take(top_k) {
        wtr.write_record([
            row.label.as_str(),
            row.url.as_str(),
            &row.in_degree.to_string(),
            &row.out_degree.to_string(),
            &format!("{:.6}", row.pagerank),
            &format!("{:.6}", row.betweenness),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render the full ranking as a pretty JSON report with run metadata.
pub fn render_json_report(rows: &[RankedRow], info: &RunInfo) -> Result<String, serde_json::Error> {
    let report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "webrank",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
            },
            "run": info,
            "graph": {
                "nodes": info.node_count,
                "edges": info.edge_count,
            },
            "ranking": rows,
        }
    });
    serde_json::to_string_pretty(&report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Top-n ranking lines for terminal output.
pub fn format_summary(rows: &[RankedRow], n: usize) -> String {
    let mut out = String::new();
    for row in rows.iter().take(n) {
        out.push_str(&format!(
            "- {}  PR={:.4}  BT={:.4}\n",
            row.label, row.pagerank, row.betweenness
        ));
    }
    out
}

// Solid palette for the SVG rendering.
const BACKGROUND: &str = "#ffffff";
const EDGE_COLOR: &str = "#9399b2";
const NODE_COLOR: &str = "#8839ef";
const LABEL_COLOR: &str = "#4c4f69";

const CANVAS_W: f64 = 1200.0;
const CANVAS_H: f64 = 900.0;
const MARGIN: f64 = 80.0;
const LAYOUT_SEED: u64 = 42;
const LAYOUT_ROUNDS: usize = 200;
const LABEL_MAX_CHARS: usize = 18;

/// Render the sampled subgraph as an SVG drawing.
///
/// Layout is a seeded spring relaxation, so the same subgraph always draws
/// the same picture. `sizes` maps URLs to a score used only for node radius;
/// nodes missing from it get the minimum radius.
pub fn render_svg(
    subgraph: &LinkGraph,
    sizes: &HashMap<String, f64>,
    path: &Path,
) -> std::io::Result<()> {
    let nodes: Vec<&str> = subgraph.nodes().collect();
    let positions = spring_layout(subgraph, &nodes);
    let index: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, &u)| (u, i)).collect();

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{CANVAS_W}" height="{CANVAS_H}" viewBox="0 0 {CANVAS_W} {CANVAS_H}">"#
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"<rect width="{CANVAS_W}" height="{CANVAS_H}" fill="{BACKGROUND}"/>"#
    ));
    svg.push('\n');

    for node in &nodes {
        let (x1, y1) = positions[index[node]];
        for succ in subgraph.successors(node) {
            let (x2, y2) = positions[index[succ]];
            svg.push_str(&format!(
                r#"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}" stroke="{EDGE_COLOR}" stroke-opacity="0.3" stroke-width="1"/>"#
            ));
            svg.push('\n');
        }
    }

    for node in &nodes {
        let (x, y) = positions[index[node]];
        let score = sizes.get(*node).copied().unwrap_or(0.0);
        let radius = 4.0 + 300.0 * score.max(0.0);
        svg.push_str(&format!(
            r#"<circle cx="{x:.1}" cy="{y:.1}" r="{radius:.1}" fill="{NODE_COLOR}" fill-opacity="0.9"/>"#
        ));
        svg.push('\n');
        let label: String = crate::rank::page_label(node)
            .chars()
            .take(LABEL_MAX_CHARS)
            .collect();
        let label = escape_xml(&label);
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{:.1}" font-size="10" font-family="sans-serif" fill="{LABEL_COLOR}" text-anchor="middle">{label}</text>"#,
            y - radius - 4.0
        ));
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    std::fs::write(path, svg)
}

/// Seeded Fruchterman-Reingold style relaxation in canvas coordinates.
fn spring_layout(subgraph: &LinkGraph, nodes: &[&str]) -> Vec<(f64, f64)> {
    let n = nodes.len();
    if n == 0 {
        return Vec::new();
    }
    let index: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, &u)| (u, i)).collect();
    let edges: Vec<(usize, usize)> = nodes
        .iter()
        .flat_map(|&u| {
            subgraph
                .successors(u)
                .map(|v| (index[u], index[v]))
                .collect::<Vec<_>>()
        })
        .filter(|(a, b)| a != b)
        .collect();

    let w = CANVAS_W - 2.0 * MARGIN;
    let h = CANVAS_H - 2.0 * MARGIN;
    let mut rng = StdRng::seed_from_u64(LAYOUT_SEED);
    let mut pos: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.gen_range(0.0..w), rng.gen_range(0.0..h)))
        .collect();
    if n == 1 {
        return vec![(CANVAS_W / 2.0, CANVAS_H / 2.0)];
    }

    let k = (w * h / n as f64).sqrt();
    let mut temperature = w / 8.0;
    let cooling = temperature / LAYOUT_ROUNDS as f64;

    for _ in 0..LAYOUT_ROUNDS {
        let mut disp = vec![(0.0f64, 0.0f64); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = pos[i].0 - pos[j].0;
                let dy = pos[i].1 - pos[j].1;
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                let repulse = k * k / dist;
                disp[i].0 += dx / dist * repulse;
                disp[i].1 += dy / dist * repulse;
                disp[j].0 -= dx / dist * repulse;
                disp[j].1 -= dy / dist * repulse;
            }
        }

        for &(a, b) in &edges {
            let dx = pos[a].0 - pos[b].0;
            let dy = pos[a].1 - pos[b].1;
            let dist = (dx * dx + dy * dy).sqrt().max(0.01);
            let attract = dist * dist / k;
            disp[a].0 -= dx / dist * attract;
            disp[a].1 -= dy / dist * attract;
            disp[b].0 += dx / dist * attract;
            disp[b].1 += dy / dist * attract;
        }

        for i in 0..n {
            let (dx, dy) = disp[i];
            let len = (dx * dx + dy * dy).sqrt().max(0.01);
            let step = len.min(temperature);
            pos[i].0 = (pos[i].0 + dx / len * step).clamp(0.0, w);
            pos[i].1 = (pos[i].1 + dy / len * step).clamp(0.0, h);
        }
        temperature = (temperature - cooling).max(0.01);
    }

    pos.into_iter()
        .map(|(x, y)| (x + MARGIN, y + MARGIN))
        .collect()
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
