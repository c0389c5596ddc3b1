use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;
use webrank_core::report::{self, RunInfo};
use webrank_core::{LinkGraph, PageRankConfig};
use webrank_crawler::{Crawler, LinkPolicy};

// Helper functions for the run handler

/// Load seed URLs from either a file or a single URL argument
pub fn load_seeds_from_source(
    url: Option<&Url>,
    seeds_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(seeds_file_path) = seeds_file {
        load_seeds_from_file(seeds_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --seeds-file must be provided".to_string())
    }
}

/// Load and parse seed URLs from a file
pub fn load_seeds_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read seeds file {}: {}", path.display(), e))?;

    let seeds: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_url_line(line.trim()))
        .collect();

    if seeds.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(seeds)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if Url::parse(line).is_ok() {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("[!] Skipping invalid URL '{}'", line);
    None
}

pub async fn handle_run(args: &ArgMatches) -> anyhow::Result<()> {
    let url = args.get_one::<Url>("url");
    let seeds_file = args.get_one::<PathBuf>("seeds-file");
    let threads = *args.get_one::<usize>("threads").unwrap_or(&10);
    let depth = *args.get_one::<usize>("depth").unwrap_or(&1);
    let max_pages = *args.get_one::<usize>("max-pages").unwrap_or(&500);
    let delay_ms = args.get_one::<u64>("delay-ms").copied();
    let path_prefix = args.get_one::<String>("path-prefix").cloned();
    let all_hosts = args.get_flag("all-hosts");
    let top = *args.get_one::<usize>("top").unwrap_or(&15);
    let successor_cap = *args.get_one::<usize>("successor-cap").unwrap_or(&30);
    let output = args.get_one::<String>("output").unwrap();
    let want_json = args.get_flag("json");

    let seeds = load_seeds_from_source(url, seeds_file).map_err(anyhow::Error::msg)?;

    let policy = LinkPolicy {
        same_host_only: !all_hosts,
        exclude_colon_paths: path_prefix.is_some(),
        path_prefix,
    };

    println!(
        "{} Crawling {} seed(s), depth {}, {} workers",
        "→".blue(),
        seeds.len(),
        depth,
        threads
    );

    // Single spinner tracking pages fetched across all workers
    let spinner = Arc::new(ProgressBar::new_spinner());
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message("Starting crawl...");

    let processed = Arc::new(AtomicUsize::new(0));
    let progress_callback: webrank_crawler::ProgressCallback = {
        let spinner = spinner.clone();
        let processed = processed.clone();
        Arc::new(move |_worker_id: usize, _url: String| {
            let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
            spinner.set_message(format!("Crawling... {} pages fetched", count));
            spinner.tick();
        })
    };

    let mut crawler = Crawler::new()
        .with_max_depth(depth)
        .with_max_pages(max_pages)
        .with_policy(policy)
        .with_progress_callback(progress_callback);
    if let Some(ms) = delay_ms {
        crawler = crawler.with_delay(Duration::from_millis(ms));
    }

    let pages = crawler
        .crawl(&seeds, threads)
        .await
        .map_err(|e| anyhow::anyhow!("Crawl failed: {e}"))?;

    // The crawl is the only writer: every discovered link becomes one edge,
    // then the graph is read-only for the engines below.
    let mut graph = LinkGraph::new();
    for page in &pages {
        for link in &page.links_found {
            graph.add_edge(&page.url, link);
        }
    }

    spinner.finish_with_message(format!(
        "Crawl complete: {} pages fetched, {} nodes, {} edges",
        pages.len(),
        graph.node_count(),
        graph.edge_count()
    ));

    if graph.is_empty() {
        println!("{}", "No links discovered; nothing to rank.".yellow());
        return Ok(());
    }

    let pr = webrank_core::pagerank(&graph, PageRankConfig::default());
    let bt = webrank_core::betweenness(&graph);
    tracing::info!(
        iterations = pr.iterations,
        residual = pr.residual,
        "pagerank diagnostics"
    );
    let rows = webrank_core::assemble(&graph, &pr.scores, &bt);

    let expanded_output = shellexpand::tilde(output);
    let out_dir = Path::new(expanded_output.as_ref());
    fs::create_dir_all(out_dir)?;

    let csv_path = out_dir.join("top_pages.csv");
    report::write_csv(&rows, top, &csv_path)?;
    println!("{} saved {}", "✓".green().bold(), csv_path.display());

    if want_json {
        let info = RunInfo {
            seeds: seeds.clone(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            pagerank_iterations: pr.iterations,
            pagerank_residual: pr.residual,
        };
        let json = report::render_json_report(&rows, &info)?;
        let json_path = out_dir.join("ranking.json");
        report::save_report(&json, &json_path)?;
        println!("{} saved {}", "✓".green().bold(), json_path.display());
    }

    let neighborhood = webrank_core::sample_neighborhood(&graph, &seeds, successor_cap);
    let sizes = graph.score_map(&pr.scores);
    let svg_path = out_dir.join("network.svg");
    report::render_svg(&neighborhood, &sizes, &svg_path)?;
    println!("{} saved {}", "✓".green().bold(), svg_path.display());

    println!("\n{}", "Top 5 by PageRank:".bright_white().bold());
    print!("{}", report::format_summary(&rows, 5));

    Ok(())
}
