use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("webrank")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("webrank")
        .styles(CLAP_STYLING)
        .subcommand_required(true)
        .subcommand(
            command!("run")
                .about(
                    "Crawl a seed set, rank every discovered page by PageRank and \
                betweenness centrality, and export the ranked table plus a neighborhood \
                rendering.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("Seed URL to crawl")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("seeds-file"),
                )
                .arg(
                    arg!(-s --"seeds-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of seed URLs")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' in the worker pool.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Fetch depth: 1 crawls only the seed pages themselves")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(--"max-pages" <COUNT>)
                        .required(false)
                        .help("Hard cap on the number of pages fetched")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("500"),
                )
                .arg(
                    arg!(--"delay-ms" <MILLIS>)
                        .required(false)
                        .help("Courtesy pause before each fetch, in milliseconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"path-prefix" <PREFIX>)
                        .required(false)
                        .help(
                            "Only keep links whose path starts with this prefix, e.g. /wiki/ \
                        (namespace-style ':' paths are dropped when set)",
                        ),
                )
                .arg(
                    arg!(--"all-hosts")
                        .required(false)
                        .help("Keep links to other hosts (default: same host as the page)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-k --"top" <ROWS>)
                        .required(false)
                        .help("Number of rows in the exported CSV table")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("15"),
                )
                .arg(
                    arg!(--"successor-cap" <COUNT>)
                        .required(false)
                        .help("Successors kept per seed in the rendered neighborhood")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("30"),
                )
                .arg(
                    arg!(-o --"output" <DIR>)
                        .required(false)
                        .help("Directory for the exported artifacts")
                        .default_value("results"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Also write the full ranking as a JSON report")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
