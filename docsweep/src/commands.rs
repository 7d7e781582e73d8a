use crate::CLAP_STYLING;
use clap::{arg, command};
use docsweep_scanner::MaxDepth;
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("docsweep")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("docsweep")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and per-page log output").required(false))
        .arg(
            arg!(-v --"verbose" "Show debug logging")
                .required(false)
                .conflicts_with("quiet"),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Recursively crawl one or more sites and download every PDF, Word, Excel \
                and CSV document found.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("A seed URL to crawl (repeatable)")
                        .value_parser(clap::value_parser!(Url))
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"urls" <LIST>)
                        .required(false)
                        .help("Comma-separated list of seed URLs"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of seed URLs")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"header" <HEADER>)
                        .required(false)
                        .help("Extra request header as 'Name: value' (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum crawl depth: a number >= 1, or 'max' for no limit")
                        .value_parser(clap::value_parser!(MaxDepth))
                        .default_value("max"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' in the worker pool.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Download root directory")
                        .default_value("./downloads"),
                )
                .arg(
                    arg!(--"clean")
                        .required(false)
                        .help("Delete the download root before starting")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"discard-partial")
                        .required(false)
                        .help("Remove partially written files when a download is stopped")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds (default: none)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-r --"report" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
}
