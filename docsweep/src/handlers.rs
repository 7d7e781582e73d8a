use anyhow::{Context, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use docsweep_core::crawl::{CrawlOptions, RunReport, execute_run};
use docsweep_core::report::{ReportFormat, collect_downloads, generate_run_report, save_report};
use docsweep_core::session::RunSession;
use docsweep_scanner::MaxDepth;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use url::Url;

/// Exit code for a run stopped with Ctrl-C.
pub const EXIT_STOPPED: i32 = 130;

// Helper functions for crawl handler

/// Gather seed URLs from every source given on the command line, in order,
/// without duplicates.
pub fn load_urls_from_source(
    urls: &[Url],
    url_list: Option<&str>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    let mut seeds: Vec<String> = urls.iter().map(|url| url.as_str().to_string()).collect();

    if let Some(list) = url_list {
        seeds.extend(parse_url_list(list));
    }
    if let Some(hosts_file_path) = hosts_file {
        seeds.extend(load_urls_from_file(hosts_file_path)?);
    }

    let mut seen = HashSet::new();
    seeds.retain(|seed| seen.insert(seed.clone()));

    if seeds.is_empty() {
        return Err("At least one of --url, --urls or --hosts-file must be provided".to_string());
    }
    Ok(seeds)
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_url_line(line.trim()))
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Split a comma-separated list into URLs, skipping blanks.
pub fn parse_url_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(parse_url_line)
        .collect()
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    // Try to parse as-is
    if Url::parse(line).is_ok_and(|url| url.has_host()) {
        return Some(line.to_string());
    }

    // Try adding http://
    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("{} Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// Parse `Name: value` into a header pair.
pub fn parse_header_line(line: &str) -> Result<(String, String), String> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| format!("Invalid header '{}': expected 'Name: value'", line))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid header '{}': empty name", line));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Turn parsed `crawl` arguments into run options.
pub fn crawl_options_from_matches(
    sub_matches: &ArgMatches,
    show_progress_bars: bool,
) -> Result<CrawlOptions, String> {
    let urls: Vec<Url> = sub_matches
        .get_many::<Url>("url")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let url_list = sub_matches.get_one::<String>("urls").map(String::as_str);
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");

    let headers = sub_matches
        .get_many::<String>("header")
        .map(|values| values.map(|h| parse_header_line(h)).collect())
        .unwrap_or_else(|| Ok(Vec::new()))?;

    let output = sub_matches
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or(docsweep_core::crawl::DEFAULT_OUTPUT_DIR);
    let output_dir = PathBuf::from(shellexpand::tilde(output).as_ref());

    Ok(CrawlOptions {
        urls: load_urls_from_source(&urls, url_list, hosts_file)?,
        headers,
        max_depth: sub_matches
            .get_one::<MaxDepth>("depth")
            .copied()
            .unwrap_or_default(),
        threads: sub_matches
            .get_one::<usize>("threads")
            .copied()
            .unwrap_or(docsweep_scanner::crawler::DEFAULT_WORKERS)
            .max(1),
        output_dir,
        clean: sub_matches.get_flag("clean"),
        discard_partial: sub_matches.get_flag("discard-partial"),
        timeout: sub_matches
            .get_one::<u64>("timeout")
            .map(|secs| Duration::from_secs(*secs)),
        show_progress_bars,
    })
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    // A global subscriber may already be installed.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the `crawl` subcommand and return the process exit code.
pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool, verbose: bool) -> i32 {
    // Initialize tracing for logging
    init_logging(quiet, verbose);

    match run_crawl(sub_matches, quiet).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            1
        }
    }
}

async fn run_crawl(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<i32> {
    let options = crawl_options_from_matches(sub_matches, quiet).map_err(|e| anyhow!(e))?;
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let report_path = sub_matches.get_one::<PathBuf>("report").cloned();

    // Print crawl configuration
    if !quiet {
        println!(
            "{} Crawling {} seed(s)",
            "→".blue().bold(),
            options.urls.len().to_string().cyan()
        );
        println!("Workers: {}", options.threads);
        println!("Max depth: {}", options.max_depth);
        println!("Output: {}\n", options.output_dir.display());
    }

    let session = RunSession::new();
    let stopper = session.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} Stopping, finishing current work...", "■".yellow().bold());
            stopper.stop();
        }
    });

    let result = execute_run(options, &session, None).await;
    ctrl_c.abort();
    let report = result.context("Crawl failed")?;

    print_report(&report, format, report_path.as_ref())?;

    if report.summary.cancelled {
        println!("\n{} Crawl stopped", "■".yellow().bold());
        Ok(EXIT_STOPPED)
    } else {
        println!("\n{} Crawl complete!", "✓".green().bold());
        Ok(0)
    }
}

fn print_report(
    report: &RunReport,
    format: ReportFormat,
    report_path: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let entries = collect_downloads(&report.download_root).with_context(|| {
        format!(
            "Failed to read download directory {}",
            report.download_root.display()
        )
    })?;
    let rendered = generate_run_report(report, &entries, format)?;

    match report_path {
        Some(path) => {
            save_report(&rendered, path)?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
