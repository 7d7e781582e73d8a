// Report generation from the download tree

use crate::crawl::RunReport;
use crate::error::{Result, RunError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const LEVEL_PREFIX: &str = "level_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// One file found under `<root>/<domain>/level_<N>/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadEntry {
    pub domain: String,
    pub level: usize,
    pub filename: String,
    pub bytes: u64,
}

/// Walks the download tree and lists every saved file, sorted by domain,
/// level and file name. Entries outside the `domain/level_N/file` layout are
/// ignored. A missing root yields an empty list.
pub fn collect_downloads(root: &Path) -> Result<Vec<DownloadEntry>> {
    let mut entries = Vec::new();
    if !root.is_dir() {
        return Ok(entries);
    }

    for domain_dir in std::fs::read_dir(root)? {
        let domain_dir = domain_dir?;
        if !domain_dir.file_type()?.is_dir() {
            continue;
        }
        let domain = domain_dir.file_name().to_string_lossy().into_owned();

        for level_dir in std::fs::read_dir(domain_dir.path())? {
            let level_dir = level_dir?;
            if !level_dir.file_type()?.is_dir() {
                continue;
            }
            let Some(level) = parse_level(&level_dir.file_name().to_string_lossy()) else {
                continue;
            };

            for file in std::fs::read_dir(level_dir.path())? {
                let file = file?;
                let metadata = file.metadata()?;
                if !metadata.is_file() {
                    continue;
                }
                entries.push(DownloadEntry {
                    domain: domain.clone(),
                    level,
                    filename: file.file_name().to_string_lossy().into_owned(),
                    bytes: metadata.len(),
                });
            }
        }
    }

    entries.sort_by(|a, b| {
        (a.domain.as_str(), a.level, a.filename.as_str())
            .cmp(&(b.domain.as_str(), b.level, b.filename.as_str()))
    });
    Ok(entries)
}

fn parse_level(name: &str) -> Option<usize> {
    name.strip_prefix(LEVEL_PREFIX)?.parse().ok()
}

/// Renders the run report in the requested format.
pub fn generate_run_report(
    report: &RunReport,
    entries: &[DownloadEntry],
    format: ReportFormat,
) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report, entries)),
        ReportFormat::Json => generate_json_report(report, entries),
    }
}

pub fn generate_text_report(report: &RunReport, entries: &[DownloadEntry]) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    out.push_str(RULE);
    out.push_str("                          DOCSWEEP DOWNLOAD REPORT\n");
    out.push_str(RULE);
    out.push('\n');

    let status = if summary.cancelled { "Stopped" } else { "Completed" };
    let duration = report.finished_at - report.started_at;

    out.push_str(&format!("Run ID:       {}\n", report.run_id));
    out.push_str(&format!("Status:       {}\n", status));
    out.push_str(&format!(
        "Started:      {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Duration:     {} seconds\n", duration.num_seconds()));
    out.push_str(&format!("Output:       {}\n", report.download_root.display()));
    out.push_str(&format!("Pages:        {}\n", summary.pages_processed));
    if summary.pages_failed > 0 {
        out.push_str(&format!("Page Errors:  {}\n", summary.pages_failed));
    }
    if summary.download_failures > 0 {
        out.push_str(&format!("Failed DLs:   {}\n", summary.download_failures));
    }
    out.push('\n');

    out.push_str(RULE);
    out.push_str("DOWNLOADS\n");
    out.push_str(RULE);
    out.push('\n');

    if entries.is_empty() {
        out.push_str("No documents were downloaded.\n\n");
    } else {
        let total: u64 = entries.iter().map(|e| e.bytes).sum();
        out.push_str(&format!(
            "Total: {} file(s), {}\n\n",
            entries.len(),
            format_bytes(total)
        ));

        for (domain, levels) in group_by_domain(entries) {
            out.push_str(&format!("{}\n", domain));
            for (level, files) in levels {
                out.push_str(&format!("  level {}\n", level));
                for entry in files {
                    out.push_str(&format!(
                        "    {:<50} {:>12}\n",
                        entry.filename,
                        format_bytes(entry.bytes)
                    ));
                }
            }
            out.push('\n');
        }
    }

    out.push_str(RULE);
    out.push_str("                                End of Report\n");
    out.push_str(RULE);

    out
}

pub fn generate_json_report(report: &RunReport, entries: &[DownloadEntry]) -> Result<String> {
    let domains = group_by_domain(entries);
    let status = if report.summary.cancelled { "stopped" } else { "completed" };
    let total_bytes: u64 = entries.iter().map(|e| e.bytes).sum();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "docsweep",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "run": {
                "id": report.run_id,
                "status": status,
                "started_at": report.started_at.to_rfc3339(),
                "finished_at": report.finished_at.to_rfc3339(),
                "download_root": report.download_root,
            },
            "summary": {
                "pages_processed": report.summary.pages_processed,
                "pages_failed": report.summary.pages_failed,
                "download_failures": report.summary.download_failures,
                "files": entries.len(),
                "bytes": total_bytes,
            },
            "domains": domains,
            "downloads": report.summary.downloads,
        }
    });

    Ok(serde_json::to_string_pretty(&json_report)?)
}

pub fn save_report(content: &str, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .map_err(|e| RunError::Report(format!("cannot create {}: {}", path.display(), e)))?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn group_by_domain(entries: &[DownloadEntry]) -> BTreeMap<&str, BTreeMap<usize, Vec<&DownloadEntry>>> {
    let mut grouped: BTreeMap<&str, BTreeMap<usize, Vec<&DownloadEntry>>> = BTreeMap::new();
    for entry in entries {
        grouped
            .entry(entry.domain.as_str())
            .or_default()
            .entry(entry.level)
            .or_default()
            .push(entry);
    }
    grouped
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("level_1"), Some(1));
        assert_eq!(parse_level("level_12"), Some(12));
        assert_eq!(parse_level("level_"), None);
        assert_eq!(parse_level("misc"), None);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }
}
