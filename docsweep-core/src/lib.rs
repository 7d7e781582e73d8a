pub mod crawl;
pub mod error;
pub mod report;
pub mod session;

pub use error::{Result, RunError};

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
     _
  __| | ___   ___ _____      _____  ___ _ __
 / _` |/ _ \ / __/ __\ \ /\ / / _ \/ _ \ '_ \
| (_| | (_) | (__\__ \\ V  V /  __/  __/ |_) |
 \__,_|\___/ \___|___/ \_/\_/ \___|\___| .__/
                                       |_|    "#;
    println!("{}", banner.cyan().bold());
    println!(
        "{}\n",
        format!(
            "  v{} - recursive document harvester (PDF, Word, Excel, CSV)",
            env!("CARGO_PKG_VERSION")
        )
        .dimmed()
    );
}
