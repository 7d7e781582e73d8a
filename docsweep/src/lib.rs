// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    crawl_options_from_matches, load_urls_from_file, load_urls_from_source, parse_header_line,
    parse_url_line, parse_url_list,
};

// Re-export run functionality from docsweep-core
pub use docsweep_core::crawl::{CrawlOptions, CrawlProgressCallback, RunReport, execute_run};
