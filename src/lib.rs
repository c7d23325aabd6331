//! Two-stage scraper for niche.com school profile pages.
//!
//! Stage one ([`fetch`]) downloads every page named in the URL list and drops
//! the raw HTML into the download directory; stage two ([`extract`]) parses
//! the saved pages with a fixed selector battery and aggregates one record
//! per school into a single JSON document. The stages share nothing but the
//! filesystem, and each has its own binary under `src/bin`.

mod error;
mod macros;

pub mod extract;
pub mod fetch;
pub mod process;

pub use error::{Error, Result};

/// File the fetcher reads the page URLs from.
const URL_LIST_PATH: &str = "schools.txt";
/// Directory the fetcher saves pages into and the extractor reads from.
const DOWNLOAD_DIR: &str = "downloaded_pages";
/// File the extractor writes the aggregated records to.
const RESULTS_PATH: &str = "school_results.json";
/// Extension given to saved pages; the extractor only considers these.
const PAGE_EXT: &str = "html";
/// Inclusive bounds (seconds) for the randomized pre-request delay.
const DELAY_RANGE: (f64, f64) = (2.0, 5.0);
