use std::path::PathBuf;

use thiserror::Error;

use crate::crawler::CrawlStats;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to fetch page: {0}")]
    Fetch(#[from] FetchError),

    /// A page failed under `PageErrorPolicy::Abort`. `stats` covers every
    /// page attempted up to and including the failed one.
    #[error("Page {page} failed: {source}")]
    Aborted {
        page: u32,
        stats: CrawlStats,
        #[source]
        source: Box<Error>,
    },

    #[error("Listing {index} on page {page} is missing a required field: {source}")]
    RequiredField {
        page: u32,
        index: usize,
        #[source]
        source: ExtractError,
    },

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid URL template: {0}")]
    Template(String),

    #[error("Invalid page range: start {start} is after end {end}")]
    PageRange { start: u32, end: u32 },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of the page fetching collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Reqwest Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Could not read snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to extract a required listing field.
///
/// Optional fields never produce one of these; they fall back to their
/// absence value instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("{0} element not found")]
    MissingField(&'static str),

    #[error("could not parse {field} from {text:?}")]
    Unparsable { field: &'static str, text: String },
}
