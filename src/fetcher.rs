use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::error::FetchError;
use crate::{debug_eprintln, debug_println, warn_eprintln, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// What to do with a page between loading it and reading its markup.
///
/// Plain HTTP responses are never rendered, so neither variant changes the
/// markup of an `HttpFetcher` page. `Fixed` only paces requests there.
#[derive(Debug, Clone)]
pub enum SettleWait {
    /// Sleep a fixed time after loading.
    Fixed(Duration),
    /// Check once that `selector` is present in the loaded markup. A miss is
    /// reported and the markup is used as loaded.
    ReadyMarker(Selector),
}

impl Default for SettleWait {
    fn default() -> Self {
        SettleWait::Fixed(Duration::ZERO)
    }
}

fn is_ready(html: &str, selector: &Selector) -> bool {
    Html::parse_document(html).select(selector).next().is_some()
}

/// Source of page markup. One fetcher is created per run and owned by the
/// crawler, so whatever session it holds is released when the run ends.
pub trait PageFetcher {
    fn name(&self) -> &str;

    /// Loads the markup of `url` with exactly one request.
    fn load(&mut self, url: &str) -> std::result::Result<String, FetchError>;

    fn fetch(&mut self, url: &str, settle: &SettleWait) -> std::result::Result<String, FetchError> {
        let body = self.load(url)?;
        match settle {
            SettleWait::Fixed(wait) => {
                if !wait.is_zero() {
                    debug_println!("Waiting {:?} after loading {}", wait, url);
                    thread::sleep(*wait);
                }
            }
            SettleWait::ReadyMarker(selector) => {
                if !is_ready(&body, selector) {
                    warn_eprintln!("Page has no ready marker, using it as loaded: {}", url);
                }
            }
        }
        Ok(body)
    }
}

pub struct HttpFetcher {
    client: Client,
    request_count: usize,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Http)?;

        Ok(HttpFetcher {
            client,
            request_count: 0,
        })
    }
}

impl PageFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    fn load(&mut self, url: &str) -> std::result::Result<String, FetchError> {
        debug_println!("Fetching page: {}", url);
        self.request_count += 1;

        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.text()?)
    }
}

impl Drop for HttpFetcher {
    fn drop(&mut self) {
        debug_println!("Closing HTTP session after {} requests", self.request_count);
    }
}

/// Reads pages saved from a browser out of a directory. The file name is the
/// last path segment of the page URL, e.g.
/// `apartamentos-aluguel-sao-paulo-sp-ordem-precio-menor-pagina-3.html`.
///
/// Snapshots are already rendered, so fixed settle waits are skipped.
pub struct SnapshotFetcher {
    dir: PathBuf,
}

impl SnapshotFetcher {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        SnapshotFetcher {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn snapshot_path(&self, url: &str) -> PathBuf {
        let without_query = url.split(['?', '#']).next().unwrap_or(url);
        let file_name = without_query
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(without_query);
        self.dir.join(file_name)
    }
}

impl PageFetcher for SnapshotFetcher {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn load(&mut self, url: &str) -> std::result::Result<String, FetchError> {
        let path = self.snapshot_path(url);
        debug_println!("Reading snapshot: {}", path.display());

        fs::read_to_string(&path).map_err(|source| FetchError::Snapshot { path, source })
    }

    fn fetch(&mut self, url: &str, settle: &SettleWait) -> std::result::Result<String, FetchError> {
        let body = self.load(url)?;
        if let SettleWait::ReadyMarker(selector) = settle {
            if !is_ready(&body, selector) {
                debug_eprintln!("Snapshot has no ready marker: {}", url);
            }
        }
        Ok(body)
    }
}
