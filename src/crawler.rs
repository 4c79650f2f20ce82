use rand::Rng;
use std::thread;
use std::time::Duration;

use crate::fetcher::{PageFetcher, SettleWait};
use crate::models::ListingRecord;
use crate::normalizer::{self, PageExtraction, RequiredFieldPolicy};
use crate::profile::{self, SiteProfile};
use crate::tui::CrawlTUI;
use crate::{debug_println, Error, Result};

/// What to do when a page cannot be fetched or extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageErrorPolicy {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Record the page as failed, warn, and carry on.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    FetchingPage(u32),
    ExtractingListings(u32),
    Accumulating(u32),
    Done,
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Listing page URL with a `{page}` placeholder.
    pub url_template: String,
    /// First page, inclusive.
    pub start_page: u32,
    /// Last page, exclusive.
    pub end_page: u32,
    pub settle: SettleWait,
    pub page_delay: Duration,
    pub jitter: Duration,
    pub page_errors: PageErrorPolicy,
    pub required_fields: RequiredFieldPolicy,
    pub show_progress: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            url_template: profile::DEFAULT_URL_TEMPLATE.to_string(),
            start_page: 1,
            end_page: 2,
            settle: SettleWait::default(),
            page_delay: Duration::from_secs(2),
            jitter: Duration::ZERO,
            page_errors: PageErrorPolicy::default(),
            required_fields: RequiredFieldPolicy::default(),
            show_progress: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStats {
    pub pages_attempted: usize,
    pub failed_pages: Vec<u32>,
    pub empty_pages: usize,
    pub listings_found: usize,
    pub listings_extracted: usize,
    pub listings_skipped: usize,
}

#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Records of all pages, in page-then-listing order.
    pub records: Vec<ListingRecord>,
    pub stats: CrawlStats,
}

/// Walks the listing pages one after another and collects their records.
pub struct Crawler<F: PageFetcher> {
    fetcher: F,
    profile: SiteProfile,
    options: CrawlOptions,
    state: CrawlState,
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F, profile: SiteProfile, options: CrawlOptions) -> Result<Self> {
        if options.start_page > options.end_page {
            return Err(Error::PageRange {
                start: options.start_page,
                end: options.end_page,
            });
        }
        // fail before any request if the template is unusable
        profile::page_url(&options.url_template, options.start_page)?;

        Ok(Crawler {
            fetcher,
            profile,
            options,
            state: CrawlState::Idle,
        })
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn run(&mut self) -> Result<CrawlOutcome> {
        let pages = self.options.start_page..self.options.end_page;
        let mut tui = CrawlTUI::new(pages.len() as u64, self.options.show_progress);
        let mut records = Vec::new();
        let mut stats = CrawlStats::default();

        debug_println!(
            "Crawling pages {}..{} with the {} fetcher",
            pages.start,
            pages.end,
            self.fetcher.name()
        );

        for page in pages.clone() {
            if page > pages.start {
                self.throttle();
            }

            stats.pages_attempted += 1;
            tui.start_page(page);

            match self.crawl_page(page) {
                Ok(extraction) => {
                    self.set_state(CrawlState::Accumulating(page));
                    if extraction.listings_found == 0 {
                        stats.empty_pages += 1;
                    }
                    stats.listings_found += extraction.listings_found;
                    stats.listings_extracted += extraction.records.len();
                    stats.listings_skipped += extraction.skipped.len();

                    for skipped in &extraction.skipped {
                        tui.warn(&format!(
                            "Page {}: skipped listing {} ({})",
                            page, skipped.index, skipped.reason
                        ));
                    }

                    tui.finish_page(extraction.records.len());
                    records.extend(extraction.records);
                }
                Err(e) => match self.options.page_errors {
                    PageErrorPolicy::Abort => {
                        tui.finish();
                        self.set_state(CrawlState::Done);
                        stats.failed_pages.push(page);
                        return Err(Error::Aborted {
                            page,
                            stats,
                            source: Box::new(e),
                        });
                    }
                    PageErrorPolicy::Skip => {
                        tui.warn(&format!("Page {} failed and was skipped: {}", page, e));
                        stats.failed_pages.push(page);
                        tui.finish_page(0);
                    }
                },
            }
        }

        tui.finish();
        self.set_state(CrawlState::Done);
        Ok(CrawlOutcome { records, stats })
    }

    fn crawl_page(&mut self, page: u32) -> Result<PageExtraction> {
        let url = profile::page_url(&self.options.url_template, page)?;

        self.set_state(CrawlState::FetchingPage(page));
        let html = self.fetcher.fetch(&url, &self.options.settle)?;

        self.set_state(CrawlState::ExtractingListings(page));
        normalizer::normalize_page(&html, &self.profile, page, self.options.required_fields)
    }

    fn throttle(&self) {
        let mut delay = self.options.page_delay;
        let jitter_ms = self.options.jitter.as_millis() as u64;
        if jitter_ms > 0 {
            delay += Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms));
        }
        if !delay.is_zero() {
            debug_println!("Sleeping {:?} before the next page", delay);
            thread::sleep(delay);
        }
    }

    fn set_state(&mut self, state: CrawlState) {
        debug_println!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }
}
