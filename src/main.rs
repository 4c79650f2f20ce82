use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::time::Duration;

use imovelfinder::crawler::{CrawlOptions, CrawlOutcome, Crawler, PageErrorPolicy};
use imovelfinder::dataset::{DatasetBuilder, DatasetOptions, Schema};
use imovelfinder::fetcher::{HttpFetcher, PageFetcher, SettleWait, SnapshotFetcher};
use imovelfinder::models::MarkupVariant;
use imovelfinder::normalizer::RequiredFieldPolicy;
use imovelfinder::output::{self, OutputFormat};
use imovelfinder::profile::{self, SiteProfile};
use imovelfinder::tui::{print_abort_summary, print_run_summary, RunSummary};
use imovelfinder::{debug, debug_println, Error};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Imovelfinder - Apartment Rental Scraper for São Paulo")]
struct Args {
    /// Listing page URL with a {page} placeholder
    #[clap(short, long, default_value = profile::DEFAULT_URL_TEMPLATE)]
    url_template: String,

    /// First page to scrape (inclusive)
    #[clap(short, long, default_value = "1")]
    start_page: u32,

    /// Page to stop at (exclusive)
    #[clap(short, long, default_value = "2")]
    end_page: u32,

    /// Path to output file
    #[clap(short, long, default_value = "apartments.csv")]
    output: String,

    /// Output format: csv, spreadsheet (Latin-1, `;`) or json
    #[clap(short, long, default_value = "csv")]
    format: OutputFormat,

    /// Markup variant of the listing pages: icon or keyword
    #[clap(long, default_value = "icon")]
    variant: MarkupVariant,

    /// Extra wait after each page loads, in milliseconds. Plain HTTP
    /// responses are not rendered, so this only spaces out requests
    #[clap(long, default_value = "0")]
    render_wait_ms: u64,

    /// Warn when a loaded page lacks this CSS selector. Checked once against
    /// the response as served, replaces the render wait
    #[clap(long)]
    ready_selector: Option<String>,

    /// Delay between pages, in milliseconds
    #[clap(long, default_value = "2000")]
    page_delay_ms: u64,

    /// Random extra delay between pages, up to this many milliseconds
    #[clap(long, default_value = "0")]
    jitter_ms: u64,

    /// HTTP request timeout, in seconds
    #[clap(long, default_value = "30")]
    timeout_secs: u64,

    /// Keep going when a page fails instead of aborting the run
    #[clap(long)]
    skip_failed_pages: bool,

    /// Fail a page when one of its listings lacks a title or rent
    #[clap(long)]
    strict: bool,

    /// Drop rows without total area (defaults to true for the icon variant)
    #[clap(long)]
    require_area: Option<bool>,

    /// Read pages saved from a browser out of this directory instead of fetching them
    #[clap(long)]
    snapshot_dir: Option<String>,

    /// Enable debug output
    #[clap(short, long)]
    debug: bool,
}

impl Args {
    fn settle_wait(&self) -> Result<SettleWait> {
        match &self.ready_selector {
            Some(selector) => Ok(SettleWait::ReadyMarker(profile::create_selector(selector)?)),
            None => Ok(SettleWait::Fixed(Duration::from_millis(self.render_wait_ms))),
        }
    }

    fn crawl_options(&self) -> Result<CrawlOptions> {
        Ok(CrawlOptions {
            url_template: self.url_template.clone(),
            start_page: self.start_page,
            end_page: self.end_page,
            settle: self.settle_wait()?,
            page_delay: Duration::from_millis(self.page_delay_ms),
            jitter: Duration::from_millis(self.jitter_ms),
            page_errors: if self.skip_failed_pages {
                PageErrorPolicy::Skip
            } else {
                PageErrorPolicy::Abort
            },
            required_fields: if self.strict {
                RequiredFieldPolicy::FailPage
            } else {
                RequiredFieldPolicy::SkipListing
            },
            show_progress: true,
        })
    }

    fn dataset_options(&self) -> DatasetOptions {
        let mut options = DatasetOptions::for_variant(self.variant);
        if let Some(require_area) = self.require_area {
            options.require_total_area = require_area;
        }
        options
    }
}

fn crawl<F: PageFetcher>(
    fetcher: F,
    profile: SiteProfile,
    options: CrawlOptions,
) -> imovelfinder::Result<CrawlOutcome> {
    let mut crawler = Crawler::new(fetcher, profile, options)?;
    crawler.run()
}

fn main() -> Result<()> {
    let args = Args::parse();
    debug::set_debug(args.debug);
    let started = Local::now();

    println!("Imovelfinder - Apartment Rental Scraper");
    println!("=======================================");
    println!(
        "Pages {}..{} ({} markup) -> {} ({})",
        args.start_page, args.end_page, args.variant, args.output, args.format
    );

    let profile = SiteProfile::for_variant(args.variant)?;
    let options = args.crawl_options()?;

    let result = match &args.snapshot_dir {
        Some(dir) => {
            debug_println!("Reading pages from {}", dir);
            crawl(SnapshotFetcher::new(dir), profile, options)
        }
        None => {
            let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout_secs))?;
            crawl(fetcher, profile, options)
        }
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(Error::Aborted { page, stats, source }) => {
            print_abort_summary(page, &stats, started)?;
            return Err(anyhow::Error::new(*source).context(format!("Crawl aborted at page {}", page)));
        }
        Err(e) => return Err(e).context("Crawl aborted"),
    };

    let builder = DatasetBuilder::new(Schema::for_variant(args.variant), args.dataset_options());
    let (dataset, build_stats) = builder.build(outcome.records);

    let rows_written = output::save_dataset(&dataset, &args.output, args.format)
        .with_context(|| format!("Failed to write output file: {}", args.output))?;

    print_run_summary(&RunSummary {
        crawl: &outcome.stats,
        build: &build_stats,
        rows_written,
        output: &args.output,
        started,
    })?;

    Ok(())
}
