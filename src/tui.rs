use chrono::{DateTime, Local};
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;

use crate::crawler::CrawlStats;
use crate::dataset::BuildStats;
use crate::warn_eprintln;

/// Per-page progress line shown while crawling.
pub struct CrawlTUI {
    bar: ProgressBar,
    records: usize,
}

impl CrawlTUI {
    pub fn new(total_pages: u64, visible: bool) -> Self {
        // debug output would tear the bar apart, so it stays hidden then
        let bar = if visible && !crate::debug::is_debug_enabled() {
            ProgressBar::new(total_pages)
        } else {
            ProgressBar::hidden()
        };

        let style = ProgressStyle::with_template(
            "{spinner} Pages {pos}/{len} [{bar:30}] {msg} ({elapsed})",
        )
        .map(|style| style.progress_chars("█░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);

        Self { bar, records: 0 }
    }

    pub fn start_page(&self, page: u32) {
        self.bar
            .set_message(format!("page {} - {} listings so far", page, self.records));
    }

    pub fn finish_page(&mut self, records: usize) {
        self.records += records;
        self.bar.inc(1);
        self.bar.set_message(format!("{} listings", self.records));
    }

    pub fn warn(&self, message: &str) {
        self.bar.suspend(|| warn_eprintln!("{}", message));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

pub struct RunSummary<'a> {
    pub crawl: &'a CrawlStats,
    pub build: &'a BuildStats,
    pub rows_written: usize,
    pub output: &'a str,
    pub started: DateTime<Local>,
}

fn elapsed_secs(started: DateTime<Local>) -> f64 {
    (Local::now() - started).num_milliseconds() as f64 / 1000.0
}

/// Failed pages and skipped listings, shared by both summaries.
fn print_crawl_problems(crawl: &CrawlStats) -> io::Result<()> {
    if !crawl.failed_pages.is_empty() {
        execute!(
            io::stdout(),
            SetForegroundColor(Color::Red),
            Print(format!(
                "❌ {} pages failed: {:?}\n",
                crawl.failed_pages.len(),
                crawl.failed_pages
            )),
            ResetColor
        )?;
    }

    if crawl.listings_skipped > 0 {
        execute!(
            io::stdout(),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "⚠ {} listings skipped (missing title or rent)\n",
                crawl.listings_skipped
            )),
            ResetColor
        )?;
    }

    Ok(())
}

pub fn print_run_summary(summary: &RunSummary) -> io::Result<()> {
    let crawl = summary.crawl;
    let build = summary.build;

    execute!(
        io::stdout(),
        Print("─".repeat(60)),
        Print("\n"),
        SetForegroundColor(Color::Green),
        Print(format!(
            "✅ Crawl finished: {} pages attempted, {} listings extracted\n",
            crawl.pages_attempted, crawl.listings_extracted
        )),
        ResetColor
    )?;

    print_crawl_problems(crawl)?;

    execute!(
        io::stdout(),
        SetForegroundColor(Color::DarkGrey),
        Print(format!(
            "  {} empty pages | {} duplicates removed | {} rows without area dropped\n",
            crawl.empty_pages, build.duplicates_removed, build.missing_area_dropped
        )),
        ResetColor,
        SetForegroundColor(Color::White),
        Print(format!(
            "💾 Saved {} rows to {} in {:.1}s\n",
            summary.rows_written,
            summary.output,
            elapsed_secs(summary.started)
        )),
        ResetColor
    )?;

    Ok(())
}

/// Counts of a run stopped by a failed page. Nothing was deduplicated or
/// written, so those totals are reported as zero.
pub fn print_abort_summary(page: u32, crawl: &CrawlStats, started: DateTime<Local>) -> io::Result<()> {
    execute!(
        io::stdout(),
        Print("─".repeat(60)),
        Print("\n"),
        SetForegroundColor(Color::Red),
        Print(format!(
            "🛑 Crawl aborted at page {}: {} pages attempted, {} listings extracted\n",
            page, crawl.pages_attempted, crawl.listings_extracted
        )),
        ResetColor
    )?;

    print_crawl_problems(crawl)?;

    execute!(
        io::stdout(),
        SetForegroundColor(Color::DarkGrey),
        Print(format!(
            "  {} empty pages | 0 duplicates removed | 0 rows written in {:.1}s\n",
            crawl.empty_pages,
            elapsed_secs(started)
        )),
        ResetColor
    )?;

    Ok(())
}
