//! Scraper for apartment rentals listed on imovelweb.com.br.
//!
//! Pages are fetched one at a time, every listing card is normalized into a
//! [`models::ListingRecord`], and the whole crawl is turned into a
//! deduplicated [`dataset::Dataset`] that can be written as CSV or JSON.

pub mod crawler;
pub mod dataset;
pub mod debug;
pub mod error;
pub mod extractors;
pub mod fetcher;
pub mod models;
pub mod normalizer;
pub mod output;
pub mod parser;
pub mod profile;
pub mod tui;

pub use error::{Error, Result};
