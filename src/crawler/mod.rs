//! Crawler module for building the document manifest
//!
//! This module contains the crawl phase, including:
//! - HTTP page fetching
//! - HTML parsing for titles and references
//! - Quiescence detection across the eager fan-out
//! - Overall crawl coordination into an owned manifest tree

mod coordinator;
mod fetcher;
mod parser;
mod quiescence;

pub use coordinator::Crawler;
pub use fetcher::{build_http_client, fetch_page};
pub use parser::{parse_page, ParsedPage};
pub use quiescence::{QuiescenceDetector, SettleGuard};
