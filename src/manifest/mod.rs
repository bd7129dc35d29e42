//! Manifest module
//!
//! - `ManifestNode` / `Manifest`: the settled crawl result, an owned tree of
//!   pages and documents
//! - `flatten`: turns a settled manifest into a `DownloadQueue` and the
//!   directory tree it downloads into

mod flatten;
mod node;

pub use flatten::{flatten, DownloadItem, DownloadQueue};
pub use node::{Manifest, ManifestNode};
