//! URL handling module for Doc-Harvest
//!
//! This module decides what a discovered reference is (a page to crawl, a
//! document to download, or something to ignore), resolves references against
//! a seed's base location, and derives local names from locations.

mod filename;
mod resolve;

use crate::config::CrawlerConfig;

// Re-export main functions
pub use filename::{file_name_for, reference_stem, sanitize_path_component};
pub use resolve::{base_location, resolve_reference};

/// Schemes that never lead anywhere downloadable
const IGNORED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// What a discovered reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// A page that should be fetched and parsed for further references
    Page,
    /// A leaf document that should be downloaded
    Document,
    /// Anything else; never enters the manifest
    Ignored,
}

impl ReferenceKind {
    /// Returns true if the reference belongs in the manifest
    pub fn is_followed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Extension rules used to classify references
#[derive(Debug, Clone)]
pub struct ReferenceRules {
    document_extensions: Vec<String>,
    page_extensions: Vec<String>,
}

impl ReferenceRules {
    /// Creates rules from explicit extension lists (compared case-insensitively)
    pub fn new(document_extensions: &[String], page_extensions: &[String]) -> Self {
        Self {
            document_extensions: document_extensions
                .iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
            page_extensions: page_extensions
                .iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Creates rules from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(&config.document_extensions, &config.page_extensions)
    }
}

impl Default for ReferenceRules {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Classifies a raw reference token
///
/// The rule is a suffix match on the final path segment: query strings and
/// fragments are stripped, the text after the last `.` of the last segment is
/// compared case-insensitively against the document extensions first, then the
/// page extensions. A path that merely contains `pdf` somewhere else (for
/// example `/pdfs/index.html`) is classified by its real extension.
///
/// # Examples
///
/// ```
/// use doc_harvest::url::{classify_reference, ReferenceKind, ReferenceRules};
///
/// let rules = ReferenceRules::default();
/// assert_eq!(classify_reference("a.pdf", &rules), ReferenceKind::Document);
/// assert_eq!(classify_reference("pdfs/sub.html", &rules), ReferenceKind::Page);
/// assert_eq!(classify_reference("mailto:x@y.z", &rules), ReferenceKind::Ignored);
/// ```
pub fn classify_reference(reference: &str, rules: &ReferenceRules) -> ReferenceKind {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return ReferenceKind::Ignored;
    }

    let lowered = reference.to_ascii_lowercase();
    if IGNORED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return ReferenceKind::Ignored;
    }

    let path = match ::url::Url::parse(reference) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                return ReferenceKind::Ignored;
            }
            url.path().to_string()
        }
        Err(_) => strip_query_and_fragment(reference).to_string(),
    };

    let extension = match extension_of(&path) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return ReferenceKind::Ignored,
    };

    if rules.document_extensions.contains(&extension) {
        ReferenceKind::Document
    } else if rules.page_extensions.contains(&extension) {
        ReferenceKind::Page
    } else {
        ReferenceKind::Ignored
    }
}

fn strip_query_and_fragment(reference: &str) -> &str {
    let end = reference.find(|c: char| c == '?' || c == '#').unwrap_or(reference.len());
    &reference[..end]
}

/// Returns the extension of the final path segment, if any
fn extension_of(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}
