//! HTML parser for extracting the page title and followable references
//!
//! A reference is the raw `href` text of an `<a>` element. Only references
//! that classify as a page or a document are kept; they are returned in
//! document order with duplicates removed.

use crate::url::{classify_reference, ReferenceRules};
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracted information from an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title (from the first <title> tag)
    pub title: Option<String>,

    /// Raw href tokens pointing at pages or documents, in document order
    pub references: Vec<String>,
}

/// Parses HTML content and extracts the title and followable references
///
/// # Example
///
/// ```
/// use doc_harvest::crawler::parse_page;
/// use doc_harvest::url::ReferenceRules;
///
/// let html = r#"<html><head><title>Report</title></head>
///     <body><a href="a.pdf">A</a><a href="logo.png">Logo</a></body></html>"#;
/// let parsed = parse_page(html, &ReferenceRules::default());
/// assert_eq!(parsed.title.as_deref(), Some("Report"));
/// assert_eq!(parsed.references, vec!["a.pdf"]);
/// ```
pub fn parse_page(html: &str, rules: &ReferenceRules) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        references: extract_references(&document, rules),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts page and document references from `<a href>` elements
fn extract_references(document: &Html, rules: &ReferenceRules) -> Vec<String> {
    let mut references = Vec::new();
    let mut seen = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let href = href.trim();

            if !classify_reference(href, rules).is_followed() {
                continue;
            }

            if seen.insert(href.to_string()) {
                references.push(href.to_string());
            }
        }
    }

    references
}
