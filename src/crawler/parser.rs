//! HTML parser for extracting visible text, links and images
//!
//! This module handles parsing HTML content to extract:
//! - Visible text (everything outside script/style/noscript/template)
//! - Links to check and follow (from `<a href>` tags)
//! - Images to check (from `<img src>` tags)

use crate::url::{resolve_link, NormalizedUrl};
use scraper::{Html, Node, Selector};
use std::collections::HashSet;
use thiserror::Error;

/// Elements whose text content is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Visible text with whitespace collapsed to single spaces
    pub text: String,

    /// Distinct link targets in order of first appearance
    pub links: Vec<NormalizedUrl>,

    /// Distinct image sources in order of first appearance
    pub images: Vec<NormalizedUrl>,
}

/// Errors raised when a body cannot be treated as HTML
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("document contains binary data")]
    Binary,

    #[error("malformed document: {0}")]
    Malformed(String),
}

/// The HTML extraction boundary of the crawler
pub trait HtmlParser: Send + Sync {
    fn parse(&self, html: &str, base_url: &NormalizedUrl) -> Result<ParsedPage, ParseError>;
}

/// [`HtmlParser`] built on the `scraper` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperParser;

impl HtmlParser for ScraperParser {
    fn parse(&self, html: &str, base_url: &NormalizedUrl) -> Result<ParsedPage, ParseError> {
        parse_html(html, base_url)
    }
}

/// Parses HTML content and extracts text, links and images
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
/// - `<img src="...">` tags (as images)
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
///
/// Relative URLs resolve against `<base href>` when present, otherwise
/// against `base_url`.
///
/// # Example
///
/// ```
/// use site_inspector::crawler::parse_html;
/// use site_inspector::url::NormalizedUrl;
///
/// let html = r#"<html><body><p>Hello</p><a href="/page">Link</a></body></html>"#;
/// let base_url = NormalizedUrl::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url).unwrap();
/// assert_eq!(parsed.text, "Hello Link");
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &NormalizedUrl) -> Result<ParsedPage, ParseError> {
    if html.contains('\0') {
        return Err(ParseError::Binary);
    }

    let document = Html::parse_document(html);
    let base = document_base(&document, base_url);

    Ok(ParsedPage {
        text: extract_visible_text(&document),
        links: extract_targets(&document, "a[href]", "href", &base)?,
        images: extract_targets(&document, "img[src]", "src", &base)?,
    })
}

/// Resolves the effective base URL, honoring `<base href>`
fn document_base(document: &Html, page_url: &NormalizedUrl) -> NormalizedUrl {
    let Ok(selector) = Selector::parse("base[href]") else {
        return page_url.clone();
    };

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| resolve_link(href, page_url))
        .unwrap_or_else(|| page_url.clone())
}

/// Collects the text of every text node not nested in a hidden element
fn extract_visible_text(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => HIDDEN_ELEMENTS.contains(&element.name()),
            _ => false,
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}

/// Extracts distinct, resolvable targets of `attr` on elements matching `css`
fn extract_targets(
    document: &Html,
    css: &str,
    attr: &str,
    base: &NormalizedUrl,
) -> Result<Vec<NormalizedUrl>, ParseError> {
    let selector = Selector::parse(css).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for element in document.select(&selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(value) = element.value().attr(attr) else {
            continue;
        };

        if let Some(target) = resolve_link(value, base) {
            if seen.insert(target.clone()) {
                targets.push(target);
            }
        }
    }

    Ok(targets)
}
