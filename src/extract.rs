//! Plain-text extraction from filing HTML
//!
//! Modern filings keep their prose in `<p>` elements; older filings and many
//! exhibits put text straight under `<body>`. Extraction takes the paragraph
//! text first and falls back to all body text when that comes up short.

use crate::types::MinLength;
use log::debug;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::OnceLock;

static WHITESPACE: OnceLock<Regex> = OnceLock::new();
static BODY: OnceLock<Selector> = OnceLock::new();

fn whitespace_re() -> &'static Regex {
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

fn body_selector() -> &'static Selector {
    BODY.get_or_init(|| Selector::parse("html > body").expect("valid body selector"))
}

/// Which text nodes of the body to collect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Paragraphs,
    WholeBody,
}

/// Extract normalized text from one document.
///
/// Returns paragraph text unless it is empty or shorter than `min_length`
/// characters, in which case all text under `<body>` is returned instead.
/// Never fails: malformed markup yields whatever text the parser recovers.
pub fn extract_text(html: &str, min_length: MinLength) -> String {
    let document = Html::parse_document(html);

    let Some(body) = document.select(body_selector()).next() else {
        return String::new();
    };

    let text = collect_text(body, Scope::Paragraphs);
    let chars = text.chars().count();
    if chars == 0 || chars < min_length.get() {
        debug!(
            "paragraph text too short ({} < {} chars), using whole body",
            chars,
            min_length.get()
        );
        return collect_text(body, Scope::WholeBody);
    }

    text
}

/// Collapse every whitespace run to a single space
pub fn normalize_whitespace(text: &str) -> String {
    whitespace_re().replace_all(text, " ").into_owned()
}

/// Join the selected text nodes under `body` with single spaces, then normalize
fn collect_text(body: ElementRef<'_>, scope: Scope) -> String {
    let body_id = body.id();

    let pieces: Vec<&str> = body
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some((node, &**text)),
            _ => None,
        })
        .filter(|(node, _)| {
            scope == Scope::WholeBody
                || node
                    .ancestors()
                    .take_while(|a| a.id() != body_id)
                    .any(|a| a.value().as_element().is_some_and(|e| e.name() == "p"))
        })
        .map(|(_, text)| text)
        .collect();

    normalize_whitespace(&pieces.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str, min_length: usize) -> String {
        extract_text(html, MinLength::new(min_length))
    }

    #[test]
    fn test_paragraph_text_preferred() {
        let html = "<html><body><div>Table of contents</div>\
                    <p>Item 2.02 Results of Operations.</p><p>Revenue grew.</p></body></html>";
        assert_eq!(extract(html, 10), "Item 2.02 Results of Operations. Revenue grew.");
    }

    #[test]
    fn test_fallback_without_paragraphs() {
        let html = "<html><body><pre>ANNUAL REPORT\n\n   PURSUANT TO SECTION 13</pre></body></html>";
        assert_eq!(extract(html, 5), "ANNUAL REPORT PURSUANT TO SECTION 13");
    }

    #[test]
    fn test_fallback_when_paragraphs_short() {
        let html = "<html><body><p>Page 1</p><div>The full body text of the exhibit.</div></body></html>";
        assert_eq!(extract(html, 50), "Page 1 The full body text of the exhibit.");
        assert_eq!(extract(html, 6), "Page 1");
    }

    #[test]
    fn test_nested_text_inside_paragraph() {
        let html = "<body><p>Net <b>income</b> rose <font size=2>12%</font></p></body>";
        assert_eq!(extract(html, 0), "Net income rose 12%");
    }

    #[test]
    fn test_plain_sgml_text() {
        let text = "<SEQUENCE>2\n<TEXT>\nEXHIBIT 99.1\n\tPRESS RELEASE\n</TEXT>\n";
        let out = extract(text, 10);
        assert!(out.contains("EXHIBIT 99.1 PRESS RELEASE"), "{:?}", out);
    }

    #[test]
    fn test_malformed_markup_does_not_fail() {
        let html = "<html><body><p>Unclosed <b>bold <table><tr><td>cell</p></div></body>";
        let out = extract(html, 0);
        assert!(out.contains("Unclosed"));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(extract("", 0), "");
        assert_eq!(extract("<html><body></body></html>", 100), "");
    }

    #[test]
    fn test_entities_and_nbsp_collapse() {
        let html = "<body><p>AT&amp;T&nbsp;&nbsp;Inc.\n\n  filed</p></body>";
        assert_eq!(extract(html, 0), "AT&T Inc. filed");
    }

    #[test]
    fn test_normalization_idempotent() {
        let once = normalize_whitespace(" a\t\tb \n\n c ");
        assert_eq!(once, " a b c ");
        assert_eq!(normalize_whitespace(&once), once);

        let html = "<body><p>already normalized text</p></body>";
        let extracted = extract(html, 0);
        assert_eq!(extract(&extracted, 0), extracted);
    }
}
