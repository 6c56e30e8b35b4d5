//! SEC EDGAR filing text extraction
//!
//! Splits a raw submission into its `<DOCUMENT>` blocks, extracts plain text
//! from each block's HTML and assembles selected documents into one
//! delimited string.

mod assemble;
mod error;
mod extract;
mod segment;
mod types;
pub mod lexicon;
pub mod source;

#[cfg(feature = "python")]
mod python;

pub use assemble::assemble;
pub use error::{FilingError, Malformation, Result};
pub use extract::{extract_text, normalize_whitespace};
pub use lexicon::{CategoryCounts, Lexicon, LexiconVectorizer, VectorizeOptions};
pub use segment::{segment, segment_bytes, segment_with};
pub use source::{DirectorySource, FilingRef, MemorySource, SubmissionSource};
pub use types::{
    AssembleOptions, Assembled, Document, FormFilter, MinLength, SegmentMode, Submission,
    DEFAULT_SEPARATOR, EXHIBIT_PREFIX,
};

/// Fetch a submission, segment it and assemble the documents the options select
/// (by default the 8-K and its exhibits).
pub fn filing_and_exhibits<S: SubmissionSource + ?Sized>(
    source: &S,
    filing: &FilingRef,
    mode: SegmentMode,
    options: &AssembleOptions,
) -> Result<Assembled> {
    options.validate()?;

    let raw = source.fetch_submission(filing)?;
    log::debug!("fetched {} ({} bytes)", filing, raw.len());

    let submission = segment_with(&raw, mode)?;
    assemble(&submission, options)
}

/// Fetch one document of a filing (typically the primary 10-K/10-Q document)
/// and return its raw HTML or its extracted text.
pub fn primary_document_text<S: SubmissionSource + ?Sized>(
    source: &S,
    filing: &FilingRef,
    name: &str,
    min_length: MinLength,
    raw_html: bool,
) -> Result<String> {
    let html = source.fetch_document(filing, name)?;
    if raw_html {
        return Ok(html);
    }
    Ok(extract_text(&html, min_length))
}
