//! Splitting a raw submission into its `<DOCUMENT>` blocks

use crate::error::{FilingError, Malformation, Result};
use crate::types::{SegmentMode, Submission};
use log::{debug, warn};
use memchr::{memchr, memmem};
use std::borrow::Cow;

// Tag patterns for fast searching
const DOC_START: &[u8] = b"<DOCUMENT>";
const DOC_END: &[u8] = b"</DOCUMENT>";
const TYPE_TAG: &[u8] = b"<TYPE>";

/// Segment a raw submission with the strict single-pass scanner
pub fn segment(raw: &str) -> Result<Submission> {
    segment_with(raw, SegmentMode::Strict)
}

/// Segment a raw submission using the given mode
pub fn segment_with(raw: &str, mode: SegmentMode) -> Result<Submission> {
    match mode {
        SegmentMode::Strict => segment_strict(raw),
        SegmentMode::Lenient => Ok(segment_lenient(raw)),
    }
}

/// Segment raw submission bytes, decoding UTF-8 with a Latin-1 fallback
pub fn segment_bytes(data: &[u8], mode: SegmentMode) -> Result<Submission> {
    segment_with(&decode_text(data), mode)
}

/// A `<DOCUMENT>` block seen but not yet closed
struct OpenBlock {
    start: usize,
    /// Type label and the offset where the body begins (after the type line)
    header: Option<(String, usize)>,
}

fn malformed(offset: usize, kind: Malformation) -> FilingError {
    FilingError::MalformedSubmission { offset, kind }
}

/// One linear scan over the tags. Each `<TYPE>` line is attached to the block
/// that encloses it; the body runs from the end of that line to `</DOCUMENT>`.
fn segment_strict(raw: &str) -> Result<Submission> {
    let data = raw.as_bytes();
    let mut submission = Submission::new();
    let mut open: Option<OpenBlock> = None;
    let mut pos = 0;

    while let Some(rel) = memchr(b'<', &data[pos..]) {
        let at = pos + rel;
        let rest = &data[at..];

        if rest.starts_with(DOC_START) {
            if open.is_some() {
                return Err(malformed(at, Malformation::NestedDocument));
            }
            open = Some(OpenBlock { start: at, header: None });
            pos = at + DOC_START.len();
        } else if rest.starts_with(DOC_END) {
            let block = open.take().ok_or_else(|| malformed(at, Malformation::UnexpectedEnd))?;
            let (label, body_start) = block
                .header
                .ok_or_else(|| malformed(block.start, Malformation::MissingType))?;

            let body = &raw[body_start.min(at)..at];
            debug!("segmented {} ({} bytes)", label, body.len());
            if submission.insert(label.as_str(), body).is_some() {
                warn!("duplicate document type {}; keeping the later block", label);
            }
            pos = at + DOC_END.len();
        } else if rest.starts_with(TYPE_TAG) {
            let value_start = at + TYPE_TAG.len();
            let line_end = memchr(b'\n', &data[value_start..])
                .map(|p| value_start + p)
                .unwrap_or(data.len());
            let label = raw[value_start..line_end].trim_end_matches('\r');

            match open.as_mut() {
                Some(block) if block.header.is_none() && !label.is_empty() => {
                    let body_start = (line_end + 1).min(data.len());
                    block.header = Some((label.to_string(), body_start));
                }
                Some(_) => {}
                None => debug!("ignoring <TYPE> outside a document block at byte {}", at),
            }
            pos = value_start;
        } else {
            pos = at + 1;
        }
    }

    if let Some(block) = open {
        return Err(malformed(block.start, Malformation::UnterminatedDocument));
    }

    Ok(submission)
}

/// Pair the i-th start marker, end marker and type label positionally.
/// Lists of unequal length are truncated to the shortest.
fn segment_lenient(raw: &str) -> Submission {
    let data = raw.as_bytes();

    let starts: Vec<usize> = memmem::find_iter(data, DOC_START)
        .map(|p| p + DOC_START.len())
        .collect();
    let ends: Vec<usize> = memmem::find_iter(data, DOC_END).collect();
    let labels = find_type_labels(raw);

    if starts.len() != ends.len() || starts.len() != labels.len() {
        warn!(
            "marker counts differ (starts={}, ends={}, types={}); truncating to {}",
            starts.len(),
            ends.len(),
            labels.len(),
            starts.len().min(ends.len()).min(labels.len())
        );
    }

    let mut submission = Submission::new();
    for ((label, start), end) in labels.into_iter().zip(starts).zip(ends) {
        let body = if start <= end { &raw[start..end] } else { "" };
        if submission.insert(label, body).is_some() {
            warn!("duplicate document type {}; keeping the later block", label);
        }
    }
    submission
}

/// Every non-empty `<TYPE>` value, up to the end of its line.
/// A match consumes the rest of the line, so later tags on it are skipped.
fn find_type_labels(raw: &str) -> Vec<&str> {
    let data = raw.as_bytes();
    let finder = memmem::Finder::new(TYPE_TAG);
    let mut labels = Vec::new();
    let mut pos = 0;

    while let Some(rel) = finder.find(&data[pos..]) {
        let value_start = pos + rel + TYPE_TAG.len();
        let line_end = memchr(b'\n', &data[value_start..])
            .map(|p| value_start + p)
            .unwrap_or(data.len());

        if line_end > value_start {
            labels.push(&raw[value_start..line_end]);
            pos = line_end;
        } else {
            pos = value_start;
        }
    }

    labels
}

/// Convert bytes to string, trying UTF-8 then Latin-1
pub(crate) fn decode_text(data: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(data) {
        Ok(s) => Cow::Borrowed(s),
        // Latin-1 fallback (every byte is valid)
        Err(_) => Cow::Owned(data.iter().map(|&b| b as char).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_DOCS: &str = "<DOCUMENT><TYPE>8-K\nfoo\n</DOCUMENT><DOCUMENT><TYPE>EX-99.1\nbar\n</DOCUMENT>";

    #[test]
    fn test_segment_well_formed() {
        let sub = segment(TWO_DOCS).unwrap();
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.get("8-K"), Some("foo\n"));
        assert_eq!(sub.get("EX-99.1"), Some("bar\n"));
        assert_eq!(sub.doc_types().collect::<Vec<_>>(), vec!["8-K", "EX-99.1"]);
    }

    #[test]
    fn test_segment_sec_layout() {
        let raw = "<SEC-DOCUMENT>0000950123-10-000001.txt : 20100104\n\
                   <SEC-HEADER>0000950123-10-000001.hdr.sgml : 20100104\n\
                   CONFORMED SUBMISSION TYPE:\t8-K\n\
                   </SEC-HEADER>\n\
                   <DOCUMENT>\n<TYPE>8-K\n<SEQUENCE>1\n<FILENAME>form8k.htm\n<TEXT>\n<html><body><p>Item 8.01</p></body></html>\n</TEXT>\n</DOCUMENT>\n\
                   <DOCUMENT>\n<TYPE>EX-99.1\n<SEQUENCE>2\n<TEXT>\nPress release\n</TEXT>\n</DOCUMENT>\n\
                   </SEC-DOCUMENT>\n";
        let sub = segment(raw).unwrap();
        assert_eq!(sub.len(), 2);
        assert!(sub.get("8-K").unwrap().starts_with("<SEQUENCE>1\n<FILENAME>form8k.htm"));
        assert!(sub.get("EX-99.1").unwrap().ends_with("</TEXT>\n"));
    }

    #[test]
    fn test_segment_crlf_labels() {
        let raw = "<DOCUMENT>\r\n<TYPE>10-K\r\nbody\r\n</DOCUMENT>";
        let sub = segment(raw).unwrap();
        assert_eq!(sub.get("10-K"), Some("body\r\n"));
    }

    #[test]
    fn test_duplicate_type_last_wins() {
        let raw = "<DOCUMENT><TYPE>GRAPHIC\none\n</DOCUMENT><DOCUMENT><TYPE>GRAPHIC\ntwo\n</DOCUMENT>";
        for mode in [SegmentMode::Strict, SegmentMode::Lenient] {
            let sub = segment_with(raw, mode).unwrap();
            assert_eq!(sub.len(), 1);
            assert!(sub.get("GRAPHIC").unwrap().ends_with("two\n"));
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("").unwrap().is_empty());
        assert!(segment_with("", SegmentMode::Lenient).unwrap().is_empty());
    }

    #[test]
    fn test_header_type_ignored_in_strict_mode() {
        let raw = "<SUBMISSION>\n<TYPE>8-K\n</SUBMISSION>\n<DOCUMENT>\n<TYPE>8-K\nbody\n</DOCUMENT>\n";
        let sub = segment(raw).unwrap();
        assert_eq!(sub.get("8-K"), Some("body\n"));
    }

    #[test]
    fn test_second_type_inside_block_is_body() {
        let raw = "<DOCUMENT><TYPE>EX-101.INS\n<TYPE>nested\n</DOCUMENT>";
        let sub = segment(raw).unwrap();
        assert_eq!(sub.get("EX-101.INS"), Some("<TYPE>nested\n"));
    }

    #[test]
    fn test_strict_errors() {
        let cases = [
            ("<DOCUMENT><TYPE>8-K\nfoo", Malformation::UnterminatedDocument, 0),
            ("foo</DOCUMENT>", Malformation::UnexpectedEnd, 3),
            ("<DOCUMENT><TYPE>8-K\n<DOCUMENT>", Malformation::NestedDocument, 20),
            ("xx<DOCUMENT>\nno type\n</DOCUMENT>", Malformation::MissingType, 2),
            ("<DOCUMENT><TYPE>\n</DOCUMENT>", Malformation::MissingType, 0),
        ];
        for (raw, expected, expected_offset) in cases {
            match segment(raw) {
                Err(FilingError::MalformedSubmission { offset, kind }) => {
                    assert_eq!(kind, expected, "{:?}", raw);
                    assert_eq!(offset, expected_offset, "{:?}", raw);
                }
                other => panic!("expected malformed error for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_lenient_slices_from_start_marker() {
        let sub = segment_with(TWO_DOCS, SegmentMode::Lenient).unwrap();
        assert_eq!(sub.get("8-K"), Some("<TYPE>8-K\nfoo\n"));
        assert_eq!(sub.get("EX-99.1"), Some("<TYPE>EX-99.1\nbar\n"));
    }

    #[test]
    fn test_lenient_truncates_to_shortest() {
        // Second block never closes
        let raw = "<DOCUMENT><TYPE>8-K\nfoo\n</DOCUMENT><DOCUMENT><TYPE>EX-99.1\nbar\n";
        let sub = segment_with(raw, SegmentMode::Lenient).unwrap();
        assert_eq!(sub.len(), 1);
        assert!(sub.contains("8-K"));
        assert!(segment(raw).is_err());
    }

    #[test]
    fn test_find_type_labels() {
        let raw = "<TYPE>8-K<TYPE>x\n<TYPE>\n<TYPE>EX-99\n";
        assert_eq!(find_type_labels(raw), vec!["8-K<TYPE>x", "EX-99"]);
    }

    #[test]
    fn test_segment_latin1_bytes() {
        let raw = b"<DOCUMENT><TYPE>EX-99\ncaf\xe9\n</DOCUMENT>";
        let sub = segment_bytes(raw, SegmentMode::Strict).unwrap();
        assert_eq!(sub.get("EX-99"), Some("caf\u{e9}\n"));
    }
}
