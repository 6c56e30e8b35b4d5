//! Error types for submission segmentation and text extraction

use std::fmt;
use thiserror::Error;

/// The container defect found by the strict segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformation {
    /// `<DOCUMENT>` opened but input ended before `</DOCUMENT>`
    UnterminatedDocument,
    /// `</DOCUMENT>` with no open block
    UnexpectedEnd,
    /// `<DOCUMENT>` while another block is still open
    NestedDocument,
    /// Block closed without a `<TYPE>` line
    MissingType,
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformation::UnterminatedDocument => write!(f, "unterminated <DOCUMENT> block"),
            Malformation::UnexpectedEnd => write!(f, "</DOCUMENT> without matching <DOCUMENT>"),
            Malformation::NestedDocument => write!(f, "<DOCUMENT> inside an open block"),
            Malformation::MissingType => write!(f, "<DOCUMENT> block without a <TYPE> line"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FilingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed submission at byte {offset}: {kind}")]
    MalformedSubmission { offset: usize, kind: Malformation },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FilingError>;
