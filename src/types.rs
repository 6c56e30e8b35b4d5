//! Type definitions for segmented submissions and assembly options

use crate::error::{FilingError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Separator used between assembled documents unless the caller picks another
pub const DEFAULT_SEPARATOR: &str = "-;-";

/// Prefix shared by every exhibit document type
pub const EXHIBIT_PREFIX: &str = "EX-";

/// How the segmenter treats a container whose markers do not line up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SegmentMode {
    /// Single pass over the tags; any defect is a `MalformedSubmission` error
    #[default]
    Strict,
    /// Positional pairing of all start markers, end markers and type labels,
    /// truncated to the shortest list
    Lenient,
}

/// One document block of a submission
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Document {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub body: String,
}

/// Segmented submission: document type -> body, in order of first appearance.
///
/// Inserting a type that already exists replaces the body but keeps the
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    documents: Vec<Document>,
    index: HashMap<String, usize>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, returning the body it replaced if the type was already present
    pub fn insert(&mut self, doc_type: impl Into<String>, body: impl Into<String>) -> Option<String> {
        let doc_type = doc_type.into();
        let body = body.into();

        if let Some(&i) = self.index.get(&doc_type) {
            return Some(std::mem::replace(&mut self.documents[i].body, body));
        }

        self.index.insert(doc_type.clone(), self.documents.len());
        self.documents.push(Document { doc_type, body });
        None
    }

    pub fn get(&self, doc_type: &str) -> Option<&str> {
        self.index
            .get(doc_type)
            .map(|&i| self.documents[i].body.as_str())
    }

    pub fn contains(&self, doc_type: &str) -> bool {
        self.index.contains_key(doc_type)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn doc_types(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.doc_type.as_str())
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

impl<'a> IntoIterator for &'a Submission {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Submission {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut submission = Submission::new();
        for (doc_type, body) in iter {
            submission.insert(doc_type, body);
        }
        submission
    }
}

// Serialized as a JSON object in document order
impl Serialize for Submission {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.documents.len()))?;
        for doc in &self.documents {
            map.serialize_entry(&doc.doc_type, &doc.body)?;
        }
        map.end()
    }
}

/// Minimum paragraph-text length (in characters) below which extraction
/// falls back to the whole body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinLength(usize);

impl MinLength {
    pub const fn new(chars: usize) -> Self {
        MinLength(chars)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for MinLength {
    fn from(chars: usize) -> Self {
        MinLength(chars)
    }
}

impl TryFrom<i64> for MinLength {
    type Error = FilingError;

    fn try_from(value: i64) -> Result<Self> {
        usize::try_from(value).map(MinLength).map_err(|_| {
            FilingError::InvalidArgument(format!("min_length must be non-negative, got {}", value))
        })
    }
}

/// Document type prefixes selected by the assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFilter {
    prefixes: Vec<String>,
}

impl FormFilter {
    pub fn new<I, S>(prefixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        if prefixes.is_empty() || prefixes.iter().any(|p| p.is_empty()) {
            return Err(FilingError::InvalidArgument(
                "form filter needs at least one non-empty prefix".into(),
            ));
        }
        Ok(Self { prefixes })
    }

    /// The primary form type plus every exhibit
    pub fn form_and_exhibits(form: &str) -> Result<Self> {
        Self::new([form, EXHIBIT_PREFIX])
    }

    pub fn matches(&self, doc_type: &str) -> bool {
        self.prefixes.iter().any(|p| doc_type.starts_with(p.as_str()))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for FormFilter {
    /// 8-K current reports and their exhibits
    fn default() -> Self {
        Self {
            prefixes: vec!["8-K".to_string(), EXHIBIT_PREFIX.to_string()],
        }
    }
}

/// Options for assembling a submission into one delimited string
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub min_length: MinLength,
    /// Emit document bodies untouched instead of extracted text
    pub raw_html: bool,
    pub separator: String,
    /// Also build the delimited list of matched document types
    pub include_keys: bool,
    pub filter: FormFilter,
    /// Extract matched documents on the rayon pool
    pub parallel: bool,
}

impl AssembleOptions {
    pub fn new(min_length: MinLength) -> Self {
        Self {
            min_length,
            raw_html: false,
            separator: DEFAULT_SEPARATOR.to_string(),
            include_keys: false,
            filter: FormFilter::default(),
            parallel: false,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_keys(mut self, include_keys: bool) -> Self {
        self.include_keys = include_keys;
        self
    }

    pub fn with_raw_html(mut self, raw_html: bool) -> Self {
        self.raw_html = raw_html;
        self
    }

    pub fn with_filter(mut self, filter: FormFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(FilingError::InvalidArgument("separator must not be empty".into()));
        }
        Ok(())
    }
}

/// Result of assembling a submission
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Assembled {
    /// `type:text<sep>` for every matched document
    pub text: String,
    /// `type<sep>` for every matched document, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<String>,
}
