//! Filter-and-concatenate view over a segmented submission

use crate::error::Result;
use crate::extract::extract_text;
use crate::types::{AssembleOptions, Assembled, Document, Submission};
use log::debug;
use rayon::prelude::*;

/// Concatenate `type:text<sep>` for every document the filter selects, in
/// submission order. Every entry, the last included, ends with the separator.
pub fn assemble(submission: &Submission, options: &AssembleOptions) -> Result<Assembled> {
    options.validate()?;

    let matched: Vec<&Document> = submission
        .iter()
        .filter(|doc| options.filter.matches(&doc.doc_type))
        .collect();

    debug!(
        "assembling {} of {} documents",
        matched.len(),
        submission.len()
    );

    // Per-document content; extraction cannot fail, so one bad document
    // never drops its siblings
    let contents: Vec<String> = if options.raw_html {
        matched.iter().map(|doc| doc.body.clone()).collect()
    } else if options.parallel && matched.len() > 1 {
        matched
            .par_iter()
            .map(|doc| extract_text(&doc.body, options.min_length))
            .collect()
    } else {
        matched
            .iter()
            .map(|doc| extract_text(&doc.body, options.min_length))
            .collect()
    };

    let sep = options.separator.as_str();
    let mut text = String::new();
    let mut keys = options.include_keys.then(String::new);

    for (doc, content) in matched.iter().zip(&contents) {
        text.push_str(&doc.doc_type);
        text.push(':');
        text.push_str(content);
        text.push_str(sep);

        if let Some(keys) = keys.as_mut() {
            keys.push_str(&doc.doc_type);
            keys.push_str(sep);
        }
    }

    Ok(Assembled { text, keys })
}
