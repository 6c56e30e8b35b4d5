//! Python bindings using PyO3

use crate::types::{AssembleOptions, FormFilter, MinLength, SegmentMode};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn to_py_err(e: crate::FilingError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn mode(strict: bool) -> SegmentMode {
    if strict {
        SegmentMode::Strict
    } else {
        SegmentMode::Lenient
    }
}

/// Split a raw submission into (type, body) pairs in document order
#[pyfunction]
#[pyo3(signature = (raw_text, strict=true))]
fn find_documents(raw_text: &str, strict: bool) -> PyResult<Vec<(String, String)>> {
    let submission = crate::segment_with(raw_text, mode(strict)).map_err(to_py_err)?;
    Ok(submission
        .into_documents()
        .into_iter()
        .map(|d| (d.doc_type, d.body))
        .collect())
}

/// Paragraph text, or all body text when paragraphs yield fewer than
/// `min_length` characters
#[pyfunction]
fn extract_text_from_html(html_text: &str, min_length: i64) -> PyResult<String> {
    let min_length = MinLength::try_from(min_length).map_err(to_py_err)?;
    Ok(crate::extract_text(html_text, min_length))
}

/// Assemble the form and exhibit documents of a raw submission.
///
/// Returns `(keys, text)` when `return_keys` is set, otherwise `text`.
#[pyfunction]
#[pyo3(signature = (raw_text, min_length, raw_html=false, separator="-;-", return_keys=false, form="8-K", strict=true))]
fn assemble_filing(
    py: Python<'_>,
    raw_text: &str,
    min_length: i64,
    raw_html: bool,
    separator: &str,
    return_keys: bool,
    form: &str,
    strict: bool,
) -> PyResult<PyObject> {
    let options = AssembleOptions::new(MinLength::try_from(min_length).map_err(to_py_err)?)
        .with_raw_html(raw_html)
        .with_separator(separator)
        .with_keys(return_keys)
        .with_filter(FormFilter::form_and_exhibits(form).map_err(to_py_err)?);

    let submission = crate::segment_with(raw_text, mode(strict)).map_err(to_py_err)?;
    let assembled = py
        .allow_threads(|| crate::assemble(&submission, &options))
        .map_err(to_py_err)?;

    Ok(match assembled.keys {
        Some(keys) => (keys, assembled.text).into_py(py),
        None => assembled.text.into_py(py),
    })
}

/// Python module definition
#[pymodule]
fn secfiling(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(find_documents, m)?)?;
    m.add_function(wrap_pyfunction!(extract_text_from_html, m)?)?;
    m.add_function(wrap_pyfunction!(assemble_filing, m)?)?;
    Ok(())
}
