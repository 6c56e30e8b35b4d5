//! Raw submission sources
//!
//! Fetching from the archive is left to callers. A source hands back the raw
//! text of a submission (or of one document in it) for a [`FilingRef`].

use crate::error::{FilingError, Result};
use crate::segment::decode_text;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

const ARCHIVE_BASE: &str = "https://www.sec.gov/Archives/edgar/data";

/// One filing submission: company CIK plus accession number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilingRef {
    cik: u64,
    /// Dashed form, e.g. `0000950123-10-012345`
    accession: String,
}

impl FilingRef {
    /// Accepts a CIK of up to ten digits (leading zeros allowed) and an
    /// accession number with or without dashes.
    pub fn new(cik: &str, accession: &str) -> Result<Self> {
        let cik = cik.trim();
        if cik.is_empty() || cik.len() > 10 || !cik.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FilingError::InvalidArgument(format!(
                "CIK must be one to ten digits, got {:?}",
                cik
            )));
        }
        let cik = cik
            .parse::<u64>()
            .map_err(|e| FilingError::InvalidArgument(format!("CIK {:?}: {}", cik, e)))?;

        Ok(Self {
            cik,
            accession: normalize_accession(accession)?,
        })
    }

    pub fn cik(&self) -> u64 {
        self.cik
    }

    /// CIK zero-padded to ten digits
    pub fn padded_cik(&self) -> String {
        format!("{:010}", self.cik)
    }

    pub fn accession(&self) -> &str {
        &self.accession
    }

    /// Accession number with dashes removed, as used for archive folders
    pub fn accession_folder(&self) -> String {
        self.accession.replace('-', "")
    }

    /// URL of the complete submission text file
    pub fn submission_url(&self) -> String {
        format!(
            "{}/{}/{}/{}.txt",
            ARCHIVE_BASE,
            self.cik,
            self.accession_folder(),
            self.accession
        )
    }

    /// URL of a single document (e.g. the primary document) of the filing
    pub fn document_url(&self, name: &str) -> String {
        format!("{}/{}/{}/{}", ARCHIVE_BASE, self.cik, self.accession_folder(), name)
    }
}

impl fmt::Display for FilingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cik, self.accession)
    }
}

fn normalize_accession(accession: &str) -> Result<String> {
    let accession = accession.trim();
    let digits: String = accession.chars().filter(|c| *c != '-').collect();

    let dashed_ok = accession.len() == 20
        && accession.as_bytes()[10] == b'-'
        && accession.as_bytes()[13] == b'-';
    let plain_ok = accession.len() == 18;

    if digits.len() != 18 || !digits.bytes().all(|b| b.is_ascii_digit()) || !(dashed_ok || plain_ok) {
        return Err(FilingError::InvalidArgument(format!(
            "accession number must look like 0000950123-10-012345, got {:?}",
            accession
        )));
    }

    Ok(format!("{}-{}-{}", &digits[..10], &digits[10..12], &digits[12..]))
}

fn check_document_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." || name == "." {
        return Err(FilingError::InvalidArgument(format!(
            "invalid document name {:?}",
            name
        )));
    }
    Ok(())
}

/// Supplies raw filing text for the pipeline
pub trait SubmissionSource {
    /// Full submission text (all `<DOCUMENT>` blocks)
    fn fetch_submission(&self, filing: &FilingRef) -> Result<String>;

    /// One document of the filing by file name
    fn fetch_document(&self, filing: &FilingRef, name: &str) -> Result<String>;
}

/// Reads filings laid out like the archive: `{root}/{cik}/{accession folder}/...`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn filing_dir(&self, filing: &FilingRef) -> PathBuf {
        self.root
            .join(filing.cik().to_string())
            .join(filing.accession_folder())
    }

    pub fn submission_path(&self, filing: &FilingRef) -> PathBuf {
        self.filing_dir(filing)
            .join(format!("{}.txt", filing.accession()))
    }

    pub fn document_path(&self, filing: &FilingRef, name: &str) -> Result<PathBuf> {
        check_document_name(name)?;
        Ok(self.filing_dir(filing).join(name))
    }
}

impl SubmissionSource for DirectorySource {
    fn fetch_submission(&self, filing: &FilingRef) -> Result<String> {
        read_text_file(&self.submission_path(filing))
    }

    fn fetch_document(&self, filing: &FilingRef, name: &str) -> Result<String> {
        read_text_file(&self.document_path(filing, name)?)
    }
}

/// Read a file using memory mapping, decoding UTF-8 with a Latin-1 fallback
pub fn read_text_file(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FilingError::NotFound(path.display().to_string()),
        _ => FilingError::Io(e),
    })?;

    if file.metadata()?.len() == 0 {
        return Ok(String::new());
    }

    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    debug!("read {} ({} bytes)", path.display(), mmap.len());
    Ok(decode_text(&mmap).into_owned())
}

/// Filings held in memory, keyed by accession number
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    submissions: HashMap<String, String>,
    documents: HashMap<(String, String), String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submission(mut self, filing: &FilingRef, raw: impl Into<String>) -> Self {
        self.submissions
            .insert(filing.accession().to_string(), raw.into());
        self
    }

    pub fn with_document(mut self, filing: &FilingRef, name: &str, body: impl Into<String>) -> Self {
        self.documents.insert(
            (filing.accession().to_string(), name.to_string()),
            body.into(),
        );
        self
    }
}

impl SubmissionSource for MemorySource {
    fn fetch_submission(&self, filing: &FilingRef) -> Result<String> {
        self.submissions
            .get(filing.accession())
            .cloned()
            .ok_or_else(|| FilingError::NotFound(filing.submission_url()))
    }

    fn fetch_document(&self, filing: &FilingRef, name: &str) -> Result<String> {
        self.documents
            .get(&(filing.accession().to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| FilingError::NotFound(filing.document_url(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filing_ref_urls() {
        let filing = FilingRef::new("320193", "0000320193-23-000106").unwrap();
        assert_eq!(filing.padded_cik(), "0000320193");
        assert_eq!(filing.accession_folder(), "000032019323000106");
        assert_eq!(
            filing.submission_url(),
            "https://www.sec.gov/Archives/edgar/data/320193/000032019323000106/0000320193-23-000106.txt"
        );
        assert_eq!(
            filing.document_url("aapl-20230930.htm"),
            "https://www.sec.gov/Archives/edgar/data/320193/000032019323000106/aapl-20230930.htm"
        );
    }

    #[test]
    fn test_filing_ref_normalizes() {
        let a = FilingRef::new("0000320193", "000032019323000106").unwrap();
        let b = FilingRef::new("320193", "0000320193-23-000106").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "320193/0000320193-23-000106");
    }

    #[test]
    fn test_filing_ref_rejects_bad_input() {
        assert!(FilingRef::new("12345678901", "0000320193-23-000106").is_err());
        assert!(FilingRef::new("12a", "0000320193-23-000106").is_err());
        assert!(FilingRef::new("", "0000320193-23-000106").is_err());
        assert!(FilingRef::new("320193", "0000320193-2-3000106").is_err());
        assert!(FilingRef::new("320193", "abc").is_err());
    }

    #[test]
    fn test_memory_source() {
        let filing = FilingRef::new("320193", "0000320193-23-000106").unwrap();
        let source = MemorySource::new()
            .with_submission(&filing, "<DOCUMENT>")
            .with_document(&filing, "main.htm", "<p>x</p>");

        assert_eq!(source.fetch_submission(&filing).unwrap(), "<DOCUMENT>");
        assert_eq!(source.fetch_document(&filing, "main.htm").unwrap(), "<p>x</p>");
        assert!(matches!(
            source.fetch_document(&filing, "other.htm"),
            Err(FilingError::NotFound(_))
        ));
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        let filing = FilingRef::new("320193", "0000320193-23-000106").unwrap();
        let source = DirectorySource::new(dir.path());

        let folder = dir.path().join("320193").join("000032019323000106");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("0000320193-23-000106.txt"), "raw submission").unwrap();
        std::fs::write(folder.join("main.htm"), b"caf\xe9").unwrap();
        std::fs::write(folder.join("empty.htm"), b"").unwrap();

        assert_eq!(source.fetch_submission(&filing).unwrap(), "raw submission");
        assert_eq!(source.fetch_document(&filing, "main.htm").unwrap(), "caf\u{e9}");
        assert_eq!(source.fetch_document(&filing, "empty.htm").unwrap(), "");
        assert!(matches!(
            source.fetch_document(&filing, "missing.htm"),
            Err(FilingError::NotFound(_))
        ));
        assert!(matches!(
            source.fetch_document(&filing, "../secret"),
            Err(FilingError::InvalidArgument(_))
        ));
    }
}
