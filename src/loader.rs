//! Document acquisition: turn source files into ordered page sequences.
//!
//! The retrieval core only sees `(page_number, text)` pairs. This module
//! produces them from plain-text and markdown files, treating a form feed
//! (`\x0c`) as a page boundary. A file without form feeds is a single
//! page numbered 1, mirroring how a fetched URL collapses to one page.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};

/// Supported file extensions for document loading.
const SUPPORTED_EXTENSIONS: &[&str] = &["md", "txt"];

/// Page separator character (form feed).
const PAGE_SEPARATOR: char = '\u{0c}';

/// One logical page of an acquired document.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// 1-based page number, strictly increasing within a document.
    pub page_number: u32,
    /// Raw page text.
    pub text: String,
}

/// Load a single document file into an ordered page sequence.
pub fn load_document(path: &Path) -> Result<Vec<Page>> {
    if !is_supported(path) {
        return Err(Error::UnsupportedDocument(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let pages = pages_from_text(&content);
    tracing::debug!(
        path = %path.display(),
        pages = pages.len(),
        "loaded document"
    );
    Ok(pages)
}

/// Load several document files, preserving input order.
///
/// Files are read in parallel; each file becomes its own page sequence
/// so callers can ingest one document at a time.
pub fn load_documents(paths: &[PathBuf]) -> Result<Vec<Vec<Page>>> {
    paths
        .par_iter()
        .map(|path| load_document(path))
        .collect()
}

/// Split raw text into pages on form-feed boundaries.
///
/// Always yields at least one page; a document without form feeds is a
/// single page numbered 1.
pub fn pages_from_text(content: &str) -> Vec<Page> {
    content
        .split(PAGE_SEPARATOR)
        .enumerate()
        .map(|(i, text)| Page {
            page_number: i as u32 + 1,
            text: text.to_string(),
        })
        .collect()
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_without_form_feeds() {
        let pages = pages_from_text("GET /users returns all users.");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].text, "GET /users returns all users.");
    }

    #[test]
    fn form_feed_splits_pages() {
        let pages = pages_from_text("first page\u{0c}second page\u{0c}third");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].page_number, 2);
        assert_eq!(pages[2].page_number, 3);
        assert_eq!(pages[1].text, "second page");
    }

    #[test]
    fn empty_content_is_one_empty_page() {
        let pages = pages_from_text("");
        assert_eq!(pages.len(), 1);
        assert!(pages[0].text.is_empty());
    }

    #[test]
    fn load_document_rejects_unknown_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("doc.pdf");
        std::fs::write(&path, "binary").unwrap();
        assert!(matches!(
            load_document(&path),
            Err(Error::UnsupportedDocument(_))
        ));
    }

    #[test]
    fn load_documents_preserves_order() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.md");
        let b = tmp.path().join("b.txt");
        std::fs::write(&a, "alpha").unwrap();
        std::fs::write(&b, "beta").unwrap();

        let docs = load_documents(&[a, b]).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0][0].text, "alpha");
        assert_eq!(docs[1][0].text, "beta");
    }
}
