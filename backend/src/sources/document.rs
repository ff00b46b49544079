//! Template documents.
//!
//! A document contributes two things: its raw text, scanned once for
//! placeholders, and its HTML rendering, which becomes the body template
//! after the table stylesheet is prepended.

use super::extension;
use crate::engine::placeholder::extract;
use crate::error::LoadError;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Stylesheet prepended to every body so tables render with borders.
pub const TABLE_CSS: &str = "
<style>
    table { border-collapse: collapse; width: 100%; margin-bottom: 20px; }
    th, td { border: 1px solid #999999; padding: 8px; text-align: left; }
    th { background-color: #f2f2f2; }
</style>
";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"));

/// A document that can be read as plain text and rendered as HTML.
pub trait DocumentConverter {
    fn extract_raw_text(&self) -> Result<String, LoadError>;
    fn convert_to_html(&self) -> Result<String, LoadError>;
}

/// Markdown source, rendered with table support.
pub struct MarkdownDocument {
    source: String,
}

impl MarkdownDocument {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl DocumentConverter for MarkdownDocument {
    fn extract_raw_text(&self) -> Result<String, LoadError> {
        Ok(self.source.clone())
    }

    fn convert_to_html(&self) -> Result<String, LoadError> {
        let parser = Parser::new_ext(&self.source, Options::ENABLE_TABLES);
        let mut out = String::with_capacity(self.source.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}

/// An HTML fragment or page used as-is.
pub struct HtmlDocument {
    source: String,
}

impl HtmlDocument {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl DocumentConverter for HtmlDocument {
    fn extract_raw_text(&self) -> Result<String, LoadError> {
        Ok(TAG_RE.replace_all(&self.source, "").into_owned())
    }

    fn convert_to_html(&self) -> Result<String, LoadError> {
        Ok(self.source.clone())
    }
}

/// Body template and placeholder set derived from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub body_html: String,
    pub placeholders: BTreeSet<String>,
}

pub fn load_document(converter: &dyn DocumentConverter) -> Result<LoadedDocument, LoadError> {
    let placeholders = extract(&converter.extract_raw_text()?);
    let body_html = format!("{TABLE_CSS}{}", converter.convert_to_html()?);
    Ok(LoadedDocument {
        body_html,
        placeholders,
    })
}

/// Reads a document from disk, choosing the converter by file extension.
pub fn open_document(path: &Path) -> Result<LoadedDocument, LoadError> {
    let ext = extension(path)?;
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| LoadError::Encoding(path.to_path_buf()))?;
    match ext.as_str() {
        "md" | "markdown" | "txt" => load_document(&MarkdownDocument::new(text)),
        "html" | "htm" => load_document(&HtmlDocument::new(text)),
        _ => Err(LoadError::UnsupportedType(ext)),
    }
}
