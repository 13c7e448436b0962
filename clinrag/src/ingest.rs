//! PDF document ingestion: file discovery, text extraction, and metadata.
//!
//! Text extraction uses `pdf-extract`; the document information dictionary
//! (title, author, subject, keywords) is read with `lopdf`. Both failure
//! modes surface as [`RagError::Parse`] so a batch ingest can skip the
//! offending file and continue.

use std::path::Path;

use chrono::Utc;
use lopdf::{Dictionary, Object};
use tracing::debug;
use uuid::Uuid;

use crate::document::{DocumentMetadata, SourceDocument};
use crate::error::{RagError, Result};

/// List the PDF file names in a directory, sorted for deterministic batch
/// order. Not recursive.
pub fn list_pdf_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(RagError::InvalidArgument(format!(
            "document directory not found: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| {
        RagError::InvalidArgument(format!("cannot read directory {}: {e}", dir.display()))
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| {
            RagError::InvalidArgument(format!("cannot read directory {}: {e}", dir.display()))
        })?;
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if path.is_file() && is_pdf {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                files.push(name.to_string());
            }
        }
    }
    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "listed pdf files");
    Ok(files)
}

/// Load one PDF into a [`SourceDocument`]: extracted text plus metadata.
///
/// # Errors
///
/// Returns [`RagError::Parse`] when the file cannot be read or its text
/// cannot be extracted. Callers ingesting a batch should log and skip.
pub fn load_document(dir: &Path, file_name: &str) -> Result<SourceDocument> {
    let path = dir.join(file_name);
    let text = extract_text(&path, file_name)?;
    let metadata = extract_metadata(&path, file_name)?;
    Ok(SourceDocument { name: file_name.to_string(), text, metadata })
}

/// Extract the full text of a PDF.
pub fn extract_text(path: &Path, file_name: &str) -> Result<String> {
    pdf_extract::extract_text(path).map_err(|e| RagError::Parse {
        document: file_name.to_string(),
        message: format!("text extraction failed: {e}"),
    })
}

/// Extract [`DocumentMetadata`] from a PDF's document information dictionary.
///
/// Absent fields stay `None`; the `Keywords` entry is split on commas into
/// tags. A fresh `document_id` is generated per call.
pub fn extract_metadata(path: &Path, file_name: &str) -> Result<DocumentMetadata> {
    let doc = lopdf::Document::load(path).map_err(|e| RagError::Parse {
        document: file_name.to_string(),
        message: format!("cannot open pdf: {e}"),
    })?;

    let info = info_dictionary(&doc);
    let title = info.and_then(|d| info_string(d, b"Title"));
    let author = info.and_then(|d| info_string(d, b"Author"));
    let description = info.and_then(|d| info_string(d, b"Subject"));
    let tags = info
        .and_then(|d| info_string(d, b"Keywords"))
        .map(|keywords| {
            keywords
                .split(',')
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(DocumentMetadata {
        document_id: Uuid::new_v4(),
        document_name: file_name.to_string(),
        document_date: Utc::now().date_naive(),
        title,
        author,
        description,
        tags,
    })
}

/// Resolve the trailer's `Info` entry to its dictionary, following one
/// reference indirection if needed.
fn info_dictionary(doc: &lopdf::Document) -> Option<&Dictionary> {
    let info = doc.trailer.get(b"Info").ok()?;
    let info = match info {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    info.as_dict().ok()
}

/// Read a string entry from the info dictionary, decoding UTF-16BE strings
/// (BOM-prefixed, common in PDF metadata) and treating everything else as
/// UTF-8 with lossy fallback.
fn info_string(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let value = match dict.get(key).ok()? {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        _ => return None,
    };
    let value = value.trim().to_string();
    if value.is_empty() { None } else { Some(value) }
}

fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
