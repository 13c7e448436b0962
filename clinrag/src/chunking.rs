//! Document chunking.
//!
//! [`ParagraphChunker`] splits on paragraph boundaries first and falls back
//! to fixed-width character windows with overlap for oversized paragraphs, so
//! no semantic unit longer than `chunk_size` is silently dropped.

/// A strategy for splitting document text into ordered fragments.
///
/// Fragments are the unit of embedding and indexing. Empty input produces an
/// empty fragment list, not an error.
pub trait Chunker: Send + Sync {
    /// Split text into ordered fragments.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text on blank-line paragraph boundaries, merging paragraphs up to
/// `chunk_size` characters and windowing oversized paragraphs with
/// `chunk_overlap` characters of overlap.
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ParagraphChunker {
    /// Create a new `ParagraphChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per fragment
    /// * `chunk_overlap` — overlap between consecutive windowed fragments
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Default for ParagraphChunker {
    fn default() -> Self {
        let config = crate::PipelineConfig::default();
        Self::new(config.chunk_size, config.chunk_overlap)
    }
}

/// Largest index `<= at` that lands on a char boundary of `text`.
fn floor_char_boundary(text: &str, at: usize) -> usize {
    if at >= text.len() {
        return text.len();
    }
    let mut index = at;
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Fixed-width character windows with overlap between consecutive windows.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let end = floor_char_boundary(text, start + chunk_size);
        chunks.push(text[start..end].to_string());
        if end == text.len() {
            break;
        }
        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 {
            break;
        }
        start = floor_char_boundary(text, start + step);
    }
    chunks
}

impl Chunker for ParagraphChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut current = String::new();

        for paragraph in text.split("\n\n") {
            let paragraph = paragraph.trim_matches('\n');
            if paragraph.is_empty() {
                continue;
            }

            if paragraph.len() > self.chunk_size {
                // Oversized paragraph: flush what we have, then window it.
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                chunks.extend(split_by_size(paragraph, self.chunk_size, self.chunk_overlap));
            } else if current.is_empty() {
                current = paragraph.to_string();
            } else if current.len() + 2 + paragraph.len() <= self.chunk_size {
                current.push_str("\n\n");
                current.push_str(paragraph);
            } else {
                chunks.push(std::mem::replace(&mut current, paragraph.to_string()));
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}
