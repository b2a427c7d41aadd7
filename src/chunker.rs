//! Chunking of paged documents into overlapping retrieval units.
//!
//! Page texts are concatenated into one buffer with per-page span
//! bookkeeping, then a fixed-size sliding window walks the buffer. Each
//! emitted chunk is tagged with the page covering its start offset and
//! the most recent section marker at or before it.
//!
//! Offsets are measured in characters so windows never split a UTF-8
//! sequence; slicing goes through a char-to-byte table.

use serde::Serialize;

use crate::{
    loader::Page,
    sections::SectionPatterns,
};

/// Default chunk length in characters (roughly 800 tokens).
pub const DEFAULT_CHUNK_SIZE: usize = 3200;

/// Default overlap between adjacent chunks in characters (roughly 150
/// tokens).
pub const DEFAULT_OVERLAP: usize = 600;

/// Sliding-window settings for the chunker.
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters.
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

/// Provenance metadata attached to a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkMetadata {
    /// Page whose span contains the chunk's start offset. `None` only
    /// when no page boundary could be attributed.
    pub page_number: Option<u32>,
    /// Label of the most recent section marker at or before the chunk's
    /// start offset. `None` when no marker precedes the chunk.
    pub section_name: Option<String>,
}

/// A bounded, possibly-overlapping span of document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// The chunk text content.
    pub text: String,
    /// Provenance metadata, fixed at creation.
    pub metadata: ChunkMetadata,
}

/// Chunk pages using the default API-documentation section patterns.
pub fn chunk_pages(pages: &[Page], config: &ChunkerConfig) -> Vec<Chunk> {
    chunk_pages_with(pages, config, &SectionPatterns::default())
}

/// Chunk pages with an explicit section-detection strategy.
///
/// The same page sequence always produces the same chunk sequence,
/// byte for byte. An empty page sequence (or one whose pages are all
/// empty) produces no chunks.
pub fn chunk_pages_with(
    pages: &[Page],
    config: &ChunkerConfig,
    patterns: &SectionPatterns,
) -> Vec<Chunk> {
    // Concatenate page texts, recording the half-open char span each
    // page occupies in the buffer.
    let mut buffer = String::new();
    let mut page_spans: Vec<(usize, usize, u32)> = Vec::new();
    let mut cursor = 0usize;
    for page in pages {
        let len = page.text.chars().count();
        buffer.push_str(&page.text);
        page_spans.push((cursor, cursor + len, page.page_number));
        cursor += len;
    }

    let total_chars = cursor;
    if total_chars == 0 {
        return Vec::new();
    }

    // Char index -> byte index, with a sentinel for the buffer end.
    let char_to_byte: Vec<usize> = buffer
        .char_indices()
        .map(|(byte_idx, _)| byte_idx)
        .chain(std::iter::once(buffer.len()))
        .collect();

    // Section markers, converted from byte to char offsets. The marker
    // list stays sorted because the conversion is monotone.
    let markers: Vec<(usize, &'static str)> = patterns
        .markers(&buffer)
        .into_iter()
        .map(|m| (byte_to_char(&char_to_byte, m.offset), m.name))
        .collect();

    let stride = config.chunk_size.saturating_sub(config.overlap);
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < total_chars {
        let end = (start + config.chunk_size).min(total_chars);
        let text = buffer[char_to_byte[start]..char_to_byte[end]].to_string();

        let page_number = page_spans
            .iter()
            .find(|(span_start, span_end, _)| {
                *span_start <= start && start < *span_end
            })
            .map(|(_, _, number)| *number);

        let section_name = markers
            .iter()
            .rev()
            .find(|(offset, _)| *offset <= start)
            .map(|(_, name)| (*name).to_string());

        chunks.push(Chunk {
            text,
            metadata: ChunkMetadata {
                page_number,
                section_name,
            },
        });

        // A degenerate stride can never advance the window; emit the
        // first chunk and stop instead of looping forever.
        if stride == 0 {
            break;
        }
        start += stride;
    }

    tracing::debug!(
        pages = pages.len(),
        chars = total_chars,
        chunks = chunks.len(),
        "chunked document"
    );
    chunks
}

fn byte_to_char(char_to_byte: &[usize], byte_offset: usize) -> usize {
    char_to_byte.partition_point(|&b| b < byte_offset)
}
