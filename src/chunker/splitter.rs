//! Overlapping splitter with a boundary cascade

use super::ChunkingConfig;
use crate::core::error::ConfigResult;

/// Boundary kinds tried when choosing where a chunk ends, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryLevel {
    Paragraph,
    Sentence,
    Line,
    Word,
}

impl BoundaryLevel {
    /// Order of preference
    pub const CASCADE: [BoundaryLevel; 4] = [
        BoundaryLevel::Paragraph,
        BoundaryLevel::Sentence,
        BoundaryLevel::Line,
        BoundaryLevel::Word,
    ];

    /// Separators that close a segment at this level.
    /// A chunk that ends on a separator keeps it.
    pub fn separators(&self) -> &'static [&'static str] {
        match self {
            BoundaryLevel::Paragraph => &["\n\n"],
            BoundaryLevel::Sentence => &[". ", "! ", "? ", ".\n", "!\n", "?\n"],
            BoundaryLevel::Line => &["\n"],
            BoundaryLevel::Word => &[" ", "\t"],
        }
    }
}

/// One chunk plus its character span in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position in insertion order
    pub index: usize,
    /// Chunk content, `source[start..end]` in characters
    pub text: String,
    /// First character (inclusive)
    pub start: usize,
    /// Last character (exclusive)
    pub end: usize,
}

/// Character-based splitter with a fixed overlap.
///
/// Every chunk after the first starts exactly `overlap` characters before the
/// end of its predecessor, so dropping the first `overlap` characters of each
/// later chunk and concatenating reproduces the input.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker; fails unless `0 <= overlap < chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> ConfigResult<Self> {
        ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
        }
        .validate()?;

        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> ConfigResult<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into chunk strings
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with_spans(text)
            .into_iter()
            .map(|chunk| chunk.text)
            .collect()
    }

    /// Split text and keep the character span of every chunk
    pub fn split_with_spans(&self, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();

        if total == 0 {
            return chunks;
        }

        let mut start = 0;
        loop {
            let window_end = (start + self.chunk_size).min(total);
            let end = if window_end == total {
                total
            } else {
                self.find_break(&chars, start, window_end)
            };

            chunks.push(TextChunk {
                index: chunks.len(),
                text: chars[start..end].iter().collect(),
                start,
                end,
            });

            if end == total {
                break;
            }
            start = end - self.overlap;
        }

        tracing::debug!(
            chars = total,
            chunks = chunks.len(),
            chunk_size = self.chunk_size,
            overlap = self.overlap,
            "Split text into chunks"
        );

        chunks
    }

    /// Pick the end of the chunk starting at `start`.
    ///
    /// Candidates must leave the chunk longer than the overlap (so the next
    /// chunk starts further right) and not shorter than a third of the chunk
    /// size (so an early paragraph break does not produce a sliver).
    fn find_break(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        let min_len = (self.overlap + 1).max(self.chunk_size / 3);
        let min_end = start + min_len;

        for level in BoundaryLevel::CASCADE {
            let best = level
                .separators()
                .iter()
                .filter_map(|sep| last_separator_end(chars, start, window_end, sep))
                .filter(|&end| end >= min_end)
                .max();

            if let Some(end) = best {
                return end;
            }
        }

        window_end
    }
}

/// Position just past the last occurrence of `sep` inside `chars[start..window_end]`
fn last_separator_end(chars: &[char], start: usize, window_end: usize, sep: &str) -> Option<usize> {
    let sep: Vec<char> = sep.chars().collect();
    if sep.is_empty() || window_end - start < sep.len() {
        return None;
    }

    let mut pos = window_end - sep.len();
    loop {
        if chars[pos..pos + sep.len()] == sep[..] {
            return Some(pos + sep.len());
        }
        if pos == start {
            return None;
        }
        pos -= 1;
    }
}

/// Split `text` into chunks of at most `chunk_size` characters with
/// `overlap` characters shared between neighbours.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> ConfigResult<Vec<String>> {
    Ok(Chunker::new(chunk_size, overlap)?.split(text))
}
