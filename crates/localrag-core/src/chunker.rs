//! Splits document text into ordered, trimmed, non-empty fragments.
//!
//! The default boundary is a blank line (a line that is empty or holds only
//! whitespace). Optionally, fragments longer than `max_words` are cut into
//! overlapping word windows.

use serde::{Deserialize, Serialize};

use crate::types::PendingFragment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Blank-line separated paragraphs.
    #[default]
    Paragraph,
    /// Every non-blank line is its own fragment.
    Line,
    /// A literal separator string, e.g. `"---"`.
    Separator(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub boundary: Boundary,
    pub max_words: Option<usize>,
    pub overlap_percent: f32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { boundary: Boundary::Paragraph, max_words: None, overlap_percent: 0.2 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split `text` into fragments in document order.
    ///
    /// Whitespace-only input yields an empty vector; input without any
    /// boundary yields the whole trimmed text as a single fragment.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = match &self.config.boundary {
            Boundary::Paragraph => split_paragraphs(text),
            Boundary::Line => text.lines().collect(),
            Boundary::Separator(sep) if sep.is_empty() => vec![text],
            Boundary::Separator(sep) => text.split(sep.as_str()).collect(),
        };

        let mut fragments = Vec::new();
        for piece in pieces {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            match self.config.max_words {
                Some(max) if piece.split_whitespace().count() > max => {
                    fragments.extend(self.split_with_overlap(piece, max));
                }
                _ => fragments.push(piece.to_string()),
            }
        }
        fragments
    }

    /// Chunk `text` and tag each fragment with its source and position.
    pub fn pending(&self, text: &str, source: &str) -> Vec<PendingFragment> {
        self.chunk(text)
            .into_iter()
            .enumerate()
            .map(|(sequence_index, text)| PendingFragment {
                source: source.to_string(),
                text,
                sequence_index,
            })
            .collect()
    }

    fn split_with_overlap(&self, piece: &str, max_words: usize) -> Vec<String> {
        let words: Vec<&str> = piece.split_whitespace().collect();
        let max_words = max_words.max(1);
        let overlap = (max_words as f32 * self.config.overlap_percent) as usize;
        let step = max_words.saturating_sub(overlap).max(1);

        let mut windows = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + max_words).min(words.len());
            windows.push(words[start..end].join(" "));
            if end >= words.len() {
                break;
            }
            start += step;
        }
        windows
    }
}

/// Slices of `text` between blank lines, original line breaks preserved.
fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                paragraphs.push(&text[s..end]);
            }
        } else {
            start.get_or_insert(line_start);
            end = offset;
        }
    }
    if let Some(s) = start {
        paragraphs.push(&text[s..end]);
    }
    paragraphs
}
