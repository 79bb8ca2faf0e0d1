//! Transcript chunking.
//!
//! Splits a transcript into overlapping, bounded-length chunks for embedding. Lengths and
//! offsets are counted in characters (Unicode scalar values), never bytes.
//!
//! Chunk `i + 1` always starts exactly `chunk_overlap` characters before chunk `i` ends,
//! so removing the overlap from every chunk but the first and concatenating reproduces the
//! input. Within that constraint each cut is placed on the most natural boundary
//! available: paragraph, then line, then sentence, then word, then a hard cut.

use crate::error::{Result, TubechatError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A contiguous segment of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk in the document.
    pub order: usize,
    /// Chunk text.
    pub text: String,
}

impl Chunk {
    pub fn new(order: usize, text: String) -> Self {
        Self { order, text }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Boundary kinds, in order of preference.
#[derive(Debug, Clone, Copy)]
enum Boundary {
    Paragraph,
    Line,
    Sentence,
    Word,
}

impl Boundary {
    const PREFERENCE: [Boundary; 4] = [
        Boundary::Paragraph,
        Boundary::Line,
        Boundary::Sentence,
        Boundary::Word,
    ];

    /// Whether a cut right before `chars[pos]` lands just after this boundary.
    fn ends_at(self, chars: &[char], pos: usize) -> bool {
        match self {
            Boundary::Paragraph => pos >= 2 && chars[pos - 2] == '\n' && chars[pos - 1] == '\n',
            Boundary::Line => pos >= 1 && chars[pos - 1] == '\n',
            Boundary::Sentence => {
                pos >= 2 && chars[pos - 1].is_whitespace() && matches!(chars[pos - 2], '.' | '?' | '!')
            }
            Boundary::Word => pos >= 1 && chars[pos - 1].is_whitespace(),
        }
    }
}

/// Fixed-size splitter with character overlap.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a splitter. Requires `0 <= chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(TubechatError::Config("chunk_size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(TubechatError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Split `text` into ordered chunks. Blank text yields no chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            if total - start <= self.chunk_size {
                chunks.push(Chunk::new(chunks.len(), chars[start..].iter().collect()));
                break;
            }

            let end = self.find_cut(&chars, start);
            chunks.push(Chunk::new(chunks.len(), chars[start..end].iter().collect()));
            start = end - self.chunk_overlap;
        }

        debug!(
            "Split {} characters into {} chunks (size {}, overlap {})",
            total,
            chunks.len(),
            self.chunk_size,
            self.chunk_overlap
        );
        chunks
    }

    /// Choose the end of the chunk starting at `start`.
    ///
    /// The cut must leave the chunk longer than the overlap so the next chunk makes
    /// progress, and no longer than `chunk_size`. Boundaries in the upper half of that
    /// range are tried first, so a paragraph break just past the overlap cannot produce a
    /// chunk that is almost entirely overlap.
    fn find_cut(&self, chars: &[char], start: usize) -> usize {
        let lowest = start + self.chunk_overlap + 1;
        let highest = start + self.chunk_size;
        let preferred = lowest.max(start + self.chunk_size / 2);

        for floor in [preferred, lowest] {
            for boundary in Boundary::PREFERENCE {
                if let Some(pos) = (floor..=highest).rev().find(|&pos| boundary.ends_at(chars, pos)) {
                    return pos;
                }
            }
        }
        highest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str, size: usize, overlap: usize) -> Result<Vec<Chunk>> {
        Ok(TextSplitter::new(size, overlap)?.split(text))
    }

    fn reconstruct(chunks: &[Chunk], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let skip = if i == 0 { 0 } else { overlap };
            out.extend(chunk.text.chars().skip(skip));
        }
        out
    }

    fn assert_invariants(text: &str, size: usize, overlap: usize) {
        let chunks = split(text, size, overlap).unwrap();

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.order, i);
            assert!(!chunk.text.is_empty());
            assert!(chunk.char_len() <= size, "chunk {} too long", i);
        }

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next: Vec<char> = pair[1].text.chars().collect();
            assert_eq!(&prev[prev.len() - overlap..], &next[..overlap]);
        }

        assert_eq!(reconstruct(&chunks, overlap), text);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(split("", 100, 10).unwrap().is_empty());
        assert!(split("   \n\n ", 100, 10).unwrap().is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = split("Alice said hello. Bob replied hi.", 1000, 200).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Alice said hello. Bob replied hi.");
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(100, 150).is_err());
        assert!(TextSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn test_prefers_sentence_boundaries() {
        let chunks = split("Alice said hello. Bob replied hi. Carol waved.", 20, 0).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Alice said hello. ", "Bob replied hi. ", "Carol waved."]);
    }

    #[test]
    fn test_prefers_paragraph_over_word() {
        let text = "First paragraph here.\n\nSecond paragraph is a bit longer than the first one.";
        let chunks = split(text, 40, 0).unwrap();
        assert_eq!(chunks[0].text, "First paragraph here.\n\n");
    }

    #[test]
    fn test_early_paragraph_break_does_not_stall() {
        let paragraph = "word ".repeat(199) + "end.\n\n";
        let text = paragraph.repeat(20);
        let chunks = split(&text, 1000, 200).unwrap();

        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.char_len() >= 500, "chunk {} has {} chars", chunk.order, chunk.char_len());
        }
        assert!(chunks.len() <= text.chars().count() / 300 + 1);
        assert_invariants(&text, 1000, 200);
    }

    #[test]
    fn test_hard_cut_without_boundaries() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = split(text, 10, 3).unwrap();
        assert_eq!(chunks[0].text, "abcdefghij");
        assert_eq!(chunks[1].text, "hijklmnopq");
        assert_invariants(text, 10, 3);
    }

    #[test]
    fn test_overlap_and_reconstruction() {
        let transcript = "so today we are going to talk about rust ownership and borrowing \
            which is honestly the thing that trips up most people when they start. \
            the borrow checker enforces that you either have one mutable reference \
            or any number of shared references but never both at the same time. \
            lifetimes are how the compiler tracks how long those references live.";

        for (size, overlap) in [(50, 10), (80, 20), (120, 0), (64, 63), (1000, 200)] {
            assert_invariants(transcript, size, overlap);
        }
    }

    #[test]
    fn test_multibyte_text() {
        let text = "नमस्ते दोस्तों, आज हम रस्ट प्रोग्रामिंग के बारे में बात करेंगे। यह बहुत तेज़ और सुरक्षित भाषा है।";
        assert_invariants(text, 16, 4);
    }

    #[test]
    fn test_deterministic() {
        let text = "one two three four five six seven eight nine ten eleven twelve";
        assert_eq!(split(text, 15, 5).unwrap(), split(text, 15, 5).unwrap());
    }
}
