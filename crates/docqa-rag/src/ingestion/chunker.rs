//! Fixed-size sliding-window chunking

use crate::error::{Error, Result};

/// Text chunker with configurable size and overlap, measured in characters
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; requires `overlap < chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than zero".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between consecutive window starts
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Character ranges `[start, end)` of the windows over a text of `len` chars
    pub fn spans(&self, len: usize) -> Vec<(usize, usize)> {
        (0..len)
            .step_by(self.step())
            .map(|start| (start, (start + self.chunk_size).min(len)))
            .collect()
    }

    /// Split text into overlapping windows
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        self.spans(chars.len())
            .into_iter()
            .map(|(start, end)| chars[start..end].iter().collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(matches!(TextChunker::new(0, 0), Err(Error::Config(_))));
        assert!(matches!(TextChunker::new(100, 100), Err(Error::Config(_))));
        assert!(matches!(TextChunker::new(100, 150), Err(Error::Config(_))));
        assert!(TextChunker::new(100, 0).is_ok());
    }

    #[test]
    fn test_default_windows_over_1800_chars() {
        let chunker = TextChunker::new(800, 150).unwrap();
        let text: String = (0..1800).map(|i| (b'a' + (i % 26) as u8) as char).collect();

        assert_eq!(chunker.spans(1800), vec![(0, 800), (650, 1450), (1300, 1800)]);

        let chunks = chunker.chunk(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], text[0..800]);
        assert_eq!(chunks[1], text[650..1450]);
        assert_eq!(chunks[2], text[1300..1800]);
    }

    #[test]
    fn test_short_and_empty_text() {
        let chunker = TextChunker::new(800, 150).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert_eq!(chunker.chunk("short"), vec!["short".to_string()]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let chunker = TextChunker::new(4, 1).unwrap();
        let chunks = chunker.chunk("ñandú¿qué");
        assert_eq!(chunks, vec!["ñand", "dú¿q", "qué"]);
    }

    proptest! {
        #[test]
        fn prop_windows_step_evenly_and_cover_text(
            text in "[a-zñ ]{0,300}",
            size in 1usize..60,
            overlap_seed in 0usize..60,
        ) {
            let overlap = overlap_seed % size;
            let chunker = TextChunker::new(size, overlap).unwrap();
            let len = text.chars().count();
            let spans = chunker.spans(len);

            for (i, (start, end)) in spans.iter().enumerate() {
                prop_assert_eq!(*start, i * (size - overlap));
                prop_assert!(start < end);
                prop_assert!(*end <= len);
            }

            // every character position lies in some window
            let mut covered = 0;
            for (start, end) in &spans {
                prop_assert!(*start <= covered);
                covered = covered.max(*end);
            }
            prop_assert_eq!(covered, len);

            let chunks = chunker.chunk(&text);
            prop_assert_eq!(chunks.len(), spans.len());
            if let Some(first) = chunks.first() {
                prop_assert!(text.starts_with(first.as_str()));
            }
        }
    }
}
