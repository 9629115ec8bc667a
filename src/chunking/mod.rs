//! Word-bounded transcript chunking.
//!
//! Splits a transcript on whitespace runs and groups consecutive words into
//! chunks of at most `max_words` words. Every chunk except possibly the last
//! holds exactly `max_words` words.

/// Default maximum number of words per chunk.
pub const DEFAULT_MAX_WORDS: usize = 800;

/// Splits transcripts into ordered word chunks.
#[derive(Debug, Clone, Copy)]
pub struct WordChunker {
    max_words: usize,
}

impl WordChunker {
    /// Create a chunker. A `max_words` of zero is treated as one.
    pub fn new(max_words: usize) -> Self {
        Self {
            max_words: max_words.max(1),
        }
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Split a transcript into chunks.
    ///
    /// Always returns at least one chunk; empty or whitespace-only input yields
    /// a single empty chunk, so callers must check before sending it anywhere.
    pub fn chunk(&self, transcript: &str) -> Vec<String> {
        let words: Vec<&str> = transcript.split_whitespace().collect();

        if words.is_empty() {
            return vec![String::new()];
        }

        words
            .chunks(self.max_words)
            .map(|group| group.join(" "))
            .collect()
    }
}

impl Default for WordChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORDS)
    }
}

/// Split a transcript into chunks of at most `max_words` words.
pub fn chunk_transcript(transcript: &str, max_words: usize) -> Vec<String> {
    WordChunker::new(max_words).chunk(transcript)
}

/// Collapse whitespace runs into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_1500_words_make_two_chunks() {
        let chunks = chunk_transcript(&words(1500), 800);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].split_whitespace().count(), 800);
        assert_eq!(chunks[1].split_whitespace().count(), 700);
        assert!(chunks[1].starts_with("w800 "));
    }

    #[test]
    fn test_rejoin_is_lossless() {
        let transcript = "0:00  hello\tthere\n\n0:04 general   kenobi\n";
        for max in 1..6 {
            let chunks = chunk_transcript(transcript, max);
            assert_eq!(chunks.join(" "), normalize_whitespace(transcript));
            for chunk in &chunks[..chunks.len() - 1] {
                assert_eq!(chunk.split_whitespace().count(), max);
            }
        }
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let chunks = chunk_transcript(&words(1600), 800);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_short_transcript_is_single_chunk() {
        let chunks = WordChunker::default().chunk("just a few words");
        assert_eq!(chunks, vec!["just a few words".to_string()]);
    }

    #[test]
    fn test_empty_input_yields_single_empty_chunk() {
        assert_eq!(chunk_transcript("", 800), vec![String::new()]);
        assert_eq!(chunk_transcript(" \n\t ", 800), vec![String::new()]);
    }

    #[test]
    fn test_zero_max_words_is_clamped() {
        let chunker = WordChunker::new(0);
        assert_eq!(chunker.max_words(), 1);
        assert_eq!(chunker.chunk("a b").len(), 2);
    }
}
