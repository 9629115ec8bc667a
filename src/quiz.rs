//! Q&A flashcard markup.
//!
//! Models are asked to answer in `**Q1:** ... **A1:** ...` form. Parsing is
//! lenient about the marker punctuation; output is always the canonical form.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static QUESTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*\s*Q\s*\d+\s*[:.]?\s*\*\*\s*:?").expect("valid question marker regex")
});

static ANSWER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*\s*A\s*\d+\s*[:.]?\s*\*\*\s*:?").expect("valid answer marker regex")
});

/// One flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    /// 1-based position in the output.
    pub number: usize,
    pub question: String,
    pub answer: String,
}

/// Parse Q&A pairs out of model output, numbering them 1..N in order.
///
/// Blocks without an answer marker, or with an empty question or answer, are
/// skipped.
pub fn parse_qa_pairs(text: &str) -> Vec<QaPair> {
    let markers: Vec<_> = QUESTION_MARKER.find_iter(text).collect();
    let mut pairs = Vec::new();

    for (i, marker) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
        let block = &text[marker.end()..end];

        let Some(answer_marker) = ANSWER_MARKER.find(block) else {
            continue;
        };

        let question = block[..answer_marker.start()].trim();
        let answer = block[answer_marker.end()..].trim();
        if question.is_empty() || answer.is_empty() {
            continue;
        }

        pairs.push(QaPair {
            number: pairs.len() + 1,
            question: question.to_string(),
            answer: answer.to_string(),
        });
    }

    pairs
}

/// Render pairs in canonical markup, renumbered from 1.
pub fn to_markup(pairs: &[QaPair]) -> String {
    pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| {
            format!(
                "**Q{n}:** {}\n**A{n}:** {}",
                pair.question,
                pair.answer,
                n = i + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Re-emit model output as canonical markup holding at most `limit` pairs.
///
/// Output with no parsable pairs is returned trimmed, unchanged otherwise.
pub fn normalize_markup(text: &str, limit: usize) -> String {
    let mut pairs = parse_qa_pairs(text);
    if pairs.is_empty() {
        return text.trim().to_string();
    }
    pairs.truncate(limit);
    to_markup(&pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE: &str = "**Q1:** What is Rust?\n**A1:** A systems language.\n\n\
        **Q2:** Who makes it?\n**A2:** The Rust project.\n\n\
        **Q3:** Is it fast?\n**A3:** Yes.\n\n\
        **Q4:** Memory safe?\n**A4:** Without a GC.\n\n\
        **Q5:** Package manager?\n**A5:** Cargo.";

    #[test]
    fn test_parse_five_pairs() {
        let pairs = parse_qa_pairs(FIVE);
        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[0].question, "What is Rust?");
        assert_eq!(pairs[0].answer, "A systems language.");
        assert_eq!(pairs[4].number, 5);
        assert_eq!(pairs[4].answer, "Cargo.");
    }

    #[test]
    fn test_markup_is_canonical() {
        let pairs = parse_qa_pairs(FIVE);
        assert_eq!(to_markup(&pairs), FIVE);
    }

    #[test]
    fn test_lenient_markers_and_preamble() {
        let text = "Here are your questions:\n\n**Q1**: First?\n**A1**: One.\n**Q 2.** Second?\n** A2: ** Two.";
        let pairs = parse_qa_pairs(text);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].question, "First?");
        assert_eq!(pairs[1].question, "Second?");
        assert_eq!(pairs[1].answer, "Two.");
    }

    #[test]
    fn test_renumbers_merged_candidates() {
        let merged = "**Q1:** a?\n**A1:** a\n\n**Q1:** b?\n**A1:** b\n\n**Q2:** c?\n**A2:** c";
        let markup = to_markup(&parse_qa_pairs(merged));
        assert!(markup.contains("**Q3:** c?\n**A3:** c"));
    }

    #[test]
    fn test_skips_blocks_without_answers() {
        let text = "**Q1:** dangling question\n\n**Q2:** real?\n**A2:** yes";
        let pairs = parse_qa_pairs(text);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].number, 1);
        assert_eq!(pairs[0].question, "real?");
    }

    #[test]
    fn test_normalize_limits_and_passes_through() {
        let limited = normalize_markup(FIVE, 3);
        assert_eq!(parse_qa_pairs(&limited).len(), 3);
        assert!(!limited.contains("Q4"));

        assert_eq!(normalize_markup("  No result returned ", 5), "No result returned");
    }
}
