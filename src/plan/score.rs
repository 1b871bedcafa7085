//! Relevance scoring for caption candidates
//!
//! Score = distinct lower-cased tokens, boosted when the sentence mentions
//! one of the topical markers. Marker matching is plain substring
//! containment, so "said" counts as a hit for "ai".

use std::collections::HashSet;

/// Substrings that trigger the emphasis boost
pub const EMPHASIS_MARKERS: [&str; 3] = ["ai", "video", "edit"];

/// Multiplier applied when any marker is present
pub const EMPHASIS_MULTIPLIER: f64 = 1.2;

/// A sentence paired with its relevance score
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredSentence {
    pub text: String,
    pub score: f64,
}

/// Number of distinct case-folded whitespace-delimited tokens
fn uniqueness(lowered: &str) -> usize {
    lowered.split_whitespace().collect::<HashSet<_>>().len()
}

fn emphasis(lowered: &str) -> f64 {
    if EMPHASIS_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        EMPHASIS_MULTIPLIER
    } else {
        1.0
    }
}

/// Score a single sentence
#[must_use]
pub fn sentence_score(sentence: &str) -> f64 {
    let lowered = sentence.to_lowercase();
    uniqueness(&lowered) as f64 * emphasis(&lowered)
}

/// Score sentences and order them by descending score.
///
/// `sort_by` is a stable sort: sentences with equal scores keep their
/// input order.
pub(crate) fn score_sentences<S: AsRef<str>>(sentences: &[S]) -> Vec<ScoredSentence> {
    let mut scored: Vec<ScoredSentence> = sentences
        .iter()
        .map(|sentence| ScoredSentence {
            text: sentence.as_ref().to_string(),
            score: sentence_score(sentence.as_ref()),
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
