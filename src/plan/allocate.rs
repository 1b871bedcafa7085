//! Timeline slot allocation
//!
//! Maps the highest-ranked sentences onto evenly spaced start times. Timeline
//! order follows relevance rank, not the order of the source text.

use super::score::ScoredSentence;
use super::{OverlayPlan, OverlayPosition};

/// Allocate timeline slots for the top `max_items` scored sentences.
///
/// With `n` selected sentences, entry `i` starts at `i * total_duration / n`
/// and every entry lasts `max(min_duration, total_duration / (n + 1))`.
/// A non-positive or non-finite `total_duration` is treated as a zero-length
/// timeline: all entries start at 0 and last `min_duration`.
pub(crate) fn allocate(
    scored: &[ScoredSentence],
    max_items: usize,
    total_duration: f64,
    min_duration: f64,
) -> Vec<OverlayPlan> {
    let selected = &scored[..scored.len().min(max_items)];
    if selected.is_empty() {
        return Vec::new();
    }

    let span = if total_duration.is_finite() && total_duration > 0.0 {
        total_duration
    } else {
        0.0
    };
    let count = selected.len() as f64;
    let slot = span / count;
    let duration = min_duration.max(span / (count + 1.0));

    selected
        .iter()
        .enumerate()
        .map(|(idx, sentence)| OverlayPlan {
            text: sentence.text.clone(),
            start: slot * idx as f64,
            duration,
            position: OverlayPosition::alternating(idx),
        })
        .collect()
}
