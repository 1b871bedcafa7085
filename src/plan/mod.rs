//! Overlay planning: text in, timed caption instructions out
//!
//! Three pure stages run back to back:
//!
//! - **Extraction** - split text into candidate sentences
//! - **Scoring** - rank sentences by token richness and topical emphasis
//! - **Allocation** - spread the top-ranked sentences across the timeline
//!
//! # Example
//!
//! ```rust
//! use clipcue::plan::{OverlayPosition, Planner};
//!
//! let planner = Planner::new(2, 2.5);
//! let plans = planner.plan_overlays("Cut the intro. Add music to the video.", 10.0);
//!
//! assert_eq!(plans.len(), 2);
//! assert_eq!(plans[0].position, OverlayPosition::Bottom);
//! assert_eq!(plans[1].start, 5.0);
//! ```

mod allocate;
mod extract;
mod score;

use serde::{Deserialize, Serialize};

pub use extract::split_sentences;
pub use score::{sentence_score, EMPHASIS_MARKERS, EMPHASIS_MULTIPLIER};

/// Default number of overlays kept per text source
pub const DEFAULT_MAX_ITEMS: usize = 6;

/// Default minimum on-screen time for an overlay, in seconds
pub const DEFAULT_MIN_DURATION: f64 = 2.5;

/// Vertical placement of an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayPosition {
    /// Bottom edge (standard caption position)
    #[default]
    Bottom,
    /// Top edge
    Top,
}

impl OverlayPosition {
    /// Position for the overlay at `index` in one allocation: bottom first, then alternating
    #[must_use]
    pub fn alternating(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Bottom
        } else {
            Self::Top
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bottom => "bottom",
            Self::Top => "top",
        }
    }
}

/// A single timed caption instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayPlan {
    /// Caption text (trimmed, never empty)
    pub text: String,
    /// Start time in seconds
    pub start: f64,
    /// Display duration in seconds
    pub duration: f64,
    /// Vertical placement
    pub position: OverlayPosition,
}

impl OverlayPlan {
    /// End time in seconds
    #[must_use]
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Allocator tuning for one planning call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Planner {
    /// Maximum overlays produced per text source
    pub max_items: usize,
    /// Floor for every overlay duration, in seconds
    pub min_duration: f64,
}

impl Default for Planner {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            min_duration: DEFAULT_MIN_DURATION,
        }
    }
}

impl Planner {
    #[must_use]
    pub fn new(max_items: usize, min_duration: f64) -> Self {
        Self {
            max_items,
            min_duration,
        }
    }

    /// Set maximum overlays per source
    #[must_use]
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Set minimum overlay duration
    #[must_use]
    pub fn with_min_duration(mut self, min_duration: f64) -> Self {
        self.min_duration = min_duration;
        self
    }

    /// Run extraction, scoring and allocation over `text` for a clip of
    /// `total_duration` seconds.
    ///
    /// Text without any sentence yields an empty plan.
    #[must_use]
    pub fn plan_overlays(&self, text: &str, total_duration: f64) -> Vec<OverlayPlan> {
        let sentences = split_sentences(text);
        let scored = score::score_sentences(&sentences);
        allocate::allocate(&scored, self.max_items, total_duration, self.min_duration)
    }
}
