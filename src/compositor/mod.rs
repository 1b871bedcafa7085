//! Media compositing boundary
//!
//! The edit pipeline never touches media itself. Every decode, filter and
//! encode goes through a [`Compositor`]; [`FfmpegCompositor`] is the shipped
//! implementation and drives the `ffmpeg`/`ffprobe` binaries.
//!
//! All calls are potentially slow and can fail. The pipeline awaits each one
//! before issuing the next.

mod ffmpeg;
mod style;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::plan::OverlayPlan;

pub use ffmpeg::{FfmpegCompositor, FfmpegConfig};
pub use style::OverlayStyle;

/// Handle to a materialized media file
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Location of the media file
    pub path: PathBuf,
    /// Duration in seconds
    pub duration: f64,
    /// Whether the file carries an audio stream
    pub has_audio: bool,
    /// Width and height of the first video stream, when probed
    pub resolution: Option<(u32, u32)>,
}

impl Clip {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            path: path.into(),
            duration,
            has_audio: true,
            resolution: None,
        }
    }

    /// Set audio presence
    #[must_use]
    pub fn with_audio(mut self, has_audio: bool) -> Self {
        self.has_audio = has_audio;
        self
    }

    /// Set frame size
    #[must_use]
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }
}

/// Encoding settings for the final render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Output frame rate
    pub fps: u32,
    /// Video codec
    pub video_codec: String,
    /// Audio codec
    pub audio_codec: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            fps: 24,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
        }
    }
}

/// Media engine operations used by the edit pipeline
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Open a media file
    async fn load(&self, path: &Path) -> Result<Clip>;

    /// Cut the clip to `[start, end)`; `None` keeps the natural end
    async fn trim(&self, clip: Clip, start: f64, end: Option<f64>) -> Result<Clip>;

    /// Rescale playback time; `factor > 1.0` plays faster
    async fn change_speed(&self, clip: Clip, factor: f64) -> Result<Clip>;

    /// Burn caption overlays into the clip
    async fn apply_overlays(&self, clip: Clip, plans: &[OverlayPlan]) -> Result<Clip>;

    /// Replace the clip's audio with the given track
    async fn merge_audio(&self, clip: Clip, audio_path: &Path) -> Result<Clip>;

    /// Render the clip to its final destination
    async fn export(&self, clip: &Clip, output: &Path, settings: &ExportSettings) -> Result<()>;

    /// Concatenate clips in order.
    ///
    /// Inputs must share frame size and audio layout.
    async fn stitch(&self, paths: &[PathBuf]) -> Result<Clip>;
}
