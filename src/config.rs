//! Configuration loaded from `~/.config/clipcue/config.toml`.
//!
//! Every section is optional; missing keys fall back to the built-in
//! defaults.
//!
//! ```toml
//! stitch_path = "/tmp/clipcue_stitched.mp4"
//!
//! [planner]
//! max_items = 6
//! min_duration = 2.5
//!
//! [export]
//! fps = 24
//! video_codec = "libx264"
//! audio_codec = "aac"
//!
//! [ffmpeg]
//! ffmpeg_path = "/usr/bin/ffmpeg"
//!
//! [overlay]
//! font_size = 48
//! color = "white"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::compositor::{ExportSettings, FfmpegConfig, OverlayStyle};
use crate::error::{EditError, Result};
use crate::pipeline::default_stitch_path;
use crate::plan::Planner;

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where a stitched input is written before editing.
    pub stitch_path: PathBuf,
    /// Overlay allocation tuning.
    pub planner: Planner,
    /// Final render settings.
    pub export: ExportSettings,
    /// ffmpeg binaries and intermediate encoding.
    pub ffmpeg: FfmpegConfig,
    /// Caption style.
    pub overlay: OverlayStyle,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stitch_path: default_stitch_path(),
            planner: Planner::default(),
            export: ExportSettings::default(),
            ffmpeg: FfmpegConfig::default(),
            overlay: OverlayStyle::default(),
        }
    }
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| EditError::Config(e.to_string()))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present and built-in defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| EditError::Config(format!("failed to read {}: {e}", path.display())))?;

        toml::from_str(&content)
            .map_err(|e| EditError::Config(format!("invalid TOML in {}: {e}", path.display())))
    }

    /// ffmpeg settings with the configured caption style applied.
    #[must_use]
    pub fn compositor_config(&self) -> FfmpegConfig {
        self.ffmpeg.clone().with_style(self.overlay.clone())
    }
}

/// Return the path to the default config file.
#[must_use]
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clipcue")
        .join("config.toml")
}
