//! Caption styling and ffmpeg `drawtext` filter generation

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::plan::{OverlayPlan, OverlayPosition};

/// Style applied to every caption overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Font size in pixels
    pub font_size: u32,
    /// Text color (any ffmpeg color: name or 0xRRGGBB)
    pub color: String,
    /// Outline color
    pub stroke_color: String,
    /// Outline width in pixels (0 disables the outline)
    pub stroke_width: u32,
    /// Distance from the top/bottom edge in pixels
    pub margin: u32,
    /// Font file; fontconfig default when unset
    pub font_file: Option<PathBuf>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font_size: 48,
            color: "white".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 2,
            margin: 20,
            font_file: None,
        }
    }
}

/// Escape a path for use inside a quoted filter option
pub(crate) fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

/// ffmpeg drawtext coordinates for a position, horizontally centred
fn drawtext_position(position: OverlayPosition, margin: u32) -> (String, String) {
    let x = "(w-text_w)/2".to_string();
    match position {
        OverlayPosition::Bottom => (x, format!("h-text_h-{margin}")),
        OverlayPosition::Top => (x, margin.to_string()),
    }
}

impl OverlayStyle {
    /// Set font size
    #[must_use]
    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set font file
    #[must_use]
    pub fn with_font_file(mut self, font_file: impl Into<PathBuf>) -> Self {
        self.font_file = Some(font_file.into());
        self
    }

    /// Build one `drawtext` filter for a plan whose text lives in `text_file`.
    ///
    /// Reading the caption from a file sidesteps filtergraph escaping of
    /// arbitrary user text; `expansion=none` keeps `%` literal.
    #[must_use]
    pub fn drawtext(&self, plan: &OverlayPlan, text_file: &Path) -> String {
        let (x, y) = drawtext_position(plan.position, self.margin);

        let mut params = vec![format!("textfile='{}'", escape_filter_path(text_file))];

        if let Some(ref font_file) = self.font_file {
            params.push(format!("fontfile='{}'", escape_filter_path(font_file)));
        }

        params.push("expansion=none".to_string());
        params.push(format!("fontsize={}", self.font_size));
        params.push(format!("fontcolor={}", self.color));

        if self.stroke_width > 0 {
            params.push(format!("borderw={}", self.stroke_width));
            params.push(format!("bordercolor={}", self.stroke_color));
        }

        params.push(format!("x={x}"));
        params.push(format!("y={y}"));
        params.push(format!(
            "enable='between(t,{:.3},{:.3})'",
            plan.start,
            plan.end()
        ));

        format!("drawtext={}", params.join(":"))
    }

    /// Chain drawtext filters for all plans, pairing each with its text file
    #[must_use]
    pub fn filter_chain(&self, plans: &[OverlayPlan], text_files: &[PathBuf]) -> String {
        plans
            .iter()
            .zip(text_files)
            .map(|(plan, file)| self.drawtext(plan, file))
            .collect::<Vec<_>>()
            .join(",")
    }
}
