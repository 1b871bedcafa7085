//! `clipcue` - caption planning and scripted video edits
//!
//! # Features
//!
//! - **Overlay planning**: deterministic sentence extraction, relevance
//!   scoring and timeline allocation for caption overlays
//! - **Edit pipeline**: stitch, trim, speed change, captions and audio
//!   replacement in a fixed order
//! - **ffmpeg compositor**: every media operation runs through `ffmpeg`
//!   and `ffprobe` behind the [`Compositor`] trait
//!
//! # Example
//!
//! ```rust,no_run
//! use clipcue::{EditPipeline, ExportSettings, FfmpegCompositor, FfmpegConfig, PipelineConfiguration};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let compositor = FfmpegCompositor::new(FfmpegConfig::default())?;
//!     let pipeline = EditPipeline::new(compositor, ExportSettings::default());
//!
//!     let config = PipelineConfiguration::new("input.mp4")
//!         .with_trim(Some(2.0), Some(30.0))
//!         .with_prompt("AI makes editing fast. Video tools help creators.");
//!
//!     let result = pipeline.run(&config, "output.mp4".as_ref()).await?;
//!     println!("{} overlays", result.overlays.len());
//!     Ok(())
//! }
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod plan;

pub use compositor::{Clip, Compositor, ExportSettings, FfmpegCompositor, FfmpegConfig, OverlayStyle};
pub use config::AppConfig;
pub use error::{EditError, Result, Stage};
pub use pipeline::{EditPipeline, PipelineConfiguration, PipelineResult};
pub use plan::{split_sentences, OverlayPlan, OverlayPosition, Planner};

/// Version of clipcue
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
