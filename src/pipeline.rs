//! Edit pipeline: stitch -> load -> trim -> speed -> plan -> overlay -> audio
//!
//! Stages run in a fixed order and each compositor call completes before the
//! next one starts. Any failure aborts the run; nothing is retried and no
//! partial output is produced.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::compositor::{Clip, Compositor, ExportSettings};
use crate::error::{EditError, Result};
use crate::plan::{OverlayPlan, Planner};

/// Separator used when manual overlay strings are joined into one text
const OVERLAY_JOINER: &str = ". ";

/// Default location of the stitched intermediate
#[must_use]
pub fn default_stitch_path() -> PathBuf {
    std::env::temp_dir().join("clipcue_stitched.mp4")
}

/// Parameters for one edit run
#[derive(Debug, Clone)]
pub struct PipelineConfiguration {
    /// Source media
    pub input: PathBuf,
    /// Trim start in seconds (0 when only an end is set)
    pub trim_start: Option<f64>,
    /// Trim end in seconds (natural end when unset)
    pub trim_end: Option<f64>,
    /// Playback speed factor
    pub speed: f64,
    /// Replacement audio track
    pub audio: Option<PathBuf>,
    /// Clips appended after `input` before editing
    pub stitch: Vec<PathBuf>,
    /// Free-form prompt planned into overlays
    pub prompt: Option<String>,
    /// Manual overlay captions
    pub overlays: Vec<String>,
    /// Allocator tuning, shared by both text sources
    pub planner: Planner,
    /// Where the stitched input is written
    pub stitch_path: PathBuf,
}

impl PipelineConfiguration {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            trim_start: None,
            trim_end: None,
            speed: 1.0,
            audio: None,
            stitch: Vec::new(),
            prompt: None,
            overlays: Vec::new(),
            planner: Planner::default(),
            stitch_path: default_stitch_path(),
        }
    }

    /// Set trim bounds
    #[must_use]
    pub fn with_trim(mut self, start: Option<f64>, end: Option<f64>) -> Self {
        self.trim_start = start;
        self.trim_end = end;
        self
    }

    /// Set speed factor
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Set replacement audio track
    #[must_use]
    pub fn with_audio(mut self, audio: impl Into<PathBuf>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    /// Set clips to stitch after the input
    #[must_use]
    pub fn with_stitch(mut self, clips: Vec<PathBuf>) -> Self {
        self.stitch = clips;
        self
    }

    /// Set prompt
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Add a manual overlay caption
    #[must_use]
    pub fn with_overlay(mut self, text: impl Into<String>) -> Self {
        self.overlays.push(text.into());
        self
    }

    /// Set planner tuning
    #[must_use]
    pub fn with_planner(mut self, planner: Planner) -> Self {
        self.planner = planner;
        self
    }

    /// Set stitched intermediate location
    #[must_use]
    pub fn with_stitch_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stitch_path = path.into();
        self
    }

    fn has_trim(&self) -> bool {
        self.trim_start.is_some() || self.trim_end.is_some()
    }

    #[allow(clippy::float_cmp)]
    fn changes_speed(&self) -> bool {
        self.speed != 1.0
    }

    /// Reject malformed numeric settings before any media work starts
    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(EditError::InvalidConfig(format!(
                "speed must be a positive number, got {}",
                self.speed
            )));
        }

        let start = self.trim_start.unwrap_or(0.0);
        if !start.is_finite() || start < 0.0 {
            return Err(EditError::InvalidConfig(format!(
                "trim start must be >= 0, got {start}"
            )));
        }

        if let Some(end) = self.trim_end {
            if !end.is_finite() || end <= start {
                return Err(EditError::InvalidConfig(format!(
                    "trim end ({end}) must be after trim start ({start})"
                )));
            }
        }

        Ok(())
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Rendered file
    pub output_path: PathBuf,
    /// Duration of the rendered clip in seconds
    pub duration: f64,
    /// Overlays burned into the clip
    pub overlays: Vec<OverlayPlan>,
    /// Wall-clock processing time in seconds
    pub processing_time_secs: f64,
}

/// Sequences edit stages over a compositor
pub struct EditPipeline<C: Compositor> {
    compositor: C,
    export: ExportSettings,
}

impl<C: Compositor> EditPipeline<C> {
    #[must_use]
    pub fn new(compositor: C, export: ExportSettings) -> Self {
        Self { compositor, export }
    }

    #[must_use]
    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    #[must_use]
    pub fn export_settings(&self) -> &ExportSettings {
        &self.export
    }

    /// Overlay plans for a clip of `duration` seconds.
    ///
    /// The prompt and the joined manual overlays are planned independently;
    /// prompt plans always come first.
    #[must_use]
    pub fn plan_overlays(config: &PipelineConfiguration, duration: f64) -> Vec<OverlayPlan> {
        let mut plans = Vec::new();

        if let Some(prompt) = config.prompt.as_deref() {
            plans.extend(config.planner.plan_overlays(prompt, duration));
        }

        if !config.overlays.is_empty() {
            let joined = config.overlays.join(OVERLAY_JOINER);
            plans.extend(config.planner.plan_overlays(&joined, duration));
        }

        plans
    }

    /// Concatenate input and extra clips, materialize at the stitch path
    async fn stitch_input(&self, config: &PipelineConfiguration) -> Result<PathBuf> {
        let mut paths = Vec::with_capacity(config.stitch.len() + 1);
        paths.push(config.input.clone());
        paths.extend(config.stitch.iter().cloned());

        info!("Stitching {} clips...", paths.len());
        let stitched = self.compositor.stitch(&paths).await?;
        self.compositor
            .export(&stitched, &config.stitch_path, &self.export)
            .await?;

        Ok(config.stitch_path.clone())
    }

    async fn compose(&self, config: &PipelineConfiguration) -> Result<(Clip, Vec<OverlayPlan>)> {
        config.validate()?;

        // Step 1: Optional pre-stitch
        let input = if config.stitch.is_empty() {
            config.input.clone()
        } else {
            self.stitch_input(config).await?
        };

        // Step 2: Load
        let mut clip = self.compositor.load(&input).await?;

        // Step 3: Trim
        if config.has_trim() {
            let start = config.trim_start.unwrap_or(0.0);
            info!("Trimming to [{start:.2}, {:?})", config.trim_end);
            clip = self.compositor.trim(clip, start, config.trim_end).await?;
        }

        // Step 4: Speed
        if config.changes_speed() {
            info!("Changing speed by {}x", config.speed);
            clip = self.compositor.change_speed(clip, config.speed).await?;
        }

        // Step 5: Plan overlays on the edited duration
        let plans = Self::plan_overlays(config, clip.duration);
        debug!("Planned {} overlays over {:.2}s", plans.len(), clip.duration);

        // Step 6: Overlays
        if !plans.is_empty() {
            info!("Applying {} overlays...", plans.len());
            clip = self.compositor.apply_overlays(clip, &plans).await?;
        }

        // Step 7: Audio
        if let Some(ref audio) = config.audio {
            info!("Replacing audio with {:?}", audio);
            clip = self.compositor.merge_audio(clip, audio).await?;
        }

        Ok((clip, plans))
    }

    /// Run every edit stage and return the composed clip without exporting it
    pub async fn build(&self, config: &PipelineConfiguration) -> Result<Clip> {
        self.compose(config).await.map(|(clip, _)| clip)
    }

    /// Build the clip and render it to `output`
    pub async fn run(&self, config: &PipelineConfiguration, output: &Path) -> Result<PipelineResult> {
        let start_time = Instant::now();

        if self.export.fps == 0 {
            return Err(EditError::InvalidConfig("fps must be greater than 0".to_string()));
        }

        info!("Starting edit pipeline for {:?}", config.input);
        let (clip, overlays) = self.compose(config).await?;

        self.compositor.export(&clip, output, &self.export).await?;

        let elapsed = start_time.elapsed().as_secs_f64();
        info!("Pipeline completed in {:.2}s", elapsed);

        Ok(PipelineResult {
            output_path: output.to_path_buf(),
            duration: clip.duration,
            overlays,
            processing_time_secs: elapsed,
        })
    }
}
