//! ffmpeg-backed compositor
//!
//! Every transforming call renders a fresh intermediate file into a
//! per-instance work directory and probes it with ffprobe, so the returned
//! [`Clip`] always reports the real duration of what was written.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::style::OverlayStyle;
use super::{Clip, Compositor, ExportSettings};
use crate::error::{EditError, Result, Stage};
use crate::plan::OverlayPlan;

/// Locate a binary in PATH, falling back to the bare name
fn find_binary(name: &str) -> String {
    which::which(name).map_or_else(|_| name.to_string(), |p| p.to_string_lossy().to_string())
}

/// Configuration for the ffmpeg compositor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary
    pub ffprobe_path: String,
    /// Parent directory for per-run intermediates
    pub work_dir: PathBuf,
    /// Video codec for intermediates
    pub video_codec: String,
    /// Audio codec for intermediates
    pub audio_codec: String,
    /// Additional ffmpeg output arguments for intermediates
    pub output_args: Vec<String>,
    /// Caption style, set from the `[overlay]` config section
    #[serde(skip)]
    pub style: OverlayStyle,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: find_binary("ffmpeg"),
            ffprobe_path: find_binary("ffprobe"),
            work_dir: std::env::temp_dir().join("clipcue"),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            output_args: vec!["-preset".to_string(), "veryfast".to_string()],
            style: OverlayStyle::default(),
        }
    }
}

impl FfmpegConfig {
    /// Set caption style
    #[must_use]
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    /// Set parent directory for intermediates
    #[must_use]
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Build a clip from ffprobe JSON output
fn parse_probe(path: &Path, json: &[u8]) -> Result<Clip> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| EditError::invalid_input(path, "media has no duration"))?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| EditError::invalid_input(path, "no video stream found"))?;

    let has_audio = probe.streams.iter().any(|s| s.codec_type.as_deref() == Some("audio"));

    let mut clip = Clip::new(path, duration).with_audio(has_audio);
    if let (Some(width), Some(height)) = (video.width, video.height) {
        clip = clip.with_resolution(width, height);
    }
    Ok(clip)
}

/// The concat demuxer copies stream layout from the first file; every other
/// input has to match it.
fn ensure_uniform(clips: &[Clip]) -> Result<()> {
    let Some(first) = clips.first() else {
        return Ok(());
    };

    for clip in &clips[1..] {
        if clip.resolution != first.resolution {
            return Err(EditError::invalid_input(
                &clip.path,
                format!(
                    "frame size {} differs from {} in {}",
                    describe_resolution(clip.resolution),
                    describe_resolution(first.resolution),
                    first.path.display()
                ),
            ));
        }
        if clip.has_audio != first.has_audio {
            return Err(EditError::invalid_input(
                &clip.path,
                format!(
                    "audio track presence differs from {}",
                    first.path.display()
                ),
            ));
        }
    }

    Ok(())
}

fn describe_resolution(resolution: Option<(u32, u32)>) -> String {
    resolution.map_or_else(|| "unknown".to_string(), |(w, h)| format!("{w}x{h}"))
}

/// Split a tempo factor into `atempo` steps that each stay within [0.5, 2.0]
fn atempo_chain(factor: f64) -> Vec<f64> {
    let mut chain = Vec::new();
    let mut remaining = factor;

    while remaining > 2.0 {
        chain.push(2.0);
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        chain.push(0.5);
        remaining /= 0.5;
    }

    chain.push(remaining);
    chain
}

/// Concat demuxer list file contents
fn concat_list(paths: &[PathBuf]) -> String {
    let mut list = String::new();
    for path in paths {
        let quoted = path.to_string_lossy().replace('\'', "'\\''");
        let _ = writeln!(list, "file '{quoted}'");
    }
    list
}

/// Last non-empty stderr line, for error messages
fn stderr_tail(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no output")
        .trim()
        .to_string()
}

fn to_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// ffmpeg-based media compositor
pub struct FfmpegCompositor {
    config: FfmpegConfig,
    run_dir: PathBuf,
}

impl FfmpegCompositor {
    /// Create a compositor with its own work directory under `config.work_dir`
    pub fn new(config: FfmpegConfig) -> Result<Self> {
        let run_dir = config.work_dir.join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&run_dir)?;

        Ok(Self { config, run_dir })
    }

    #[must_use]
    pub fn config(&self) -> &FfmpegConfig {
        &self.config
    }

    /// Directory holding this instance's intermediates
    #[must_use]
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Check whether ffmpeg and ffprobe can be executed
    pub async fn check_available(&self) -> Vec<(String, bool)> {
        let mut results = Vec::new();

        for (name, binary) in [
            ("ffmpeg", &self.config.ffmpeg_path),
            ("ffprobe", &self.config.ffprobe_path),
        ] {
            let ok = Command::new(binary)
                .arg("-version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .map(|s| s.success())
                .unwrap_or(false);
            results.push((name.to_string(), ok));
        }

        results
    }

    /// Remove this instance's work directory
    pub async fn cleanup(&self) {
        if let Err(e) = fs::remove_dir_all(&self.run_dir).await {
            warn!("Failed to remove work dir {:?}: {}", self.run_dir, e);
        }
    }

    fn intermediate(&self, extension: &str) -> PathBuf {
        self.run_dir.join(format!("{}.{extension}", Uuid::new_v4()))
    }

    fn base_args() -> Vec<String> {
        ["-hide_banner", "-loglevel", "error", "-y"]
            .iter()
            .map(std::string::ToString::to_string)
            .collect()
    }

    fn encode_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.config.video_codec.clone(),
            "-c:a".to_string(),
            self.config.audio_codec.clone(),
        ];
        args.extend(self.config.output_args.clone());
        args
    }

    fn trim_args(&self, clip: &Clip, start: f64, end: Option<f64>, output: &Path) -> Vec<String> {
        let mut args = Self::base_args();
        args.push("-i".to_string());
        args.push(to_arg(&clip.path));

        // Output-side seeking keeps the cut frame accurate
        args.push("-ss".to_string());
        args.push(format!("{start:.3}"));
        if let Some(end) = end {
            args.push("-to".to_string());
            args.push(format!("{end:.3}"));
        }

        args.extend(self.encode_args());
        args.push(to_arg(output));
        args
    }

    fn speed_args(&self, clip: &Clip, factor: f64, output: &Path) -> Vec<String> {
        let mut args = Self::base_args();
        args.push("-i".to_string());
        args.push(to_arg(&clip.path));

        args.push("-filter:v".to_string());
        args.push(format!("setpts=PTS/{factor}"));

        if clip.has_audio {
            let tempo = atempo_chain(factor)
                .iter()
                .map(|step| format!("atempo={step}"))
                .collect::<Vec<_>>()
                .join(",");
            args.push("-filter:a".to_string());
            args.push(tempo);
        }

        args.extend(self.encode_args());
        args.push(to_arg(output));
        args
    }

    fn overlay_args(&self, clip: &Clip, filter: &str, output: &Path) -> Vec<String> {
        let mut args = Self::base_args();
        args.push("-i".to_string());
        args.push(to_arg(&clip.path));
        args.push("-vf".to_string());
        args.push(filter.to_string());
        args.push("-c:v".to_string());
        args.push(self.config.video_codec.clone());
        args.push("-c:a".to_string());
        args.push("copy".to_string());
        args.extend(self.config.output_args.clone());
        args.push(to_arg(output));
        args
    }

    fn audio_args(&self, clip: &Clip, audio: &Path, output: &Path) -> Vec<String> {
        let mut args = Self::base_args();
        args.extend([
            "-i".to_string(),
            to_arg(&clip.path),
            "-i".to_string(),
            to_arg(audio),
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "1:a:0".to_string(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            self.config.audio_codec.clone(),
            // Audio never extends past the picture
            "-t".to_string(),
            format!("{:.3}", clip.duration),
        ]);
        args.push(to_arg(output));
        args
    }

    fn export_args(clip: &Clip, output: &Path, settings: &ExportSettings) -> Vec<String> {
        let mut args = Self::base_args();
        args.extend([
            "-i".to_string(),
            to_arg(&clip.path),
            "-r".to_string(),
            settings.fps.to_string(),
            "-c:v".to_string(),
            settings.video_codec.clone(),
        ]);
        if clip.has_audio {
            args.push("-c:a".to_string());
            args.push(settings.audio_codec.clone());
        } else {
            args.push("-an".to_string());
        }
        args.push(to_arg(output));
        args
    }

    fn concat_args(&self, list_file: &Path, output: &Path) -> Vec<String> {
        let mut args = Self::base_args();
        args.extend([
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            to_arg(list_file),
        ]);
        args.extend(self.encode_args());
        args.push(to_arg(output));
        args
    }

    /// Run ffmpeg to completion, mapping any failure to `stage`
    async fn run_ffmpeg(&self, stage: Stage, args: &[String]) -> Result<()> {
        debug!("ffmpeg {} args: {:?}", stage, args);

        let output = Command::new(&self.config.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| EditError::composition(stage, format!("failed to run ffmpeg: {e}")))?;

        if !output.status.success() {
            return Err(EditError::composition(
                stage,
                format!(
                    "ffmpeg exited with {}: {}",
                    output.status,
                    stderr_tail(&output.stderr)
                ),
            ));
        }

        Ok(())
    }

    /// Probe a media file's duration and streams
    async fn probe(&self, stage: Stage, path: &Path) -> Result<Clip> {
        let output = Command::new(&self.config.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| EditError::composition(stage, format!("failed to run ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(match stage {
                Stage::Load => EditError::invalid_input(path, "unreadable media file"),
                _ => EditError::composition(stage, format!("ffprobe could not read {}", path.display())),
            });
        }

        parse_probe(path, &output.stdout)
    }

    /// Render `args` into `output` and probe the result
    async fn render(&self, stage: Stage, args: &[String], output: &Path) -> Result<Clip> {
        self.run_ffmpeg(stage, args).await?;
        self.probe(stage, output).await
    }

    /// Write a scratch file, attributing failures to `stage`
    async fn write_scratch(&self, stage: Stage, contents: &[u8]) -> Result<PathBuf> {
        let file = self.intermediate("txt");
        fs::write(&file, contents).await.map_err(|e| {
            EditError::composition(stage, format!("failed to write {}: {e}", file.display()))
        })?;
        Ok(file)
    }

    /// Best-effort removal of scratch files
    async fn remove_scratch(files: &[PathBuf]) {
        for file in files {
            if let Err(e) = fs::remove_file(file).await {
                warn!("Failed to remove scratch file {:?}: {}", file, e);
            }
        }
    }

    /// Write each caption into its own text file for drawtext
    async fn write_caption_files(&self, plans: &[OverlayPlan]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::with_capacity(plans.len());
        for plan in plans {
            match self.write_scratch(Stage::Overlay, plan.text.as_bytes()).await {
                Ok(file) => files.push(file),
                Err(e) => {
                    Self::remove_scratch(&files).await;
                    return Err(e);
                }
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl Compositor for FfmpegCompositor {
    async fn load(&self, path: &Path) -> Result<Clip> {
        let path = fs::canonicalize(path)
            .await
            .map_err(|e| EditError::invalid_input(path, e.to_string()))?;

        let clip = self.probe(Stage::Load, &path).await?;
        info!("Loaded {:?} ({:.2}s)", clip.path, clip.duration);
        Ok(clip)
    }

    async fn trim(&self, clip: Clip, start: f64, end: Option<f64>) -> Result<Clip> {
        let output = self.intermediate("mp4");
        let args = self.trim_args(&clip, start, end, &output);
        self.render(Stage::Trim, &args, &output).await
    }

    async fn change_speed(&self, clip: Clip, factor: f64) -> Result<Clip> {
        let output = self.intermediate("mp4");
        let args = self.speed_args(&clip, factor, &output);
        self.render(Stage::Speed, &args, &output).await
    }

    async fn apply_overlays(&self, clip: Clip, plans: &[OverlayPlan]) -> Result<Clip> {
        if plans.is_empty() {
            return Ok(clip);
        }

        let text_files = self.write_caption_files(plans).await?;
        let filter = self.config.style.filter_chain(plans, &text_files);

        let output = self.intermediate("mp4");
        let args = self.overlay_args(&clip, &filter, &output);
        let composed = self.render(Stage::Overlay, &args, &output).await;

        Self::remove_scratch(&text_files).await;
        composed
    }

    async fn merge_audio(&self, clip: Clip, audio_path: &Path) -> Result<Clip> {
        if !fs::try_exists(audio_path).await.unwrap_or(false) {
            return Err(EditError::invalid_input(audio_path, "audio file not found"));
        }

        let output = self.intermediate("mp4");
        let args = self.audio_args(&clip, audio_path, &output);
        self.render(Stage::Audio, &args, &output).await
    }

    async fn export(&self, clip: &Clip, output: &Path, settings: &ExportSettings) -> Result<()> {
        let args = Self::export_args(clip, output, settings);
        self.run_ffmpeg(Stage::Export, &args).await?;
        info!("Exported {:?}", output);
        Ok(())
    }

    async fn stitch(&self, paths: &[PathBuf]) -> Result<Clip> {
        if paths.is_empty() {
            return Err(EditError::InvalidConfig("no clips to stitch".to_string()));
        }

        let mut clips = Vec::with_capacity(paths.len());
        for path in paths {
            clips.push(self.load(path).await?);
        }
        ensure_uniform(&clips)?;

        let sources: Vec<PathBuf> = clips.into_iter().map(|c| c.path).collect();
        let list_file = self
            .write_scratch(Stage::Stitch, concat_list(&sources).as_bytes())
            .await?;

        let output = self.intermediate("mp4");
        let args = self.concat_args(&list_file, &output);
        let stitched = self.render(Stage::Stitch, &args, &output).await;

        Self::remove_scratch(std::slice::from_ref(&list_file)).await;
        let stitched = stitched?;
        info!("Stitched {} clips ({:.2}s)", sources.len(), stitched.duration);
        Ok(stitched)
    }
}
