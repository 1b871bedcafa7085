//! Integration tests for the edit pipeline.
//!
//! A recording compositor stands in for ffmpeg so stage order, skipped
//! stages and failure propagation can be asserted from the call log.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_test::{assert_err, assert_ok};

use clipcue::{
    Clip, Compositor, EditError, EditPipeline, ExportSettings, OverlayPlan, OverlayPosition,
    PipelineConfiguration, Planner, Result, Stage,
};

/// One recorded compositor call
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load(PathBuf),
    Trim(f64, Option<f64>),
    Speed(f64),
    Overlays(Vec<OverlayPlan>),
    Audio(PathBuf),
    Export(PathBuf),
    Stitch(Vec<PathBuf>),
}

/// Compositor double: durations follow the requested edits, nothing touches disk
struct RecordingCompositor {
    source_duration: f64,
    fail_at: Option<Stage>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingCompositor {
    fn new(source_duration: f64) -> Self {
        Self {
            source_duration,
            fail_at: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_at(mut self, stage: Stage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    fn record(&self, call: Call, stage: Stage) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_at == Some(stage) {
            return Err(EditError::Composition {
                stage,
                message: "simulated failure".to_string(),
            });
        }
        Ok(())
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    fn applied_overlays(&self) -> Vec<OverlayPlan> {
        self.calls()
            .into_iter()
            .find_map(|c| match c {
                Call::Overlays(plans) => Some(plans),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Compositor for RecordingCompositor {
    async fn load(&self, path: &Path) -> Result<Clip> {
        self.record(Call::Load(path.to_path_buf()), Stage::Load)?;
        Ok(Clip::new(path, self.source_duration))
    }

    async fn trim(&self, clip: Clip, start: f64, end: Option<f64>) -> Result<Clip> {
        self.record(Call::Trim(start, end), Stage::Trim)?;
        let end = end.unwrap_or(clip.duration).min(clip.duration);
        Ok(Clip::new(clip.path, end - start))
    }

    async fn change_speed(&self, clip: Clip, factor: f64) -> Result<Clip> {
        self.record(Call::Speed(factor), Stage::Speed)?;
        Ok(Clip::new(clip.path, clip.duration / factor))
    }

    async fn apply_overlays(&self, clip: Clip, plans: &[OverlayPlan]) -> Result<Clip> {
        self.record(Call::Overlays(plans.to_vec()), Stage::Overlay)?;
        Ok(clip)
    }

    async fn merge_audio(&self, clip: Clip, audio_path: &Path) -> Result<Clip> {
        self.record(Call::Audio(audio_path.to_path_buf()), Stage::Audio)?;
        Ok(clip)
    }

    async fn export(&self, _clip: &Clip, output: &Path, _settings: &ExportSettings) -> Result<()> {
        self.record(Call::Export(output.to_path_buf()), Stage::Export)
    }

    async fn stitch(&self, paths: &[PathBuf]) -> Result<Clip> {
        self.record(Call::Stitch(paths.to_vec()), Stage::Stitch)?;
        Ok(Clip::new("stitched.mp4", self.source_duration * paths.len() as f64))
    }
}

fn pipeline(compositor: RecordingCompositor) -> EditPipeline<RecordingCompositor> {
    EditPipeline::new(compositor, ExportSettings::default())
}

// ─── Stage sequencing ────────────────────────────────────────────────────────

#[tokio::test]
async fn plain_load_only_touches_load() {
    let p = pipeline(RecordingCompositor::new(10.0));
    let config = PipelineConfiguration::new("in.mp4");

    let clip = assert_ok!(p.build(&config).await);

    assert_eq!(clip.duration, 10.0);
    assert_eq!(p.compositor().calls(), vec![Call::Load(PathBuf::from("in.mp4"))]);
}

#[tokio::test]
async fn full_run_follows_fixed_order() {
    let p = pipeline(RecordingCompositor::new(60.0));
    let config = PipelineConfiguration::new("in.mp4")
        .with_trim(Some(10.0), Some(30.0))
        .with_speed(2.0)
        .with_prompt("AI makes editing fast.")
        .with_audio("music.mp3");

    let result = assert_ok!(p.run(&config, Path::new("out.mp4")).await);

    let calls = p.compositor().calls();
    assert_eq!(calls.len(), 6);
    assert_eq!(calls[0], Call::Load(PathBuf::from("in.mp4")));
    assert_eq!(calls[1], Call::Trim(10.0, Some(30.0)));
    assert_eq!(calls[2], Call::Speed(2.0));
    assert!(matches!(calls[3], Call::Overlays(_)));
    assert_eq!(calls[4], Call::Audio(PathBuf::from("music.mp3")));
    assert_eq!(calls[5], Call::Export(PathBuf::from("out.mp4")));

    assert_eq!(result.output_path, PathBuf::from("out.mp4"));
    assert_eq!(result.overlays.len(), 1);
}

#[tokio::test]
async fn build_does_not_export() {
    let p = pipeline(RecordingCompositor::new(10.0));
    let config = PipelineConfiguration::new("in.mp4").with_overlay("Hello");

    assert_ok!(p.build(&config).await);

    assert_eq!(p.compositor().count(|c| matches!(c, Call::Export(_))), 0);
}

#[tokio::test]
async fn trim_end_only_starts_at_zero() {
    let p = pipeline(RecordingCompositor::new(20.0));
    let config = PipelineConfiguration::new("in.mp4").with_trim(None, Some(5.0));

    let clip = assert_ok!(p.build(&config).await);

    assert!(p.compositor().calls().contains(&Call::Trim(0.0, Some(5.0))));
    assert_eq!(clip.duration, 5.0);
}

#[tokio::test]
async fn trim_start_only_keeps_natural_end() {
    let p = pipeline(RecordingCompositor::new(20.0));
    let config = PipelineConfiguration::new("in.mp4").with_trim(Some(4.0), None);

    let clip = assert_ok!(p.build(&config).await);

    assert!(p.compositor().calls().contains(&Call::Trim(4.0, None)));
    assert_eq!(clip.duration, 16.0);
}

// ─── Speed change ────────────────────────────────────────────────────────────

#[tokio::test]
async fn unit_speed_skips_speed_stage() {
    let p = pipeline(RecordingCompositor::new(10.0));
    let config = PipelineConfiguration::new("in.mp4")
        .with_speed(1.0)
        .with_prompt("Some caption text.");

    assert_ok!(p.run(&config, Path::new("out.mp4")).await);

    assert_eq!(p.compositor().count(|c| matches!(c, Call::Speed(_))), 0);
}

#[tokio::test]
async fn non_unit_speed_runs_once() {
    let p = pipeline(RecordingCompositor::new(10.0));
    let config = PipelineConfiguration::new("in.mp4").with_speed(0.5);

    let clip = assert_ok!(p.build(&config).await);

    assert_eq!(p.compositor().count(|c| matches!(c, Call::Speed(_))), 1);
    assert_eq!(clip.duration, 20.0);
}

// ─── Overlay planning ────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_prompt_skips_overlay_stage() {
    let p = pipeline(RecordingCompositor::new(10.0));
    let config = PipelineConfiguration::new("in.mp4").with_prompt("");

    let result = assert_ok!(p.run(&config, Path::new("out.mp4")).await);

    assert!(result.overlays.is_empty());
    assert_eq!(p.compositor().count(|c| matches!(c, Call::Overlays(_))), 0);
}

#[tokio::test]
async fn overlays_planned_on_edited_duration() {
    let p = pipeline(RecordingCompositor::new(100.0));
    let config = PipelineConfiguration::new("in.mp4")
        .with_trim(Some(0.0), Some(40.0))
        .with_speed(2.0)
        .with_overlay("First caption")
        .with_overlay("Second caption");

    assert_ok!(p.build(&config).await);

    // 40s trimmed, played at 2x = 20s; two slots of 10s
    let plans = p.compositor().applied_overlays();
    let starts: Vec<f64> = plans.iter().map(|p| p.start).collect();
    assert_eq!(starts, vec![0.0, 10.0]);
    assert!(plans.iter().all(|p| (p.duration - 20.0 / 3.0).abs() < 1e-9));
}

#[tokio::test]
async fn prompt_plans_precede_manual_plans() {
    let p = pipeline(RecordingCompositor::new(12.0));
    let config = PipelineConfiguration::new("in.mp4")
        .with_prompt("Short one. Another short line.")
        .with_overlay("This manual caption has far more distinct words than any prompt sentence")
        .with_overlay("Second manual caption");

    assert_ok!(p.build(&config).await);

    let plans = p.compositor().applied_overlays();
    let texts: Vec<&str> = plans.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Another short line",
            "Short one",
            "This manual caption has far more distinct words than any prompt sentence",
            "Second manual caption",
        ]
    );

    // Each source gets its own allocation, each starting at bottom / 0s
    assert_eq!(plans[0].start, 0.0);
    assert_eq!(plans[2].start, 0.0);
    assert_eq!(plans[0].position, OverlayPosition::Bottom);
    assert_eq!(plans[1].position, OverlayPosition::Top);
    assert_eq!(plans[2].position, OverlayPosition::Bottom);
    assert_eq!(plans[3].position, OverlayPosition::Top);
}

#[tokio::test]
async fn planner_limits_apply_per_source() {
    let p = pipeline(RecordingCompositor::new(30.0));
    let config = PipelineConfiguration::new("in.mp4")
        .with_planner(Planner::new(1, 2.5))
        .with_prompt("One. Two. Three.")
        .with_overlay("Alpha")
        .with_overlay("Beta");

    assert_ok!(p.build(&config).await);

    assert_eq!(p.compositor().applied_overlays().len(), 2);
}

// ─── Stitching ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn stitch_runs_first_and_feeds_load() {
    let p = pipeline(RecordingCompositor::new(5.0));
    let config = PipelineConfiguration::new("a.mp4")
        .with_stitch(vec![PathBuf::from("b.mp4"), PathBuf::from("c.mp4")])
        .with_stitch_path("/tmp/joined.mp4")
        .with_trim(Some(1.0), None);

    assert_ok!(p.build(&config).await);

    let calls = p.compositor().calls();
    assert_eq!(
        calls[0],
        Call::Stitch(vec![
            PathBuf::from("a.mp4"),
            PathBuf::from("b.mp4"),
            PathBuf::from("c.mp4"),
        ])
    );
    assert_eq!(calls[1], Call::Export(PathBuf::from("/tmp/joined.mp4")));
    assert_eq!(calls[2], Call::Load(PathBuf::from("/tmp/joined.mp4")));
    assert_eq!(calls[3], Call::Trim(1.0, None));
}

#[tokio::test]
async fn no_stitch_list_skips_stitch() {
    let p = pipeline(RecordingCompositor::new(5.0));
    let config = PipelineConfiguration::new("a.mp4");

    assert_ok!(p.build(&config).await);

    assert_eq!(p.compositor().count(|c| matches!(c, Call::Stitch(_))), 0);
}

// ─── Failures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn audio_failure_aborts_without_export() {
    let p = pipeline(RecordingCompositor::new(10.0).failing_at(Stage::Audio));
    let config = PipelineConfiguration::new("in.mp4").with_audio("broken.wav");

    let err = assert_err!(p.run(&config, Path::new("out.mp4")).await);

    assert_eq!(err.stage(), Some(Stage::Audio));
    assert_eq!(p.compositor().count(|c| matches!(c, Call::Export(_))), 0);
}

#[tokio::test]
async fn trim_failure_stops_later_stages() {
    let p = pipeline(RecordingCompositor::new(10.0).failing_at(Stage::Trim));
    let config = PipelineConfiguration::new("in.mp4")
        .with_trim(Some(1.0), Some(2.0))
        .with_speed(2.0)
        .with_prompt("Caption text.");

    let err = assert_err!(p.build(&config).await);

    assert_eq!(err.stage(), Some(Stage::Trim));
    assert_eq!(p.compositor().calls().len(), 2);
}

#[tokio::test]
async fn stitch_failure_prevents_load() {
    let p = pipeline(RecordingCompositor::new(10.0).failing_at(Stage::Stitch));
    let config = PipelineConfiguration::new("a.mp4").with_stitch(vec![PathBuf::from("b.mp4")]);

    let err = assert_err!(p.build(&config).await);

    assert_eq!(err.stage(), Some(Stage::Stitch));
    assert_eq!(p.compositor().count(|c| matches!(c, Call::Load(_))), 0);
}

#[tokio::test]
async fn invalid_configuration_rejected_before_media_work() {
    let p = pipeline(RecordingCompositor::new(10.0));
    let config = PipelineConfiguration::new("in.mp4").with_speed(0.0);

    let err = assert_err!(p.build(&config).await);

    assert!(matches!(err, EditError::InvalidConfig(_)));
    assert!(p.compositor().calls().is_empty());
}

#[tokio::test]
async fn zero_fps_rejected() {
    let p = EditPipeline::new(
        RecordingCompositor::new(10.0),
        ExportSettings {
            fps: 0,
            ..Default::default()
        },
    );
    let config = PipelineConfiguration::new("in.mp4");

    let err = assert_err!(p.run(&config, Path::new("out.mp4")).await);

    assert!(matches!(err, EditError::InvalidConfig(_)));
    assert!(p.compositor().calls().is_empty());
}
