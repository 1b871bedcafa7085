use std::path::Path;

use anyhow::Result;

use clipcue::compositor::FfmpegCompositor;
use clipcue::config::AppConfig;
use clipcue::pipeline::{EditPipeline, PipelineConfiguration};
use clipcue::plan::Planner;

use crate::EditArgs;

pub async fn cmd_edit(args: &EditArgs, config_path: Option<&Path>) -> Result<()> {
    let app = AppConfig::load(config_path)?;

    let planner = Planner::new(
        args.max_items.unwrap_or(app.planner.max_items),
        args.min_duration.unwrap_or(app.planner.min_duration),
    );

    let mut export = app.export.clone();
    if let Some(fps) = args.fps {
        export.fps = fps;
    }
    if let Some(ref codec) = args.codec {
        export.video_codec.clone_from(codec);
    }
    if let Some(ref codec) = args.audio_codec {
        export.audio_codec.clone_from(codec);
    }

    let mut config = PipelineConfiguration::new(&args.input)
        .with_trim(args.start, args.end)
        .with_speed(args.speed)
        .with_stitch(args.stitch.clone())
        .with_planner(planner)
        .with_stitch_path(&app.stitch_path);

    if let Some(ref prompt) = args.prompt {
        config = config.with_prompt(prompt);
    }
    if let Some(ref audio) = args.audio {
        config = config.with_audio(audio);
    }
    for overlay in &args.overlay {
        config = config.with_overlay(overlay);
    }

    eprintln!("🎬 Editing: {}", args.input.display());
    eprintln!("   Output: {}", args.output.display());
    if !args.stitch.is_empty() {
        eprintln!("   Stitching: {} extra clips", args.stitch.len());
    }
    if args.start.is_some() || args.end.is_some() {
        eprintln!("   Trim: {:?} - {:?}", args.start, args.end);
    }
    if args.prompt.is_some() {
        eprintln!("   Prompt captions: enabled");
    }
    if !args.overlay.is_empty() {
        eprintln!("   Manual captions: {}", args.overlay.len());
    }

    let compositor = FfmpegCompositor::new(app.compositor_config())?;
    let pipeline = EditPipeline::new(compositor, export);

    let result = pipeline.run(&config, &args.output).await;
    pipeline.compositor().cleanup().await;
    let result = result?;

    eprintln!("\n✅ Edit complete in {:.1}s", result.processing_time_secs);
    eprintln!("   Duration: {:.2}s", result.duration);
    eprintln!("   Overlays: {}", result.overlays.len());

    println!("{}", result.output_path.display());

    Ok(())
}
