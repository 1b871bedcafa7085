//! `clipcue` CLI - plan captions from text and apply scripted edits to videos

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "clipcue")]
#[command(about = "Caption planning and scripted video edits on top of ffmpeg")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/clipcue/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit a video: stitch, trim, speed, captions, audio
    Edit(EditArgs),

    /// Plan caption overlays for a text without touching any media
    Plan {
        /// Text to turn into captions
        text: String,

        /// Clip duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Maximum overlays to keep
        #[arg(long)]
        max_items: Option<usize>,

        /// Minimum overlay duration in seconds
        #[arg(long)]
        min_duration: Option<f64>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that ffmpeg and ffprobe are available
    Check,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Source video
    input: PathBuf,

    /// Destination video
    output: PathBuf,

    /// Text describing the video; turned into caption overlays
    #[arg(short, long)]
    prompt: Option<String>,

    /// Trim start in seconds
    #[arg(long)]
    start: Option<f64>,

    /// Trim end in seconds
    #[arg(long)]
    end: Option<f64>,

    /// Playback speed factor
    #[arg(long, default_value = "1.0")]
    speed: f64,

    /// Replacement audio track
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Videos appended to the input before editing
    #[arg(long, num_args = 1..)]
    stitch: Vec<PathBuf>,

    /// Manual caption (repeatable)
    #[arg(long)]
    overlay: Vec<String>,

    /// Maximum overlays per text source
    #[arg(long)]
    max_items: Option<usize>,

    /// Minimum overlay duration in seconds
    #[arg(long)]
    min_duration: Option<f64>,

    /// Output frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Output video codec
    #[arg(long)]
    codec: Option<String>,

    /// Output audio codec
    #[arg(long)]
    audio_codec: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Edit(args) => {
            cmd::cmd_edit(&args, config).await?;
        }
        Commands::Plan {
            text,
            duration,
            max_items,
            min_duration,
            json,
        } => {
            cmd::cmd_plan(&text, duration, max_items, min_duration, json, config)?;
        }
        Commands::Check => {
            cmd::cmd_check(config).await?;
        }
    }

    Ok(())
}
