use std::path::Path;

use anyhow::{bail, Result};

use clipcue::compositor::FfmpegCompositor;
use clipcue::config::AppConfig;

pub async fn cmd_check(config_path: Option<&Path>) -> Result<()> {
    let app = AppConfig::load(config_path)?;
    let compositor = FfmpegCompositor::new(app.compositor_config())?;

    let results = compositor.check_available().await;
    compositor.cleanup().await;

    let mut missing = Vec::new();
    for (name, ok) in &results {
        if *ok {
            println!("✅ {name}");
        } else {
            println!("❌ {name}");
            missing.push(name.as_str());
        }
    }

    if !missing.is_empty() {
        bail!("missing dependencies: {}", missing.join(", "));
    }

    Ok(())
}
