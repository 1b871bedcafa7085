use std::path::Path;

use anyhow::Result;

use clipcue::config::AppConfig;
use clipcue::plan::Planner;

pub fn cmd_plan(
    text: &str,
    duration: f64,
    max_items: Option<usize>,
    min_duration: Option<f64>,
    json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let app = AppConfig::load(config_path)?;
    let planner = Planner::new(
        max_items.unwrap_or(app.planner.max_items),
        min_duration.unwrap_or(app.planner.min_duration),
    );

    let plans = planner.plan_overlays(text, duration);

    if json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    if plans.is_empty() {
        println!("No overlays planned");
        return Ok(());
    }

    for (i, plan) in plans.iter().enumerate() {
        println!(
            "{:>2}. {:>7.2}s - {:>7.2}s  {:<6}  {}",
            i + 1,
            plan.start,
            plan.end(),
            plan.position.as_str(),
            plan.text
        );
    }

    Ok(())
}
