use anyhow::{Context, Result};
use chrono::Local;
use piclock_core::{load_entries, ClockConfig, Refresh};

use crate::render::Render;

/// Read the current event file once, the same way a refresh would.
pub fn run(config: ClockConfig, json: bool) -> Result<()> {
    let paths = config.paths()?;
    let today = Local::now().format("%Y-%m-%d").to_string();

    let refresh = load_entries(
        &paths.events,
        &paths.response,
        &today,
        &config.token_expired_marker,
    );

    if json {
        let output = serde_json::to_string_pretty(refresh.records())
            .context("Failed to serialize records")?;
        println!("{}", output);
        return Ok(());
    }

    if let Refresh::Failed(_) = refresh {
        eprintln!("No event file at {}", paths.events.display());
    }
    for record in refresh.records() {
        println!("{}", record.render());
    }

    Ok(())
}
