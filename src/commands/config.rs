use std::path::PathBuf;

use anyhow::Result;
use owo_colors::OwoColorize;
use piclock_core::ClockConfig;

pub fn run(config: ClockConfig, config_path: Option<PathBuf>) -> Result<()> {
    let config_path = match config_path {
        Some(path) => path,
        None => ClockConfig::config_path()?,
    };
    let paths = config.paths()?;
    let schedule = config.schedule;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Data:       {}", paths.data_dir.display());
    println!("  Events:     {}", paths.events.display());
    println!("  Response:   {}", paths.response.display());

    println!();
    println!("{}", "Fetcher".bold());
    println!("  Command:    {} {}", config.fetch.command, config.fetch.args.join(" "));

    println!();
    println!("{}", "Schedule".bold());
    println!("  First fetch after   {}s", schedule.startup_delay);
    println!("  Fetch launched      {}s before reading", schedule.pre_fire_offset);
    println!("  Refresh every       {}s", schedule.refresh_period);
    println!(
        "  Retry every         {}s, up to {} times",
        schedule.retry_interval, schedule.retry_limit
    );

    Ok(())
}
