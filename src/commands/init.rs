use std::path::Path;

use anyhow::{Context, Result};
use piclock_core::ClockConfig;

pub fn run(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}\n\
            Use --force to overwrite it.",
            path.display()
        );
    }

    ClockConfig::create_default_config(path)
        .with_context(|| format!("Failed to create config at {}", path.display()))?;

    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("piclock").join("config.toml");

        run(&path, false).unwrap();
        assert!(path.exists());
        assert!(run(&path, false).is_err());
        run(&path, true).unwrap();
    }
}
