//! Fetcher subprocess launching.
//!
//! The fetcher is an independent executable (by default `python clock.py`)
//! that writes the event file itself. Its stderr goes to the response file so
//! that failures can be classified later.
//!
//! Launching is fire-and-forget: the scheduler never waits for the fetcher
//! and never learns whether it started. A fetcher that could not be spawned
//! simply leaves no event file behind.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};
use tokio::runtime::Handle;

use crate::config::{FetchConfig, FetchPaths};
use crate::error::{ClockError, ClockResult};

/// Starts a background fetch. Must not block and must not fail loudly.
pub trait Launch {
    fn launch(&self);
}

/// Launches the configured fetcher command in the data directory.
#[derive(Debug, Clone)]
pub struct FetchLauncher {
    command: String,
    args: Vec<String>,
    paths: FetchPaths,
    dry_run: bool,
}

impl FetchLauncher {
    pub fn new(fetch: &FetchConfig, paths: FetchPaths) -> Self {
        FetchLauncher {
            command: fetch.command.clone(),
            args: fetch.args.clone(),
            paths,
            dry_run: false,
        }
    }

    /// Log instead of launching. Used by test mode.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Resolve the fetcher binary: explicit paths are used as-is, bare names
    /// are looked up in PATH.
    fn binary_path(&self) -> ClockResult<PathBuf> {
        if self.command.contains(['/', std::path::MAIN_SEPARATOR]) {
            return Ok(PathBuf::from(&self.command));
        }
        which::which(&self.command).map_err(|_| ClockError::FetcherNotInstalled(self.command.clone()))
    }

    /// Remove last cycle's output so a later read cannot see stale data.
    fn remove_stale_files(&self) {
        for path in [&self.paths.response, &self.paths.events] {
            if let Err(e) = remove_if_exists(path) {
                tracing::warn!(path = %path.display(), error = %e, "could not remove stale fetch output");
            }
        }
    }

    fn spawn(&self) -> ClockResult<Child> {
        let binary_path = self.binary_path()?;
        let response = File::create(&self.paths.response).map_err(|e| {
            ClockError::Launch(format!(
                "Could not create {}: {}",
                self.paths.response.display(),
                e
            ))
        })?;

        Command::new(&binary_path)
            .args(&self.args)
            .current_dir(&self.paths.data_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(response))
            .spawn()
            .map_err(|e| ClockError::Launch(format!("Failed to spawn {}: {}", binary_path.display(), e)))
    }
}

impl Launch for FetchLauncher {
    fn launch(&self) {
        if self.dry_run {
            tracing::info!(command = %self.command, "test mode, not launching fetcher");
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("no async runtime available, fetcher not launched");
            return;
        };

        self.remove_stale_files();

        match self.spawn() {
            Ok(child) => {
                tracing::debug!(command = %self.command, pid = ?child.id(), "fetcher launched");
                // Detached: only reaps the process and logs how it ended.
                handle.spawn(reap(child, self.command.clone()));
            }
            Err(e) => tracing::warn!(error = %e, "fetcher launch failed"),
        }
    }
}

async fn reap(mut child: Child, command: String) {
    match child.wait().await {
        Ok(status) if status.success() => tracing::debug!(%command, "fetcher finished"),
        Ok(status) => tracing::warn!(%command, code = ?status.code(), "fetcher exited with failure"),
        Err(e) => tracing::warn!(%command, error = %e, "could not wait for fetcher"),
    }
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
