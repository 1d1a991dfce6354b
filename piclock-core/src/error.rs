//! Error types for the piclock engine.

use thiserror::Error;

/// Errors that can occur outside the tick path (configuration, launching).
///
/// The tick path itself never surfaces these: failures there degrade to
/// placeholder entries on the display.
#[derive(Error, Debug)]
pub enum ClockError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetcher '{0}' not found in PATH")]
    FetcherNotInstalled(String),

    #[error("Failed to launch fetcher: {0}")]
    Launch(String),
}

/// Result type alias for piclock operations.
pub type ClockResult<T> = Result<T, ClockError>;
