//! Failure classification.
//!
//! When the event file is missing, the fetcher's stderr (the response file)
//! tells us whether the stored OAuth token has expired. That case needs the
//! operator to re-authorize by hand, so it gets its own instructions on screen.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::event_record::{EventRecord, pad_to_slots};
use crate::parser::lossy_lines;

/// Default marker the Google client prints when the refresh token is dead.
pub const DEFAULT_TOKEN_EXPIRED_MARKER: &str = "Token has been expired";

/// Shown when nothing better can be said about the failure.
pub const FETCH_FAILED: &str = "data fetch failed";

/// Steps for re-authorizing the fetcher, one per slot.
pub const TOKEN_REFRESH_SCRIPT: [&str; 5] = [
    "** Token refresh time **",
    "   cd calendar",
    "   rm token.json",
    "   python clock.py",
    "   wait for the browser and agree",
];

/// Why the last fetch produced no event file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TokenExpired,
    Generic,
}

/// Decide what went wrong by scanning the response file for `marker`.
pub fn classify_failure(response_path: &Path, marker: &str) -> FailureKind {
    let file = match File::open(response_path) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(path = %response_path.display(), error = %e, "response file unavailable");
            return FailureKind::Generic;
        }
    };

    let expired = lossy_lines(BufReader::new(file)).any(|line| line.contains(marker));

    if expired {
        FailureKind::TokenExpired
    } else {
        FailureKind::Generic
    }
}

/// Build the five display entries for a failed fetch.
pub fn classify(response_path: &Path, marker: &str) -> Vec<EventRecord> {
    let kind = classify_failure(response_path, marker);
    tracing::warn!(?kind, "calendar fetch failed");

    let records = match kind {
        FailureKind::TokenExpired => TOKEN_REFRESH_SCRIPT
            .iter()
            .map(|line| EventRecord::alert(*line))
            .collect(),
        FailureKind::Generic => vec![EventRecord::alert(FETCH_FAILED)],
    };

    pad_to_slots(records)
}
