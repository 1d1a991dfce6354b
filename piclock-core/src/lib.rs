//! Refresh engine for the piclock wall clock.
//!
//! Once a second the host calls [`RefreshScheduler::tick`]. The scheduler
//! launches an external fetcher, reads the event file it writes, and hands
//! five display entries to a [`DisplaySink`]:
//! - `parser` turns event file lines into [`EventRecord`]s
//! - `classifier` explains a missing event file using the fetcher's stderr
//! - `launcher` starts the fetcher without waiting for it

pub mod classifier;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod event_record;
pub mod launcher;
pub mod parser;
pub mod scheduler;

pub use clock::ClockFace;
pub use config::{ClockConfig, FetchPaths, ScheduleConfig};
pub use display::DisplaySink;
pub use error::{ClockError, ClockResult};
pub use event_record::{EventRecord, Highlight, SLOT_COUNT};
pub use launcher::{FetchLauncher, Launch};
pub use scheduler::{Refresh, RefreshScheduler, TickOutcome, load_entries};
