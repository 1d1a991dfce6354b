//! The refresh state machine.
//!
//! Driven by one `tick` per second. Each cycle counts down, launches the
//! fetcher `pre_fire_offset` ticks before the end, and at zero reads whatever
//! the fetcher left behind:
//!
//! ```text
//!  countdown:  N ... offset+1 | offset | ... 1 | 0
//!              counting       | launch |       | refresh, re-arm
//! ```
//!
//! Nothing synchronizes with the fetcher itself. If it is still running at
//! zero, the event file is absent and the cycle counts as a failed fetch.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::classifier::classify;
use crate::clock::{ClockFace, TodayMarker};
use crate::config::{ClockConfig, FetchPaths, ScheduleConfig};
use crate::display::DisplaySink;
use crate::error::ClockResult;
use crate::event_record::{EventRecord, pad_to_slots};
use crate::launcher::Launch;
use crate::parser::parse_event_file;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Counting,
    Launched,
    Refreshed,
    Failed { retry_count: u32 },
}

/// Result of reading the fetcher's output once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// The event file was read; records padded to five slots
    Fetched(Vec<EventRecord>),
    /// No event file; records describe the failure
    Failed(Vec<EventRecord>),
}

impl Refresh {
    pub fn records(&self) -> &[EventRecord] {
        match self {
            Refresh::Fetched(records) | Refresh::Failed(records) => records,
        }
    }
}

/// Read the event file, or classify the failure if there is none.
pub fn load_entries(events: &Path, response: &Path, today: &str, marker: &str) -> Refresh {
    match parse_event_file(events, today) {
        Some(records) => Refresh::Fetched(pad_to_slots(records)),
        None => Refresh::Failed(classify(response, marker)),
    }
}

pub struct RefreshScheduler<L: Launch> {
    schedule: ScheduleConfig,
    /// Re-arm value after success: `refresh_period`, or the test period
    success_period: u32,
    events_path: PathBuf,
    response_path: PathBuf,
    token_expired_marker: String,
    launcher: L,

    countdown: u32,
    retry_count: u32,
    launch_pending: bool,
    today: TodayMarker,
}

impl<L: Launch> RefreshScheduler<L> {
    pub fn new(
        schedule: ScheduleConfig,
        paths: &FetchPaths,
        token_expired_marker: impl Into<String>,
        launcher: L,
    ) -> ClockResult<Self> {
        schedule.validate()?;
        Ok(RefreshScheduler {
            schedule,
            success_period: schedule.refresh_period,
            events_path: paths.events.clone(),
            response_path: paths.response.clone(),
            token_expired_marker: token_expired_marker.into(),
            launcher,
            countdown: schedule.startup_delay,
            retry_count: 0,
            launch_pending: false,
            today: TodayMarker::default(),
        })
    }

    pub fn from_config(config: &ClockConfig, launcher: L) -> ClockResult<Self> {
        Self::new(
            config.schedule,
            &config.paths()?,
            config.token_expired_marker.clone(),
            launcher,
        )
    }

    /// Refresh on the short test period after a successful read.
    pub fn test_mode(mut self) -> Self {
        self.success_period = self.schedule.test_refresh_period;
        self
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn today(&self) -> &str {
        self.today.as_str()
    }

    /// Advance one second.
    pub fn tick(&mut self, now: NaiveDateTime, sink: &mut dyn DisplaySink) -> TickOutcome {
        self.today.observe(now);
        sink.show_clock(&ClockFace::at(now));

        self.countdown = self.countdown.saturating_sub(1);

        if self.countdown == self.schedule.pre_fire_offset {
            return self.start_fetch();
        }
        if self.countdown == 0 {
            return self.refresh(sink);
        }
        TickOutcome::Counting
    }

    /// Ask for a fetch on the next tick.
    ///
    /// Ignored while a fetch is already launched and waiting to be read, so
    /// repeated requests never start a second fetcher. Returns whether the
    /// request was accepted.
    pub fn request_refresh(&mut self) -> bool {
        if self.launch_pending || self.countdown <= self.schedule.pre_fire_offset {
            tracing::debug!(countdown = self.countdown, "refresh already in progress");
            return false;
        }
        tracing::info!("manual refresh requested");
        self.countdown = self.schedule.pre_fire_offset + 1;
        true
    }

    fn start_fetch(&mut self) -> TickOutcome {
        if self.launch_pending {
            return TickOutcome::Counting;
        }
        self.launcher.launch();
        self.launch_pending = true;
        TickOutcome::Launched
    }

    fn refresh(&mut self, sink: &mut dyn DisplaySink) -> TickOutcome {
        self.launch_pending = false;

        let refresh = load_entries(
            &self.events_path,
            &self.response_path,
            self.today.as_str(),
            &self.token_expired_marker,
        );

        let outcome = match refresh {
            Refresh::Fetched(_) => {
                self.retry_count = 0;
                self.countdown = self.success_period;
                tracing::info!(next_in = self.countdown, "calendar refreshed");
                TickOutcome::Refreshed
            }
            Refresh::Failed(_) => {
                if self.retry_count < self.schedule.retry_limit {
                    self.retry_count += 1;
                }
                self.countdown = if self.retry_count < self.schedule.retry_limit {
                    self.schedule.retry_interval
                } else {
                    self.success_period
                };
                tracing::info!(
                    retry_count = self.retry_count,
                    next_in = self.countdown,
                    "calendar refresh failed"
                );
                TickOutcome::Failed {
                    retry_count: self.retry_count,
                }
            }
        };

        sink.show_events(refresh.records());
        outcome
    }
}
