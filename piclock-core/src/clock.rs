//! Wall clock strings and the cached "today" marker.

use chrono::{Datelike, NaiveDateTime, Weekday};

/// Time, day and date as shown above the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFace {
    /// `HH:MM:SS`
    pub time: String,
    /// English weekday name
    pub day: String,
    /// `DD-MM-YYYY`
    pub date: String,
}

impl ClockFace {
    pub fn at(now: NaiveDateTime) -> Self {
        ClockFace {
            time: now.format("%H:%M:%S").to_string(),
            day: now.format("%A").to_string(),
            date: now.format("%d-%m-%Y").to_string(),
        }
    }
}

/// The current local date as `YYYY-MM-DD`, recomputed only when the weekday
/// changes.
#[derive(Debug, Clone, Default)]
pub struct TodayMarker {
    weekday: Option<Weekday>,
    today: String,
}

impl TodayMarker {
    /// Update for `now`. Returns true if the day rolled over (or on first use).
    pub fn observe(&mut self, now: NaiveDateTime) -> bool {
        let weekday = now.weekday();
        if self.weekday == Some(weekday) {
            return false;
        }
        self.weekday = Some(weekday);
        self.today = now.format("%Y-%m-%d").to_string();
        tracing::debug!(today = %self.today, "day changed");
        true
    }

    pub fn as_str(&self) -> &str {
        &self.today
    }
}
