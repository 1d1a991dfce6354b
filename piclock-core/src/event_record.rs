//! Display-ready calendar entries.
//!
//! One `EventRecord` fills one of the five calendar slots on the clock face.
//! Records are rebuilt wholesale on every refresh.

use serde::Serialize;

/// Number of calendar slots on the clock face.
pub const SLOT_COUNT: usize = 5;

/// Text substituted for the start time of an event without one.
pub const ALL_DAY: &str = "all day";

/// How an entry should be emphasized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    /// The event falls on the current local date
    Today,
    /// Any other entry
    Other,
    /// Fetch diagnostics and failure messages
    Error,
}

/// One line of the calendar display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventRecord {
    /// Event without a time component
    AllDay {
        date: String,
        text: String,
        highlight: Highlight,
    },
    /// Event with a start time (HH:MM)
    Timed {
        date: String,
        time: String,
        text: String,
        highlight: Highlight,
    },
    /// Diagnostic line passed through verbatim from the fetcher
    ErrorLine { text: String },
    /// Synthetic entry: padding or a failure message
    Placeholder { text: String, highlight: Highlight },
}

impl EventRecord {
    /// A normal-tag empty entry used to fill unused slots.
    pub fn blank() -> Self {
        EventRecord::Placeholder {
            text: String::new(),
            highlight: Highlight::Other,
        }
    }

    /// An alert-tagged synthetic entry.
    pub fn alert(text: impl Into<String>) -> Self {
        EventRecord::Placeholder {
            text: text.into(),
            highlight: Highlight::Error,
        }
    }

    pub fn highlight(&self) -> Highlight {
        match self {
            EventRecord::AllDay { highlight, .. }
            | EventRecord::Timed { highlight, .. }
            | EventRecord::Placeholder { highlight, .. } => *highlight,
            EventRecord::ErrorLine { .. } => Highlight::Error,
        }
    }

    /// The event date, if this record came from a calendar line.
    pub fn date(&self) -> Option<&str> {
        match self {
            EventRecord::AllDay { date, .. } | EventRecord::Timed { date, .. } => Some(date),
            _ => None,
        }
    }

    /// Start time (or "all day") followed by the event text.
    ///
    /// `Timed { time: "12:00", text: "Lunch" }` gives `"12:00 Lunch"`.
    pub fn description(&self) -> String {
        match self {
            EventRecord::AllDay { text, .. } => join(ALL_DAY, text),
            EventRecord::Timed { time, text, .. } => join(time, text),
            EventRecord::ErrorLine { text } | EventRecord::Placeholder { text, .. } => {
                text.clone()
            }
        }
    }

    /// Full line as shown in a slot, date first for calendar entries.
    pub fn display_text(&self) -> String {
        match self.date() {
            Some(date) => join(date, &self.description()),
            None => self.description(),
        }
    }
}

fn join(head: &str, tail: &str) -> String {
    if tail.is_empty() {
        head.to_string()
    } else {
        format!("{head} {tail}")
    }
}

/// Pad (or truncate) a list of records to exactly `SLOT_COUNT` entries.
pub fn pad_to_slots(mut records: Vec<EventRecord>) -> Vec<EventRecord> {
    records.truncate(SLOT_COUNT);
    records.resize_with(SLOT_COUNT, EventRecord::blank);
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_description_starts_with_time() {
        let record = EventRecord::Timed {
            date: "2024-05-01".into(),
            time: "12:00".into(),
            text: "Lunch".into(),
            highlight: Highlight::Other,
        };
        assert_eq!(record.description(), "12:00 Lunch");
        assert_eq!(record.display_text(), "2024-05-01 12:00 Lunch");
    }

    #[test]
    fn all_day_description_uses_marker() {
        let record = EventRecord::AllDay {
            date: "2024-05-01".into(),
            text: "Exercise".into(),
            highlight: Highlight::Today,
        };
        assert_eq!(record.description(), "all day Exercise");
        assert_eq!(record.display_text(), "2024-05-01 all day Exercise");
    }

    #[test]
    fn empty_text_is_still_a_valid_entry() {
        let record = EventRecord::AllDay {
            date: "2024-05-01".into(),
            text: String::new(),
            highlight: Highlight::Other,
        };
        assert_eq!(record.display_text(), "2024-05-01 all day");
    }

    #[test]
    fn error_lines_are_always_alerts() {
        let record = EventRecord::ErrorLine {
            text: "* quota exceeded".into(),
        };
        assert_eq!(record.highlight(), Highlight::Error);
        assert_eq!(record.display_text(), "* quota exceeded");
        assert_eq!(record.date(), None);
    }

    #[test]
    fn pad_fills_with_blanks() {
        let padded = pad_to_slots(vec![EventRecord::alert("boom")]);
        assert_eq!(padded.len(), SLOT_COUNT);
        assert_eq!(padded[0], EventRecord::alert("boom"));
        assert!(padded[1..].iter().all(|r| *r == EventRecord::blank()));
    }

    #[test]
    fn pad_truncates_long_lists() {
        let records = (0..8).map(|i| EventRecord::alert(i.to_string())).collect();
        let padded = pad_to_slots(records);
        assert_eq!(padded.len(), SLOT_COUNT);
        assert_eq!(padded[4], EventRecord::alert("4"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(EventRecord::alert("x")).unwrap();
        assert_eq!(json["kind"], "placeholder");
        assert_eq!(json["highlight"], "error");
    }
}
