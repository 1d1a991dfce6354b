//! Event file parsing.
//!
//! The fetcher writes one event per line in a fixed-width format:
//!
//! ```text
//! 2022-10-13 Exercise
//! 2022-10-13T12:00:00+01:00 Lunch with Robin
//! 2022-11-01T21:00:00Z Recycling
//! * something bad happened
//! ```
//!
//! Fields are cut by width, not validated. A malformed line gives a garbled
//! entry rather than an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::event_record::{EventRecord, Highlight, SLOT_COUNT};

/// Lines starting with this are fetcher diagnostics.
const ERROR_SENTINEL: char = '*';
const TIME_SEPARATOR: char = 'T';
const UTC_MARKER: char = 'Z';

/// `YYYY-MM-DD`
const DATE_WIDTH: usize = 10;
/// `HH:MM:SS`
const TIME_WIDTH: usize = 8;
/// `HH:MM`, seconds are not shown
const SHOWN_TIME_WIDTH: usize = 5;
/// `+01:00` plus the separating space
const OFFSET_WIDTH: usize = 7;
/// `Z` plus the separating space
const UTC_WIDTH: usize = 2;

/// Parse the event file at `path`.
///
/// Returns `None` when the file cannot be opened, which is the normal signal
/// that the fetch failed and the response file should be classified.
pub fn parse_event_file(path: &Path, today: &str) -> Option<Vec<EventRecord>> {
    match File::open(path) {
        Ok(file) => Some(parse_events(BufReader::new(file), today)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "event file unavailable");
            None
        }
    }
}

/// Parse at most `SLOT_COUNT` lines from `reader`. Anything after is ignored.
pub fn parse_events<R: BufRead>(reader: R, today: &str) -> Vec<EventRecord> {
    lossy_lines(reader)
        .take(SLOT_COUNT)
        .map(|line| parse_line(&line, today))
        .collect()
}

/// Lines of `reader`, with invalid UTF-8 replaced rather than ending the read.
///
/// Line terminators are kept. Stops at EOF or on an I/O error.
pub(crate) fn lossy_lines<R: BufRead>(mut reader: R) -> impl Iterator<Item = String> {
    let mut buf = Vec::new();
    std::iter::from_fn(move || {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => Some(String::from_utf8_lossy(&buf).into_owned()),
            Err(e) => {
                tracing::warn!(error = %e, "stopped reading fetcher output");
                None
            }
        }
    })
}

/// Parse a single event line and tag it against `today` (`YYYY-MM-DD`).
pub fn parse_line(line: &str, today: &str) -> EventRecord {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.starts_with(ERROR_SENTINEL) {
        return EventRecord::ErrorLine {
            text: line.to_string(),
        };
    }

    let mut scanner = LineScanner::new(line);
    let date = scanner.take(DATE_WIDTH).to_string();
    let highlight = if date == LineScanner::new(today).take(DATE_WIDTH) {
        Highlight::Today
    } else {
        Highlight::Other
    };

    if scanner.bump() != Some(TIME_SEPARATOR) {
        return EventRecord::AllDay {
            date,
            text: scanner.rest().to_string(),
            highlight,
        };
    }

    let time = LineScanner::new(scanner.take(TIME_WIDTH))
        .take(SHOWN_TIME_WIDTH)
        .to_string();
    match scanner.peek() {
        Some('+' | '-') => scanner.skip(OFFSET_WIDTH),
        Some(UTC_MARKER) => scanner.skip(UTC_WIDTH),
        _ => scanner.skip(1),
    }

    EventRecord::Timed {
        date,
        time,
        text: scanner.rest().to_string(),
        highlight,
    }
}

/// Cuts a line into fixed-width fields, counting characters.
///
/// Running past the end yields short or empty fields, never a panic.
struct LineScanner<'a> {
    rest: &'a str,
}

impl<'a> LineScanner<'a> {
    fn new(line: &'a str) -> Self {
        LineScanner { rest: line }
    }

    fn take(&mut self, width: usize) -> &'a str {
        let end = self
            .rest
            .char_indices()
            .nth(width)
            .map_or(self.rest.len(), |(i, _)| i);
        let (field, rest) = self.rest.split_at(end);
        self.rest = rest;
        field
    }

    fn skip(&mut self, width: usize) {
        self.take(width);
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn rest(self) -> &'a str {
        self.rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TODAY: &str = "2024-05-01";

    fn text_of(record: &EventRecord) -> String {
        record.description()
    }

    // --- all-day events ---

    #[test]
    fn all_day_event_today() {
        let record = parse_line("2024-05-01 Exercise\n", TODAY);
        assert_eq!(
            record,
            EventRecord::AllDay {
                date: "2024-05-01".into(),
                text: "Exercise".into(),
                highlight: Highlight::Today,
            }
        );
    }

    #[test]
    fn all_day_event_other_day() {
        let record = parse_line("2024-05-02 Dentist", TODAY);
        assert_eq!(record.highlight(), Highlight::Other);
        assert_eq!(text_of(&record), "all day Dentist");
    }

    #[test]
    fn all_day_event_with_empty_text() {
        let record = parse_line("2024-05-01", TODAY);
        assert_eq!(
            record,
            EventRecord::AllDay {
                date: "2024-05-01".into(),
                text: String::new(),
                highlight: Highlight::Today,
            }
        );
    }

    // --- timed events ---

    #[test]
    fn timed_event_with_positive_offset() {
        let record = parse_line("2024-05-01T12:00:00+01:00 Lunch", "2024-05-03");
        assert_eq!(text_of(&record), "12:00 Lunch");
        assert_eq!(record.highlight(), Highlight::Other);
    }

    #[test]
    fn timed_event_with_negative_offset() {
        let record = parse_line("2024-05-01T09:30:00-05:00 Standup", TODAY);
        assert_eq!(text_of(&record), "09:30 Standup");
        assert_eq!(record.highlight(), Highlight::Today);
    }

    #[test]
    fn timed_event_in_utc() {
        let record = parse_line("2024-05-01T21:00:00Z Recycling", TODAY);
        assert_eq!(
            record,
            EventRecord::Timed {
                date: "2024-05-01".into(),
                time: "21:00".into(),
                text: "Recycling".into(),
                highlight: Highlight::Today,
            }
        );
    }

    #[test]
    fn timed_event_without_zone_suffix() {
        let record = parse_line("2024-05-01T07:15:00 Alarm", TODAY);
        assert_eq!(text_of(&record), "07:15 Alarm");
    }

    #[test]
    fn description_is_copied_verbatim() {
        let record = parse_line("2024-05-01T12:00:00+01:00 Lunch with Robin  @ café\r\n", TODAY);
        assert_eq!(text_of(&record), "12:00 Lunch with Robin  @ café");
    }

    // --- error lines ---

    #[test]
    fn error_line_is_passed_through() {
        let record = parse_line("* something bad happened\n", TODAY);
        assert_eq!(
            record,
            EventRecord::ErrorLine {
                text: "* something bad happened".into()
            }
        );
    }

    // --- malformed input ---

    #[test]
    fn truncated_lines_do_not_panic() {
        for line in ["", "2024", "2024-05-01T", "2024-05-01T12:0", "2024-05-01T12:00:00+"] {
            let _ = parse_line(line, TODAY);
        }
    }

    #[test]
    fn malformed_date_never_matches_today() {
        let record = parse_line("May 1st 2024 party", TODAY);
        assert_eq!(record.highlight(), Highlight::Other);
    }

    #[test]
    fn multibyte_characters_in_fixed_fields_do_not_panic() {
        let record = parse_line("2024-05-0€T12:00:00Z x", TODAY);
        assert_eq!(record.highlight(), Highlight::Other);
    }

    // --- highlighting ---

    #[test]
    fn same_date_prefix_is_always_today() {
        let input = "2024-05-01 Exercise\n2024-05-01T08:00:00Z Run\n2024-05-02 Rest\n";
        let records = parse_events(Cursor::new(input), TODAY);
        let tags: Vec<_> = records.iter().map(EventRecord::highlight).collect();
        assert_eq!(tags, [Highlight::Today, Highlight::Today, Highlight::Other]);
    }

    // --- files ---

    #[test]
    fn reads_at_most_five_lines() {
        let input: String = (1..=8).map(|d| format!("2024-05-0{d} Day {d}\n")).collect();
        let records = parse_events(Cursor::new(input), TODAY);
        assert_eq!(records.len(), SLOT_COUNT);
        assert_eq!(text_of(&records[4]), "all day Day 5");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_dropped() {
        let input: &[u8] = b"2024-05-01 Caf\xe9\n2024-05-02 Dentist\n";
        let records = parse_events(Cursor::new(input), TODAY);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description(), "all day Caf\u{FFFD}");
        assert_eq!(records[0].highlight(), Highlight::Today);
        assert_eq!(records[1].description(), "all day Dentist");
    }

    #[test]
    fn last_line_without_newline_is_kept() {
        let records = parse_events(Cursor::new("2024-05-01 Exercise\n2024-05-02 Rest"), TODAY);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].description(), "all day Rest");
    }

    #[test]
    fn short_file_gives_fewer_records() {
        let records = parse_events(Cursor::new("2024-05-01 Exercise\n"), TODAY);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_event_file(&dir.path().join("events.txt"), TODAY).is_none());
    }

    #[test]
    fn existing_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.txt");
        std::fs::write(&path, "2024-05-01 Exercise\n* token warning\n").unwrap();

        let records = parse_event_file(&path, TODAY).unwrap();
        assert_eq!(records.len(), 2);
        assert!(matches!(records[1], EventRecord::ErrorLine { .. }));
    }
}
