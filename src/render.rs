//! Terminal rendering for the clock face and calendar entries.

use std::io::{self, Write};

use owo_colors::OwoColorize;
use piclock_core::{ClockFace, DisplaySink, EventRecord, Highlight};

/// Clear the screen and move the cursor home.
const CLEAR: &str = "\x1b[2J\x1b[H";

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventRecord {
    fn render(&self) -> String {
        let text = self.display_text();
        match self.highlight() {
            Highlight::Today | Highlight::Error => text.red().to_string(),
            Highlight::Other => text.blue().to_string(),
        }
    }
}

impl Render for ClockFace {
    fn render(&self) -> String {
        format!(
            "{}\n\n{}   {}",
            self.time.bold(),
            self.day.green(),
            self.date.green()
        )
    }
}

/// Redraws the whole screen whenever anything changes.
#[derive(Default)]
pub struct TerminalSink {
    face: Option<ClockFace>,
    events: Vec<EventRecord>,
}

impl TerminalSink {
    fn redraw(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        write!(out, "{CLEAR}")?;
        if let Some(face) = &self.face {
            writeln!(out, "{}\n", face.render())?;
        }
        for event in &self.events {
            writeln!(out, "  {}", event.render())?;
        }
        writeln!(out, "\n{}", "[Enter] refresh   [q Enter] quit".dimmed())?;
        out.flush()
    }
}

impl DisplaySink for TerminalSink {
    fn show_clock(&mut self, face: &ClockFace) {
        self.face = Some(face.clone());
        if let Err(e) = self.redraw() {
            tracing::warn!(error = %e, "could not draw clock");
        }
    }

    fn show_events(&mut self, events: &[EventRecord]) {
        self.events = events.to_vec();
        if let Err(e) = self.redraw() {
            tracing::warn!(error = %e, "could not draw calendar");
        }
    }
}
