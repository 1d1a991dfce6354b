//! The display side of the engine.
//!
//! Rendering is someone else's job: a sink gets the clock face every tick and
//! the five calendar entries after every refresh, and draws them.

use crate::clock::ClockFace;
use crate::event_record::EventRecord;

pub trait DisplaySink {
    /// Called once per tick.
    fn show_clock(&mut self, face: &ClockFace);

    /// Called after each refresh with exactly five entries.
    fn show_events(&mut self, events: &[EventRecord]);
}
