//! Debounced autosave.
//!
//! Every edit marks the workspace dirty with the edit's timestamp. A save becomes due once
//! the workspace has been quiet for the configured interval; a burst of edits therefore
//! coalesces into a single save. Time is passed in rather than read from the clock so the
//! scheduler can be driven deterministically.
//!
//! The tracker never holds workspace data. Whoever fires the save serializes the workspace
//! as it is at that moment.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Autosave {
    quiet: Duration,
    last_edit: Option<Instant>,
}

impl Autosave {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_edit: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Record an edit. Restarts the quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.last_edit = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.last_edit.is_some()
    }

    pub fn due(&self, now: Instant) -> bool {
        self.last_edit
            .is_some_and(|edited| now.saturating_duration_since(edited) >= self.quiet)
    }

    /// True (and clean again) when a save should fire now.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.due(now) {
            self.last_edit = None;
            true
        } else {
            false
        }
    }

    /// Forget pending edits, e.g. after a manual save.
    pub fn mark_saved(&mut self) {
        self.last_edit = None;
    }
}
