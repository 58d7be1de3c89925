//! Autosave Controller
//!
//! A pure state machine: callers pass the current [`Instant`] in and ask whether a
//! write is due. The session drives it with `tokio::time::sleep_until`, so paused
//! test clocks control it completely.

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Persistence state of the open project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    Saved,
    Unsaved,
    Saving,
}

impl std::fmt::Display for SaveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SaveState::Saved => "saved",
            SaveState::Unsaved => "unsaved",
            SaveState::Saving => "saving",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct AutosaveController {
    state: SaveState,
    interval: Option<Duration>,
    deadline: Option<Instant>,
    /// An edit landed while a write was in flight
    dirty_during_save: bool,
}

impl AutosaveController {
    /// Start in `Saved`; `None` disables timed saves
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            state: SaveState::Saved,
            interval,
            deadline: None,
            dirty_during_save: false,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// When the pending autosave fires, if one is armed
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn arm(&mut self, now: Instant) {
        self.deadline = self.interval.map(|interval| now + interval);
    }

    /// Record an accepted mutation; re-arms the timer from `now`
    pub fn mark_dirty(&mut self, now: Instant) {
        if self.state == SaveState::Saving {
            self.dirty_during_save = true;
            return;
        }
        self.state = SaveState::Unsaved;
        self.arm(now);
    }

    /// Change the interval; a pending timer is re-armed from `now`
    pub fn set_interval(&mut self, interval: Option<Duration>, now: Instant) {
        self.interval = interval;
        if self.state == SaveState::Unsaved {
            self.arm(now);
        } else {
            self.deadline = None;
        }
    }

    /// Whether the timer has expired at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.state == SaveState::Unsaved && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Enter `Saving` if the timer has expired
    pub fn begin_autosave(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.begin();
        true
    }

    /// Enter `Saving` for an explicit request; refused while a write is in flight
    pub fn begin_manual(&mut self) -> bool {
        if self.state == SaveState::Saving {
            return false;
        }
        self.begin();
        true
    }

    fn begin(&mut self) {
        self.state = SaveState::Saving;
        self.deadline = None;
        self.dirty_during_save = false;
    }

    /// Leave `Saving` once the write completes.
    ///
    /// A failed write goes back to `Unsaved` without re-arming; the next edit or a
    /// manual save retries. Edits made during the write re-arm the timer.
    pub fn finish(&mut self, succeeded: bool, now: Instant) {
        if self.state != SaveState::Saving {
            return;
        }
        let dirty = std::mem::take(&mut self.dirty_during_save);
        if succeeded && !dirty {
            self.state = SaveState::Saved;
            self.deadline = None;
        } else {
            self.state = SaveState::Unsaved;
            if dirty {
                self.arm(now);
            } else {
                self.deadline = None;
            }
        }
        debug!(state = %self.state, "Save finished");
    }

    /// Forget pending work, e.g. after switching projects
    pub fn reset(&mut self, state: SaveState) {
        self.state = state;
        self.deadline = None;
        self.dirty_during_save = false;
    }
}
