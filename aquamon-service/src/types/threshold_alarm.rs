//! A one-shot alarm that fires when a level crosses a threshold.
//!
//! Useful for alerting on a noisy stream of readings while suppressing
//! duplicates for the same ongoing breach episode.
//!
//! # State Machine
//!
//! ```text
//!                observe(level > threshold)
//!                        (Raised)
//!  Disarmed ────────────────────────────────► Armed
//!     ▲                                         │
//!     │          observe(level <= threshold)    │
//!     └─────────────────────────────────────────┘
//!                        (Cleared)
//! ```
//!
//! Readings that do not change state loop in place: a safe reading while
//! disarmed returns `Safe`, a breaching reading while armed returns
//! `Suppressed`.
//!
//! - **Disarmed:** Level is in the safe range. Ready to raise on the next
//!   breach.
//! - **Armed:** A breach has been raised and not yet cleared. Further
//!   breaching readings are suppressed.
//!
//! `observe()` returns an [`AlarmStatus`] describing the transition so
//! callers can act on exactly the edges they care about (typically
//! `Raised` and `Cleared`).
//!
//! The comparison is strict on the breach side and inclusive on the safe
//! side: `level > threshold` breaches, `level <= threshold` is safe. A
//! reading exactly at the threshold therefore clears (or keeps) the safe
//! state. Values outside the nominal 0--100 range are compared as-is,
//! never clamped.

/// Result of [`ThresholdAlarm::observe`], describing the current state
/// and any transition that just occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmStatus {
    /// Level is safe, alarm is disarmed. Nothing to do.
    Safe,

    /// Level just crossed the threshold -- alarm armed. Returned exactly
    /// once per breach episode; subsequent breaching readings return
    /// [`Suppressed`](AlarmStatus::Suppressed).
    Raised,

    /// Already armed, level still above threshold. Duplicate suppressed.
    Suppressed,

    /// Was armed, level just returned to the safe range. Returned exactly
    /// once; subsequent safe readings return [`Safe`](AlarmStatus::Safe).
    /// The alarm is re-armed for the next episode.
    Cleared,
}

/// A one-shot threshold-crossing alarm.
///
/// Tracks a level against a fixed threshold. When the level exceeds the
/// threshold, [`observe`](Self::observe) returns
/// [`Raised`](AlarmStatus::Raised) exactly once. The alarm then stays
/// armed until a reading at or below the threshold disarms it (returning
/// [`Cleared`](AlarmStatus::Cleared) once), after which a later breach
/// raises again.
#[derive(Debug)]
pub struct ThresholdAlarm {
    threshold: f64,
    armed: bool,
}

impl ThresholdAlarm {
    /// Create a new, disarmed alarm with the given threshold.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            armed: false,
        }
    }

    /// Update the alarm with the current level.
    ///
    /// Returns an [`AlarmStatus`] describing what happened:
    ///
    /// | Previous state | level > threshold | Result |
    /// |----------------|-------------------|--------|
    /// | Disarmed | false | `Safe` |
    /// | Disarmed | true | `Raised` (arms) |
    /// | Armed | true | `Suppressed` |
    /// | Armed | false | `Cleared` (disarms, re-arms for next episode) |
    pub fn observe(&mut self, level: f64) -> AlarmStatus {
        match (self.armed, level > self.threshold) {
            (false, false) => AlarmStatus::Safe,

            (false, true) => {
                self.armed = true;
                AlarmStatus::Raised
            }

            (true, true) => AlarmStatus::Suppressed,

            (true, false) => {
                self.armed = false;
                AlarmStatus::Cleared
            }
        }
    }

    /// Whether an alert is currently active (raised and not yet cleared).
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// The configured threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
