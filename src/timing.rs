//! Absolute-deadline timer used throughout the guidance loop.
//!
//! Every timed behaviour in the game (the target's active window, the
//! capture cooldown, the delayed success chime) is expressed as an absolute
//! deadline computed once and compared against the clock each tick, rather
//! than as a decrementing counter.  Absolute deadlines stay correct under
//! variable tick spacing; counters drift.

/// A one-shot deadline over millisecond timestamps.
///
/// Disarmed by default.  `arm` sets the deadline, `is_due` compares it
/// against the current clock without consuming it, and `fire_if_due`
/// consumes it; a deadline fires at most once per arming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at_ms: Option<u64>,
}

impl Deadline {
    /// Arm the deadline to fire `delay_ms` after `now_ms`. Re-arming an
    /// already pending deadline replaces it.
    pub fn arm(&mut self, now_ms: u64, delay_ms: u64) {
        self.at_ms = Some(now_ms + delay_ms);
    }

    /// Disarm without firing.
    pub fn clear(&mut self) {
        self.at_ms = None;
    }

    /// Whether a deadline is armed (due or not).
    pub fn pending(&self) -> bool {
        self.at_ms.is_some()
    }

    /// Whether the armed deadline has been reached. Always `false` when
    /// disarmed.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.at_ms.is_some_and(|at| now_ms >= at)
    }

    /// Consume the deadline if it is due. Returns `true` exactly once per
    /// arming, on the first tick at or after the deadline.
    pub fn fire_if_due(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            self.at_ms = None;
            true
        } else {
            false
        }
    }
}
