//! Free-running millisecond ticks and wraparound-safe interval timers.

/// Monotonic tick counter value. One tick is one millisecond on the badge.
///
/// The counter is expected to wrap; never compare two ticks directly, only
/// through [`elapsed`].
pub type Tick = u32;

/// Ticks elapsed from `since` to `now`, correct across counter wraparound as
/// long as the real gap is shorter than the counter range.
#[inline]
#[must_use]
pub const fn elapsed(now: Tick, since: Tick) -> u32 {
    now.wrapping_sub(since)
}

/// A "last fired at" timestamp paired with its period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Every {
    period: u32,
    last: Tick,
}

impl Every {
    pub const fn new(period: u32, now: Tick) -> Self {
        Self { period, last: now }
    }

    /// Returns `true` and re-arms if at least one period has elapsed.
    ///
    /// Re-arming uses `now` rather than `last + period`, so a stalled loop
    /// fires once and does not try to catch up.
    pub fn fire(&mut self, now: Tick) -> bool {
        if elapsed(now, self.last) >= self.period {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// Restart the period from `now`.
    pub const fn rearm(&mut self, now: Tick) {
        self.last = now;
    }

    /// Push the last firing `by` ticks later, keeping progress within the
    /// current period.
    pub const fn delay(&mut self, by: u32) {
        self.last = self.last.wrapping_add(by);
    }

    pub const fn period(&self) -> u32 {
        self.period
    }

    pub const fn last(&self) -> Tick {
        self.last
    }
}
