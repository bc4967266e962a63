//! Debounced button edges from raw pin samples.
//!
//! Buttons are wired active low: a pressed button reads [`Level::Low`].
//! Interrupt context may only record raw levels into a [`LevelLatch`]; all
//! edge detection runs in the main loop.

use core::sync::atomic::{
    AtomicU8,
    Ordering,
};

use heapless::Vec;

use crate::time::{
    Tick,
    elapsed,
};

/// Raw digital pin level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Level of an idle (released) button.
    pub const RELEASED: Self = Self::High;
    /// Level of a held button.
    pub const PRESSED: Self = Self::Low;

    pub const fn from_high(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

/// A debounced transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Pressed,
    Released,
}

/// The physical buttons the game reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Left,
    Right,
    /// Lock / fire.
    Confirm,
}

impl Button {
    pub const ALL: [Self; BUTTON_COUNT] = [Self::Left, Self::Right, Self::Confirm];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Confirm => "CONFIRM",
        }
    }
}

pub const BUTTON_COUNT: usize = 3;

/// Edges produced by one poll, in [`Button::ALL`] order.
pub type Edges = Vec<(Button, Edge), BUTTON_COUNT>;

// ── Single button ───────────────────────────────────────────────────────────

/// Debounce state for one button.
#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    stable_level: Level,
    /// `None` until the first accepted change.
    last_change: Option<Tick>,
    delay: u32,
}

impl Debouncer {
    pub const fn new(delay: u32) -> Self {
        Self {
            stable_level: Level::RELEASED,
            last_change: None,
            delay,
        }
    }

    pub const fn stable_level(&self) -> Level {
        self.stable_level
    }

    pub const fn is_pressed(&self) -> bool {
        matches!(self.stable_level, Level::Low)
    }

    /// Feed one raw sample.
    ///
    /// A change within `delay` ticks of the previous accepted change is
    /// treated as bounce and ignored; the next sample after the window decides.
    pub fn sample(&mut self, level: Level, now: Tick) -> Option<Edge> {
        if level == self.stable_level {
            return None;
        }
        if let Some(last) = self.last_change
            && elapsed(now, last) < self.delay
        {
            return None;
        }

        self.stable_level = level;
        self.last_change = Some(now);
        Some(match level {
            Level::Low => Edge::Pressed,
            Level::High => Edge::Released,
        })
    }
}

// ── Button bank ─────────────────────────────────────────────────────────────

/// All game buttons plus the polling cadence gate.
#[derive(Clone, Debug)]
pub struct ButtonBank {
    buttons: [Debouncer; BUTTON_COUNT],
    poll_interval: u32,
    last_poll: Option<Tick>,
}

impl ButtonBank {
    pub const fn new(debounce_delay: u32, poll_interval: u32) -> Self {
        Self {
            buttons: [Debouncer::new(debounce_delay); BUTTON_COUNT],
            poll_interval,
            last_poll: None,
        }
    }

    /// Debounce a single button, bypassing the cadence gate.
    pub fn sample(&mut self, button: Button, level: Level, now: Tick) -> Option<Edge> {
        self.buttons[button.index()].sample(level, now)
    }

    /// Sample every button, at most once per poll interval.
    ///
    /// Calls arriving sooner than the interval return nothing and leave the
    /// debouncers untouched.
    pub fn poll(&mut self, now: Tick, levels: [Level; BUTTON_COUNT]) -> Edges {
        let mut edges = Edges::new();
        if let Some(last) = self.last_poll
            && elapsed(now, last) < self.poll_interval
        {
            return edges;
        }
        self.last_poll = Some(now);

        for (button, level) in Button::ALL.into_iter().zip(levels) {
            if let Some(edge) = self.sample(button, level, now) {
                trace!("button {} edge, pressed={}", button.name(), edge == Edge::Pressed);
                // One slot per button, cannot overflow.
                let _ = edges.push((button, edge));
            }
        }
        edges
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons[button.index()].is_pressed()
    }
}

// ── Interrupt boundary ──────────────────────────────────────────────────────

/// Raw pin levels recorded from interrupt context.
///
/// One bit per button, set while the pin reads high. The loop takes a
/// snapshot with [`levels`](Self::levels); interrupt code never touches
/// debounce state.
#[derive(Debug)]
pub struct LevelLatch {
    bits: AtomicU8,
}

impl LevelLatch {
    /// All buttons released.
    pub const fn new() -> Self {
        Self {
            bits: AtomicU8::new((1 << BUTTON_COUNT) - 1),
        }
    }

    pub fn record(&self, button: Button, level: Level) {
        let mask = 1 << button.index();
        match level {
            Level::High => self.bits.fetch_or(mask, Ordering::Release),
            Level::Low => self.bits.fetch_and(!mask, Ordering::Release),
        };
    }

    pub fn levels(&self) -> [Level; BUTTON_COUNT] {
        let bits = self.bits.load(Ordering::Acquire);
        Button::ALL.map(|b| Level::from_high(bits & (1 << b.index()) != 0))
    }
}

impl Default for LevelLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: u32 = 20;

    #[test]
    fn first_press_is_reported() {
        let mut d = Debouncer::new(DELAY);
        assert_eq!(d.sample(Level::Low, 5), Some(Edge::Pressed));
        assert!(d.is_pressed());
    }

    #[test]
    fn unchanged_level_emits_nothing() {
        let mut d = Debouncer::new(DELAY);
        assert_eq!(d.sample(Level::High, 100), None);
        assert_eq!(d.sample(Level::Low, 200), Some(Edge::Pressed));
        assert_eq!(d.sample(Level::Low, 300), None);
    }

    #[test]
    fn bounce_inside_window_is_ignored() {
        let mut d = Debouncer::new(DELAY);
        assert_eq!(d.sample(Level::Low, 100), Some(Edge::Pressed));
        // Contact chatter right after the press.
        assert_eq!(d.sample(Level::High, 105), None);
        assert_eq!(d.sample(Level::High, 119), None);
        assert_eq!(d.sample(Level::Low, 110), None);
        // Window elapsed, real release.
        assert_eq!(d.sample(Level::High, 120), Some(Edge::Released));
    }

    #[test]
    fn edges_alternate_for_any_sample_stream() {
        let mut d = Debouncer::new(DELAY);
        let mut last = None;
        let mut now: Tick = u32::MAX - 400;
        let mut x: u32 = 0x1234_5678;
        for _ in 0..2000 {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            now = now.wrapping_add(x % 13);
            let level = Level::from_high(x & 0x100 != 0);
            if let Some(edge) = d.sample(level, now) {
                assert_ne!(Some(edge), last, "two identical edges in a row");
                last = Some(edge);
            }
        }
    }

    #[test]
    fn accepted_changes_are_spaced_by_delay() {
        let mut d = Debouncer::new(DELAY);
        let mut accepted: Option<Tick> = None;
        for now in 0..500u32 {
            let level = Level::from_high((now / 7) % 2 == 0);
            if d.sample(level, now).is_some() {
                if let Some(prev) = accepted {
                    assert!(now - prev >= DELAY);
                }
                accepted = Some(now);
            }
        }
        assert!(accepted.is_some());
    }

    #[test]
    fn poll_respects_cadence() {
        let mut bank = ButtonBank::new(DELAY, 30);
        let held = [Level::Low, Level::High, Level::High];
        let edges = bank.poll(1000, held);
        assert_eq!(edges.as_slice(), &[(Button::Left, Edge::Pressed)]);

        // Too soon: nothing sampled, release not seen yet.
        let idle = [Level::High; BUTTON_COUNT];
        assert!(bank.poll(1010, idle).is_empty());
        assert!(bank.is_pressed(Button::Left));

        let edges = bank.poll(1030, idle);
        assert_eq!(edges.as_slice(), &[(Button::Left, Edge::Released)]);
    }

    #[test]
    fn poll_reports_several_buttons_in_order() {
        let mut bank = ButtonBank::new(DELAY, 30);
        let edges = bank.poll(0, [Level::Low, Level::High, Level::Low]);
        assert_eq!(
            edges.as_slice(),
            &[(Button::Left, Edge::Pressed), (Button::Confirm, Edge::Pressed)]
        );
    }

    #[test]
    fn latch_round_trips_levels() {
        let latch = LevelLatch::new();
        assert_eq!(latch.levels(), [Level::High; BUTTON_COUNT]);
        latch.record(Button::Confirm, Level::Low);
        assert_eq!(latch.levels(), [Level::High, Level::High, Level::Low]);
        latch.record(Button::Confirm, Level::High);
        latch.record(Button::Left, Level::Low);
        assert_eq!(latch.levels(), [Level::Low, Level::High, Level::High]);
    }
}
