//! Outbound telemetry: formatted event lines in a drop-on-full byte queue.
//!
//! The game loop [`emit`](Telemetry::emit)s events; a line is either queued
//! whole or not at all. Whoever owns the transmitter calls
//! [`drain_if_ready`](Telemetry::drain_if_ready) whenever it may send more.
//! Nothing here ever waits.

use core::fmt::{
    self,
    Write as _,
};

use heapless::{
    String,
    spsc::Queue,
};

use crate::{
    config::TELEMETRY_LINE_MAX,
    ships::ShipKind,
};

// ── Events ──────────────────────────────────────────────────────────────────

/// Game milestones announced with a `GAME_EVENT:` line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Milestone {
    /// Round started with this many seconds on the clock.
    Start { seconds: u8 },
    /// Round over with this final score.
    End { score: u32 },
}

/// Score summary, as sent in a `GAME:` line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: u32,
    pub hits: u32,
    pub shots: u32,
    pub time_remaining: u8,
}

impl Scoreboard {
    /// Hits per hundred shots, rounded down.
    pub const fn accuracy(&self) -> u32 {
        if self.shots == 0 {
            0
        } else {
            (self.hits as u64 * 100 / self.shots as u64) as u32
        }
    }
}

/// Something the remote display should know about.
#[derive(Clone, Copy, Debug)]
pub enum Event<'a> {
    Ship { kind: ShipKind, x: u16, y: u16 },
    Hit { kind: ShipKind, x: u16, y: u16 },
    Miss { x: u16, y: u16 },
    Time(u8),
    Crosshair { x: u16, y: u16, locked: bool },
    Lock(bool),
    Storm { dx: i16, dy: i16 },
    Game(Scoreboard),
    Milestone(Milestone),
    /// Free-form diagnostic, sent as `COM: <text>`.
    Com(fmt::Arguments<'a>),
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Ship { kind, x, y } => write!(f, "SHIP:{},{x},{y}", kind.tag()),
            Self::Hit { kind, x, y } => write!(f, "RESULT:HIT:{},{x},{y}", kind.tag()),
            Self::Miss { x, y } => write!(f, "RESULT:MISS,{x},{y}"),
            Self::Time(seconds) => write!(f, "TIME:{seconds}"),
            Self::Crosshair { x, y, locked } => write!(f, "CROSSHAIR:{x},{y},{}", u8::from(locked)),
            Self::Lock(locked) => write!(f, "LOCK:{}", u8::from(locked)),
            Self::Storm { dx, dy } => write!(f, "STORM:{dx},{dy}"),
            Self::Game(board) => write!(
                f,
                "GAME:{}:{}:{}:{}:{}",
                board.score,
                board.hits,
                board.shots,
                board.accuracy(),
                board.time_remaining
            ),
            Self::Milestone(Milestone::Start { seconds }) => {
                write!(f, "GAME_EVENT:GAME_START:{seconds}")
            }
            Self::Milestone(Milestone::End { score }) => write!(f, "GAME_EVENT:GAME_END:{score}"),
            Self::Com(args) => write!(f, "COM: {args}"),
        }
    }
}

/// Why an event did not make it into the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dropped {
    /// Formatted line longer than [`TELEMETRY_LINE_MAX`].
    TooLong,
    /// Not enough free space for the whole line.
    Full,
}

impl fmt::Display for Dropped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong => write!(f, "telemetry line exceeds {TELEMETRY_LINE_MAX} bytes"),
            Self::Full => write!(f, "telemetry queue full"),
        }
    }
}

/// Anything the game can report events to.
pub trait EventSink {
    fn emit(&mut self, event: Event<'_>) -> Result<(), Dropped>;
}

/// Outbound byte transport.
pub trait Uplink {
    /// Take as many of `bytes` as can be sent right now without waiting,
    /// returning how many were taken. Zero means "busy, try later".
    fn write(&mut self, bytes: &[u8]) -> usize;
}

// ── Channel ─────────────────────────────────────────────────────────────────

/// Bytes handed to the uplink per call.
const DRAIN_CHUNK: usize = 32;

/// Fixed-capacity telemetry queue. Holds at most `N - 1` bytes.
pub struct Telemetry<const N: usize> {
    queue: Queue<u8, N>,
    dropped: u32,
}

impl<const N: usize> Telemetry<N> {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
            dropped: 0,
        }
    }

    /// Format `event` and queue it if the whole line fits.
    pub fn emit(&mut self, event: Event<'_>) -> Result<(), Dropped> {
        let mut line: String<TELEMETRY_LINE_MAX> = String::new();
        if write!(line, "{event}\r\n").is_err() {
            return Err(self.drop_line(Dropped::TooLong));
        }
        self.enqueue_line(line.as_bytes())
    }

    /// Queue raw line bytes, all or nothing.
    pub fn enqueue_line(&mut self, bytes: &[u8]) -> Result<(), Dropped> {
        if bytes.len() > self.free() {
            return Err(self.drop_line(Dropped::Full));
        }
        for &b in bytes {
            // Space was checked above; single producer.
            let _ = self.queue.enqueue(b);
        }
        Ok(())
    }

    fn drop_line(&mut self, why: Dropped) -> Dropped {
        self.dropped = self.dropped.wrapping_add(1);
        trace!("telemetry line dropped, total {}", self.dropped);
        why
    }

    /// Hand queued bytes to `uplink` until it stops accepting or the queue
    /// empties. Returns the number of bytes sent.
    pub fn drain_if_ready(&mut self, uplink: &mut impl Uplink) -> usize {
        let mut sent = 0;
        loop {
            let mut chunk = [0u8; DRAIN_CHUNK];
            let mut len = 0;
            for (slot, &b) in chunk.iter_mut().zip(self.queue.iter()) {
                *slot = b;
                len += 1;
            }
            if len == 0 {
                break;
            }

            let taken = uplink.write(&chunk[..len]).min(len);
            for _ in 0..taken {
                let _ = self.queue.dequeue();
            }
            sent += taken;
            if taken < len {
                break;
            }
        }
        sent
    }

    /// Bytes waiting to be sent.
    pub fn is_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn free(&self) -> usize {
        self.queue.capacity() - self.queue.len()
    }

    /// Lines lost to a full queue or an over-long format since start.
    pub const fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Copy of the queued bytes, oldest first, without consuming them.
    pub fn peek(&self) -> impl Iterator<Item = u8> + '_ {
        self.queue.iter().copied()
    }
}

impl<const N: usize> Default for Telemetry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventSink for Telemetry<N> {
    fn emit(&mut self, event: Event<'_>) -> Result<(), Dropped> {
        Telemetry::emit(self, event)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        string::String as StdString,
        vec::Vec as StdVec,
    };

    use super::*;

    /// Accepts up to `budget` bytes per call.
    struct Wire {
        out: StdVec<u8>,
        budget: usize,
    }

    impl Uplink for Wire {
        fn write(&mut self, bytes: &[u8]) -> usize {
            let n = bytes.len().min(self.budget);
            self.out.extend_from_slice(&bytes[..n]);
            n
        }
    }

    fn text<const N: usize>(t: &Telemetry<N>) -> StdString {
        t.peek().map(char::from).collect()
    }

    #[test]
    fn lines_are_tagged_and_terminated() {
        let mut t: Telemetry<512> = Telemetry::new();
        t.emit(Event::Ship { kind: ShipKind::Medium, x: 120, y: 80 }).unwrap();
        t.emit(Event::Hit { kind: ShipKind::Small, x: 400, y: 300 }).unwrap();
        t.emit(Event::Miss { x: 1, y: 2 }).unwrap();
        t.emit(Event::Time(59)).unwrap();
        t.emit(Event::Crosshair { x: 400, y: 303, locked: true }).unwrap();
        t.emit(Event::Storm { dx: -4, dy: 9 }).unwrap();
        t.emit(Event::Com(format_args!("START={}, PAUSE={}", 1, 0))).unwrap();
        assert_eq!(
            text(&t),
            "SHIP:M,120,80\r\n\
             RESULT:HIT:S,400,300\r\n\
             RESULT:MISS,1,2\r\n\
             TIME:59\r\n\
             CROSSHAIR:400,303,1\r\n\
             STORM:-4,9\r\n\
             COM: START=1, PAUSE=0\r\n"
        );
    }

    #[test]
    fn game_line_includes_accuracy() {
        let mut t: Telemetry<128> = Telemetry::new();
        let board = Scoreboard { score: 60, hits: 2, shots: 3, time_remaining: 0 };
        t.emit(Event::Game(board)).unwrap();
        assert_eq!(text(&t), "GAME:60:2:3:66:0\r\n");
    }

    #[test]
    fn full_queue_drops_whole_line_and_leaves_bytes_untouched() {
        // 19 usable bytes.
        let mut t: Telemetry<20> = Telemetry::new();
        t.emit(Event::Time(60)).unwrap(); // 9 bytes
        let before = text(&t);
        assert_eq!(t.emit(Event::Miss { x: 1, y: 1 }), Err(Dropped::Full));
        assert_eq!(text(&t), before);
        assert_eq!(t.free(), 10);
        assert_eq!(t.dropped(), 1);
        // A shorter line still fits.
        t.emit(Event::Lock(true)).unwrap(); // 8 bytes
        assert_eq!(t.free(), 2);
    }

    #[test]
    fn over_long_line_is_rejected() {
        let mut t: Telemetry<512> = Telemetry::new();
        let long = "x".repeat(TELEMETRY_LINE_MAX);
        assert_eq!(t.emit(Event::Com(format_args!("{long}"))), Err(Dropped::TooLong));
        assert!(t.is_empty());
    }

    #[test]
    fn drain_respects_uplink_budget() {
        let mut t: Telemetry<128> = Telemetry::new();
        t.emit(Event::Time(42)).unwrap();
        t.emit(Event::Lock(false)).unwrap();
        let mut wire = Wire { out: StdVec::new(), budget: 5 };

        assert_eq!(t.drain_if_ready(&mut wire), 5);
        assert!(t.is_pending());
        wire.budget = 0;
        assert_eq!(t.drain_if_ready(&mut wire), 0);
        wire.budget = usize::MAX;
        t.drain_if_ready(&mut wire);
        assert!(!t.is_pending());
        assert_eq!(wire.out, b"TIME:42\r\nLOCK:0\r\n");
    }

    /// Hardware FIFO that fills up and only frees space when flushed.
    struct Fifo {
        held: usize,
        depth: usize,
    }

    impl Uplink for Fifo {
        fn write(&mut self, bytes: &[u8]) -> usize {
            let n = bytes.len().min(self.depth - self.held);
            self.held += n;
            n
        }
    }

    #[test]
    fn drain_returns_as_soon_as_uplink_is_busy() {
        let mut t: Telemetry<256> = Telemetry::new();
        for s in 0..10 {
            t.emit(Event::Time(s)).unwrap();
        }
        let total = t.len();
        let mut fifo = Fifo { held: 0, depth: 16 };

        assert_eq!(t.drain_if_ready(&mut fifo), 16);
        assert_eq!(t.drain_if_ready(&mut fifo), 0);
        assert_eq!(t.len(), total - 16);

        fifo.held = 0;
        assert_eq!(t.drain_if_ready(&mut fifo), 16);
    }

    #[test]
    fn drain_handles_more_than_one_chunk() {
        let mut t: Telemetry<256> = Telemetry::new();
        for s in 0..10 {
            t.emit(Event::Time(s)).unwrap();
        }
        let mut wire = Wire { out: StdVec::new(), budget: usize::MAX };
        let n = t.drain_if_ready(&mut wire);
        assert_eq!(n, wire.out.len());
        assert!(n > DRAIN_CHUNK);
        assert!(t.is_empty());
    }
}
