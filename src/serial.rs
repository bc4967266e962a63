//! Serial receive path: interrupt-fed byte ring and command line assembly.
//!
//! The receive interrupt (or DMA completion) writes bytes into an [`RxRing`]
//! and then publishes a new write cursor. The main loop owns a
//! [`LineDecoder`], which remembers how far it has read and polls the
//! difference each iteration. Neither side writes the other's cursor.

use core::sync::atomic::{
    AtomicU8,
    AtomicUsize,
    Ordering,
};

use heapless::Vec;

use crate::config::CMD_LINE_SIZE;

/// A complete command line, terminator stripped.
pub type Line = Vec<u8, CMD_LINE_SIZE>;

// ── Interrupt-side ring ─────────────────────────────────────────────────────

/// Single-producer circular byte buffer with a free-running write cursor.
///
/// The producer never waits for the consumer: if the loop falls more than
/// `N` bytes behind, the oldest bytes are overwritten and the decoder notices
/// on its next poll.
#[derive(Debug)]
pub struct RxRing<const N: usize> {
    buf: [AtomicU8; N],
    written: AtomicUsize,
}

impl<const N: usize> RxRing<N> {
    const POWER_OF_TWO: () = assert!(N.is_power_of_two(), "RxRing size must be a power of two");

    pub const fn new() -> Self {
        let () = Self::POWER_OF_TWO;
        Self {
            buf: [const { AtomicU8::new(0) }; N],
            written: AtomicUsize::new(0),
        }
    }

    /// Append one byte. Producer side only.
    pub fn push(&self, byte: u8) {
        let w = self.written.load(Ordering::Relaxed);
        self.buf[w % N].store(byte, Ordering::Relaxed);
        self.written.store(w.wrapping_add(1), Ordering::Release);
    }

    /// Append a burst and publish it with a single cursor update.
    pub fn publish(&self, bytes: &[u8]) {
        let w = self.written.load(Ordering::Relaxed);
        for (i, &b) in bytes.iter().enumerate() {
            self.buf[w.wrapping_add(i) % N].store(b, Ordering::Relaxed);
        }
        self.written.store(w.wrapping_add(bytes.len()), Ordering::Release);
    }

    /// Total bytes ever published, modulo the counter width.
    pub fn write_cursor(&self) -> usize {
        self.written.load(Ordering::Acquire)
    }

    fn byte_at(&self, cursor: usize) -> u8 {
        self.buf[cursor % N].load(Ordering::Relaxed)
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for RxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Line decoder ────────────────────────────────────────────────────────────

/// Accumulates received bytes into `\r`/`\n` terminated lines.
///
/// At most one finished line waits for [`take_ready_line`](Self::take_ready_line);
/// while it waits, [`poll`](Self::poll) leaves further bytes in the ring.
#[derive(Clone, Debug, Default)]
pub struct LineDecoder {
    line: Line,
    ready: bool,
    /// Dropping the rest of an over-long line until its terminator.
    discarding: bool,
    read: usize,
    overflows: u32,
    overruns: u32,
}

impl LineDecoder {
    pub const fn new() -> Self {
        Self {
            line: Vec::new(),
            ready: false,
            discarding: false,
            read: 0,
            overflows: 0,
            overruns: 0,
        }
    }

    /// Consume one received byte.
    ///
    /// Bytes arriving while a line is ready are ignored; [`poll`](Self::poll)
    /// never delivers any.
    pub fn push_byte(&mut self, byte: u8) {
        if self.ready {
            return;
        }
        match byte {
            b'\r' | b'\n' => {
                if self.discarding {
                    self.discarding = false;
                } else if !self.line.is_empty() {
                    self.ready = true;
                }
            }
            _ if self.discarding => {}
            _ => {
                if self.line.push(byte).is_err() {
                    debug!("command line overflow, dropping {} bytes", self.line.len());
                    self.line.clear();
                    self.discarding = true;
                    self.overflows = self.overflows.wrapping_add(1);
                }
            }
        }
    }

    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Hand out the finished line, if any, and start a fresh one.
    pub fn take_ready_line(&mut self) -> Option<Line> {
        if !self.ready {
            return None;
        }
        self.ready = false;
        Some(core::mem::take(&mut self.line))
    }

    /// Drain newly published bytes from `ring` until a line is ready or the
    /// ring is exhausted. Returns the number of bytes consumed.
    pub fn poll<const N: usize>(&mut self, ring: &RxRing<N>) -> usize {
        let written = ring.write_cursor();

        let behind = written.wrapping_sub(self.read);
        if behind > N {
            // Producer lapped us; the partial line has a hole in it.
            warn!("rx overrun, {} bytes lost", behind - N);
            self.read = written.wrapping_sub(N);
            self.line.clear();
            self.ready = false;
            self.discarding = true;
            self.overruns = self.overruns.wrapping_add(1);
        }

        let mut consumed = 0;
        while !self.ready && self.read != written {
            let byte = ring.byte_at(self.read);
            self.read = self.read.wrapping_add(1);
            self.push_byte(byte);
            consumed += 1;
        }
        consumed
    }

    /// Lines discarded for exceeding [`CMD_LINE_SIZE`].
    pub const fn overflows(&self) -> u32 {
        self.overflows
    }

    /// Times the ring producer overwrote unread bytes.
    pub const fn overruns(&self) -> u32 {
        self.overruns
    }
}
