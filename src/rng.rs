//! Spawn entropy.

/// Source of pseudo-random numbers for spawning.
///
/// The firmware seeds an [`XorShift32`] once from a timer snapshot; tests
/// inject a fixed sequence.
pub trait Entropy {
    fn next_u32(&mut self) -> u32;

    /// Uniform-ish value in `0..max`. `max` of zero yields zero.
    fn below(&mut self, max: u32) -> u32 {
        if max == 0 { 0 } else { self.next_u32() % max }
    }
}

/// Marsaglia xorshift, 32-bit state.
#[derive(Clone, Copy, Debug)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub const fn new(seed: u32) -> Self {
        // Zero is a fixed point of xorshift.
        Self {
            state: if seed == 0 { 0xDEAD_BEEF } else { seed },
        }
    }

    pub const fn state(&self) -> u32 {
        self.state
    }
}

impl Entropy for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl<E: Entropy + ?Sized> Entropy for &mut E {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}
