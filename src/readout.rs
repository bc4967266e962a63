//! Two-digit numeric readout handed to the display driver.

/// What the display should show this iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readout {
    /// Already clamped to `0..=99`.
    pub value: u8,
    /// `false` during the off phase of the pause blink.
    pub visible: bool,
}

/// Segment patterns for 0–9 on a common-anode display, bit 7 = dp ... bit 0 = a,
/// active low.
const SEGMENTS: [u8; 10] = [0xC0, 0xF9, 0xA4, 0xB0, 0x99, 0x92, 0x82, 0xF8, 0x80, 0x90];

/// All segments off.
pub const BLANK: u8 = 0xFF;

impl Readout {
    pub fn new(value: u32, visible: bool) -> Self {
        Self {
            value: value.min(99) as u8,
            visible,
        }
    }

    /// `(tens, ones)`.
    pub const fn digits(&self) -> (u8, u8) {
        (self.value / 10, self.value % 10)
    }

    /// Segment bytes for `(tens, ones)`, blanked when not visible.
    pub const fn segments(&self) -> (u8, u8) {
        if !self.visible {
            return (BLANK, BLANK);
        }
        let (tens, ones) = self.digits();
        (SEGMENTS[tens as usize], SEGMENTS[ones as usize])
    }
}
