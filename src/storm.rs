//! The "storm": a deterministic 2-D wobble added to the reported aim point.
//!
//! Each axis is an independent sinusoid of elapsed time with its own period;
//! the y axis leads by a fixed phase so the two never move in lockstep.
//! Integer only: angles are in 1/1024 turns, sines in Q10.

use crate::{
    config::GameConfig,
    time::Tick,
};

/// Angle units per full turn.
pub const TURN: u32 = 1024;

/// Quarter-wave sine, 65 points over 0..=256 angle units, Q10.
const SIN_Q10: [i16; 65] = [
    0, 25, 50, 75, 100, 125, 150, 175, 200, 224, 249, 273, 297, 321, 345, 369, 392, 415, 438,
    460, 483, 505, 526, 548, 569, 590, 610, 630, 650, 669, 688, 706, 724, 742, 759, 775, 792,
    807, 822, 837, 851, 865, 878, 891, 903, 915, 926, 936, 946, 955, 964, 972, 980, 987, 993,
    999, 1004, 1009, 1013, 1016, 1019, 1021, 1023, 1024, 1024,
];

/// Sine of `angle` (1/1024 turns) scaled to ±1024.
pub fn isin(angle: u32) -> i32 {
    let a = angle % TURN;
    let quadrant = a / 256;
    let q = a % 256;
    // Mirror the second and fourth quadrants onto the first.
    let q = if quadrant % 2 == 1 { 256 - q } else { q };

    let i = (q / 4) as usize;
    let frac = (q % 4) as i32;
    let lo = i32::from(SIN_Q10[i]);
    let hi = i32::from(SIN_Q10[(i + 1).min(64)]);
    let v = lo + (hi - lo) * frac / 4;

    if quadrant >= 2 { -v } else { v }
}

/// Disturbance generator state: only the amplitudes change at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Storm {
    amplitude: (u8, u8),
    max: u8,
    period: (u32, u32),
    phase_y: u32,
    delta_scale: i16,
}

impl Storm {
    pub const fn new(config: &GameConfig) -> Self {
        let max = config.storm_amplitude_max;
        Self {
            amplitude: (
                min_u8(config.storm_amplitude.0, max),
                min_u8(config.storm_amplitude.1, max),
            ),
            max,
            period: (config.storm_period_x, config.storm_period_y),
            phase_y: config.storm_phase_y as u32,
            delta_scale: config.storm_delta_scale,
        }
    }

    pub const fn amplitude(&self) -> (u8, u8) {
        self.amplitude
    }

    /// Offset at `now`, each axis within `±amplitude`.
    pub fn offset(&self, now: Tick) -> (i16, i16) {
        let dx = axis(self.amplitude.0, self.period.0, now, 0);
        let dy = axis(self.amplitude.1, self.period.1, now, self.phase_y);
        (dx, dy)
    }

    /// Apply a signed amplitude change, clamped to `0..=max`.
    pub fn adjust(&mut self, dx: i16, dy: i16) -> (u8, u8) {
        let scale = i32::from(self.delta_scale);
        let max = i32::from(self.max);
        let step = |amp: u8, d: i16| {
            (i32::from(amp) + i32::from(d) * scale).clamp(0, max) as u8
        };
        self.amplitude = (step(self.amplitude.0, dx), step(self.amplitude.1, dy));
        self.amplitude
    }
}

fn axis(amplitude: u8, period: u32, now: Tick, phase: u32) -> i16 {
    if period == 0 || amplitude == 0 {
        return 0;
    }
    let t = u64::from(now % period);
    let angle = (t * u64::from(TURN) / u64::from(period)) as u32 + phase;
    (i32::from(amplitude) * isin(angle) / 1024) as i16
}

const fn min_u8(a: u8, b: u8) -> u8 {
    if a < b { a } else { b }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_landmarks() {
        assert_eq!(isin(0), 0);
        assert_eq!(isin(256), 1024);
        assert_eq!(isin(512), 0);
        assert_eq!(isin(768), -1024);
        assert_eq!(isin(1024), 0);
        assert_eq!(isin(128), -isin(640));
        assert_eq!(isin(100), isin(412));
    }

    #[test]
    fn sine_is_bounded_and_odd() {
        for a in 0..TURN {
            let v = isin(a);
            assert!((-1024..=1024).contains(&v));
            assert_eq!(v, -isin(a + 512));
        }
    }

    #[test]
    fn offset_stays_within_amplitude() {
        let storm = Storm::new(&GameConfig::default().with_storm_amplitude(17, 33));
        for now in (0..20_000).step_by(7) {
            let (dx, dy) = storm.offset(now);
            assert!(dx.abs() <= 17);
            assert!(dy.abs() <= 33);
        }
    }

    #[test]
    fn axes_are_out_of_phase() {
        let storm = Storm::new(&GameConfig::default().with_storm_amplitude(20, 20));
        // At t = 0 the x axis is at zero while y, a quarter turn ahead, peaks.
        assert_eq!(storm.offset(0), (0, 20));
        // A quarter of the x period later x peaks.
        assert_eq!(storm.offset(1000).0, 20);
    }

    #[test]
    fn offset_is_periodic() {
        let storm = Storm::new(&GameConfig::default());
        assert_eq!(storm.offset(123).0, storm.offset(123 + 4000).0);
        assert_eq!(storm.offset(123).1, storm.offset(123 + 6000).1);
    }

    #[test]
    fn adjust_clamps_to_range() {
        let mut storm = Storm::new(&GameConfig::default());
        assert_eq!(storm.amplitude(), (10, 10));
        assert_eq!(storm.adjust(5, -3), (15, 7));
        assert_eq!(storm.adjust(-100, 100), (0, 50));
        assert_eq!(storm.adjust(i16::MIN, i16::MAX), (0, 50));
    }

    #[test]
    fn zero_amplitude_is_still() {
        let storm = Storm::new(&GameConfig::default().with_storm_amplitude(0, 0));
        assert_eq!(storm.offset(777), (0, 0));
    }
}
