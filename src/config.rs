//! Game tunables.
//!
//! Capacities that size buffers are compile-time constants; everything that
//! only shapes behaviour lives in [`GameConfig`], built the same way as
//! `esp_hal::Config`:
//!
//! ```
//! use shipshot::GameConfig;
//!
//! let config = GameConfig::default()
//!     .with_round_seconds(30)
//!     .with_spawn_interval(1500);
//! assert_eq!(config.round_seconds, 30);
//! ```

// ── Capacities ──────────────────────────────────────────────────────────────

/// Number of ship slots on the field.
pub const MAX_SHIPS: usize = 30;

/// Longest accepted command line, terminator excluded.
pub const CMD_LINE_SIZE: usize = 32;

/// Longest telemetry line, `\r\n` included.
pub const TELEMETRY_LINE_MAX: usize = 64;

/// Receive ring size. Must be a power of two.
pub const RX_RING_SIZE: usize = 64;

/// Telemetry queue size in bytes.
pub const TX_QUEUE_SIZE: usize = 512;

// ── Field geometry ──────────────────────────────────────────────────────────

pub const FIELD_WIDTH: u16 = 800;
pub const FIELD_HEIGHT: u16 = 600;

/// Inclusive rectangle in field coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bounds {
    pub min_x: u16,
    pub max_x: u16,
    pub min_y: u16,
    pub max_y: u16,
}

impl Bounds {
    pub const fn clamp_x(&self, x: i32) -> u16 {
        clamp(x, self.min_x, self.max_x)
    }

    pub const fn clamp_y(&self, y: i32) -> u16 {
        clamp(y, self.min_y, self.max_y)
    }

    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

const fn clamp(v: i32, lo: u16, hi: u16) -> u16 {
    if v < lo as i32 {
        lo
    } else if v > hi as i32 {
        hi
    } else {
        v as u16
    }
}

// ── Runtime configuration ───────────────────────────────────────────────────

/// Behavioural knobs for one game build. All intervals are in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Where the aim point may go.
    pub aim_bounds: Bounds,
    /// Aim point position after start and reset.
    pub aim_home: (u16, u16),
    pub aim_step_x: u16,
    pub aim_step_y: u16,
    /// Period of the locked vertical sweep.
    pub aim_interval: u32,
    /// Period of `CROSSHAIR:` reports while locked.
    pub crosshair_report_interval: u32,

    /// Ships spawn with `x` in `spawn_x.0..spawn_x.1` (half-open).
    pub spawn_x: (u16, u16),
    pub spawn_y: (u16, u16),
    pub spawn_interval: u32,
    /// Relative weights of small, medium and large ships.
    pub spawn_weights: [u8; 3],

    pub round_seconds: u8,
    pub second: u32,
    pub blink_interval: u32,

    pub debounce_delay: u32,
    pub button_poll_interval: u32,

    pub storm_period_x: u32,
    pub storm_period_y: u32,
    /// Phase lead of the y axis, in 1/1024 turns.
    pub storm_phase_y: u16,
    pub storm_amplitude: (u8, u8),
    pub storm_amplitude_max: u8,
    /// Multiplier applied to `CMD:STORM_UPDATE` deltas.
    pub storm_delta_scale: i16,
    pub storm_report_interval: u32,
}

impl GameConfig {
    pub const fn new() -> Self {
        Self {
            aim_bounds: Bounds {
                min_x: 40,
                max_x: FIELD_WIDTH - 40,
                min_y: 40,
                max_y: FIELD_HEIGHT - 40,
            },
            aim_home: (FIELD_WIDTH / 2, FIELD_HEIGHT / 2),
            aim_step_x: 25,
            aim_step_y: 3,
            aim_interval: 16,
            crosshair_report_interval: 50,

            spawn_x: (40, FIELD_WIDTH - 40),
            spawn_y: (40, FIELD_HEIGHT - 100),
            spawn_interval: 2000,
            spawn_weights: [50, 30, 20],

            round_seconds: 60,
            second: 1000,
            blink_interval: 500,

            debounce_delay: 20,
            button_poll_interval: 30,

            storm_period_x: 4000,
            storm_period_y: 6000,
            storm_phase_y: 256,
            storm_amplitude: (10, 10),
            storm_amplitude_max: 50,
            storm_delta_scale: 1,
            storm_report_interval: 200,
        }
    }

    #[must_use]
    pub const fn with_round_seconds(mut self, seconds: u8) -> Self {
        self.round_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_spawn_interval(mut self, ticks: u32) -> Self {
        self.spawn_interval = ticks;
        self
    }

    #[must_use]
    pub const fn with_spawn_weights(mut self, weights: [u8; 3]) -> Self {
        self.spawn_weights = weights;
        self
    }

    #[must_use]
    pub const fn with_aim_interval(mut self, ticks: u32) -> Self {
        self.aim_interval = ticks;
        self
    }

    #[must_use]
    pub const fn with_debounce_delay(mut self, ticks: u32) -> Self {
        self.debounce_delay = ticks;
        self
    }

    #[must_use]
    pub const fn with_storm_amplitude(mut self, x: u8, y: u8) -> Self {
        self.storm_amplitude = (x, y);
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
