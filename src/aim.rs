//! Crosshair motion.
//!
//! Unlocked, the crosshair slides horizontally in button-sized steps.
//! Locked, it sweeps up and down on its own until the player releases the
//! lock, which fires at the current position.

use crate::config::{
    Bounds,
    GameConfig,
};

/// Vertical sweep direction. Field `y` grows downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    const fn flipped(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// Horizontal nudge requested by a button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Nudge {
    Left,
    Right,
}

/// Authoritative crosshair state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AimPoint {
    pub x: u16,
    pub y: u16,
    pub locked: bool,
    pub vertical_direction: Direction,
}

/// Result of toggling the lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockChange {
    /// Unlocked → locked; the vertical sweep starts.
    Armed,
    /// Locked → unlocked; resolve a shot at these coordinates.
    Fired { x: u16, y: u16 },
}

#[derive(Clone, Copy, Debug)]
pub struct AimController {
    point: AimPoint,
    bounds: Bounds,
    home: (u16, u16),
    step_x: u16,
    step_y: u16,
}

impl AimController {
    pub const fn new(config: &GameConfig) -> Self {
        Self {
            point: AimPoint {
                x: config.aim_home.0,
                y: config.aim_home.1,
                locked: false,
                vertical_direction: Direction::Down,
            },
            bounds: config.aim_bounds,
            home: config.aim_home,
            step_x: config.aim_step_x,
            step_y: config.aim_step_y,
        }
    }

    pub const fn point(&self) -> AimPoint {
        self.point
    }

    pub const fn is_locked(&self) -> bool {
        self.point.locked
    }

    /// Back to the home position, unlocked, sweeping down.
    pub const fn reset(&mut self) {
        self.point = AimPoint {
            x: self.home.0,
            y: self.home.1,
            locked: false,
            vertical_direction: Direction::Down,
        };
    }

    /// Move horizontally by one step, stopping at the wall.
    ///
    /// Ignored while locked. Returns whether the position changed.
    pub fn step(&mut self, nudge: Nudge) -> bool {
        if self.point.locked {
            return false;
        }
        let step = i32::from(self.step_x);
        let target = match nudge {
            Nudge::Left => i32::from(self.point.x) - step,
            Nudge::Right => i32::from(self.point.x) + step,
        };
        let x = self.bounds.clamp_x(target);
        let moved = x != self.point.x;
        self.point.x = x;
        moved
    }

    pub fn toggle_lock(&mut self) -> LockChange {
        self.point.locked = !self.point.locked;
        if self.point.locked {
            LockChange::Armed
        } else {
            LockChange::Fired {
                x: self.point.x,
                y: self.point.y,
            }
        }
    }

    /// Release the lock without firing.
    pub const fn unlock(&mut self) {
        self.point.locked = false;
    }

    /// One sweep step while locked; bounces off the vertical bounds.
    pub fn advance(&mut self) {
        if !self.point.locked {
            return;
        }
        let step = i32::from(self.step_y);
        let y = match self.point.vertical_direction {
            Direction::Up => i32::from(self.point.y) - step,
            Direction::Down => i32::from(self.point.y) + step,
        };
        let clamped = self.bounds.clamp_y(y);
        if i32::from(clamped) != y || clamped == self.bounds.min_y || clamped == self.bounds.max_y {
            self.point.vertical_direction = self.point.vertical_direction.flipped();
        }
        self.point.y = clamped;
    }

    /// Position as shown to the display: the storm offset added and clamped.
    ///
    /// Never used for hit testing.
    pub const fn reported(&self, offset: (i16, i16)) -> (u16, u16) {
        (
            self.bounds.clamp_x(self.point.x as i32 + offset.0 as i32),
            self.bounds.clamp_y(self.point.y as i32 + offset.1 as i32),
        )
    }
}
