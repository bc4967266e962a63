//! Ship slots, spawning and hit testing.

use crate::{
    config::GameConfig,
    rng::Entropy,
    time::{
        Tick,
        elapsed,
    },
};

/// Ship size class. Bigger ships are easier to hit and worth more.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShipKind {
    Small,
    Medium,
    Large,
}

impl ShipKind {
    pub const fn radius(self) -> u32 {
        match self {
            Self::Small => 25,
            Self::Medium => 35,
            Self::Large => 45,
        }
    }

    pub const fn radius_sq(self) -> u32 {
        self.radius() * self.radius()
    }

    pub const fn points(self) -> u32 {
        match self {
            Self::Small => 10,
            Self::Medium => 20,
            Self::Large => 30,
        }
    }

    /// Single-letter tag used on the wire.
    pub const fn tag(self) -> char {
        match self {
            Self::Small => 'S',
            Self::Medium => 'M',
            Self::Large => 'L',
        }
    }

    /// Pick a kind from a roll in `0..total` of `weights` (small, medium, large).
    fn from_roll(roll: u32, weights: [u8; 3]) -> Self {
        let small = u32::from(weights[0]);
        let medium = small + u32::from(weights[1]);
        if roll < small {
            Self::Small
        } else if roll < medium {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

/// One slot of the field. When `active` is false the other fields are stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ship {
    pub active: bool,
    pub kind: ShipKind,
    pub x: u16,
    pub y: u16,
}

impl Ship {
    pub const EMPTY: Self = Self {
        active: false,
        kind: ShipKind::Small,
        x: 0,
        y: 0,
    };

    /// Squared distance to a point, in field units. Exact for any two `u16`
    /// points.
    pub const fn distance_sq(&self, x: u16, y: u16) -> u64 {
        let dx = self.x.abs_diff(x) as u64;
        let dy = self.y.abs_diff(y) as u64;
        dx * dx + dy * dy
    }

    /// Whether `(x, y)` lies within this ship's hit radius.
    pub const fn covers(&self, x: u16, y: u16) -> bool {
        self.distance_sq(x, y) <= self.kind.radius_sq() as u64
    }
}

/// A confirmed hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub index: usize,
    pub kind: ShipKind,
    pub x: u16,
    pub y: u16,
}

/// Fixed array of ship slots plus the spawn pacing.
#[derive(Clone, Debug)]
pub struct ShipField<const N: usize> {
    ships: [Ship; N],
    last_spawn: Tick,
    spawn_interval: u32,
    spawn_x: (u16, u16),
    spawn_y: (u16, u16),
    weights: [u8; 3],
}

impl<const N: usize> ShipField<N> {
    /// Empty field. The first spawn is allowed one interval after `now`.
    pub const fn new(config: &GameConfig, now: Tick) -> Self {
        Self {
            ships: [Ship::EMPTY; N],
            last_spawn: now,
            spawn_interval: config.spawn_interval,
            spawn_x: config.spawn_x,
            spawn_y: config.spawn_y,
            weights: config.spawn_weights,
        }
    }

    /// Deactivate every slot and restart spawn pacing from `now`.
    pub fn clear(&mut self, now: Tick) {
        for ship in &mut self.ships {
            ship.active = false;
        }
        self.last_spawn = now;
    }

    /// Push spawn pacing `by` ticks later, as if that time never passed.
    pub const fn delay(&mut self, by: u32) {
        self.last_spawn = self.last_spawn.wrapping_add(by);
    }

    /// Whether a spawn attempt at `now` would pass the interval gate.
    pub const fn spawn_due(&self, now: Tick) -> bool {
        elapsed(now, self.last_spawn) >= self.spawn_interval
    }

    /// Place a new ship in the first free slot.
    ///
    /// Returns `None` without side effects when the interval has not elapsed
    /// or every slot is taken; neither is an error.
    pub fn spawn(&mut self, now: Tick, rng: &mut impl Entropy) -> Option<usize> {
        if !self.spawn_due(now) {
            return None;
        }
        let index = self.ships.iter().position(|s| !s.active)?;

        let total: u32 = self.weights.iter().map(|&w| u32::from(w)).sum();
        let kind = ShipKind::from_roll(rng.below(total), self.weights);
        let x = self.spawn_x.0 + span(rng, self.spawn_x);
        let y = self.spawn_y.0 + span(rng, self.spawn_y);

        self.ships[index] = Ship {
            active: true,
            kind,
            x,
            y,
        };
        self.last_spawn = now;
        debug!("ship {} spawned in slot {}", kind.tag() as u8, index);
        Some(index)
    }

    /// Find the first active ship covering `(x, y)` and destroy it.
    ///
    /// Slots are scanned in index order, so when ships overlap the lowest
    /// index is hit.
    pub fn hit_test(&mut self, x: u16, y: u16) -> Option<Hit> {
        let (index, ship) = self
            .ships
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.active && s.covers(x, y))?;
        ship.active = false;
        Some(Hit {
            index,
            kind: ship.kind,
            x: ship.x,
            y: ship.y,
        })
    }

    /// Place a ship directly. Returns `false` if the slot is out of range.
    pub fn place(&mut self, index: usize, kind: ShipKind, x: u16, y: u16) -> bool {
        match self.ships.get_mut(index) {
            Some(slot) => {
                *slot = Ship {
                    active: true,
                    kind,
                    x,
                    y,
                };
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Ship> {
        self.ships.get(index).filter(|s| s.active)
    }

    pub fn active_count(&self) -> usize {
        self.ships.iter().filter(|s| s.active).count()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Ship)> {
        self.ships.iter().enumerate().filter(|(_, s)| s.active)
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

fn span(rng: &mut impl Entropy, (lo, hi): (u16, u16)) -> u16 {
    rng.below(u32::from(hi.saturating_sub(lo))) as u16
}
