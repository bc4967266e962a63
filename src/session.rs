//! Game session state machine.
//!
//! ```text
//!            Start              Pause
//!   Idle ──────────▶ Active ◀────────▶ Paused
//!    ▲                 │
//!    │ Reset           │ clock hits 0
//!    └──── Ended ◀─────┘
//! ```
//!
//! `Reset` returns to `Idle` from anywhere; `Start` restarts a round from
//! anywhere. All output goes through an [`EventSink`]; a dropped line never
//! changes what the session does.

use core::fmt;

use crate::{
    aim::{
        AimController,
        AimPoint,
        LockChange,
        Nudge,
    },
    command::Effect,
    config::{
        GameConfig,
        MAX_SHIPS,
    },
    debounce::{
        Button,
        Edge,
    },
    readout::Readout,
    rng::Entropy,
    ships::{
        Hit,
        ShipField,
    },
    storm::Storm,
    telemetry::{
        Event,
        EventSink,
        Milestone,
        Scoreboard,
    },
    time::{
        Every,
        Tick,
        elapsed,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Idle,
    Active,
    Paused,
    Ended,
}

impl State {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }
}

/// Outcome of one resolved shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shot {
    Hit(Hit),
    Miss { x: u16, y: u16 },
}

/// Periodic work while a round runs.
#[derive(Clone, Copy, Debug)]
struct Timers {
    second: Every,
    spawn: Every,
    sweep: Every,
    crosshair: Every,
    storm: Every,
}

impl Timers {
    const fn new(config: &GameConfig, now: Tick) -> Self {
        Self {
            second: Every::new(config.second, now),
            spawn: Every::new(config.spawn_interval, now),
            sweep: Every::new(config.aim_interval, now),
            crosshair: Every::new(config.crosshair_report_interval, now),
            storm: Every::new(config.storm_report_interval, now),
        }
    }

    const fn rearm(&mut self, now: Tick) {
        self.second.rearm(now);
        self.spawn.rearm(now);
        self.sweep.rearm(now);
        self.crosshair.rearm(now);
        self.storm.rearm(now);
    }

    const fn delay(&mut self, by: u32) {
        self.second.delay(by);
        self.spawn.delay(by);
        self.sweep.delay(by);
        self.crosshair.delay(by);
        self.storm.delay(by);
    }
}

pub struct Session<const N: usize = MAX_SHIPS> {
    config: GameConfig,
    state: State,
    time_remaining: u8,
    score: u32,
    shots: u32,
    hits: u32,
    ships: ShipField<N>,
    aim: AimController,
    storm: Storm,
    timers: Timers,
    /// When the current pause began.
    paused_at: Tick,
    blink: Every,
    visible: bool,
}

impl<const N: usize> Session<N> {
    pub const fn new(config: GameConfig, now: Tick) -> Self {
        Self {
            state: State::Idle,
            time_remaining: config.round_seconds,
            score: 0,
            shots: 0,
            hits: 0,
            ships: ShipField::new(&config, now),
            aim: AimController::new(&config),
            storm: Storm::new(&config),
            timers: Timers::new(&config, now),
            paused_at: now,
            blink: Every::new(config.blink_interval, now),
            visible: true,
            config,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub const fn state(&self) -> State {
        self.state
    }

    pub const fn time_remaining(&self) -> u8 {
        self.time_remaining
    }

    pub const fn scoreboard(&self) -> Scoreboard {
        Scoreboard {
            score: self.score,
            hits: self.hits,
            shots: self.shots,
            time_remaining: self.time_remaining,
        }
    }

    pub const fn aim(&self) -> AimPoint {
        self.aim.point()
    }

    pub const fn ships(&self) -> &ShipField<N> {
        &self.ships
    }

    /// Direct field access, for scripted setups.
    pub const fn ships_mut(&mut self) -> &mut ShipField<N> {
        &mut self.ships
    }

    pub const fn storm(&self) -> &Storm {
        &self.storm
    }

    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// What the two-digit display should show.
    pub fn readout(&self) -> Readout {
        let value = match self.state {
            State::Idle => u32::from(self.config.round_seconds),
            State::Active | State::Paused => u32::from(self.time_remaining),
            State::Ended => self.score,
        };
        Readout::new(value, self.visible)
    }

    // ── Transitions ─────────────────────────────────────────────────────────

    /// Fresh round from any state.
    pub fn start(&mut self, now: Tick, sink: &mut impl EventSink) {
        self.clear(now);
        self.state = State::Active;
        info!("round started, {} s", self.time_remaining);

        sink.emit(Event::Com(format_args!("START=1, PAUSE=0"))).ok();
        sink.emit(Event::Time(self.time_remaining)).ok();
        self.report_aim(now, sink);
        sink.emit(Event::Lock(false)).ok();
        sink.emit(Event::Milestone(Milestone::Start {
            seconds: self.time_remaining,
        }))
        .ok();
    }

    /// Back to `Idle` from any state.
    pub fn reset(&mut self, now: Tick, sink: &mut impl EventSink) {
        self.clear(now);
        self.state = State::Idle;
        info!("session reset");

        sink.emit(Event::Com(format_args!("reset=1"))).ok();
        sink.emit(Event::Time(self.time_remaining)).ok();
        self.report_aim(now, sink);
        sink.emit(Event::Lock(false)).ok();
    }

    /// `Active` ↔ `Paused`; ignored elsewhere.
    pub fn toggle_pause(&mut self, now: Tick, sink: &mut impl EventSink) {
        let paused = match self.state {
            State::Active => {
                self.state = State::Paused;
                self.paused_at = now;
                self.blink.rearm(now);
                true
            }
            State::Paused => {
                self.state = State::Active;
                self.visible = true;
                let held = elapsed(now, self.paused_at);
                self.timers.delay(held);
                self.ships.delay(held);
                false
            }
            State::Idle | State::Ended => {
                debug!("pause ignored while {}", self.state.name());
                sink.emit(Event::Com(format_args!(
                    "pause ignored, {}",
                    self.state.name()
                )))
                .ok();
                return;
            }
        };
        debug!("paused: {}", paused);
        sink.emit(Event::Com(format_args!("START=1, PAUSE={}", u8::from(paused))))
            .ok();
    }

    fn clear(&mut self, now: Tick) {
        self.time_remaining = self.config.round_seconds;
        self.score = 0;
        self.shots = 0;
        self.hits = 0;
        self.ships.clear(now);
        self.aim.reset();
        self.timers.rearm(now);
        self.blink.rearm(now);
        self.visible = true;
    }

    fn end(&mut self, sink: &mut impl EventSink) {
        self.state = State::Ended;
        self.aim.unlock();
        self.visible = true;
        info!("round over, score {}", self.score);

        sink.emit(Event::Milestone(Milestone::End { score: self.score }))
            .ok();
        sink.emit(Event::Game(self.scoreboard())).ok();
    }

    // ── Inputs ──────────────────────────────────────────────────────────────

    /// Resolve a shot at field coordinates. Only counts while `Active`.
    pub fn shoot(&mut self, x: u16, y: u16, sink: &mut impl EventSink) -> Option<Shot> {
        if self.state != State::Active {
            debug!("shot ignored while {}", self.state.name());
            return None;
        }

        self.shots = self.shots.saturating_add(1);
        let shot = match self.ships.hit_test(x, y) {
            Some(hit) => {
                self.hits = self.hits.saturating_add(1);
                self.score = self.score.saturating_add(hit.kind.points());
                sink.emit(Event::Hit {
                    kind: hit.kind,
                    x: hit.x,
                    y: hit.y,
                })
                .ok();
                Shot::Hit(hit)
            }
            None => {
                sink.emit(Event::Miss { x, y }).ok();
                Shot::Miss { x, y }
            }
        };
        sink.emit(Event::Game(self.scoreboard())).ok();
        Some(shot)
    }

    /// Apply one interpreted command.
    pub fn apply(&mut self, effect: &Effect, now: Tick, sink: &mut impl EventSink) {
        match effect {
            Effect::StartGame => self.start(now, sink),
            Effect::PauseToggle => self.toggle_pause(now, sink),
            Effect::Reset => self.reset(now, sink),
            Effect::Shot { x, y } => {
                if self.shoot(*x, *y, sink).is_none() {
                    sink.emit(Event::Com(format_args!(
                        "shot ignored, {}",
                        self.state.name()
                    )))
                    .ok();
                }
            }
            Effect::AdjustDisturbance { dx, dy } => {
                let (ax, ay) = self.storm.adjust(*dx, *dy);
                debug!("storm amplitude {} {}", ax, ay);
                sink.emit(Event::Com(format_args!("storm={ax},{ay}"))).ok();
            }
            Effect::Status => {
                sink.emit(Event::Game(self.scoreboard())).ok();
            }
            Effect::Hello => {
                sink.emit(Event::Com(format_args!(
                    "hello, state={}",
                    self.state.name()
                )))
                .ok();
            }
            Effect::Malformed { line } => {
                warn!("malformed command, {} bytes", line.len());
                sink.emit(Event::Com(format_args!(
                    "malformed cmd: {}",
                    Printable(line)
                )))
                .ok();
            }
            Effect::Unknown { line } => {
                debug!("unknown command, {} bytes", line.len());
                sink.emit(Event::Com(format_args!(
                    "unknown cmd: {}",
                    Printable(line)
                )))
                .ok();
            }
        }
    }

    /// React to a debounced button edge. Only presses during play count.
    pub fn on_edge(&mut self, button: Button, edge: Edge, now: Tick, sink: &mut impl EventSink) {
        if edge != Edge::Pressed || self.state != State::Active {
            return;
        }
        trace!("{} pressed", button.name());

        match button {
            Button::Left | Button::Right => {
                let nudge = if button == Button::Left {
                    Nudge::Left
                } else {
                    Nudge::Right
                };
                if self.aim.step(nudge) {
                    self.report_aim(now, sink);
                }
            }
            Button::Confirm => match self.aim.toggle_lock() {
                LockChange::Armed => {
                    sink.emit(Event::Lock(true)).ok();
                    self.timers.sweep.rearm(now);
                    self.timers.crosshair.rearm(now);
                    self.report_aim(now, sink);
                }
                LockChange::Fired { x, y } => {
                    self.shoot(x, y, sink);
                    sink.emit(Event::Lock(false)).ok();
                    self.report_aim(now, sink);
                }
            },
        }
    }

    /// Advance time-driven behaviour to `now`.
    pub fn tick(&mut self, now: Tick, rng: &mut impl Entropy, sink: &mut impl EventSink) {
        match self.state {
            State::Active => self.tick_active(now, rng, sink),
            State::Paused => {
                if self.blink.fire(now) {
                    self.visible = !self.visible;
                }
            }
            State::Idle | State::Ended => {}
        }
    }

    fn tick_active(&mut self, now: Tick, rng: &mut impl Entropy, sink: &mut impl EventSink) {
        if self.timers.second.fire(now) {
            self.time_remaining = self.time_remaining.saturating_sub(1);
            sink.emit(Event::Time(self.time_remaining)).ok();
            if self.time_remaining == 0 {
                self.end(sink);
                return;
            }
        }

        if self.timers.spawn.fire(now)
            && let Some(index) = self.ships.spawn(now, rng)
            && let Some(ship) = self.ships.get(index)
        {
            sink.emit(Event::Ship {
                kind: ship.kind,
                x: ship.x,
                y: ship.y,
            })
            .ok();
        }

        if self.timers.sweep.fire(now) {
            self.aim.advance();
        }

        if self.timers.crosshair.fire(now) && self.aim.is_locked() {
            self.report_aim(now, sink);
        }

        if self.timers.storm.fire(now) {
            let (dx, dy) = self.storm.offset(now);
            sink.emit(Event::Storm { dx, dy }).ok();
        }
    }

    /// `CROSSHAIR:` line; locked positions carry the storm offset.
    fn report_aim(&self, now: Tick, sink: &mut impl EventSink) {
        let point = self.aim.point();
        let (x, y) = if point.locked {
            self.aim.reported(self.storm.offset(now))
        } else {
            (point.x, point.y)
        };
        sink.emit(Event::Crosshair {
            x,
            y,
            locked: point.locked,
        })
        .ok();
    }
}

/// Echoes received bytes with anything unprintable shown as `?`.
struct Printable<'a>(&'a [u8]);

impl fmt::Display for Printable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' { char::from(b) } else { '?' };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}
