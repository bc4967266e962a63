//! The main loop's state, bundled.
//!
//! Firmware owns one [`Arcade`] and calls [`step`](Arcade::step) every
//! iteration with the current tick, a snapshot of the button levels and the
//! receive ring, then [`drain`](Arcade::drain)s telemetry whenever the
//! transmitter is idle.

use crate::{
    command::interpret,
    config::{
        GameConfig,
        TX_QUEUE_SIZE,
    },
    debounce::{
        BUTTON_COUNT,
        ButtonBank,
        Level,
    },
    readout::Readout,
    rng::Entropy,
    serial::{
        LineDecoder,
        RxRing,
    },
    session::Session,
    telemetry::{
        Telemetry,
        Uplink,
    },
    time::Tick,
};

pub struct Arcade<R: Entropy, const TX: usize = TX_QUEUE_SIZE> {
    decoder: LineDecoder,
    buttons: ButtonBank,
    session: Session,
    telemetry: Telemetry<TX>,
    rng: R,
}

impl<R: Entropy, const TX: usize> Arcade<R, TX> {
    pub fn new(config: GameConfig, rng: R, now: Tick) -> Self {
        info!("arcade up, {} s rounds", config.round_seconds);
        Self {
            decoder: LineDecoder::new(),
            buttons: ButtonBank::new(config.debounce_delay, config.button_poll_interval),
            session: Session::new(config, now),
            telemetry: Telemetry::new(),
            rng,
        }
    }

    /// One loop iteration: commands first, then buttons, then time.
    pub fn step<const RX: usize>(
        &mut self,
        now: Tick,
        levels: [Level; BUTTON_COUNT],
        rx: &RxRing<RX>,
    ) {
        loop {
            self.decoder.poll(rx);
            let Some(line) = self.decoder.take_ready_line() else {
                break;
            };
            for effect in interpret(&line) {
                self.session.apply(&effect, now, &mut self.telemetry);
            }
        }

        for (button, edge) in self.buttons.poll(now, levels) {
            self.session.on_edge(button, edge, now, &mut self.telemetry);
        }

        self.session.tick(now, &mut self.rng, &mut self.telemetry);
    }

    /// Push queued telemetry out. Returns the bytes sent.
    pub fn drain(&mut self, uplink: &mut impl Uplink) -> usize {
        self.telemetry.drain_if_ready(uplink)
    }

    pub fn readout(&self) -> Readout {
        self.session.readout()
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub const fn telemetry(&self) -> &Telemetry<TX> {
        &self.telemetry
    }

    pub const fn decoder(&self) -> &LineDecoder {
        &self.decoder
    }
}
