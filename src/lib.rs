//! # shipshot
//!
//! Control core for a two-button "shoot the ships" arcade board.
//!
//! The player steers a crosshair with left/right, locks it with the confirm
//! button (the crosshair then sweeps vertically under a "storm" wobble) and
//! fires by releasing the lock. Ships spawn on a timer; a remote display
//! host receives line-oriented telemetry over serial and can send commands
//! back.
//!
//! Everything except the `badge` hardware binding is plain `no_std` logic
//! that runs and tests on the host:
//! - **Input**: [`debounce`] turns raw pin levels into edges, [`serial`]
//!   assembles command lines from an interrupt-fed ring, [`command`] maps
//!   lines to [`Effect`]s
//! - **Game**: [`ships`], [`aim`], [`storm`] and the [`session`] state machine
//! - **Output**: [`telemetry`] lines in a drop-on-full queue and a two-digit
//!   [`readout`]
//!
//! ## Quick start
//!
//! ```rust
//! use shipshot::{Arcade, GameConfig, Level, RxRing, XorShift32};
//!
//! let rx: RxRing<64> = RxRing::new();
//! let mut arcade: Arcade<_> = Arcade::new(GameConfig::default(), XorShift32::new(1), 0);
//!
//! rx.publish(b"CMD:START\r\n");
//! arcade.step(0, [Level::High; 3], &rx);
//! assert_eq!(arcade.readout().value, 60);
//! ```

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod aim;
pub mod arcade;
pub mod command;
pub mod config;
pub mod debounce;
pub mod readout;
pub mod rng;
pub mod serial;
pub mod session;
pub mod ships;
pub mod storm;
pub mod telemetry;
pub mod time;

#[cfg(feature = "badge")]
mod buttons;
#[cfg(feature = "badge")]
mod panel;
#[cfg(feature = "badge")]
pub mod uart;

pub use aim::AimPoint;
pub use arcade::Arcade;
pub use command::{
    Effect,
    interpret,
};
pub use config::GameConfig;
pub use debounce::{
    Button,
    Edge,
    Level,
    LevelLatch,
};
pub use readout::Readout;
pub use rng::{
    Entropy,
    XorShift32,
};
pub use serial::{
    LineDecoder,
    RxRing,
};
pub use session::{
    Session,
    State,
};
pub use ships::ShipKind;
pub use telemetry::{
    Event,
    EventSink,
    Telemetry,
    Uplink,
};
pub use time::Tick;

#[cfg(feature = "badge")]
pub use badge::*;

/// StaticCell helper: allocates a value into a `static` exactly once.
#[cfg(feature = "badge")]
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

#[cfg(feature = "badge")]
mod badge {
    pub use crate::{
        buttons::Buttons,
        panel::{
            Display,
            Panel,
        },
        uart::SerialLink,
    };
    use esp_hal::{
        assign_resources,
        clock::{
            Clock,
            CpuClock,
        },
        rom,
    };

    // ── Pin / peripheral assignments ────────────────────────────────────────

    assign_resources! {
        pub Resources<'d> {
            display: DisplayResources<'d> {
                dc: GPIO15,
                rst: GPIO7,
                sck: GPIO4,
                cs: GPIO6,
                miso: GPIO16,
                mosi: GPIO5,
                spi: SPI2,
                dma: DMA_CH0,
            },
            backlight: BacklightResources<'d> {
                led: GPIO19,
            },
            buttons: ButtonResources<'d> {
                left: GPIO21,
                right: GPIO2,
                confirm: GPIO13,
            },
            serial: SerialResources<'d> {
                uart: UART0,
                tx: GPIO43,
                rx: GPIO44,
            },
        }
    }

    // ── Board initialisation ────────────────────────────────────────────────

    /// Minimal CPU clock switcher for ESP32-S3.
    ///
    /// Steps through an intermediate frequency before reaching the target,
    /// which is required by the hardware.
    fn set_cpu_clock(cpu_clock_speed: CpuClock) {
        let _ = esp_hal::peripherals::SYSTEM::regs()
            .sysclk_conf()
            .modify(|_, w| unsafe { w.soc_clk_sel().bits(1) });
        let _ = esp_hal::peripherals::SYSTEM::regs()
            .cpu_per_conf()
            .modify(|_, w| unsafe {
                let _ = w.pll_freq_sel().set_bit();
                w.cpuperiod_sel().bits(match cpu_clock_speed {
                    CpuClock::_80MHz => 0,
                    CpuClock::_160MHz => 1,
                    CpuClock::_240MHz => 2,
                    _ => panic!("Unsupported CPU clock speed"),
                })
            });

        rom::ets_update_cpu_frequency_rom(cpu_clock_speed.frequency().as_mhz());
    }

    /// Initialise the board and return the raw peripheral set.
    ///
    /// Call once at the top of `main`, then break the peripherals up with
    /// [`split_resources!`].
    #[must_use]
    pub fn init() -> esp_hal::peripherals::Peripherals {
        set_cpu_clock(CpuClock::_160MHz);
        let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
        esp_hal::init(config)
    }

    impl From<esp_hal::peripherals::Peripherals> for Resources<'_> {
        fn from(peripherals: esp_hal::peripherals::Peripherals) -> Self {
            split_resources!(peripherals)
        }
    }
}
