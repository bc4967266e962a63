//! Ship shooter firmware.
//!
//! Serial (UART0, 115200 8N1) talks to the display host; the LCD shows the
//! two-digit readout.
//!
//! Controls:
//! - D-pad Left/Right: move the crosshair
//! - A: lock (crosshair starts sweeping), press again to fire

#![no_std]
#![no_main]

use defmt::info;
#[allow(clippy::wildcard_imports)]
use shipshot::*;
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Instant,
    Timer,
};
use esp_backtrace as _;
use esp_hal::{
    Async,
    timer::timg::TimerGroup,
    uart::UartRx,
};
use esp_println as _;

esp_bootloader_esp_idf::esp_app_desc!();

const LOOP_MS: u64 = 1;

static RX: RxRing<{ config::RX_RING_SIZE }> = RxRing::new();
static LEVELS: LevelLatch = LevelLatch::new();

// ── Tasks ───────────────────────────────────────────────────────────────────

#[embassy_executor::task]
async fn input_task(buttons: &'static mut Buttons) {
    info!("Input task started");
    buttons.watch(&LEVELS).await
}

#[embassy_executor::task]
async fn serial_task(rx: &'static mut UartRx<'static, Async>) {
    info!("Serial task started");
    uart::receive(rx, &RX).await
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = shipshot::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let buttons = mk_static!(Buttons, resources.buttons.into());
    let SerialLink { rx, mut tx } = resources.serial.into();
    let rx = mk_static!(UartRx<'static, Async>, rx);
    let mut panel = Panel::new(resources.display.into(), resources.backlight);

    spawner.must_spawn(input_task(buttons));
    spawner.must_spawn(serial_task(rx));

    // Good enough as a seed: boot time varies with flash and clock start-up.
    let seed = Instant::now().as_ticks() as u32;
    let start = Instant::now();
    let now = || start.elapsed().as_millis() as Tick;

    let mut arcade: Arcade<XorShift32> = Arcade::new(GameConfig::default(), XorShift32::new(seed), now());
    info!("Arcade ready, seed {=u32:x}", seed);

    loop {
        arcade.step(now(), LEVELS.levels(), &RX);
        arcade.drain(&mut tx);
        panel.show(arcade.readout());
        Timer::after(Duration::from_millis(LOOP_MS)).await;
    }
}
