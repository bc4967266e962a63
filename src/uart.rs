//! Serial link to the display host: UART0, 115200 8N1.
//!
//! Receiving runs as its own task and only appends into an [`RxRing`];
//! transmitting is non-waiting and driven by the main loop through
//! [`Uplink`].

use esp_hal::{
    Async,
    uart::{
        Config,
        Uart,
        UartRx,
        UartTx,
    },
};

use crate::{
    SerialResources,
    serial::RxRing,
    telemetry::Uplink,
};

pub const BAUD_RATE: u32 = 115_200;

/// Both halves of the UART.
pub struct SerialLink {
    pub rx: UartRx<'static, Async>,
    pub tx: UartTx<'static, Async>,
}

impl From<SerialResources<'static>> for SerialLink {
    fn from(res: SerialResources<'static>) -> Self {
        let config = Config::default().with_baudrate(BAUD_RATE);
        let uart = Uart::new(res.uart, config)
            .unwrap()
            .with_tx(res.tx)
            .with_rx(res.rx)
            .into_async();
        let (rx, tx) = uart.split();
        Self { rx, tx }
    }
}

impl Uplink for UartTx<'_, Async> {
    fn write(&mut self, bytes: &[u8]) -> usize {
        // `UartTx::write` waits for FIFO space; only call it when some is free.
        if !self.write_ready() {
            return 0;
        }
        UartTx::write(self, bytes).unwrap_or(0)
    }
}

/// Forward everything received into `ring`.
pub async fn receive<const N: usize>(rx: &mut UartRx<'static, Async>, ring: &RxRing<N>) -> ! {
    let mut chunk = [0u8; 32];
    loop {
        match rx.read_async(&mut chunk).await {
            Ok(n) => ring.publish(&chunk[..n]),
            Err(err) => {
                warn!("uart rx error: {}", err);
            }
        }
    }
}
