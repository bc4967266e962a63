//! The readout on the badge LCD: ST7789 320×170 over SPI with DMA, plus
//! the backlight, which carries the pause blink.

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        iso_8859_1::FONT_10X20,
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{
        PrimitiveStyle,
        Rectangle,
    },
    text::{
        Alignment,
        Text,
    },
};
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Async,
    dma::{
        DmaRxBuf,
        DmaTxBuf,
    },
    dma_buffers,
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    spi::master::Spi,
    time::Rate,
};

use crate::{
    BacklightResources,
    DisplayResources,
    readout::Readout,
};

type SpiInterface<'a> = mipidsi::interface::SpiInterface<
    'a,
    ExclusiveDevice<esp_hal::spi::master::SpiDmaBus<'a, Async>, Output<'a>, esp_hal::delay::Delay>,
    Output<'a>,
>;

pub type Display<'a> = mipidsi::Display<SpiInterface<'a>, mipidsi::models::ST7789, Output<'a>>;

impl<'a> From<DisplayResources<'a>> for Display<'a> {
    fn from(res: DisplayResources<'a>) -> Self {
        let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(4096);
        let dma_rx_buf = DmaRxBuf::new(rx_descriptors, rx_buffer).unwrap();
        let dma_tx_buf = DmaTxBuf::new(tx_descriptors, tx_buffer).unwrap();

        let mut delay = esp_hal::delay::Delay::new();

        let dc = Output::new(res.dc, Level::Low, OutputConfig::default());
        let mut rst = Output::new(res.rst, Level::Low, OutputConfig::default());
        rst.set_high();

        let spi = Spi::new(
            res.spi,
            esp_hal::spi::master::Config::default().with_frequency(Rate::from_mhz(80)),
        )
        .unwrap()
        .with_sck(res.sck)
        .with_mosi(res.mosi)
        .with_miso(res.miso)
        .with_dma(res.dma)
        .with_buffers(dma_rx_buf, dma_tx_buf)
        .into_async();

        let cs = Output::new(res.cs, Level::High, OutputConfig::default());
        let spi_device = ExclusiveDevice::new(spi, cs, delay).unwrap();

        // Digits only: a small pixel buffer is plenty.
        let buffer = crate::mk_static!([u8; 4096], [0_u8; 4096]);
        let di = mipidsi::interface::SpiInterface::new(spi_device, dc, buffer);

        mipidsi::Builder::new(mipidsi::models::ST7789, di)
            .reset_pin(rst)
            .display_size(170, 320)
            .invert_colors(mipidsi::options::ColorInversion::Inverted)
            .orientation(
                mipidsi::options::Orientation::new().rotate(mipidsi::options::Rotation::Deg90),
            )
            .display_offset(35, 0)
            .init(&mut delay)
            .unwrap()
    }
}

// ── Readout panel ───────────────────────────────────────────────────────────

const CENTER: Point = Point::new(160, 92);
/// Cleared before each redraw; two FONT_10X20 glyphs with margin.
const DIGITS_AREA: Rectangle = Rectangle::new(Point::new(140, 70), Size::new(40, 30));

pub struct Panel {
    display: Display<'static>,
    backlight: Output<'static>,
    shown: Option<u8>,
}

impl Panel {
    pub fn new(mut display: Display<'static>, backlight: BacklightResources<'static>) -> Self {
        display.clear(Rgb565::BLACK).ok();
        Self {
            display,
            backlight: Output::new(backlight.led, Level::High, OutputConfig::default()),
            shown: None,
        }
    }

    /// Redraw the digits if they changed; the backlight follows `visible`.
    pub fn show(&mut self, readout: Readout) {
        self.backlight.set_level(if readout.visible {
            Level::High
        } else {
            Level::Low
        });

        if self.shown == Some(readout.value) {
            return;
        }
        self.shown = Some(readout.value);

        let (tens, ones) = readout.digits();
        let digits = [b'0' + tens, b'0' + ones];
        let Ok(text) = core::str::from_utf8(&digits) else {
            return;
        };

        DIGITS_AREA
            .into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
            .draw(&mut self.display)
            .ok();
        let style = MonoTextStyle::new(&FONT_10X20, Rgb565::CSS_ORANGE);
        Text::with_alignment(text, CENTER, style, Alignment::Center)
            .draw(&mut self.display)
            .ok();
    }
}
