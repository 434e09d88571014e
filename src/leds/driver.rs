use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::SpidevBus;
use ws2812_spi::Ws2812;

use super::LedError;

/// WS2812 strip wired to the MOSI pin of a Linux spidev device.
pub type SpiStrip = Ws2812<SpidevBus>;

// ws2812-spi encodes each data bit as 4 SPI bits, which needs 2-3.8 MHz.
const SPI_SPEED_HZ: u32 = 3_000_000;

pub fn open_spi_strip(device: &str) -> Result<SpiStrip, LedError> {
    let mut spi = SpidevBus::open(device)
        .map_err(|e| LedError::Open { device: device.to_string(), message: format!("{e:?}") })?;

    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(SPI_SPEED_HZ)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options)
        .map_err(|e| LedError::Open { device: device.to_string(), message: e.to_string() })?;

    Ok(Ws2812::new(spi))
}
