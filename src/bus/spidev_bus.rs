use std::io::{self, Write};

use spidev::{Spidev, SpidevOptions};
use tracing::debug;

use super::Bus;

/// Linux `spidev` character device (`/dev/spidev<bus>.<device>`).
#[derive(Default)]
pub struct SpidevBus {
    spi: Option<Spidev>,
}

impl SpidevBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn connection(&mut self) -> io::Result<&mut Spidev> {
        self.spi
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "SPI bus is not open"))
    }
}

impl Bus for SpidevBus {
    fn open(&mut self, bus: u8, device: u8) -> io::Result<()> {
        let path = format!("/dev/spidev{bus}.{device}");
        let spi = Spidev::open(&path)?;
        debug!(%path, "opened spidev");
        self.spi = Some(spi);
        Ok(())
    }

    fn set_max_speed_hz(&mut self, hz: u32) -> io::Result<()> {
        let options = SpidevOptions::new().max_speed_hz(hz).build();
        self.connection()?.configure(&options)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.connection()?.write_all(bytes)
    }

    fn close(&mut self) {
        // Dropping the handle closes the file descriptor.
        self.spi = None;
    }
}
