//! SPI bus transport used by the driver.

use std::io;
use std::ops::{Deref, DerefMut};

use tracing::debug;

mod recording;
#[cfg(feature = "spidev")]
mod spidev_bus;

pub use recording::RecordingBus;
#[cfg(feature = "spidev")]
pub use spidev_bus::SpidevBus;

/// Minimal set of bus operations the driver needs.
///
/// `close` must be safe to call on a bus that is not open.
pub trait Bus {
    fn open(&mut self, bus: u8, device: u8) -> io::Result<()>;
    fn set_max_speed_hz(&mut self, hz: u32) -> io::Result<()>;
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn close(&mut self);
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn open(&mut self, bus: u8, device: u8) -> io::Result<()> {
        (**self).open(bus, device)
    }

    fn set_max_speed_hz(&mut self, hz: u32) -> io::Result<()> {
        (**self).set_max_speed_hz(hz)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_bytes(bytes)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

impl<B: Bus + ?Sized> Bus for Box<B> {
    fn open(&mut self, bus: u8, device: u8) -> io::Result<()> {
        (**self).open(bus, device)
    }

    fn set_max_speed_hz(&mut self, hz: u32) -> io::Result<()> {
        (**self).set_max_speed_hz(hz)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_bytes(bytes)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// An open bus connection, closed again when the guard is dropped.
pub struct BusGuard<'a, B: Bus + ?Sized> {
    bus: &'a mut B,
}

impl<'a, B: Bus + ?Sized> BusGuard<'a, B> {
    /// Open the bus. The bus is closed even if opening fails.
    pub fn open(bus: &'a mut B, bus_id: u8, device_id: u8) -> io::Result<Self> {
        debug!(bus = bus_id, device = device_id, "opening SPI bus");
        if let Err(err) = bus.open(bus_id, device_id) {
            bus.close();
            return Err(err);
        }
        Ok(BusGuard { bus })
    }
}

impl<B: Bus + ?Sized> Deref for BusGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.bus
    }
}

impl<B: Bus + ?Sized> DerefMut for BusGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.bus
    }
}

impl<B: Bus + ?Sized> Drop for BusGuard<'_, B> {
    fn drop(&mut self) {
        debug!("closing SPI bus");
        self.bus.close();
    }
}
