use std::io;

use tracing::trace;

use super::Bus;
use crate::codec::Packet;

/// In-memory bus that records everything written to it.
///
/// Used by `--dry-run` and by the driver tests. Failures can be injected for
/// the open call and for writes after a given number of successful ones.
#[derive(Debug)]
pub struct RecordingBus {
    writes: Vec<Vec<u8>>,
    keep_writes: bool,
    write_count: usize,
    open_count: usize,
    close_count: usize,
    is_open: bool,
    endpoint: Option<(u8, u8)>,
    max_speed_hz: Option<u32>,
    fail_open: bool,
    fail_after: Option<usize>,
}

impl RecordingBus {
    pub fn new() -> Self {
        RecordingBus {
            writes: Vec::new(),
            keep_writes: true,
            write_count: 0,
            open_count: 0,
            close_count: 0,
            is_open: false,
            endpoint: None,
            max_speed_hz: None,
            fail_open: false,
            fail_after: None,
        }
    }

    /// A bus that only counts writes instead of storing them.
    pub fn counting() -> Self {
        RecordingBus {
            keep_writes: false,
            ..Self::new()
        }
    }

    /// Make every `open` call fail.
    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Make writes fail once `writes` of them have succeeded.
    pub fn fail_after(mut self, writes: usize) -> Self {
        self.fail_after = Some(writes);
        self
    }

    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Recorded writes that are exactly one packet long.
    pub fn packets(&self) -> Vec<Packet> {
        self.writes
            .iter()
            .filter_map(|bytes| Packet::try_from(bytes.as_slice()).ok())
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.write_count
    }

    pub fn open_count(&self) -> usize {
        self.open_count
    }

    pub fn close_count(&self) -> usize {
        self.close_count
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn endpoint(&self) -> Option<(u8, u8)> {
        self.endpoint
    }

    pub fn max_speed_hz(&self) -> Option<u32> {
        self.max_speed_hz
    }
}

impl Default for RecordingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for RecordingBus {
    fn open(&mut self, bus: u8, device: u8) -> io::Result<()> {
        self.open_count += 1;
        if self.fail_open {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no SPI device {bus}.{device}"),
            ));
        }
        self.is_open = true;
        self.endpoint = Some((bus, device));
        Ok(())
    }

    fn set_max_speed_hz(&mut self, hz: u32) -> io::Result<()> {
        if !self.is_open {
            return Err(io::ErrorKind::NotConnected.into());
        }
        self.max_speed_hz = Some(hz);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        if !self.is_open {
            return Err(io::ErrorKind::NotConnected.into());
        }
        if self.fail_after.is_some_and(|limit| self.write_count >= limit) {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "injected write failure",
            ));
        }

        let hex: String = bytes
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ");
        trace!(bytes = %hex, "write");

        self.write_count += 1;
        if self.keep_writes {
            self.writes.push(bytes.to_vec());
        }
        Ok(())
    }

    fn close(&mut self) {
        self.close_count += 1;
        self.is_open = false;
    }
}
