use std::thread;

use tracing::{debug, warn};

use crate::bus::{Bus, BusGuard};
use crate::codec::{decode_packet, encode_column};
use crate::config::Config;
use crate::error::Result;
use crate::frame::{Frame, FrameBuffer};

/// Counters of a single `draw` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub packets_sent: usize,
    pub columns_skipped: usize,
}

/// Driver for the 8x8 RGB LED matrix based on 74HC595 shift registers.
///
/// Only one column can be lit at a time, so `draw` multiplexes over the eight
/// columns, sending one `[red, blue, green, column]` packet per column and
/// waiting for the registers to settle before moving on.
pub struct MatrixDriver<B> {
    bus: B,
    config: Config,
    buffer: FrameBuffer,
}

impl<B: Bus> MatrixDriver<B> {
    /// Create a new driver. The frame buffer starts with every pixel lit.
    pub fn new(bus: B, config: Config) -> Self {
        MatrixDriver {
            bus,
            config,
            buffer: FrameBuffer::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Replace the frame shown by subsequent `draw` calls.
    pub fn set_frame(&mut self, frame: Frame) {
        self.buffer.set_frame(frame, self.config.mirror);
        if self.config.debug > 0 {
            println!("FRAME");
            print!("{}", self.buffer.frame());
        }
    }

    /// Draw the buffered frame `iterations` times.
    ///
    /// The bus is opened for the duration of the call and closed on every exit
    /// path. Transport errors abort the sweep and are returned as-is.
    pub fn draw(&mut self, iterations: u32) -> Result<DrawStats> {
        let debug_level = self.config.debug;
        let delay = self.config.column_delay();
        let frame = self.buffer.frame();

        let mut bus = BusGuard::open(&mut self.bus, self.config.bus, self.config.device)
            .inspect_err(|err| warn!(%err, "failed to open SPI bus"))?;

        if let Some(hz) = self.config.max_speed_hz.filter(|hz| *hz > 0) {
            bus.set_max_speed_hz(hz)?;
        }

        let mut stats = DrawStats::default();
        for _ in 0..iterations {
            let rows = frame
                .red
                .rows()
                .iter()
                .zip(frame.green.rows())
                .zip(frame.blue.rows());

            for (column, ((red, green), blue)) in rows.enumerate() {
                let packet = encode_column(red, green, blue, column)?;
                // A column with nothing lit, or a select byte that does not
                // address exactly this column, is never sent.
                if packet.is_blank() || packet.active_column() != Some(column) {
                    stats.columns_skipped += 1;
                    continue;
                }

                bus.write_bytes(packet.as_bytes())
                    .inspect_err(|err| warn!(%err, column, "SPI write failed"))?;
                stats.packets_sent += 1;

                if debug_level > 1 {
                    println!("COLUMN");
                    println!("{packet}");
                    print!("{}", decode_packet(&packet));
                }
                thread::sleep(delay);
            }
        }

        debug!(
            iterations,
            sent = stats.packets_sent,
            skipped = stats.columns_skipped,
            "frame drawn"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::RecordingBus;
    use crate::codec::Packet;
    use crate::error::Error;
    use crate::frame::{Grid, PixelState::Lit, SIZE};
    use std::time::Instant;

    fn test_config() -> Config {
        Config {
            column_delay_us: 0,
            mirror: false,
            ..Config::default()
        }
    }

    fn two_column_frame() -> Frame {
        let mut red = Grid::unlit();
        red.set(1, 1, Lit).unwrap();
        red.set(4, 1, Lit).unwrap();
        Frame::new(red, Grid::unlit(), Grid::unlit())
    }

    fn driver(bus: RecordingBus) -> MatrixDriver<RecordingBus> {
        MatrixDriver::new(bus, test_config())
    }

    #[test]
    fn test_default_frame_sends_every_column() {
        let mut driver = driver(RecordingBus::new());
        let stats = driver.draw(1).unwrap();

        assert_eq!(stats.packets_sent, SIZE);
        assert_eq!(stats.columns_skipped, 0);
        let packets = driver.bus().packets();
        for (column, packet) in packets.iter().enumerate() {
            assert_eq!(packet.as_bytes(), &[0x00, 0x00, 0x00, 1 << column]);
        }
    }

    #[test]
    fn test_blank_columns_are_skipped() {
        let mut red = Grid::unlit();
        red.set(3, 0, Lit).unwrap();
        let mut driver = driver(RecordingBus::new());
        driver.set_frame(Frame::new(red, Grid::unlit(), Grid::unlit()));

        let stats = driver.draw(2).unwrap();
        assert_eq!(stats.packets_sent, 2);
        assert_eq!(stats.columns_skipped, 2 * (SIZE - 1));
        assert_eq!(
            driver.bus().packets(),
            vec![Packet::from([0xFE, 0xFF, 0xFF, 0x08]); 2]
        );
    }

    #[test]
    fn test_unlit_frame_sends_nothing() {
        let mut driver = driver(RecordingBus::new());
        driver.set_frame(Frame::unlit());
        let stats = driver.draw(3).unwrap();
        assert_eq!(stats.packets_sent, 0);
        assert_eq!(driver.bus().write_count(), 0);
        assert_eq!(driver.bus().open_count(), 1);
        assert_eq!(driver.bus().close_count(), 1);
    }

    #[test]
    fn test_mirror_setting_applies_to_frames() {
        let mut red = Grid::unlit();
        red.set(0, 0, Lit).unwrap();
        let config = Config {
            mirror: true,
            ..test_config()
        };
        let mut driver = MatrixDriver::new(RecordingBus::new(), config);
        driver.set_frame(Frame::new(red, Grid::unlit(), Grid::unlit()));

        assert_eq!(driver.buffer().red().get(7, 0), Some(Lit));
        driver.draw(1).unwrap();
        assert_eq!(
            driver.bus().packets(),
            vec![Packet::from([0xFE, 0xFF, 0xFF, 0x80])]
        );
    }

    #[test]
    fn test_bus_reopened_per_draw() {
        let mut driver = driver(RecordingBus::new());
        driver.draw(1).unwrap();
        driver.draw(1).unwrap();
        let bus = driver.into_bus();
        assert_eq!(bus.open_count(), 2);
        assert_eq!(bus.close_count(), 2);
        assert!(!bus.is_open());
    }

    #[test]
    fn test_write_failure_closes_bus() {
        let mut driver = driver(RecordingBus::new().fail_after(3));
        let err = driver.draw(1).unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(driver.bus().write_count(), 3);
        assert_eq!(driver.bus().close_count(), 1);
        assert!(!driver.bus().is_open());
    }

    #[test]
    fn test_open_failure_is_reported() {
        let mut driver = driver(RecordingBus::new().fail_open());
        assert!(matches!(driver.draw(1), Err(Error::Transport(_))));
        assert_eq!(driver.bus().close_count(), 1);
    }

    #[test]
    fn test_max_speed_applied() {
        let config = Config {
            bus: 1,
            device: 2,
            max_speed_hz: Some(500_000),
            ..test_config()
        };
        let mut driver = MatrixDriver::new(RecordingBus::new(), config);
        driver.draw(0).unwrap();
        assert_eq!(driver.bus().max_speed_hz(), Some(500_000));
        assert_eq!(driver.bus().endpoint(), Some((1, 2)));
    }

    #[test]
    fn test_zero_max_speed_ignored() {
        let config = Config {
            max_speed_hz: Some(0),
            ..test_config()
        };
        let mut driver = MatrixDriver::new(RecordingBus::new(), config);
        driver.draw(1).unwrap();
        assert_eq!(driver.bus().max_speed_hz(), None);
    }

    #[test]
    fn test_sent_packets_decode_to_frame() {
        let mut frame = Frame::unlit();
        frame.green.set(2, 6, Lit).unwrap();
        frame.blue.set(5, 1, Lit).unwrap();
        let mut driver = driver(RecordingBus::new());
        driver.set_frame(frame);
        driver.draw(1).unwrap();

        let packets = driver.bus().packets();
        assert_eq!(packets.len(), 2);
        let green = crate::codec::decode_packet(&packets[0]);
        assert_eq!(green.column, Some(2));
        assert_eq!(green.green[2][6], crate::codec::Cell::Lit);
        let blue = crate::codec::decode_packet(&packets[1]);
        assert_eq!(blue.column, Some(5));
        assert_eq!(blue.blue[5][1], crate::codec::Cell::Lit);
    }

    #[test]
    fn test_delay_only_after_sent_columns() {
        let config = Config {
            column_delay_us: 2_000,
            ..test_config()
        };
        let delay = config.column_delay();
        let mut driver = MatrixDriver::new(RecordingBus::new(), config);
        driver.set_frame(two_column_frame());

        let started = Instant::now();
        let stats = driver.draw(5).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(stats.packets_sent, 10);
        assert_eq!(stats.columns_skipped, 30);
        let sent = stats.packets_sent as u32;
        let visited = (stats.packets_sent + stats.columns_skipped) as u32;
        assert!(elapsed >= delay * sent, "elapsed {elapsed:?}");
        assert!(elapsed < delay * visited, "elapsed {elapsed:?}");
    }

    #[test]
    fn test_verbose_debug_draw() {
        let config = Config {
            debug: 2,
            mirror: true,
            ..test_config()
        };
        let mut driver = MatrixDriver::new(RecordingBus::new(), config);
        driver.set_frame(two_column_frame());

        let stats = driver.draw(2).unwrap();
        assert_eq!(
            stats,
            DrawStats {
                packets_sent: 4,
                columns_skipped: 12,
            }
        );

        // Mirrored: rows 1 and 4 are sent as columns 6 and 3.
        let first = Packet::from([0xFD, 0xFF, 0xFF, 0x08]);
        let second = Packet::from([0xFD, 0xFF, 0xFF, 0x40]);
        assert_eq!(driver.bus().packets(), vec![first, second, first, second]);
        assert_eq!(driver.bus().close_count(), 1);
    }
}
