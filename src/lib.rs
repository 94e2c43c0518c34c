//! Driver for the 8x8 RGB LED matrix based on 74HC595 shift registers.
//!
//! Frames are three 8x8 on/off grids (red, green, blue). The matrix shows one
//! column at a time, so [`MatrixDriver::draw`] streams a four byte packet per
//! column over SPI and repeats the sweep fast enough for the eye to see a
//! still image.

pub mod bits;
pub mod bus;
pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod frame;
pub mod image_frames;
pub mod pattern;
pub mod render;

pub use bus::{Bus, BusGuard, RecordingBus};
#[cfg(feature = "spidev")]
pub use bus::SpidevBus;
pub use codec::{decode_packet, encode_column, Cell, DecodedFrame, Packet};
pub use config::Config;
pub use driver::{DrawStats, MatrixDriver};
pub use error::{Error, Result};
pub use frame::{Channel, Frame, FrameBuffer, Grid, PixelState};
