//! Column packets as they travel over the SPI bus.
//!
//! Each packet is `[red, blue, green, column]`: the board wires the blue and
//! green shift registers in swapped order, so the logical channel order does
//! not match the byte order on the wire.

use std::fmt;

use crate::bits::{bits_to_byte, byte_to_bits, set_bit};
use crate::error::{Error, Result};
use crate::frame::{PixelState, SIZE};
use crate::render;

/// Number of bytes sent per column.
pub const PACKET_LEN: usize = 4;

/// Channel byte of a column with every pixel unlit.
pub const BLANK: u8 = 0xFF;

/// A single column packet in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Packet([u8; PACKET_LEN]);

impl Packet {
    pub const fn from_bytes(bytes: [u8; PACKET_LEN]) -> Self {
        Packet(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }

    pub fn red(&self) -> u8 {
        self.0[0]
    }

    pub fn blue(&self) -> u8 {
        self.0[1]
    }

    pub fn green(&self) -> u8 {
        self.0[2]
    }

    pub fn column(&self) -> u8 {
        self.0[3]
    }

    /// Index of the selected column, if exactly one column bit is set.
    pub fn active_column(&self) -> Option<usize> {
        let column = self.column();
        (column.count_ones() == 1).then(|| column.trailing_zeros() as usize)
    }

    /// True when no pixel of the column is lit in any channel.
    pub fn is_blank(&self) -> bool {
        self.red() == BLANK && self.green() == BLANK && self.blue() == BLANK
    }
}

impl From<[u8; PACKET_LEN]> for Packet {
    fn from(bytes: [u8; PACKET_LEN]) -> Self {
        Packet(bytes)
    }
}

impl TryFrom<&[u8]> for Packet {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; PACKET_LEN] = bytes.try_into().map_err(|_| Error::ShapeMismatch {
            expected: PACKET_LEN,
            actual: bytes.len(),
        })?;
        Ok(Packet(bytes))
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column={:08b} \t red={:08b} \t green={:08b} \t blue={:08b}",
            self.column(),
            self.red(),
            self.green(),
            self.blue()
        )
    }
}

/// Encode the rows of one column into a wire packet.
pub fn encode_column(
    red: &[PixelState],
    green: &[PixelState],
    blue: &[PixelState],
    column: usize,
) -> Result<Packet> {
    let red = bits_to_byte(red)?;
    let green = bits_to_byte(green)?;
    let blue = bits_to_byte(blue)?;
    let column = set_bit(column, 0)?;
    Ok(Packet([red, blue, green, column]))
}

/// Pixel state recovered from a captured packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Lit,
    Unlit,
    /// The packet does not say anything about this pixel.
    Unknown,
}

impl From<PixelState> for Cell {
    fn from(state: PixelState) -> Self {
        match state {
            PixelState::Lit => Cell::Lit,
            PixelState::Unlit => Cell::Unlit,
        }
    }
}

pub type DecodedGrid = [[Cell; SIZE]; SIZE];

/// Frame reconstructed from a single packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame {
    pub red: DecodedGrid,
    pub green: DecodedGrid,
    pub blue: DecodedGrid,
    /// Column the packet addressed, `None` if the column byte was ambiguous.
    pub column: Option<usize>,
}

impl DecodedFrame {
    fn unknown() -> Self {
        let grid = [[Cell::Unknown; SIZE]; SIZE];
        DecodedFrame {
            red: grid,
            green: grid,
            blue: grid,
            column: None,
        }
    }
}

impl fmt::Display for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::render_rgb(f, &self.red, &self.green, &self.blue)
    }
}

/// Rebuild the frame content carried by a packet.
///
/// Only the addressed column is known; every other pixel is [`Cell::Unknown`].
/// A column byte with zero or several bits set yields an all-unknown frame.
pub fn decode_packet(packet: &Packet) -> DecodedFrame {
    let mut decoded = DecodedFrame::unknown();
    let Some(column) = packet.active_column() else {
        return decoded;
    };

    decoded.red[column] = byte_to_bits(packet.red()).map(Cell::from);
    decoded.green[column] = byte_to_bits(packet.green()).map(Cell::from);
    decoded.blue[column] = byte_to_bits(packet.blue()).map(Cell::from);
    decoded.column = Some(column);
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelState::{Lit, Unlit};

    #[test]
    fn test_encode_single_red_pixel() {
        let mut red = [Unlit; SIZE];
        red[0] = Lit;
        let packet = encode_column(&red, &[Unlit; SIZE], &[Unlit; SIZE], 3).unwrap();

        assert_eq!(packet.red(), 0xFE);
        assert_eq!(packet.green(), 0xFF);
        assert_eq!(packet.blue(), 0xFF);
        assert_eq!(packet.column(), 0x08);
        assert_eq!(packet.as_bytes(), &[0xFE, 0xFF, 0xFF, 0x08]);
    }

    #[test]
    fn test_blue_and_green_are_swapped_on_wire() {
        let mut green = [Unlit; SIZE];
        green[1] = Lit;
        let mut blue = [Unlit; SIZE];
        blue[2] = Lit;
        let packet = encode_column(&[Unlit; SIZE], &green, &blue, 0).unwrap();
        assert_eq!(packet.as_bytes(), &[0xFF, 0xFB, 0xFD, 0x01]);
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        assert!(matches!(
            encode_column(&[Lit; SIZE], &[Lit; SIZE], &[Lit; SIZE], 8),
            Err(Error::BitIndexOutOfRange(8))
        ));
        assert!(matches!(
            encode_column(&[Lit; 3], &[Lit; SIZE], &[Lit; SIZE], 0),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_recovers_encoded_column() {
        let red = [Lit, Unlit, Lit, Unlit, Unlit, Unlit, Unlit, Lit];
        let green = [Unlit, Unlit, Unlit, Lit, Lit, Unlit, Unlit, Unlit];
        let blue = [Lit; SIZE];

        for column in 0..SIZE {
            let packet = encode_column(&red, &green, &blue, column).unwrap();
            let decoded = decode_packet(&packet);
            assert_eq!(decoded.column, Some(column));

            for index in 0..SIZE {
                if index == column {
                    assert_eq!(decoded.red[index], red.map(Cell::from));
                    assert_eq!(decoded.green[index], green.map(Cell::from));
                    assert_eq!(decoded.blue[index], blue.map(Cell::from));
                } else {
                    assert_eq!(decoded.red[index], [Cell::Unknown; SIZE]);
                    assert_eq!(decoded.green[index], [Cell::Unknown; SIZE]);
                    assert_eq!(decoded.blue[index], [Cell::Unknown; SIZE]);
                }
            }
        }
    }

    #[test]
    fn test_decode_ambiguous_column() {
        for column_byte in [0x00, 0x03, 0xFF] {
            let decoded = decode_packet(&Packet::from([0x00, 0x00, 0x00, column_byte]));
            assert_eq!(decoded.column, None);
            for grid in [decoded.red, decoded.green, decoded.blue] {
                assert!(grid.iter().flatten().all(|cell| *cell == Cell::Unknown));
            }
        }
    }

    #[test]
    fn test_active_column_and_blank() {
        assert_eq!(Packet::from([0, 0, 0, 0x80]).active_column(), Some(7));
        assert_eq!(Packet::from([0, 0, 0, 0x81]).active_column(), None);
        assert!(Packet::from([0xFF, 0xFF, 0xFF, 0x01]).is_blank());
        assert!(!Packet::from([0xFF, 0xFE, 0xFF, 0x01]).is_blank());
    }

    #[test]
    fn test_packet_from_slice() {
        let packet = Packet::try_from(&[1u8, 2, 3, 4][..]).unwrap();
        assert_eq!(packet.as_bytes(), &[1, 2, 3, 4]);
        assert!(matches!(
            Packet::try_from(&[1u8, 2, 3][..]),
            Err(Error::ShapeMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_packet_binary_dump() {
        let packet = Packet::from([0xFE, 0xFF, 0x0F, 0x08]);
        assert_eq!(
            packet.to_string(),
            "column=00001000 \t red=11111110 \t green=00001111 \t blue=11111111"
        );
    }
}
