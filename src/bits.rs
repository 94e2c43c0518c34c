//! Bit level helpers shared by the encoder and the decoder.
//!
//! The shift registers drive the LEDs active-low, so a lit pixel is a
//! *cleared* bit and an unlit pixel is a *set* bit.

use crate::error::{Error, Result};
use crate::frame::{PixelState, Row};

/// Number of bits in one wire byte, and number of pixels in one grid row.
pub const BITS: usize = 8;

fn check_index(index: usize) -> Result<()> {
    if index < BITS {
        Ok(())
    } else {
        Err(Error::BitIndexOutOfRange(index))
    }
}

fn check_len(len: usize) -> Result<()> {
    if len == BITS {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            expected: BITS,
            actual: len,
        })
    }
}

/// Set the bit at `index` (LSB = 0) to one.
pub fn set_bit(index: usize, value: u8) -> Result<u8> {
    check_index(index)?;
    Ok(value | (1 << index))
}

/// Set the bit at `index` (LSB = 0) to zero.
pub fn clear_bit(index: usize, value: u8) -> Result<u8> {
    check_index(index)?;
    Ok(value & !(1 << index))
}

/// Test the bit at `index` (LSB = 0).
pub fn get_bit(index: usize, value: u8) -> Result<bool> {
    check_index(index)?;
    Ok(value & (1 << index) != 0)
}

/// Pack eight pixel states into a wire byte.
///
/// Starts from `0xFF` and clears the bit of every lit pixel.
pub fn bits_to_byte(flags: &[PixelState]) -> Result<u8> {
    check_len(flags.len())?;
    flags
        .iter()
        .enumerate()
        .filter(|(_, state)| state.is_lit())
        .try_fold(0xFF, |value, (index, _)| clear_bit(index, value))
}

/// Unpack a wire byte into eight pixel states, bit 0 first.
pub fn byte_to_bits(byte: u8) -> Row {
    std::array::from_fn(|index| {
        if byte & (1 << index) == 0 {
            PixelState::Lit
        } else {
            PixelState::Unlit
        }
    })
}

/// Convert a row of plain flags (`true` = lit) into pixel states.
pub fn flags_to_pixels(flags: &[bool]) -> Result<Row> {
    check_len(flags.len())?;
    Ok(std::array::from_fn(|index| PixelState::from(flags[index])))
}
