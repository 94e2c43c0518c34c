//! Test patterns for checking the wiring of a matrix.

use crate::error::Result;
use crate::frame::{Channel, Frame, PixelState, SIZE};

/// A frame with a single lit pixel in one channel.
pub fn single_pixel(channel: Channel, row: usize, col: usize) -> Result<Frame> {
    let mut frame = Frame::unlit();
    frame.grid_mut(channel).set(row, col, PixelState::Lit)?;
    Ok(frame)
}

/// Walk a single lit pixel over every position of one channel, row by row.
pub fn pixel_sweep(channel: Channel) -> impl Iterator<Item = Frame> {
    (0..SIZE).flat_map(move |row| {
        (0..SIZE).map(move |col| {
            let mut frame = Frame::unlit();
            frame.grid_mut(channel).rows_mut()[row][col] = PixelState::Lit;
            frame
        })
    })
}

/// Red sweep, then green, then blue.
pub fn full_sweep() -> impl Iterator<Item = (Channel, Frame)> {
    Channel::ALL
        .into_iter()
        .flat_map(|channel| pixel_sweep(channel).map(move |frame| (channel, frame)))
}
