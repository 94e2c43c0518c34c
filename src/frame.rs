use std::fmt;

use crate::error::{Error, Result};
use crate::render;

/// Width and height of the matrix.
pub const SIZE: usize = 8;

/// State of a single LED of one color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelState {
    Lit,
    Unlit,
}

impl PixelState {
    pub fn is_lit(self) -> bool {
        self == PixelState::Lit
    }
}

impl From<bool> for PixelState {
    fn from(lit: bool) -> Self {
        if lit {
            PixelState::Lit
        } else {
            PixelState::Unlit
        }
    }
}

/// One line of a grid: the eight pixels sent while a single column is selected.
pub type Row = [PixelState; SIZE];

/// Color channel of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }
}

/// 8x8 pixel states of a single color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    rows: [Row; SIZE],
}

impl Grid {
    pub const fn filled(state: PixelState) -> Self {
        Grid {
            rows: [[state; SIZE]; SIZE],
        }
    }

    pub const fn lit() -> Self {
        Self::filled(PixelState::Lit)
    }

    pub const fn unlit() -> Self {
        Self::filled(PixelState::Unlit)
    }

    pub const fn from_rows(rows: [Row; SIZE]) -> Self {
        Grid { rows }
    }

    /// Build a grid from plain flags, `true` meaning lit.
    pub fn from_flags(flags: [[bool; SIZE]; SIZE]) -> Self {
        Grid {
            rows: flags.map(|row| row.map(PixelState::from)),
        }
    }

    pub fn rows(&self) -> &[Row; SIZE] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row; SIZE] {
        &mut self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<PixelState> {
        self.rows.get(row)?.get(col).copied()
    }

    pub fn set(&mut self, row: usize, col: usize, state: PixelState) -> Result<()> {
        let pixel = self
            .rows
            .get_mut(row)
            .and_then(|line| line.get_mut(col))
            .ok_or(Error::PixelOutOfRange { row, col })?;
        *pixel = state;
        Ok(())
    }

    /// Returns a copy with the row order reversed (row `i` becomes row `7 - i`).
    pub fn mirrored(&self) -> Self {
        let mut rows = self.rows;
        rows.reverse();
        Grid { rows }
    }
}

/// A complete display image: one grid per color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub red: Grid,
    pub green: Grid,
    pub blue: Grid,
}

impl Frame {
    pub const fn new(red: Grid, green: Grid, blue: Grid) -> Self {
        Frame { red, green, blue }
    }

    pub const fn filled(state: PixelState) -> Self {
        let grid = Grid::filled(state);
        Frame::new(grid, grid, grid)
    }

    /// Every LED of every channel switched on.
    pub const fn lit() -> Self {
        Self::filled(PixelState::Lit)
    }

    /// Every LED switched off.
    pub const fn unlit() -> Self {
        Self::filled(PixelState::Unlit)
    }

    pub fn grid(&self, channel: Channel) -> &Grid {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    pub fn grid_mut(&mut self, channel: Channel) -> &mut Grid {
        match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
        }
    }

    pub fn mirrored(&self) -> Self {
        Frame::new(self.red.mirrored(), self.green.mirrored(), self.blue.mirrored())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::render_rgb(f, self.red.rows(), self.green.rows(), self.blue.rows())
    }
}

/// The frame currently shown by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    frame: Frame,
}

impl FrameBuffer {
    /// Creates a buffer with every pixel lit.
    pub fn new() -> Self {
        FrameBuffer {
            frame: Frame::lit(),
        }
    }

    /// Replace the buffered frame.
    ///
    /// With `mirror` set the row order of every grid is reversed first, which
    /// compensates for the orientation of the matrix on the board.
    pub fn set_frame(&mut self, frame: Frame, mirror: bool) {
        self.frame = if mirror { frame.mirrored() } else { frame };
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn red(&self) -> &Grid {
        &self.frame.red
    }

    pub fn green(&self) -> &Grid {
        &self.frame.green
    }

    pub fn blue(&self) -> &Grid {
        &self.frame.blue
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
