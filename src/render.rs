//! ASCII rendering of the three channel grids side by side.

use std::fmt;

use crate::codec::Cell;
use crate::frame::{PixelState, SIZE};

const GAP: &str = "   ";
const BORDER: &str = "+--------+";

/// Single character used to print a pixel.
pub trait Glyph {
    fn glyph(&self) -> char;
}

impl Glyph for PixelState {
    fn glyph(&self) -> char {
        match self {
            PixelState::Lit => '#',
            PixelState::Unlit => '.',
        }
    }
}

impl Glyph for Cell {
    fn glyph(&self) -> char {
        match self {
            Cell::Lit => '#',
            Cell::Unlit => '.',
            Cell::Unknown => '?',
        }
    }
}

fn line<T: Glyph>(row: &[T; SIZE]) -> String {
    let mut out = String::with_capacity(SIZE + 2);
    out.push('|');
    out.extend(row.iter().map(Glyph::glyph));
    out.push('|');
    out
}

/// Render red, green and blue grids next to each other, last row on top.
pub fn render_rgb<W: fmt::Write, T: Glyph>(
    out: &mut W,
    red: &[[T; SIZE]; SIZE],
    green: &[[T; SIZE]; SIZE],
    blue: &[[T; SIZE]; SIZE],
) -> fmt::Result {
    let width = BORDER.len() + GAP.len();

    writeln!(out, "{:<width$}{:<width$}{}", " RED:", " GREEN:", " BLUE:")?;
    writeln!(out, "{BORDER}{GAP}{BORDER}{GAP}{BORDER}")?;
    for index in (0..SIZE).rev() {
        writeln!(
            out,
            "{}{GAP}{}{GAP}{}",
            line(&red[index]),
            line(&green[index]),
            line(&blue[index])
        )?;
    }
    writeln!(out, "{BORDER}{GAP}{BORDER}{GAP}{BORDER}")
}
