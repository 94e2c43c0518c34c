//! Turning images into frames.
//!
//! A channel value above [`THRESHOLD`] lights the pixel in that channel.
//! Images wider than the matrix are scrolled through with a sliding window.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use displaydoc::Display;
use image::RgbImage;

use crate::frame::{Frame, PixelState, SIZE};

/// Channel values strictly above this light the pixel.
pub const THRESHOLD: u8 = 128;

#[derive(Debug, Display)]
pub enum ImageError {
    /// Failed to decode image: {0}
    Decode(image::ImageError),
    /// Unsupported image size {width}x{height}, expected a height of 8 and a width of at least 8.
    UnsupportedSize { width: u32, height: u32 },
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageError::Decode(err) => Some(err),
            ImageError::UnsupportedSize { .. } => None,
        }
    }
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        ImageError::Decode(err)
    }
}

/// Load an image file and cut it into frames.
pub fn load_frames(path: impl AsRef<Path>) -> Result<Vec<Frame>, ImageError> {
    let image = image::open(path)?.to_rgb8();
    frames_from_rgb(&image)
}

/// One frame per horizontal offset of an 8x8 window over the image.
pub fn frames_from_rgb(image: &RgbImage) -> Result<Vec<Frame>, ImageError> {
    let (width, height) = image.dimensions();
    let size = SIZE as u32;
    if height != size || width < size {
        return Err(ImageError::UnsupportedSize { width, height });
    }

    Ok((0..=width - size)
        .map(|offset| window(image, offset))
        .collect())
}

fn window(image: &RgbImage, offset: u32) -> Frame {
    let mut frame = Frame::unlit();
    for x in 0..SIZE {
        for y in 0..SIZE {
            let [r, g, b] = image.get_pixel(offset + x as u32, y as u32).0;
            // Pixel (x, y) of the window lands in row x of each grid.
            for (grid, value) in [(&mut frame.red, r), (&mut frame.green, g), (&mut frame.blue, b)] {
                if value > THRESHOLD {
                    grid.rows_mut()[x][y] = PixelState::Lit;
                }
            }
        }
    }
    frame
}

/// `.png` files of a directory, sorted by file name.
pub fn list_images(dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
