use std::path::Path;

use crate::error::{DockError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Decoded icon image, four bytes per pixel in `r, g, b, a` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRaster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl IconRaster {
    pub fn filled(width: usize, height: usize, fill: Rgba) -> Result<Self> {
        let mut pixels = vec![0u8; byte_len(width, height)?];
        for chunk in pixels.chunks_exact_mut(4) {
            chunk[0] = fill.r;
            chunk[1] = fill.g;
            chunk[2] = fill.b;
            chunk[3] = fill.a;
        }
        Self::from_rgba(width, height, pixels)
    }

    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DockError::InvalidImage {
                path: Default::default(),
                reason: "image has no pixels".into(),
            });
        }
        let expected = byte_len(width, height)?;
        if pixels.len() != expected {
            return Err(DockError::InvalidImage {
                path: Default::default(),
                reason: format!(
                    "expected {expected} bytes for {width}x{height}, got {}",
                    pixels.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// One row of `width * 4` bytes.
    pub fn row(&self, y: usize) -> &[u8] {
        let len = self.width * 4;
        &self.pixels[y * len..(y + 1) * len]
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let idx = (y * self.width + x) * 4;
        Rgba {
            r: self.pixels[idx],
            g: self.pixels[idx + 1],
            b: self.pixels[idx + 2],
            a: self.pixels[idx + 3],
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        let idx = (y * self.width + x) * 4;
        self.pixels[idx] = color.r;
        self.pixels[idx + 1] = color.g;
        self.pixels[idx + 2] = color.b;
        self.pixels[idx + 3] = color.a;
    }
}

fn byte_len(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| DockError::InvalidImage {
            path: Default::default(),
            reason: format!("{width}x{height} is too large"),
        })
}

/// Decode an icon file into an RGBA raster.
///
/// Grayscale and palette images are expanded to RGBA by the decoder.
pub fn load_icon(path: &Path) -> Result<IconRaster> {
    let img = image::open(path).map_err(|e| DockError::InvalidImage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    IconRaster::from_rgba(width, height, rgba.into_raw()).map_err(|e| match e {
        DockError::InvalidImage { reason, .. } => DockError::InvalidImage {
            path: path.to_path_buf(),
            reason,
        },
        other => other,
    })
}
