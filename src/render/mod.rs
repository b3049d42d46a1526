//! Depth-specialised pixel compositing.
//!
//! A [`Compositor`] is picked once from the display's pixel depth and then
//! blends [`IconRaster`]s into [`PixelSurface`]s laid out the way the display
//! expects them. Every depth shares the same arithmetic; only the pixel
//! packing differs.

mod depth16;
mod depth24;
mod depth32;
mod mark;

pub use mark::{Mark, MarkType};

use depth16::Depth16;
use depth24::Depth24;
use depth32::Depth32;
use mark::mark_origin;

use crate::error::{DockError, Result};
use crate::raster::IconRaster;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    Bits16,
    Bits24,
    Bits32,
}

impl ColorDepth {
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            16 => Ok(ColorDepth::Bits16),
            24 => Ok(ColorDepth::Bits24),
            32 => Ok(ColorDepth::Bits32),
            bits => Err(DockError::UnsupportedFormat { bits }),
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            ColorDepth::Bits16 => 16,
            ColorDepth::Bits24 => 24,
            ColorDepth::Bits32 => 32,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        self.bits() as usize / 8
    }
}

/// Pixel buffer in the display's native layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    width: usize,
    height: usize,
    depth: ColorDepth,
    stride: usize,
    padding: usize,
    data: Vec<u8>,
}

impl PixelSurface {
    /// Allocate a zeroed surface. Rows are padded to a multiple of 4 bytes.
    pub fn new(depth: ColorDepth, width: usize, height: usize) -> Result<Self> {
        let failure = || DockError::SurfaceCreationFailure { width, height };
        let bytes_per_line = width
            .checked_mul(depth.bytes_per_pixel())
            .ok_or_else(failure)?;
        let stride = bytes_per_line.checked_add(3).ok_or_else(failure)? & !3;
        let size = stride.checked_mul(height).ok_or_else(failure)?;

        let mut data = Vec::new();
        data.try_reserve_exact(size).map_err(|_| failure())?;
        data.resize(size, 0);

        Ok(Self {
            width,
            height,
            depth,
            stride,
            padding: stride - bytes_per_line,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Copy pixels from a surface of identical geometry.
    pub fn copy_from(&mut self, other: &PixelSurface) {
        if self.data.len() == other.data.len() {
            self.data.copy_from_slice(&other.data);
        }
    }

    /// Colour at `(x, y)` as the display would show it, in `r, g, b` order.
    pub fn rgb_at(&self, x: usize, y: usize) -> [u8; 3] {
        let bpp = self.depth.bytes_per_pixel();
        let start = y * self.stride + x * bpp;
        let px = &self.data[start..start + bpp];
        let [r, g, b] = match self.depth {
            ColorDepth::Bits16 => Depth16::read(px),
            ColorDepth::Bits24 => Depth24::read(px),
            ColorDepth::Bits32 => Depth32::read(px),
        };
        [r as u8, g as u8, b as u8]
    }

    // Pixel bytes of one row, padding excluded.
    fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        let len = self.width * self.depth.bytes_per_pixel();
        &mut self.data[start..start + len]
    }
}

/// Packing rules of one pixel depth.
pub(crate) trait PixelFormat {
    const BYTES: usize;

    /// Channels as `r, g, b`, already truncated to the stored precision.
    fn read(px: &[u8]) -> [i32; 3];

    fn write(px: &mut [u8], rgb: [i32; 3]);

    fn write_opaque(px: &mut [u8], src: &[u8]) {
        Self::write(px, [src[0] as i32, src[1] as i32, src[2] as i32]);
    }

    /// Flip every colour bit of the pixel.
    fn invert(px: &mut [u8]);
}

/// Compositing strategy for the display's pixel depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compositor {
    Depth16,
    Depth24,
    Depth32,
}

impl Compositor {
    pub fn for_depth(depth: ColorDepth) -> Self {
        match depth {
            ColorDepth::Bits16 => Compositor::Depth16,
            ColorDepth::Bits24 => Compositor::Depth24,
            ColorDepth::Bits32 => Compositor::Depth32,
        }
    }

    pub fn from_bits(bits: u32) -> Result<Self> {
        ColorDepth::from_bits(bits).map(Self::for_depth)
    }

    pub fn depth(self) -> ColorDepth {
        match self {
            Compositor::Depth16 => ColorDepth::Bits16,
            Compositor::Depth24 => ColorDepth::Bits24,
            Compositor::Depth32 => ColorDepth::Bits32,
        }
    }

    /// Blend `src` onto `dest` honouring per-pixel alpha.
    pub fn opaque(self, dest: &mut PixelSurface, src: &IconRaster) {
        if !self.accepts(dest) {
            return;
        }
        match self {
            Compositor::Depth16 => opaque_with::<Depth16>(dest, src),
            Compositor::Depth24 => opaque_with::<Depth24>(dest, src),
            Compositor::Depth32 => opaque_with::<Depth32>(dest, src),
        }
    }

    /// Blend a grey version of `src` onto `dest`, weakened by `transparency`
    /// (0 draws nothing, 255 is as strong as the source alpha allows).
    pub fn ghosted(self, dest: &mut PixelSurface, src: &IconRaster, transparency: u8) {
        if !self.accepts(dest) {
            return;
        }
        match self {
            Compositor::Depth16 => ghosted_with::<Depth16>(dest, src, transparency),
            Compositor::Depth24 => ghosted_with::<Depth24>(dest, src, transparency),
            Compositor::Depth32 => ghosted_with::<Depth32>(dest, src, transparency),
        }
    }

    /// XOR a mark stencil onto `dest`. Applying the same mark twice restores
    /// the original pixels.
    pub fn active_mark(self, dest: &mut PixelSurface, kind: MarkType, left: i32, top: i32) {
        if !self.accepts(dest) {
            return;
        }
        match self {
            Compositor::Depth16 => mark_with::<Depth16>(dest, kind, left, top),
            Compositor::Depth24 => mark_with::<Depth24>(dest, kind, left, top),
            Compositor::Depth32 => mark_with::<Depth32>(dest, kind, left, top),
        }
    }

    fn accepts(self, dest: &PixelSurface) -> bool {
        if dest.depth != self.depth() {
            tracing::warn!(
                surface = dest.depth.bits(),
                compositor = self.depth().bits(),
                "surface depth does not match compositor"
            );
            return false;
        }
        true
    }
}

// Moves `dest` towards `src` by `1 / modulus` of the distance, truncating
// toward zero.
fn blend_channel(dest: i32, src: i32, modulus: f64) -> i32 {
    dest + ((src - dest) as f64 / modulus) as i32
}

fn opaque_with<F: PixelFormat>(dest: &mut PixelSurface, src: &IconRaster) {
    let width = dest.width.min(src.width());
    let height = dest.height.min(src.height());

    for y in 0..height {
        let row = dest.row_mut(y);
        for (px, s) in row
            .chunks_exact_mut(F::BYTES)
            .zip(src.row(y).chunks_exact(4))
            .take(width)
        {
            match s[3] {
                0 => {}
                255 => F::write_opaque(px, s),
                alpha => {
                    let modulus = 255.0 / alpha as f64;
                    let [r, g, b] = F::read(px);
                    F::write(
                        px,
                        [
                            blend_channel(r, s[0] as i32, modulus),
                            blend_channel(g, s[1] as i32, modulus),
                            blend_channel(b, s[2] as i32, modulus),
                        ],
                    );
                }
            }
        }
    }
}

fn ghosted_with<F: PixelFormat>(dest: &mut PixelSurface, src: &IconRaster, transparency: u8) {
    let width = dest.width.min(src.width());
    let height = dest.height.min(src.height());
    // Infinite for a transparency of zero, which turns every blend into a no-op.
    let alpha_max = 255.0 * (255.0 / transparency as f64);

    for y in 0..height {
        let row = dest.row_mut(y);
        for (px, s) in row
            .chunks_exact_mut(F::BYTES)
            .zip(src.row(y).chunks_exact(4))
            .take(width)
        {
            if s[3] == 0 {
                continue;
            }
            let grey = (s[0] as i32 + s[1] as i32 + s[2] as i32) / 3;
            let modulus = alpha_max / s[3] as f64;
            let [r, g, b] = F::read(px);
            F::write(
                px,
                [
                    blend_channel(r, grey, modulus),
                    blend_channel(g, grey, modulus),
                    blend_channel(b, grey, modulus),
                ],
            );
        }
    }
}

fn mark_with<F: PixelFormat>(dest: &mut PixelSurface, kind: MarkType, left: i32, top: i32) {
    let mark = kind.mark();
    let x0 = mark_origin(left, dest.width, mark.width);
    let y0 = mark_origin(top, dest.height, mark.height);
    let (width, height) = (dest.width, dest.height);

    for (my, stencil) in mark.rows().enumerate() {
        let y = y0 + my;
        if y >= height {
            break;
        }
        let row = dest.row_mut(y);
        for (mx, &bit) in stencil.iter().enumerate() {
            let x = x0 + mx;
            if x >= width {
                break;
            }
            if bit != 0 {
                F::invert(&mut row[x * F::BYTES..(x + 1) * F::BYTES]);
            }
        }
    }
}
