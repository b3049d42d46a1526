use super::PixelFormat;

/// Four bytes per pixel (blue, green, red, alpha); rows are never padded.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Depth32;

impl PixelFormat for Depth32 {
    const BYTES: usize = 4;

    fn read(px: &[u8]) -> [i32; 3] {
        [px[2] as i32, px[1] as i32, px[0] as i32]
    }

    fn write(px: &mut [u8], [r, g, b]: [i32; 3]) {
        px[0] = b.clamp(0, 255) as u8;
        px[1] = g.clamp(0, 255) as u8;
        px[2] = r.clamp(0, 255) as u8;
    }

    // Fully opaque pixels go out as one ARGB word, alpha included.
    fn write_opaque(px: &mut [u8], src: &[u8]) {
        let word = u32::from_be_bytes([src[3], src[0], src[1], src[2]]);
        px.copy_from_slice(&word.to_le_bytes());
    }

    fn invert(px: &mut [u8]) {
        px[0] ^= 0xFF;
        px[1] ^= 0xFF;
        px[2] ^= 0xFF;
    }
}
