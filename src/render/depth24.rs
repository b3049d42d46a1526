use super::PixelFormat;

/// Three bytes per pixel in blue, green, red order; rows carry padding up to
/// the next multiple of four bytes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Depth24;

impl PixelFormat for Depth24 {
    const BYTES: usize = 3;

    fn read(px: &[u8]) -> [i32; 3] {
        [px[2] as i32, px[1] as i32, px[0] as i32]
    }

    fn write(px: &mut [u8], [r, g, b]: [i32; 3]) {
        px[0] = b.clamp(0, 255) as u8;
        px[1] = g.clamp(0, 255) as u8;
        px[2] = r.clamp(0, 255) as u8;
    }

    fn invert(px: &mut [u8]) {
        for byte in px.iter_mut() {
            *byte ^= 0xFF;
        }
    }
}
