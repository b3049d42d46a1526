use super::PixelFormat;

/// 5-6-5 packed pixels stored as little-endian words. Every channel keeps
/// only its top five bits, so the lowest green bit is always clear.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Depth16;

impl PixelFormat for Depth16 {
    const BYTES: usize = 2;

    fn read(px: &[u8]) -> [i32; 3] {
        let v = u16::from_le_bytes([px[0], px[1]]) as i32;
        [(v >> 8) & 0xF8, (v >> 3) & 0xF8, (v << 3) & 0xF8]
    }

    fn write(px: &mut [u8], [r, g, b]: [i32; 3]) {
        let [r, g, b] = [r.clamp(0, 255), g.clamp(0, 255), b.clamp(0, 255)];
        let v = ((r & 0xF8) << 8) | ((g & 0xF8) << 3) | ((b & 0xF8) >> 3);
        px.copy_from_slice(&(v as u16).to_le_bytes());
    }

    fn invert(px: &mut [u8]) {
        px[0] ^= 0xFF;
        px[1] ^= 0xFF;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_red_into_the_high_bits() {
        let mut px = [0u8; 2];
        Depth16::write(&mut px, [0xFF, 0, 0]);
        assert_eq!(u16::from_le_bytes(px), 0xF800);
        Depth16::write(&mut px, [0, 0xFF, 0]);
        assert_eq!(u16::from_le_bytes(px), 0x07C0);
        Depth16::write(&mut px, [0, 0, 0xFF]);
        assert_eq!(u16::from_le_bytes(px), 0x001F);
    }

    #[test]
    fn read_returns_masked_channels() {
        let mut px = [0u8; 2];
        Depth16::write(&mut px, [0x7F, 0x83, 0x0C]);
        assert_eq!(Depth16::read(&px), [0x78, 0x80, 0x08]);
    }
}
