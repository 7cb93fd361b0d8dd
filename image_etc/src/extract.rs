use crate::{ImageFormat, SurfaceRgba16, SurfaceRgba8};

// ITU-R BT.709 constants for the gray conversion feeding the single-channel
// 11-bit formats, scaled by 1e6. These differ from the BT.601 weights used by
// the encoder's error metric on purpose: reference ETC encoders convert to
// gray with BT.709 (matching ImageMagick), and changing either set changes
// the output bit for bit.
const GRAY_R: u64 = 212_656;
const GRAY_G: u64 = 715_158;
const GRAY_B: u64 = 72_186;
const GRAY_SUM: u64 = 1_000_000;

/// A rectangular source of pixels for the encoder.
///
/// Implementations return straight (non-premultiplied) channels widened to
/// 16 bits. The encoder is generic over this trait, so sources monomorphize
/// instead of paying for dynamic dispatch per pixel.
pub trait PixelSource {
    /// Width and height in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// A single pixel as straight 16-bit RGBA.
    ///
    /// Only coordinates inside [PixelSource::dimensions] are requested.
    fn rgba16(&self, x: u32, y: u32) -> [u16; 4];
}

/// Adapts a source with premultiplied alpha by dividing channels through the
/// alpha before they reach the encoder.
pub struct Premultiplied<S>(pub S);

impl<S: PixelSource> PixelSource for Premultiplied<S> {
    fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    fn rgba16(&self, x: u32, y: u32) -> [u16; 4] {
        let [r, g, b, a] = self.0.rgba16(x, y);
        if a != 0x0000 && a != 0xFFFF {
            let unmultiply = |c: u16| ((c as u32 * 0xFFFF) / a as u32) as u16;
            [unmultiply(r), unmultiply(g), unmultiply(b), a]
        } else {
            [r, g, b, a]
        }
    }
}

impl<T: AsRef<[u8]>> PixelSource for SurfaceRgba8<T> {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn rgba16(&self, x: u32, y: u32) -> [u16; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.data.as_ref()[i..i + 4];
        // Widen 8-bit channels by replication so 0xFF maps to 0xFFFF.
        [
            p[0] as u16 * 0x101,
            p[1] as u16 * 0x101,
            p[2] as u16 * 0x101,
            p[3] as u16 * 0x101,
        ]
    }
}

impl<T: AsRef<[u16]>> PixelSource for SurfaceRgba16<T> {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn rgba16(&self, x: u32, y: u32) -> [u16; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.data.as_ref()[i..i + 4];
        [p[0], p[1], p[2], p[3]]
    }
}

/// Fill the encoder's 64-byte block buffer from the 4x4 neighborhood with the
/// given top-left corner.
///
/// Out-of-bound pixels right of and below the image are substituted with the
/// nearest in-bound pixel from the right and bottom edges. Color formats store
/// 4 bytes per pixel at `16*y + 4*x`. The 11-bit formats store big-endian
/// 16-bit values at `8*y + 2*x`, with the second channel offset by 0x20.
pub(crate) fn extract_block<S: PixelSource>(
    format: ImageFormat,
    source: &S,
    block_x: u32,
    block_y: u32,
    pixels: &mut [u8; 64],
) {
    let (width, height) = source.dimensions();
    let max_x = width - 1;
    let max_y = height - 1;

    for y in 0..4u32 {
        for x in 0..4u32 {
            let [r, g, b, a] =
                source.rgba16((block_x + x).min(max_x), (block_y + y).min(max_y));

            if format.is_eac11() {
                let i = (8 * y + 2 * x) as usize;
                if format.is_eac11_two_channel() {
                    pixels[i] = (r >> 8) as u8;
                    pixels[i + 1] = r as u8;
                    pixels[i + 0x20] = (g >> 8) as u8;
                    pixels[i + 0x21] = g as u8;
                } else {
                    let gray = ((GRAY_SUM / 2)
                        + (r as u64 * GRAY_R)
                        + (g as u64 * GRAY_G)
                        + (b as u64 * GRAY_B))
                        / GRAY_SUM;
                    pixels[i] = (gray >> 8) as u8;
                    pixels[i + 1] = gray as u8;
                }
            } else {
                let i = (16 * y + 4 * x) as usize;
                pixels[i] = (r >> 8) as u8;
                pixels[i + 1] = (g >> 8) as u8;
                pixels[i + 2] = (b >> 8) as u8;
                pixels[i + 3] = (a >> 8) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_rgba8() -> SurfaceRgba8<Vec<u8>> {
        let mut data = Vec::new();
        for y in 0..2u8 {
            for x in 0..2u8 {
                data.extend_from_slice(&[x * 100, y * 100, 7, 255]);
            }
        }
        SurfaceRgba8 {
            width: 2,
            height: 2,
            data,
        }
    }

    #[test]
    fn extract_replicates_edges() {
        // A 2x2 source extracted as a 4x4 block repeats the last row and column.
        let source = checker_rgba8();
        let mut pixels = [0u8; 64];
        extract_block(ImageFormat::Etc2Rgb, &source, 0, 0, &mut pixels);

        // Pixel (3, 3) clamps to source pixel (1, 1).
        let i = 16 * 3 + 4 * 3;
        assert_eq!(&pixels[i..i + 4], &[100, 100, 7, 255]);
        // Pixel (0, 3) clamps to source pixel (0, 1).
        let i = 16 * 3;
        assert_eq!(&pixels[i..i + 4], &[0, 100, 7, 255]);
    }

    #[test]
    fn extract_never_reads_out_of_bounds() {
        // A block fully outside the source clamps every sample to the corner.
        let source = checker_rgba8();
        let mut pixels = [0u8; 64];
        extract_block(ImageFormat::Etc2Rgb, &source, 4, 4, &mut pixels);
        for i in 0..16 {
            assert_eq!(&pixels[4 * i..4 * i + 4], &[100, 100, 7, 255]);
        }
    }

    #[test]
    fn extract_gray_uses_bt709() {
        let source = SurfaceRgba8 {
            width: 1,
            height: 1,
            data: vec![255u8, 0, 0, 255],
        };
        let mut pixels = [0u8; 64];
        extract_block(ImageFormat::EacR11Unorm, &source, 0, 0, &mut pixels);

        // Pure red maps through the BT.709 weight, not the BT.601 one.
        let expected = ((GRAY_SUM / 2) + 0xFFFF * GRAY_R) / GRAY_SUM;
        assert_eq!(pixels[0], (expected >> 8) as u8);
        assert_eq!(pixels[1], expected as u8);
    }

    #[test]
    fn extract_two_channel_layout() {
        let source = SurfaceRgba16 {
            width: 1,
            height: 1,
            data: vec![0x1234u16, 0xABCD, 0, 0xFFFF],
        };
        let mut pixels = [0u8; 64];
        extract_block(ImageFormat::EacRg11Unorm, &source, 0, 0, &mut pixels);
        assert_eq!(&pixels[0..2], &[0x12, 0x34]);
        assert_eq!(&pixels[0x20..0x22], &[0xAB, 0xCD]);
    }

    #[test]
    fn premultiplied_divides_by_alpha() {
        let source = Premultiplied(SurfaceRgba16 {
            width: 1,
            height: 1,
            data: vec![0x4000u16, 0x2000, 0, 0x8000],
        });
        let [r, g, b, a] = source.rgba16(0, 0);
        assert_eq!(r, (0x4000u32 * 0xFFFF / 0x8000) as u16);
        assert_eq!(g, (0x2000u32 * 0xFFFF / 0x8000) as u16);
        assert_eq!(b, 0);
        assert_eq!(a, 0x8000);
    }
}
