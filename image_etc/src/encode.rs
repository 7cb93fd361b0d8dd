use std::io::Write;

use crate::{
    etc::BlockEncoder,
    extract::{extract_block, PixelSource},
    EncodeError, ImageFormat, Surface, SurfaceRgba16, SurfaceRgba8,
};

// Encoded blocks are handed to the sink in chunks of roughly this size. The
// slack keeps a 16-byte block from straddling a flush boundary.
const ENCODE_BUFFER_SIZE: usize = 4096 - 64;

impl<T: AsRef<[u8]>> SurfaceRgba8<T> {
    /// Encode the surface to the given `format`.
    pub fn encode(&self, format: ImageFormat) -> Result<Surface<Vec<u8>>, EncodeError> {
        self.validate()?;
        encode_surface(self, format, self.width, self.height)
    }
}

impl<T: AsRef<[u16]>> SurfaceRgba16<T> {
    /// Encode the surface to the given `format`.
    ///
    /// This is the highest fidelity path for the 11-bit EAC formats, which
    /// consume the full 16-bit channel domain. Color formats use the high
    /// bytes of each channel.
    pub fn encode(&self, format: ImageFormat) -> Result<Surface<Vec<u8>>, EncodeError> {
        self.validate()?;
        encode_surface(self, format, self.width, self.height)
    }
}

fn encode_surface<S: PixelSource>(
    source: &S,
    format: ImageFormat,
    width: u32,
    height: u32,
) -> Result<Surface<Vec<u8>>, EncodeError> {
    let mut data = Vec::with_capacity(crate::encoded_size(width, height, format));
    encode_blocks(source, format, &mut data)?;
    Ok(Surface {
        width,
        height,
        image_format: format,
        data,
    })
}

/// Encode `source` to `format`, streaming the blocks into `writer`.
///
/// Blocks are emitted in raster order as big-endian 64-bit codewords with no
/// padding, buffered into roughly 4 KiB writes. A write error aborts the
/// encode and leaves the sink in an unspecified state.
pub fn encode_blocks<S: PixelSource, W: Write>(
    source: &S,
    format: ImageFormat,
    mut writer: W,
) -> Result<(), EncodeError> {
    let (width, height) = source.dimensions();
    crate::validate_dimensions(width, height)?;

    let mut encoder = BlockEncoder::new();
    let mut buf: Vec<u8> = Vec::with_capacity(ENCODE_BUFFER_SIZE + 16);

    for block_y in (0..height).step_by(4) {
        for block_x in (0..width).step_by(4) {
            extract_block(format, source, block_x, block_y, &mut encoder.pixels);

            match format {
                ImageFormat::Etc2Rgba8 | ImageFormat::Etc2Srgba8 => {
                    // The alpha codeword precedes the color codeword.
                    let alpha = encoder.encode_alpha();
                    buf.extend_from_slice(&alpha.to_be_bytes());
                    let color = encoder.encode_color(format);
                    buf.extend_from_slice(&color.to_be_bytes());
                }
                ImageFormat::EacR11Unorm | ImageFormat::EacR11Snorm => {
                    let code = encoder.encode_eac11(0, format.is_eac11_signed());
                    buf.extend_from_slice(&code.to_be_bytes());
                }
                ImageFormat::EacRg11Unorm | ImageFormat::EacRg11Snorm => {
                    // R precedes G.
                    let signed = format.is_eac11_signed();
                    let r = encoder.encode_eac11(0, signed);
                    buf.extend_from_slice(&r.to_be_bytes());
                    let g = encoder.encode_eac11(0x20, signed);
                    buf.extend_from_slice(&g.to_be_bytes());
                }
                _ => {
                    let code = encoder.encode_color(format);
                    buf.extend_from_slice(&code.to_be_bytes());
                }
            }

            if buf.len() >= ENCODE_BUFFER_SIZE {
                writer.write_all(&buf)?;
                buf.clear();
            }
        }
    }

    if !buf.is_empty() {
        writer.write_all(&buf)?;
    }
    Ok(())
}
