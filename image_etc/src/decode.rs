use crate::{padded_dimension, ImageFormat, Surface, SurfaceError, SurfaceRgba16, SurfaceRgba8};

impl<T: AsRef<[u8]>> Surface<T> {
    /// Decode every block to an RGBA8 surface.
    ///
    /// The decoded surface covers the full block grid, so its dimensions are
    /// the padded dimensions. Use [SurfaceRgba8::cropped] to trim back to the
    /// stored width and height. 11-bit data keeps only the high byte of each
    /// channel; use [Surface::decode_rgba16] for the full range.
    pub fn decode_rgba8(&self) -> Result<SurfaceRgba8<Vec<u8>>, SurfaceError> {
        self.validate()?;

        if self.image_format.is_eac11() {
            let rgba16 = self.decode_rgba16()?;
            return Ok(SurfaceRgba8 {
                width: rgba16.width,
                height: rgba16.height,
                data: rgba16.data.iter().map(|v| (v >> 8) as u8).collect(),
            });
        }

        let width = padded_dimension(self.width);
        let height = padded_dimension(self.height);
        let mut rgba = vec![0u8; width as usize * height as usize * 4];

        let decode_block: fn(&[u8], &mut [u8], usize) = match self.image_format {
            ImageFormat::Etc1 | ImageFormat::Etc1S => etcdec_rs::etc1_rgb,
            ImageFormat::Etc2Rgb | ImageFormat::Etc2Srgb => etcdec_rs::etc2_rgb,
            ImageFormat::Etc2Rgba1 | ImageFormat::Etc2Srgba1 => etcdec_rs::etc2_rgba1,
            ImageFormat::Etc2Rgba8 | ImageFormat::Etc2Srgba8 => etcdec_rs::etc2_rgba8,
            // Handled by the rgba16 path above.
            _ => unreachable!(),
        };

        let block_size = self.image_format.block_size_in_bytes();
        let data = self.data.as_ref();
        let mut offset = 0;
        for block_y in (0..height as usize).step_by(4) {
            for block_x in (0..width as usize).step_by(4) {
                let start = (block_y * width as usize + block_x) * 4;
                decode_block(
                    &data[offset..offset + block_size],
                    &mut rgba[start..],
                    width as usize * 4,
                );
                offset += block_size;
            }
        }

        Ok(SurfaceRgba8 {
            width,
            height,
            data: rgba,
        })
    }

    /// Decode every block to an RGBA16 surface.
    ///
    /// Color formats widen 8-bit channels by replication. Following the usual
    /// single- and two-channel conventions, R11 data is replicated to gray
    /// and RG11 data zeroes the blue channel; alpha is fully opaque. Signed
    /// 11-bit data is biased by 0x8000.
    pub fn decode_rgba16(&self) -> Result<SurfaceRgba16<Vec<u16>>, SurfaceError> {
        self.validate()?;

        if !self.image_format.is_eac11() {
            let rgba8 = self.decode_rgba8()?;
            return Ok(SurfaceRgba16 {
                width: rgba8.width,
                height: rgba8.height,
                data: rgba8.data.iter().map(|&v| v as u16 * 0x101).collect(),
            });
        }

        let width = padded_dimension(self.width) as usize;
        let height = padded_dimension(self.height) as usize;
        let mut rgba = vec![0u16; width * height * 4];

        let signed = self.image_format.is_eac11_signed();
        let two_channel = self.image_format.is_eac11_two_channel();
        let block_size = self.image_format.block_size_in_bytes();
        let data = self.data.as_ref();

        let mut offset = 0;
        for block_y in (0..height).step_by(4) {
            for block_x in (0..width).step_by(4) {
                let block = &data[offset..offset + block_size];
                let r = etcdec_rs::eac11_block(u64::from_be_bytes(block[0..8].try_into().unwrap()), signed);
                let g = two_channel.then(|| {
                    etcdec_rs::eac11_block(u64::from_be_bytes(block[8..16].try_into().unwrap()), signed)
                });

                for y in 0..4 {
                    for x in 0..4 {
                        let i = ((block_y + y) * width + block_x + x) * 4;
                        let value = r[4 * y + x];
                        match &g {
                            Some(g) => {
                                rgba[i] = value;
                                rgba[i + 1] = g[4 * y + x];
                                rgba[i + 2] = 0;
                            }
                            None => {
                                rgba[i] = value;
                                rgba[i + 1] = value;
                                rgba[i + 2] = value;
                            }
                        }
                        rgba[i + 3] = 0xFFFF;
                    }
                }
                offset += block_size;
            }
        }

        Ok(SurfaceRgba16 {
            width: width as u32,
            height: height as u32,
            data: rgba,
        })
    }
}
