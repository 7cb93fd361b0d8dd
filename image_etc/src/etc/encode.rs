// The per-block driver. Sub-encoders only estimate their own loss; every
// candidate is decoded with the production decoder and re-scored on the
// decoded pixels, so the emitted codeword is the lowest-loss candidate under
// the exact reconstruction the hardware will produce.
use crate::{AlphaModel, ImageFormat};

use super::{alpha, eac11, individual, planar, tee_aitch, WEIGHTS_I32};

pub(crate) struct BlockEncoder {
    pub(crate) pixels: [u8; 64],
    work: [u8; 64],
}

impl BlockEncoder {
    pub(crate) fn new() -> Self {
        BlockEncoder {
            pixels: [0; 64],
            work: [0; 64],
        }
    }

    /// Encode the color payload of the current block.
    pub(crate) fn encode_color(&mut self, format: ImageFormat) -> u64 {
        if format.alpha_model() == AlphaModel::OneBit {
            self.encode_color_rgba1()
        } else if format == ImageFormat::Etc1S {
            self.encode_color_etc1s()
        } else {
            self.encode_color_rgb(format.etc_version() == 2)
        }
    }

    /// Encode the EAC alpha payload of the current block.
    pub(crate) fn encode_alpha(&mut self) -> u64 {
        alpha::encode_alpha(&self.pixels)
    }

    /// Encode one 11-bit channel of the current block.
    pub(crate) fn encode_eac11(&mut self, channel_offset: usize, signed: bool) -> u64 {
        eac11::encode_eac11(&self.pixels, channel_offset, signed)
    }

    fn encode_color_rgb(&mut self, etc2: bool) -> u64 {
        let mut best_code = individual::encode_rgb(&self.pixels, individual::reduce_average);
        let mut best_loss = self.color_loss(best_code, false, false);

        let code = individual::encode_rgb(&self.pixels, individual::reduce_quantize);
        let loss = self.color_loss(code, false, false);
        if best_loss > loss {
            best_code = code;
            best_loss = loss;
        }

        if !etc2 {
            return best_code;
        }

        let code = planar::encode_planar(&self.pixels);
        let loss = self.color_loss(code, false, false);
        if best_loss > loss {
            best_code = code;
            best_loss = loss;
        }

        let t_code = tee_aitch::encode_t(&self.pixels, 0.5, false);
        let t_loss = self.color_loss(t_code, false, false);
        if best_loss > t_loss {
            best_code = t_code;
            best_loss = t_loss;
        }

        let h_code = tee_aitch::encode_h(&self.pixels, 0.5, false);
        let h_loss = self.color_loss(h_code, false, false);
        if best_loss > h_loss {
            best_code = h_code;
            best_loss = h_loss;
        }

        // Re-run whichever clustered mode fit this block better with the
        // other two intensity weightings.
        for intensity in [0.0, 1.0] {
            let code = if t_loss <= h_loss {
                tee_aitch::encode_t(&self.pixels, intensity, false)
            } else {
                tee_aitch::encode_h(&self.pixels, intensity, false)
            };
            let loss = self.color_loss(code, false, false);
            if best_loss > loss {
                best_code = code;
                best_loss = loss;
            }
        }

        best_code
    }

    fn encode_color_etc1s(&mut self) -> u64 {
        let mut best_code = individual::encode_etc1s(&self.pixels, individual::reduce_average);
        let mut best_loss = self.color_loss(best_code, false, false);

        let code = individual::encode_etc1s(&self.pixels, individual::reduce_quantize);
        let loss = self.color_loss(code, false, false);
        if best_loss > loss {
            best_code = code;
        }
        best_code
    }

    fn encode_color_rgba1(&mut self) -> u64 {
        let has_transparent = (0..16).any(|i| self.pixels[4 * i + 3] < 0x80);

        let mut best_code = 0u64;
        let mut best_loss = i32::MAX;
        let mut consider = |encoder: &mut Self, code: u64| {
            let loss = encoder.color_loss(code, true, true);
            if best_loss > loss {
                best_code = code;
                best_loss = loss;
            }
        };

        // Candidates with the opaque bit clear can represent the transparent
        // pixels; a fully opaque block may also use the unrestricted tables.
        let mut opacities = vec![false];
        if !has_transparent {
            opacities.push(true);
        }
        for opaque in opacities {
            let code = individual::encode_rgb_forced_differential(
                &self.pixels,
                individual::reduce_average,
                opaque,
            );
            consider(&mut *self, code);

            let code = individual::encode_rgb_forced_differential(
                &self.pixels,
                individual::reduce_quantize,
                opaque,
            );
            consider(&mut *self, code);

            let code = tee_aitch::encode_t(&self.pixels, 0.5, !opaque);
            consider(&mut *self, code);

            let code = tee_aitch::encode_h(&self.pixels, 0.5, !opaque);
            consider(&mut *self, code);
        }

        best_code
    }

    fn color_loss(&mut self, code: u64, punchthrough: bool, one_bit_alpha: bool) -> i32 {
        etcdec_rs::color_block(code, &mut self.work, punchthrough);
        self.block_loss(one_bit_alpha)
    }

    fn block_loss(&self, one_bit_alpha: bool) -> i32 {
        let mut loss = 0i32;
        for x in 0..4 {
            for y in 0..4 {
                let i = 16 * y + 4 * x;
                if one_bit_alpha && self.pixels[i + 3] < 0x80 {
                    continue;
                }
                let d0 = self.pixels[i] as i32 - self.work[i] as i32;
                let d1 = self.pixels[i + 1] as i32 - self.work[i + 1] as i32;
                let d2 = self.pixels[i + 2] as i32 - self.work[i + 2] as i32;
                loss += WEIGHTS_I32[0] * d0 * d0
                    + WEIGHTS_I32[1] * d1 * d1
                    + WEIGHTS_I32[2] * d2 * d2;
            }
        }
        loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loss_for(encoder: &mut BlockEncoder, code: u64, punchthrough: bool) -> i32 {
        encoder.color_loss(code, punchthrough, punchthrough)
    }

    #[test]
    fn driver_picks_planar_for_gradients() {
        // A smooth two-axis gradient is exactly planar-representable, so the
        // driver must tag the block planar: diff set and the blue channel
        // addition overflowing while red and green stay in range.
        let mut encoder = BlockEncoder::new();
        for y in 0..4i32 {
            for x in 0..4i32 {
                let v = ((x * (60 - 8) + y * (32 - 8) + 4 * 8 + 2) >> 2) as u8;
                let i = (16 * y + 4 * x) as usize;
                encoder.pixels[i] = v;
                encoder.pixels[i + 1] = v;
                encoder.pixels[i + 2] = v;
                encoder.pixels[i + 3] = 0xFF;
            }
        }
        let code = encoder.encode_color(ImageFormat::Etc2Rgb);
        assert_eq!(0, loss_for(&mut encoder, code, false));

        let sign3 = |v: u64| -> i64 {
            if v >= 4 {
                v as i64 - 8
            } else {
                v as i64
            }
        };
        assert_eq!(1, (code >> 33) & 1);
        let r = ((code >> 59) & 31) as i64 + sign3((code >> 56) & 7);
        let g = ((code >> 51) & 31) as i64 + sign3((code >> 48) & 7);
        let b = ((code >> 43) & 31) as i64 + sign3((code >> 40) & 7);
        assert!((0..=31).contains(&r));
        assert!((0..=31).contains(&g));
        assert!(!(0..=31).contains(&b));
    }

    #[test]
    fn etc1_never_sets_etc2_modes() {
        let mut encoder = BlockEncoder::new();
        for i in 0..16 {
            encoder.pixels[4 * i] = (i * 16) as u8;
            encoder.pixels[4 * i + 1] = 255 - (i * 16) as u8;
            encoder.pixels[4 * i + 2] = 7;
            encoder.pixels[4 * i + 3] = 255;
        }
        let code = encoder.encode_color(ImageFormat::Etc1);
        if (code >> 33) & 1 == 1 {
            // Differential codewords must not overflow into T/H/planar.
            let sign3 = |v: u64| -> i64 {
                if v >= 4 {
                    v as i64 - 8
                } else {
                    v as i64
                }
            };
            for (field, delta) in [(59, 56), (51, 48), (43, 40)] {
                let sum = ((code >> field) & 31) as i64 + sign3((code >> delta) & 7);
                assert!((0..=31).contains(&sum));
            }
        }
    }

    #[test]
    fn transparent_block_decodes_transparent() {
        // All pixels (0, 0, 0, 0): every index is the reserved transparent
        // index and the decoded block is fully transparent black.
        let mut encoder = BlockEncoder::new();
        let code = encoder.encode_color(ImageFormat::Etc2Rgba1);
        assert_eq!(0, (code >> 33) & 1);

        let mut decoded = [0u8; 64];
        etcdec_rs::color_block(code, &mut decoded, true);
        assert_eq!([0u8; 64], decoded);
    }

    #[test]
    fn opaque_rgba1_block_reconstructs_color() {
        let mut encoder = BlockEncoder::new();
        for i in 0..16 {
            encoder.pixels[4 * i] = 0x84;
            encoder.pixels[4 * i + 1] = 0x84;
            encoder.pixels[4 * i + 2] = 0x84;
            encoder.pixels[4 * i + 3] = 0xFF;
        }
        let code = encoder.encode_color(ImageFormat::Etc2Rgba1);
        assert_eq!(0, loss_for(&mut encoder, code, true));
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut encoder = BlockEncoder::new();
        for i in 0..16 {
            encoder.pixels[4 * i] = (40 + i * 3) as u8;
            encoder.pixels[4 * i + 1] = (200 - i * 5) as u8;
            encoder.pixels[4 * i + 2] = (i * i) as u8;
            encoder.pixels[4 * i + 3] = 255;
        }
        let first = encoder.encode_color(ImageFormat::Etc2Rgb);
        let second = encoder.encode_color(ImageFormat::Etc2Rgb);
        assert_eq!(first, second);
    }

    #[test]
    fn reencoding_a_decoded_block_cannot_lose() {
        // A block the search represents exactly is a fixed point: decoding
        // and re-encoding it reaches zero loss again.
        let mut encoder = BlockEncoder::new();
        for y in 0..4i32 {
            for x in 0..4i32 {
                let v = ((x * (60 - 8) + y * (32 - 8) + 4 * 8 + 2) >> 2) as u8;
                let i = (16 * y + 4 * x) as usize;
                encoder.pixels[i] = v;
                encoder.pixels[i + 1] = v;
                encoder.pixels[i + 2] = v;
                encoder.pixels[i + 3] = 0xFF;
            }
        }
        let first = encoder.encode_color(ImageFormat::Etc2Rgb);
        let first_loss = loss_for(&mut encoder, first, false);
        assert_eq!(0, first_loss);

        let mut decoded = [0u8; 64];
        etcdec_rs::color_block(first, &mut decoded, false);
        let mut second_encoder = BlockEncoder::new();
        second_encoder.pixels = decoded;
        let second = second_encoder.encode_color(ImageFormat::Etc2Rgb);
        let second_loss = loss_for(&mut second_encoder, second, false);
        assert!(second_loss <= first_loss);
    }
}
