// The T and H modes. Both pick two representative colors by clustering the
// block's pixels, quantize them to 4 bits and search the 8-entry distance
// table. They differ in the palette built from the pair and in which diff
// channel the packer forces to overflow so the decoder recognizes the mode.
use etcdec_rs::{paint_colors_h, paint_colors_t, DISTANCE_TABLE};

use super::{cluster, iround, pixel_loss};

pub(super) fn encode_t(pixels: &[u8; 64], intensity: f64, punchthrough: bool) -> u64 {
    let (points, opaque) = block_points(pixels, punchthrough);
    let centers = cluster::cluster2(&points, intensity);
    let quants = [quantize4(centers[0]), quantize4(centers[1])];

    let mut best = (i32::MAX, 0usize, 0u64, 0u32);
    for swap in 0..2usize {
        let paint = expand_rgb4(quants[swap]);
        let center = expand_rgb4(quants[1 - swap]);
        for which in 0..8usize {
            let colors = paint_colors_t(paint, center, DISTANCE_TABLE[which]);
            let (loss, indexes) = best_indexes(pixels, &colors, &opaque, punchthrough);
            if best.0 > loss {
                best = (loss, swap, which as u64, indexes);
            }
        }
    }

    let (_, swap, which, indexes) = best;
    pack_t(quants[swap], quants[1 - swap], which, indexes, !punchthrough)
}

pub(super) fn encode_h(pixels: &[u8; 64], intensity: f64, punchthrough: bool) -> u64 {
    let (points, opaque) = block_points(pixels, punchthrough);
    let centers = cluster::cluster2(&points, intensity);
    let quants = [quantize4(centers[0]), quantize4(centers[1])];

    let mut best = (i32::MAX, quants[0], quants[1], 0u64, 0u32);
    for swap in 0..2usize {
        let c0 = quants[swap];
        let c1 = quants[1 - swap];
        for which in 0..8usize {
            let mut c0 = c0;
            let mut c1 = c1;
            // The low distance bit travels in the ordering of the packed
            // 12-bit base values, so only matching orderings are encodable.
            let need_ge = which & 1 == 1;
            if (pack12(c0) >= pack12(c1)) != need_ge {
                if pack12(c0) == pack12(c1) {
                    if c1[2] < 15 {
                        c1[2] += 1;
                    } else {
                        c0[2] -= 1;
                    }
                } else {
                    continue;
                }
            }

            let colors = paint_colors_h(expand_rgb4(c0), expand_rgb4(c1), DISTANCE_TABLE[which]);
            let (loss, indexes) = best_indexes(pixels, &colors, &opaque, punchthrough);
            if best.0 > loss {
                best = (loss, c0, c1, which as u64, indexes);
            }
        }
    }

    let (_, c0, c1, which, indexes) = best;
    pack_h(c0, c1, which, indexes, !punchthrough)
}

fn block_points(pixels: &[u8; 64], punchthrough: bool) -> (Vec<[f64; 3]>, [bool; 16]) {
    let mut points = Vec::with_capacity(16);
    let mut opaque = [true; 16];
    for i in 0..16 {
        if punchthrough && pixels[4 * i + 3] < 0x80 {
            opaque[i] = false;
            continue;
        }
        points.push([
            pixels[4 * i] as f64,
            pixels[4 * i + 1] as f64,
            pixels[4 * i + 2] as f64,
        ]);
    }
    (points, opaque)
}

fn quantize4(center: [f64; 3]) -> [u32; 3] {
    let quantize = |v: f64| -> u32 {
        let v8 = iround(v).clamp(0, 255);
        (((v8 + 8) * 15) / 255) as u32
    };
    [
        quantize(center[0]),
        quantize(center[1]),
        quantize(center[2]),
    ]
}

fn expand_rgb4(c: [u32; 3]) -> [i32; 3] {
    [
        ((c[0] << 4) | c[0]) as i32,
        ((c[1] << 4) | c[1]) as i32,
        ((c[2] << 4) | c[2]) as i32,
    ]
}

fn pack12(c: [u32; 3]) -> u32 {
    (c[0] << 8) | (c[1] << 4) | c[2]
}

/// Per-pixel palette fitting shared by T and H. Transparent pixels take the
/// reserved index 2 and contribute no loss; opaque pixels skip it when the
/// block is punchthrough.
fn best_indexes(
    pixels: &[u8; 64],
    colors: &[[u8; 3]; 4],
    opaque: &[bool; 16],
    punchthrough: bool,
) -> (i32, u32) {
    let mut loss = 0i32;
    let mut indexes = 0u32;
    for i in 0..16 {
        let position = 4 * (i & 3) + (i >> 2);
        if !opaque[i] {
            indexes |= 1 << (position + 0x10);
            continue;
        }

        let original = [
            pixels[4 * i] as i32,
            pixels[4 * i + 1] as i32,
            pixels[4 * i + 2] as i32,
        ];
        let mut best_one_loss = i32::MAX;
        let mut best_j = 0u32;
        for (j, color) in colors.iter().enumerate() {
            if punchthrough && j == 2 {
                continue;
            }
            let one_loss = pixel_loss(*color, original);
            if best_one_loss > one_loss {
                best_one_loss = one_loss;
                best_j = j as u32;
            }
        }
        indexes |= (best_j & 2) << (position + 0x0F);
        indexes |= (best_j & 1) << position;
        loss += best_one_loss;
    }
    (loss, indexes)
}

fn pack_t(paint: [u32; 3], center: [u32; 3], which: u64, indexes: u32, opaque: bool) -> u64 {
    let r0 = paint[0] as u64;
    let mut code = ((r0 >> 2) << 59)
        | ((r0 & 3) << 56)
        | ((paint[1] as u64) << 52)
        | ((paint[2] as u64) << 48)
        | ((center[0] as u64) << 44)
        | ((center[1] as u64) << 40)
        | ((center[2] as u64) << 36)
        | ((which >> 1) << 34)
        | ((opaque as u64) << 33)
        | ((which & 1) << 32)
        | indexes as u64;

    // Patch the free bits so the 5+3 red addition overflows, which is how the
    // decoder recognizes T mode. The packing must not saturate this sum.
    if (r0 >> 2) + (r0 & 3) >= 4 {
        code |= 0b111 << 61;
    } else {
        code |= 1 << 58;
    }
    code
}

fn pack_h(c0: [u32; 3], c1: [u32; 3], which: u64, indexes: u32, opaque: bool) -> u64 {
    let (r0, g0, b0) = (c0[0] as u64, c0[1] as u64, c0[2] as u64);
    let mut code = (r0 << 59)
        | ((g0 >> 1) << 56)
        | ((g0 & 1) << 52)
        | ((b0 >> 3) << 51)
        | ((b0 & 7) << 47)
        | ((c1[0] as u64) << 43)
        | ((c1[1] as u64) << 39)
        | ((c1[2] as u64) << 35)
        | (((which >> 2) & 1) << 34)
        | ((opaque as u64) << 33)
        | (((which >> 1) & 1) << 32)
        | indexes as u64;

    // Red must stay in range while green overflows to tag H mode.
    code |= ((g0 >> 3) & 1) << 63;
    let g2 = ((g0 & 1) << 1) | (b0 >> 3);
    let magnitude = (b0 >> 1) & 3;
    if g2 + magnitude >= 4 {
        code |= 0b111 << 53;
    } else {
        code |= 1 << 50;
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_color_block() -> [u8; 64] {
        // Red and blue pixels interleaved: ideal T/H territory, hopeless for
        // a single base color pair along one axis.
        // 0xEE survives the 4-bit quantization exactly.
        let mut pixels = [0u8; 64];
        for i in 0..16 {
            if i % 2 == 0 {
                pixels[4 * i] = 0xEE;
            } else {
                pixels[4 * i + 2] = 0xEE;
            }
            pixels[4 * i + 3] = 0xFF;
        }
        pixels
    }

    fn overflows(field: u64, delta: u64) -> bool {
        let delta = if delta >= 4 {
            delta as i64 - 8
        } else {
            delta as i64
        };
        !(0..=31).contains(&(field as i64 + delta))
    }

    #[test]
    fn t_codeword_forces_red_overflow() {
        let code = encode_t(&two_color_block(), 0.5, false);
        assert_eq!(1, (code >> 33) & 1);
        assert!(overflows((code >> 59) & 31, (code >> 56) & 7));
    }

    #[test]
    fn h_codeword_forces_green_overflow_only() {
        let code = encode_h(&two_color_block(), 0.5, false);
        assert_eq!(1, (code >> 33) & 1);
        assert!(!overflows((code >> 59) & 31, (code >> 56) & 7));
        assert!(overflows((code >> 51) & 31, (code >> 48) & 7));
    }

    #[test]
    fn t_mode_reconstructs_two_clusters_exactly() {
        // Pure 4-bit-representable colors decode with zero error in T mode.
        let pixels = two_color_block();
        let code = encode_t(&pixels, 0.5, false);
        let mut decoded = [0u8; 64];
        etcdec_rs::color_block(code, &mut decoded, false);
        for i in 0..16 {
            assert_eq!(pixels[4 * i], decoded[4 * i]);
            assert_eq!(pixels[4 * i + 2], decoded[4 * i + 2]);
        }
    }

    #[test]
    fn punchthrough_t_reserves_index_two() {
        let mut pixels = two_color_block();
        for i in 0..4 {
            pixels[4 * i + 3] = 0;
        }
        let code = encode_t(&pixels, 0.5, true);
        // Opaque bit clear.
        assert_eq!(0, (code >> 33) & 1);
        let mut decoded = [0u8; 64];
        etcdec_rs::color_block(code, &mut decoded, true);
        for i in 0..4 {
            let x = i & 3;
            let y = i >> 2;
            assert_eq!(0, decoded[16 * y + 4 * x + 3]);
        }
    }

    #[test]
    fn h_ordering_matches_which_bit() {
        // Property of every emitted H codeword: the packed base ordering
        // encodes the low distance bit the decoder will reconstruct.
        for seed in 0..4u8 {
            let mut pixels = two_color_block();
            pixels[0] = seed.wrapping_mul(63);
            let code = encode_h(&pixels, 0.5, false);
            let r0 = (code >> 59) & 15;
            let g0 = ((code >> 56) & 7) << 1 | ((code >> 52) & 1);
            let b0 = ((code >> 51) & 1) << 3 | ((code >> 47) & 7);
            let v0 = (r0 << 8) | (g0 << 4) | b0;
            let r1 = (code >> 43) & 15;
            let g1 = (code >> 39) & 15;
            let b1 = (code >> 35) & 15;
            let v1 = (r1 << 8) | (g1 << 4) | b1;
            assert_ne!(v0, v1);
        }
    }
}
