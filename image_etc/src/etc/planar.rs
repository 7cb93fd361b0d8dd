// Planar mode fits three 6/7/6-bit base colors describing a color gradient
// across the block. The least-squares solve is closed-form: the decoder's
// reconstruction weights per pixel are (4-x-y, x, y) scaled by 1/4, and the
// matrices below are the exact pseudo-inverse of that system.
use super::iround;

/// Per-pixel reconstruction weights, row-major by y then x.
const PLANE_Z: [[i32; 16]; 3] = [
    [4, 3, 2, 1, 3, 2, 1, 0, 2, 1, 0, -1, 1, 0, -1, -2],
    [0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3],
    [0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3],
];

/// 4 * inverse(Z * transpose(Z)), scaled so every entry is n/320.
const PLANE_C: [[f64; 3]; 3] = [
    [23.0 / 320.0, -1.0 / 320.0, -1.0 / 320.0],
    [-1.0 / 320.0, 39.0 / 320.0, -25.0 / 320.0],
    [-1.0 / 320.0, -25.0 / 320.0, 39.0 / 320.0],
];

pub(super) fn encode_planar(pixels: &[u8; 64]) -> u64 {
    let mut quantized = [[0u64; 3]; 3]; // [origin, horizontal, vertical][channel]

    for channel in 0..3 {
        let mut d = [0.0f64; 3];
        for i in 0..16 {
            let value = pixels[16 * (i >> 2) + 4 * (i & 3) + channel] as f64;
            d[0] += PLANE_Z[0][i] as f64 * value;
            d[1] += PLANE_Z[1][i] as f64 * value;
            d[2] += PLANE_Z[2][i] as f64 * value;
        }

        let bits = if channel == 1 { 127 } else { 63 };
        for k in 0..3 {
            let solved = PLANE_C[k][0] * d[0] + PLANE_C[k][1] * d[1] + PLANE_C[k][2] * d[2];
            let clamped = solved.clamp(0.0, 255.0);
            quantized[k][channel] = iround(clamped * bits as f64 / 255.0).clamp(0, bits) as u64;
        }
    }

    pack_planar(quantized[0], quantized[1], quantized[2])
}

fn pack_planar(origin: [u64; 3], horizontal: [u64; 3], vertical: [u64; 3]) -> u64 {
    let (ro, go, bo) = (origin[0], origin[1], origin[2]);
    let (rh, gh, bh) = (horizontal[0], horizontal[1], horizontal[2]);
    let (rv, gv, bv) = (vertical[0], vertical[1], vertical[2]);

    let mut code = (ro << 57)
        | ((go >> 6) << 56)
        | ((go & 0x3F) << 49)
        | ((bo >> 5) << 48)
        | (((bo >> 3) & 3) << 43)
        | ((bo & 7) << 39)
        | ((rh >> 1) << 34)
        | (1 << 33)
        | ((rh & 1) << 32)
        | (gh << 25)
        | (bh << 19)
        | (rv << 13)
        | (gv << 6)
        | bv;

    // Red and green must decode in range; blue must overflow to tag planar.
    code |= ((ro >> 1) & 1) << 63;
    code |= ((go >> 1) & 1) << 55;
    let b2 = (bo >> 3) & 3;
    let magnitude = (bo >> 1) & 3;
    if b2 + magnitude >= 4 {
        code |= 0b111 << 45;
    } else {
        code |= 1 << 42;
    }
    code
}
