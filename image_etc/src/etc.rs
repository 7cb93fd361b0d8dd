// The block codec core. Everything operates on the 64-byte block buffer
// produced by the extractor: color formats at 16*y + 4*x, 11-bit channels as
// big-endian u16 at 8*y + 2*x (second channel at +0x20).
mod alpha;
mod cluster;
mod eac11;
mod encode;
mod individual;
mod planar;
mod tee_aitch;

pub(crate) use encode::BlockEncoder;

/// Half-block orientations. 0/1 are the left and right 2x4 halves of an
/// unflipped block, 2/3 the top and bottom 4x2 halves of a flipped one.
const NUM_ORIENTATIONS: usize = 4;

const ORIENTATION_PIXEL_OFFSETS: [[usize; 8]; NUM_ORIENTATIONS] = [
    [0x00, 0x10, 0x20, 0x30, 0x04, 0x14, 0x24, 0x34],
    [0x08, 0x18, 0x28, 0x38, 0x0C, 0x1C, 0x2C, 0x3C],
    [0x00, 0x10, 0x04, 0x14, 0x08, 0x18, 0x0C, 0x1C],
    [0x20, 0x30, 0x24, 0x34, 0x28, 0x38, 0x2C, 0x3C],
];

/// Bit position of each orientation pixel within the 16-bit index planes.
const ORIENTATION_SHIFTS: [[u32; 8]; NUM_ORIENTATIONS] = [
    [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07],
    [0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F],
    [0x00, 0x01, 0x04, 0x05, 0x08, 0x09, 0x0C, 0x0D],
    [0x02, 0x03, 0x06, 0x07, 0x0A, 0x0B, 0x0E, 0x0F],
];

/// ITU-R BT.601 luma weights for the color error metric. The extractor's
/// gray conversion deliberately uses BT.709 instead; see extract.rs.
const WEIGHTS_I32: [i32; 3] = [299, 587, 114];
const WEIGHTS_F64: [f64; 3] = [299.0, 587.0, 114.0];

/// Rounds half away from zero. Plain `as` casts truncate, which combined
/// with adding 0.5 avoids the ties-to-even behavior of `f64::round`-free
/// float formatting differences between toolchains.
fn iround(x: f64) -> i32 {
    if x >= 0.0 {
        (x + 0.5) as i32
    } else {
        (x - 0.5) as i32
    }
}

/// Weighted squared error between a candidate color and a source pixel.
fn pixel_loss(candidate: [u8; 3], original: [i32; 3]) -> i32 {
    let d0 = candidate[0] as i32 - original[0];
    let d1 = candidate[1] as i32 - original[1];
    let d2 = candidate[2] as i32 - original[2];
    WEIGHTS_I32[0] * d0 * d0 + WEIGHTS_I32[1] * d1 * d1 + WEIGHTS_I32[2] * d2 * d2
}
