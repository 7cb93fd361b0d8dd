// The EAC 11-bit codec searches its whole parameter space: 256 base values,
// 16 multipliers and 16 tables. Loss is measured between 16-bit expansions,
// so sums need 64 bits. The early exit keeps the exhaustive scan fast for
// blocks that settle on a good candidate quickly.
use etcdec_rs::{eac11_value, eac_index_shift};

pub(super) fn encode_eac11(pixels: &[u8; 64], channel_offset: usize, signed: bool) -> u64 {
    let mut values = [0u16; 16];
    for (i, value) in values.iter_mut().enumerate() {
        let offset = channel_offset + 8 * (i >> 2) + 2 * (i & 3);
        *value = u16::from_be_bytes([pixels[offset], pixels[offset + 1]]);
    }

    let mut best_loss = u64::MAX;
    let mut best_code = 0u64;

    for base in 0..=255u8 {
        for multiplier in 0..16u32 {
            for table in 0..16usize {
                let mut reconstructions = [0u16; 8];
                for (index, reconstruction) in reconstructions.iter_mut().enumerate() {
                    *reconstruction = eac11_value(base, multiplier, table, index, signed);
                }

                let mut loss = 0u64;
                let mut indexes = 0u64;
                for (i, &value) in values.iter().enumerate() {
                    let mut best_one_loss = u64::MAX;
                    let mut best_index = 0u64;
                    for (index, &reconstruction) in reconstructions.iter().enumerate() {
                        let delta = reconstruction as i64 - value as i64;
                        let one_loss = (delta * delta) as u64;
                        if best_one_loss > one_loss {
                            best_one_loss = one_loss;
                            best_index = index as u64;
                        }
                    }
                    loss += best_one_loss;
                    if loss >= best_loss {
                        break;
                    }
                    indexes |= best_index << eac_index_shift(i & 3, i >> 2);
                }

                if best_loss > loss {
                    best_loss = loss;
                    best_code = ((base as u64) << 56)
                        | ((multiplier as u64) << 52)
                        | ((table as u64) << 48)
                        | indexes;
                }
            }
        }
    }

    best_code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_with_values(values: [u16; 16], channel_offset: usize) -> [u8; 64] {
        let mut pixels = [0u8; 64];
        for (i, v) in values.into_iter().enumerate() {
            let offset = channel_offset + 8 * (i >> 2) + 2 * (i & 3);
            pixels[offset..offset + 2].copy_from_slice(&v.to_be_bytes());
        }
        pixels
    }

    fn decoded_loss(code: u64, values: &[u16; 16], signed: bool) -> u64 {
        let decoded = etcdec_rs::eac11_block(code, signed);
        values
            .iter()
            .zip(&decoded)
            .map(|(&v, &d)| {
                let delta = v as i64 - d as i64;
                (delta * delta) as u64
            })
            .sum()
    }

    #[test]
    fn uniform_block_is_nearly_exact() {
        // 0xFFFF is reachable exactly: base 255 reconstructs 2047 after
        // clamping, which bit-extends to 0xFFFF.
        let values = [0xFFFFu16; 16];
        let code = encode_eac11(&block_with_values(values, 0), 0, false);
        assert_eq!(0, decoded_loss(code, &values, false));
    }

    #[test]
    fn ramp_stays_within_tolerance() {
        let mut values = [0u16; 16];
        for (i, v) in values.iter_mut().enumerate() {
            *v = (i as u16) << 12;
        }
        let code = encode_eac11(&block_with_values(values, 0), 0, false);

        // Bounded by the spacing of an 8-entry palette stretched over the
        // whole range, expanded to 16 bits.
        let decoded = etcdec_rs::eac11_block(code, false);
        for (v, d) in values.iter().zip(&decoded) {
            assert!((*v as i64 - *d as i64).abs() < 8192);
        }
    }

    #[test]
    fn signed_block_uses_biased_domain() {
        // Mid-range values map near signed zero.
        let values = [0x8000u16; 16];
        let code = encode_eac11(&block_with_values(values, 0), 0, true);
        let decoded = etcdec_rs::eac11_block(code, true);
        for d in decoded {
            assert!((d as i64 - 0x8000).abs() <= 64);
        }
    }

    #[test]
    fn second_channel_reads_from_its_offset() {
        let values = [0x4242u16; 16];
        let block = block_with_values(values, 0x20);
        let code = encode_eac11(&block, 0x20, false);
        let other = encode_eac11(&block, 0, false);
        // Channel 0 of this block is all zeros, so the codewords differ.
        assert_ne!(code, other);
    }
}
