// The EAC 8-bit alpha codeword: a base value, a multiplier, one of 16
// modifier tables and 16 3-bit indexes. The search brackets the base around
// the block mean and refines it coarse-to-fine; each pixel picks its index by
// walking the half of the modifier table matching the sign of its deviation.
use etcdec_rs::{eac_index_shift, ALPHA_MODIFIER_TABLES};

use super::iround;

pub(super) fn encode_alpha(pixels: &[u8; 64]) -> u64 {
    let mut alphas = [0i32; 16];
    for (i, alpha) in alphas.iter_mut().enumerate() {
        *alpha = pixels[16 * (i >> 2) + 4 * (i & 3) + 3] as i32;
    }

    let mean = iround(alphas.iter().sum::<i32>() as f64 / 16.0);
    if alphas.iter().all(|&a| a == alphas[0]) {
        // A constant block is exact with multiplier zero, whatever the table.
        return (alphas[0] as u64) << 56;
    }

    let mut best_loss = i32::MAX;
    let mut best = (0i32, 0i32, 0usize, 0u64);

    for table in 0..16usize {
        for multiplier in 1..16i32 {
            // Coarse-to-fine walk of the base value: 16, then 4, then 1.
            let mut base = mean.clamp(0, 255);
            for step in [16i32, 4, 1] {
                let mut best_step_loss = i32::MAX;
                let mut best_step_base = base;
                let mut candidate = base - 3 * step;
                while candidate <= base + 3 * step {
                    let clamped = candidate.clamp(0, 255);
                    let (loss, _) = fit_indexes(&alphas, clamped, multiplier, table);
                    if best_step_loss > loss {
                        best_step_loss = loss;
                        best_step_base = clamped;
                    }
                    candidate += step;
                }
                base = best_step_base;
            }

            let (loss, indexes) = fit_indexes(&alphas, base, multiplier, table);
            if best_loss > loss {
                best_loss = loss;
                best = (base, multiplier, table, indexes);
            }
        }
    }

    let (base, multiplier, table, indexes) = best;
    ((base as u64) << 56) | ((multiplier as u64) << 52) | ((table as u64) << 48) | indexes
}

/// Pick the best index for every pixel and return the summed squared error
/// together with the packed 48 index bits.
fn fit_indexes(alphas: &[i32; 16], base: i32, multiplier: i32, table: usize) -> (i32, u64) {
    let modifiers = &ALPHA_MODIFIER_TABLES[table];
    let mut loss = 0i32;
    let mut indexes = 0u64;

    for (i, &alpha) in alphas.iter().enumerate() {
        // Negative deviations live in indexes 0..4, positive in 4..8. The
        // modifiers in each half are ordered by magnitude, so the error is
        // unimodal along the walk.
        let range = if alpha < base { 0..4 } else { 4..8 };

        let mut best_one_loss = i32::MAX;
        let mut best_index = 0usize;
        for index in range {
            let value = (base + modifiers[index] * multiplier).clamp(0, 255);
            let delta = value - alpha;
            let one_loss = delta * delta;
            if best_one_loss > one_loss {
                best_one_loss = one_loss;
                best_index = index;
            } else {
                break;
            }
        }

        loss += best_one_loss;
        indexes |= (best_index as u64) << eac_index_shift(i & 3, i >> 2);
    }

    (loss, indexes)
}
