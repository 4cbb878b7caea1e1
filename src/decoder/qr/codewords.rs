//! Codeword extraction: zigzag placement, unmasking, block de-interleaving

use super::format::{EcLevel, MaskPattern};
use super::function_mask::FunctionMask;
use super::reed_solomon;
use super::tables::BlockLayout;
use crate::models::BitMatrix;

/// Read the codeword stream in placement order, removing the data mask
///
/// Column pairs are walked right to left, alternating upward and downward,
/// skipping the vertical timing column. A trailing partial byte (the
/// remainder bits) is dropped.
pub(crate) fn read_codewords(
    matrix: &BitMatrix,
    function: &FunctionMask,
    mask: MaskPattern,
) -> Vec<u8> {
    let n = function.size();
    let mut out = Vec::with_capacity(n * n / 8);
    let mut byte = 0u8;
    let mut filled = 0;

    let mut right = n - 1;
    loop {
        if right == 6 {
            right = 5;
        }
        let upward = (right + 1) & 2 == 0;
        for step in 0..n {
            let y = if upward { n - 1 - step } else { step };
            for x in [right, right - 1] {
                if function.is_function(x, y) {
                    continue;
                }
                let bit = matrix.get(x, y) ^ mask.is_masked(y, x);
                byte = (byte << 1) | u8::from(bit);
                filled += 1;
                if filled == 8 {
                    out.push(byte);
                    byte = 0;
                    filled = 0;
                }
            }
        }
        if right < 3 {
            break;
        }
        right -= 2;
    }
    out
}

/// Split interleaved codewords into blocks, correct each, and concatenate
/// the data codewords
///
/// Returns the data and the total number of corrected codewords.
pub(crate) fn correct_blocks(
    codewords: &[u8],
    version: u8,
    ec_level: EcLevel,
) -> Option<(Vec<u8>, usize)> {
    let layout = BlockLayout::new(version, ec_level)?;
    if codewords.len() < layout.total_codewords {
        return None;
    }
    let ecc = layout.ecc_per_block;
    let short_data = layout.data_codewords() / layout.blocks;
    // Blocks at the end carry one extra data codeword
    let short_blocks = layout.blocks - layout.data_codewords() % layout.blocks;

    let mut blocks: Vec<Vec<u8>> = vec![Vec::with_capacity(short_data + 1 + ecc); layout.blocks];
    let mut source = codewords.iter().copied();
    for i in 0..=short_data {
        for (b, block) in blocks.iter_mut().enumerate() {
            if i < short_data || b >= short_blocks {
                block.push(source.next()?);
            }
        }
    }
    for _ in 0..ecc {
        for block in &mut blocks {
            block.push(source.next()?);
        }
    }

    let mut data = Vec::with_capacity(layout.data_codewords());
    let mut corrected = 0;
    for mut block in blocks {
        corrected += reed_solomon::correct(&mut block, ecc)?;
        data.extend_from_slice(&block[..block.len() - ecc]);
    }
    Some((data, corrected))
}
