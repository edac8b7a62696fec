//! Extends a finished commP to a larger padded tree size by hashing it
//! against the nul-subtree roots, without re-reading the original piece.

use anyhow::ensure;

use crate::constants::MAX_PIECE_SIZE;
use crate::error::{Error, Result};
use crate::hash254::{h254, Fr32Ary};
use crate::zero::nul_root;

/// Extends `src_commp` (the root of a tree of width `src_padded_size`) up to
/// a tree of width `tgt_padded_size`.
pub fn pad_commp(src_commp: &[u8], src_padded_size: u64, tgt_padded_size: u64) -> Result<Fr32Ary> {
    validate(src_commp, src_padded_size, tgt_padded_size)
        .map_err(|e| Error::InvalidArgument(e.to_string()))?;

    if src_padded_size == tgt_padded_size {
        let mut out = [0u8; 32];
        out.copy_from_slice(src_commp);
        return Ok(out);
    }

    let s = src_padded_size.trailing_zeros() as usize;
    let t = tgt_padded_size.trailing_zeros() as usize;

    let mut out = [0u8; 32];
    out.copy_from_slice(src_commp);

    for lvl in s..t {
        out = h254(&out, &nul_root(lvl - 5));
    }

    Ok(out)
}

fn validate(src_commp: &[u8], src_padded_size: u64, tgt_padded_size: u64) -> anyhow::Result<()> {
    ensure!(
        src_commp.len() == 32,
        "src_commp must be exactly 32 bytes, got {}",
        src_commp.len()
    );
    ensure!(
        src_padded_size.is_power_of_two(),
        "src_padded_size must be a power of two, got {}",
        src_padded_size
    );
    ensure!(
        tgt_padded_size.is_power_of_two(),
        "tgt_padded_size must be a power of two, got {}",
        tgt_padded_size
    );
    ensure!(
        src_padded_size <= tgt_padded_size,
        "src_padded_size ({}) must be <= tgt_padded_size ({})",
        src_padded_size,
        tgt_padded_size
    );
    ensure!(
        src_padded_size >= 128,
        "src_padded_size must be at least 128, got {}",
        src_padded_size
    );
    ensure!(
        tgt_padded_size <= MAX_PIECE_SIZE,
        "tgt_padded_size ({}) exceeds the maximum piece size ({})",
        tgt_padded_size,
        MAX_PIECE_SIZE
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_pad_is_a_copy() {
        let c = [7u8; 32];
        assert_eq!(pad_commp(&c, 256, 256).unwrap(), c);
    }

    #[test]
    fn nul_padding_consistency() {
        for k in 7..20usize {
            let src_size = 1u64 << k;
            let tgt_size = 1u64 << (k + 1);
            let src = nul_root(k - 5);
            let expected = nul_root(k - 4);
            assert_eq!(pad_commp(&src, src_size, tgt_size).unwrap(), expected);
        }
    }

    #[test]
    fn rejects_wrong_length() {
        let err = pad_commp(&[0u8; 31], 128, 256);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn rejects_non_power_of_two_sizes() {
        assert!(pad_commp(&[0u8; 32], 130, 256).is_err());
        assert!(pad_commp(&[0u8; 32], 128, 255).is_err());
    }

    #[test]
    fn rejects_src_greater_than_tgt() {
        assert!(pad_commp(&[0u8; 32], 256, 128).is_err());
    }

    #[test]
    fn rejects_src_below_minimum() {
        assert!(pad_commp(&[0u8; 32], 64, 256).is_err());
    }

    #[test]
    fn rejects_tgt_above_maximum() {
        assert!(pad_commp(&[0u8; 32], 128, MAX_PIECE_SIZE * 2).is_err());
    }

    #[test]
    fn multi_level_pad_matches_repeated_single_level_pad() {
        let src = nul_root(0);
        let direct = pad_commp(&src, 128, 1024).unwrap();

        let mut stepped = src;
        let mut size = 128u64;
        while size < 1024 {
            stepped = pad_commp(&stepped, size, size * 2).unwrap();
            size *= 2;
        }

        assert_eq!(direct, stepped);
    }
}
