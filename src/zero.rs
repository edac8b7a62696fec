//! The process-global table of all-zero subtree roots, used to pad a partial
//! tree up to a power-of-two width without hashing literal zero bytes on
//! every flush.

use lazy_static::lazy_static;

use crate::constants::MAX_LAYERS;
use crate::hash254::{h254, Fr32Ary};

lazy_static! {
    /// `P[0]` is 32 zero bytes; `P[i]` is the SHA-256-254 root of a perfectly
    /// balanced subtree of `2^i` all-zero leaves.
    static ref NUL_ROOTS: [Fr32Ary; MAX_LAYERS] = build_nul_roots();
}

fn build_nul_roots() -> [Fr32Ary; MAX_LAYERS] {
    let mut roots = [[0u8; 32]; MAX_LAYERS];
    for i in 1..MAX_LAYERS {
        roots[i] = h254(&roots[i - 1], &roots[i - 1]);
    }
    roots
}

/// Returns the nul-subtree root at tree level `level` (0-indexed, 0 is the
/// all-zero leaf itself).
pub fn nul_root(level: usize) -> Fr32Ary {
    NUL_ROOTS[level]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_is_zero() {
        assert_eq!(nul_root(0), [0u8; 32]);
    }

    #[test]
    fn level_one_is_hash_of_two_zero_leaves() {
        assert_eq!(nul_root(1), h254(&[0u8; 32], &[0u8; 32]));
    }

    #[test]
    fn masked() {
        for lvl in 0..MAX_LAYERS {
            assert_eq!(nul_root(lvl)[31] & 0xC0, 0);
        }
    }
}
