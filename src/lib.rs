//! Streaming computation of the Filecoin Piece Commitment (commP / CommD).
//!
//! [`Calc`] implements the hard part of the sealing pipeline's piece
//! commitment step: FR32 bit-expansion, a SHA-256-254 binary Merkle tree
//! built incrementally over the expanded stream, and a layer-parallel
//! scheduler (one worker thread per tree level) so that expansion, hashing
//! and flushing overlap. [`pad_commp`] extends a finished commP to a larger
//! padded tree size using the same nul-subtree padding the tree itself uses
//! internally.
//!
//! This crate produces only the 32-byte digest and the padded piece size;
//! CID wrapping, file I/O, and sector sealing live in the surrounding host
//! program.

mod calc;
mod constants;
mod error;
mod fr32;
mod hash254;
mod layer;
mod pad;
mod zero;

pub use calc::Calc;
pub use constants::{
    BLOCK_SIZE, DIGEST_SIZE, MAX_LAYERS, MAX_PIECE_PAYLOAD, MAX_PIECE_SIZE, MIN_PIECE_PAYLOAD,
};
pub use error::{Error, Result};
pub use hash254::Fr32Ary;
pub use pad::pad_commp;

#[cfg(test)]
mod integration_like_tests {
    use super::*;

    #[test]
    fn boundary_65_zero_bytes_is_deterministic() {
        let mut a = Calc::new();
        a.write(&[0u8; 65]).unwrap();
        let (digest_a, size_a) = a.digest().unwrap();

        let mut b = Calc::new();
        b.write(&[0u8; 65]).unwrap();
        let (digest_b, size_b) = b.digest().unwrap();

        assert_eq!(digest_a, digest_b);
        assert_eq!(size_a, 128);
        assert_eq!(size_b, 128);
    }

    #[test]
    fn boundary_127_zero_bytes_equals_level_two_nul_root() {
        let mut calc = Calc::new();
        calc.write(&[0u8; 127]).unwrap();
        let (digest, size) = calc.digest().unwrap();
        assert_eq!(size, 128);
        // Four zero leaves collapse to the depth-2 nul root.
        assert_eq!(digest, crate::zero::nul_root(2));
    }

    #[test]
    fn boundary_128_and_254_zero_bytes_equal_level_three_nul_root() {
        for len in [128usize, 254] {
            let mut calc = Calc::new();
            calc.write(&vec![0u8; len]).unwrap();
            let (digest, size) = calc.digest().unwrap();
            assert_eq!(size, 256);
            assert_eq!(digest, crate::zero::nul_root(3));
        }
    }
}
