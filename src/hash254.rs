//! SHA-256 with the top two bits of the output cleared, so the result is a
//! canonical representative of a BLS12-381 scalar-field element.

use sha2::{Digest, Sha256};

use crate::constants::DIGEST_SIZE;

pub type Fr32Ary = [u8; DIGEST_SIZE];

/// `h254(a, b) = SHA-256(a ‖ b)` with byte 31 AND-masked with `0x3F`.
pub fn h254(left: &[u8], right: &[u8]) -> Fr32Ary {
    let mut out = [0u8; DIGEST_SIZE];
    h254_into(left, right, &mut out);
    out
}

/// Same as [`h254`] but writes into caller-supplied storage, allowing the
/// left half of an owned pair to be reused as output.
pub fn h254_into(left: &[u8], right: &[u8], out: &mut Fr32Ary) {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    let digest = hasher.finalize();
    out.copy_from_slice(&digest);
    out[DIGEST_SIZE - 1] &= 0x3F;
}
