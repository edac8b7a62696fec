//! FR32 bit-expansion: the fixed 127-byte -> 128-byte rewriting that splices
//! two zero bits after every 254 data bits, producing four field-element
//! sized (254-bit, zero-padded to 256-bit) chunks per block.

use crate::constants::BLOCK_SIZE;

/// Unpadded bytes per FR32 block.
pub const IN_BLOCK_SIZE: usize = BLOCK_SIZE;
/// Padded bytes per FR32 block.
pub const OUT_BLOCK_SIZE: usize = 128;

/// Expands one 127-byte block into a 128-byte block by inserting two zero
/// bits after every 254 data bits.
///
/// `input.len()` must be exactly [`IN_BLOCK_SIZE`] and `output.len()` exactly
/// [`OUT_BLOCK_SIZE`]; this is a crate-internal invariant enforced by the
/// carry buffer, not a user-facing contract, so it panics rather than
/// returning a `Result` on mismatch.
pub fn expand_block(input: &[u8], output: &mut [u8]) {
    debug_assert_eq!(input.len(), IN_BLOCK_SIZE);
    debug_assert_eq!(output.len(), OUT_BLOCK_SIZE);

    output[0..32].copy_from_slice(&input[0..32]);
    output[31] &= 0x3F;

    for i in 31..63 {
        output[i + 1] = (input[i + 1] << 2) | (input[i] >> 6);
    }
    output[63] &= 0x3F;

    for i in 63..95 {
        output[i + 1] = (input[i + 1] << 4) | (input[i] >> 4);
    }
    output[95] &= 0x3F;

    for i in 95..126 {
        output[i + 1] = (input[i + 1] << 6) | (input[i] >> 2);
    }
    output[127] = input[126] >> 2;
}

/// Expands a `k * 127`-byte slab into a `k * 128`-byte slab, one
/// [`expand_block`] call per 127-byte slice. `k` must be a power of two so
/// the result is a balanced subtree's worth of leaves.
pub fn expand_slab(input: &[u8]) -> Vec<u8> {
    debug_assert_eq!(input.len() % IN_BLOCK_SIZE, 0);
    let blocks = input.len() / IN_BLOCK_SIZE;
    let mut output = vec![0u8; blocks * OUT_BLOCK_SIZE];

    for (in_chunk, out_chunk) in input
        .chunks_exact(IN_BLOCK_SIZE)
        .zip(output.chunks_exact_mut(OUT_BLOCK_SIZE))
    {
        expand_block(in_chunk, out_chunk);
    }

    output
}
