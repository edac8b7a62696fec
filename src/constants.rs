/// Bytes of unpadded input consumed per FR32 block.
pub const BLOCK_SIZE: usize = 127;

/// Size, in bytes, of every digest produced by this crate.
pub const DIGEST_SIZE: usize = 32;

/// Maximum tree height. 31 layers above the leaves bounds the padded piece
/// at 64 GiB.
pub const MAX_LAYERS: usize = 31;

/// Largest padded piece size this crate will produce or accept, in bytes.
pub const MAX_PIECE_SIZE: u64 = 1u64 << (MAX_LAYERS as u32 + 5);

/// Largest unpadded input this crate will accept.
pub const MAX_PIECE_PAYLOAD: u64 = MAX_PIECE_SIZE / 128 * 127;

/// Smallest input for which a commP is defined: the FR32 expansion of 65
/// bytes is the first to straddle two field elements.
pub const MIN_PIECE_PAYLOAD: u64 = 65;

/// Number of [`BLOCK_SIZE`]-byte blocks the carry buffer batches before
/// draining into the FR32 expander. Larger batches raise the arity of the
/// slabs handed to the layer-0 worker and so reduce hold/pair overhead.
pub const CARRY_BLOCKS: usize = 32;

/// Bounded capacity of each inter-layer channel.
pub const LAYER_QUEUE_DEPTH: usize = 256;
