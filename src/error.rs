use thiserror::Error;

/// Errors returned by [`crate::Calc`] and [`crate::pad_commp`].
#[derive(Debug, Error)]
pub enum Error {
    /// `write` would push `bytes_consumed` past [`crate::MAX_PIECE_PAYLOAD`].
    #[error("input too large: would exceed the maximum piece payload of {0} bytes")]
    InputTooLarge(u64),

    /// `digest` was called before [`crate::MIN_PIECE_PAYLOAD`] bytes were written.
    #[error("insufficient data: {0} bytes written, need at least {1}")]
    InsufficientData(u64, u64),

    /// `pad_commp` was called with a malformed argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias for results returned by this crate's public API.
pub type Result<T> = std::result::Result<T, Error>;
