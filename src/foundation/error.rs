/// Convenience result alias used across the crate's fallible collaborator APIs.
pub type PaintResult<T> = Result<T, PaintError>;

/// Error type for decoding, encoding, snapshot and upload paths.
///
/// Drawing operations never return this: out-of-range geometry is clipped locally.
#[derive(thiserror::Error, Debug)]
pub enum PaintError {
    /// Caller-supplied data violates a documented contract.
    #[error("validation error: {0}")]
    Validation(String),

    /// A pixel producer could not turn its input into pixels.
    #[error("decode error: {0}")]
    Decode(String),

    /// An image could not be written to an encoded representation.
    #[error("encode error: {0}")]
    Encode(String),

    /// Snapshot (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level failure (IO, codec) with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PaintError {
    /// Build a [`PaintError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PaintError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PaintError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PaintError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
