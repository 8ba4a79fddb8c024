use thiserror::Error;

/// Shared error type for both sides of the wire format.
///
/// The recorder only ever produces [`WireError::Io`] (and treats it as
/// fatal, see the crate-level docs); the player can hit every variant.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    #[error("bad magic: expected {expected:#010x}, got {got:#010x}")]
    BadMagic { expected: u32, got: u32 },

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),

    #[error("unrecognized event tag {0:#010x}")]
    UnknownTag(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type WireResult<T> = Result<T, WireError>;
