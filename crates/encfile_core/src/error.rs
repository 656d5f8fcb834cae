//! Error types for the encrypted file façade.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in encrypted file operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Backing store error.
    #[error("storage error: {0}")]
    Storage(#[from] encfile_storage::StorageError),

    /// Attempted to read beyond the end of the plaintext file.
    #[error("read beyond end of file: offset {offset}, len {len}, size {size}")]
    OutOfRange {
        /// The requested read offset.
        offset: u64,
        /// The requested read length.
        len: usize,
        /// The current plaintext size.
        size: u64,
    },

    /// Attempted to overwrite previously committed bytes.
    #[error("attempt to overwrite committed bytes: offset {offset} < size {size}")]
    OverwriteForbidden {
        /// The requested write offset.
        offset: u64,
        /// The current plaintext size.
        size: u64,
    },

    /// Attempted to write past the end of the file, leaving a gap.
    #[error("gaps are not allowed: offset {offset} > size {size}")]
    GapForbidden {
        /// The requested write offset.
        offset: u64,
        /// The current plaintext size.
        size: u64,
    },

    /// Attempted to shrink the file.
    #[error("cannot shrink the file: requested {requested} < size {size}")]
    ShrinkForbidden {
        /// The requested new size.
        requested: u64,
        /// The current plaintext size.
        size: u64,
    },

    /// Block size parameters are unusable.
    #[error("invalid block size: {message}")]
    InvalidBlockSize {
        /// Description of the parameter problem.
        message: String,
    },

    /// The AEAD nonce is too small to hold the length and block fields.
    #[error("nonce too small: {nonce_size} bytes, need at least {min}")]
    NonceTooSmall {
        /// The AEAD's nonce size.
        nonce_size: usize,
        /// The minimum supported nonce size.
        min: usize,
    },

    /// An encryption key had the wrong length.
    #[error("invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize {
        /// Expected size in bytes.
        expected: usize,
        /// Actual size in bytes.
        actual: usize,
    },

    /// A ciphertext block failed AEAD authentication.
    ///
    /// Indicates key mismatch, corruption, or tampering. Never retried.
    #[error("authentication failed for block {block}")]
    AuthenticationFailed {
        /// Index of the block that failed to open.
        block: u64,
    },

    /// A block decrypted to an unexpected number of bytes.
    #[error("plaintext length mismatch for block {block}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Index of the affected block.
        block: u64,
        /// Expected plaintext length.
        expected: usize,
        /// Actual plaintext length.
        actual: usize,
    },

    /// The backing store returned fewer bytes than requested.
    #[error("short read from backing store: wanted {expected} bytes, got {actual}")]
    ShortRead {
        /// Requested byte count.
        expected: usize,
        /// Bytes actually returned.
        actual: usize,
    },

    /// The backing store accepted fewer bytes than requested.
    #[error("short write to backing store: wanted {expected} bytes, wrote {actual}")]
    ShortWrite {
        /// Requested byte count.
        expected: usize,
        /// Bytes actually written.
        actual: usize,
    },

    /// The ciphertext layout is damaged.
    #[error("ciphertext corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid block size error.
    pub fn invalid_block_size(message: impl Into<String>) -> Self {
        Self::InvalidBlockSize {
            message: message.into(),
        }
    }

    /// Creates an invalid key size error.
    pub fn invalid_key_size(actual: usize, expected: usize) -> Self {
        Self::InvalidKeySize { expected, actual }
    }

    /// Creates a corrupted ciphertext error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }
}
