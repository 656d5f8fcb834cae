//! Block arithmetic: mapping plaintext byte ranges onto ciphertext blocks.
//!
//! The ciphertext file is a concatenation of fixed-size blocks, each the
//! AEAD seal of one plaintext block, except that the last block may be
//! short. All index and size computations live here, as pure functions of
//! the three geometry parameters.

use crate::error::{CoreError, CoreResult};

/// Largest plaintext block size representable in the nonce length field.
const MAX_PLAIN_BLOCK: u64 = u16::MAX as u64;

/// Geometry of the ciphertext block layout.
///
/// Fixed for the lifetime of an appender: ciphertext block size, AEAD
/// overhead, and the derived plaintext block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    cipher_block: u64,
    plain_block: u64,
    overhead: u64,
}

impl BlockLayout {
    /// Creates a layout from a ciphertext block size and AEAD overhead.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBlockSize`] if the overhead is zero or
    /// leaves no room for plaintext, or if the plaintext block size does
    /// not fit the nonce's 16-bit length field.
    pub fn new(cipher_block_size: usize, overhead: usize) -> CoreResult<Self> {
        if overhead == 0 {
            return Err(CoreError::invalid_block_size("AEAD overhead must be non-zero"));
        }
        if overhead >= cipher_block_size {
            return Err(CoreError::invalid_block_size(format!(
                "AEAD overhead {overhead} leaves no plaintext room in {cipher_block_size}-byte blocks"
            )));
        }
        let plain_block = (cipher_block_size - overhead) as u64;
        if plain_block > MAX_PLAIN_BLOCK {
            return Err(CoreError::invalid_block_size(format!(
                "plaintext block size {plain_block} exceeds the {MAX_PLAIN_BLOCK}-byte nonce length field"
            )));
        }
        Ok(Self {
            cipher_block: cipher_block_size as u64,
            plain_block,
            overhead: overhead as u64,
        })
    }

    /// Ciphertext block size in bytes.
    #[must_use]
    pub fn cipher_block(&self) -> u64 {
        self.cipher_block
    }

    /// Plaintext block size in bytes.
    #[must_use]
    pub fn plain_block(&self) -> u64 {
        self.plain_block
    }

    /// AEAD overhead per block in bytes.
    #[must_use]
    pub fn overhead(&self) -> u64 {
        self.overhead
    }

    /// Returns the first and last block indices covering `len` plaintext
    /// bytes starting at `offset`. `len` must be non-zero.
    #[must_use]
    pub fn block_range(&self, offset: u64, len: u64) -> (u64, u64) {
        debug_assert!(len > 0);
        let last_byte = offset + len - 1;
        (offset / self.plain_block, last_byte / self.plain_block)
    }

    /// Unused bytes at the start of the first plaintext block of a range
    /// beginning at `offset`.
    #[must_use]
    pub fn head_skip(&self, offset: u64) -> u64 {
        offset % self.plain_block
    }

    /// Backing offset of ciphertext block `block`.
    #[must_use]
    pub fn cipher_offset(&self, block: u64) -> u64 {
        block * self.cipher_block
    }

    /// Plaintext file length corresponding to a ciphertext file length.
    ///
    /// Full blocks each hold a full plaintext block; a trailing fragment
    /// holds its length minus the AEAD overhead.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Corrupted`] if a trailing fragment is too short
    /// to contain any plaintext.
    pub fn plaintext_len(&self, cipher_len: u64) -> CoreResult<u64> {
        if cipher_len == 0 {
            return Ok(0);
        }
        let full_blocks = cipher_len / self.cipher_block;
        let tail_cipher = cipher_len % self.cipher_block;
        let tail_plain = if tail_cipher == 0 {
            0
        } else if tail_cipher <= self.overhead {
            return Err(CoreError::corrupted(format!(
                "trailing ciphertext fragment of {tail_cipher} bytes cannot hold plaintext \
                 under {} bytes of AEAD overhead",
                self.overhead
            )));
        } else {
            tail_cipher - self.overhead
        };
        Ok(full_blocks * self.plain_block + tail_plain)
    }
}

/// Slices block `index` (relative to the buffer start) out of a buffer of
/// concatenated blocks, clamping the final block to the buffer end.
pub(crate) fn block_slice(buffer: &[u8], index: u64, block_size: u64) -> &[u8] {
    let begin = (index * block_size) as usize;
    let end = ((index + 1) * block_size).min(buffer.len() as u64) as usize;
    &buffer[begin..end]
}
