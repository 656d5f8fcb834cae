//! Storage backend trait definition.

use std::sync::Arc;
use std::time::SystemTime;

use crate::error::StorageResult;

/// Metadata describing a backing store.
///
/// This is the subset of file metadata the encrypted façade needs to
/// answer `stat`-style queries on behalf of the store it wraps.
#[derive(Debug, Clone, Copy)]
pub struct FileInfo {
    /// Current size in bytes.
    pub size: u64,
    /// Last modification time, if the store tracks one.
    pub modified: Option<SystemTime>,
    /// Whether the store rejects writes.
    pub readonly: bool,
}

/// A low-level backing store for encfile.
///
/// Backing stores are **opaque byte stores** with positional access. They
/// provide simple operations for reading and writing at arbitrary offsets.
/// The encrypted façade owns all ciphertext layout interpretation -
/// backends do not understand blocks, nonces, or plaintext sizes.
///
/// # Invariants
///
/// - `read_at` returns exactly the requested bytes or an error
/// - `write_at` grows the store when writing at or past the current end
/// - Backends must be `Send + Sync`; all methods take `&self` and
///   implementations synchronize internally
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The read would extend beyond the current size
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Writes `data` starting at `offset`, growing the store if the write
    /// extends past the current end.
    ///
    /// Returns the number of bytes written, which equals `data.len()` on
    /// success.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn write_at(&self, data: &[u8], offset: u64) -> StorageResult<usize>;

    /// Returns the current size and file metadata of the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be determined.
    fn metadata(&self) -> StorageResult<FileInfo>;

    /// Resizes the store to `new_size` bytes.
    ///
    /// Growing zero-fills the new range. The encrypted façade never calls
    /// this; it is part of the contract for symmetry with OS files.
    ///
    /// # Errors
    ///
    /// Returns an error if the resize fails.
    fn truncate(&self, new_size: u64) -> StorageResult<()>;

    /// Syncs all data and metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&self) -> StorageResult<()>;
}

/// Delegation so a backend can be shared between an owner and observers
/// (all methods already take `&self`).
impl<S: StorageBackend + ?Sized> StorageBackend for Arc<S> {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        (**self).read_at(offset, len)
    }

    fn write_at(&self, data: &[u8], offset: u64) -> StorageResult<usize> {
        (**self).write_at(data, offset)
    }

    fn metadata(&self) -> StorageResult<FileInfo> {
        (**self).metadata()
    }

    fn truncate(&self, new_size: u64) -> StorageResult<()> {
        (**self).truncate(new_size)
    }

    fn sync(&self) -> StorageResult<()> {
        (**self).sync()
    }
}
