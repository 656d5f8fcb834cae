//! In-memory storage backend for testing.

use crate::backend::{FileInfo, StorageBackend};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// This backend stores all data in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use encfile_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.write_at(b"test data", 0).unwrap();
/// assert_eq!(backend.metadata().unwrap().size, 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing data.
    ///
    /// Useful for testing reopen and tamper scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns a copy of all data in the backend.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Clears all data from the backend.
    pub fn clear(&self) {
        self.data.write().clear();
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let data = self.data.read();
        let size = data.len() as u64;
        let offset_usize = offset as usize;
        let end = offset_usize.saturating_add(len);

        if offset > size || end > data.len() {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(data[offset_usize..end].to_vec())
    }

    fn write_at(&self, new_data: &[u8], offset: u64) -> StorageResult<usize> {
        if new_data.is_empty() {
            return Ok(0);
        }

        let mut data = self.data.write();
        let offset = offset as usize;
        let end = offset + new_data.len();

        // Zero-fill any gap between the current end and the write offset.
        if data.len() < end {
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(new_data);

        Ok(new_data.len())
    }

    fn metadata(&self) -> StorageResult<FileInfo> {
        Ok(FileInfo {
            size: self.data.read().len() as u64,
            modified: None,
            readonly: false,
        })
    }

    fn truncate(&self, new_size: u64) -> StorageResult<()> {
        self.data.write().resize(new_size as usize, 0);
        Ok(())
    }

    fn sync(&self) -> StorageResult<()> {
        // In-memory backend has no durable storage to sync
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.metadata().unwrap().size, 0);
        assert!(backend.data().is_empty());
    }

    #[test]
    fn memory_write_and_read() {
        let backend = InMemoryBackend::new();

        assert_eq!(backend.write_at(b"hello", 0).unwrap(), 5);
        assert_eq!(backend.write_at(b" world", 5).unwrap(), 6);
        assert_eq!(backend.metadata().unwrap().size, 11);

        let data = backend.read_at(0, 5).unwrap();
        assert_eq!(&data, b"hello");

        let data = backend.read_at(6, 5).unwrap();
        assert_eq!(&data, b"world");
    }

    #[test]
    fn memory_overwrite_in_place() {
        let backend = InMemoryBackend::new();
        backend.write_at(b"hello world", 0).unwrap();
        backend.write_at(b"WORLD", 6).unwrap();

        assert_eq!(backend.metadata().unwrap().size, 11);
        assert_eq!(backend.read_at(0, 11).unwrap(), b"hello WORLD");
    }

    #[test]
    fn memory_write_past_end_zero_fills() {
        let backend = InMemoryBackend::new();
        backend.write_at(b"tail", 8).unwrap();

        assert_eq!(backend.metadata().unwrap().size, 12);
        assert_eq!(backend.read_at(0, 8).unwrap(), vec![0u8; 8]);
        assert_eq!(backend.read_at(8, 4).unwrap(), b"tail");
    }

    #[test]
    fn memory_read_past_end_fails() {
        let backend = InMemoryBackend::new();
        backend.write_at(b"hello", 0).unwrap();

        let result = backend.read_at(10, 5);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn memory_read_extending_past_end_fails() {
        let backend = InMemoryBackend::new();
        backend.write_at(b"hello", 0).unwrap();

        let result = backend.read_at(3, 10);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn memory_empty_write() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.write_at(b"", 0).unwrap(), 0);
        assert_eq!(backend.metadata().unwrap().size, 0);
    }

    #[test]
    fn memory_empty_read() {
        let backend = InMemoryBackend::new();
        backend.write_at(b"hello", 0).unwrap();

        let data = backend.read_at(2, 0).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn memory_with_data() {
        let backend = InMemoryBackend::with_data(b"preloaded".to_vec());
        assert_eq!(backend.metadata().unwrap().size, 9);
        assert_eq!(backend.read_at(0, 9).unwrap(), b"preloaded");
    }

    #[test]
    fn memory_clear() {
        let backend = InMemoryBackend::new();
        backend.write_at(b"some data", 0).unwrap();
        backend.clear();
        assert_eq!(backend.metadata().unwrap().size, 0);
    }

    #[test]
    fn memory_truncate_shrink_and_grow() {
        let backend = InMemoryBackend::new();
        backend.write_at(b"hello world", 0).unwrap();

        backend.truncate(5).unwrap();
        assert_eq!(backend.metadata().unwrap().size, 5);
        assert_eq!(backend.read_at(0, 5).unwrap(), b"hello");

        backend.truncate(8).unwrap();
        assert_eq!(backend.read_at(5, 3).unwrap(), vec![0u8; 3]);
    }

    #[test]
    fn memory_sync_succeeds() {
        let backend = InMemoryBackend::new();
        backend.write_at(b"data", 0).unwrap();
        assert!(backend.sync().is_ok());
    }
}
