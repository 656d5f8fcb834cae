//! The append-only encrypted file façade.

use parking_lot::RwLock;
use tracing::{debug, trace};

use encfile_storage::{FileInfo, StorageBackend};

use crate::aead::Aead;
use crate::codec;
use crate::error::{CoreError, CoreResult};
use crate::layout::{block_slice, BlockLayout};

/// Default ciphertext block size in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// An encrypted, append-only view of a backing store.
///
/// The appender presents a plaintext byte stream that may be read at
/// arbitrary offsets and extended at its current end. Contents are held in
/// the backing store as fixed-size AEAD-sealed ciphertext blocks; only the
/// final block may be short, and only the final block is ever rewritten -
/// strictly by growing its plaintext.
///
/// Each block's nonce encodes the block index and its plaintext length, so
/// append-only semantics guarantee that no `(key, nonce)` pair ever
/// repeats. This is the AEAD security prerequisite; it is why overwrites,
/// gaps, and shrinking are refused rather than merely discouraged.
///
/// # Concurrency
///
/// Internally synchronized with a readers-writer lock: any number of
/// concurrent reads, or one write. The lock is held for the whole
/// operation, including backing I/O and cryptographic work.
///
/// # Example
///
/// ```rust
/// use encfile_core::{Appender, Aes256GcmAead, EncryptionKey};
/// use encfile_storage::InMemoryBackend;
///
/// let key = EncryptionKey::generate();
/// let aead = Box::new(Aes256GcmAead::new(&key));
/// let appender = Appender::new(aead, Box::new(InMemoryBackend::new())).unwrap();
///
/// appender.write_at(b"hello", 0).unwrap();
/// appender.write_at(b" world", 5).unwrap();
/// assert_eq!(appender.read_at(0, 11).unwrap(), b"hello world");
/// ```
pub struct Appender {
    aead: Box<dyn Aead>,
    backing: Box<dyn StorageBackend>,
    layout: BlockLayout,
    /// Guards the backing store: shared for reads, exclusive for writes.
    lock: RwLock<()>,
}

impl Appender {
    /// Creates an appender over `backing` with the default 4096-byte
    /// ciphertext blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if the AEAD parameters are unusable; see
    /// [`Appender::with_block_size`].
    pub fn new(aead: Box<dyn Aead>, backing: Box<dyn StorageBackend>) -> CoreResult<Self> {
        Self::with_block_size(aead, backing, DEFAULT_BLOCK_SIZE)
    }

    /// Creates an appender with a custom ciphertext block size.
    ///
    /// The block size is part of the on-disk format: a store must always be
    /// reopened with the block size (and key) it was written with.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NonceTooSmall`] if the AEAD nonce cannot hold the
    ///   2-byte length and 8-byte block index fields
    /// - [`CoreError::InvalidBlockSize`] if the overhead is zero, fills the
    ///   whole block, or leaves a plaintext block larger than 65535 bytes
    pub fn with_block_size(
        aead: Box<dyn Aead>,
        backing: Box<dyn StorageBackend>,
        cipher_block_size: usize,
    ) -> CoreResult<Self> {
        let nonce_size = aead.nonce_size();
        if nonce_size < codec::MIN_NONCE_SIZE {
            return Err(CoreError::NonceTooSmall {
                nonce_size,
                min: codec::MIN_NONCE_SIZE,
            });
        }
        let layout = BlockLayout::new(cipher_block_size, aead.overhead())?;
        debug!(
            cipher_block = layout.cipher_block(),
            plain_block = layout.plain_block(),
            "opened encrypted appender"
        );
        Ok(Self {
            aead,
            backing,
            layout,
            lock: RwLock::new(()),
        })
    }

    /// Returns the block layout in use.
    #[must_use]
    pub fn layout(&self) -> BlockLayout {
        self.layout
    }

    /// Reads `len` plaintext bytes starting at `offset`.
    ///
    /// Either all requested bytes are returned or an error is; there are no
    /// partial reads. Safe to call concurrently with other reads.
    ///
    /// # Errors
    ///
    /// - [`CoreError::OutOfRange`] if the range extends past the plaintext end
    /// - [`CoreError::AuthenticationFailed`] / [`CoreError::LengthMismatch`]
    ///   on corrupted, tampered, or wrong-key ciphertext
    /// - Backing store failures, including short reads
    pub fn read_at(&self, offset: u64, len: usize) -> CoreResult<Vec<u8>> {
        let _guard = self.lock.read();
        self.read_inner(offset, len)
    }

    /// Appends `data` at `offset`, which must equal the current plaintext
    /// length.
    ///
    /// Returns the number of caller bytes written (`data.len()`). When the
    /// current plaintext length is not block-aligned the existing short
    /// tail block is read back, merged, and re-encrypted under its new,
    /// larger length.
    ///
    /// # Errors
    ///
    /// - [`CoreError::OverwriteForbidden`] if `offset` is below the
    ///   plaintext length
    /// - [`CoreError::GapForbidden`] if `offset` is above it
    /// - Tail read-back and backing store failures
    pub fn write_at(&self, data: &[u8], offset: u64) -> CoreResult<usize> {
        let _guard = self.lock.write();
        self.write_inner(data, offset)
    }

    /// Returns file metadata: the plaintext size together with the backing
    /// store's modification time and mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be queried or its
    /// length does not describe a well-formed ciphertext file.
    pub fn metadata(&self) -> CoreResult<FileInfo> {
        let _guard = self.lock.read();
        let (plain_size, _, info) = self.sizes()?;
        Ok(FileInfo {
            size: plain_size,
            ..info
        })
    }

    /// Grows the plaintext file to `new_size` bytes, extending it with
    /// zeros. A `new_size` equal to the current length is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShrinkForbidden`] if `new_size` is below the
    /// current plaintext length; shrinking would allow a future append to
    /// reuse a `(block, length)` nonce pair.
    pub fn truncate(&self, new_size: u64) -> CoreResult<()> {
        let _guard = self.lock.write();
        let (plain_size, _, _) = self.sizes()?;
        if new_size < plain_size {
            return Err(CoreError::ShrinkForbidden {
                requested: new_size,
                size: plain_size,
            });
        }
        if new_size == plain_size {
            return Ok(());
        }
        debug!(from = plain_size, to = new_size, "growing file with zero fill");
        let zeros = vec![0u8; (new_size - plain_size) as usize];
        self.write_inner(&zeros, plain_size)?;
        Ok(())
    }

    /// Flushes the backing store to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store sync fails.
    pub fn sync(&self) -> CoreResult<()> {
        let _guard = self.lock.write();
        self.backing.sync()?;
        Ok(())
    }

    /// Queries the backing length and derives the plaintext length from it.
    /// Never cached: a stale length would assign a wrong block index to the
    /// next append and break nonce uniqueness.
    fn sizes(&self) -> CoreResult<(u64, u64, FileInfo)> {
        let info = self.backing.metadata()?;
        let plain_size = self.layout.plaintext_len(info.size)?;
        Ok((plain_size, info.size, info))
    }

    fn read_inner(&self, offset: u64, len: usize) -> CoreResult<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let (plain_size, cipher_size, _) = self.sizes()?;
        let end = offset.checked_add(len as u64).ok_or(CoreError::OutOfRange {
            offset,
            len,
            size: plain_size,
        })?;
        if end > plain_size {
            return Err(CoreError::OutOfRange {
                offset,
                len,
                size: plain_size,
            });
        }

        let (first, last) = self.layout.block_range(offset, len as u64);
        let head_skip = self.layout.head_skip(offset);

        // One covering read of every ciphertext block the range touches.
        let cipher_begin = self.layout.cipher_offset(first);
        let cipher_end = self.layout.cipher_offset(last + 1).min(cipher_size);
        let want = (cipher_end - cipher_begin) as usize;
        let ciphertext = self.backing.read_at(cipher_begin, want)?;
        if ciphertext.len() != want {
            return Err(CoreError::ShortRead {
                expected: want,
                actual: ciphertext.len(),
            });
        }

        let plain_begin = first * self.layout.plain_block();
        let plain_end = ((last + 1) * self.layout.plain_block()).min(plain_size);
        let mut plaintext = Vec::with_capacity((plain_end - plain_begin) as usize);
        for block in first..=last {
            let cipher_block =
                block_slice(&ciphertext, block - first, self.layout.cipher_block());
            plaintext.extend_from_slice(&codec::open_block(
                self.aead.as_ref(),
                block,
                cipher_block,
            )?);
        }
        debug_assert_eq!(plaintext.len() as u64, plain_end - plain_begin);

        let start = head_skip as usize;
        Ok(plaintext[start..start + len].to_vec())
    }

    fn write_inner(&self, data: &[u8], offset: u64) -> CoreResult<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let (plain_size, _, _) = self.sizes()?;
        if offset < plain_size {
            return Err(CoreError::OverwriteForbidden {
                offset,
                size: plain_size,
            });
        }
        if offset > plain_size {
            return Err(CoreError::GapForbidden {
                offset,
                size: plain_size,
            });
        }

        // A mid-block append must re-encrypt the existing short tail with
        // its bytes prepended, under the new larger (block, length) nonce.
        let head_skip = self.layout.head_skip(offset);
        let (block_offset, plaintext) = if head_skip == 0 {
            (offset, data.to_vec())
        } else {
            trace!(tail = head_skip, "merging short tail block for re-encryption");
            let mut merged = self.read_inner(offset - head_skip, head_skip as usize)?;
            merged.extend_from_slice(data);
            (offset - head_skip, merged)
        };

        let (first, last) = self.layout.block_range(block_offset, plaintext.len() as u64);
        let mut last_plain = plaintext.len() as u64 % self.layout.plain_block();
        if last_plain == 0 {
            last_plain = self.layout.plain_block();
        }

        let total =
            (last - first) * self.layout.cipher_block() + last_plain + self.layout.overhead();
        let mut ciphertext = Vec::with_capacity(total as usize);
        for block in first..=last {
            let plain_block =
                block_slice(&plaintext, block - first, self.layout.plain_block());
            ciphertext.extend_from_slice(&codec::seal_block(
                self.aead.as_ref(),
                block,
                plain_block,
            ));
        }
        debug_assert_eq!(ciphertext.len() as u64, total);

        // One covering write; overwriting the old short tail is sound
        // because its plaintext is a prefix of the new last block.
        let written = self
            .backing
            .write_at(&ciphertext, self.layout.cipher_offset(first))?;
        if written != ciphertext.len() {
            return Err(CoreError::ShortWrite {
                expected: ciphertext.len(),
                actual: written,
            });
        }
        Ok(data.len())
    }
}
