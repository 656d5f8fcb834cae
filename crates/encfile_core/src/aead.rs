//! AEAD contract and the provided AES-256-GCM implementation.
//!
//! The façade is parameterized over any authenticated-encryption primitive
//! through the [`Aead`] trait. [`Aes256GcmAead`] is the batteries-included
//! implementation; callers with their own AEAD construction implement the
//! trait themselves.
//!
//! The façade never supplies associated data, so the trait carries none.

use std::fmt;

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead as GcmAead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CoreError, CoreResult};

/// Size of an AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the GCM nonce in bytes.
pub const GCM_NONCE_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const GCM_TAG_SIZE: usize = 16;

/// Authentication failure from [`Aead::open`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotAuthentic;

impl fmt::Display for NotAuthentic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not authentic")
    }
}

impl std::error::Error for NotAuthentic {}

/// An authenticated-encryption-with-associated-data primitive.
///
/// # Contract
///
/// - `seal` returns exactly `plaintext.len() + overhead()` bytes; anything
///   else is a broken implementation and the façade aborts on it
/// - `open` inverts `seal` under the same `(key, nonce)` pair and rejects
///   any other input
/// - `nonce_size()` and `overhead()` are constant for the lifetime of the
///   value
pub trait Aead: Send + Sync {
    /// Size in bytes of the nonce `seal` and `open` expect.
    fn nonce_size(&self) -> usize;

    /// Fixed number of bytes `seal` adds to each plaintext.
    fn overhead(&self) -> usize;

    /// Encrypts and authenticates `plaintext` under `nonce`.
    fn seal(&self, nonce: &[u8], plaintext: &[u8]) -> Vec<u8>;

    /// Decrypts and verifies `ciphertext` under `nonce`.
    ///
    /// # Errors
    ///
    /// Returns [`NotAuthentic`] if the ciphertext does not authenticate.
    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, NotAuthentic>;
}

/// Encryption key for [`Aes256GcmAead`].
///
/// The key is automatically zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_SIZE],
}

impl EncryptionKey {
    /// Generates a new random encryption key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CoreError::invalid_key_size(bytes.len(), KEY_SIZE));
        }
        let mut key_bytes = [0u8; KEY_SIZE];
        key_bytes.copy_from_slice(bytes);
        Ok(Self { bytes: key_bytes })
    }

    /// Returns the key as a byte slice.
    ///
    /// # Security
    ///
    /// Be careful with this method - don't log or serialize the result.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// AES-256-GCM implementation of [`Aead`].
///
/// Nonce size is 12 bytes, overhead is the 16-byte authentication tag.
pub struct Aes256GcmAead {
    cipher: Aes256Gcm,
}

impl Aes256GcmAead {
    /// Creates an AEAD keyed by `key`.
    #[must_use]
    pub fn new(key: &EncryptionKey) -> Self {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));
        Self { cipher }
    }
}

impl Aead for Aes256GcmAead {
    fn nonce_size(&self) -> usize {
        GCM_NONCE_SIZE
    }

    fn overhead(&self) -> usize {
        GCM_TAG_SIZE
    }

    fn seal(&self, nonce: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let nonce = Nonce::from_slice(nonce);
        // Sealing into a fresh Vec cannot fail for AES-GCM; an error here
        // means the primitive broke its own contract.
        self.cipher
            .encrypt(nonce, plaintext)
            .expect("AES-256-GCM seal failed")
    }

    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, NotAuthentic> {
        let nonce = Nonce::from_slice(nonce);
        self.cipher.decrypt(nonce, ciphertext).map_err(|_| NotAuthentic)
    }
}
