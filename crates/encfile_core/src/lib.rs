//! # encfile core
//!
//! An append-only, random-access encrypted file façade.
//!
//! A caller sees a plaintext byte stream that may be read at arbitrary
//! offsets and extended at its current end. The façade transparently maps
//! it onto fixed-size AEAD-sealed ciphertext blocks in a pluggable backing
//! store (see `encfile_storage`).
//!
//! ## Security Model
//!
//! - Each block is sealed by an injected [`Aead`]; AES-256-GCM is provided
//!   via [`Aes256GcmAead`]
//! - Nonces are deterministic: the block index and the block's plaintext
//!   length, both little-endian, zero-padded to the nonce size
//! - Only the final block is ever rewritten, and only by strictly growing
//!   its plaintext, so no `(key, nonce)` pair ever repeats
//! - Overwrites, gaps, and shrinking are refused; they would break the
//!   uniqueness argument
//! - The ciphertext file carries no header and no length field; the
//!   backing store's byte length is the only length record
//!
//! ## Example
//!
//! ```rust
//! use encfile_core::{Appender, Aes256GcmAead, EncryptionKey};
//! use encfile_storage::InMemoryBackend;
//!
//! let key = EncryptionKey::generate();
//! let aead = Box::new(Aes256GcmAead::new(&key));
//! let appender = Appender::new(aead, Box::new(InMemoryBackend::new())).unwrap();
//!
//! appender.write_at(b"append-only secrets", 0).unwrap();
//! assert_eq!(appender.read_at(7, 4).unwrap(), b"only");
//! assert_eq!(appender.metadata().unwrap().size, 19);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod aead;
mod appender;
mod codec;
mod error;
mod layout;

pub use aead::{Aead, Aes256GcmAead, EncryptionKey, NotAuthentic, GCM_NONCE_SIZE, GCM_TAG_SIZE, KEY_SIZE};
pub use appender::{Appender, DEFAULT_BLOCK_SIZE};
pub use error::{CoreError, CoreResult};
pub use layout::BlockLayout;
