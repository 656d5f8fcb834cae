//! # encfile storage
//!
//! Backing store contract and implementations for encfile.
//!
//! This crate provides the lowest-level storage abstraction for encfile.
//! Backing stores are **opaque byte stores** with positional access - they
//! do not interpret the data they hold. The encrypted file façade in
//! `encfile_core` owns all ciphertext layout interpretation.
//!
//! ## Design Principles
//!
//! - Backing stores are simple positional byte stores (read, write, size)
//! - No knowledge of the ciphertext block format
//! - Must be `Send + Sync` for concurrent access; all methods take `&self`
//!   and implementations synchronize internally
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use encfile_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.write_at(b"hello world", 0).unwrap();
//! let data = backend.read_at(0, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{FileInfo, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
