//! Per-block AEAD encryption with deterministic nonces.
//!
//! The nonce for a block encodes the plaintext length (16-bit LE) followed
//! by the block index (64-bit LE), zero-padded to the AEAD's nonce size.
//! Only the last block of the file is ever re-encrypted, and only when its
//! plaintext strictly grows, so the `(block, length)` pair - and therefore
//! the nonce - is unique across the whole history of a file under one key.

use crate::aead::Aead;
use crate::error::{CoreError, CoreResult};

/// Bytes of the nonce holding the plaintext length.
const LEN_FIELD: usize = 2;
/// Bytes of the nonce holding the block index.
const BLOCK_FIELD: usize = 8;
/// Smallest nonce that fits both fields.
pub(crate) const MIN_NONCE_SIZE: usize = LEN_FIELD + BLOCK_FIELD;

/// Builds the nonce for sealing `plain_len` bytes into block `block`.
pub(crate) fn make_nonce(nonce_size: usize, plain_len: usize, block: u64) -> Vec<u8> {
    // Both violated only by a broken caller: the appender validates the
    // nonce size at construction and never passes an oversized block.
    assert!(nonce_size >= MIN_NONCE_SIZE, "nonce too small for length and block fields");
    assert!(plain_len <= u16::MAX as usize, "plaintext block exceeds the nonce length field");

    let mut nonce = vec![0u8; nonce_size];
    nonce[..LEN_FIELD].copy_from_slice(&(plain_len as u16).to_le_bytes());
    nonce[LEN_FIELD..MIN_NONCE_SIZE].copy_from_slice(&block.to_le_bytes());
    nonce
}

/// Seals one plaintext block.
///
/// Panics if the AEAD returns ciphertext of the wrong length; that is a
/// broken AEAD contract, not a recoverable runtime error.
pub(crate) fn seal_block(aead: &dyn Aead, block: u64, plaintext: &[u8]) -> Vec<u8> {
    let nonce = make_nonce(aead.nonce_size(), plaintext.len(), block);
    let ciphertext = aead.seal(&nonce, plaintext);
    assert_eq!(
        ciphertext.len(),
        plaintext.len() + aead.overhead(),
        "AEAD produced ciphertext of unexpected length"
    );
    ciphertext
}

/// Opens one ciphertext block, expecting `ciphertext.len() - overhead`
/// plaintext bytes.
///
/// # Errors
///
/// - [`CoreError::AuthenticationFailed`] if the AEAD rejects the block
/// - [`CoreError::LengthMismatch`] if the opened length is unexpected
pub(crate) fn open_block(aead: &dyn Aead, block: u64, ciphertext: &[u8]) -> CoreResult<Vec<u8>> {
    debug_assert!(ciphertext.len() > aead.overhead());
    let expected = ciphertext.len() - aead.overhead();
    let nonce = make_nonce(aead.nonce_size(), expected, block);
    let plaintext = aead
        .open(&nonce, ciphertext)
        .map_err(|_| CoreError::AuthenticationFailed { block })?;
    if plaintext.len() != expected {
        return Err(CoreError::LengthMismatch {
            block,
            expected,
            actual: plaintext.len(),
        });
    }
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aead::{Aes256GcmAead, EncryptionKey, KEY_SIZE};

    fn gcm() -> Aes256GcmAead {
        Aes256GcmAead::new(&EncryptionKey::from_bytes(&[0x42u8; KEY_SIZE]).unwrap())
    }

    #[test]
    fn nonce_byte_layout() {
        let nonce = make_nonce(12, 5, 3);
        assert_eq!(nonce, [5, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn nonce_encodes_large_values() {
        let nonce = make_nonce(12, 0xABCD, 0x0102_0304_0506_0708);
        assert_eq!(nonce[..2], [0xCD, 0xAB]);
        assert_eq!(nonce[2..10], [0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(nonce[10..], [0, 0]);
    }

    #[test]
    fn nonce_zero_pads_larger_sizes() {
        let nonce = make_nonce(16, 1, 1);
        assert_eq!(nonce.len(), 16);
        assert_eq!(nonce[10..], [0u8; 6]);
    }

    #[test]
    #[should_panic(expected = "nonce too small")]
    fn nonce_panics_when_too_small() {
        make_nonce(9, 1, 1);
    }

    #[test]
    fn seal_open_round_trip() {
        let aead = gcm();
        let sealed = seal_block(&aead, 7, b"some plaintext");
        assert_eq!(sealed.len(), 14 + aead.overhead());

        let opened = open_block(&aead, 7, &sealed).unwrap();
        assert_eq!(&opened, b"some plaintext");
    }

    #[test]
    fn open_rejects_wrong_block_index() {
        let aead = gcm();
        let sealed = seal_block(&aead, 7, b"some plaintext");

        // Same bytes presented as a different block get a different nonce.
        assert!(matches!(
            open_block(&aead, 8, &sealed),
            Err(CoreError::AuthenticationFailed { block: 8 })
        ));
    }

    #[test]
    fn open_rejects_tampered_ciphertext() {
        let aead = gcm();
        let mut sealed = seal_block(&aead, 0, b"some plaintext");
        sealed[4] ^= 0x80;

        assert!(matches!(
            open_block(&aead, 0, &sealed),
            Err(CoreError::AuthenticationFailed { block: 0 })
        ));
    }

    #[test]
    fn open_rejects_truncated_ciphertext() {
        let aead = gcm();
        let sealed = seal_block(&aead, 0, b"some plaintext");

        // Dropping the final byte changes the expected plaintext length,
        // so the nonce no longer matches.
        assert!(matches!(
            open_block(&aead, 0, &sealed[..sealed.len() - 1]),
            Err(CoreError::AuthenticationFailed { .. })
        ));
    }
}
