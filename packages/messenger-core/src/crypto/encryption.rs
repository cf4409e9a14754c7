//! # Encryption Module
//!
//! AES-256-GCM for key wrapping and password-protected session data.
//!
//! ## Packed Layout
//!
//! ```text
//! ┌──────────────┬────────────────────────────────────────────┐
//! │  nonce (12)  │  ciphertext ‖ tag (len(plaintext) + 16)    │
//! └──────────────┴────────────────────────────────────────────┘
//!                   base64(STANDARD) of the whole thing
//! ```
//!
//! ## Security Properties
//!
//! | Property | Guarantee |
//! |----------|-----------|
//! | Confidentiality | Only holders of the key can read the data |
//! | Integrity | Any modification is detected before plaintext is released |
//! | Nonce freshness | 96-bit random nonce drawn per call from the OS RNG |

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce as AesNonce,
};
use zeroize::{ZeroizeOnDrop, Zeroizing};

use super::encoding;
use super::params::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};

/// Largest plaintext AES-GCM accepts under one nonce (2^36 - 32 bytes)
const AES_GCM_MAX_PLAINTEXT: u64 = (1 << 36) - 32;

/// A nonce (number used once) for AES-GCM encryption
///
/// ## Critical Security Requirement
///
/// **NEVER reuse a nonce with the same key!**
///
/// Nonce reuse lets an attacker recover the GHASH key and forge messages.
/// Nonces here are always random, which is safe for up to 2^32 messages
/// per key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random nonce
    pub fn random() -> Result<Self> {
        Ok(Self(super::random_bytes()?))
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// An AES-256-GCM encryption key
///
/// Zeroized when dropped.
#[derive(ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw key bytes
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}

/// Encrypt with AES-256-GCM under a fresh random nonce
///
/// ## Returns
///
/// Tuple of (nonce, ciphertext_with_tag)
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8], aad: &[u8]) -> Result<(Nonce, Vec<u8>)> {
    let nonce = Nonce::random()?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));

    let payload = Payload {
        msg: plaintext,
        aad,
    };

    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&nonce.0), payload)
        .map_err(|_| Error::PayloadTooLarge {
            len: plaintext.len(),
            max: usize::try_from(AES_GCM_MAX_PLAINTEXT).unwrap_or(usize::MAX),
        })?;

    Ok((nonce, ciphertext))
}

/// Decrypt with AES-256-GCM
///
/// ## Errors
///
/// Returns `AuthenticationFailure` if the key, nonce, AAD or ciphertext do
/// not match what was sealed. Nothing is returned on failure.
pub fn decrypt(
    key: &EncryptionKey,
    nonce: &Nonce,
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));

    let payload = Payload {
        msg: ciphertext,
        aad,
    };

    cipher
        .decrypt(AesNonce::from_slice(&nonce.0), payload)
        .map(Zeroizing::new)
        .map_err(|_| Error::AuthenticationFailure)
}

/// Encrypt and pack as `base64(nonce ‖ ciphertext ‖ tag)`
pub fn encrypt_packed(key: &EncryptionKey, plaintext: &[u8]) -> Result<String> {
    let (nonce, ciphertext) = encrypt(key, plaintext, &[])?;

    let mut packed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    packed.extend_from_slice(nonce.as_bytes());
    packed.extend_from_slice(&ciphertext);

    Ok(encoding::to_base64(&packed))
}

/// Unpack `base64(nonce ‖ ciphertext ‖ tag)` and decrypt
///
/// Malformed input is reported exactly like a failed tag check.
pub fn decrypt_packed(key: &EncryptionKey, packed: &str) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = encoding::from_base64(packed).ok_or(Error::AuthenticationFailure)?;
    if bytes.len() < NONCE_SIZE + TAG_SIZE {
        return Err(Error::AuthenticationFailure);
    }

    let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
    let nonce = Nonce::from_bytes(
        nonce
            .try_into()
            .map_err(|_| Error::AuthenticationFailure)?,
    );

    decrypt(key, &nonce, ciphertext, &[])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_basic() {
        let key = EncryptionKey::from_bytes([42u8; 32]);
        let plaintext = b"Hello, World!";

        let (nonce, ciphertext) = encrypt(&key, plaintext, b"").unwrap();
        let decrypted = decrypt(&key, &nonce, &ciphertext, b"").unwrap();

        assert_eq!(decrypted.as_slice(), plaintext);
        assert_eq!(ciphertext.len(), plaintext.len() + TAG_SIZE);
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let key = EncryptionKey::from_bytes([42u8; 32]);

        let (nonce, ciphertext) = encrypt(&key, b"", b"").unwrap();
        let decrypted = decrypt(&key, &nonce, &ciphertext, b"").unwrap();

        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = EncryptionKey::from_bytes([42u8; 32]);

        let (nonce, mut ciphertext) = encrypt(&key, b"Hello, World!", b"").unwrap();
        ciphertext[0] ^= 0xFF;

        let result = decrypt(&key, &nonce, &ciphertext, b"");
        assert_eq!(result.unwrap_err(), Error::AuthenticationFailure);
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = EncryptionKey::from_bytes([42u8; 32]);
        let key2 = EncryptionKey::from_bytes([99u8; 32]);

        let (nonce, ciphertext) = encrypt(&key1, b"secret", b"").unwrap();
        let result = decrypt(&key2, &nonce, &ciphertext, b"");
        assert_eq!(result.unwrap_err(), Error::AuthenticationFailure);
    }

    #[test]
    fn test_different_nonces_produce_different_ciphertext() {
        let key = EncryptionKey::from_bytes([42u8; 32]);

        let (n1, ct1) = encrypt(&key, b"Hello, World!", b"").unwrap();
        let (n2, ct2) = encrypt(&key, b"Hello, World!", b"").unwrap();

        assert_ne!(n1, n2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_packed_round_trip() {
        let key = EncryptionKey::from_bytes([7u8; 32]);

        let packed = encrypt_packed(&key, "grüße 👋".as_bytes()).unwrap();
        let opened = decrypt_packed(&key, &packed).unwrap();

        assert_eq!(opened.as_slice(), "grüße 👋".as_bytes());
    }

    #[test]
    fn test_packed_malformed_is_authentication_failure() {
        let key = EncryptionKey::from_bytes([7u8; 32]);

        assert_eq!(
            decrypt_packed(&key, "%%%").unwrap_err(),
            Error::AuthenticationFailure
        );
        // Valid base64, but shorter than nonce + tag
        assert_eq!(
            decrypt_packed(&key, &encoding::to_base64(&[0u8; 20])).unwrap_err(),
            Error::AuthenticationFailure
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let key = EncryptionKey::from_bytes([42u8; 32]);
        assert_eq!(format!("{:?}", key), "EncryptionKey(..)");
    }
}
