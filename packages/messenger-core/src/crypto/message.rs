//! # Message Encryption
//!
//! Short chat messages are encrypted directly under the recipient's RSA
//! identity key with OAEP/SHA-256.
//!
//! ```text
//! encrypt: UTF-8(plaintext) ──RSA-OAEP(recipient public key)──► base64(512 bytes)
//! decrypt: base64 ──RSA-OAEP⁻¹(own private key)──► UTF-8 plaintext
//! ```
//!
//! ## Known Limitation
//!
//! One OAEP block carries at most `k - 2·hLen - 2` bytes (446 for a 4096-bit
//! key with SHA-256). Longer payloads fail with `PayloadTooLarge`; nothing is
//! ever truncated. Chunking or a hybrid scheme is the caller's concern.

use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::Oaep;
use sha2::Sha256;

use super::encoding;
use super::keys::{PortablePublicKey, PrivateKey};
use super::params::CipherSuite;
use crate::error::{Error, Result};

/// Encrypt a text message to a recipient's portable public key
///
/// ## Errors
///
/// - `InvalidKeyFormat` if `public_key` cannot be imported
/// - `PayloadTooLarge` if the UTF-8 bytes exceed one OAEP block
pub fn encrypt_message(
    plaintext: &str,
    public_key: &PortablePublicKey,
    suite: CipherSuite,
) -> Result<String> {
    let key = public_key.import(suite)?;

    let max = suite.max_message_len();
    if plaintext.len() > max {
        return Err(Error::PayloadTooLarge {
            len: plaintext.len(),
            max,
        });
    }

    let ciphertext = key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext.as_bytes())
        .map_err(|e| match e {
            rsa::Error::MessageTooLong => Error::PayloadTooLarge {
                len: plaintext.len(),
                max,
            },
            other => Error::KeyGeneration(format!("RSA-OAEP encryption failed: {}", other)),
        })?;

    Ok(encoding::to_base64(&ciphertext))
}

/// Decrypt a text message with our own private key
///
/// ## Errors
///
/// `DecryptionFailure` if the text is not base64, has the wrong length for
/// the key, fails OAEP unpadding, or does not decode as UTF-8.
pub fn decrypt_message(ciphertext: &str, private_key: &PrivateKey) -> Result<String> {
    let bytes = encoding::from_base64(ciphertext)
        .ok_or_else(|| Error::DecryptionFailure("Ciphertext is not valid base64".into()))?;

    let key = private_key.rsa();
    if bytes.len() != key.size() {
        return Err(Error::DecryptionFailure(format!(
            "Ciphertext must be {} bytes, got {}",
            key.size(),
            bytes.len()
        )));
    }

    let plaintext = key
        .decrypt_blinded(&mut OsRng, Oaep::new::<Sha256>(), &bytes)
        .map_err(|_| Error::DecryptionFailure("RSA-OAEP unpadding failed".into()))?;

    String::from_utf8(plaintext)
        .map_err(|_| Error::DecryptionFailure("Plaintext is not valid UTF-8".into()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{identity, other_identity};

    #[test]
    fn test_round_trip() {
        let id = identity();

        let ct = encrypt_message("testText", &id.public_key, CipherSuite::V1).unwrap();
        let pt = decrypt_message(&ct, &id.private_key).unwrap();

        assert_eq!(pt, "testText");
    }

    #[test]
    fn test_round_trip_unicode_and_empty() {
        let id = identity();

        for msg in ["", "grüße aus Zürich 👋", "多语言消息"] {
            let ct = encrypt_message(msg, &id.public_key, CipherSuite::V1).unwrap();
            assert_eq!(decrypt_message(&ct, &id.private_key).unwrap(), msg);
        }
    }

    #[test]
    fn test_ciphertext_is_randomised() {
        let id = identity();

        let c1 = encrypt_message("same", &id.public_key, CipherSuite::V1).unwrap();
        let c2 = encrypt_message("same", &id.public_key, CipherSuite::V1).unwrap();

        assert_ne!(c1, c2);
    }

    #[test]
    fn test_size_bound() {
        let id = identity();

        let at_limit = "a".repeat(446);
        let ct = encrypt_message(&at_limit, &id.public_key, CipherSuite::V1).unwrap();
        assert_eq!(decrypt_message(&ct, &id.private_key).unwrap(), at_limit);

        let over = "a".repeat(447);
        assert_eq!(
            encrypt_message(&over, &id.public_key, CipherSuite::V1).unwrap_err(),
            Error::PayloadTooLarge { len: 447, max: 446 }
        );
    }

    #[test]
    fn test_size_bound_counts_bytes_not_chars() {
        let id = identity();

        // 150 × 3-byte characters = 450 bytes
        let wide = "€".repeat(150);
        assert!(matches!(
            encrypt_message(&wide, &id.public_key, CipherSuite::V1),
            Err(Error::PayloadTooLarge { len: 450, .. })
        ));
    }

    #[test]
    fn test_invalid_public_key() {
        let bad = PortablePublicKey::from_jwk("{}");
        assert!(matches!(
            encrypt_message("hi", &bad, CipherSuite::V1),
            Err(Error::InvalidKeyFormat(_))
        ));
    }

    #[test]
    fn test_wrong_private_key_fails() {
        let alice = identity();
        let mallory = other_identity();

        let ct = encrypt_message("for alice", &alice.public_key, CipherSuite::V1).unwrap();
        assert!(matches!(
            decrypt_message(&ct, &mallory.private_key),
            Err(Error::DecryptionFailure(_))
        ));
    }

    #[test]
    fn test_malformed_ciphertext() {
        let id = identity();

        assert!(matches!(
            decrypt_message("@@@", &id.private_key),
            Err(Error::DecryptionFailure(_))
        ));
        assert!(matches!(
            decrypt_message(&encoding::to_base64(&[1u8; 16]), &id.private_key),
            Err(Error::DecryptionFailure(_))
        ));

        let ct = encrypt_message("x", &id.public_key, CipherSuite::V1).unwrap();
        let mut bytes = encoding::from_base64(&ct).unwrap();
        bytes[100] ^= 0x01;
        assert!(matches!(
            decrypt_message(&encoding::to_base64(&bytes), &id.private_key),
            Err(Error::DecryptionFailure(_))
        ));
    }
}
