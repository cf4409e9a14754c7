//! # Key Derivation Functions
//!
//! Password-based key derivation with PBKDF2-HMAC-SHA256.
//!
//! ## Derivation Paths
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    PASSWORD → KEY DERIVATION                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Envelope (private key wrapping)                                       │
//! │  ───────────────────────────────                                        │
//! │  PBKDF2-HMAC-SHA256(                                                   │
//! │    password,                                                           │
//! │    salt = fresh 16 random bytes per wrap,                              │
//! │    iterations = 100 000 (stored in the blob),                          │
//! │  ) → 32-byte AES-256-GCM key                                           │
//! │                                                                         │
//! │  Login hash (sent to server)                                           │
//! │  ───────────────────────────                                            │
//! │  PBKDF2-HMAC-SHA256(password, caller_salt, 100 000) → 32 bytes         │
//! │                                                                         │
//! │  Session key (never leaves client)                                     │
//! │  ─────────────────────────────────                                      │
//! │  PBKDF2-HMAC-SHA256(                                                   │
//! │    password,                                                           │
//! │    salt = caller_salt ‖ "messenger-session-key-v1",                    │
//! │    iterations = 100 000,                                               │
//! │  ) → 32-byte AES-256-GCM key                                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Considerations
//!
//! | Aspect | Design Choice |
//! |--------|---------------|
//! | KDF Algorithm | PBKDF2-HMAC-SHA256 |
//! | Work factor | 100 000 iterations |
//! | Salt | 128 bits, OS RNG |
//! | Key Separation | Session key salt carries a purpose label |

use hmac::Hmac;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::encoding;
use super::encryption::EncryptionKey;
use super::params::{KEY_SIZE, SALT_SIZE};
use crate::error::{Error, Result};

/// Domain separation labels for password-derived secrets
///
/// The login hash uses the bare salt so servers can verify it as plain
/// PBKDF2. Every other secret derived from the same `(password, salt)` gets
/// a label, which keeps it independent of the hash.
pub mod domain {
    /// Label for the symmetric session key
    pub const SESSION_KEY: &[u8] = b"messenger-session-key-v1";
}

/// A 128-bit random salt
///
/// Salts are not secret. They are persisted by the caller next to whatever
/// they salted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Generate a fresh salt from the OS random source
    pub fn generate() -> Result<Self> {
        Ok(Self(super::random_bytes()?))
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }

    /// Encode as standard base64
    pub fn to_base64(&self) -> String {
        encoding::to_base64(&self.0)
    }

    /// Decode from standard base64; must be exactly 16 bytes
    pub fn from_base64(text: &str) -> Result<Self> {
        let bytes = encoding::from_base64(text)
            .ok_or_else(|| Error::InvalidKeyFormat("Salt is not valid base64".into()))?;

        let bytes: [u8; SALT_SIZE] = bytes.try_into().map_err(|v: Vec<u8>| {
            Error::InvalidKeyFormat(format!(
                "Salt must be {} bytes, got {}",
                SALT_SIZE,
                v.len()
            ))
        })?;

        Ok(Self(bytes))
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Salt::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

/// Derive a 256-bit key from a password with PBKDF2-HMAC-SHA256
///
/// ## Parameters
///
/// - `password`: UTF-8 password, used as-is (no normalisation)
/// - `salt`: Raw salt bytes
/// - `iterations`: PBKDF2 round count
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Result<EncryptionKey> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);

    pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, iterations, &mut key[..])
        .map_err(|e| Error::KeyGeneration(format!("PBKDF2 derivation failed: {}", e)))?;

    Ok(EncryptionKey::from_bytes(*key))
}

/// Derive a purpose-bound key from a password and a caller-managed salt
///
/// The label is appended to the salt, so the same `(password, salt)` yields
/// unrelated keys for unrelated purposes.
pub fn derive_labelled_key(
    password: &str,
    salt: &Salt,
    label: &[u8],
    iterations: u32,
) -> Result<EncryptionKey> {
    let mut labelled = Vec::with_capacity(SALT_SIZE + label.len());
    labelled.extend_from_slice(salt.as_bytes());
    labelled.extend_from_slice(label);

    derive_key(password, &labelled, iterations)
}

// ============================================================================
// TESTS
// ============================================================================
