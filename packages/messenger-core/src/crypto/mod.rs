//! # Cryptography Module
//!
//! All cryptographic primitives used by Messenger Core.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    IDENTITY                                     │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  RSA-OAEP key pair (4096-bit, SHA-256, e = 65537)              │   │
//! │  │        │                               │                        │   │
//! │  │        ▼                               ▼                        │   │
//! │  │  Public key → JWK text        Private key → PKCS#8 DER         │   │
//! │  │  (published)                         │                          │   │
//! │  │                                      ▼                          │   │
//! │  │                     AES-256-GCM under PBKDF2(password, salt)    │   │
//! │  │                                      │                          │   │
//! │  │                                      ▼                          │   │
//! │  │                        WrappedPrivateKey (base64)              │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 MESSAGE ENCRYPTION                              │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  RSA-OAEP/SHA-256 directly over the UTF-8 text                 │   │
//! │  │  • ≤ 446 bytes per message                                     │   │
//! │  │  • Randomised padding: same text, different ciphertext         │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 PASSWORD SECRETS                                │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  PBKDF2-HMAC-SHA256 × 100 000                                  │   │
//! │  │  • Login hash (deterministic in password + salt)               │   │
//! │  │  • Session key for AES-256-GCM text encryption                 │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: Derived AES keys and recovered private key bytes
//!    are zeroized when dropped
//! 2. **Constant-Time Comparison**: Login hashes are compared with `subtle`
//! 3. **Secure Random**: `rand::rngs::OsRng` for every salt, nonce and key
//! 4. **No Nonce Reuse**: Every seal draws a fresh nonce

pub mod encoding;
mod encryption;
mod kdf;
mod keys;
mod message;
pub mod params;

pub use encryption::{decrypt, decrypt_packed, encrypt, encrypt_packed, EncryptionKey, Nonce};
pub use kdf::{derive_key, derive_labelled_key, domain, Salt};
pub use keys::{IdentityKeyPair, PortablePublicKey, PrivateKey};
pub use message::{decrypt_message, encrypt_message};
pub use params::{CipherSuite, KEY_SIZE, NONCE_SIZE, SALT_SIZE, TAG_SIZE};

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Error, Result};

/// Fill a fixed-size buffer from the OS random source
///
/// Fails with `KeyGeneration` instead of panicking when no entropy is
/// available.
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::KeyGeneration(format!("Secure random source unavailable: {}", e)))?;
    Ok(bytes)
}
