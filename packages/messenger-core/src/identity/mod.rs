//! # Identity Module
//!
//! Creates a user's asymmetric identity and protects its private half with
//! the user's password.
//!
//! ## Identity Creation Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      IDENTITY CREATION FLOW                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Step 1: Generate Key Pair                                             │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  RSA-OAEP, 4096-bit modulus, e = 65537, SHA-256             │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                  │                               │                      │
//! │                  ▼                               ▼                      │
//! │  Step 2: Export Public Key          Step 3: Wrap Private Key           │
//! │  ┌──────────────────────────┐       ┌──────────────────────────┐       │
//! │  │  JWK text                │       │  PBKDF2 + AES-256-GCM    │       │
//! │  │  (publish to contacts)   │       │  under the password      │       │
//! │  └──────────────────────────┘       └──────────────────────────┘       │
//! │                  │                               │                      │
//! │                  └───────────────┬───────────────┘                      │
//! │                                  ▼                                      │
//! │                        EnrolledIdentity                                 │
//! │           (both halves portable; caller persists them)                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The native private key handle never leaves this function unwrapped.

mod envelope;

pub use envelope::{unwrap_private_key, wrap_private_key, WrappedPrivateKey};

use serde::{Deserialize, Serialize};

use crate::crypto::{decrypt_message, CipherSuite, IdentityKeyPair, PortablePublicKey};
use crate::error::Result;

/// Portable result of identity creation
///
/// Contains no unprotected secret and can be handed to storage as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledIdentity {
    /// Public key, safe to publish
    pub public_key: PortablePublicKey,
    /// Private key sealed under the user's password
    pub wrapped_private_key: WrappedPrivateKey,
}

/// Generate a new identity and wrap its private key under `password`
///
/// ## Errors
///
/// `KeyGeneration` if the random source or RSA key generation fails.
pub fn generate_identity(password: &str, suite: CipherSuite) -> Result<EnrolledIdentity> {
    tracing::info!("Generating identity key pair ({:?})", suite);

    let keypair = IdentityKeyPair::generate(suite)?;
    let wrapped_private_key = wrap_private_key(&keypair.private_key, password)?;

    tracing::info!("Identity generated");

    Ok(EnrolledIdentity {
        public_key: keypair.public_key,
        wrapped_private_key,
    })
}

/// Decrypt a received message using the stored wrapped key and password
///
/// Unwraps then decrypts in one step; the unwrapped key is dropped before
/// returning.
pub fn decrypt_with_wrapped_key(ciphertext: &str, wrapped: &str, password: &str) -> Result<String> {
    let private_key = unwrap_private_key(wrapped, password)?;
    decrypt_message(ciphertext, &private_key)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::encrypt_message;
    use crate::error::Error;

    #[test]
    fn test_generate_identity_end_to_end() {
        let enrolled = generate_identity("hallo123", CipherSuite::V1).unwrap();

        let ct = encrypt_message("testText", &enrolled.public_key, CipherSuite::V1).unwrap();
        let wrapped = enrolled.wrapped_private_key.encode();

        assert_eq!(
            decrypt_with_wrapped_key(&ct, &wrapped, "hallo123").unwrap(),
            "testText"
        );
        assert_eq!(
            decrypt_with_wrapped_key(&ct, &wrapped, "hallo12").unwrap_err(),
            Error::AuthenticationFailure
        );

        // Unwrapped key re-derives the published public key
        let private_key = unwrap_private_key(&wrapped, "hallo123").unwrap();
        assert_eq!(private_key.public_key().unwrap(), enrolled.public_key);

        // Whole bundle survives a serde round trip
        let json = serde_json::to_string(&enrolled).unwrap();
        let restored: EnrolledIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, enrolled);
    }
}
