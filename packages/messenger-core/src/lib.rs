//! # Messenger Core
//!
//! Client-side cryptography for a peer-to-peer chat application: identity
//! key pairs, password-protected key storage, message encryption and
//! password-derived login credentials.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       MESSENGER CORE MODULES                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │                        CryptoService (async)                      │ │
//! │  └──────┬──────────────────────┬──────────────────────────┬──────────┘ │
//! │         │                      │                          │            │
//! │  ┌──────▼──────┐        ┌──────▼──────┐           ┌───────▼──────┐     │
//! │  │  Identity   │        │  Messages   │           │ Credentials  │     │
//! │  │             │        │             │           │              │     │
//! │  │ - Generate  │        │ - Encrypt   │           │ - Login hash │     │
//! │  │ - Wrap      │        │ - Decrypt   │           │ - Verify     │     │
//! │  │ - Unwrap    │        │             │           │ - Session    │     │
//! │  └──────┬──────┘        └──────┬──────┘           └───────┬──────┘     │
//! │         │                      │                          │            │
//! │         └──────────────────────┼──────────────────────────┘            │
//! │                                ▼                                        │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │                            Crypto                                 │ │
//! │  │  RSA-OAEP · PBKDF2-HMAC-SHA256 · AES-256-GCM · base64 · JWK       │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`crypto`] - Primitives (RSA keys, PBKDF2, AES-GCM, encodings)
//! - [`identity`] - Identity creation and private key wrapping
//! - [`credentials`] - Login credentials and password-keyed text encryption
//! - [`service`] - Async facade over all of the above
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SECURITY LAYERS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Identity Keys (RSA-OAEP 4096, SHA-256)                                │
//! │  ──────────────────────────────────────                                 │
//! │  The public half is published as JWK text. The private half only       │
//! │  leaves memory sealed under the user's password.                       │
//! │                                                                         │
//! │  Key Wrapping (PBKDF2 × 100 000 + AES-256-GCM)                         │
//! │  ─────────────────────────────────────────────                          │
//! │  Fresh salt and nonce per wrap. A wrong password, a corrupted blob     │
//! │  and a truncated blob are indistinguishable to the caller.             │
//! │                                                                         │
//! │  Login Credentials                                                     │
//! │  ─────────────────                                                      │
//! │  The login hash is plain PBKDF2 over password and salt. The session-   │
//! │  data key uses the same salt extended by a purpose label, so the hash  │
//! │  a server sees never opens session data.                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use messenger_core::CryptoService;
//!
//! let service = CryptoService::new();
//! let enrolled = service.generate_identity("hallo123").await?;
//! let ct = service.encrypt("testText", &enrolled.public_key).await?;
//! let pt = service
//!     .decrypt_with_wrapped_key(&ct, &enrolled.wrapped_private_key.encode(), "hallo123")
//!     .await?;
//! assert_eq!(pt, "testText");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod credentials;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod service;

#[cfg(test)]
mod test_support;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use credentials::LoginCredential;
pub use crypto::{CipherSuite, IdentityKeyPair, PortablePublicKey, PrivateKey, Salt};
pub use error::{Error, Result};
pub use identity::{EnrolledIdentity, WrappedPrivateKey};
pub use service::CryptoService;

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Messenger Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_default_service_uses_default_suite() {
        assert_eq!(CryptoService::new().suite(), CipherSuite::default());
    }
}
