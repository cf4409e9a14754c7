//! # Error Handling
//!
//! Error types for Messenger Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── KeyGeneration          - Entropy or algorithm unavailable         │
//! │  ├── InvalidKeyFormat       - Portable key/salt could not be parsed    │
//! │  ├── AuthenticationFailure  - Wrong password OR tampered data          │
//! │  ├── PayloadTooLarge        - Message exceeds RSA-OAEP capacity        │
//! │  └── DecryptionFailure      - Any other decrypt failure                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failing Closed
//!
//! `AuthenticationFailure` carries no detail. A caller must not
//! be able to tell "wrong password" apart from "corrupted blob": both surface
//! as the same variant with the same message, and no partial plaintext is
//! ever returned.
//!
//! None of these errors are transient. Nothing in this crate retries.

use thiserror::Error;

/// Result type alias for Messenger Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Messenger Core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Key generation failed (random source or algorithm unavailable)
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// A portable key (or salt) string could not be parsed or imported
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Wrong password or tampered ciphertext
    #[error("Authentication failed: wrong password or corrupted data")]
    AuthenticationFailure,

    /// Plaintext exceeds what a single RSA-OAEP block can carry
    #[error("Payload too large: {len} bytes (maximum {max})")]
    PayloadTooLarge {
        /// Size of the rejected payload in bytes
        len: usize,
        /// Largest payload the key can encrypt
        max: usize,
    },

    /// Decryption failed for a reason other than authentication
    #[error("Decryption failed: {0}")]
    DecryptionFailure(String),
}

impl Error {
    /// Get the error code for FFI / UI mapping
    ///
    /// Codes sit in the 300 range reserved for crypto errors.
    pub fn code(&self) -> i32 {
        match self {
            Error::KeyGeneration(_) => 300,
            Error::InvalidKeyFormat(_) => 301,
            Error::AuthenticationFailure => 302,
            Error::PayloadTooLarge { .. } => 303,
            Error::DecryptionFailure(_) => 304,
        }
    }

    /// Whether the failure was caused by caller input rather than the
    /// environment
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Error::KeyGeneration(_))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::KeyGeneration("rng".into()).code(), 300);
        assert_eq!(Error::InvalidKeyFormat("jwk".into()).code(), 301);
        assert_eq!(Error::AuthenticationFailure.code(), 302);
        assert_eq!(Error::PayloadTooLarge { len: 500, max: 446 }.code(), 303);
        assert_eq!(Error::DecryptionFailure("oaep".into()).code(), 304);
    }

    #[test]
    fn test_authentication_failure_has_no_detail() {
        let msg = Error::AuthenticationFailure.to_string();
        assert!(!msg.contains("password is wrong"));
        assert!(msg.contains("wrong password or corrupted data"));
    }

    #[test]
    fn test_payload_too_large_message() {
        let err = Error::PayloadTooLarge { len: 500, max: 446 };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("446"));
    }

    #[test]
    fn test_caller_errors() {
        assert!(!Error::KeyGeneration("rng".into()).is_caller_error());
        assert!(Error::AuthenticationFailure.is_caller_error());
        assert!(Error::InvalidKeyFormat("x".into()).is_caller_error());
    }
}
