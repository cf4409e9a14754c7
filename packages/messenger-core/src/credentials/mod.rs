//! # Credentials Module
//!
//! Password-derived secrets for login and session data. Never touches the
//! asymmetric identity keys.
//!
//! ## Login Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           LOGIN                                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Enrollment                          Verification                      │
//! │  ──────────                          ────────────                       │
//! │  salt ← OsRng (16 bytes)             salt ← stored                     │
//! │  hash ← PBKDF2(pw, salt)             hash' ← PBKDF2(pw, salt)          │
//! │  persist {hash, salt}                hash' == hash  (constant time)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Session Data
//!
//! ```text
//! key  ← PBKDF2(pw, salt‖session)      (never persisted, rebuilt per call)
//! text ─AES-256-GCM(key, fresh nonce)─► base64(nonce ‖ ciphertext ‖ tag)
//! ```
//!
//! The salt is reused across calls (it was fixed at enrollment). The nonce
//! is not: every encryption draws a new one.
//!
//! Salts passed to the session functions are opaque caller-managed values.
//! Nothing checks that they came from [`derive_login_credential`].

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::crypto::{
    decrypt_packed, derive_key, derive_labelled_key, domain, encoding, encrypt_packed,
    CipherSuite, Salt,
};
use crate::error::{Error, Result};

/// Stored login secret: `{hash, salt}`
///
/// The hash is deterministic in `(password, salt)` and is never reversed.
/// Equality is constant-time.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginCredential {
    #[serde(with = "crate::crypto::encoding::base64_bytes")]
    hash: Vec<u8>,
    salt: Salt,
}

impl LoginCredential {
    /// Create from stored parts
    pub fn from_parts(hash: Vec<u8>, salt: Salt) -> Self {
        Self { hash, salt }
    }

    /// Derived hash bytes
    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    /// Derived hash as base64 (what a client sends to the server)
    pub fn hash_base64(&self) -> String {
        encoding::to_base64(&self.hash)
    }

    /// Salt used for the derivation
    pub fn salt(&self) -> &Salt {
        &self.salt
    }
}

impl PartialEq for LoginCredential {
    fn eq(&self, other: &Self) -> bool {
        self.salt == other.salt && bool::from(self.hash.ct_eq(&other.hash))
    }
}

impl Eq for LoginCredential {}

impl std::fmt::Debug for LoginCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredential")
            .field("salt", &self.salt.to_base64())
            .finish_non_exhaustive()
    }
}

/// Derive a login credential
///
/// - `salt = None`: enrollment, a fresh salt is generated
/// - `salt = Some(_)`: verification, the stored salt is reused
///
/// The hash is plain PBKDF2-HMAC-SHA256 over `(password, salt)`, so a server
/// can check it without knowing anything about this crate.
pub fn derive_login_credential(
    password: &str,
    salt: Option<Salt>,
    suite: CipherSuite,
) -> Result<LoginCredential> {
    let salt = match salt {
        Some(salt) => salt,
        None => {
            tracing::debug!("Enrolling new login credential");
            Salt::generate()?
        }
    };

    let key = derive_key(password, salt.as_bytes(), suite.pbkdf2_iterations())?;

    Ok(LoginCredential {
        hash: key.as_bytes().to_vec(),
        salt,
    })
}

/// Check a password against a stored credential in constant time
pub fn verify_login_credential(
    password: &str,
    stored: &LoginCredential,
    suite: CipherSuite,
) -> Result<bool> {
    let candidate = derive_login_credential(password, Some(stored.salt), suite)?;
    let matches = bool::from(candidate.hash.ct_eq(&stored.hash));

    if !matches {
        tracing::debug!("Login credential mismatch");
    }

    Ok(matches)
}

/// Encrypt text under a key derived from `(password, salt)`
///
/// Returns `base64(nonce ‖ ciphertext ‖ tag)`.
pub fn encrypt_with_password(
    password: &str,
    salt: &Salt,
    text: &str,
    suite: CipherSuite,
) -> Result<String> {
    let key = derive_labelled_key(password, salt, domain::SESSION_KEY, suite.pbkdf2_iterations())?;
    encrypt_packed(&key, text.as_bytes())
}

/// Decrypt text produced by [`encrypt_with_password`]
///
/// ## Errors
///
/// - `AuthenticationFailure` on a wrong password/salt, tampered or malformed
///   ciphertext
/// - `DecryptionFailure` if the authenticated plaintext is not UTF-8
pub fn decrypt_with_password(
    password: &str,
    salt: &Salt,
    ciphertext: &str,
    suite: CipherSuite,
) -> Result<String> {
    let key = derive_labelled_key(password, salt, domain::SESSION_KEY, suite.pbkdf2_iterations())?;
    let plaintext = decrypt_packed(&key, ciphertext)?;

    String::from_utf8(plaintext.to_vec())
        .map_err(|_| Error::DecryptionFailure("Plaintext is not valid UTF-8".into()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{EncryptionKey, KEY_SIZE, NONCE_SIZE, SALT_SIZE};

    const SUITE: CipherSuite = CipherSuite::V1;

    #[test]
    fn test_enroll_then_verify() {
        let enrolled = derive_login_credential("hallo123", None, SUITE).unwrap();
        let again = derive_login_credential("hallo123", Some(*enrolled.salt()), SUITE).unwrap();

        assert_eq!(enrolled.hash().len(), KEY_SIZE);
        assert_eq!(again.hash(), enrolled.hash());
        assert_eq!(again, enrolled);
        assert!(verify_login_credential("hallo123", &enrolled, SUITE).unwrap());
        assert!(!verify_login_credential("hallo1234", &enrolled, SUITE).unwrap());
    }

    #[test]
    fn test_login_hash_is_plain_pbkdf2() {
        let salt = Salt::from_bytes([7u8; SALT_SIZE]);

        let credential = derive_login_credential("hallo123", Some(salt), SUITE).unwrap();
        let expected = derive_key("hallo123", salt.as_bytes(), 100_000).unwrap();

        assert_eq!(credential.hash(), &expected.as_bytes()[..]);
    }

    #[test]
    fn test_stored_credential_verifies() {
        let enrolled = derive_login_credential("hallo123", None, SUITE).unwrap();

        // What a caller would load back from storage
        let hash = encoding::from_base64(&enrolled.hash_base64()).unwrap();
        let salt = Salt::from_base64(&enrolled.salt().to_base64()).unwrap();
        let stored = LoginCredential::from_parts(hash, salt);

        assert_eq!(stored, enrolled);
        assert!(verify_login_credential("hallo123", &stored, SUITE).unwrap());
        assert!(!verify_login_credential("hallo12", &stored, SUITE).unwrap());
    }

    #[test]
    fn test_salt_sensitivity() {
        let s1 = Salt::from_bytes([1u8; SALT_SIZE]);
        let s2 = Salt::from_bytes([2u8; SALT_SIZE]);

        let c1 = derive_login_credential("hallo123", Some(s1), SUITE).unwrap();
        let c2 = derive_login_credential("hallo123", Some(s2), SUITE).unwrap();

        assert_ne!(c1.hash(), c2.hash());
    }

    #[test]
    fn test_enrollment_salts_are_fresh() {
        let c1 = derive_login_credential("hallo123", None, SUITE).unwrap();
        let c2 = derive_login_credential("hallo123", None, SUITE).unwrap();

        assert_ne!(c1.salt(), c2.salt());
        assert_ne!(c1.hash(), c2.hash());
    }

    #[test]
    fn test_login_hash_is_not_session_key() {
        let salt = Salt::from_bytes([5u8; SALT_SIZE]);
        let credential = derive_login_credential("hallo123", Some(salt), SUITE).unwrap();

        // Someone holding only the login hash cannot open session data
        let ct = encrypt_with_password("hallo123", &salt, "secret", SUITE).unwrap();
        let mut hash = [0u8; KEY_SIZE];
        hash.copy_from_slice(credential.hash());
        let as_key = EncryptionKey::from_bytes(hash);

        assert_eq!(
            decrypt_packed(&as_key, &ct).unwrap_err(),
            Error::AuthenticationFailure
        );
    }

    #[test]
    fn test_credential_serde() {
        let credential = derive_login_credential("hallo123", None, SUITE).unwrap();

        let json = serde_json::to_string(&credential).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["hash"], credential.hash_base64());
        assert_eq!(value["salt"], credential.salt().to_base64());

        let restored: LoginCredential = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, credential);
    }

    #[test]
    fn test_debug_hides_hash() {
        let credential = derive_login_credential("pw", None, SUITE).unwrap();
        let debug = format!("{:?}", credential);
        assert!(!debug.contains(&credential.hash_base64()));
    }

    #[test]
    fn test_password_round_trip() {
        let salt = Salt::generate().unwrap();

        for text in ["testText", "", "émoji 🚀 and ünïcödé"] {
            let ct = encrypt_with_password("hallo123", &salt, text, SUITE).unwrap();
            assert_eq!(
                decrypt_with_password("hallo123", &salt, &ct, SUITE).unwrap(),
                text
            );
        }
    }

    #[test]
    fn test_password_encryption_uses_fresh_nonces() {
        let salt = Salt::generate().unwrap();

        let c1 = encrypt_with_password("hallo123", &salt, "testText", SUITE).unwrap();
        let c2 = encrypt_with_password("hallo123", &salt, "testText", SUITE).unwrap();
        assert_ne!(c1, c2);

        let b1 = encoding::from_base64(&c1).unwrap();
        let b2 = encoding::from_base64(&c2).unwrap();
        assert_ne!(b1[..NONCE_SIZE], b2[..NONCE_SIZE]);
    }

    #[test]
    fn test_password_decrypt_failures() {
        let salt = Salt::generate().unwrap();
        let other_salt = Salt::generate().unwrap();
        let ct = encrypt_with_password("hallo123", &salt, "testText", SUITE).unwrap();

        assert_eq!(
            decrypt_with_password("wrong", &salt, &ct, SUITE).unwrap_err(),
            Error::AuthenticationFailure
        );
        assert_eq!(
            decrypt_with_password("hallo123", &other_salt, &ct, SUITE).unwrap_err(),
            Error::AuthenticationFailure
        );
        assert_eq!(
            decrypt_with_password("hallo123", &salt, "garbage!", SUITE).unwrap_err(),
            Error::AuthenticationFailure
        );

        let mut bytes = encoding::from_base64(&ct).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x80;
        assert_eq!(
            decrypt_with_password("hallo123", &salt, &encoding::to_base64(&bytes), SUITE)
                .unwrap_err(),
            Error::AuthenticationFailure
        );
    }

    #[test]
    fn test_non_utf8_plaintext_is_decryption_failure() {
        let salt = Salt::generate().unwrap();
        let key = derive_labelled_key("pw", &salt, domain::SESSION_KEY, SUITE.pbkdf2_iterations())
            .unwrap();
        let ct = encrypt_packed(&key, &[0xFF, 0xFE, 0xFD]).unwrap();

        assert!(matches!(
            decrypt_with_password("pw", &salt, &ct, SUITE),
            Err(Error::DecryptionFailure(_))
        ));
    }
}
