//! # Private Key Envelope
//!
//! Seals the private identity key under a password so it can be stored on
//! an untrusted medium.
//!
//! ## Wrapping Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         WRAP                                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. salt ← OsRng (16 bytes)                                            │
//! │  2. key  ← PBKDF2-HMAC-SHA256(password, salt, 100 000) (32 bytes)      │
//! │  3. iv   ← OsRng (12 bytes)                                            │
//! │  4. ct   ← AES-256-GCM(key, iv, PKCS#8-DER(private key), aad = ∅)      │
//! │  5. blob ← base64(tag ‖ salt ‖ iterations ‖ iv ‖ ct)                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Binary Layout
//!
//! ```text
//! ┌───────┬────────────┬──────────────────┬──────────┬─────────────────────┐
//! │ suite │ salt (16)  │ iterations (u32) │ iv (12)  │ ciphertext ‖ tag    │
//! │ (1)   │            │ big-endian       │          │ (DER len + 16)      │
//! └───────┴────────────┴──────────────────┴──────────┴─────────────────────┘
//! ```
//!
//! ## Failing Closed
//!
//! Every unwrap failure before the private key is parsed (bad base64, short
//! blob, unknown suite, out-of-range iterations, wrong password, tampered
//! bytes) is the same `AuthenticationFailure`. Structurally invalid blobs
//! still pay for a full key derivation, so they cost the same as a wrong
//! password.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::params::MAX_PBKDF2_ITERATIONS;
use crate::crypto::{
    decrypt, derive_key, encoding, encrypt, CipherSuite, Nonce, PrivateKey, Salt, NONCE_SIZE,
    SALT_SIZE, TAG_SIZE,
};
use crate::error::{Error, Result};

/// Bytes before the ciphertext: suite tag, salt, iterations, iv
const HEADER_LEN: usize = 1 + SALT_SIZE + 4 + NONCE_SIZE;

/// A private key sealed under a password-derived key
///
/// This is the only persisted representation of a private key.
#[derive(Clone, PartialEq, Eq)]
pub struct WrappedPrivateKey {
    suite: CipherSuite,
    salt: Salt,
    iterations: u32,
    iv: Nonce,
    ciphertext: Vec<u8>,
}

impl WrappedPrivateKey {
    /// Suite that produced this envelope
    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// Per-wrap random salt
    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// PBKDF2 iteration count used for this envelope
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// AES-GCM nonce used for this envelope
    pub fn iv(&self) -> &Nonce {
        &self.iv
    }

    /// Encode as one portable base64 string
    pub fn encode(&self) -> String {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        bytes.push(self.suite.tag());
        bytes.extend_from_slice(self.salt.as_bytes());
        bytes.extend_from_slice(&self.iterations.to_be_bytes());
        bytes.extend_from_slice(self.iv.as_bytes());
        bytes.extend_from_slice(&self.ciphertext);

        encoding::to_base64(&bytes)
    }

    /// Decode the portable string
    ///
    /// Any structural problem is reported as `AuthenticationFailure`, the
    /// same kind a wrong password produces.
    pub fn decode(text: &str) -> Result<Self> {
        let bytes = encoding::from_base64(text).ok_or(Error::AuthenticationFailure)?;
        if bytes.len() < HEADER_LEN + TAG_SIZE {
            return Err(Error::AuthenticationFailure);
        }

        let (header, ciphertext) = bytes.split_at(HEADER_LEN);
        let (tag, rest) = header.split_at(1);
        let (salt, rest) = rest.split_at(SALT_SIZE);
        let (iterations, iv) = rest.split_at(4);

        let suite = CipherSuite::from_tag(tag[0]).ok_or(Error::AuthenticationFailure)?;
        let salt: [u8; SALT_SIZE] = salt.try_into().map_err(|_| Error::AuthenticationFailure)?;
        let iterations: [u8; 4] = iterations
            .try_into()
            .map_err(|_| Error::AuthenticationFailure)?;
        let iv: [u8; NONCE_SIZE] = iv.try_into().map_err(|_| Error::AuthenticationFailure)?;

        let iterations = u32::from_be_bytes(iterations);
        if iterations == 0 || iterations > MAX_PBKDF2_ITERATIONS {
            return Err(Error::AuthenticationFailure);
        }

        Ok(Self {
            suite,
            salt: Salt::from_bytes(salt),
            iterations,
            iv: Nonce::from_bytes(iv),
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Open the envelope with a password
    ///
    /// ## Errors
    ///
    /// - `AuthenticationFailure` on a wrong password or tampered envelope
    /// - `InvalidKeyFormat` if the authenticated contents are not a key for
    ///   this suite
    pub fn open(&self, password: &str) -> Result<PrivateKey> {
        let key = derive_key(password, self.salt.as_bytes(), self.iterations)?;
        let der = decrypt(&key, &self.iv, &self.ciphertext, &[])?;

        PrivateKey::from_der(&der, self.suite)
    }
}

impl std::fmt::Debug for WrappedPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappedPrivateKey")
            .field("suite", &self.suite)
            .field("iterations", &self.iterations)
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for WrappedPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl std::str::FromStr for WrappedPrivateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl Serialize for WrappedPrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for WrappedPrivateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Seal a private key under a password
///
/// Draws a fresh salt and nonce on every call, so wrapping the same key
/// twice never yields the same blob.
pub fn wrap_private_key(private_key: &PrivateKey, password: &str) -> Result<WrappedPrivateKey> {
    let suite = private_key.suite();
    let salt = Salt::generate()?;
    let iterations = suite.pbkdf2_iterations();

    let key = derive_key(password, salt.as_bytes(), iterations)?;
    let der = private_key.to_der()?;
    let (iv, ciphertext) = encrypt(&key, &der, &[])?;

    tracing::debug!(
        "Wrapped private key ({:?}, {} iterations, {} bytes)",
        suite,
        iterations,
        ciphertext.len()
    );

    Ok(WrappedPrivateKey {
        suite,
        salt,
        iterations,
        iv,
        ciphertext,
    })
}

/// Decode a portable wrapped key and open it with a password
///
/// See the module docs for why malformed input costs a full derivation.
pub fn unwrap_private_key(wrapped: &str, password: &str) -> Result<PrivateKey> {
    let envelope = match WrappedPrivateKey::decode(wrapped) {
        Ok(envelope) => envelope,
        Err(err) => {
            let suite = CipherSuite::default();
            let _ = derive_key(password, &[0u8; SALT_SIZE], suite.pbkdf2_iterations());
            tracing::debug!("Private key unwrap rejected");
            return Err(err);
        }
    };

    envelope.open(password).map_err(|err| {
        tracing::debug!("Private key unwrap rejected");
        err
    })
}

// ============================================================================
// TESTS
// ============================================================================
