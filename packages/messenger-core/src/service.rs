//! # Crypto Service
//!
//! Async facade over the identity, envelope, message and credential
//! operations.
//!
//! ## Execution Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ASYNC BOUNDARY                                     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  caller task                       tokio blocking pool                 │
//! │  ───────────                       ───────────────────                  │
//! │  service.encrypt(..).await ──────► RSA / PBKDF2 / AES-GCM              │
//! │        (suspended)                        │                             │
//! │  ◄──────────────────────────────── Result<T>                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `CryptoService` holds only its `CipherSuite`, which is `Copy`. There are
//! no locks, no caches and no key material kept between calls, so any
//! number of calls can be in flight at once.
//!
//! ## Example
//!
//! ```ignore
//! let service = CryptoService::new();
//! let enrolled = service.generate_identity("hallo123").await?;
//! let ct = service.encrypt("testText", &enrolled.public_key).await?;
//! let key = service.unwrap(&enrolled.wrapped_private_key.encode(), "hallo123").await?;
//! assert_eq!(service.decrypt(&ct, &key).await?, "testText");
//! ```

use crate::credentials::{self, LoginCredential};
use crate::crypto::{self, CipherSuite, PortablePublicKey, PrivateKey, Salt};
use crate::error::{Error, Result};
use crate::identity::{self, EnrolledIdentity, WrappedPrivateKey};

/// Zero-state handle exposing every operation as an async method
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CryptoService {
    suite: CipherSuite,
}

impl CryptoService {
    /// Service using the default cipher suite
    pub fn new() -> Self {
        Self::default()
    }

    /// Service using an explicit cipher suite
    pub fn with_suite(suite: CipherSuite) -> Self {
        Self { suite }
    }

    /// The suite new keys, envelopes and hashes are created with
    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    // ========================================================================
    // IDENTITY
    // ========================================================================

    /// Generate an identity and wrap its private key under `password`
    pub async fn generate_identity(&self, password: &str) -> Result<EnrolledIdentity> {
        let suite = self.suite;
        let password = password.to_owned();

        run_blocking(
            move || identity::generate_identity(&password, suite),
            Error::KeyGeneration,
        )
        .await
    }

    /// Seal a private key under a password
    pub async fn wrap(&self, private_key: &PrivateKey, password: &str) -> Result<WrappedPrivateKey> {
        let private_key = private_key.clone();
        let password = password.to_owned();

        run_blocking(
            move || identity::wrap_private_key(&private_key, &password),
            Error::KeyGeneration,
        )
        .await
    }

    /// Open a portable wrapped key with a password
    pub async fn unwrap(&self, wrapped: &str, password: &str) -> Result<PrivateKey> {
        let wrapped = wrapped.to_owned();
        let password = password.to_owned();

        run_blocking(
            move || identity::unwrap_private_key(&wrapped, &password),
            |_| Error::AuthenticationFailure,
        )
        .await
    }

    // ========================================================================
    // MESSAGES
    // ========================================================================

    /// Encrypt a message to a recipient's public key
    pub async fn encrypt(&self, plaintext: &str, public_key: &PortablePublicKey) -> Result<String> {
        let suite = self.suite;
        let plaintext = plaintext.to_owned();
        let public_key = public_key.clone();

        run_blocking(
            move || crypto::encrypt_message(&plaintext, &public_key, suite),
            Error::KeyGeneration,
        )
        .await
    }

    /// Decrypt a message with our private key
    pub async fn decrypt(&self, ciphertext: &str, private_key: &PrivateKey) -> Result<String> {
        let ciphertext = ciphertext.to_owned();
        let private_key = private_key.clone();

        run_blocking(
            move || crypto::decrypt_message(&ciphertext, &private_key),
            Error::DecryptionFailure,
        )
        .await
    }

    /// Unwrap the stored private key and decrypt a message in one call
    pub async fn decrypt_with_wrapped_key(
        &self,
        ciphertext: &str,
        wrapped: &str,
        password: &str,
    ) -> Result<String> {
        let ciphertext = ciphertext.to_owned();
        let wrapped = wrapped.to_owned();
        let password = password.to_owned();

        run_blocking(
            move || identity::decrypt_with_wrapped_key(&ciphertext, &wrapped, &password),
            Error::DecryptionFailure,
        )
        .await
    }

    // ========================================================================
    // CREDENTIALS
    // ========================================================================

    /// Derive a login credential; `salt = None` enrolls with a fresh salt
    pub async fn derive_login_credential(
        &self,
        password: &str,
        salt: Option<Salt>,
    ) -> Result<LoginCredential> {
        let suite = self.suite;
        let password = password.to_owned();

        run_blocking(
            move || credentials::derive_login_credential(&password, salt, suite),
            Error::KeyGeneration,
        )
        .await
    }

    /// Check a password against a stored credential
    pub async fn verify_login_credential(
        &self,
        password: &str,
        stored: &LoginCredential,
    ) -> Result<bool> {
        let suite = self.suite;
        let password = password.to_owned();
        let stored = stored.clone();

        run_blocking(
            move || credentials::verify_login_credential(&password, &stored, suite),
            Error::KeyGeneration,
        )
        .await
    }

    /// Encrypt text under a key derived from `(password, salt)`
    pub async fn encrypt_with_password(
        &self,
        password: &str,
        salt: &Salt,
        text: &str,
    ) -> Result<String> {
        let suite = self.suite;
        let password = password.to_owned();
        let salt = *salt;
        let text = text.to_owned();

        run_blocking(
            move || credentials::encrypt_with_password(&password, &salt, &text, suite),
            Error::KeyGeneration,
        )
        .await
    }

    /// Decrypt text produced by [`CryptoService::encrypt_with_password`]
    pub async fn decrypt_with_password(
        &self,
        password: &str,
        salt: &Salt,
        ciphertext: &str,
    ) -> Result<String> {
        let suite = self.suite;
        let password = password.to_owned();
        let salt = *salt;
        let ciphertext = ciphertext.to_owned();

        run_blocking(
            move || credentials::decrypt_with_password(&password, &salt, &ciphertext, suite),
            |_| Error::AuthenticationFailure,
        )
        .await
    }
}

/// Run a blocking primitive on tokio's blocking pool
///
/// A worker that panics or is cancelled is reported through `on_abort`, so
/// each operation still fails with one of its own error kinds. This needs
/// `panic = "unwind"`; under `abort` a panicking worker ends the process.
async fn run_blocking<T, F>(f: F, on_abort: fn(String) -> Error) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(join_error) => {
            tracing::warn!("Crypto worker aborted: {}", join_error);
            Err(on_abort(format!("Crypto worker aborted: {}", join_error)))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
