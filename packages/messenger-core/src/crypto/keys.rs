//! # Key Management
//!
//! RSA-OAEP identity keys and their portable forms.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  IdentityKeyPair (RSA-OAEP, 4096-bit, SHA-256, e = 65537)      │   │
//! │  │  ───────────────────────────────────────────────────────        │   │
//! │  │                                                                  │   │
//! │  │  ┌─────────────────────┐      ┌──────────────────────────┐     │   │
//! │  │  │ PortablePublicKey   │      │ PrivateKey               │     │   │
//! │  │  │                     │      │                          │     │   │
//! │  │  │ • JWK text          │      │ • Native handle only     │     │   │
//! │  │  │ • Safe to publish   │      │ • Zeroized on drop       │     │   │
//! │  │  │ • Encrypt messages  │      │ • Persisted only wrapped │     │   │
//! │  │  └─────────────────────┘      └──────────────────────────┘     │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Portable Public Key (JWK)
//!
//! ```text
//! {"alg":"RSA-OAEP-256","e":"AQAB","ext":true,"key_ops":["encrypt"],"kty":"RSA","n":"…"}
//! ```
//!
//! `n` and `e` are unpadded base64url big-endian integers. Member order is
//! fixed, so exporting an imported key reproduces the input byte for byte.

use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::encoding;
use super::params::CipherSuite;
use crate::error::{Error, Result};

/// JWK `kty` for RSA keys
const JWK_KTY_RSA: &str = "RSA";

/// JWK `key_ops` for a public encryption key
const JWK_OPS_ENCRYPT: &str = "encrypt";

/// JSON Web Key members of an RSA public key, in serialisation order
#[derive(Debug, Serialize, Deserialize)]
struct RsaPublicJwk {
    alg: String,
    e: String,
    ext: bool,
    key_ops: Vec<String>,
    kty: String,
    n: String,
}

/// Public half of an identity, in portable textual form
///
/// Immutable once produced. Safe to transmit and store in plaintext.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortablePublicKey(String);

impl PortablePublicKey {
    /// Export an RSA public key to its JWK text
    pub fn export(key: &RsaPublicKey, suite: CipherSuite) -> Result<Self> {
        let jwk = RsaPublicJwk {
            alg: suite.jwk_alg().to_string(),
            e: encoding::to_base64url(&key.e().to_bytes_be()),
            ext: true,
            key_ops: vec![JWK_OPS_ENCRYPT.to_string()],
            kty: JWK_KTY_RSA.to_string(),
            n: encoding::to_base64url(&key.n().to_bytes_be()),
        };

        serde_json::to_string(&jwk)
            .map(Self)
            .map_err(|e| Error::InvalidKeyFormat(format!("JWK serialization failed: {}", e)))
    }

    /// Wrap a string received from elsewhere
    ///
    /// No validation happens here; [`PortablePublicKey::import`] reports a
    /// malformed key when it is first used.
    pub fn from_jwk(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The JWK text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Import into a native RSA public key
    ///
    /// ## Errors
    ///
    /// `InvalidKeyFormat` if the text is not an RSA JWK for this suite, or
    /// its modulus size or public exponent differ from the suite's.
    pub fn import(&self, suite: CipherSuite) -> Result<RsaPublicKey> {
        let jwk: RsaPublicJwk = serde_json::from_str(&self.0)
            .map_err(|e| Error::InvalidKeyFormat(format!("Not a JWK: {}", e)))?;

        if jwk.kty != JWK_KTY_RSA {
            return Err(Error::InvalidKeyFormat(format!(
                "Unsupported key type: {}",
                jwk.kty
            )));
        }
        if jwk.alg != suite.jwk_alg() {
            return Err(Error::InvalidKeyFormat(format!(
                "Unsupported algorithm: {}",
                jwk.alg
            )));
        }

        let n = encoding::from_base64url(&jwk.n)
            .ok_or_else(|| Error::InvalidKeyFormat("Modulus is not base64url".into()))?;
        let e = encoding::from_base64url(&jwk.e)
            .ok_or_else(|| Error::InvalidKeyFormat("Exponent is not base64url".into()))?;

        let key = RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
            .map_err(|e| Error::InvalidKeyFormat(format!("Invalid RSA public key: {}", e)))?;

        if key.n().bits() != suite.rsa_modulus_bits() {
            return Err(Error::InvalidKeyFormat(format!(
                "Modulus must be {} bits, got {}",
                suite.rsa_modulus_bits(),
                key.n().bits()
            )));
        }
        if *key.e() != BigUint::from(suite.rsa_public_exponent()) {
            return Err(Error::InvalidKeyFormat(format!(
                "Public exponent must be {}",
                suite.rsa_public_exponent()
            )));
        }

        Ok(key)
    }
}

impl std::fmt::Display for PortablePublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Native private key handle
///
/// Never serialized directly: the only persisted form is a
/// [`WrappedPrivateKey`](crate::identity::WrappedPrivateKey). The inner RSA
/// key zeroizes its own limbs on drop.
#[derive(Clone)]
pub struct PrivateKey {
    inner: RsaPrivateKey,
    suite: CipherSuite,
}

impl PrivateKey {
    /// Generate a fresh RSA key for the given suite
    pub fn generate(suite: CipherSuite) -> Result<Self> {
        let exponent = BigUint::from(suite.rsa_public_exponent());
        let inner = RsaPrivateKey::new_with_exp(&mut OsRng, suite.rsa_modulus_bits(), &exponent)
            .map_err(|e| Error::KeyGeneration(format!("RSA key generation failed: {}", e)))?;

        Ok(Self { inner, suite })
    }

    /// The suite this key belongs to
    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// Export the matching public key
    pub fn public_key(&self) -> Result<PortablePublicKey> {
        PortablePublicKey::export(&self.inner.to_public_key(), self.suite)
    }

    /// Raw representation (PKCS#8 DER) for sealing inside an envelope
    ///
    /// ## Security Warning
    ///
    /// Only the envelope codec should call this. Never log or transmit these
    /// bytes.
    pub(crate) fn to_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let document = self
            .inner
            .to_pkcs8_der()
            .map_err(|e| Error::KeyGeneration(format!("PKCS#8 encoding failed: {}", e)))?;

        Ok(Zeroizing::new(document.as_bytes().to_vec()))
    }

    /// Rebuild a key handle from its PKCS#8 DER representation
    pub(crate) fn from_der(der: &[u8], suite: CipherSuite) -> Result<Self> {
        let inner = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| Error::InvalidKeyFormat(format!("Invalid private key: {}", e)))?;

        if inner.n().bits() != suite.rsa_modulus_bits() {
            return Err(Error::InvalidKeyFormat(format!(
                "Modulus must be {} bits, got {}",
                suite.rsa_modulus_bits(),
                inner.n().bits()
            )));
        }

        Ok(Self { inner, suite })
    }

    pub(crate) fn rsa(&self) -> &RsaPrivateKey {
        &self.inner
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("suite", &self.suite)
            .finish_non_exhaustive()
    }
}

/// A freshly generated identity: portable public key plus native private key
#[derive(Clone, Debug)]
pub struct IdentityKeyPair {
    /// Public half, ready to publish
    pub public_key: PortablePublicKey,
    /// Private half, native handle only
    pub private_key: PrivateKey,
}

impl IdentityKeyPair {
    /// Generate a new random identity key pair
    ///
    /// Uses the operating system's secure random number generator. This is
    /// CPU-heavy (4096-bit prime search); async callers should go through
    /// [`CryptoService`](crate::service::CryptoService).
    pub fn generate(suite: CipherSuite) -> Result<Self> {
        let private_key = PrivateKey::generate(suite)?;
        let public_key = private_key.public_key()?;

        Ok(Self {
            public_key,
            private_key,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
