//! # Cipher Suites
//!
//! Every algorithm parameter used by this crate hangs off one tagged enum.
//! Adding a new parameter set means adding a variant, never a trait impl.
//!
//! | Suite | Identity keys | KDF | AEAD |
//! |-------|---------------|-----|------|
//! | `V1` | RSA-OAEP 4096, SHA-256, e = 65537 | PBKDF2-HMAC-SHA256 × 100 000 | AES-256-GCM |

use serde::{Deserialize, Serialize};

/// Size of every random salt in bytes (128 bits)
pub const SALT_SIZE: usize = 16;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of the AES-256 key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Upper bound on the iteration count accepted from a wrapped key.
///
/// The count travels inside the blob, so an unbounded value would let a
/// corrupted blob pin a CPU for hours.
pub const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;

/// SHA-256 output size, used by the OAEP capacity formula
const SHA256_OUTPUT_SIZE: usize = 32;

/// A complete set of algorithm parameters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherSuite {
    /// RSA-OAEP-4096/SHA-256, PBKDF2-HMAC-SHA256 (100k), AES-256-GCM
    #[default]
    V1,
}

impl CipherSuite {
    /// All suites this build can decode
    pub const ALL: [CipherSuite; 1] = [CipherSuite::V1];

    /// One-byte tag written at the front of a wrapped key
    pub const fn tag(self) -> u8 {
        match self {
            CipherSuite::V1 => 1,
        }
    }

    /// Look a suite up by its wire tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|suite| suite.tag() == tag)
    }

    /// RSA modulus length in bits
    pub const fn rsa_modulus_bits(self) -> usize {
        match self {
            CipherSuite::V1 => 4096,
        }
    }

    /// RSA public exponent
    pub const fn rsa_public_exponent(self) -> u32 {
        match self {
            CipherSuite::V1 => 65_537,
        }
    }

    /// JWK `alg` value naming the asymmetric scheme
    pub const fn jwk_alg(self) -> &'static str {
        match self {
            CipherSuite::V1 => "RSA-OAEP-256",
        }
    }

    /// PBKDF2 iteration count for newly derived keys and hashes
    pub const fn pbkdf2_iterations(self) -> u32 {
        match self {
            CipherSuite::V1 => 100_000,
        }
    }

    /// Largest plaintext one RSA-OAEP block can carry: `k - 2·hLen - 2`
    pub const fn max_message_len(self) -> usize {
        self.rsa_modulus_bits() / 8 - 2 * SHA256_OUTPUT_SIZE - 2
    }
}
