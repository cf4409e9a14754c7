//! Shared fixtures for unit tests.
//!
//! RSA-4096 generation takes seconds, so each key pair is generated once
//! per test binary and shared.

use std::sync::OnceLock;

use crate::crypto::{CipherSuite, IdentityKeyPair};

/// Primary test identity
pub fn identity() -> &'static IdentityKeyPair {
    static IDENTITY: OnceLock<IdentityKeyPair> = OnceLock::new();
    IDENTITY.get_or_init(|| IdentityKeyPair::generate(CipherSuite::V1).unwrap())
}

/// A second, unrelated identity
pub fn other_identity() -> &'static IdentityKeyPair {
    static OTHER: OnceLock<IdentityKeyPair> = OnceLock::new();
    OTHER.get_or_init(|| IdentityKeyPair::generate(CipherSuite::V1).unwrap())
}
