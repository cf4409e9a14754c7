//! Binary-safe text encodings.
//!
//! Ciphertext is arbitrary binary. It is only ever turned into text through
//! base64, never through a character decoder.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;

/// Encode bytes as standard (padded) base64
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard (padded) base64
pub fn from_base64(text: &str) -> Option<Vec<u8>> {
    STANDARD.decode(text.trim()).ok()
}

/// Encode bytes as unpadded base64url (JWK members)
pub(crate) fn to_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url (JWK members)
pub(crate) fn from_base64url(text: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(text).ok()
}

/// Serde helper for serializing byte vectors as base64 strings
pub(crate) mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_base64(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::from_base64(&s).ok_or_else(|| serde::de::Error::custom("Invalid base64"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_utf8_bytes_survive() {
        // Invalid as UTF-8 on purpose: a text decoder would mangle these.
        let bytes = [0xFF, 0xFE, 0x00, 0x80, 0xC3, 0x28];
        assert_eq!(from_base64(&to_base64(&bytes)).unwrap(), bytes);
        assert_eq!(from_base64url(&to_base64url(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(from_base64("not base64 !!").is_none());
        assert!(from_base64url("a+b/").is_none());
    }
}
