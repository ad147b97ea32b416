//! Strong name identity helpers.
//!
//! A public key token is the last 8 bytes of the SHA-1 hash of the public key blob, in
//! reversed order (ECMA-335 II.6.2.1.3).

use sha1::{Digest, Sha1};

/// Public key tokens of keys used to sign framework assemblies.
///
/// References carrying one of these tokens are provided by the runtime and never need to be
/// located on disk.
pub const FRAMEWORK_TOKENS: [[u8; 8]; 5] = [
    // ECMA key: mscorlib, System, System.Core
    [0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89],
    // Microsoft key: System.Drawing, System.Web, ...
    [0xb0, 0x3f, 0x5f, 0x7f, 0x11, 0xd5, 0x0a, 0x3a],
    // Microsoft shared key: System.Runtime, System.ComponentModel.Annotations, ...
    [0x31, 0xbf, 0x38, 0x56, 0xad, 0x36, 0x4e, 0x35],
    // netstandard
    [0xcc, 0x7b, 0x13, 0xff, 0xcd, 0x2d, 0xdd, 0x51],
    // System.Private.CoreLib
    [0x7c, 0xec, 0x85, 0xd7, 0xbe, 0xa7, 0x79, 0x8e],
];

/// Compute the public key token of a public key blob.
#[must_use]
pub fn public_key_token(public_key: &[u8]) -> [u8; 8] {
    let hash = Sha1::digest(public_key);
    let mut token = [0u8; 8];
    for (dst, src) in token.iter_mut().zip(hash.iter().rev()) {
        *dst = *src;
    }
    token
}

/// Whether `token` belongs to a runtime provided framework assembly
#[must_use]
pub fn is_framework_token(token: &[u8; 8]) -> bool {
    FRAMEWORK_TOKENS.contains(token)
}

/// Hex rendering used in display names, `b77a5c561934e089`
#[must_use]
pub fn token_to_hex(token: &[u8; 8]) -> String {
    token.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_token_of_ecma_key() {
        // The 16 byte ECMA neutral key hashes to the well known mscorlib token
        let ecma_key = [0u8, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0];
        let token = public_key_token(&ecma_key);

        assert_eq!(token_to_hex(&token), "b77a5c561934e089");
        assert!(is_framework_token(&token));
    }

    #[test]
    fn test_public_key_token_is_reversed_hash_tail() {
        let key = b"not a real key";
        let hash = Sha1::digest(key);
        let token = public_key_token(key);

        assert_eq!(token[0], hash[19]);
        assert_eq!(token[7], hash[12]);
        assert!(!is_framework_token(&token));
    }
}
