//! # Keccak-256 Hashing
//!
//! Ethereum-compatible Keccak-256 (not NIST SHA3-256).

use sha3::{Digest, Keccak256};
use shared_types::Hash;

/// Hash data with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Hash the concatenation of several slices without allocating.
pub fn keccak256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_concat_matches_one_shot() {
        let joined = keccak256(b"hello world");
        assert_eq!(keccak256_concat(&[&b"hello"[..], &b" "[..], &b"world"[..]]), joined);
    }
}
