//! # Shared Crypto - Chain Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | State update hashes, Merkle nodes |
//! | `ecdsa` | secp256k1 | Recoverable transaction witnesses |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **Addresses**: `keccak256(uncompressed_pubkey[1..])[12..]`, as on Ethereum

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{recover_address, RecoverableSignature, Secp256k1KeyPair, SIGNATURE_LENGTH};
pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_concat};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
