//! # Core Primitive Entities
//!
//! Aliases and coin-space constants shared by every crate.

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// The all-zero hash. Used for padding nodes and exclusion leaves.
pub const ZERO_HASH: Hash = [0u8; 32];

/// The all-zero address.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Number of low bits of a global coin offset that address a position inside
/// one token's window.
pub const TOKEN_SEGMENT_BITS: usize = 48;

/// Width of the coin space owned by a single token (`2^48`).
pub const TOKEN_SEGMENT_SIZE: u64 = 1 << TOKEN_SEGMENT_BITS;

/// Maximum number of listed tokens. Keeps the whole coin space below `2^64`
/// so sibling lengths fit the 8-byte proof field.
pub const MAX_TOKENS: u64 = (1 << 16) - 1;

/// Total coin space spanned by `num_tokens` listed tokens.
pub fn coin_space_size(num_tokens: u64) -> U256 {
    U256::from(num_tokens) << TOKEN_SEGMENT_BITS
}
