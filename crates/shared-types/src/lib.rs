//! # Shared Types Crate
//!
//! Primitive types used across the Plasma Chamber child chain.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Hash`, `Address`, `U256` and `Segment` are
//!   defined once here and re-exported by every subsystem.
//! - **Fixed-Width Encoding**: Every 256-bit quantity that reaches a hash
//!   preimage is encoded as a 32-byte big-endian word (see `codec`), because
//!   the settlement contract recomputes the same bytes.
//! - **Global Coin Space**: Each listed token owns a window of
//!   `TOKEN_SEGMENT_SIZE` coins; segments are always expressed globally.

pub mod codec;
pub mod entities;
pub mod errors;
pub mod segment;

pub use codec::*;
pub use entities::*;
pub use errors::*;
pub use segment::Segment;
