//! # Domain Layer - State Manager
//!
//! - `entities`: TrackedState
//! - `manager`: StateManager
//! - `errors`: StateManagerError enumeration

pub mod entities;
pub mod errors;
pub mod manager;

pub use entities::*;
pub use errors::*;
pub use manager::*;
