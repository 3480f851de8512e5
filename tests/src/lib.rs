//! # Plasma Child Chain Test Suite
//!
//! Cross-crate integration flows.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs     # Shared chain/key setup
//!     ├── end_to_end.rs   # Deposit → transfer → block → proof
//!     ├── admission.rs    # TxFilter and spendability through the Chain
//!     ├── events.rs       # EventWatcher driving the Chain
//!     └── history.rs      # Multi-block history replay
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p pc-tests
//! cargo test -p pc-tests integration::history::
//! ```

#![allow(dead_code)]

pub mod integration;
