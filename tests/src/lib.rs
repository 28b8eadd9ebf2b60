//! # Quantum-Chain Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Bootstrapped stores, keys and generators
//! └── integration/      # Chain generation scenarios
//!     ├── generation.rs # Cursor walk, genesis, skip/fail
//!     ├── delegation.rs # Proxy signing
//!     ├── rollback.rs   # Undo round trips
//!     └── mempool.rs    # Submission → inclusion → normalization
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qc-tests
//! RUST_LOG=qc_17_block_generation=debug cargo test -p qc-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
