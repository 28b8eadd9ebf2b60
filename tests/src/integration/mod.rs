//! # Chain Generation Integration Tests
//!
//! Drives `ChainGenerator` end to end over the in-memory store, state
//! verifier, schedule providers, payload providers and mempool.

mod delegation;
mod generation;
mod mempool;
mod rollback;
