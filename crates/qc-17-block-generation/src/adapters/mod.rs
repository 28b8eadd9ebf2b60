//! Adapters implementing the outbound ports
//!
//! All adapters are in-memory; they back simulations and tests.

pub mod event_log;
pub mod memory_store;
pub mod mempool;
pub mod payload;
pub mod schedule;
pub mod verifier;

pub use event_log::InMemoryEventLog;
pub use memory_store::InMemoryChainStore;
pub use mempool::InMemoryMempool;
pub use payload::{EmptyPayloadProvider, MempoolPayloadProvider, TransferPayloadGenerator};
pub use schedule::{FixedScheduleProvider, StakeWeightedScheduleProvider};
pub use verifier::StateVerifier;
