//! # Quantum Chain - Block Generation Engine (Subsystem 17)
//!
//! **Bounded Context:** Chain extension for slot-based Proof-of-Stake
//! **Architecture Compliance:** DDD + Hexagonal
//!
//! ## Purpose
//!
//! Extends a chain by a requested number of positions. Every position is
//! either the genesis block of an epoch or one of its `L` slots:
//!
//! ```text
//! Epoch(e) < Slot(e, 0) < Slot(e, 1) < ... < Slot(e, L-1) < Epoch(e+1)
//! ```
//!
//! For each position the engine resolves the slot leader (following an
//! active delegation certificate when one applies), builds and signs the
//! block with a locally held key, verifies it against the current tip,
//! applies it and normalizes the mempool. The caller folds the per-slot
//! outcomes with a [`Monoid`].
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Adapters (Outer)                                   │
//! │  - In-memory chain store / applier / event log      │
//! │  - State verifier, schedule and payload providers   │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports (Middle)                                     │
//! │  - Inbound: ChainGenerationApi                      │
//! │  - Outbound: ChainStateStore, BlockApplier, ...     │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (Inner - Pure Logic)                        │
//! │  - ChainState (apply / rollback)                    │
//! │  - Block builder, verifier, leader lookup           │
//! │  - Follow-the-satoshi schedule, Monoid              │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Critical Invariants
//!
//! 1. **Ordering**: outcomes are produced in strict cursor order
//! 2. **Linkage**: each block's parent is the tip left by the previous one
//! 3. **Schedule Memoization**: at most one schedule computation per epoch
//! 4. **Fail Fast**: the first error ends the run, earlier blocks stay applied
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! let store = Arc::new(InMemoryChainStore::bootstrap(spec)?);
//! let generator = ChainGenerator::new(GenerationDependencies {
//!     store: store.clone(),
//!     verifier: Arc::new(StateVerifier::new(store.clone())),
//!     schedule: Arc::new(StakeWeightedScheduleProvider::new(seed)),
//!     payload: Arc::new(EmptyPayloadProvider),
//!     mempool: Arc::new(InMemoryMempool::new(store.clone())),
//!     config: GenerationConfig::default(),
//! })?;
//!
//! let params = GenerationParameters::from_config(generator.config(), 20, secrets);
//! let produced = generator.generate_chain(&params, Count::of).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Storage, verification and provider adapters
pub mod adapters;
/// Domain models and business logic
pub mod domain;
/// Event type definitions
pub mod events;
pub mod ports;
pub mod service;

mod config;
mod error;
mod metrics;

pub use config::{ConfigError, GenerationConfig};
pub use error::{ErrorKind, GenerationError, Result};
pub use metrics::Metrics;

// Re-export commonly used types
pub use domain::{
    ChainState, Count, GenesisSpec, Monoid, ResolvedLeader, SecretKeyRegistry, SlotContext,
    StateDeltas, VerificationError,
};

pub use ports::{
    BlockApplier, BlockAppliedObserver, BlockVerifier, ChainGenerationApi, ChainStateStore,
    GenerationParameters, GenerationStatus, LeaderScheduleProvider, Mempool, PayloadProvider,
};

pub use events::BlockAppliedEvent;

pub use service::{ChainGenerator, GenerationDependencies, LeaderResolver};

/// Subsystem identifier
pub const SUBSYSTEM_ID: u8 = 17;

/// Default number of slots per epoch
pub const DEFAULT_EPOCH_LENGTH: u32 = 10;

/// Default maximum serialized block size (2 MiB)
pub const DEFAULT_MAX_BLOCK_SIZE: u64 = 2 * 1024 * 1024;

/// Default maximum transactions per generated payload
pub const DEFAULT_MAX_PAYLOAD_TXS: usize = 64;
