//! Domain layer - Pure business logic for block generation
//!
//! Everything here is synchronous and free of I/O. The service layer reads
//! chain state through the ports and hands it to these functions.
//!
//! ## Components
//!
//! - [`ChainState`]: UTXO, stake, delegation, votes, schedules, tip; apply and rollback
//! - [`ResolvedLeader`], [`leader_at`]: slot leader lookup with single-hop delegation
//! - [`build_genesis`], [`build_main`]: block construction
//! - [`verify_blocks`]: consensus rules, producing undo records
//! - [`follow_the_satoshi`]: stake-weighted leader selection
//! - [`Monoid`]: accumulators for generation results
//! - [`SlotContext`]: the point currently being generated
//! - [`SecretKeyRegistry`]: locally held signing keys

pub mod builder;
pub mod context;
pub mod keys;
pub mod leader;
pub mod monoid;
pub mod schedule;
pub mod state;
pub mod verifier;

pub use builder::{build_genesis, build_main, BuildLimits};
pub use context::SlotContext;
pub use keys::SecretKeyRegistry;
pub use leader::{check_schedule, leader_at, ResolvedLeader};
pub use monoid::{Count, Monoid};
pub use schedule::follow_the_satoshi;
pub use state::{bootstrap_tx_id, ChainState, GenesisSpec, StateError};
pub use verifier::{check_block, verify_blocks, StateDeltas, VerificationError};
