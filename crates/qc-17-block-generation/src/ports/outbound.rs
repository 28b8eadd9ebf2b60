//! Outbound ports (driven side - SPI)
//!
//! Adapters report failures as plain strings; the service maps them onto
//! the matching `GenerationError` variant.

use crate::domain::{ChainState, SlotContext, StateDeltas, VerificationError};
use crate::events::BlockAppliedEvent;
use async_trait::async_trait;
use shared_types::{
    Block, BlockHeader, Blund, Coin, DelegationCertificate, EpochIndex, Payload, SlotCount,
    StakeholderId, Transaction, UndoRecord,
};
use std::collections::BTreeMap;

/// Port: Persistent chain state
#[async_trait]
pub trait ChainStateStore: Send + Sync {
    /// Whether the store holds a bootstrapped state
    async fn is_initialized(&self) -> bool;

    /// Header of the last applied block
    async fn get_tip(&self) -> Result<BlockHeader, String>;

    /// Memoized leader schedule of `epoch`
    async fn get_leaders(&self, epoch: EpochIndex) -> Result<Option<Vec<StakeholderId>>, String>;

    /// Memoize the leader schedule of `epoch`; an existing one is kept
    async fn put_leaders(&self, epoch: EpochIndex, leaders: Vec<StakeholderId>)
        -> Result<(), String>;

    /// Delegation of `issuer` in force for `epoch`
    async fn get_active_delegation(
        &self,
        issuer: &StakeholderId,
        epoch: EpochIndex,
    ) -> Result<Option<DelegationCertificate>, String>;

    /// Current stake per stakeholder
    async fn get_stake_distribution(&self) -> Result<BTreeMap<StakeholderId, Coin>, String>;

    /// Copy of the full state
    async fn snapshot(&self) -> Result<ChainState, String>;
}

/// Port: Apply and revert verified blocks
#[async_trait]
pub trait BlockApplier: Send + Sync {
    /// Apply a verified blund and make its block the tip
    async fn apply_blund(&self, blund: &Blund, notify_observers: bool) -> Result<(), String>;

    /// Revert the tip blund
    async fn rollback_blund(&self, blund: &Blund) -> Result<(), String>;
}

/// Port: Consensus rules
#[async_trait]
pub trait BlockVerifier: Send + Sync {
    /// Verify `blocks` in order against current chain state
    ///
    /// Returns one undo record per block on success.
    async fn verify_blocks(
        &self,
        ctx: &SlotContext,
        blocks: &[Block],
    ) -> Result<(Vec<UndoRecord>, StateDeltas), Vec<VerificationError>>;
}

/// Port: Leader schedule computation
///
/// Must return the same schedule when asked twice for the same epoch and
/// stake distribution.
#[async_trait]
pub trait LeaderScheduleProvider: Send + Sync {
    /// Ordered slot leaders of `epoch`
    async fn compute_schedule(
        &self,
        epoch: EpochIndex,
        stakes: &BTreeMap<StakeholderId, Coin>,
        epoch_length: SlotCount,
    ) -> Result<Vec<StakeholderId>, String>;
}

/// Port: Payload selection
#[async_trait]
pub trait PayloadProvider: Send + Sync {
    /// Payload for the slot in `ctx`; may be empty
    async fn generate_payload(&self, ctx: &SlotContext) -> Result<Payload, String>;
}

/// Port: Pending transaction pool
#[async_trait]
pub trait Mempool: Send + Sync {
    /// Queue a transaction
    async fn submit(&self, tx: Transaction) -> Result<(), String>;

    /// Pending transactions, oldest first, at most `max`
    ///
    /// The returned set applies on top of the current tip as a whole: no
    /// missing inputs and no two transactions spending the same output.
    async fn pending(&self, max: usize) -> Result<Vec<Transaction>, String>;

    /// Drop transactions invalidated by the current tip
    async fn normalize(&self) -> Result<(), String>;
}

/// Port: Block-applied notifications
#[async_trait]
pub trait BlockAppliedObserver: Send + Sync {
    /// Called after a block became the tip
    async fn on_block_applied(&self, event: BlockAppliedEvent) -> Result<(), String>;
}
