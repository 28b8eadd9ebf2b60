//! In-memory chain state store
//!
//! Holds one [`ChainState`] behind a lock. The lock is never held across an
//! `.await`: observers are notified after the write guard is dropped.

use crate::domain::{ChainState, GenesisSpec, StateError};
use crate::events::BlockAppliedEvent;
use crate::ports::{BlockApplier, BlockAppliedObserver, ChainStateStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    BlockHeader, Blund, Coin, DelegationCertificate, EpochIndex, StakeholderId,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const NOT_INITIALIZED: &str = "chain state not initialized";

/// In-memory chain state store and applier
#[derive(Default)]
pub struct InMemoryChainStore {
    state: RwLock<Option<ChainState>>,
    observers: RwLock<Vec<Arc<dyn BlockAppliedObserver>>>,
}

impl InMemoryChainStore {
    /// Uninitialized store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `state`
    pub fn with_state(state: ChainState) -> Self {
        Self {
            state: RwLock::new(Some(state)),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Store holding the state described by `spec`
    pub fn bootstrap(spec: GenesisSpec) -> Result<Self, StateError> {
        Ok(Self::with_state(ChainState::bootstrap(spec)?))
    }

    /// Replace the held state
    pub fn initialize(&self, state: ChainState) {
        *self.state.write() = Some(state);
    }

    /// Register an observer for block-applied notifications
    pub fn add_observer(&self, observer: Arc<dyn BlockAppliedObserver>) {
        self.observers.write().push(observer);
    }

    fn read<T>(&self, f: impl FnOnce(&ChainState) -> T) -> Result<T, String> {
        self.state
            .read()
            .as_ref()
            .map(f)
            .ok_or_else(|| NOT_INITIALIZED.to_string())
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut ChainState) -> Result<T, StateError>,
    ) -> Result<T, String> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or_else(|| NOT_INITIALIZED.to_string())?;
        f(state).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ChainStateStore for InMemoryChainStore {
    async fn is_initialized(&self) -> bool {
        self.state.read().is_some()
    }

    async fn get_tip(&self) -> Result<BlockHeader, String> {
        self.read(|state| state.tip().clone())
    }

    async fn get_leaders(&self, epoch: EpochIndex) -> Result<Option<Vec<StakeholderId>>, String> {
        self.read(|state| state.leaders(epoch).map(<[StakeholderId]>::to_vec))
    }

    async fn put_leaders(
        &self,
        epoch: EpochIndex,
        leaders: Vec<StakeholderId>,
    ) -> Result<(), String> {
        let stored = self.write(|state| Ok(state.put_leaders(epoch, leaders)))?;
        if !stored {
            debug!(epoch, "Leader schedule already memoized, keeping existing one");
        }
        Ok(())
    }

    async fn get_active_delegation(
        &self,
        issuer: &StakeholderId,
        epoch: EpochIndex,
    ) -> Result<Option<DelegationCertificate>, String> {
        self.read(|state| state.active_delegation(issuer, epoch).cloned())
    }

    async fn get_stake_distribution(&self) -> Result<BTreeMap<StakeholderId, Coin>, String> {
        self.read(|state| state.stake_distribution().clone())
    }

    async fn snapshot(&self) -> Result<ChainState, String> {
        self.read(ChainState::clone)
    }
}

#[async_trait]
impl BlockApplier for InMemoryChainStore {
    async fn apply_blund(&self, blund: &Blund, notify_observers: bool) -> Result<(), String> {
        self.write(|state| state.apply(blund))?;

        if notify_observers {
            let observers = self.observers.read().clone();
            let event = BlockAppliedEvent::from_blund(blund);
            for observer in observers {
                observer.on_block_applied(event.clone()).await?;
            }
        }
        Ok(())
    }

    async fn rollback_blund(&self, blund: &Blund) -> Result<(), String> {
        self.write(|state| state.rollback(blund))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryEventLog;
    use crate::domain::{verify_blocks, SlotContext};
    use shared_crypto::Ed25519KeyPair;
    use shared_types::{Block, MainBlock, Payload, SlotId};

    fn key() -> Ed25519KeyPair {
        Ed25519KeyPair::derive("store-test", 0)
    }

    fn store() -> InMemoryChainStore {
        let leader = StakeholderId::from_public_key(&key().public_key());
        InMemoryChainStore::bootstrap(GenesisSpec {
            start_epoch: 0,
            balances: vec![(leader, 10)],
            delegations: vec![],
            leaders: Some(vec![leader; 2]),
        })
        .unwrap()
    }

    async fn next_blund(store: &InMemoryChainStore) -> Blund {
        let state = store.snapshot().await.unwrap();
        let slot = SlotId::new(0, 0);
        let block = Block::Main(MainBlock::new(
            state.tip(),
            slot,
            Payload::empty(),
            &key(),
            None,
        ));
        let ctx = SlotContext::new(slot.into(), 2);
        let (mut undos, _) = verify_blocks(&state, &ctx, std::slice::from_ref(&block)).unwrap();
        Blund::new(block, undos.remove(0))
    }

    #[tokio::test]
    async fn test_uninitialized_store() {
        let store = InMemoryChainStore::new();
        assert!(!store.is_initialized().await);
        assert!(store.get_tip().await.is_err());
    }

    #[tokio::test]
    async fn test_put_leaders_keeps_first() {
        let store = store();
        let a = StakeholderId([1; 32]);
        let b = StakeholderId([2; 32]);

        store.put_leaders(1, vec![a, a]).await.unwrap();
        store.put_leaders(1, vec![b, b]).await.unwrap();
        assert_eq!(store.get_leaders(1).await.unwrap(), Some(vec![a, a]));
    }

    #[tokio::test]
    async fn test_apply_notifies_observers() {
        let store = store();
        let log = Arc::new(InMemoryEventLog::new());
        store.add_observer(log.clone());

        let blund = next_blund(&store).await;
        store.apply_blund(&blund, true).await.unwrap();

        assert_eq!(store.get_tip().await.unwrap(), blund.block.header());
        assert_eq!(log.event_count(), 1);
        assert_eq!(log.get_events()[0].point, blund.block.point());
    }

    #[tokio::test]
    async fn test_apply_without_notification() {
        let store = store();
        let log = Arc::new(InMemoryEventLog::new());
        store.add_observer(log.clone());

        let blund = next_blund(&store).await;
        store.apply_blund(&blund, false).await.unwrap();
        assert_eq!(log.event_count(), 0);
    }

    #[tokio::test]
    async fn test_rollback_restores_tip() {
        let store = store();
        let before = store.snapshot().await.unwrap();

        let blund = next_blund(&store).await;
        store.apply_blund(&blund, false).await.unwrap();
        store.rollback_blund(&blund).await.unwrap();

        assert_eq!(store.snapshot().await.unwrap(), before);
    }
}
