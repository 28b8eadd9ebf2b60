//! Verifier adapter
//!
//! Runs the domain consensus rules against a snapshot of the store.

use crate::domain::{self, SlotContext, StateDeltas, VerificationError};
use crate::ports::{BlockVerifier, ChainStateStore};
use async_trait::async_trait;
use shared_types::{Block, UndoRecord};
use std::sync::Arc;

/// Verifies blocks against the state held by a [`ChainStateStore`]
pub struct StateVerifier<S: ChainStateStore> {
    store: Arc<S>,
}

impl<S: ChainStateStore> StateVerifier<S> {
    /// Verifier reading from `store`
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ChainStateStore> BlockVerifier for StateVerifier<S> {
    async fn verify_blocks(
        &self,
        ctx: &SlotContext,
        blocks: &[Block],
    ) -> Result<(Vec<UndoRecord>, StateDeltas), Vec<VerificationError>> {
        let state = self
            .store
            .snapshot()
            .await
            .map_err(|e| vec![VerificationError::StateUnavailable(e)])?;
        domain::verify_blocks(&state, ctx, blocks)
    }
}
