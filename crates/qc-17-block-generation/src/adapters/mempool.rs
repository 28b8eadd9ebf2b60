//! In-memory mempool
//!
//! Pending transactions are kept in submission order. Normalization drops
//! every transaction that no longer applies on top of the tip: inputs
//! already spent (which covers transactions included in a block) and
//! inputs claimed by an earlier pending transaction. The same walk filters
//! what `pending` hands out, so a payload never carries two transactions
//! spending one output.

use crate::domain::ChainState;
use crate::ports::{ChainStateStore, Mempool};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Transaction, TxIn};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Mempool validated against a [`ChainStateStore`]
pub struct InMemoryMempool<S: ChainStateStore> {
    store: Arc<S>,
    pending: RwLock<Vec<Transaction>>,
}

impl<S: ChainStateStore> InMemoryMempool<S> {
    /// Empty mempool over `store`
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            pending: RwLock::new(Vec::new()),
        }
    }

    /// Number of pending transactions
    pub fn len(&self) -> usize {
        self.pending.read().len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.read().is_empty()
    }
}

/// Tracks inputs claimed by transactions accepted so far
#[derive(Default)]
struct ClaimedInputs(BTreeSet<TxIn>);

impl ClaimedInputs {
    /// Accept `tx` if all its inputs are unspent in `state` and unclaimed
    fn accept(&mut self, state: &ChainState, tx: &Transaction) -> bool {
        let applies = tx
            .inputs
            .iter()
            .all(|input| state.utxo(input).is_some() && !self.0.contains(input));
        if applies {
            self.0.extend(tx.inputs.iter().copied());
        }
        applies
    }
}

#[async_trait]
impl<S: ChainStateStore> Mempool for InMemoryMempool<S> {
    async fn submit(&self, tx: Transaction) -> Result<(), String> {
        let id = tx.id();
        let mut pending = self.pending.write();
        if pending.iter().any(|p| p.id() == id) {
            return Err(format!("transaction {} already pending", hex::encode(id)));
        }
        pending.push(tx);
        Ok(())
    }

    async fn pending(&self, max: usize) -> Result<Vec<Transaction>, String> {
        let state = self.store.snapshot().await?;
        let mut claimed = ClaimedInputs::default();
        Ok(self
            .pending
            .read()
            .iter()
            .filter(|tx| claimed.accept(&state, tx))
            .take(max)
            .cloned()
            .collect())
    }

    async fn normalize(&self) -> Result<(), String> {
        let state = self.store.snapshot().await?;

        let mut pending = self.pending.write();
        let before = pending.len();
        let mut claimed = ClaimedInputs::default();
        pending.retain(|tx| claimed.accept(&state, tx));

        let dropped = before - pending.len();
        if dropped > 0 {
            debug!(dropped, remaining = pending.len(), "Normalized mempool");
        }
        Ok(())
    }
}
