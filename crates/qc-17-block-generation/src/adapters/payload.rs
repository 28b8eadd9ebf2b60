//! Payload providers

use crate::config::GenerationConfig;
use crate::domain::{SecretKeyRegistry, SlotContext};
use crate::ports::{ChainStateStore, Mempool, PayloadProvider};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use shared_types::{Payload, StakeholderId, Transaction, TxOut};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Provider that always returns an empty payload
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyPayloadProvider;

#[async_trait]
impl PayloadProvider for EmptyPayloadProvider {
    async fn generate_payload(&self, _ctx: &SlotContext) -> Result<Payload, String> {
        Ok(Payload::empty())
    }
}

/// Provider that packs pending mempool transactions
pub struct MempoolPayloadProvider<M: Mempool> {
    mempool: Arc<M>,
    max_txs: usize,
}

impl<M: Mempool> MempoolPayloadProvider<M> {
    /// Take at most `max_txs` transactions per block from `mempool`
    pub fn new(mempool: Arc<M>, max_txs: usize) -> Self {
        Self { mempool, max_txs }
    }
}

#[async_trait]
impl<M: Mempool> PayloadProvider for MempoolPayloadProvider<M> {
    async fn generate_payload(&self, _ctx: &SlotContext) -> Result<Payload, String> {
        let transactions = self.mempool.pending(self.max_txs).await?;
        Ok(Payload {
            transactions,
            ..Payload::default()
        })
    }
}

/// Generator of random but reproducible transfers
///
/// Each call lets a random subset of locally controlled stakeholders send
/// part of one of their outputs to another known stakeholder. Randomness
/// comes from a seeded `StdRng`, so a fixed seed over a fixed chain gives
/// the same payloads.
pub struct TransferPayloadGenerator<S: ChainStateStore> {
    store: Arc<S>,
    secrets: SecretKeyRegistry,
    max_txs: usize,
    rng: Mutex<StdRng>,
}

impl<S: ChainStateStore> TransferPayloadGenerator<S> {
    /// Generator spending outputs of `secrets` holders
    pub fn new(store: Arc<S>, secrets: SecretKeyRegistry, max_txs: usize, seed: u64) -> Self {
        Self {
            store,
            secrets,
            max_txs,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Generator using the configured transaction limit and seed
    pub fn from_config(
        store: Arc<S>,
        secrets: SecretKeyRegistry,
        config: &GenerationConfig,
    ) -> Self {
        Self::new(store, secrets, config.max_payload_txs, config.payload_seed)
    }
}

#[async_trait]
impl<S: ChainStateStore> PayloadProvider for TransferPayloadGenerator<S> {
    async fn generate_payload(&self, _ctx: &SlotContext) -> Result<Payload, String> {
        let state = self.store.snapshot().await?;

        let recipients: Vec<StakeholderId> = state
            .stake_distribution()
            .keys()
            .chain(self.secrets.stakeholders())
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut rng = self.rng.lock();
        let mut senders: Vec<StakeholderId> = self.secrets.stakeholders().copied().collect();
        senders.shuffle(&mut *rng);
        let count = rng.gen_range(0..=senders.len().min(self.max_txs));

        let mut transactions = Vec::with_capacity(count);
        for sender in senders.into_iter().take(count) {
            let Some(key) = self.secrets.get(&sender) else {
                continue;
            };
            let Some((input, output)) = state
                .unspent_of(&sender)
                .into_iter()
                .find(|(_, out)| out.value > 0)
            else {
                continue;
            };
            let Some(recipient) = recipients
                .iter()
                .filter(|r| **r != sender)
                .copied()
                .choose(&mut *rng)
            else {
                continue;
            };

            let amount = rng.gen_range(1..=output.value);
            let mut outputs = vec![TxOut {
                owner: recipient,
                value: amount,
            }];
            if output.value > amount {
                outputs.push(TxOut {
                    owner: sender,
                    value: output.value - amount,
                });
            }
            transactions.push(Transaction::signed(vec![input], outputs, &[key.as_ref()]));
        }

        Ok(Payload {
            transactions,
            ..Payload::default()
        })
    }
}
