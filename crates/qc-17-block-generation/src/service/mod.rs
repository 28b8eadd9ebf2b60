//! Chain generation service - the extension driver
//!
//! # Flow per point
//!
//! ```text
//! Epoch(E)      ensure schedule(E) → build genesis → verify → apply → normalize mempool
//! Slot(E, i)    ensure schedule(E) → resolve producer → key?
//!                   no key:  skip (None) or UnknownSecret
//!                   key:     payload → build main → verify → apply → normalize mempool
//! ```
//!
//! Points are generated strictly in cursor order; each block is built on
//! the tip left by the previous one. The first failure ends the run.

mod leaders;

pub use leaders::LeaderResolver;

use crate::config::GenerationConfig;
use crate::domain::{
    build_genesis, build_main, BuildLimits, Monoid, SlotContext, VerificationError,
};
use crate::error::{GenerationError, Result};
use crate::metrics::Metrics;
use crate::ports::{
    BlockApplier, BlockVerifier, ChainGenerationApi, ChainStateStore, GenerationParameters,
    GenerationStatus, LeaderScheduleProvider, Mempool, PayloadProvider,
};
use async_trait::async_trait;
use shared_types::{Block, Blund, EpochOrSlot};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn, Instrument};

/// Chain generator
pub struct ChainGenerator<S, V, L, P, M>
where
    S: ChainStateStore + BlockApplier,
    V: BlockVerifier,
    L: LeaderScheduleProvider,
    P: PayloadProvider,
    M: Mempool,
{
    store: Arc<S>,
    verifier: Arc<V>,
    payload: Arc<P>,
    mempool: Arc<M>,
    leaders: LeaderResolver<S, L>,
    config: GenerationConfig,
    metrics: Arc<Metrics>,
}

/// Dependencies for ChainGenerator
pub struct GenerationDependencies<S, V, L, P, M> {
    /// Chain state store, also used as the applier
    pub store: Arc<S>,
    /// Consensus rules
    pub verifier: Arc<V>,
    /// Leader schedule computation
    pub schedule: Arc<L>,
    /// Payload selection
    pub payload: Arc<P>,
    /// Pending transaction pool
    pub mempool: Arc<M>,
    /// Runtime configuration
    pub config: GenerationConfig,
}

impl<S, V, L, P, M> ChainGenerator<S, V, L, P, M>
where
    S: ChainStateStore + BlockApplier,
    V: BlockVerifier,
    L: LeaderScheduleProvider,
    P: PayloadProvider,
    M: Mempool,
{
    /// Create a generator, validating the configuration
    pub fn new(deps: GenerationDependencies<S, V, L, P, M>) -> Result<Self> {
        deps.config
            .validate()
            .map_err(|e| GenerationError::InvalidConfig(e.to_string()))?;

        let metrics = Arc::new(Metrics::new());
        let leaders = LeaderResolver::new(
            deps.store.clone(),
            deps.schedule,
            deps.config.epoch_length,
            metrics.clone(),
        );

        Ok(Self {
            store: deps.store,
            verifier: deps.verifier,
            payload: deps.payload,
            mempool: deps.mempool,
            leaders,
            config: deps.config,
            metrics,
        })
    }

    /// Shared metrics
    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Runtime configuration
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Leader resolver used by this generator
    pub fn leaders(&self) -> &LeaderResolver<S, L> {
        &self.leaders
    }

    /// Generate the block due at `ctx`'s point, `None` for a skipped slot
    async fn generate_point(
        &self,
        ctx: &SlotContext,
        params: &GenerationParameters,
    ) -> Result<Option<Blund>> {
        match ctx.point() {
            EpochOrSlot::Epoch(epoch) => {
                let leaders = self.leaders.ensure_schedule(epoch).await?;
                let tip = self.tip().await?;
                let block = build_genesis(&tip, epoch, &leaders);
                self.verify_and_apply(ctx, block).await.map(Some)
            }
            EpochOrSlot::Slot(slot) => {
                let leader = self.leaders.resolve_leader(slot).await?;

                let Some(key) = params.secrets.get(&leader.producer) else {
                    if params.skip_if_no_key {
                        warn!(
                            epoch = slot.epoch,
                            %slot,
                            producer = %leader.producer,
                            "No secret key for slot producer, skipping slot"
                        );
                        self.metrics.record_slot_skipped();
                        return Ok(None);
                    }
                    return Err(GenerationError::UnknownSecret {
                        producer: leader.producer,
                        slot,
                    });
                };

                let payload = self
                    .payload
                    .generate_payload(ctx)
                    .await
                    .map_err(|reason| GenerationError::PayloadFailed { slot, reason })?;
                let tip = self.tip().await?;
                let block = build_main(
                    ctx,
                    &tip,
                    slot,
                    &leader,
                    key,
                    payload,
                    BuildLimits::from(&self.config),
                )?;
                self.verify_and_apply(ctx, block).await.map(Some)
            }
        }
    }

    /// Verify one block against the tip, apply it, then normalize the mempool
    async fn verify_and_apply(&self, ctx: &SlotContext, block: Block) -> Result<Blund> {
        let started = Instant::now();
        let point = block.point();

        let (mut undos, deltas) = self
            .verifier
            .verify_blocks(ctx, std::slice::from_ref(&block))
            .await
            .map_err(|errors| GenerationError::BlockInvalid {
                point,
                details: join_errors(&errors),
            })?;
        let undo = match (undos.pop(), undos.is_empty()) {
            (Some(undo), true) => undo,
            _ => {
                return Err(GenerationError::BlockInvalid {
                    point,
                    details: "verifier did not return exactly one undo record".into(),
                })
            }
        };

        let blund = Blund::new(block, undo);
        self.store
            .apply_blund(&blund, self.config.notify_observers)
            .await
            .map_err(|reason| GenerationError::ApplyFailed { point, reason })?;

        self.mempool
            .normalize()
            .await
            .map_err(|reason| GenerationError::MempoolNormalizeFailed { point, reason })?;
        self.metrics.record_mempool_normalized();

        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.metrics
            .record_block_applied(blund.block.is_genesis(), elapsed_us);
        debug!(
            %point,
            transactions = deltas.transactions,
            stake_changes = deltas.stake_changes.len(),
            "Applied block"
        );

        Ok(blund)
    }

    async fn tip(&self) -> Result<shared_types::BlockHeader> {
        self.store
            .get_tip()
            .await
            .map_err(GenerationError::StoreError)
    }
}

fn join_errors(errors: &[VerificationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl<S, V, L, P, M> ChainGenerationApi for ChainGenerator<S, V, L, P, M>
where
    S: ChainStateStore + BlockApplier,
    V: BlockVerifier,
    L: LeaderScheduleProvider,
    P: PayloadProvider,
    M: Mempool,
{
    #[tracing::instrument(
        skip(self, params, inject),
        fields(count = params.block_count, skip_if_no_key = params.skip_if_no_key)
    )]
    async fn generate_chain<T, F>(&self, params: &GenerationParameters, mut inject: F) -> Result<T>
    where
        T: Monoid + Send,
        F: FnMut(Option<Blund>) -> T + Send,
    {
        if params.block_count == 0 {
            return Ok(T::empty());
        }
        if !self.store.is_initialized().await {
            return Err(GenerationError::NotInitialized);
        }

        let epoch_length = self.config.epoch_length;
        let tip = self.tip().await?;
        let start = tip.point().successor(epoch_length);
        let finish = start.advance(params.block_count - 1, epoch_length);
        info!(%start, %finish, "Extending chain");

        let mut acc = T::empty();
        for point in EpochOrSlot::range(epoch_length, start, finish) {
            let ctx = SlotContext::new(point, epoch_length);
            let span = tracing::debug_span!("point", %point);
            match self.generate_point(&ctx, params).instrument(span).await {
                Ok(outcome) => acc = acc.combine(inject(outcome)),
                Err(e) => {
                    error!(kind = ?e.kind(), %point, error = %e, "Chain generation aborted");
                    return Err(e);
                }
            }
        }

        Ok(acc)
    }

    async fn rollback(&self, blunds: &[Blund]) -> Result<()> {
        for blund in blunds.iter().rev() {
            let point = blund.block.point();
            self.store
                .rollback_blund(blund)
                .await
                .map_err(|e| GenerationError::StoreError(format!("rollback of {point}: {e}")))?;
            debug!(%point, "Rolled back block");
        }
        Ok(())
    }

    async fn status(&self) -> Result<GenerationStatus> {
        let tip = self.tip().await?;
        Ok(GenerationStatus {
            tip: tip.point(),
            difficulty: tip.difficulty(),
            genesis_blocks: self.metrics.genesis_blocks.load(Ordering::Relaxed),
            main_blocks: self.metrics.main_blocks.load(Ordering::Relaxed),
            slots_skipped: self.metrics.slots_skipped.load(Ordering::Relaxed),
            schedules_computed: self.metrics.get_schedules_computed(),
            avg_apply_time_us: self.metrics.get_avg_apply_time(),
        })
    }
}
