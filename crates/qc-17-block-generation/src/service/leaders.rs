//! Leader resolution
//!
//! Ensures the schedule of an epoch is memoized in the store (computing it
//! at most once), then resolves a slot to its effective producer through
//! the delegation graph.

use crate::domain::{check_schedule, leader_at, ResolvedLeader};
use crate::error::{GenerationError, Result};
use crate::metrics::Metrics;
use crate::ports::{ChainStateStore, LeaderScheduleProvider};
use shared_types::{EpochIndex, SlotCount, SlotId, StakeholderId};
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves slots to producers
pub struct LeaderResolver<S, L>
where
    S: ChainStateStore,
    L: LeaderScheduleProvider,
{
    store: Arc<S>,
    provider: Arc<L>,
    epoch_length: SlotCount,
    metrics: Arc<Metrics>,
}

impl<S, L> LeaderResolver<S, L>
where
    S: ChainStateStore,
    L: LeaderScheduleProvider,
{
    /// Create a resolver
    pub fn new(
        store: Arc<S>,
        provider: Arc<L>,
        epoch_length: SlotCount,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            provider,
            epoch_length,
            metrics,
        }
    }

    /// Schedule of `epoch`, computing and memoizing it if absent
    ///
    /// A memoized schedule is returned as stored, without consulting the
    /// provider again. Schedules seeded at bootstrap go through the same
    /// length check as computed ones.
    pub async fn ensure_schedule(&self, epoch: EpochIndex) -> Result<Vec<StakeholderId>> {
        if let Some(schedule) = self
            .store
            .get_leaders(epoch)
            .await
            .map_err(GenerationError::StoreError)?
        {
            check_schedule(epoch, &schedule, self.epoch_length)?;
            return Ok(schedule);
        }

        let stakes = self
            .store
            .get_stake_distribution()
            .await
            .map_err(GenerationError::StoreError)?;
        let schedule = self
            .provider
            .compute_schedule(epoch, &stakes, self.epoch_length)
            .await
            .map_err(|reason| GenerationError::ScheduleComputationFailed { epoch, reason })?;
        check_schedule(epoch, &schedule, self.epoch_length)?;

        self.store
            .put_leaders(epoch, schedule.clone())
            .await
            .map_err(GenerationError::StoreError)?;
        self.metrics.record_schedule_computed();
        info!(epoch, leaders = schedule.len(), "Computed leader schedule");

        Ok(schedule)
    }

    /// Effective producer of `slot` and the certificate to embed, if any
    pub async fn resolve_leader(&self, slot: SlotId) -> Result<ResolvedLeader> {
        let schedule = self.ensure_schedule(slot.epoch).await?;
        let raw_leader = leader_at(&schedule, slot, self.epoch_length)?;
        let certificate = self
            .store
            .get_active_delegation(&raw_leader, slot.epoch)
            .await
            .map_err(GenerationError::StoreError)?;

        let resolved = ResolvedLeader::new(raw_leader, certificate);
        if resolved.is_delegated() {
            debug!(
                %slot,
                leader = %resolved.raw_leader,
                producer = %resolved.producer,
                "Slot delegated"
            );
        }
        Ok(resolved)
    }
}
