//! Leader schedule providers

use crate::domain::follow_the_satoshi;
use crate::ports::LeaderScheduleProvider;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Coin, EpochIndex, Hash, SlotCount, StakeholderId};
use std::collections::BTreeMap;
use tracing::debug;

/// Invocation counts per epoch
#[derive(Debug, Default)]
struct CallCounter {
    calls: Mutex<BTreeMap<EpochIndex, u64>>,
}

impl CallCounter {
    fn record(&self, epoch: EpochIndex) {
        *self.calls.lock().entry(epoch).or_insert(0) += 1;
    }

    fn for_epoch(&self, epoch: EpochIndex) -> u64 {
        self.calls.lock().get(&epoch).copied().unwrap_or(0)
    }

    fn total(&self) -> u64 {
        self.calls.lock().values().sum()
    }
}

/// Provider with explicit schedules and a round-robin fallback
///
/// Epochs without an explicit schedule rotate through `rotation`, one
/// stakeholder per slot, continuing across epoch boundaries.
#[derive(Debug, Default)]
pub struct FixedScheduleProvider {
    schedules: BTreeMap<EpochIndex, Vec<StakeholderId>>,
    rotation: Vec<StakeholderId>,
    counter: CallCounter,
}

impl FixedScheduleProvider {
    /// Provider rotating through `rotation`
    pub fn round_robin(rotation: Vec<StakeholderId>) -> Self {
        Self {
            rotation,
            ..Self::default()
        }
    }

    /// Use `leaders` verbatim for `epoch`
    pub fn with_schedule(mut self, epoch: EpochIndex, leaders: Vec<StakeholderId>) -> Self {
        self.schedules.insert(epoch, leaders);
        self
    }

    /// How many times the schedule of `epoch` was computed
    pub fn calls_for(&self, epoch: EpochIndex) -> u64 {
        self.counter.for_epoch(epoch)
    }

    /// Total computations
    pub fn total_calls(&self) -> u64 {
        self.counter.total()
    }
}

#[async_trait]
impl LeaderScheduleProvider for FixedScheduleProvider {
    async fn compute_schedule(
        &self,
        epoch: EpochIndex,
        _stakes: &BTreeMap<StakeholderId, Coin>,
        epoch_length: SlotCount,
    ) -> Result<Vec<StakeholderId>, String> {
        self.counter.record(epoch);

        if let Some(leaders) = self.schedules.get(&epoch) {
            return Ok(leaders.clone());
        }
        if self.rotation.is_empty() {
            return Err(format!("no schedule configured for epoch {epoch}"));
        }

        let len = self.rotation.len() as u128;
        let first = u128::from(epoch) * u128::from(epoch_length);
        Ok((0..u128::from(epoch_length))
            .map(|i| self.rotation[((first + i) % len) as usize])
            .collect())
    }
}

/// Stake-weighted provider (follow-the-satoshi)
#[derive(Debug, Default)]
pub struct StakeWeightedScheduleProvider {
    seed: Hash,
    counter: CallCounter,
}

impl StakeWeightedScheduleProvider {
    /// Provider drawing leaders from `seed`
    pub fn new(seed: Hash) -> Self {
        Self {
            seed,
            counter: CallCounter::default(),
        }
    }

    /// How many times the schedule of `epoch` was computed
    pub fn calls_for(&self, epoch: EpochIndex) -> u64 {
        self.counter.for_epoch(epoch)
    }
}

#[async_trait]
impl LeaderScheduleProvider for StakeWeightedScheduleProvider {
    async fn compute_schedule(
        &self,
        epoch: EpochIndex,
        stakes: &BTreeMap<StakeholderId, Coin>,
        epoch_length: SlotCount,
    ) -> Result<Vec<StakeholderId>, String> {
        self.counter.record(epoch);
        let schedule = follow_the_satoshi(&self.seed, epoch, stakes, epoch_length);
        if schedule.is_empty() && epoch_length > 0 {
            return Err(format!("no stake to draw leaders of epoch {epoch} from"));
        }
        debug!(epoch, holders = stakes.len(), "Drew stake-weighted leader schedule");
        Ok(schedule)
    }
}
