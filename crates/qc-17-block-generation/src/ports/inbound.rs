//! Inbound ports (driving side - API)

use crate::config::GenerationConfig;
use crate::domain::{Monoid, SecretKeyRegistry};
use crate::error::Result;
use async_trait::async_trait;
use shared_types::{Blund, EpochOrSlot};

/// Primary port: chain extension
#[async_trait]
pub trait ChainGenerationApi: Send + Sync {
    /// Extend the chain by `params.block_count` points past the tip
    ///
    /// Every point is mapped through `inject`: `Some(blund)` for an applied
    /// block, `None` for a skipped slot. The results are folded with
    /// [`Monoid::combine`]. On failure the partial accumulator is dropped;
    /// blocks applied before the failure stay applied.
    async fn generate_chain<T, F>(&self, params: &GenerationParameters, inject: F) -> Result<T>
    where
        T: Monoid + Send,
        F: FnMut(Option<Blund>) -> T + Send;

    /// Undo applied blocks, newest first
    ///
    /// `blunds` is in application order; the last one must be the tip.
    async fn rollback(&self, blunds: &[Blund]) -> Result<()>;

    /// Current tip and counters
    async fn status(&self) -> Result<GenerationStatus>;
}

/// What to generate and with which keys
#[derive(Clone, Debug, Default)]
pub struct GenerationParameters {
    /// Number of cursor points to generate
    pub block_count: u64,

    /// Locally held signing keys
    pub secrets: SecretKeyRegistry,

    /// Skip slots whose producer has no local key instead of failing
    pub skip_if_no_key: bool,
}

impl GenerationParameters {
    /// Parameters for `block_count` points using `config`'s skip policy
    pub fn from_config(
        config: &GenerationConfig,
        block_count: u64,
        secrets: SecretKeyRegistry,
    ) -> Self {
        Self {
            block_count,
            secrets,
            skip_if_no_key: config.skip_if_no_key,
        }
    }
}

/// Snapshot of generator state
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationStatus {
    /// Position of the tip
    pub tip: EpochOrSlot,

    /// Chain difficulty at the tip
    pub difficulty: u64,

    /// Genesis blocks applied by this generator
    pub genesis_blocks: u64,

    /// Main blocks applied by this generator
    pub main_blocks: u64,

    /// Slots skipped for lack of a key
    pub slots_skipped: u64,

    /// Leader schedules computed
    pub schedules_computed: u64,

    /// Average verify + apply time (microseconds)
    pub avg_apply_time_us: f64,
}
