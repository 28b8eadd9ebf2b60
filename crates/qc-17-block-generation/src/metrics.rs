//! Metrics collection for block generation subsystem

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for chain generation
#[derive(Debug, Default)]
pub struct Metrics {
    /// Genesis blocks applied
    pub genesis_blocks: AtomicU64,

    /// Main blocks applied
    pub main_blocks: AtomicU64,

    /// Slots skipped for lack of a key
    pub slots_skipped: AtomicU64,

    /// Leader schedules computed
    pub schedules_computed: AtomicU64,

    /// Mempool normalizations performed
    pub mempool_normalizations: AtomicU64,

    /// Total verify + apply time (microseconds)
    pub apply_time_us: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied block
    pub fn record_block_applied(&self, genesis: bool, duration_us: u64) {
        if genesis {
            self.genesis_blocks.fetch_add(1, Ordering::Relaxed);
        } else {
            self.main_blocks.fetch_add(1, Ordering::Relaxed);
        }
        self.apply_time_us.fetch_add(duration_us, Ordering::Relaxed);
    }

    /// Record a skipped slot
    pub fn record_slot_skipped(&self) {
        self.slots_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a schedule computation
    pub fn record_schedule_computed(&self) {
        self.schedules_computed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a mempool normalization
    pub fn record_mempool_normalized(&self) {
        self.mempool_normalizations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get blocks applied (both kinds)
    pub fn get_blocks_applied(&self) -> u64 {
        self.genesis_blocks.load(Ordering::Relaxed) + self.main_blocks.load(Ordering::Relaxed)
    }

    /// Get schedules computed
    pub fn get_schedules_computed(&self) -> u64 {
        self.schedules_computed.load(Ordering::Relaxed)
    }

    /// Get average verify + apply time (microseconds)
    pub fn get_avg_apply_time(&self) -> f64 {
        let blocks = self.get_blocks_applied();
        if blocks == 0 {
            return 0.0;
        }
        let time = self.apply_time_us.load(Ordering::Relaxed);
        time as f64 / blocks as f64
    }
}
