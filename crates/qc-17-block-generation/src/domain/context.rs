//! Scoped "current slot" context
//!
//! One [`SlotContext`] is created for each point the driver generates and
//! dropped once that point's block is applied. Slot-sensitive reads during
//! payload selection, building and verification take it as an argument.

use shared_types::{EpochIndex, EpochOrSlot, SlotCount, SlotId};

/// The point currently being generated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotContext {
    point: EpochOrSlot,
    epoch_length: SlotCount,
}

impl SlotContext {
    /// Enter `point`
    pub fn new(point: EpochOrSlot, epoch_length: SlotCount) -> Self {
        Self {
            point,
            epoch_length,
        }
    }

    /// Point being generated
    pub fn point(&self) -> EpochOrSlot {
        self.point
    }

    /// Epoch of the point
    pub fn epoch(&self) -> EpochIndex {
        self.point.epoch()
    }

    /// Current slot, `None` while generating a genesis block
    pub fn current_slot(&self) -> Option<SlotId> {
        self.point.slot()
    }

    /// Slots per epoch
    pub fn epoch_length(&self) -> SlotCount {
        self.epoch_length
    }
}
