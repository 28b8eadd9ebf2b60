//! # Slotting
//!
//! Epoch/slot coordinates and the [`EpochOrSlot`] cursor the chain extension
//! walks over.
//!
//! Every epoch opens with a genesis point followed by `epoch_length` slots:
//!
//! ```text
//! epoch 4                         epoch 5
//! ┌─────────┬─────┬─────┬───┐     ┌─────────┬─────┬───
//! │ genesis │ 4.0 │ 4.1 │...│ ──→ │ genesis │ 5.0 │ ...
//! └─────────┴─────┴─────┴───┘     └─────────┴─────┴───
//! ```
//!
//! For a fixed epoch length the points map one-to-one onto a dense `u128`
//! index: `Epoch(e) ↦ e·(L+1)` and `Slot(e, i) ↦ e·(L+1) + 1 + i`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

/// Index of an epoch.
pub type EpochIndex = u64;

/// Number of slots in one epoch.
pub type SlotCount = u32;

/// Dense position of an [`EpochOrSlot`] for a fixed epoch length.
pub type FlatIndex = u128;

/// Position of a slot inside its epoch, in `[0, epoch_length)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalSlotIndex(pub u32);

impl fmt::Display for LocalSlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Global slot coordinate.
///
/// Field order gives the derived `Ord` the chain order: epoch first, then
/// local index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId {
    /// Epoch containing the slot.
    pub epoch: EpochIndex,
    /// Position inside the epoch.
    pub slot: LocalSlotIndex,
}

impl SlotId {
    /// Create a slot id.
    pub fn new(epoch: EpochIndex, slot: u32) -> Self {
        Self {
            epoch,
            slot: LocalSlotIndex(slot),
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.epoch, self.slot)
    }
}

/// Either the genesis point of an epoch or one of its slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpochOrSlot {
    /// Genesis point opening the epoch.
    Epoch(EpochIndex),
    /// A slot of an epoch.
    Slot(SlotId),
}

impl EpochOrSlot {
    /// Epoch this point belongs to.
    pub fn epoch(&self) -> EpochIndex {
        match self {
            Self::Epoch(epoch) => *epoch,
            Self::Slot(slot) => slot.epoch,
        }
    }

    /// The slot, if this point is not a genesis point.
    pub fn slot(&self) -> Option<SlotId> {
        match self {
            Self::Epoch(_) => None,
            Self::Slot(slot) => Some(*slot),
        }
    }

    /// Position within the epoch: 0 for genesis, `1 + i` for slot `i`.
    fn rank(&self) -> u64 {
        match self {
            Self::Epoch(_) => 0,
            Self::Slot(slot) => 1 + u64::from(slot.slot.0),
        }
    }

    /// Dense index of this point for the given epoch length.
    pub fn to_flat_index(&self, epoch_length: SlotCount) -> FlatIndex {
        let stride = FlatIndex::from(epoch_length) + 1;
        FlatIndex::from(self.epoch()) * stride + FlatIndex::from(self.rank())
    }

    /// Inverse of [`EpochOrSlot::to_flat_index`].
    ///
    /// Indices past the last representable epoch saturate at
    /// `EpochIndex::MAX`; every index produced by `to_flat_index` round-trips.
    pub fn from_flat_index(index: FlatIndex, epoch_length: SlotCount) -> Self {
        let stride = FlatIndex::from(epoch_length) + 1;
        let epoch = EpochIndex::try_from(index / stride).unwrap_or(EpochIndex::MAX);
        match index % stride {
            0 => Self::Epoch(epoch),
            // remainder <= epoch_length, so it fits in u32
            rank => Self::Slot(SlotId::new(epoch, (rank - 1) as u32)),
        }
    }

    /// The next point in chain order.
    pub fn successor(&self, epoch_length: SlotCount) -> Self {
        Self::from_flat_index(self.to_flat_index(epoch_length) + 1, epoch_length)
    }

    /// The point `offset` positions after this one.
    pub fn advance(&self, offset: u64, epoch_length: SlotCount) -> Self {
        Self::from_flat_index(
            self.to_flat_index(epoch_length) + FlatIndex::from(offset),
            epoch_length,
        )
    }

    /// All points from `start` through `end` inclusive, in chain order.
    ///
    /// Empty when `start > end`. The returned iterator is `Clone`, so a
    /// range can be walked again from the beginning.
    pub fn range(epoch_length: SlotCount, start: Self, end: Self) -> EpochOrSlotRange {
        EpochOrSlotRange {
            next: start.to_flat_index(epoch_length),
            end: end.to_flat_index(epoch_length),
            epoch_length,
        }
    }
}

impl Ord for EpochOrSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.epoch(), self.rank()).cmp(&(other.epoch(), other.rank()))
    }
}

impl PartialOrd for EpochOrSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<SlotId> for EpochOrSlot {
    fn from(slot: SlotId) -> Self {
        Self::Slot(slot)
    }
}

impl fmt::Display for EpochOrSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epoch(epoch) => write!(f, "{epoch}.genesis"),
            Self::Slot(slot) => write!(f, "{slot}"),
        }
    }
}

/// Lazy inclusive range of [`EpochOrSlot`] points.
#[derive(Clone, Debug)]
pub struct EpochOrSlotRange {
    next: FlatIndex,
    end: FlatIndex,
    epoch_length: SlotCount,
}

impl Iterator for EpochOrSlotRange {
    type Item = EpochOrSlot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.end {
            return None;
        }
        let point = EpochOrSlot::from_flat_index(self.next, self.epoch_length);
        self.next += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.next > self.end {
            0
        } else {
            self.end - self.next + 1
        };
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for EpochOrSlotRange {}
