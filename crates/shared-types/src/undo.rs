//! # Undo Records
//!
//! An [`UndoRecord`] holds what applying one block destroyed, so that the
//! block can be rolled back. What the block created (new outputs, new
//! delegations, new votes) is recovered from the block itself.

use crate::block::{Block, BlockHeader};
use crate::delegation::DelegationCertificate;
use crate::entities::{Hash, StakeholderId, TxIn, TxOut};
use serde::{Deserialize, Serialize};

/// Key of a recorded update vote: `(proposal, voter)`.
pub type VoteKey = (Hash, StakeholderId);

/// Reversal recipe for exactly one block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoRecord {
    /// Outputs the block spent, in spending order.
    pub spent: Vec<(TxIn, TxOut)>,
    /// Delegation entries the block overwrote, with their previous value.
    pub delegation: Vec<(StakeholderId, Option<DelegationCertificate>)>,
    /// Votes the block overwrote, with their previous value.
    pub votes: Vec<(VoteKey, Option<bool>)>,
    /// Tip before the block. `None` only in a default record.
    pub previous_tip: Option<BlockHeader>,
}

impl UndoRecord {
    /// Undo record for a block that only moves the tip.
    pub fn tip_only(previous_tip: BlockHeader) -> Self {
        Self {
            previous_tip: Some(previous_tip),
            ..Self::default()
        }
    }
}

/// Block paired with its undo record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blund {
    /// Applied block.
    pub block: Block,
    /// How to reverse it.
    pub undo: UndoRecord,
}

impl Blund {
    /// Pair a block with its undo record.
    pub fn new(block: Block, undo: UndoRecord) -> Self {
        Self { block, undo }
    }
}
