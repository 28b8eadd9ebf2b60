//! Events emitted by the block generation subsystem

use serde::{Deserialize, Serialize};
use shared_types::{Blund, EpochOrSlot, HeaderHash, StakeholderId};

/// Event: a block became the tip
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAppliedEvent {
    /// Hash of the applied block
    pub block_hash: HeaderHash,

    /// Position of the block
    pub point: EpochOrSlot,

    /// Chain difficulty after the block
    pub difficulty: u64,

    /// Signer of a main block, `None` for genesis blocks
    pub producer: Option<StakeholderId>,

    /// Transactions in the block
    pub transaction_count: usize,
}

impl BlockAppliedEvent {
    /// Describe an applied blund
    pub fn from_blund(blund: &Blund) -> Self {
        let header = blund.block.header();
        let producer = match &header {
            shared_types::BlockHeader::Genesis(_) => None,
            shared_types::BlockHeader::Main(main) => Some(main.producer()),
        };
        Self {
            block_hash: header.hash(),
            point: header.point(),
            difficulty: header.difficulty(),
            producer,
            transaction_count: blund
                .block
                .payload()
                .map_or(0, |payload| payload.transactions.len()),
        }
    }
}
