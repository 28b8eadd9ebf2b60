//! Block construction
//!
//! Genesis blocks are a pure function of the epoch, the tip and the
//! schedule. Main blocks additionally need a payload and the producer's key
//! and can be rejected.

use super::context::SlotContext;
use super::leader::ResolvedLeader;
use crate::config::GenerationConfig;
use crate::error::{GenerationError, Result};
use shared_crypto::Ed25519KeyPair;
use shared_types::{
    Block, BlockHeader, EpochIndex, EpochOrSlot, GenesisBlock, MainBlock, Payload, SlotId,
    StakeholderId,
};

/// Size limits enforced on main blocks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildLimits {
    /// Maximum serialized payload size in bytes
    pub max_block_size: u64,
    /// Maximum transactions per payload
    pub max_payload_txs: usize,
}

impl From<&GenerationConfig> for BuildLimits {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_block_size: config.max_block_size,
            max_payload_txs: config.max_payload_txs,
        }
    }
}

/// Genesis block opening `epoch` on top of `tip`
pub fn build_genesis(tip: &BlockHeader, epoch: EpochIndex, leaders: &[StakeholderId]) -> Block {
    Block::Genesis(GenesisBlock::new(tip, epoch, leaders.to_vec()))
}

/// Main block for `slot`, signed with `key`
///
/// `key` must belong to `leader.producer`: the scheduled leader when there
/// is no certificate, the certificate's delegate otherwise.
pub fn build_main(
    ctx: &SlotContext,
    tip: &BlockHeader,
    slot: SlotId,
    leader: &ResolvedLeader,
    key: &Ed25519KeyPair,
    payload: Payload,
    limits: BuildLimits,
) -> Result<Block> {
    let fail = |reason: String| GenerationError::BuildFailed { slot, reason };

    if ctx.point() != EpochOrSlot::Slot(slot) {
        return Err(fail(format!("current slot is {}", ctx.point())));
    }
    if slot.slot.0 >= ctx.epoch_length() {
        return Err(fail(format!(
            "slot index outside epoch of {} slots",
            ctx.epoch_length()
        )));
    }
    if EpochOrSlot::Slot(slot) <= tip.point() {
        return Err(fail(format!("slot does not follow tip at {}", tip.point())));
    }
    let signer = StakeholderId::from_public_key(&key.public_key());
    if signer != leader.producer {
        return Err(fail(format!(
            "signing key belongs to {signer}, producer is {}",
            leader.producer
        )));
    }
    if payload.transactions.len() > limits.max_payload_txs {
        return Err(fail(format!(
            "{} transactions exceed limit of {}",
            payload.transactions.len(),
            limits.max_payload_txs
        )));
    }
    let size = bincode::serialized_size(&payload).map_err(|e| fail(e.to_string()))?;
    if size > limits.max_block_size {
        return Err(fail(format!(
            "payload of {size} bytes exceeds limit of {}",
            limits.max_block_size
        )));
    }

    Ok(Block::Main(MainBlock::new(
        tip,
        slot,
        payload,
        key,
        leader.certificate.clone(),
    )))
}
