//! Block verification against chain state
//!
//! Checks run in two groups. Header rules (linkage, position, difficulty,
//! leadership, signatures) come first; payload rules (witnesses,
//! certificates, votes) only run when the header is sound. Errors within a
//! group are collected rather than stopping at the first one.

use super::context::SlotContext;
use super::leader::leader_at;
use super::state::{ChainState, StateError};
use shared_types::{
    leaders_proof, Block, BlockSignature, ChainDifficulty, Coin, EpochIndex, EpochOrSlot,
    GenesisBlock, MainBlock, SlotCount, SlotId, StakeholderId, TxIn, TxOut, UndoRecord,
};
use std::collections::BTreeMap;
use thiserror::Error;

/// A rule a block broke
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// Parent hash is not the tip hash
    #[error("previous hash does not match the tip")]
    PrevHashMismatch,

    /// Block does not come after the tip
    #[error("block at {point} does not follow tip at {tip}")]
    NotAfterTip {
        /// Block position
        point: EpochOrSlot,
        /// Tip position
        tip: EpochOrSlot,
    },

    /// Block is ahead of the slot being generated
    #[error("block at {point} is ahead of current point {current}")]
    AheadOfCurrent {
        /// Block position
        point: EpochOrSlot,
        /// Current point
        current: EpochOrSlot,
    },

    /// Genesis block skips or repeats an epoch
    #[error("genesis of epoch {epoch} cannot follow epoch {tip_epoch}")]
    WrongGenesisEpoch {
        /// Epoch of the block
        epoch: EpochIndex,
        /// Epoch of the tip
        tip_epoch: EpochIndex,
    },

    /// Main block is not in the tip's epoch
    #[error("slot {slot} is outside tip epoch {tip_epoch}")]
    WrongSlotEpoch {
        /// Slot of the block
        slot: SlotId,
        /// Epoch of the tip
        tip_epoch: EpochIndex,
    },

    /// Slot index is not below the epoch length
    #[error("slot {slot} is outside an epoch of {epoch_length} slots")]
    SlotOutOfRange {
        /// Slot of the block
        slot: SlotId,
        /// Slots per epoch
        epoch_length: SlotCount,
    },

    /// No schedule memoized for the epoch
    #[error("no leader schedule for epoch {0}")]
    MissingSchedule(EpochIndex),

    /// Genesis leaders differ from the memoized schedule
    #[error("genesis leaders differ from the schedule of epoch {0}")]
    LeadersMismatch(EpochIndex),

    /// Schedule has no leader for the slot
    #[error("schedule has no leader for slot {0}")]
    NoScheduledLeader(SlotId),

    /// Difficulty does not follow the tip
    #[error("difficulty {actual}, expected {expected}")]
    WrongDifficulty {
        /// Expected difficulty
        expected: ChainDifficulty,
        /// Header difficulty
        actual: ChainDifficulty,
    },

    /// Body proof does not commit to the body
    #[error("body proof does not match the block body")]
    BodyProofMismatch,

    /// Header signature is invalid
    #[error("invalid block signature")]
    BadBlockSignature,

    /// Direct signer is not the slot leader
    #[error("{signer} is not the leader {leader} of slot {slot}")]
    NotSlotLeader {
        /// Slot of the block
        slot: SlotId,
        /// Scheduled leader
        leader: StakeholderId,
        /// Actual signer
        signer: StakeholderId,
    },

    /// Proxy certificate does not authorise the signer
    #[error("invalid proxy certificate: {0}")]
    InvalidProxyCertificate(String),

    /// Transaction without inputs
    #[error("transaction {0} has no inputs")]
    NoInputs(String),

    /// Witness count does not match input count
    #[error("transaction {tx} has {witnesses} witnesses for {inputs} inputs")]
    WitnessCount {
        /// Hex transaction id
        tx: String,
        /// Inputs
        inputs: usize,
        /// Witnesses
        witnesses: usize,
    },

    /// Witness signature or owner is wrong
    #[error("bad witness for input {input} of transaction {tx}")]
    BadWitness {
        /// Hex transaction id
        tx: String,
        /// Input position
        input: usize,
    },

    /// Output carries no value
    #[error("transaction {0} has a zero-value output")]
    ZeroOutput(String),

    /// Payload certificate is invalid
    #[error("invalid delegation certificate of {issuer}: {reason}")]
    InvalidCertificate {
        /// Certificate issuer
        issuer: StakeholderId,
        /// What is wrong
        reason: String,
    },

    /// Vote signature is invalid
    #[error("invalid vote signature by {0}")]
    BadVoteSignature(StakeholderId),

    /// Voter holds no stake
    #[error("vote by {0} who holds no stake")]
    VoterWithoutStake(StakeholderId),

    /// State transition rejected the block
    #[error("state transition failed: {0}")]
    State(#[from] StateError),

    /// Chain state could not be read
    #[error("chain state unavailable: {0}")]
    StateUnavailable(String),
}

/// Auxiliary effects of a verified block sequence
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateDeltas {
    /// Net stake change per stakeholder (non-zero entries only)
    pub stake_changes: BTreeMap<StakeholderId, i128>,
    /// Transactions included
    pub transactions: usize,
    /// Delegation certificates registered
    pub certificates: usize,
    /// Update votes cast
    pub votes: usize,
}

impl StateDeltas {
    fn between(before: &ChainState, after: &ChainState, blocks: &[Block]) -> Self {
        let mut stake_changes = BTreeMap::new();
        let ids = before
            .stake_distribution()
            .keys()
            .chain(after.stake_distribution().keys());
        for id in ids {
            let change = i128::from(after.stake_of(id)) - i128::from(before.stake_of(id));
            if change != 0 {
                stake_changes.insert(*id, change);
            }
        }

        let payloads = blocks.iter().filter_map(Block::payload);
        let (transactions, certificates, votes) =
            payloads.fold((0, 0, 0), |(t, c, v), p| {
                (
                    t + p.transactions.len(),
                    c + p.certificates.len(),
                    v + p.votes.len(),
                )
            });

        Self {
            stake_changes,
            transactions,
            certificates,
            votes,
        }
    }
}

/// Verify `blocks` in order on top of `state`
///
/// Each block is checked against the state left by the previous one. On
/// success returns one undo record per block; `state` itself is not
/// modified.
pub fn verify_blocks(
    state: &ChainState,
    ctx: &SlotContext,
    blocks: &[Block],
) -> Result<(Vec<UndoRecord>, StateDeltas), Vec<VerificationError>> {
    let mut working = state.clone();
    let mut undos = Vec::with_capacity(blocks.len());

    for block in blocks {
        let errors = check_block(&working, ctx, block);
        if !errors.is_empty() {
            return Err(errors);
        }
        let undo = working
            .apply_block(block)
            .map_err(|e| vec![VerificationError::from(e)])?;
        undos.push(undo);
    }

    let deltas = StateDeltas::between(state, &working, blocks);
    Ok((undos, deltas))
}

/// All rule violations of `block` against `state`
pub fn check_block(state: &ChainState, ctx: &SlotContext, block: &Block) -> Vec<VerificationError> {
    let mut errors = Vec::new();
    let tip = state.tip();
    let point = block.point();

    if block.prev_hash() != state.tip_hash() {
        errors.push(VerificationError::PrevHashMismatch);
    }
    if point <= tip.point() {
        errors.push(VerificationError::NotAfterTip {
            point,
            tip: tip.point(),
        });
    }
    if point > ctx.point() {
        errors.push(VerificationError::AheadOfCurrent {
            point,
            current: ctx.point(),
        });
    }

    match block {
        Block::Genesis(genesis) => check_genesis(state, genesis, &mut errors),
        Block::Main(main) => {
            check_main_header(state, ctx.epoch_length(), main, &mut errors);
            if errors.is_empty() {
                check_payload(state, main, &mut errors);
            }
        }
    }

    errors
}

fn check_genesis(state: &ChainState, block: &GenesisBlock, errors: &mut Vec<VerificationError>) {
    let header = &block.header;
    let tip = state.tip();

    if header.epoch != tip.epoch() + 1 {
        errors.push(VerificationError::WrongGenesisEpoch {
            epoch: header.epoch,
            tip_epoch: tip.epoch(),
        });
    }
    if header.difficulty != tip.difficulty() {
        errors.push(VerificationError::WrongDifficulty {
            expected: tip.difficulty(),
            actual: header.difficulty,
        });
    }
    if header.body_proof != leaders_proof(&block.leaders) {
        errors.push(VerificationError::BodyProofMismatch);
    }
    match state.leaders(header.epoch) {
        None => errors.push(VerificationError::MissingSchedule(header.epoch)),
        Some(schedule) if schedule != block.leaders.as_slice() => {
            errors.push(VerificationError::LeadersMismatch(header.epoch))
        }
        Some(_) => {}
    }
}

fn check_main_header(
    state: &ChainState,
    epoch_length: SlotCount,
    block: &MainBlock,
    errors: &mut Vec<VerificationError>,
) {
    let header = &block.header;
    let tip = state.tip();
    let slot = header.slot;

    if slot.epoch != tip.epoch() {
        errors.push(VerificationError::WrongSlotEpoch {
            slot,
            tip_epoch: tip.epoch(),
        });
    }
    if slot.slot.0 >= epoch_length {
        errors.push(VerificationError::SlotOutOfRange { slot, epoch_length });
    }
    if header.difficulty != tip.difficulty() + 1 {
        errors.push(VerificationError::WrongDifficulty {
            expected: tip.difficulty() + 1,
            actual: header.difficulty,
        });
    }
    if header.body_proof != block.payload.proof() {
        errors.push(VerificationError::BodyProofMismatch);
    }
    if header.verify_signature().is_err() {
        errors.push(VerificationError::BadBlockSignature);
    }

    let Some(schedule) = state.leaders(slot.epoch) else {
        errors.push(VerificationError::MissingSchedule(slot.epoch));
        return;
    };
    let Ok(leader) = leader_at(schedule, slot, epoch_length) else {
        errors.push(VerificationError::NoScheduledLeader(slot));
        return;
    };

    match &header.signature {
        BlockSignature::Direct(_) => {
            let signer = header.producer();
            if signer != leader {
                errors.push(VerificationError::NotSlotLeader {
                    slot,
                    leader,
                    signer,
                });
            }
        }
        BlockSignature::Proxy { certificate, .. } => {
            let invalid = |reason: &str| VerificationError::InvalidProxyCertificate(reason.into());
            if certificate.verify().is_err() {
                errors.push(invalid("bad issuer signature"));
            }
            if certificate.issuer() != leader {
                errors.push(invalid("issuer is not the slot leader"));
            }
            if certificate.delegate_pk != header.producer_pk {
                errors.push(invalid("delegate is not the block signer"));
            }
            if !certificate.covers(slot.epoch) {
                errors.push(invalid("certificate does not cover the epoch"));
            }
            if state.active_delegation(&leader, slot.epoch) != Some(certificate) {
                errors.push(invalid("certificate is not the active delegation"));
            }
        }
    }
}

fn check_payload(state: &ChainState, block: &MainBlock, errors: &mut Vec<VerificationError>) {
    let mut created: BTreeMap<TxIn, TxOut> = BTreeMap::new();

    for tx in &block.payload.transactions {
        let tx_id = tx.id();
        let tx_hex = hex::encode(tx_id);

        if tx.inputs.is_empty() {
            errors.push(VerificationError::NoInputs(tx_hex.clone()));
        }
        if tx.witnesses.len() != tx.inputs.len() {
            errors.push(VerificationError::WitnessCount {
                tx: tx_hex.clone(),
                inputs: tx.inputs.len(),
                witnesses: tx.witnesses.len(),
            });
        }
        for (position, (input, witness)) in tx.inputs.iter().zip(&tx.witnesses).enumerate() {
            // Missing inputs are reported by the state transition.
            let owner = state
                .utxo(input)
                .or_else(|| created.get(input))
                .map(|out| out.owner);
            let signed = witness.public_key.verify(&tx_id, &witness.signature).is_ok();
            let owns = owner.map_or(true, |owner| {
                owner == StakeholderId::from_public_key(&witness.public_key)
            });
            if !signed || !owns {
                errors.push(VerificationError::BadWitness {
                    tx: tx_hex.clone(),
                    input: position,
                });
            }
        }
        if tx.outputs.iter().any(|out| out.value == 0) {
            errors.push(VerificationError::ZeroOutput(tx_hex));
        }
        created.extend(tx.created_outpoints());
    }

    for cert in &block.payload.certificates {
        let issuer = cert.issuer();
        if let Err(e) = cert.verify() {
            errors.push(VerificationError::InvalidCertificate {
                issuer,
                reason: e.to_string(),
            });
        }
        if cert.valid_from > cert.valid_until {
            errors.push(VerificationError::InvalidCertificate {
                issuer,
                reason: "empty validity window".into(),
            });
        }
    }

    for vote in &block.payload.votes {
        let voter = vote.voter_id();
        let bytes = shared_types::UpdateVote::signing_bytes(&vote.proposal, vote.approve);
        if vote.voter.verify(&bytes, &vote.signature).is_err() {
            errors.push(VerificationError::BadVoteSignature(voter));
        }
        let stake: Coin = state.stake_of(&voter);
        if stake == 0 {
            errors.push(VerificationError::VoterWithoutStake(voter));
        }
    }
}
