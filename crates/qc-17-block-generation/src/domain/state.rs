//! Chain state and its block transition
//!
//! [`ChainState`] is the full state the engine reads and writes: UTXO set,
//! stake distribution, delegation graph, update votes, memoized leader
//! schedules and the tip header.
//!
//! Stake is kept incrementally: every unspent output adds its value to its
//! owner's stake, and owners with zero stake have no entry. This keeps two
//! states that hold the same outputs structurally equal, which rollback
//! relies on.

use shared_crypto::Blake3Hasher;
use shared_types::{
    Block, BlockHeader, Blund, Coin, DelegationCertificate, EpochIndex, EpochOrSlot,
    GenesisBlock, Hash, HeaderHash, StakeholderId, TxIn, TxOut, UndoRecord, VoteKey,
};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors of the state transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Block's parent is not the tip, or it does not come after the tip
    #[error("Block at {point} does not extend tip at {tip}")]
    NotExtendingTip {
        /// Block position
        point: EpochOrSlot,
        /// Tip position
        tip: EpochOrSlot,
    },

    /// Transaction input is not in the UTXO set
    #[error("Input {tx_id}:{index} is not unspent")]
    MissingInput {
        /// Hex transaction id
        tx_id: String,
        /// Output index
        index: u32,
    },

    /// Transaction outputs exceed its inputs
    #[error("Transaction {tx_id} creates {outputs} from {inputs}")]
    ValueNotConserved {
        /// Hex transaction id
        tx_id: String,
        /// Sum of inputs
        inputs: Coin,
        /// Sum of outputs
        outputs: Coin,
    },

    /// Coin arithmetic overflowed
    #[error("Coin value overflow")]
    ValueOverflow,

    /// Stored undo record differs from the recomputed one
    #[error("Undo record does not match block at {0}")]
    UndoMismatch(EpochOrSlot),

    /// Rolled-back block is not the tip
    #[error("Cannot roll back {point}: tip is at {tip}")]
    NotTip {
        /// Block position
        point: EpochOrSlot,
        /// Tip position
        tip: EpochOrSlot,
    },

    /// Undo record is missing the previous tip
    #[error("Undo record of {0} has no previous tip")]
    IncompleteUndo(EpochOrSlot),

    /// Bootstrap description is unusable
    #[error("Invalid genesis spec: {0}")]
    InvalidGenesis(String),
}

/// Initial chain state description
#[derive(Clone, Debug, Default)]
pub struct GenesisSpec {
    /// Epoch whose genesis point is the starting tip
    pub start_epoch: EpochIndex,
    /// Initial coin per stakeholder, one output each
    pub balances: Vec<(StakeholderId, Coin)>,
    /// Delegations in force from the start
    pub delegations: Vec<DelegationCertificate>,
    /// Leader schedule of the start epoch, if known up front
    pub leaders: Option<Vec<StakeholderId>>,
}

/// Id of the pseudo-transaction holding bootstrap outputs
pub fn bootstrap_tx_id() -> Hash {
    Blake3Hasher::tagged("bootstrap-utxo").finalize()
}

/// Full chain state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainState {
    utxo: BTreeMap<TxIn, TxOut>,
    stakes: BTreeMap<StakeholderId, Coin>,
    delegation: BTreeMap<StakeholderId, DelegationCertificate>,
    votes: BTreeMap<VoteKey, bool>,
    schedules: BTreeMap<EpochIndex, Vec<StakeholderId>>,
    tip: BlockHeader,
}

impl ChainState {
    /// Build the initial state
    ///
    /// The tip is an unsigned genesis header for `start_epoch` with a zero
    /// parent hash.
    pub fn bootstrap(spec: GenesisSpec) -> Result<Self, StateError> {
        let tx_id = bootstrap_tx_id();
        let mut total: Coin = 0;
        let mut state = Self {
            utxo: BTreeMap::new(),
            stakes: BTreeMap::new(),
            delegation: BTreeMap::new(),
            votes: BTreeMap::new(),
            schedules: BTreeMap::new(),
            tip: BlockHeader::Genesis(
                GenesisBlock::with_parent(
                    [0u8; 32],
                    0,
                    spec.start_epoch,
                    spec.leaders.clone().unwrap_or_default(),
                )
                .header,
            ),
        };

        for (index, (owner, value)) in spec.balances.into_iter().enumerate() {
            if value == 0 {
                continue;
            }
            total = total.checked_add(value).ok_or(StateError::ValueOverflow)?;
            let input = TxIn {
                tx_id,
                index: u32::try_from(index)
                    .map_err(|_| StateError::InvalidGenesis("too many balances".into()))?,
            };
            state.add_output(input, TxOut { owner, value });
        }

        for cert in spec.delegations {
            cert.verify().map_err(|e| {
                StateError::InvalidGenesis(format!("certificate of {}: {e}", cert.issuer()))
            })?;
            if !cert.is_revocation() {
                state.delegation.insert(cert.issuer(), cert);
            }
        }

        if let Some(leaders) = spec.leaders {
            state.schedules.insert(spec.start_epoch, leaders);
        }

        Ok(state)
    }

    /// Tip header
    pub fn tip(&self) -> &BlockHeader {
        &self.tip
    }

    /// Tip hash
    pub fn tip_hash(&self) -> HeaderHash {
        self.tip.hash()
    }

    /// Unspent output at `input`
    pub fn utxo(&self, input: &TxIn) -> Option<&TxOut> {
        self.utxo.get(input)
    }

    /// Number of unspent outputs
    pub fn utxo_len(&self) -> usize {
        self.utxo.len()
    }

    /// Unspent outputs owned by `owner`, in outpoint order
    pub fn unspent_of(&self, owner: &StakeholderId) -> Vec<(TxIn, TxOut)> {
        self.utxo
            .iter()
            .filter(|(_, out)| out.owner == *owner)
            .map(|(input, out)| (*input, *out))
            .collect()
    }

    /// Stake of `id` (zero if absent)
    pub fn stake_of(&self, id: &StakeholderId) -> Coin {
        self.stakes.get(id).copied().unwrap_or(0)
    }

    /// Stake per stakeholder, non-zero entries only
    pub fn stake_distribution(&self) -> &BTreeMap<StakeholderId, Coin> {
        &self.stakes
    }

    /// Sum of all stake
    pub fn total_stake(&self) -> Coin {
        self.stakes.values().sum()
    }

    /// Registered delegation of `issuer`, in force or not
    pub fn delegation_of(&self, issuer: &StakeholderId) -> Option<&DelegationCertificate> {
        self.delegation.get(issuer)
    }

    /// Delegation of `issuer` that covers `epoch`
    pub fn active_delegation(
        &self,
        issuer: &StakeholderId,
        epoch: EpochIndex,
    ) -> Option<&DelegationCertificate> {
        self.delegation
            .get(issuer)
            .filter(|cert| cert.covers(epoch))
    }

    /// Vote of `voter` on `proposal`
    pub fn vote(&self, proposal: &Hash, voter: &StakeholderId) -> Option<bool> {
        self.votes.get(&(*proposal, *voter)).copied()
    }

    /// `(approvals, rejections)` recorded for `proposal`
    pub fn tally(&self, proposal: &Hash) -> (usize, usize) {
        self.votes
            .iter()
            .filter(|((p, _), _)| p == proposal)
            .fold((0, 0), |(yes, no), (_, approve)| {
                if *approve {
                    (yes + 1, no)
                } else {
                    (yes, no + 1)
                }
            })
    }

    /// Memoized leader schedule of `epoch`
    pub fn leaders(&self, epoch: EpochIndex) -> Option<&[StakeholderId]> {
        self.schedules.get(&epoch).map(Vec::as_slice)
    }

    /// Memoize the schedule of `epoch`
    ///
    /// An existing schedule is never replaced; returns whether `leaders`
    /// was stored.
    pub fn put_leaders(&mut self, epoch: EpochIndex, leaders: Vec<StakeholderId>) -> bool {
        if self.schedules.contains_key(&epoch) {
            return false;
        }
        self.schedules.insert(epoch, leaders);
        true
    }

    fn add_output(&mut self, input: TxIn, output: TxOut) {
        *self.stakes.entry(output.owner).or_insert(0) += output.value;
        self.utxo.insert(input, output);
    }

    fn remove_output(&mut self, input: &TxIn) -> Option<TxOut> {
        let output = self.utxo.remove(input)?;
        if let Some(stake) = self.stakes.get_mut(&output.owner) {
            *stake -= output.value;
            if *stake == 0 {
                self.stakes.remove(&output.owner);
            }
        }
        Some(output)
    }

    /// Apply `block`, returning what it destroyed
    ///
    /// Checks only state-level rules (chain linkage, unspent inputs, value
    /// conservation). Signatures and leadership are the verifier's concern.
    /// On error the state is unchanged.
    pub fn apply_block(&mut self, block: &Block) -> Result<UndoRecord, StateError> {
        let point = block.point();
        let tip_point = self.tip.point();
        if block.prev_hash() != self.tip_hash() || point <= tip_point {
            return Err(StateError::NotExtendingTip {
                point,
                tip: tip_point,
            });
        }

        let mut next = self.clone();
        let mut undo = UndoRecord::tip_only(self.tip.clone());

        if let Block::Main(main) = block {
            for tx in &main.payload.transactions {
                let tx_id = tx.id();
                let mut inputs_total: Coin = 0;
                for input in &tx.inputs {
                    let spent =
                        next.remove_output(input)
                            .ok_or_else(|| StateError::MissingInput {
                                tx_id: hex::encode(input.tx_id),
                                index: input.index,
                            })?;
                    inputs_total = inputs_total
                        .checked_add(spent.value)
                        .ok_or(StateError::ValueOverflow)?;
                    undo.spent.push((*input, spent));
                }
                let outputs_total = tx.output_total().ok_or(StateError::ValueOverflow)?;
                if outputs_total > inputs_total {
                    return Err(StateError::ValueNotConserved {
                        tx_id: hex::encode(tx_id),
                        inputs: inputs_total,
                        outputs: outputs_total,
                    });
                }
                for (input, output) in tx.created_outpoints() {
                    next.add_output(input, output);
                }
            }

            for cert in &main.payload.certificates {
                let issuer = cert.issuer();
                let previous = if cert.is_revocation() {
                    next.delegation.remove(&issuer)
                } else {
                    next.delegation.insert(issuer, cert.clone())
                };
                undo.delegation.push((issuer, previous));
            }

            for vote in &main.payload.votes {
                let key = (vote.proposal, vote.voter_id());
                let previous = next.votes.insert(key, vote.approve);
                undo.votes.push((key, previous));
            }
        }

        next.tip = block.header();
        *self = next;
        Ok(undo)
    }

    /// Apply a verified blund, checking its undo record
    pub fn apply(&mut self, blund: &Blund) -> Result<(), StateError> {
        let mut next = self.clone();
        let undo = next.apply_block(&blund.block)?;
        if undo != blund.undo {
            return Err(StateError::UndoMismatch(blund.block.point()));
        }
        *self = next;
        Ok(())
    }

    /// Reverse the tip block using its undo record
    ///
    /// Restores the state exactly as it was before the block was applied.
    pub fn rollback(&mut self, blund: &Blund) -> Result<(), StateError> {
        let point = blund.block.point();
        if blund.block.hash() != self.tip_hash() {
            return Err(StateError::NotTip {
                point,
                tip: self.tip.point(),
            });
        }
        let previous_tip = blund
            .undo
            .previous_tip
            .clone()
            .ok_or(StateError::IncompleteUndo(point))?;

        let mut next = self.clone();

        if let Block::Main(main) = &blund.block {
            for (key, previous) in blund.undo.votes.iter().rev() {
                match previous {
                    Some(approve) => next.votes.insert(*key, *approve),
                    None => next.votes.remove(key),
                };
            }

            for (issuer, previous) in blund.undo.delegation.iter().rev() {
                match previous {
                    Some(cert) => next.delegation.insert(*issuer, cert.clone()),
                    None => next.delegation.remove(issuer),
                };
            }

            // Undo transactions newest first so that outputs spent later in
            // the same block are restored before their creator is removed.
            let mut spent = blund.undo.spent.iter().rev();
            for tx in main.payload.transactions.iter().rev() {
                for (input, _) in tx.created_outpoints() {
                    next.remove_output(&input);
                }
                for expected in tx.inputs.iter().rev() {
                    match spent.next() {
                        Some((input, output)) if input == expected => {
                            next.add_output(*input, *output);
                        }
                        _ => return Err(StateError::UndoMismatch(point)),
                    }
                }
            }
            if spent.next().is_some() {
                return Err(StateError::UndoMismatch(point));
            }
        }

        next.tip = previous_tip;
        *self = next;
        Ok(())
    }
}
