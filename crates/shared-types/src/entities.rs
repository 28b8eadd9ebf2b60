//! # Core Domain Entities
//!
//! Identities, UTXO transactions and the block payload.
//!
//! ## Clusters
//!
//! - **Identity**: `StakeholderId`
//! - **Value transfer**: `TxIn`, `TxOut`, `Transaction`, `TxWitness`
//! - **Update protocol**: `UpdateVote`
//! - **Payload**: `Payload` (transactions, delegation certificates, votes)

use crate::delegation::DelegationCertificate;
use serde::{Deserialize, Serialize};
use shared_crypto::{Blake3Hasher, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use std::fmt;

pub use shared_crypto::Hash;

/// Hash of a block header.
pub type HeaderHash = Hash;

/// Hash identifying a transaction.
pub type TxId = Hash;

/// Amount of coin, in base units.
pub type Coin = u64;

/// Identity of a stake holder: the BLAKE3 hash of its public key.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct StakeholderId(pub Hash);

impl StakeholderId {
    /// Identity owning `public_key`.
    pub fn from_public_key(public_key: &Ed25519PublicKey) -> Self {
        let mut hasher = Blake3Hasher::tagged("stakeholder-id");
        hasher.update(public_key.as_bytes());
        Self(hasher.finalize())
    }
}

impl fmt::Display for StakeholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for StakeholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StakeholderId({self})")
    }
}

/// Reference to an output of an earlier transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxIn {
    /// Transaction that created the output.
    pub tx_id: TxId,
    /// Output position inside that transaction.
    pub index: u32,
}

/// A transaction output: coin owned by a stakeholder.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    /// Owner of the coin.
    pub owner: StakeholderId,
    /// Amount.
    pub value: Coin,
}

/// Proof that the owner of an input authorised spending it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxWitness {
    /// Key of the input owner.
    pub public_key: Ed25519PublicKey,
    /// Signature over the transaction id.
    pub signature: Ed25519Signature,
}

/// A UTXO transaction. Witness `i` authorises input `i`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Spent outputs.
    pub inputs: Vec<TxIn>,
    /// Created outputs.
    pub outputs: Vec<TxOut>,
    /// One witness per input.
    pub witnesses: Vec<TxWitness>,
}

impl Transaction {
    /// Build a transaction and sign each input with the matching key.
    pub fn signed(inputs: Vec<TxIn>, outputs: Vec<TxOut>, signers: &[&Ed25519KeyPair]) -> Self {
        let id = Self::compute_id(&inputs, &outputs);
        let witnesses = signers
            .iter()
            .map(|key| TxWitness {
                public_key: key.public_key(),
                signature: key.sign(&id),
            })
            .collect();
        Self {
            inputs,
            outputs,
            witnesses,
        }
    }

    /// Transaction id. Witnesses are not part of it.
    pub fn id(&self) -> TxId {
        Self::compute_id(&self.inputs, &self.outputs)
    }

    fn compute_id(inputs: &[TxIn], outputs: &[TxOut]) -> TxId {
        let mut hasher = Blake3Hasher::tagged("tx");
        hasher.update_u64(inputs.len() as u64);
        for input in inputs {
            hasher.update(&input.tx_id).update_u64(u64::from(input.index));
        }
        hasher.update_u64(outputs.len() as u64);
        for output in outputs {
            hasher.update(&output.owner.0).update_u64(output.value);
        }
        hasher.finalize()
    }

    /// Sum of output values, `None` on overflow.
    pub fn output_total(&self) -> Option<Coin> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
    }

    /// Outpoints this transaction creates, in output order.
    pub fn created_outpoints(&self) -> impl Iterator<Item = (TxIn, TxOut)> + '_ {
        let tx_id = self.id();
        self.outputs.iter().enumerate().map(move |(index, out)| {
            (
                TxIn {
                    tx_id,
                    index: index as u32,
                },
                *out,
            )
        })
    }
}

/// A stakeholder's vote on a software update proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateVote {
    /// Key of the voter.
    pub voter: Ed25519PublicKey,
    /// Proposal being voted on.
    pub proposal: Hash,
    /// `true` to approve.
    pub approve: bool,
    /// Voter's signature over `(proposal, approve)`.
    pub signature: Ed25519Signature,
}

impl UpdateVote {
    /// Cast and sign a vote.
    pub fn new(voter: &Ed25519KeyPair, proposal: Hash, approve: bool) -> Self {
        let signature = voter.sign(&Self::signing_bytes(&proposal, approve));
        Self {
            voter: voter.public_key(),
            proposal,
            approve,
            signature,
        }
    }

    /// Bytes covered by the vote signature.
    pub fn signing_bytes(proposal: &Hash, approve: bool) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(33);
        bytes.extend_from_slice(proposal);
        bytes.push(u8::from(approve));
        bytes
    }

    /// Identity of the voter.
    pub fn voter_id(&self) -> StakeholderId {
        StakeholderId::from_public_key(&self.voter)
    }
}

/// Body of a main block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Value transfers.
    pub transactions: Vec<Transaction>,
    /// Heavyweight delegation certificates to register.
    pub certificates: Vec<DelegationCertificate>,
    /// Update-protocol votes.
    pub votes: Vec<UpdateVote>,
}

impl Payload {
    /// Payload with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the payload carries nothing.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.certificates.is_empty() && self.votes.is_empty()
    }

    /// Commitment to the payload, stored in the main header.
    pub fn proof(&self) -> Hash {
        let mut hasher = Blake3Hasher::tagged("payload");
        hasher.update_u64(self.transactions.len() as u64);
        for tx in &self.transactions {
            hasher.update(&tx.id());
            for witness in &tx.witnesses {
                hasher
                    .update(witness.public_key.as_bytes())
                    .update(witness.signature.as_bytes());
            }
        }
        hasher.update_u64(self.certificates.len() as u64);
        for cert in &self.certificates {
            hasher.update(&cert.hash());
        }
        hasher.update_u64(self.votes.len() as u64);
        for vote in &self.votes {
            hasher
                .update(vote.voter.as_bytes())
                .update(&vote.proposal)
                .update(&[u8::from(vote.approve)])
                .update(vote.signature.as_bytes());
        }
        hasher.finalize()
    }
}
