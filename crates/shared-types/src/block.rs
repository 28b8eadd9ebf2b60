//! # Blocks and Headers
//!
//! Two kinds of block share one chain:
//!
//! - a **genesis block** opens every epoch and commits to that epoch's
//!   leader schedule. It is unsigned and carries no payload.
//! - a **main block** fills one slot. It is signed by the slot leader, or
//!   by the leader's delegate with the delegation certificate embedded
//!   (proxy signature).
//!
//! Chain difficulty counts main blocks only, so a genesis block inherits the
//! difficulty of its predecessor.

use crate::delegation::DelegationCertificate;
use crate::entities::{Hash, HeaderHash, Payload, StakeholderId};
use crate::slotting::{EpochIndex, EpochOrSlot, SlotId};
use serde::{Deserialize, Serialize};
use shared_crypto::{Blake3Hasher, CryptoError, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Number of main blocks from the chain start up to and including a block.
pub type ChainDifficulty = u64;

/// Header of a genesis block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisHeader {
    /// Hash of the previous header (all zeros at chain start).
    pub prev_hash: HeaderHash,
    /// Epoch this block opens.
    pub epoch: EpochIndex,
    /// Difficulty inherited from the previous block.
    pub difficulty: ChainDifficulty,
    /// Commitment to the leader list.
    pub body_proof: Hash,
}

/// How a main block was signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockSignature {
    /// Signed by the scheduled leader itself.
    Direct(Ed25519Signature),
    /// Signed by a delegate on the leader's behalf.
    Proxy {
        /// Certificate granting the delegate the leader's right.
        certificate: DelegationCertificate,
        /// Delegate's signature.
        signature: Ed25519Signature,
    },
}

impl BlockSignature {
    /// Embedded certificate, if this is a proxy signature.
    pub fn certificate(&self) -> Option<&DelegationCertificate> {
        match self {
            Self::Direct(_) => None,
            Self::Proxy { certificate, .. } => Some(certificate),
        }
    }

    fn signature(&self) -> &Ed25519Signature {
        match self {
            Self::Direct(signature) | Self::Proxy { signature, .. } => signature,
        }
    }
}

/// Header of a main block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainHeader {
    /// Hash of the previous header.
    pub prev_hash: HeaderHash,
    /// Slot the block fills.
    pub slot: SlotId,
    /// Previous difficulty plus one.
    pub difficulty: ChainDifficulty,
    /// Commitment to the payload.
    pub body_proof: Hash,
    /// Key that produced the signature.
    pub producer_pk: Ed25519PublicKey,
    /// Producer's signature.
    pub signature: BlockSignature,
}

impl MainHeader {
    fn signing_bytes(
        prev_hash: &HeaderHash,
        slot: SlotId,
        difficulty: ChainDifficulty,
        body_proof: &Hash,
        producer_pk: &Ed25519PublicKey,
        certificate: Option<&DelegationCertificate>,
    ) -> Hash {
        let mut hasher = Blake3Hasher::tagged("main-header-sign");
        hasher
            .update(prev_hash)
            .update_u64(slot.epoch)
            .update_u64(u64::from(slot.slot.0))
            .update_u64(difficulty)
            .update(body_proof)
            .update(producer_pk.as_bytes());
        if let Some(cert) = certificate {
            hasher.update(&cert.hash());
        }
        hasher.finalize()
    }

    /// Check the producer's signature over the header fields.
    ///
    /// This does not check whether the producer was entitled to the slot.
    pub fn verify_signature(&self) -> Result<(), CryptoError> {
        let bytes = Self::signing_bytes(
            &self.prev_hash,
            self.slot,
            self.difficulty,
            &self.body_proof,
            &self.producer_pk,
            self.signature.certificate(),
        );
        self.producer_pk.verify(&bytes, self.signature.signature())
    }

    /// Identity of the key that signed.
    pub fn producer(&self) -> StakeholderId {
        StakeholderId::from_public_key(&self.producer_pk)
    }
}

/// Header of either block kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockHeader {
    /// Genesis header.
    Genesis(GenesisHeader),
    /// Main header.
    Main(MainHeader),
}

impl BlockHeader {
    /// Header hash.
    pub fn hash(&self) -> HeaderHash {
        match self {
            Self::Genesis(h) => {
                let mut hasher = Blake3Hasher::tagged("genesis-header");
                hasher
                    .update(&h.prev_hash)
                    .update_u64(h.epoch)
                    .update_u64(h.difficulty)
                    .update(&h.body_proof);
                hasher.finalize()
            }
            Self::Main(h) => {
                let mut hasher = Blake3Hasher::tagged("main-header");
                hasher
                    .update(&MainHeader::signing_bytes(
                        &h.prev_hash,
                        h.slot,
                        h.difficulty,
                        &h.body_proof,
                        &h.producer_pk,
                        h.signature.certificate(),
                    ))
                    .update(h.signature.signature().as_bytes());
                hasher.finalize()
            }
        }
    }

    /// Hash of the previous header.
    pub fn prev_hash(&self) -> HeaderHash {
        match self {
            Self::Genesis(h) => h.prev_hash,
            Self::Main(h) => h.prev_hash,
        }
    }

    /// Position of the block on the cursor.
    pub fn point(&self) -> EpochOrSlot {
        match self {
            Self::Genesis(h) => EpochOrSlot::Epoch(h.epoch),
            Self::Main(h) => EpochOrSlot::Slot(h.slot),
        }
    }

    /// Epoch of the block.
    pub fn epoch(&self) -> EpochIndex {
        self.point().epoch()
    }

    /// Chain difficulty at this block.
    pub fn difficulty(&self) -> ChainDifficulty {
        match self {
            Self::Genesis(h) => h.difficulty,
            Self::Main(h) => h.difficulty,
        }
    }
}

/// Genesis block: header plus the leader schedule of its epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBlock {
    /// Header.
    pub header: GenesisHeader,
    /// Slot leaders of the epoch, indexed by local slot.
    pub leaders: Vec<StakeholderId>,
}

impl GenesisBlock {
    /// Build the genesis block of `epoch` on top of `prev`.
    pub fn new(prev: &BlockHeader, epoch: EpochIndex, leaders: Vec<StakeholderId>) -> Self {
        Self::with_parent(prev.hash(), prev.difficulty(), epoch, leaders)
    }

    /// Build a genesis block from raw parent fields.
    pub fn with_parent(
        prev_hash: HeaderHash,
        difficulty: ChainDifficulty,
        epoch: EpochIndex,
        leaders: Vec<StakeholderId>,
    ) -> Self {
        let header = GenesisHeader {
            prev_hash,
            epoch,
            difficulty,
            body_proof: leaders_proof(&leaders),
        };
        Self { header, leaders }
    }
}

/// Commitment to a leader list.
pub fn leaders_proof(leaders: &[StakeholderId]) -> Hash {
    let mut hasher = Blake3Hasher::tagged("leaders");
    hasher.update_u64(leaders.len() as u64);
    for leader in leaders {
        hasher.update(&leader.0);
    }
    hasher.finalize()
}

/// Main block: header plus payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainBlock {
    /// Header.
    pub header: MainHeader,
    /// Transactions, certificates and votes.
    pub payload: Payload,
}

impl MainBlock {
    /// Assemble and sign a main block for `slot` on top of `prev`.
    ///
    /// With a certificate the block is proxy-signed and `signer` must be the
    /// certificate's delegate; the caller is responsible for that pairing.
    pub fn new(
        prev: &BlockHeader,
        slot: SlotId,
        payload: Payload,
        signer: &Ed25519KeyPair,
        certificate: Option<DelegationCertificate>,
    ) -> Self {
        let prev_hash = prev.hash();
        let difficulty = prev.difficulty() + 1;
        let body_proof = payload.proof();
        let producer_pk = signer.public_key();
        let to_sign = MainHeader::signing_bytes(
            &prev_hash,
            slot,
            difficulty,
            &body_proof,
            &producer_pk,
            certificate.as_ref(),
        );
        let raw = signer.sign(&to_sign);
        let signature = match certificate {
            Some(certificate) => BlockSignature::Proxy {
                certificate,
                signature: raw,
            },
            None => BlockSignature::Direct(raw),
        };
        Self {
            header: MainHeader {
                prev_hash,
                slot,
                difficulty,
                body_proof,
                producer_pk,
                signature,
            },
            payload,
        }
    }
}

/// A block of either kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    /// Epoch-opening block.
    Genesis(GenesisBlock),
    /// Slot block.
    Main(MainBlock),
}

impl Block {
    /// Header of the block.
    pub fn header(&self) -> BlockHeader {
        match self {
            Self::Genesis(b) => BlockHeader::Genesis(b.header.clone()),
            Self::Main(b) => BlockHeader::Main(b.header.clone()),
        }
    }

    /// Header hash.
    pub fn hash(&self) -> HeaderHash {
        self.header().hash()
    }

    /// Hash of the previous header.
    pub fn prev_hash(&self) -> HeaderHash {
        match self {
            Self::Genesis(b) => b.header.prev_hash,
            Self::Main(b) => b.header.prev_hash,
        }
    }

    /// Position of the block on the cursor.
    pub fn point(&self) -> EpochOrSlot {
        match self {
            Self::Genesis(b) => EpochOrSlot::Epoch(b.header.epoch),
            Self::Main(b) => EpochOrSlot::Slot(b.header.slot),
        }
    }

    /// Whether this is a genesis block.
    pub fn is_genesis(&self) -> bool {
        matches!(self, Self::Genesis(_))
    }

    /// Payload, for main blocks.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Genesis(_) => None,
            Self::Main(b) => Some(&b.payload),
        }
    }
}
