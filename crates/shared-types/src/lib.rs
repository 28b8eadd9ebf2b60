//! # Shared Types
//!
//! Chain entities shared by the block generation engine and its tests.
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | `slotting` | Epoch/slot coordinates, the `EpochOrSlot` cursor |
//! | `entities` | Identities, transactions, votes, payload |
//! | `delegation` | Heavyweight delegation certificates |
//! | `block` | Genesis/main headers and blocks |
//! | `undo` | Undo records and `Blund` |

#![warn(missing_docs)]

pub mod block;
pub mod delegation;
pub mod entities;
pub mod slotting;
pub mod undo;

pub use block::{
    leaders_proof, Block, BlockHeader, BlockSignature, ChainDifficulty, GenesisBlock,
    GenesisHeader, MainBlock, MainHeader,
};
pub use delegation::DelegationCertificate;
pub use entities::{
    Coin, Hash, HeaderHash, Payload, StakeholderId, Transaction, TxId, TxIn, TxOut, TxWitness,
    UpdateVote,
};
pub use slotting::{
    EpochIndex, EpochOrSlot, EpochOrSlotRange, FlatIndex, LocalSlotIndex, SlotCount, SlotId,
};
pub use undo::{Blund, UndoRecord, VoteKey};
