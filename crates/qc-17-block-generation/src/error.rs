//! Error types for the block generation subsystem

use shared_types::{EpochIndex, EpochOrSlot, SlotId, StakeholderId};
use thiserror::Error;

/// Result type alias for block generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors that abort a chain generation run
///
/// None of these are retried. Blocks applied before the failure stay
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Leader schedule has fewer entries than the epoch has slots
    #[error("No leader for slot {slot}: schedule of epoch {epoch} has {schedule_len} entries")]
    NoLeaderForSlot {
        /// Epoch of the slot
        epoch: EpochIndex,
        /// Slot that could not be resolved
        slot: SlotId,
        /// Length of the stored schedule
        schedule_len: usize,
    },

    /// Schedule provider returned an unusable schedule
    #[error("Malformed schedule for epoch {epoch}: {reason}")]
    MalformedSchedule {
        /// Epoch of the schedule
        epoch: EpochIndex,
        /// What is wrong with it
        reason: String,
    },

    /// No local signing key for the effective producer
    #[error("No secret key for producer {producer} of slot {slot}")]
    UnknownSecret {
        /// Effective producer (delegate if a certificate applies)
        producer: StakeholderId,
        /// Slot being generated
        slot: SlotId,
    },

    /// Block assembly rejected the payload/slot combination
    #[error("Failed to build block for slot {slot}: {reason}")]
    BuildFailed {
        /// Slot being generated
        slot: SlotId,
        /// Rejection reason
        reason: String,
    },

    /// A freshly built block failed verification
    #[error("Block at {point} is invalid: {details}")]
    BlockInvalid {
        /// Position of the block
        point: EpochOrSlot,
        /// Joined verification errors
        details: String,
    },

    /// Applying a verified block failed
    #[error("Failed to apply block at {point}: {reason}")]
    ApplyFailed {
        /// Position of the block
        point: EpochOrSlot,
        /// Applier error
        reason: String,
    },

    /// Mempool normalization after application failed
    #[error("Mempool normalization after {point} failed: {reason}")]
    MempoolNormalizeFailed {
        /// Position of the block just applied
        point: EpochOrSlot,
        /// Mempool error
        reason: String,
    },

    /// Schedule provider failed
    #[error("Leader schedule computation for epoch {epoch} failed: {reason}")]
    ScheduleComputationFailed {
        /// Epoch requested
        epoch: EpochIndex,
        /// Provider error
        reason: String,
    },

    /// Payload provider failed
    #[error("Payload generation for slot {slot} failed: {reason}")]
    PayloadFailed {
        /// Slot requested
        slot: SlotId,
        /// Provider error
        reason: String,
    },

    /// Chain state store error
    #[error("Store error: {0}")]
    StoreError(String),

    /// Chain state store has not been bootstrapped
    #[error("Chain state is not initialized")]
    NotInitialized,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of a [`GenerationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Schedule or configuration inconsistency
    Configuration,
    /// Missing key while skipping is disabled
    PolicyAbsence,
    /// Block assembly rejected the slot or payload
    Build,
    /// A built block failed verification
    Verification,
    /// Application or mempool normalization failed
    Application,
    /// Schedule provider failure
    Schedule,
    /// Payload provider failure
    Payload,
    /// Store access failure
    Store,
}

impl GenerationError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoLeaderForSlot { .. }
            | Self::MalformedSchedule { .. }
            | Self::InvalidConfig(_) => ErrorKind::Configuration,
            Self::BuildFailed { .. } => ErrorKind::Build,
            Self::UnknownSecret { .. } => ErrorKind::PolicyAbsence,
            Self::BlockInvalid { .. } => ErrorKind::Verification,
            Self::ApplyFailed { .. } | Self::MempoolNormalizeFailed { .. } => {
                ErrorKind::Application
            }
            Self::ScheduleComputationFailed { .. } => ErrorKind::Schedule,
            Self::PayloadFailed { .. } => ErrorKind::Payload,
            Self::StoreError(_) | Self::NotInitialized => ErrorKind::Store,
        }
    }

    /// Whether the error ends the run. Always true: generation never retries.
    pub fn is_fatal(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let slot = SlotId::new(5, 3);
        assert_eq!(
            GenerationError::UnknownSecret {
                producer: StakeholderId::default(),
                slot
            }
            .kind(),
            ErrorKind::PolicyAbsence
        );
        assert_eq!(
            GenerationError::NoLeaderForSlot {
                epoch: 5,
                slot,
                schedule_len: 2
            }
            .kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            GenerationError::MempoolNormalizeFailed {
                point: slot.into(),
                reason: "x".into()
            }
            .kind(),
            ErrorKind::Application
        );
        assert_eq!(
            GenerationError::BuildFailed {
                slot,
                reason: "payload too large".into()
            }
            .kind(),
            ErrorKind::Build
        );
        assert_eq!(GenerationError::NotInitialized.kind(), ErrorKind::Store);
    }

    #[test]
    fn test_every_error_is_fatal() {
        assert!(GenerationError::NotInitialized.is_fatal());
        assert!(GenerationError::StoreError("down".into()).is_fatal());
    }

    #[test]
    fn test_error_message_names_slot_and_producer() {
        let err = GenerationError::UnknownSecret {
            producer: StakeholderId([0xab; 32]),
            slot: SlotId::new(5, 3),
        };
        let msg = err.to_string();
        assert!(msg.contains("5.3"));
        assert!(msg.contains("abababab"));
    }
}
