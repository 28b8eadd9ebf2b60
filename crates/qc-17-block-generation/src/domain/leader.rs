//! Slot leader lookup and delegation indirection
//!
//! Delegation is a single hop: the effective producer of a slot is either
//! the scheduled leader or the delegate named in the leader's active
//! certificate. Certificates are never followed transitively.

use crate::error::{GenerationError, Result};
use shared_types::{DelegationCertificate, EpochIndex, SlotCount, SlotId, StakeholderId};

/// Who produces a slot and under which authority
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedLeader {
    /// Leader named by the schedule
    pub raw_leader: StakeholderId,
    /// Stakeholder whose key signs the block
    pub producer: StakeholderId,
    /// Certificate to embed when `producer != raw_leader`
    pub certificate: Option<DelegationCertificate>,
}

impl ResolvedLeader {
    /// Apply the leader's active delegation, if any
    pub fn new(raw_leader: StakeholderId, certificate: Option<DelegationCertificate>) -> Self {
        let producer = certificate
            .as_ref()
            .map_or(raw_leader, DelegationCertificate::delegate);
        Self {
            raw_leader,
            producer,
            certificate,
        }
    }

    /// Whether the block will carry a proxy signature
    pub fn is_delegated(&self) -> bool {
        self.certificate.is_some()
    }
}

/// Reject schedules with more entries than the epoch has slots
pub fn check_schedule(
    epoch: EpochIndex,
    schedule: &[StakeholderId],
    epoch_length: SlotCount,
) -> Result<()> {
    if schedule.len() > epoch_length as usize {
        return Err(GenerationError::MalformedSchedule {
            epoch,
            reason: format!(
                "{} leaders for an epoch of {} slots",
                schedule.len(),
                epoch_length
            ),
        });
    }
    Ok(())
}

/// Scheduled leader of `slot`
///
/// Fails with `NoLeaderForSlot` when the schedule is shorter than the
/// epoch, whichever slot is asked for.
pub fn leader_at(
    schedule: &[StakeholderId],
    slot: SlotId,
    epoch_length: SlotCount,
) -> Result<StakeholderId> {
    let missing = || GenerationError::NoLeaderForSlot {
        epoch: slot.epoch,
        slot,
        schedule_len: schedule.len(),
    };
    if schedule.len() < epoch_length as usize {
        return Err(missing());
    }
    schedule.get(slot.slot.0 as usize).copied().ok_or_else(missing)
}
