//! Follow-the-satoshi leader selection
//!
//! For every slot a pseudo-random coin index is drawn from
//! `BLAKE3(seed, epoch, slot)` and the slot goes to the owner of that coin,
//! with coins laid out in stakeholder id order. A stakeholder's expected
//! share of slots equals its share of stake.

use shared_crypto::Blake3Hasher;
use shared_types::{Coin, EpochIndex, Hash, SlotCount, StakeholderId};
use std::collections::BTreeMap;

/// Leader schedule of `epoch` for the given stake distribution
///
/// Returns an empty schedule when there is no stake.
pub fn follow_the_satoshi(
    seed: &Hash,
    epoch: EpochIndex,
    stakes: &BTreeMap<StakeholderId, Coin>,
    epoch_length: SlotCount,
) -> Vec<StakeholderId> {
    let total: u128 = stakes.values().map(|v| u128::from(*v)).sum();
    if total == 0 {
        return Vec::new();
    }

    (0..epoch_length)
        .filter_map(|slot| {
            let mut hasher = Blake3Hasher::tagged("follow-the-satoshi");
            hasher
                .update(seed)
                .update_u64(epoch)
                .update_u64(u64::from(slot));
            let digest = hasher.finalize();
            let mut word = [0u8; 16];
            word.copy_from_slice(&digest[..16]);
            let coin = u128::from_le_bytes(word) % total;
            owner_of_coin(stakes, coin)
        })
        .collect()
}

fn owner_of_coin(stakes: &BTreeMap<StakeholderId, Coin>, coin: u128) -> Option<StakeholderId> {
    let mut upper: u128 = 0;
    for (id, stake) in stakes {
        upper += u128::from(*stake);
        if coin < upper {
            return Some(*id);
        }
    }
    None
}
