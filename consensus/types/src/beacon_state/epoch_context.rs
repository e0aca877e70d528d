use crate::{Epoch, Slot};
use safe_arith::SafeArith;

use super::Error;

/// Per-epoch values computed by epoch processing and consumed during block processing.
///
/// Holds the epoch the values were computed for and the proposer index of every slot in that
/// epoch.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct EpochContext {
    epoch: Epoch,
    proposers: Vec<usize>,
}

impl EpochContext {
    pub fn new(epoch: Epoch, proposers: Vec<usize>) -> Self {
        Self { epoch, proposers }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn proposers(&self) -> &[usize] {
        &self.proposers
    }

    /// Returns the proposer index for `slot`, which must fall within `self.epoch()`.
    pub fn get_beacon_proposer(&self, slot: Slot, slots_per_epoch: u64) -> Result<usize, Error> {
        let slot_epoch = slot.epoch(slots_per_epoch);
        if slot_epoch != self.epoch {
            return Err(Error::SlotOutsideEpochContext {
                slot,
                context_epoch: self.epoch,
            });
        }

        let i = slot.as_u64().safe_rem(slots_per_epoch)? as usize;
        self.proposers
            .get(i)
            .copied()
            .ok_or(Error::ProposerUnknown { slot })
    }
}
