use crate::*;

use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

/// A block of the `BeaconChain`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct BeaconBlock {
    pub slot: Slot,
    #[serde(with = "serde_utils::quoted_u64")]
    pub proposer_index: u64,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: BeaconBlockBody,
}

impl SignedRoot for BeaconBlock {}

impl BeaconBlock {
    /// Returns an empty block to be used during genesis.
    pub fn empty(spec: &ChainSpec) -> Self {
        BeaconBlock {
            slot: spec.genesis_slot,
            proposer_index: 0,
            parent_root: Hash256::zero(),
            state_root: Hash256::zero(),
            body: BeaconBlockBody::empty(),
        }
    }

    /// Returns the `tree_hash_root` of the block.
    ///
    /// This is the block's identity; the signature is never part of it.
    pub fn canonical_root(&self) -> Hash256 {
        self.tree_hash_root()
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn proposer_index(&self) -> u64 {
        self.proposer_index
    }

    pub fn parent_root(&self) -> Hash256 {
        self.parent_root
    }

    pub fn body(&self) -> &BeaconBlockBody {
        &self.body
    }

    /// Returns the epoch corresponding to `self.slot()`.
    pub fn epoch<E: EthSpec>(&self) -> Epoch {
        self.slot.epoch(E::slots_per_epoch())
    }
}
