use crate::*;

use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// A `BeaconBlock` and a signature from its proposer.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct SignedBeaconBlock {
    pub message: BeaconBlock,
    pub signature: Signature,
}

impl SignedBeaconBlock {
    pub fn from_block(block: BeaconBlock, signature: Signature) -> Self {
        Self {
            message: block,
            signature,
        }
    }

    pub fn message(&self) -> &BeaconBlock {
        &self.message
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Convenience accessor for the block's slot.
    pub fn slot(&self) -> Slot {
        self.message.slot
    }

    /// Convenience accessor for the block's parent root.
    pub fn parent_root(&self) -> Hash256 {
        self.message.parent_root
    }

    /// Returns the `tree_hash_root` of the block's message.
    pub fn canonical_root(&self) -> Hash256 {
        self.message.canonical_root()
    }
}
