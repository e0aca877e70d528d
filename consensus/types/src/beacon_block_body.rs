use crate::*;

use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// The body of a `BeaconBlock`.
///
/// Only the fields read by the backfill and RANDAO paths are modelled; operations (attestations,
/// deposits, exits, slashings) are processed elsewhere.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct BeaconBlockBody {
    pub randao_reveal: Signature,
    pub graffiti: Hash256,
}

impl BeaconBlockBody {
    pub fn empty() -> Self {
        Self {
            randao_reveal: Signature::empty(),
            graffiti: Hash256::zero(),
        }
    }

    pub fn randao_reveal(&self) -> &Signature {
        &self.randao_reveal
    }
}
