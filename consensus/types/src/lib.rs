//! Ethereum consensus types: slots and epochs, protocol presets, blocks and the beacon state.

// Required for big type-level numbers
#![recursion_limit = "128"]

pub mod beacon_block;
pub mod beacon_block_body;
pub mod beacon_state;
pub mod chain_spec;
pub mod eth_spec;
pub mod fork;
pub mod fork_data;
pub mod fork_name;
pub mod signed_beacon_block;
pub mod signing_data;
pub mod slot_epoch;
pub mod test_utils;
pub mod validator;

pub use crate::beacon_block::BeaconBlock;
pub use crate::beacon_block_body::BeaconBlockBody;
pub use crate::beacon_state::{BeaconState, EpochContext, Error as BeaconStateError};
pub use crate::chain_spec::{ChainSpec, ConfigError, Domain};
pub use crate::eth_spec::{EthSpec, EthSpecId, MainnetEthSpec, MinimalEthSpec};
pub use crate::fork::Fork;
pub use crate::fork_data::ForkData;
pub use crate::fork_name::ForkName;
pub use crate::signed_beacon_block::SignedBeaconBlock;
pub use crate::signing_data::{SignedRoot, SigningData};
pub use crate::slot_epoch::{Epoch, Slot};
pub use crate::validator::Validator;

pub type Hash256 = ethereum_types::H256;

pub use bls::{Keypair, PublicKey, PublicKeyBytes, SecretKey, Signature, SignatureSet};
pub use ssz_types::{typenum, typenum::Unsigned, FixedVector, VariableList};
