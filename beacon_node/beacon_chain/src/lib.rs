pub mod backfill_session;
pub mod block_sequence;
pub mod chain_config;
mod errors;
pub mod historical_blocks;
mod metrics;
pub mod test_utils;
pub mod validator_pubkey_cache;

pub use self::backfill_session::BackfillSession;
pub use self::block_sequence::{verify_block_sequence, BlockSequence, LinkedBlock};
pub use self::chain_config::ChainConfig;
pub use self::errors::BeaconChainError;
pub use self::historical_blocks::{
    BackfillOutcome, BackfillVerification, BackfillVerifier, HistoricalBlockError, PartialReason,
};
pub use self::validator_pubkey_cache::ValidatorPubkeyCache;
pub use state_processing::{BlsBatchVerifier, SignatureBatchVerifier};
