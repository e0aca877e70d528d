// Clippy lint set-up (disabled in tests)
#![cfg_attr(
    not(test),
    deny(
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::let_underscore_must_use
    )
)]

#[macro_use]
mod macros;
mod metrics;

pub mod per_block_processing;

pub use per_block_processing::{
    block_signature_verifier, errors::BlockProcessingError, process_randao, signature_sets,
    BlsBatchVerifier, ParallelSignatureSets, SignatureBatchVerifier, VerifySignatures,
};
