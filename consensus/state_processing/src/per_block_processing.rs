use crate::metrics;
use errors::BlockProcessingError;
use signature_sets::{get_pubkey_from_state, randao_signature_set};
use types::*;

pub use block_signature_verifier::{BlsBatchVerifier, ParallelSignatureSets, SignatureBatchVerifier};

pub mod block_signature_verifier;
pub mod errors;
pub mod signature_sets;

/// The strategy to be used when validating the block's signatures.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum VerifySignatures {
    /// Validate all signatures encountered.
    True,
    /// Do not validate any signature. Use with caution.
    False,
}

impl VerifySignatures {
    pub fn is_true(self) -> bool {
        self == VerifySignatures::True
    }
}

/// Verifies the `randao_reveal` against the block's proposer pubkey and updates
/// `state.randao_mixes`.
///
/// The mix is written at the epoch of the state's `EpochContext`, which must match the current
/// epoch even when signatures are not verified.
///
/// The state is only mutated once the reveal has been verified, so an `Err` always leaves `state`
/// untouched.
pub fn process_randao<E: EthSpec>(
    state: &mut BeaconState<E>,
    block: &BeaconBlock,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let _timer = metrics::start_timer(&metrics::PROCESS_RANDAO_TIMES);

    let epoch = state.current_epoch_context()?.epoch();

    if verify_signatures.is_true() {
        // Verify RANDAO reveal signature.
        let valid =
            randao_signature_set(state, |i| get_pubkey_from_state(state, i), block, spec)?
                .verify();
        if !valid {
            metrics::inc_counter(&metrics::RANDAO_SIGNATURE_FAILURES);
        }
        block_verify!(valid, BlockProcessingError::RandaoSignatureInvalid);
    }

    // Update the current epoch RANDAO mix.
    state.update_randao_mix(epoch, block.body().randao_reveal())?;

    Ok(())
}
