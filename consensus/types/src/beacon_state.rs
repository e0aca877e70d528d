use crate::*;

use ethereum_hashing::hash_fixed;
use safe_arith::{ArithError, SafeArith};
use serde_derive::{Deserialize, Serialize};
use tree_hash::TreeHash;

pub use self::epoch_context::EpochContext;

mod epoch_context;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    EpochOutOfBounds,
    SlotOutOfBounds,
    UnknownValidator(usize),
    RandaoMixesOutOfBounds(usize),
    /// Block processing needs proposer indices but epoch processing has not supplied them.
    EpochContextNotInitialized,
    /// The epoch context was built for an epoch other than the state's current epoch.
    EpochContextMismatch {
        context_epoch: Epoch,
        state_epoch: Epoch,
    },
    SlotOutsideEpochContext {
        slot: Slot,
        context_epoch: Epoch,
    },
    ProposerUnknown {
        slot: Slot,
    },
    InconsistentPreset(ConfigError),
    SszTypesError(ssz_types::Error),
    ArithError(ArithError),
}

/// Control whether an epoch-indexed field can be indexed at the next epoch or not.
#[derive(Debug, PartialEq, Clone, Copy)]
enum AllowNextEpoch {
    True,
    False,
}

impl AllowNextEpoch {
    fn upper_bound_of(self, current_epoch: Epoch) -> Result<Epoch, Error> {
        match self {
            AllowNextEpoch::True => Ok(current_epoch.safe_add(1)?),
            AllowNextEpoch::False => Ok(current_epoch),
        }
    }
}

/// The part of the consensus state touched by block-level RANDAO processing.
///
/// `randao_mixes` is a ring buffer of exactly `E::EpochsPerHistoricalVector` entries. It can only
/// be written through `&mut self` methods, each of which replaces the single entry at
/// `epoch % E::EpochsPerHistoricalVector`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(bound = "E: EthSpec")]
pub struct BeaconState<E>
where
    E: EthSpec,
{
    #[serde(with = "serde_utils::quoted_u64")]
    pub genesis_time: u64,
    pub genesis_validators_root: Hash256,
    pub slot: Slot,
    pub fork: Fork,

    // Registry
    pub validators: VariableList<Validator, E::ValidatorRegistryLimit>,

    // Randomness
    randao_mixes: FixedVector<Hash256, E::EpochsPerHistoricalVector>,

    // Caching
    #[serde(skip)]
    epoch_context: Option<EpochContext>,
}

impl<E: EthSpec> BeaconState<E> {
    /// Create a genesis state for `validators`.
    ///
    /// Fails if `spec` was built for a different preset than `E`.
    pub fn new(
        genesis_time: u64,
        validators: Vec<Validator>,
        spec: &ChainSpec,
    ) -> Result<Self, Error> {
        spec.ensure_preset::<E>()?;

        let validators = VariableList::new(validators)?;
        let genesis_validators_root = validators.tree_hash_root();

        Ok(BeaconState {
            genesis_time,
            genesis_validators_root,
            slot: spec.genesis_slot,
            fork: spec.fork_at_epoch(E::genesis_epoch()),
            validators,
            randao_mixes: FixedVector::default(),
            epoch_context: None,
        })
    }

    /// The epoch corresponding to `self.slot`.
    pub fn current_epoch(&self) -> Epoch {
        self.slot.epoch(E::slots_per_epoch())
    }

    pub fn validators(&self) -> &VariableList<Validator, E::ValidatorRegistryLimit> {
        &self.validators
    }

    /// Safe indexer for the `validators` list.
    pub fn get_validator(&self, validator_index: usize) -> Result<&Validator, Error> {
        self.validators
            .get(validator_index)
            .ok_or(Error::UnknownValidator(validator_index))
    }

    /// Install the per-epoch values computed by epoch processing.
    pub fn set_epoch_context(&mut self, epoch_context: EpochContext) {
        self.epoch_context = Some(epoch_context);
    }

    pub fn epoch_context(&self) -> Result<&EpochContext, Error> {
        self.epoch_context
            .as_ref()
            .ok_or(Error::EpochContextNotInitialized)
    }

    /// Returns the epoch context, provided it was built for the state's current epoch.
    pub fn current_epoch_context(&self) -> Result<&EpochContext, Error> {
        let epoch_context = self.epoch_context()?;
        let state_epoch = self.current_epoch();
        if epoch_context.epoch() != state_epoch {
            return Err(Error::EpochContextMismatch {
                context_epoch: epoch_context.epoch(),
                state_epoch,
            });
        }
        Ok(epoch_context)
    }

    /// Returns the beacon proposer index for the `slot` in the current epoch.
    pub fn get_beacon_proposer_index(&self, slot: Slot) -> Result<usize, Error> {
        self.current_epoch_context()?
            .get_beacon_proposer(slot, E::slots_per_epoch())
    }

    /// Read-only view of the full RANDAO ring buffer.
    pub fn randao_mixes(&self) -> &FixedVector<Hash256, E::EpochsPerHistoricalVector> {
        &self.randao_mixes
    }

    /// Fill `randao_mixes` with `index_root`, as done at genesis.
    pub fn fill_randao_mixes_with(&mut self, index_root: Hash256) -> Result<(), Error> {
        self.randao_mixes = FixedVector::from_elem(index_root);
        Ok(())
    }

    /// Safely obtains the index for `randao_mixes`.
    fn get_randao_mix_index(
        &self,
        epoch: Epoch,
        allow_next_epoch: AllowNextEpoch,
    ) -> Result<usize, Error> {
        let current_epoch = self.current_epoch();
        let len = E::EpochsPerHistoricalVector::to_u64();

        if current_epoch < epoch.safe_add(len)?
            && epoch <= allow_next_epoch.upper_bound_of(current_epoch)?
        {
            Ok(epoch.as_u64().safe_rem(len)? as usize)
        } else {
            Err(Error::EpochOutOfBounds)
        }
    }

    /// Return the minimum epoch for which `get_randao_mix` will return a non-error value.
    pub fn min_randao_epoch(&self) -> Epoch {
        self.current_epoch()
            .saturating_add(1u64)
            .saturating_sub(E::EpochsPerHistoricalVector::to_u64())
    }

    /// XOR-assigns the existing `epoch` randao mix with the hash of the `signature`.
    ///
    /// # Errors:
    ///
    /// See `Self::get_randao_mix`.
    pub fn update_randao_mix(&mut self, epoch: Epoch, signature: &Signature) -> Result<(), Error> {
        let i = epoch
            .as_usize()
            .safe_rem(E::EpochsPerHistoricalVector::to_usize())?;

        let signature_hash = Hash256::from(hash_fixed(&signature.serialize()));
        let mix = *self.get_randao_mix(epoch)? ^ signature_hash;

        *self
            .randao_mixes
            .get_mut(i)
            .ok_or(Error::RandaoMixesOutOfBounds(i))? = mix;

        Ok(())
    }

    /// Return the randao mix at a recent ``epoch``.
    pub fn get_randao_mix(&self, epoch: Epoch) -> Result<&Hash256, Error> {
        let i = self.get_randao_mix_index(epoch, AllowNextEpoch::False)?;
        self.randao_mixes
            .get(i)
            .ok_or(Error::RandaoMixesOutOfBounds(i))
    }

    /// Set the randao mix at a recent ``epoch``.
    pub fn set_randao_mix(&mut self, epoch: Epoch, mix: Hash256) -> Result<(), Error> {
        let i = self.get_randao_mix_index(epoch, AllowNextEpoch::True)?;
        *self
            .randao_mixes
            .get_mut(i)
            .ok_or(Error::RandaoMixesOutOfBounds(i))? = mix;
        Ok(())
    }
}

impl From<ArithError> for Error {
    fn from(e: ArithError) -> Error {
        Error::ArithError(e)
    }
}

impl From<ssz_types::Error> for Error {
    fn from(e: ssz_types::Error) -> Error {
        Error::SszTypesError(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Error {
        Error::InconsistentPreset(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::generate_deterministic_keypair;

    type E = MinimalEthSpec;

    fn genesis_state() -> BeaconState<E> {
        BeaconState::new(0, vec![], &ChainSpec::minimal()).unwrap()
    }

    fn reveal(i: usize) -> Signature {
        generate_deterministic_keypair(i).sk.sign(Hash256::repeat_byte(i as u8))
    }

    fn advance_to_epoch(state: &mut BeaconState<E>, epoch: u64) {
        state.slot = Epoch::new(epoch).start_slot(E::slots_per_epoch());
    }

    #[test]
    fn buffer_length_is_fixed_by_preset() {
        let state = genesis_state();
        assert_eq!(
            state.randao_mixes().len(),
            E::epochs_per_historical_vector()
        );
    }

    #[test]
    fn rejects_mismatched_preset() {
        assert!(matches!(
            BeaconState::<E>::new(0, vec![], &ChainSpec::mainnet()),
            Err(Error::InconsistentPreset(_))
        ));
    }

    #[test]
    fn update_xors_reveal_hash() {
        let mut state = genesis_state();
        let sig = reveal(1);
        let expected = Hash256::from(hash_fixed(&sig.serialize()));

        state.update_randao_mix(Epoch::new(0), &sig).unwrap();

        assert_eq!(*state.get_randao_mix(Epoch::new(0)).unwrap(), expected);
    }

    #[test]
    fn mix_is_reversible() {
        let mut state = genesis_state();
        state
            .fill_randao_mixes_with(Hash256::repeat_byte(0x42))
            .unwrap();
        let original = state.clone();
        let sig = reveal(3);

        state.update_randao_mix(Epoch::new(0), &sig).unwrap();
        assert_ne!(state, original);
        state.update_randao_mix(Epoch::new(0), &sig).unwrap();
        assert_eq!(state, original);
    }

    #[test]
    fn distinct_epochs_touch_distinct_slots() {
        let mut state = genesis_state();
        advance_to_epoch(&mut state, 5);

        state.update_randao_mix(Epoch::new(4), &reveal(1)).unwrap();
        state.update_randao_mix(Epoch::new(5), &reveal(2)).unwrap();

        let non_zero = state
            .randao_mixes()
            .iter()
            .enumerate()
            .filter(|(_, mix)| !mix.is_zero())
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        assert_eq!(non_zero, vec![4, 5]);
    }

    #[test]
    fn wraparound_targets_the_same_slot() {
        let len = E::epochs_per_historical_vector() as u64;
        let mut state = genesis_state();
        advance_to_epoch(&mut state, 3);

        state.update_randao_mix(Epoch::new(3), &reveal(1)).unwrap();
        let first = *state.get_randao_mix(Epoch::new(3)).unwrap();

        advance_to_epoch(&mut state, 3 + len);
        state
            .update_randao_mix(Epoch::new(3 + len), &reveal(2))
            .unwrap();

        let second_hash = Hash256::from(hash_fixed(&reveal(2).serialize()));
        assert_eq!(state.randao_mixes()[3], first ^ second_hash);
        assert_eq!(
            state
                .randao_mixes()
                .iter()
                .filter(|mix| !mix.is_zero())
                .count(),
            1
        );
        assert_eq!(
            state.get_randao_mix(Epoch::new(3)),
            Err(Error::EpochOutOfBounds)
        );
    }

    #[test]
    fn future_epochs_are_out_of_bounds() {
        let mut state = genesis_state();
        assert_eq!(
            state.update_randao_mix(Epoch::new(1), &reveal(0)),
            Err(Error::EpochOutOfBounds)
        );
        // Setting the next epoch's mix is permitted, as done by epoch processing.
        state
            .set_randao_mix(Epoch::new(1), Hash256::repeat_byte(1))
            .unwrap();
        assert_eq!(state.min_randao_epoch(), Epoch::new(0));
    }

    #[test]
    fn proposer_lookup_requires_matching_context() {
        let mut state = genesis_state();
        assert_eq!(
            state.get_beacon_proposer_index(Slot::new(0)),
            Err(Error::EpochContextNotInitialized)
        );

        state.set_epoch_context(EpochContext::new(Epoch::new(1), vec![0; 8]));
        assert_eq!(
            state.get_beacon_proposer_index(Slot::new(0)),
            Err(Error::EpochContextMismatch {
                context_epoch: Epoch::new(1),
                state_epoch: Epoch::new(0),
            })
        );

        state.set_epoch_context(EpochContext::new(Epoch::new(0), (0..8).collect()));
        assert_eq!(state.get_beacon_proposer_index(Slot::new(5)), Ok(5));
    }
}
