use crate::errors::BeaconChainError;
use std::convert::TryInto;
use types::{BeaconState, EthSpec, PublicKey};

/// Provides a mapping of `validator_index -> validator_publickey`.
///
/// Keys are decompressed once on import so that signature-set construction for historical blocks
/// never has to decompress the same key twice.
pub struct ValidatorPubkeyCache {
    pubkeys: Vec<PublicKey>,
}

impl ValidatorPubkeyCache {
    pub fn new<E: EthSpec>(state: &BeaconState<E>) -> Result<Self, BeaconChainError> {
        let mut cache = Self {
            pubkeys: Vec::with_capacity(state.validators().len()),
        };
        cache.import_new_pubkeys(state)?;
        Ok(cache)
    }

    /// Scan the given `state` and add any new validator public keys.
    ///
    /// Validators are append-only, so only the keys beyond `self.len()` are read.
    pub fn import_new_pubkeys<E: EthSpec>(
        &mut self,
        state: &BeaconState<E>,
    ) -> Result<(), BeaconChainError> {
        state
            .validators()
            .iter()
            .skip(self.pubkeys.len())
            .try_for_each(|v| {
                self.pubkeys.push(
                    (&v.pubkey)
                        .try_into()
                        .map_err(BeaconChainError::InvalidValidatorPubkeyBytes)?,
                );
                Ok(())
            })
    }

    /// Get the public key for a validator with index `i`.
    pub fn get(&self, i: usize) -> Option<&PublicKey> {
        self.pubkeys.get(i)
    }

    pub fn len(&self) -> usize {
        self.pubkeys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pubkeys.is_empty()
    }
}
