#![allow(clippy::arithmetic_side_effects)]

use crate::metrics;
use bls::{verify_signature_sets, SignatureSet};
use rayon::prelude::*;

/// Verifies a batch of `SignatureSet`s, returning a single pass/fail for the entire batch.
///
/// Implementations may take a long time (BLS pairings) and are expected to be called from a
/// blocking context. A return of `true` means every set in `sets` verified.
pub trait SignatureBatchVerifier: Send + Sync {
    fn verify_signature_sets<'a>(&self, sets: Vec<SignatureSet<'a>>) -> bool;
}

impl<V: SignatureBatchVerifier> SignatureBatchVerifier for &V {
    fn verify_signature_sets<'a>(&self, sets: Vec<SignatureSet<'a>>) -> bool {
        (**self).verify_signature_sets(sets)
    }
}

impl<V: SignatureBatchVerifier + ?Sized> SignatureBatchVerifier for std::sync::Arc<V> {
    fn verify_signature_sets<'a>(&self, sets: Vec<SignatureSet<'a>>) -> bool {
        (**self).verify_signature_sets(sets)
    }
}

/// The production verifier, backed by `blst` and parallelised with `rayon`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlsBatchVerifier;

impl SignatureBatchVerifier for BlsBatchVerifier {
    fn verify_signature_sets<'a>(&self, sets: Vec<SignatureSet<'a>>) -> bool {
        metrics::inc_counter_by(&metrics::SIGNATURE_SETS_VERIFIED, sets.len() as u64);
        let _timer = metrics::start_timer(&metrics::BATCH_SIGNATURE_VERIFY_TIMES);

        ParallelSignatureSets::from(sets).verify()
    }
}

#[derive(Default)]
pub struct ParallelSignatureSets<'a> {
    sets: Vec<SignatureSet<'a>>,
}

impl<'a> From<Vec<SignatureSet<'a>>> for ParallelSignatureSets<'a> {
    fn from(sets: Vec<SignatureSet<'a>>) -> Self {
        Self { sets }
    }
}

impl<'a> ParallelSignatureSets<'a> {
    pub fn push(&mut self, set: SignatureSet<'a>) {
        self.sets.push(set);
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Verify all the signatures that have been included in `self`, returning `true` if and only if
    /// all the signatures are valid.
    ///
    /// ## Notes
    ///
    /// Signature validation will take place in accordance to the [Faster verification of multiple
    /// BLS signatures](https://ethresear.ch/t/fast-verification-of-multiple-bls-signatures/5407)
    /// optimization proposed by Vitalik Buterin.
    ///
    /// It is not possible to know exactly _which_ signature is invalid here, just that
    /// _at least one_ was invalid.
    ///
    /// Uses `rayon` to do a map-reduce of Vitalik's method across multiple cores.
    ///
    /// An empty collection is vacuously valid.
    #[must_use]
    pub fn verify(self) -> bool {
        let num_sets = self.sets.len();
        let num_chunks = std::cmp::max(1, num_sets / rayon::current_num_threads());
        self.sets
            .into_par_iter()
            .chunks(num_chunks)
            .map(|chunk| verify_signature_sets(chunk.iter()))
            .reduce(|| true, |current, this| current && this)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use types::test_utils::generate_deterministic_keypairs;
    use types::{Hash256, Signature};

    fn signatures(n: usize) -> (Vec<types::Keypair>, Vec<Signature>) {
        let keypairs = generate_deterministic_keypairs(n);
        let sigs = keypairs
            .iter()
            .enumerate()
            .map(|(i, kp)| kp.sk.sign(Hash256::from_low_u64_be(i as u64)))
            .collect();
        (keypairs, sigs)
    }

    fn sets<'a>(keypairs: &'a [types::Keypair], sigs: &'a [Signature]) -> Vec<SignatureSet<'a>> {
        keypairs
            .iter()
            .zip(sigs)
            .enumerate()
            .map(|(i, (kp, sig))| {
                SignatureSet::single_pubkey(
                    sig,
                    Cow::Borrowed(&kp.pk),
                    Hash256::from_low_u64_be(i as u64),
                )
            })
            .collect()
    }

    #[test]
    fn valid_batch_verifies() {
        let (keypairs, sigs) = signatures(17);
        assert!(BlsBatchVerifier.verify_signature_sets(sets(&keypairs, &sigs)));
    }

    #[test]
    fn single_invalid_set_fails_batch() {
        let (keypairs, mut sigs) = signatures(17);
        sigs.swap(3, 11);
        assert!(!BlsBatchVerifier.verify_signature_sets(sets(&keypairs, &sigs)));
    }

    #[test]
    fn empty_signature_fails_batch() {
        let (keypairs, mut sigs) = signatures(4);
        sigs[2] = Signature::empty();
        assert!(!BlsBatchVerifier.verify_signature_sets(sets(&keypairs, &sigs)));
    }

    #[test]
    fn parallel_sets_push() {
        let (keypairs, sigs) = signatures(2);
        let mut parallel = ParallelSignatureSets::default();
        assert!(parallel.is_empty());
        for set in sets(&keypairs, &sigs) {
            parallel.push(set);
        }
        assert_eq!(parallel.len(), 2);
        assert!(parallel.verify());
    }
}
