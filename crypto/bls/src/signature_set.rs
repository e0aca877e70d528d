use crate::{blst_core, Hash256, PublicKey, Signature, DST};
use blst::{blst_scalar, BLST_ERROR};
use rand::Rng;
use std::borrow::Cow;

/// The number of random bits used to blind each set during batch verification.
const RAND_BITS: usize = 64;

/// A signature across `message` by the aggregate of `signing_keys`.
///
/// This struct is primarily useful in a collection (e.g., `Vec<SignatureSet>`) so we can perform
/// multiple-signature verification which is much faster than verifying each signature
/// individually.
#[derive(Clone)]
pub struct SignatureSet<'a> {
    pub signature: Cow<'a, Signature>,
    pub(crate) signing_keys: Vec<Cow<'a, PublicKey>>,
    pub(crate) message: Hash256,
}

impl<'a> SignatureSet<'a> {
    /// Instantiate self where `signature` is only signed by a single public key.
    pub fn single_pubkey(
        signature: &'a Signature,
        signing_key: Cow<'a, PublicKey>,
        message: Hash256,
    ) -> Self {
        Self {
            signature: Cow::Borrowed(signature),
            signing_keys: vec![signing_key],
            message,
        }
    }

    /// Instantiate self where `signature` is signed by multiple public keys.
    pub fn multiple_pubkeys(
        signature: &'a Signature,
        signing_keys: Vec<Cow<'a, PublicKey>>,
        message: Hash256,
    ) -> Self {
        Self {
            signature: Cow::Borrowed(signature),
            signing_keys,
            message,
        }
    }

    pub fn message(&self) -> Hash256 {
        self.message
    }

    pub fn signing_keys(&self) -> &[Cow<'a, PublicKey>] {
        &self.signing_keys
    }

    /// Returns `true` if `self.signature` is a signature across `self.message` by
    /// `self.signing_keys`.
    pub fn verify(self) -> bool {
        let pubkeys = self
            .signing_keys
            .iter()
            .map(|pk| pk.as_ref())
            .collect::<Vec<_>>();

        self.signature.fast_aggregate_verify(self.message, &pubkeys)
    }

    /// Collapses the signing keys into the single key that signed `self.message`.
    fn aggregate_signing_key(&self) -> Option<blst_core::PublicKey> {
        match self.signing_keys.as_slice() {
            [] => None,
            [single] => Some(single.point().clone()),
            many => {
                let points = many.iter().map(|pk| pk.point()).collect::<Vec<_>>();
                blst_core::AggregatePublicKey::aggregate(&points, false)
                    .ok()
                    .map(|agg| agg.to_public_key())
            }
        }
    }
}

/// Verifies all of `signature_sets` in a single randomised multi-pairing, returning `true` only if
/// every set is valid.
///
/// It is not possible to know exactly _which_ signature is invalid, just that _at least one_ was
/// invalid. An empty iterator is rejected.
pub fn verify_signature_sets<'a>(
    signature_sets: impl ExactSizeIterator<Item = &'a SignatureSet<'a>>,
) -> bool {
    let sets = signature_sets.collect::<Vec<_>>();

    if sets.is_empty() {
        return false;
    }

    let rng = &mut rand::thread_rng();

    let mut rands: Vec<blst_scalar> = Vec::with_capacity(sets.len());
    let mut msgs_refs: Vec<&[u8]> = Vec::with_capacity(sets.len());
    let mut sigs: Vec<&blst_core::Signature> = Vec::with_capacity(sets.len());
    let mut pks: Vec<blst_core::PublicKey> = Vec::with_capacity(sets.len());

    for set in &sets {
        // A zero scalar would remove the set from the pairing equation.
        let mut rand_u64 = 0u64;
        while rand_u64 == 0 {
            rand_u64 = rng.gen();
        }
        let mut scalar = blst_scalar::default();
        scalar.b[..8].copy_from_slice(&rand_u64.to_le_bytes());
        rands.push(scalar);

        let Some(signature) = set.signature.point() else {
            return false;
        };
        sigs.push(signature);

        let Some(pk) = set.aggregate_signing_key() else {
            return false;
        };
        pks.push(pk);

        msgs_refs.push(set.message.as_bytes());
    }

    let pks_refs: Vec<&blst_core::PublicKey> = pks.iter().collect();

    let err = blst_core::Signature::verify_multiple_aggregate_signatures(
        &msgs_refs, DST, &pks_refs, false, &sigs, true, &rands, RAND_BITS,
    );

    err == BLST_ERROR::BLST_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Keypair;

    fn keypairs(n: u8) -> Vec<Keypair> {
        (1..=n)
            .map(|i| Keypair::from_secret_key(crate::SecretKey::key_gen(&[i; 32]).unwrap()))
            .collect()
    }

    #[test]
    fn batch_of_valid_sets() {
        let keypairs = keypairs(4);
        let messages = (0..4u8).map(Hash256::repeat_byte).collect::<Vec<_>>();
        let signatures = keypairs
            .iter()
            .zip(&messages)
            .map(|(kp, msg)| kp.sk.sign(*msg))
            .collect::<Vec<_>>();

        let sets = keypairs
            .iter()
            .zip(&signatures)
            .zip(&messages)
            .map(|((kp, sig), msg)| SignatureSet::single_pubkey(sig, Cow::Borrowed(&kp.pk), *msg))
            .collect::<Vec<_>>();

        assert!(verify_signature_sets(sets.iter()));
    }

    #[test]
    fn one_bad_set_fails_the_batch() {
        let keypairs = keypairs(3);
        let msg = Hash256::repeat_byte(11);
        let signatures = keypairs
            .iter()
            .map(|kp| kp.sk.sign(msg))
            .collect::<Vec<_>>();

        let mut sets = keypairs
            .iter()
            .zip(&signatures)
            .map(|(kp, sig)| SignatureSet::single_pubkey(sig, Cow::Borrowed(&kp.pk), msg))
            .collect::<Vec<_>>();
        // Claim the last signature came from the first key.
        sets[2].signing_keys = vec![Cow::Borrowed(&keypairs[0].pk)];

        assert!(!verify_signature_sets(sets.iter()));
    }

    #[test]
    fn empty_signature_fails_the_batch() {
        let keypairs = keypairs(1);
        let empty = Signature::empty();
        let sets = vec![SignatureSet::single_pubkey(
            &empty,
            Cow::Borrowed(&keypairs[0].pk),
            Hash256::zero(),
        )];

        assert!(!verify_signature_sets(sets.iter()));
    }

    #[test]
    fn no_sets_is_not_valid() {
        assert!(!verify_signature_sets(Vec::<SignatureSet>::new().iter()));
    }

    #[test]
    fn multiple_pubkeys_single_message() {
        let keypairs = keypairs(3);
        let msg = Hash256::repeat_byte(5);
        let sigs = keypairs.iter().map(|kp| kp.sk.sign(msg)).collect::<Vec<_>>();
        let mut agg = blst_core::AggregateSignature::from_signature(sigs[0].point().unwrap());
        for sig in &sigs[1..] {
            agg.add_signature(sig.point().unwrap(), false).unwrap();
        }
        let signature = Signature::from_point(agg.to_signature());
        let set = SignatureSet::multiple_pubkeys(
            &signature,
            keypairs.iter().map(|kp| Cow::Borrowed(&kp.pk)).collect(),
            msg,
        );

        assert!(verify_signature_sets(std::iter::once(&set)));
        assert!(set.verify());
    }
}
