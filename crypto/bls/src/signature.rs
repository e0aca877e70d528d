use crate::{blst_core, Error, Hash256, PublicKey, DST};
use blst::BLST_ERROR;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use ssz::{Decode, Encode};
use std::fmt;
use tree_hash::TreeHash;

/// The byte-length of a BLS signature when serialized in compressed form.
pub const SIGNATURE_BYTES_LEN: usize = 96;

/// Represents the signature at infinity.
pub const INFINITY_SIGNATURE: [u8; SIGNATURE_BYTES_LEN] = {
    let mut bytes = [0; SIGNATURE_BYTES_LEN];
    bytes[0] = 0xc0;
    bytes
};

/// The compressed bytes used to represent `Signature::empty()`.
pub const NONE_SIGNATURE: [u8; SIGNATURE_BYTES_LEN] = [0; SIGNATURE_BYTES_LEN];

/// A BLS signature over a single message.
///
/// The all-zeros encoding is accepted and held as the "empty" signature. It exists because the
/// genesis block carries no proposer signature, and it fails every verification.
#[derive(Clone)]
pub struct Signature {
    /// The underlying point which performs *actual* cryptographic operations.
    point: Option<blst_core::Signature>,
    /// True if this point is equal to the `INFINITY_SIGNATURE`.
    is_infinity: bool,
}

impl Signature {
    /// Initialize self to the "empty" value. This value is serialized as all-zeros.
    pub fn empty() -> Self {
        Self {
            point: None,
            is_infinity: false,
        }
    }

    /// Returns `true` if `self` is equal to the "empty" value.
    pub fn is_empty(&self) -> bool {
        self.point.is_none()
    }

    /// Returns `true` if `self` is the point at infinity.
    pub fn is_infinity(&self) -> bool {
        self.is_infinity
    }

    pub(crate) fn from_point(point: blst_core::Signature) -> Self {
        let is_infinity = point.to_bytes()[..] == INFINITY_SIGNATURE[..];
        Self {
            point: Some(point),
            is_infinity,
        }
    }

    /// Returns a reference to the underlying BLS point.
    pub(crate) fn point(&self) -> Option<&blst_core::Signature> {
        self.point.as_ref()
    }

    /// Serialize `self` as compressed bytes.
    pub fn serialize(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        if let Some(point) = &self.point {
            point.to_bytes()
        } else {
            NONE_SIGNATURE
        }
    }

    /// Deserialize `self` from compressed bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SIGNATURE_BYTES_LEN {
            return Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: SIGNATURE_BYTES_LEN,
            });
        }

        if bytes == &NONE_SIGNATURE[..] {
            return Ok(Self::empty());
        }

        let point = blst_core::Signature::from_bytes(bytes)?;
        Ok(Self {
            point: Some(point),
            is_infinity: bytes == &INFINITY_SIGNATURE[..],
        })
    }

    /// Returns `true` if `self` is a signature across `msg` by `pubkey`.
    pub fn verify(&self, pubkey: &PublicKey, msg: Hash256) -> bool {
        match &self.point {
            Some(point) => {
                point.verify(true, msg.as_bytes(), DST, &[], pubkey.point(), false)
                    == BLST_ERROR::BLST_SUCCESS
            }
            None => false,
        }
    }

    /// Returns `true` if `self` is a signature across `msg` by the aggregate of `pubkeys`.
    pub fn fast_aggregate_verify(&self, msg: Hash256, pubkeys: &[&PublicKey]) -> bool {
        let Some(point) = &self.point else {
            return false;
        };
        if pubkeys.is_empty() {
            return false;
        }
        let points = pubkeys.iter().map(|pk| pk.point()).collect::<Vec<_>>();
        point.fast_aggregate_verify(true, msg.as_bytes(), DST, &points)
            == BLST_ERROR::BLST_SUCCESS
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.serialize()[..] == other.serialize()[..]
    }
}

impl Eq for Signature {}

impl Encode for Signature {
    impl_ssz_encode!(SIGNATURE_BYTES_LEN);
}

impl Decode for Signature {
    impl_ssz_decode!(SIGNATURE_BYTES_LEN);
}

impl TreeHash for Signature {
    impl_tree_hash!(SIGNATURE_BYTES_LEN);
}

impl fmt::Display for Signature {
    impl_display!();
}

impl fmt::Debug for Signature {
    impl_debug!();
}

impl Serialize for Signature {
    impl_serde_serialize!();
}

impl<'de> Deserialize<'de> for Signature {
    impl_serde_deserialize!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecretKey;

    #[test]
    fn empty_signature_round_trips_as_zeros() {
        let empty = Signature::empty();
        assert_eq!(empty.serialize(), NONE_SIGNATURE);
        assert!(Signature::deserialize(&NONE_SIGNATURE).unwrap().is_empty());
    }

    #[test]
    fn empty_signature_never_verifies() {
        let sk = SecretKey::key_gen(&[7; 32]).unwrap();
        assert!(!Signature::empty().verify(&sk.public_key(), Hash256::repeat_byte(1)));
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            Signature::deserialize(&[0; 95]),
            Err(Error::InvalidByteLength {
                got: 95,
                expected: SIGNATURE_BYTES_LEN
            })
        );
    }

    #[test]
    fn sign_and_verify() {
        let sk = SecretKey::key_gen(&[42; 32]).unwrap();
        let msg = Hash256::repeat_byte(3);
        let sig = sk.sign(msg);

        assert!(sig.verify(&sk.public_key(), msg));
        assert!(!sig.verify(&sk.public_key(), Hash256::repeat_byte(4)));

        let other = SecretKey::key_gen(&[43; 32]).unwrap();
        assert!(!sig.verify(&other.public_key(), msg));
    }

    #[test]
    fn serde_hex() {
        let sk = SecretKey::key_gen(&[9; 32]).unwrap();
        let sig = sk.sign(Hash256::zero());
        let json = serde_json::to_string(&sig).unwrap();
        assert!(json.starts_with("\"0x"));
        let decoded: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, sig);
    }
}
