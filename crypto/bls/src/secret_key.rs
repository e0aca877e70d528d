use crate::{blst_core, Error, Hash256, PublicKey, Signature, DST};
use rand::RngCore;

/// The byte-length of a BLS secret key.
pub const SECRET_KEY_BYTES_LEN: usize = 32;

/// A BLS secret key.
///
/// Deliberately does not implement `Debug` or `Serialize`.
#[derive(Clone)]
pub struct SecretKey {
    point: blst_core::SecretKey,
}

impl SecretKey {
    /// Derives a key from input key material (at least 32 bytes) using the EIP-2333 `KeyGen`.
    pub fn key_gen(ikm: &[u8]) -> Result<Self, Error> {
        blst_core::SecretKey::key_gen(ikm, &[])
            .map(|point| Self { point })
            .map_err(Into::into)
    }

    /// Generate a new `Self` using the thread-local RNG.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut ikm = [0u8; 32];
            rng.fill_bytes(&mut ikm);
            if let Ok(sk) = Self::key_gen(&ikm) {
                return sk;
            }
        }
    }

    /// Returns the public key that corresponds to self.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_point(self.point.sk_to_pk())
    }

    /// Returns a signature across `msg` using `self`.
    pub fn sign(&self, msg: Hash256) -> Signature {
        Signature::from_point(self.point.sign(msg.as_bytes(), DST, &[]))
    }

    pub fn serialize(&self) -> [u8; SECRET_KEY_BYTES_LEN] {
        self.point.to_bytes()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SECRET_KEY_BYTES_LEN {
            return Err(Error::InvalidSecretKeyLength {
                got: bytes.len(),
                expected: SECRET_KEY_BYTES_LEN,
            });
        }
        blst_core::SecretKey::from_bytes(bytes)
            .map(|point| Self { point })
            .map_err(Into::into)
    }
}
