use crate::{PublicKey, SecretKey};
use std::fmt;

/// A simple wrapper around `PublicKey` and `SecretKey`.
#[derive(Clone)]
pub struct Keypair {
    pub pk: PublicKey,
    pub sk: SecretKey,
}

impl Keypair {
    /// Instantiate `Self` from a secret key, deriving the public key.
    pub fn from_secret_key(sk: SecretKey) -> Self {
        Self {
            pk: sk.public_key(),
            sk,
        }
    }

    /// Generate a new random keypair.
    pub fn random() -> Self {
        Self::from_secret_key(SecretKey::random())
    }
}

/// Only prints the public key.
impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair").field("pk", &self.pk).finish()
    }
}
