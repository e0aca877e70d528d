use crate::*;
use ethereum_hashing::hash_fixed;
use rayon::prelude::*;

/// Generates `validator_count` keypairs where the secret key is derived from the index of the
/// validator.
///
/// The same index always yields the same keypair, which lets tests and tools agree on validator
/// keys without sharing any files.
pub fn generate_deterministic_keypairs(validator_count: usize) -> Vec<Keypair> {
    (0..validator_count)
        .into_par_iter()
        .map(generate_deterministic_keypair)
        .collect()
}

/// Generates a single deterministic keypair, where the secret key is derived from
/// `validator_index`.
///
/// This is used for testing only, and not to be used in production!
pub fn generate_deterministic_keypair(validator_index: usize) -> Keypair {
    let ikm = hash_fixed(&(validator_index as u64).to_le_bytes());
    let sk = SecretKey::key_gen(&ikm).expect("32 bytes of ikm is sufficient for key_gen");
    Keypair::from_secret_key(sk)
}
