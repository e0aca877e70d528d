//! BLS12-381 signatures as used by the consensus layer, backed by `blst`.
//!
//! Signatures and public keys are held in their decompressed form so that validity checks happen
//! once, at decode time. The "empty" signature (all zero bytes) is representable so that the
//! genesis block can be expressed, but it never verifies.

#[macro_use]
mod macros;
mod keypair;
mod public_key;
mod public_key_bytes;
mod secret_key;
mod signature;
mod signature_set;

pub use keypair::Keypair;
pub use public_key::{PublicKey, PUBLIC_KEY_BYTES_LEN};
pub use public_key_bytes::PublicKeyBytes;
pub use secret_key::{SecretKey, SECRET_KEY_BYTES_LEN};
pub use signature::{Signature, INFINITY_SIGNATURE, NONE_SIGNATURE, SIGNATURE_BYTES_LEN};
pub use signature_set::{verify_signature_sets, SignatureSet};

pub use blst::min_pk as blst_core;

pub type Hash256 = ethereum_types::H256;

/// The domain separation tag for the proof-of-possession ciphersuite.
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// An error was raised from the Supranational BLST BLS library.
    BlstError(blst::BLST_ERROR),
    /// The provided bytes were an incorrect length.
    InvalidByteLength { got: usize, expected: usize },
    /// The provided secret key bytes were an incorrect length.
    InvalidSecretKeyLength { got: usize, expected: usize },
    /// The input hex string could not be decoded.
    InvalidHex(String),
}

impl From<blst::BLST_ERROR> for Error {
    fn from(e: blst::BLST_ERROR) -> Error {
        Error::BlstError(e)
    }
}

/// Decodes a `0x`-prefixed hex string.
pub(crate) fn hex_decode(s: &str) -> Result<Vec<u8>, Error> {
    let stripped = s
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidHex("missing 0x prefix".to_string()))?;
    hex::decode(stripped).map_err(|e| Error::InvalidHex(format!("{:?}", e)))
}
