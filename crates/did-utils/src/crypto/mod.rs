//! Cryptographic key management for the curves the connector works with,
//! [Ed25519] for signatures and [X25519] for key agreement.
//!
//! [Ed25519]: https://en.wikipedia.org/wiki/EdDSA
//! [X25519]: https://en.wikipedia.org/wiki/X25519

pub(crate) mod alg;
mod ed25519;
mod errors;
mod format;
mod traits;
mod utils;
mod x25519;

pub use alg::{decode_multikey, decode_private_multikey, Algorithm, DecodeMultikeyError};
pub use ed25519::Ed25519KeyPair;
pub use errors::Error;
pub use format::PublicKeyFormat;
pub use traits::{CoreSign, Generate, KeyMaterial, ToMultikey, BYTES_LENGTH_32, ECDH};
pub use x25519::X25519KeyPair;

/// A wrapper struct for an asymmetric key pair.
/// This struct holds a public key and an optional secret key.
pub struct AsymmetricKey<P, S> {
    pub public_key: P,
    pub secret_key: Option<S>,
}
