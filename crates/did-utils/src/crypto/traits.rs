use super::errors::Error;

/// The length of a 32-byte key material.
pub const BYTES_LENGTH_32: usize = 32;

/// A trait for keypairs encodable as multibase multikey strings.
pub trait ToMultikey {
    /// Converts the keypair's public key into its multikey string.
    fn to_multikey(&self) -> String;

    /// Converts the keypair's private key into its multikey string.
    ///
    /// Private keys carry their own multicodec prefixes, distinct from the
    /// public ones.
    fn to_private_multikey(&self) -> Result<String, Error>;
}

/// A trait for types that hold key material bytes.
pub trait KeyMaterial {
    /// Returns the bytes of the public key.
    fn public_key_bytes(&self) -> Result<[u8; BYTES_LENGTH_32], Error>;

    /// Returns the bytes of the private key.
    fn private_key_bytes(&self) -> Result<[u8; BYTES_LENGTH_32], Error>;
}

/// A trait for types that support key generation.
pub trait Generate: KeyMaterial {
    /// Generates a new random key pair.
    fn new() -> Result<Self, Error>
    where
        Self: Sized;

    /// Generates a new key pair with a given seed.
    /// If the seed is empty or invalid, a random seed will be generated.
    fn new_with_seed(seed: &[u8]) -> Result<Self, Error>
    where
        Self: Sized;

    /// Builds a key pair from a public key, with no private part.
    fn from_public_key(public_key: &[u8; BYTES_LENGTH_32]) -> Result<Self, Error>
    where
        Self: Sized;

    /// Builds a key pair from a secret key, deriving the public part.
    fn from_secret_key(private_key: &[u8; BYTES_LENGTH_32]) -> Result<Self, Error>
    where
        Self: Sized;
}

/// A trait for types that support signing and verification operations.
pub trait CoreSign {
    /// Signs the payload with the key pair.
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, Error>;

    /// Verifies the signature of the payload with the key pair.
    fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<(), Error>;
}

/// A trait for types that support ECDH key exchange operations.
pub trait ECDH {
    /// Performs ECDH key exchange with the given public key.
    fn key_exchange(&self, their_public: &Self) -> Option<Vec<u8>>;
}
