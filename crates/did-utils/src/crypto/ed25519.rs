use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use multibase::Base::Base58Btc;
use sha2::{Digest, Sha512};

use super::{
    alg::Algorithm,
    errors::Error,
    traits::{CoreSign, Generate, KeyMaterial, ToMultikey, BYTES_LENGTH_32},
    utils::{clone_slice_to_array, generate_seed},
    x25519::X25519KeyPair,
    AsymmetricKey,
};

/// A wrapper struct for an Ed25519 asymmetric key pair.
pub type Ed25519KeyPair = AsymmetricKey<VerifyingKey, SigningKey>;

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}", self.public_key))
    }
}

impl KeyMaterial for Ed25519KeyPair {
    fn public_key_bytes(&self) -> Result<[u8; BYTES_LENGTH_32], Error> {
        Ok(clone_slice_to_array(self.public_key.as_bytes()))
    }

    fn private_key_bytes(&self) -> Result<[u8; BYTES_LENGTH_32], Error> {
        match &self.secret_key {
            Some(sk) => Ok(clone_slice_to_array(&sk.to_bytes())),
            None => Err(Error::InvalidSecretKey),
        }
    }
}

impl Generate for Ed25519KeyPair {
    fn new() -> Result<Ed25519KeyPair, Error> {
        Self::new_with_seed(&[])
    }

    fn new_with_seed(seed: &[u8]) -> Result<Ed25519KeyPair, Error> {
        let secret_seed = generate_seed(seed).map_err(|_| Error::InvalidSeed)?;
        let sk = SigningKey::from_bytes(&secret_seed);
        Ok(Ed25519KeyPair {
            public_key: sk.verifying_key(),
            secret_key: Some(sk),
        })
    }

    fn from_public_key(public_key: &[u8; BYTES_LENGTH_32]) -> Result<Ed25519KeyPair, Error> {
        Ok(Ed25519KeyPair {
            public_key: VerifyingKey::from_bytes(&clone_slice_to_array(public_key))
                .map_err(|_| Error::InvalidPublicKey)?,
            secret_key: None,
        })
    }

    fn from_secret_key(secret_key: &[u8; BYTES_LENGTH_32]) -> Result<Ed25519KeyPair, Error> {
        let sk = SigningKey::from_bytes(&clone_slice_to_array(secret_key));
        Ok(Ed25519KeyPair {
            public_key: sk.verifying_key(),
            secret_key: Some(sk),
        })
    }
}

impl CoreSign for Ed25519KeyPair {
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        let sk = self.secret_key.as_ref().ok_or(Error::InvalidSecretKey)?;
        let signature = sk.try_sign(payload).map_err(|_| Error::SignatureError)?;
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<(), Error> {
        let signature = Signature::try_from(signature).map_err(|_| Error::CanNotRetrieveSignature)?;
        self.public_key
            .verify(payload, &signature)
            .map_err(|_| Error::VerificationError)
    }
}

impl ToMultikey for Ed25519KeyPair {
    fn to_multikey(&self) -> String {
        let prefix = &Algorithm::Ed25519.multicodec_prefix();
        let bytes = &self.public_key.as_bytes()[..];
        multibase::encode(Base58Btc, [prefix, bytes].concat())
    }

    fn to_private_multikey(&self) -> Result<String, Error> {
        let prefix = &Algorithm::Ed25519.private_multicodec_prefix();
        let bytes = self.private_key_bytes()?;
        Ok(multibase::encode(Base58Btc, [prefix, &bytes[..]].concat()))
    }
}

impl Ed25519KeyPair {
    /// Derives the X25519 key pair matching this Ed25519 key pair.
    ///
    /// With a secret key present the derivation goes through the hashed
    /// seed; otherwise only the public Montgomery point is carried over.
    pub fn get_x25519(&self) -> Result<X25519KeyPair, Error> {
        match &self.secret_key {
            Some(sk) => {
                let bytes: [u8; BYTES_LENGTH_32] = sk.to_bytes();
                let mut hasher = Sha512::new();
                hasher.update(bytes);
                let hash = hasher.finalize();

                let mut output = [0u8; BYTES_LENGTH_32];
                output.copy_from_slice(&hash[..BYTES_LENGTH_32]);
                output[0] &= 248;
                output[31] &= 127;
                output[31] |= 64;

                X25519KeyPair::new_with_seed(&output)
            }
            None => {
                let pk_bytes = self.public_key_bytes()?;
                let point = CompressedEdwardsY(pk_bytes)
                    .decompress()
                    .ok_or(Error::InvalidPublicKey)?;
                let montgomery = point.to_montgomery();
                X25519KeyPair::from_public_key(montgomery.as_bytes())
            }
        }
    }
}
