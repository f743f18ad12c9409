use multibase::Base::Base58Btc;
use x25519_dalek::{PublicKey, StaticSecret};

use super::{
    alg::Algorithm,
    errors::Error,
    traits::{Generate, KeyMaterial, ToMultikey, BYTES_LENGTH_32, ECDH},
    utils::{clone_slice_to_array, generate_seed},
    AsymmetricKey,
};

/// A wrapper struct for an X25519 asymmetric key pair.
pub type X25519KeyPair = AsymmetricKey<PublicKey, StaticSecret>;

impl std::fmt::Debug for X25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}", self.public_key))
    }
}

impl KeyMaterial for X25519KeyPair {
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

impl Generate for X25519KeyPair {
    fn new() -> Result<X25519KeyPair, Error> {
        Self::new_with_seed(&[])
    }

    fn new_with_seed(seed: &[u8]) -> Result<X25519KeyPair, Error> {
        let secret_seed = generate_seed(seed).map_err(|_| Error::InvalidSeed)?;
        let sk = StaticSecret::from(secret_seed);
        Ok(X25519KeyPair {
            public_key: PublicKey::from(&sk),
            secret_key: Some(sk),
        })
    }

    fn from_public_key(public_key: &[u8; BYTES_LENGTH_32]) -> Result<X25519KeyPair, Error> {
        Ok(X25519KeyPair {
            public_key: PublicKey::from(clone_slice_to_array(public_key)),
            secret_key: None,
        })
    }

    fn from_secret_key(secret_key: &[u8; BYTES_LENGTH_32]) -> Result<X25519KeyPair, Error> {
        let sk = StaticSecret::from(clone_slice_to_array(secret_key));
        Ok(X25519KeyPair {
            public_key: PublicKey::from(&sk),
            secret_key: Some(sk),
        })
    }
}

impl ECDH for X25519KeyPair {
    fn key_exchange(&self, key: &Self) -> Option<Vec<u8>> {
        self.secret_key
            .as_ref()
            .map(|sk| sk.diffie_hellman(&key.public_key).as_bytes().to_vec())
    }
}

impl ToMultikey for X25519KeyPair {
    fn to_multikey(&self) -> String {
        let prefix = &Algorithm::X25519.multicodec_prefix();
        let bytes = &self.public_key.as_bytes()[..];
        multibase::encode(Base58Btc, [prefix, bytes].concat())
    }

    fn to_private_multikey(&self) -> Result<String, Error> {
        let prefix = &Algorithm::X25519.private_multicodec_prefix();
        let bytes = self.private_key_bytes()?;
        Ok(multibase::encode(Base58Btc, [prefix, &bytes[..]].concat()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_exchange_is_symmetric() {
        let alice = X25519KeyPair::new_with_seed(b"TMwLj2p2qhcuVhaFAj3QkkJGhK6pdyKx").unwrap();
        let bob = X25519KeyPair::new_with_seed(b"NWB6DbnIlewWVp5jIJOSgyX8msXNPPAL").unwrap();

        let alice_shared_secret = alice.key_exchange(&bob);
        let bob_shared_secret = bob.key_exchange(&alice);

        assert!(alice_shared_secret.is_some());
        assert_eq!(alice_shared_secret, bob_shared_secret);
    }

    #[test]
    fn test_public_only_keypair_cannot_exchange() {
        let alice = X25519KeyPair::new().unwrap();
        let public_only =
            X25519KeyPair::from_public_key(&alice.public_key_bytes().unwrap()).unwrap();
        assert!(public_only.key_exchange(&alice).is_none());
    }

    #[test]
    fn test_to_multikey_prefixes() {
        let keypair = X25519KeyPair::new().unwrap();

        let multikey = keypair.to_multikey();
        assert!(multikey.starts_with("z6LS"));

        let private_multikey = keypair.to_private_multikey().unwrap();
        let (_, decoded) = multibase::decode(&private_multikey).unwrap();
        assert_eq!(&decoded[..2], &[0x82, 0x26]);
    }
}
