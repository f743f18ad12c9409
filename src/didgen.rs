use database::{Repository, RepositoryError};
use did_utils::{
    crypto::{Ed25519KeyPair, Generate, PublicKeyFormat, ToMultikey, X25519KeyPair},
    didcore::{Document, Service, ServiceEndpoint, DIDCOMM_MESSAGING_SERVICE_TYPE},
    jwk::Jwk,
    methods::{DidPeer, Purpose, PurposedKey},
};
use keystore::{Keystore, SecretMaterial, SecretType};
use mongodb::bson::{doc, DateTime};
use shared::repository::entity::MediatorDid;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Key Generation Error")]
    KeyGenerationError,
    #[error("Key Conversion Error")]
    KeyConversionError,
    #[error("Key Storing Error")]
    KeyStoringError,
    #[error("DID Generation Error")]
    DidGenerationError,
    #[error("Missing secret for {0}")]
    MissingSecret(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Loads the connector's DID, generating it at first boot.
///
/// The returned document is the local expansion of the stored address; its
/// verification methods are all backed by keystore secrets.
pub async fn init_mediator_did(
    public_url: &str,
    keystore: &Keystore,
    repository: &Arc<dyn Repository<MediatorDid>>,
) -> Result<Document, Error> {
    let diddoc = match repository.find_one_by(doc! {}).await? {
        Some(identity) => expand(&identity.did)?,
        None => {
            let did = didgen(public_url, keystore).await?;
            repository
                .store(MediatorDid {
                    id: None,
                    did: did.clone(),
                    added: Some(DateTime::now()),
                })
                .await?;
            tracing::info!("mediator DID generated and persisted");
            expand(&did)?
        }
    };

    validate_diddoc(&diddoc, keystore).await?;
    Ok(diddoc)
}

/// Generates the connector's `did:peer:2` identity and registers its
/// secrets.
async fn didgen(public_url: &str, keystore: &Keystore) -> Result<String, Error> {
    let auth_keys = Ed25519KeyPair::new().map_err(|_| Error::KeyGenerationError)?;
    let agreem_keys = X25519KeyPair::new().map_err(|_| Error::KeyGenerationError)?;

    let auth_multikey = auth_keys.to_multikey();
    let agreem_multikey = agreem_keys.to_multikey();

    let auth_jwk: Jwk = auth_keys.try_into().map_err(|_| Error::KeyConversionError)?;
    let agreem_jwk: Jwk = agreem_keys.try_into().map_err(|_| Error::KeyConversionError)?;

    let keys = vec![
        PurposedKey {
            purpose: Purpose::Encryption,
            public_key_multibase: agreem_multikey.clone(),
        },
        PurposedKey {
            purpose: Purpose::Verification,
            public_key_multibase: auth_multikey.clone(),
        },
    ];

    let services = vec![Service {
        id: String::from("#service"),
        service_type: String::from(DIDCOMM_MESSAGING_SERVICE_TYPE),
        service_endpoint: ServiceEndpoint {
            uri: format!("{public_url}/message/receive"),
            accept: Some(vec![String::from("didcomm/v2")]),
            routing_keys: vec![],
        },
    }];

    let did = DidPeer::create_did_peer_2(&keys, &services).map_err(|_| Error::DidGenerationError)?;

    // Resolve once so secrets land under the advertised key ids.
    let diddoc = expand(&did)?;
    for method in diddoc.verification_method.as_deref().unwrap_or_default() {
        let fragment = method.id.trim_start_matches('#');
        let kid = format!("{did}#{fragment}");

        let jwk = if fragment == agreem_multikey {
            &agreem_jwk
        } else if fragment == auth_multikey {
            &auth_jwk
        } else {
            continue;
        };

        keystore
            .store(
                &kid,
                SecretType::JsonWebKey2020,
                SecretMaterial::Jwk {
                    private_key_jwk: jwk.clone(),
                },
            )
            .await
            .map_err(|_| Error::KeyStoringError)?;
    }

    Ok(did)
}

fn expand(did: &str) -> Result<Document, Error> {
    DidPeer::with_format(PublicKeyFormat::Jwk)
        .expand(did)
        .map_err(|_| Error::DidGenerationError)
}

/// Validates the integrity of the persisted identity: every verification
/// method must have a matching secret.
async fn validate_diddoc(diddoc: &Document, keystore: &Keystore) -> Result<(), Error> {
    for method in diddoc.verification_method.as_deref().unwrap_or_default() {
        let kid = format!("{}{}", diddoc.id, method.id);
        keystore
            .retrieve(&kid)
            .await
            .map_err(|_| Error::MissingSecret(kid.clone()))?
            .ok_or_else(|| Error::MissingSecret(kid.clone()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::InMemoryRepository;

    #[tokio::test]
    async fn test_did_generation_and_validation() {
        let keystore = Keystore::in_memory();
        let repository: Arc<dyn Repository<MediatorDid>> = Arc::new(InMemoryRepository::new());

        let diddoc = init_mediator_did("https://example.com", &keystore, &repository)
            .await
            .unwrap();

        assert!(diddoc.id.starts_with("did:peer:2.Ez6LS"));
        assert_eq!(
            diddoc.didcomm_messaging_uri(),
            Some("https://example.com/message/receive")
        );

        // created exactly once
        assert_eq!(repository.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_identity_is_stable_across_boots() {
        let keystore = Keystore::in_memory();
        let repository: Arc<dyn Repository<MediatorDid>> = Arc::new(InMemoryRepository::new());

        let first = init_mediator_did("https://example.com", &keystore, &repository)
            .await
            .unwrap();
        let second = init_mediator_did("https://example.com", &keystore, &repository)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repository.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_fails_on_missing_secrets() {
        let keystore = Keystore::in_memory();
        let repository: Arc<dyn Repository<MediatorDid>> = Arc::new(InMemoryRepository::new());

        init_mediator_did("https://example.com", &keystore, &repository)
            .await
            .unwrap();

        // a fresh keystore no longer holds the secrets
        let empty_keystore = Keystore::in_memory();
        let err = init_mediator_did("https://example.com", &empty_keystore, &repository)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingSecret(_)));
    }
}
