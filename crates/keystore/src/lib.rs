//! Secrets store keyed by verification-method id.
//!
//! Secrets are written by the peer-DID engine when addresses are minted and
//! read back by the envelope codec's secrets-resolver callback, so a store
//! must have completed durably before the calling protocol step returns.

use database::{Identifiable, InMemoryRepository, Repository, RepositoryError};
use did_utils::jwk::Jwk;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("secret not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// The type of a stored secret, mirroring the verification-method type set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecretType {
    JsonWebKey2020,
    X25519KeyAgreementKey2019,
    Ed25519VerificationKey2018,
    EcdsaSecp256k1VerificationKey2019,
    X25519KeyAgreementKey2020,
    Ed25519VerificationKey2020,
    Other,
}

/// Private key material in one of the wire encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecretMaterial {
    #[serde(rename_all = "camelCase")]
    Jwk { private_key_jwk: Jwk },
    #[serde(rename_all = "camelCase")]
    Multibase { private_key_multibase: String },
    #[serde(rename_all = "camelCase")]
    Base58 { private_key_base58: String },
}

/// A stored secret. `kid` equals the fully qualified verification-method id
/// the secret belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secrets {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub kid: String,

    #[serde(rename = "type")]
    pub secret_type: SecretType,

    pub secret_material: SecretMaterial,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub added: Option<DateTime>,
}

impl Identifiable for Secrets {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

/// Facade over the secrets repository.
#[derive(Clone)]
pub struct Keystore {
    repository: Arc<dyn Repository<Secrets>>,
}

impl Keystore {
    pub fn new(repository: Arc<dyn Repository<Secrets>>) -> Self {
        Self { repository }
    }

    /// An ephemeral keystore for `database.in_memory` deployments.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRepository::new()))
    }

    /// Stores a secret under its verification-method id.
    ///
    /// Idempotent on `kid`: storing an already-known id replaces the
    /// material in place.
    pub async fn store(
        &self,
        kid: &str,
        secret_type: SecretType,
        secret_material: SecretMaterial,
    ) -> Result<(), KeystoreError> {
        let existing = self.repository.find_one_by(doc! {"kid": kid}).await?;

        let secret = Secrets {
            id: existing.as_ref().and_then(|s| s.id),
            kid: kid.to_string(),
            secret_type,
            secret_material,
            added: existing
                .as_ref()
                .and_then(|s| s.added)
                .or_else(|| Some(DateTime::now())),
        };

        match existing {
            Some(_) => self.repository.update(secret).await?,
            None => self.repository.store(secret).await?,
        };

        Ok(())
    }

    /// Returns the full secret record for a verification-method id, if any.
    pub async fn retrieve(&self, kid: &str) -> Result<Option<Secrets>, KeystoreError> {
        Ok(self.repository.find_one_by(doc! {"kid": kid}).await?)
    }

    /// Returns the subset of the given ids for which a secret exists.
    /// Missing ids are not an error.
    pub async fn find(&self, kids: &[&str]) -> Result<Vec<String>, KeystoreError> {
        let found = self
            .repository
            .find_all_by(doc! {"kid": {"$in": kids.to_vec()}}, None)
            .await?;

        Ok(found.into_iter().map(|s| s.kid).collect())
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Keystore {
    /// Builds an in-memory keystore preloaded with JWK secrets, for tests.
    pub fn with_mock_configs(secrets: Vec<(String, Jwk)>) -> Self {
        let secrets = secrets
            .into_iter()
            .map(|(kid, jwk)| Secrets {
                id: Some(ObjectId::new()),
                kid,
                secret_type: SecretType::JsonWebKey2020,
                secret_material: SecretMaterial::Jwk { private_key_jwk: jwk },
                added: None,
            })
            .collect();

        Self::new(Arc::new(InMemoryRepository::from(secrets)))
    }
}
