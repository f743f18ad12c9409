use async_trait::async_trait;
use did_utils::{
    crypto::{decode_private_multikey, Algorithm, PublicKeyFormat},
    didcore::{Document, KeyFormat, VerificationMethodType as DidcoreMethodType},
    jwk::Jwk,
    methods::DidPeer,
};
use didcomm::{
    did::{
        DIDCommMessagingService, DIDDoc, DIDResolver, Service, ServiceKind, VerificationMaterial,
        VerificationMethod, VerificationMethodType,
    },
    error::{Error, ErrorKind, Result},
    secrets::{Secret, SecretMaterial, SecretType, SecretsResolver},
};
use keystore::{Keystore, SecretMaterial as StoredMaterial, SecretType as StoredType, Secrets};
use serde_json::{json, Value};

/// Resolver callback for the envelope codec: the connector's own document
/// and `did:peer` addresses are decoded locally, every other method is
/// proxied to the universal resolver.
#[derive(Clone)]
pub struct LocalDIDResolver {
    diddoc: Document,
    resolver_url: String,
    client: reqwest::Client,
}

impl LocalDIDResolver {
    pub fn new(server_diddoc: &Document, resolver_url: &str) -> Self {
        Self {
            diddoc: server_diddoc.clone(),
            resolver_url: resolver_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn resolve_with_universal_resolver(&self, did: &str) -> Result<Option<DIDDoc>> {
        let query_url = format!("{}/1.0/identifiers/{}", self.resolver_url, did);

        let response = self
            .client
            .get(&query_url)
            .send()
            .await
            .map_err(|e| Error::new(ErrorKind::IoError, e))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::new(ErrorKind::Malformed, e))?;

        // Two response envelopes are in circulation: the resolution result
        // with a nested didDocument, and the bare document.
        let mut document = match body.get("didDocument") {
            Some(document) => document.clone(),
            None => body,
        };

        // Services other than DIDCommMessaging are dropped for protocol
        // use, before the typed parse which their endpoints would not fit.
        if let Some(services) = document.get_mut("service").and_then(Value::as_array_mut) {
            services.retain(|s| s.get("type").and_then(Value::as_str) == Some("DIDCommMessaging"));
        }

        let document: Document = serde_json::from_value(document)
            .map_err(|e| Error::new(ErrorKind::Malformed, e))?;

        Ok(Some(to_didcomm_doc(&document)?))
    }
}

#[async_trait]
impl DIDResolver for LocalDIDResolver {
    async fn resolve(&self, did: &str) -> Result<Option<DIDDoc>> {
        if did == self.diddoc.id {
            let mut diddoc = self.diddoc.clone();
            qualify_vm_ids(&mut diddoc);
            return Ok(Some(to_didcomm_doc(&diddoc)?));
        }

        if did.starts_with("did:peer:") {
            let mut diddoc = DidPeer::with_format(PublicKeyFormat::Jwk)
                .expand(did)
                .map_err(|e| Error::new(ErrorKind::DIDNotResolved, e))?;
            qualify_vm_ids(&mut diddoc);
            Ok(Some(to_didcomm_doc(&diddoc)?))
        } else {
            self.resolve_with_universal_resolver(did).await
        }
    }
}

/// Prepends the document id to relative verification-method ids and
/// references, as the envelope codec expects fully qualified key ids.
fn qualify_vm_ids(diddoc: &mut Document) {
    let doc_id = diddoc.id.clone();
    let qualify = move |id: &str| -> String {
        if id.starts_with('#') {
            format!("{doc_id}{id}")
        } else {
            id.to_string()
        }
    };

    if let Some(methods) = diddoc.verification_method.as_mut() {
        for vm in methods.iter_mut() {
            vm.id = qualify(&vm.id);
        }
    }

    for relationship in [diddoc.authentication.as_mut(), diddoc.key_agreement.as_mut()]
        .into_iter()
        .flatten()
    {
        for entry in relationship.iter_mut() {
            if let DidcoreMethodType::Reference(id) = entry {
                *id = qualify(id);
            }
        }
    }
}

/// Converts the local document model into the envelope codec's.
fn to_didcomm_doc(doc: &Document) -> Result<DIDDoc> {
    let verification_method = doc
        .verification_method
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(to_didcomm_vm)
        .collect::<Result<Vec<_>>>()?;

    let refs = |relationship: &Option<Vec<DidcoreMethodType>>| -> Vec<String> {
        relationship
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|entry| entry.id().to_string())
            .collect()
    };

    let service = doc
        .service
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|s| Service {
            id: s.id.clone(),
            service_endpoint: ServiceKind::DIDCommMessaging {
                value: DIDCommMessagingService {
                    uri: s.service_endpoint.uri.clone(),
                    accept: s.service_endpoint.accept.clone(),
                    routing_keys: s.service_endpoint.routing_keys.clone(),
                },
            },
        })
        .collect();

    Ok(DIDDoc {
        id: doc.id.clone(),
        authentication: refs(&doc.authentication),
        key_agreement: refs(&doc.key_agreement),
        verification_method,
        service,
    })
}

fn to_didcomm_vm(vm: did_utils::didcore::VerificationMethod) -> Result<VerificationMethod> {
    let type_ = match vm.key_type.as_str() {
        "JsonWebKey2020" => VerificationMethodType::JsonWebKey2020,
        "X25519KeyAgreementKey2019" => VerificationMethodType::X25519KeyAgreementKey2019,
        "Ed25519VerificationKey2018" => VerificationMethodType::Ed25519VerificationKey2018,
        "EcdsaSecp256k1VerificationKey2019" => {
            VerificationMethodType::EcdsaSecp256k1VerificationKey2019
        }
        "X25519KeyAgreementKey2020" => VerificationMethodType::X25519KeyAgreementKey2020,
        "Ed25519VerificationKey2020" => VerificationMethodType::Ed25519VerificationKey2020,
        _ => VerificationMethodType::Other,
    };

    let verification_material = match vm.public_key {
        Some(KeyFormat::Jwk(jwk)) => VerificationMaterial::JWK {
            public_key_jwk: json!(jwk),
        },
        Some(KeyFormat::Multibase(multibase)) => VerificationMaterial::Multibase {
            public_key_multibase: multibase,
        },
        Some(KeyFormat::Base58(base58)) => VerificationMaterial::Base58 {
            public_key_base58: base58,
        },
        None => {
            return Err(Error::msg(
                ErrorKind::Malformed,
                "verification method without key material".to_string(),
            ))
        }
    };

    Ok(VerificationMethod {
        id: vm.id,
        type_,
        controller: vm.controller,
        verification_material,
    })
}

/// Secrets callback for the envelope codec, backed by the keystore.
#[derive(Clone)]
pub struct LocalSecretsResolver {
    keystore: Keystore,
}

impl LocalSecretsResolver {
    pub fn new(keystore: Keystore) -> Self {
        Self { keystore }
    }
}

#[async_trait]
impl SecretsResolver for LocalSecretsResolver {
    async fn get_secret(&self, secret_id: &str) -> Result<Option<Secret>> {
        self.keystore
            .retrieve(secret_id)
            .await
            .map_err(|e| Error::new(ErrorKind::IoError, e))?
            .map(to_didcomm_secret)
            .transpose()
    }

    async fn find_secrets<'a>(&self, secret_ids: &'a [&'a str]) -> Result<Vec<&'a str>> {
        let found = self
            .keystore
            .find(secret_ids)
            .await
            .map_err(|e| Error::new(ErrorKind::IoError, e))?;

        Ok(secret_ids
            .iter()
            .filter(|id| found.iter().any(|kid| kid == *id))
            .copied()
            .collect())
    }
}

/// Converts a stored secret into the codec's secret model. Multibase and
/// base58 material is normalized to JWK, which is what the codec's crypto
/// engine consumes.
fn to_didcomm_secret(secret: Secrets) -> Result<Secret> {
    let jwk = secret_jwk(&secret).map_err(|msg| Error::msg(ErrorKind::Malformed, msg))?;

    Ok(Secret {
        id: secret.kid,
        type_: SecretType::JsonWebKey2020,
        secret_material: SecretMaterial::JWK {
            private_key_jwk: json!(jwk),
        },
    })
}

pub(crate) fn secret_jwk(secret: &Secrets) -> std::result::Result<Jwk, String> {
    match &secret.secret_material {
        StoredMaterial::Jwk { private_key_jwk } => Ok(private_key_jwk.clone()),
        StoredMaterial::Multibase { private_key_multibase } => {
            let (alg, bytes) = decode_private_multikey(private_key_multibase)
                .map_err(|e| format!("undecodable private multikey: {e}"))?;
            // An Ed25519 private key may come as seed or as seed plus
            // public half; the seed is the leading 32 bytes either way.
            jwk_from_raw_private(alg, &bytes)
        }
        StoredMaterial::Base58 { private_key_base58 } => {
            let bytes = bs58::decode(private_key_base58)
                .into_vec()
                .map_err(|e| format!("undecodable base58 private key: {e}"))?;
            let alg = match secret.secret_type {
                StoredType::X25519KeyAgreementKey2019 | StoredType::X25519KeyAgreementKey2020 => {
                    Algorithm::X25519
                }
                _ => Algorithm::Ed25519,
            };
            jwk_from_raw_private(alg, &bytes)
        }
    }
}

fn jwk_from_raw_private(alg: Algorithm, bytes: &[u8]) -> std::result::Result<Jwk, String> {
    use did_utils::crypto::{Ed25519KeyPair, Generate, X25519KeyPair};

    if bytes.len() < 32 {
        return Err("private key too short".to_string());
    }
    let seed: [u8; 32] = bytes[..32].try_into().unwrap();

    let jwk = match alg {
        Algorithm::Ed25519 => Ed25519KeyPair::from_secret_key(&seed)
            .and_then(Jwk::try_from)
            .map_err(|e| e.to_string())?,
        Algorithm::X25519 => X25519KeyPair::from_secret_key(&seed)
            .and_then(Jwk::try_from)
            .map_err(|e| e.to_string())?,
    };

    Ok(jwk)
}
