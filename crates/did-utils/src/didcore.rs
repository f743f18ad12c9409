//! Serde model of W3C DID documents, reduced to the fields DIDComm
//! mediation works with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jwk::Jwk;

/// A resolved DID document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The `@context` shape varies widely across resolvers (string, array,
    /// objects), so it is carried opaquely.
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none", default)]
    pub context: Option<Value>,

    #[serde(default)]
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub also_known_as: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub verification_method: Option<Vec<VerificationMethod>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub authentication: Option<Vec<VerificationMethodType>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub assertion_method: Option<Vec<VerificationMethodType>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub key_agreement: Option<Vec<VerificationMethodType>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub service: Option<Vec<Service>>,
}

/// Entry of a verification relationship: either a reference to a
/// verification method's id or the method embedded in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerificationMethodType {
    Reference(String),
    Embedded(Box<VerificationMethod>),
}

impl VerificationMethodType {
    /// The referenced or embedded verification-method id.
    pub fn id(&self) -> &str {
        match self {
            VerificationMethodType::Reference(id) => id,
            VerificationMethodType::Embedded(method) => &method.id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,

    /// `Ed25519VerificationKey2018/2020`, `X25519KeyAgreementKey2019/2020`,
    /// `JsonWebKey2020`, `EcdsaSecp256k1VerificationKey2019`, or whatever
    /// else a resolver hands back.
    #[serde(rename = "type", default)]
    pub key_type: String,

    #[serde(default)]
    pub controller: String,

    #[serde(flatten, skip_serializing_if = "Option::is_none", default)]
    pub public_key: Option<KeyFormat>,
}

/// Public key material in one of the wire encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyFormat {
    #[serde(rename = "publicKeyBase58")]
    Base58(String),
    #[serde(rename = "publicKeyMultibase")]
    Multibase(String),
    #[serde(rename = "publicKeyJwk")]
    Jwk(Box<Jwk>),
}

/// A service advertised in a DID document. Only `DIDCommMessaging`
/// services are meaningful to the mediation protocols.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,

    #[serde(rename = "type", default)]
    pub service_type: String,

    #[serde(default)]
    pub service_endpoint: ServiceEndpoint,
}

pub const DIDCOMM_MESSAGING_SERVICE_TYPE: &str = "DIDCommMessaging";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    #[serde(default)]
    pub uri: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub accept: Option<Vec<String>>,

    #[serde(default)]
    pub routing_keys: Vec<String>,
}

impl Document {
    /// Returns the URI of the first `DIDCommMessaging` service, if any.
    pub fn didcomm_messaging_uri(&self) -> Option<&str> {
        self.service
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|s| s.service_type == DIDCOMM_MESSAGING_SERVICE_TYPE)
            .map(|s| s.service_endpoint.uri.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_serde_shape() {
        let doc: Document = serde_json::from_value(json!({
            "@context": ["https://www.w3.org/ns/did/v1"],
            "id": "did:peer:2.Ez6LSg8zQom395jKLrGiBNruB9MM6V8PWuf2FpEy4uRFiqQBR",
            "verificationMethod": [{
                "id": "#z6LSg8zQom395jKLrGiBNruB9MM6V8PWuf2FpEy4uRFiqQBR",
                "type": "Multikey",
                "controller": "did:peer:2.Ez6LSg8zQom395jKLrGiBNruB9MM6V8PWuf2FpEy4uRFiqQBR",
                "publicKeyMultibase": "z6LSg8zQom395jKLrGiBNruB9MM6V8PWuf2FpEy4uRFiqQBR"
            }],
            "keyAgreement": ["#z6LSg8zQom395jKLrGiBNruB9MM6V8PWuf2FpEy4uRFiqQBR"],
            "service": [{
                "id": "#service",
                "type": "DIDCommMessaging",
                "serviceEndpoint": {
                    "uri": "http://example.com/didcomm",
                    "accept": ["didcomm/v2"],
                    "routingKeys": []
                }
            }]
        }))
        .unwrap();

        let methods = doc.verification_method.as_ref().unwrap();
        assert_eq!(
            methods[0].public_key,
            Some(KeyFormat::Multibase(
                "z6LSg8zQom395jKLrGiBNruB9MM6V8PWuf2FpEy4uRFiqQBR".to_string()
            ))
        );
        assert_eq!(
            doc.key_agreement.as_ref().unwrap()[0].id(),
            "#z6LSg8zQom395jKLrGiBNruB9MM6V8PWuf2FpEy4uRFiqQBR"
        );
        assert_eq!(doc.didcomm_messaging_uri(), Some("http://example.com/didcomm"));
    }

    #[test]
    fn test_context_accepts_any_shape() {
        for context in [
            json!("https://www.w3.org/ns/did/v1"),
            json!(["https://www.w3.org/ns/did/v1", {"@base": "did:example:123"}]),
            json!({"@vocab": "https://www.w3.org/ns/did/v1"}),
        ] {
            let doc: Document =
                serde_json::from_value(json!({"@context": context, "id": "did:example:123"}))
                    .unwrap();
            assert_eq!(doc.id, "did:example:123");
        }
    }
}
