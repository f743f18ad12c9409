use multibase::Base::Base64Url;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::errors::DidPeerError;
use crate::{
    crypto::{
        alg::decode_multikey,
        PublicKeyFormat,
    },
    didcore::{
        Document, KeyFormat, Service, ServiceEndpoint, VerificationMethod, VerificationMethodType,
        DIDCOMM_MESSAGING_SERVICE_TYPE,
    },
};

lazy_static::lazy_static!(
    static ref DID_PEER_2_REGEX: Regex =
        Regex::new("^did:peer:2((\\.[EV](z)([1-9a-km-zA-HJ-NP-Z]+))+(\\.(S)[0-9a-zA-Z_-]*)*)$").unwrap();
);

/// The `did:peer` method, restricted to numalgo 2 (multiple inception keys
/// without doc).
///
/// See <https://identity.foundation/peer-did-method-spec/#method-2-multiple-inception-key-without-doc>
#[derive(Default)]
pub struct DidPeer {
    /// Key format to consider during DID expansion into a DID document
    key_format: PublicKeyFormat,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Purpose {
    Encryption,   // Key Agreement
    Verification, // Authentication
    Service,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PurposedKey {
    pub purpose: Purpose,
    pub public_key_multibase: String,
}

impl Purpose {
    /// Converts purpose to normalized one-letter code
    pub fn code(&self) -> char {
        match self {
            Purpose::Encryption => 'E',
            Purpose::Verification => 'V',
            Purpose::Service => 'S',
        }
    }

    /// Derives purpose from normalized one-letter code
    pub fn from_code(c: &char) -> Result<Self, DidPeerError> {
        match c {
            'E' => Ok(Purpose::Encryption),
            'V' => Ok(Purpose::Verification),
            'S' => Ok(Purpose::Service),
            _ => Err(DidPeerError::InvalidPurposeCode),
        }
    }
}

// Compact service representation carried in the `.S` segments, exactly as
// third parties expect it on the wire:
// {"t":"dm","s":{"uri":…,"a":[…],"r":[…]}}
#[derive(Serialize, Deserialize)]
struct CompactService {
    t: String,
    s: CompactServiceEndpoint,
}

#[derive(Serialize, Deserialize)]
struct CompactServiceEndpoint {
    uri: String,
    a: Vec<String>,
    r: Vec<String>,
}

impl DidPeer {
    /// Creates new instance of DidPeer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates new instance of DidPeer with given key format.
    pub fn with_format(key_format: PublicKeyFormat) -> Self {
        Self { key_format }
    }

    // ---------------------------------------------------------------------------
    // Generating did:peer addresses
    // ---------------------------------------------------------------------------

    /// Generates a `did:peer:2` address from inception keys and services.
    pub fn create_did_peer_2(
        keys: &[PurposedKey],
        services: &[Service],
    ) -> Result<String, DidPeerError> {
        if keys.is_empty() && services.is_empty() {
            return Err(DidPeerError::EmptyArguments);
        }

        let mut chain = vec![];

        for key in keys {
            if matches!(key.purpose, Purpose::Service) {
                return Err(DidPeerError::UnexpectedPurpose);
            }

            chain.push(format!(".{}{}", key.purpose.code(), key.public_key_multibase));
        }

        for service in services {
            let abbreviated = abbreviate_service(service)?;
            let encoded = Base64Url.encode(abbreviated);

            chain.push(format!(".{}{}", Purpose::Service.code(), encoded));
        }

        Ok(format!("did:peer:2{}", chain.join("")))
    }

    // ---------------------------------------------------------------------------
    // Expanding did:peer addresses
    // ---------------------------------------------------------------------------

    /// Expands a `did:peer:2` address into a DID document.
    ///
    /// Verification-method ids carry the public multikey as fragment, so
    /// that secrets registered under `<did>#<multikey>` line up with what
    /// the document advertises.
    pub fn expand(&self, did: &str) -> Result<Document, DidPeerError> {
        if !did.starts_with("did:peer:") {
            return Err(DidPeerError::MethodNotSupported);
        }

        if !DID_PEER_2_REGEX.is_match(did) {
            return Err(DidPeerError::MalformedPeerDid);
        }

        let chain = did.strip_prefix("did:peer:2.").unwrap();
        let chain: Vec<(Purpose, &str)> = chain
            .split('.')
            .map(|e| {
                let code = e.chars().next().expect("split never yields empty segments here");
                (
                    Purpose::from_code(&code).expect("invalid purpose prefix bypasses regex check"),
                    &e[1..],
                )
            })
            .collect();

        let context = json!([
            "https://www.w3.org/ns/did/v1",
            match self.key_format {
                PublicKeyFormat::Multikey => "https://w3id.org/security/multikey/v1",
                PublicKeyFormat::Jwk => "https://w3id.org/security/suites/jws-2020/v1",
            },
        ]);

        // Resolve verification methods

        let mut authentication = vec![];
        let mut key_agreement = vec![];
        let mut methods: Vec<VerificationMethod> = vec![];

        let key_chain = chain.iter().filter(|(purpose, _)| purpose != &Purpose::Service);

        for (purpose, multikey) in key_chain {
            let id = format!("#{multikey}");

            match purpose {
                Purpose::Encryption => key_agreement.push(VerificationMethodType::Reference(id.clone())),
                Purpose::Verification => authentication.push(VerificationMethodType::Reference(id.clone())),
                Purpose::Service => unreachable!(),
            }

            methods.push(VerificationMethod {
                id,
                key_type: String::from(match self.key_format {
                    PublicKeyFormat::Multikey => "Multikey",
                    PublicKeyFormat::Jwk => "JsonWebKey2020",
                }),
                controller: did.to_string(),
                public_key: Some(match self.key_format {
                    PublicKeyFormat::Multikey => KeyFormat::Multibase(multikey.to_string()),
                    PublicKeyFormat::Jwk => {
                        let (alg, key) =
                            decode_multikey(multikey).map_err(|_| DidPeerError::MalformedPeerDid)?;
                        KeyFormat::Jwk(Box::new(
                            alg.build_jwk(&key).map_err(|_| DidPeerError::KeyMaterialError)?,
                        ))
                    }
                }),
            });
        }

        // Resolve services

        let service_chain = chain
            .iter()
            .filter_map(|(purpose, encoded)| (purpose == &Purpose::Service).then_some(encoded));

        let mut services: Vec<Service> = vec![];

        for (index, encoded_service) in service_chain.enumerate() {
            let decoded_bytes = Base64Url
                .decode(encoded_service)
                .map_err(|_| DidPeerError::DidParseError)?;
            let decoded =
                String::from_utf8(decoded_bytes).map_err(|_| DidPeerError::DidParseError)?;

            let mut service = reverse_abbreviate_service(&decoded)?;
            service.id = if index == 0 {
                String::from("#service")
            } else {
                format!("#service-{index}")
            };

            services.push(service);
        }

        Ok(Document {
            context: Some(context),
            id: did.to_string(),
            also_known_as: None,
            verification_method: Some(methods),
            authentication: (!authentication.is_empty()).then_some(authentication),
            assertion_method: None,
            key_agreement: (!key_agreement.is_empty()).then_some(key_agreement),
            service: (!services.is_empty()).then_some(services),
        })
    }
}

fn abbreviate_service(service: &Service) -> Result<String, DidPeerError> {
    if service.service_type != DIDCOMM_MESSAGING_SERVICE_TYPE {
        return Err(DidPeerError::UnexpectedPurpose);
    }

    let compact = CompactService {
        t: String::from("dm"),
        s: CompactServiceEndpoint {
            uri: service.service_endpoint.uri.clone(),
            a: service
                .service_endpoint
                .accept
                .clone()
                .unwrap_or_else(|| vec![String::from("didcomm/v2")]),
            r: service.service_endpoint.routing_keys.clone(),
        },
    };

    Ok(serde_json::to_string(&compact)?)
}

fn reverse_abbreviate_service(decoded: &str) -> Result<Service, DidPeerError> {
    let compact: CompactService = serde_json::from_str(decoded)?;

    if compact.t != "dm" {
        return Err(DidPeerError::DidParseError);
    }

    Ok(Service {
        id: String::new(),
        service_type: String::from(DIDCOMM_MESSAGING_SERVICE_TYPE),
        service_endpoint: ServiceEndpoint {
            uri: compact.s.uri,
            accept: Some(compact.s.a),
            routing_keys: compact.s.r,
        },
    })
}
