#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use crate::{
        repository::AppStateRepository,
        state::{AppState, ForwardProtocol, MediatorConfig},
        utils::resolvers::LocalSecretsResolver,
    };
    use cloud_bridge::MockPublisher;
    use did_utils::{
        crypto::{Ed25519KeyPair, Generate, PublicKeyFormat, ToMultikey, X25519KeyPair},
        didcore::{Service, ServiceEndpoint, DIDCOMM_MESSAGING_SERVICE_TYPE},
        jwk::Jwk,
        methods::{DidPeer, Purpose, PurposedKey},
    };
    use didcomm::{
        error::Error as DidcommError, secrets::SecretsResolver, Message, PackEncryptedOptions,
        UnpackOptions,
    };
    use keystore::Keystore;
    use std::sync::Arc;

    pub fn setup() -> Arc<AppState> {
        let (did, keystore) = _mediator_identity();
        let diddoc = DidPeer::with_format(PublicKeyFormat::Jwk).expand(&did).unwrap();

        let config = MediatorConfig {
            public_url: String::from("http://alice-mediator.com"),
            label: String::from("alice-mediator"),
            token_expiration_minutes: 5,
            is_message_encrypted: true,
            resolver_url: String::from("http://uniresolver.example.local"),
            forward_protocol: ForwardProtocol::Nats,
            bus_url: String::from("nats://localhost:4222"),
            bus_topic: String::from("connector"),
        };

        Arc::new(AppState::from(
            config,
            diddoc,
            keystore,
            AppStateRepository::in_memory(),
            Arc::new(MockPublisher::new()),
        ))
    }

    fn _mediator_identity() -> (String, Keystore) {
        let auth_keys = Ed25519KeyPair::new_with_seed(b"AliceMediatorAuthKeySeed0000000b").unwrap();
        let agreem_keys =
            X25519KeyPair::new_with_seed(b"AliceMediatorAgreemKeySeed00000b").unwrap();

        let (did, secrets) = _peer_did_with_secrets(
            auth_keys,
            agreem_keys,
            vec![Service {
                id: String::from("#service"),
                service_type: String::from(DIDCOMM_MESSAGING_SERVICE_TYPE),
                service_endpoint: ServiceEndpoint {
                    uri: String::from("http://alice-mediator.com"),
                    accept: Some(vec![String::from("didcomm/v2")]),
                    routing_keys: vec![],
                },
            }],
        );

        (did, Keystore::with_mock_configs(secrets))
    }

    fn _peer_did_with_secrets(
        auth_keys: Ed25519KeyPair,
        agreem_keys: X25519KeyPair,
        services: Vec<Service>,
    ) -> (String, Vec<(String, Jwk)>) {
        let auth_multikey = auth_keys.to_multikey();
        let agreem_multikey = agreem_keys.to_multikey();

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

        let did = DidPeer::create_did_peer_2(&keys, &services).unwrap();

        let secrets = vec![
            (format!("{did}#{agreem_multikey}"), agreem_keys.try_into().unwrap()),
            (format!("{did}#{auth_multikey}"), auth_keys.try_into().unwrap()),
        ];

        (did, secrets)
    }

    pub fn _mediator_did(state: &AppState) -> String {
        state.diddoc.id.clone()
    }

    pub fn _edge_did() -> String {
        _edge_identity().0
    }

    pub fn _edge_secrets_resolver() -> impl SecretsResolver {
        let (_, secrets) = _edge_identity();
        LocalSecretsResolver::new(Keystore::with_mock_configs(secrets))
    }

    fn _edge_identity() -> (String, Vec<(String, Jwk)>) {
        let auth_keys = Ed25519KeyPair::new_with_seed(b"BobEdgeDeviceAuthKeySeed0000000b").unwrap();
        let agreem_keys =
            X25519KeyPair::new_with_seed(b"BobEdgeDeviceAgreemKeySeed00000b").unwrap();

        // a device's peer DID advertises no endpoint to send to
        _peer_did_with_secrets(auth_keys, agreem_keys, vec![])
    }

    pub async fn _edge_pack_message(
        state: &AppState,
        msg: &Message,
        from: Option<String>,
        to: String,
    ) -> Result<String, DidcommError> {
        let (packed, _) = msg
            .pack_encrypted(
                &to,
                from.as_deref(),
                None,
                &state.did_resolver,
                &_edge_secrets_resolver(),
                &PackEncryptedOptions::default(),
            )
            .await?;

        Ok(packed)
    }

    pub async fn _edge_unpack_message(
        state: &AppState,
        msg: &str,
    ) -> Result<Message, DidcommError> {
        let (unpacked, _) = Message::unpack(
            msg,
            &state.did_resolver,
            &_edge_secrets_resolver(),
            &UnpackOptions::default(),
        )
        .await?;

        Ok(unpacked)
    }
}
