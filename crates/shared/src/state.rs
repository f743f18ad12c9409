use cloud_bridge::EventPublisher;
use did_utils::didcore::Document;
use keystore::Keystore;
use std::{fmt, str::FromStr, sync::Arc};

use crate::{
    repository::AppStateRepository,
    utils::resolvers::{LocalDIDResolver, LocalSecretsResolver},
};

/// How cloud-to-device forwards leave the connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardProtocol {
    Http,
    Nats,
}

impl ForwardProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForwardProtocol::Http => "http",
            ForwardProtocol::Nats => "nats",
        }
    }
}

impl fmt::Display for ForwardProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForwardProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(ForwardProtocol::Http),
            "nats" => Ok(ForwardProtocol::Nats),
            "hybrid" => Err("selected mode hybrid not yet supported".to_string()),
            other => Err(format!(
                "unknown cloud forwarding type {other}. Select one of these types: http or nats"
            )),
        }
    }
}

/// The slice of configuration the mediation core needs, threaded in
/// explicitly at construction.
#[derive(Clone, Debug)]
pub struct MediatorConfig {
    /// Externally advertised base URL, also the connector's own service
    /// endpoint.
    pub public_url: String,
    /// Human label embedded in out-of-band invitations.
    pub label: String,
    /// Invitation JWT lifetime in minutes.
    pub token_expiration_minutes: i64,
    /// Whether responses are authcrypt-packed instead of plain.
    pub is_message_encrypted: bool,
    /// Universal resolver base URL.
    pub resolver_url: String,
    pub forward_protocol: ForwardProtocol,
    /// Bus connection URL, also the `source` of emitted cloud events.
    pub bus_url: String,
    /// Base bus topic; `<bus_topic>-invitation` carries grant notifications.
    pub bus_topic: String,
}

/// Aggregator handed to every handler: configuration, the connector's
/// identity, resolver callbacks, persistence and the event bus.
#[derive(Clone)]
pub struct AppState {
    pub config: MediatorConfig,
    // The connector's own DID document
    pub diddoc: Document,
    // DIDComm resolvers
    pub did_resolver: LocalDIDResolver,
    pub secrets_resolver: LocalSecretsResolver,
    // Key material
    pub keystore: Keystore,
    // Persistence layer
    pub repository: AppStateRepository,
    // Cloud-event publisher
    pub publisher: Arc<dyn EventPublisher>,
}

impl AppState {
    pub fn from(
        config: MediatorConfig,
        diddoc: Document,
        keystore: Keystore,
        repository: AppStateRepository,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let did_resolver = LocalDIDResolver::new(&diddoc, &config.resolver_url);
        let secrets_resolver = LocalSecretsResolver::new(keystore.clone());

        Self {
            config,
            diddoc,
            did_resolver,
            secrets_resolver,
            keystore,
            repository,
            publisher,
        }
    }

    pub fn mediator_did(&self) -> &str {
        &self.diddoc.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_protocol_parsing() {
        assert_eq!("http".parse::<ForwardProtocol>().unwrap(), ForwardProtocol::Http);
        assert_eq!("NATS".parse::<ForwardProtocol>().unwrap(), ForwardProtocol::Nats);

        assert!("hybrid".parse::<ForwardProtocol>().is_err());
        assert!("carrier-pigeon".parse::<ForwardProtocol>().is_err());
    }
}
