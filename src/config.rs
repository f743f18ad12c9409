use eyre::{eyre, Result, WrapErr};
use shared::state::{ForwardProtocol, MediatorConfig};
use std::env;

const ENV_PREFIX: &str = "DIDCOMM_CONNECTOR";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub env: Environment,
    pub log_level: String,
    pub port: u16,
    pub url: String,
    pub label: String,
    /// Invitation JWT lifetime in minutes.
    pub token_expiration: i64,
    pub didcomm: DidcommConfig,
    pub cloud_forwarding: CloudForwardingConfig,
    pub database: DatabaseConfig,
}

#[derive(Clone, Debug)]
pub struct DidcommConfig {
    pub resolver_url: String,
    pub is_message_encrypted: bool,
}

#[derive(Clone, Debug)]
pub struct CloudForwardingConfig {
    pub protocol: ForwardProtocol,
    pub nats: NatsConfig,
}

#[derive(Clone, Debug)]
pub struct NatsConfig {
    pub url: String,
    pub topic: String,
    pub queue_group: String,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub in_memory: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub keyspace: String,
}

impl Config {
    /// Loads the configuration from the environment. Call after
    /// `dotenv_flow` so `.env` files are taken into account.
    pub fn load() -> Result<Self> {
        let env = match var("ENV").unwrap_or_else(|| "DEV".to_owned()).to_uppercase().as_str() {
            "PROD" => Environment::Prod,
            _ => Environment::Dev,
        };

        let protocol = var("CLOUD_FORWARDING_PROTOCOL")
            .unwrap_or_else(|| "nats".to_owned())
            .parse::<ForwardProtocol>()
            .map_err(|e| eyre!(e))?;

        Ok(Self {
            env,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_owned()),
            port: parse_var("PORT")?.unwrap_or(9090),
            url: var("URL").unwrap_or_else(|| "http://localhost:9090".to_owned()),
            label: var("LABEL").unwrap_or_else(|| "didcomm-connector".to_owned()),
            token_expiration: parse_var("TOKEN_EXPIRATION")?.unwrap_or(1),
            didcomm: DidcommConfig {
                resolver_url: var("DIDCOMM_RESOLVER_URL")
                    .ok_or_else(|| eyre!("{ENV_PREFIX}_DIDCOMM_RESOLVER_URL must be set"))?,
                is_message_encrypted: parse_var("DIDCOMM_IS_MESSAGE_ENCRYPTED")?.unwrap_or(false),
            },
            cloud_forwarding: CloudForwardingConfig {
                protocol,
                nats: NatsConfig {
                    url: var("CLOUD_FORWARDING_NATS_URL")
                        .unwrap_or_else(|| "nats://localhost:4222".to_owned()),
                    topic: var("CLOUD_FORWARDING_NATS_TOPIC")
                        .unwrap_or_else(|| "connector".to_owned()),
                    queue_group: var("CLOUD_FORWARDING_NATS_QUEUE_GROUP")
                        .unwrap_or_else(|| "connector".to_owned()),
                },
            },
            database: DatabaseConfig {
                in_memory: parse_var("DATABASE_IN_MEMORY")?.unwrap_or(false),
                host: var("DATABASE_HOST").unwrap_or_else(|| "localhost".to_owned()),
                port: parse_var("DATABASE_PORT")?.unwrap_or(27017),
                user: var("DATABASE_USER").unwrap_or_default(),
                password: var("DATABASE_PASSWORD").unwrap_or_default(),
                keyspace: var("DATABASE_KEYSPACE").unwrap_or_else(|| "didcomm_connector".to_owned()),
            },
        })
    }

    pub fn is_prod(&self) -> bool {
        self.env == Environment::Prod
    }

    /// The slice of configuration threaded into the state aggregator.
    pub fn mediator_config(&self) -> MediatorConfig {
        MediatorConfig {
            public_url: self.url.clone(),
            label: self.label.clone(),
            token_expiration_minutes: self.token_expiration,
            is_message_encrypted: self.didcomm.is_message_encrypted,
            resolver_url: self.didcomm.resolver_url.clone(),
            forward_protocol: self.cloud_forwarding.protocol,
            bus_url: self.cloud_forwarding.nats.url.clone(),
            bus_topic: self.cloud_forwarding.nats.topic.clone(),
        }
    }

    pub fn mongo_connection_string(&self) -> String {
        let DatabaseConfig {
            host, port, user, password, ..
        } = &self.database;

        if user.is_empty() {
            format!("mongodb://{host}:{port}")
        } else {
            format!("mongodb://{user}:{password}@{host}:{port}")
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{key}")).ok().filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    var(key)
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| eyre!("invalid value for {ENV_PREFIX}_{key}: {e}"))
        })
        .transpose()
}

/// Startup probe of the universal resolver; the process refuses to come up
/// against an unreachable resolver.
pub async fn check_resolver(resolver_url: &str) -> Result<()> {
    let query_url = format!("{}/1.0/testIdentifiers", resolver_url.trim_end_matches('/'));

    let response = reqwest::get(&query_url)
        .await
        .wrap_err("resolver not available")?;

    if !response.status().is_success() {
        return Err(eyre!("resolver not available"));
    }

    Ok(())
}
