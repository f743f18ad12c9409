pub mod config;
pub mod didgen;
pub mod web;

use axum::Router;
use cloud_bridge::NatsBridge;
use database::{InMemoryRepository, MongoRepository, Repository};
use eyre::{Result, WrapErr};
use keystore::Keystore;
use mongodb::Client;
use shared::{
    repository::{entity::MediatorDid, AppStateRepository},
    state::AppState,
};
use std::sync::Arc;

use config::Config;

/// Wires persistence, identity and the bus together and returns the
/// router plus the pieces main needs to run and shut down.
pub async fn app(config: &Config) -> Result<(Router, Arc<AppState>, Arc<NatsBridge>)> {
    // Persistence layer
    let (repository, keystore, identity_repository): (
        AppStateRepository,
        Keystore,
        Arc<dyn Repository<MediatorDid>>,
    ) = if config.database.in_memory {
        tracing::warn!("using ephemeral in-memory storage, state is lost on exit");
        (
            AppStateRepository::in_memory(),
            Keystore::in_memory(),
            Arc::new(InMemoryRepository::new()),
        )
    } else {
        let client = Client::with_uri_str(config.mongo_connection_string())
            .await
            .wrap_err("failed to create database session")?;
        let db = client.database(&config.database.keyspace);
        (
            AppStateRepository::mongo(&db),
            Keystore::new(Arc::new(MongoRepository::from_db(&db, "secrets"))),
            Arc::new(MongoRepository::from_db(&db, "mediator_did")),
        )
    };

    // Mediator identity, created lazily at first boot
    let diddoc = didgen::init_mediator_did(&config.url, &keystore, &identity_repository)
        .await
        .wrap_err("failed to initialize mediator DID")?;
    tracing::info!(did = %diddoc.id, "mediator identity ready");

    // Event bus
    let bridge = Arc::new(
        NatsBridge::connect(
            &config.cloud_forwarding.nats.url,
            &config.cloud_forwarding.nats.queue_group,
        )
        .await
        .wrap_err("failed to connect to the event bus")?,
    );

    let state = Arc::new(AppState::from(
        config.mediator_config(),
        diddoc,
        keystore,
        repository,
        bridge.clone(),
    ));

    let router = web::routes(state.clone());

    Ok((router, state, bridge))
}
