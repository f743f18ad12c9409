use didcomm_connector::{
    app,
    config::{check_resolver, Config},
};
use eyre::{Result, WrapErr};
use shared::state::ForwardProtocol;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> Result<()> {
    // Load dotenv-flow variables
    dotenv_flow::dotenv_flow().ok();

    let config = Config::load()?;

    // Enable logging
    config_tracing(&config)?;

    // The universal resolver must be reachable before we accept traffic
    check_resolver(&config.didcomm.resolver_url).await?;
    tracing::info!("resolver available");

    let (router, state, bridge) = app(&config).await?;

    // The bus subscriber feeds cloud events into the forward pipeline
    let listener_task = match config.cloud_forwarding.protocol {
        ForwardProtocol::Nats => Some(tokio::spawn(forward::listen_for_cloud_events(
            Arc::clone(&state),
            Arc::clone(&bridge),
        ))),
        ForwardProtocol::Http => None,
    };

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .wrap_err("failed to parse address")?;
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err("failed to bind address")?;

    tracing::info!("listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("failed to start server")?;

    if let Some(task) = listener_task {
        task.abort();
    }

    tracing::info!("server exiting");
    Ok(())
}

/// Completes on SIGINT/SIGTERM. In-flight handlers then get up to five
/// seconds to drain before the process exits regardless.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down server in at most 5 seconds");

    tokio::spawn(async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        tracing::warn!("drain deadline reached");
        std::process::exit(0);
    });
}

fn config_tracing(config: &Config) -> Result<()> {
    use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.is_prod() {
        // JSON logs, duplicated into a timestamped file
        std::fs::create_dir_all("logs").wrap_err("failed to create log directory")?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(format!("logs/log_{}.log", chrono::Utc::now().timestamp()))
            .wrap_err("failed to open log file")?;

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .with(fmt::layer().json().with_ansi(false).with_writer(Arc::new(file)))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    Ok(())
}
