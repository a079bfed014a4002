mod api;
mod bootstrap;
mod health;
mod responder;
mod router;
mod slack;
#[cfg(test)]
mod test_support;

use std::future::IntoFuture;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zarigani_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use zarigani_core::config::LogFormat::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Logging depends on the loaded config, so it comes first.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);

    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        slack_enabled = app.slack.is_some(),
        generator = app.config.generator.provider.as_str(),
        "zarigani-server listening"
    );

    let (stopping_tx, mut stopping_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, router::build(&app)).with_graceful_shutdown(async move {
        if let Err(error) = wait_for_shutdown().await {
            warn!(
                event_name = "system.server.signal_error",
                correlation_id = "shutdown",
                error = %error,
                "could not listen for shutdown signals, stopping"
            );
        }
        let _ = stopping_tx.send(true);
    });

    tokio::select! {
        result = server.into_future() => result?,
        _ = async {
            let _ = stopping_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(
                event_name = "system.server.drain_timeout",
                correlation_id = "shutdown",
                grace_secs = grace.as_secs(),
                "in-flight requests did not finish before the shutdown deadline"
            );
        }
    }

    info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "zarigani-server stopped"
    );
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "shutdown signal received, draining requests"
    );
    Ok(())
}
