//! Common utilities shared across examples.

#![allow(dead_code)]

use ironfixp::core::ConfigError;
use ironfixp::engine::InitiatorHandle;
use ironfixp::session::SessionConfig;
use ironfixp::session::config::{ENV_PASSWORD, ENV_URL, ENV_USERNAME};
use std::env;
use tracing::info;

/// Default WebSocket endpoint, served by the `mock_acceptor` example.
pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:9876/fixp";

/// Default TCP endpoint, served by the `mock_acceptor` example.
pub const DEFAULT_TCP_URL: &str = "tcp://127.0.0.1:9877";

/// Credentials accepted by the mock acceptor.
pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo";

/// Initializes logging for examples.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

/// Loads the session configuration from `FIXP_*` variables.
///
/// Endpoint and credentials fall back to the mock acceptor's.
pub fn load_config(default_url: &str) -> Result<SessionConfig, ConfigError> {
    SessionConfig::from_lookup(|key| {
        env::var(key).ok().or_else(|| match key {
            ENV_URL => Some(default_url.to_string()),
            ENV_USERNAME => Some(DEMO_USERNAME.to_string()),
            ENV_PASSWORD => Some(DEMO_PASSWORD.to_string()),
            _ => None,
        })
    })
}

/// Runs until Ctrl-C, then shuts the initiator down.
pub async fn run_until_ctrl_c(handle: InitiatorHandle) -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    handle.shutdown().await;
    Ok(())
}

/// Current UTC time as a FIX `SendingTime` value.
pub fn sending_time() -> String {
    chrono::Utc::now().format("%Y%m%d-%H:%M:%S%.3f").to_string()
}
