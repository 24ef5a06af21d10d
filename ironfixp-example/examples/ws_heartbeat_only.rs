//! WebSocket Heartbeat-Only Client Example
//!
//! Logs in and keeps the session alive. Every application message is logged
//! and otherwise ignored.

use async_trait::async_trait;
use ironfixp::prelude::*;
use serde_json::Value;
use tracing::info;

mod common;
use common::{DEFAULT_WS_URL, init_logging, load_config, run_until_ctrl_c};

struct HeartbeatOnly;

#[async_trait]
impl Application<Value> for HeartbeatOnly {
    async fn on_established(&self, ctx: &SessionContext) -> Result<Vec<Value>, HandlerError> {
        info!(session_id = ctx.session_id(), attempt = ctx.attempt(), "logged in");
        Ok(Vec::new())
    }

    async fn on_message(
        &self,
        _ctx: &SessionContext,
        msg_type: &str,
        message: Value,
    ) -> Result<Vec<Value>, HandlerError> {
        info!(msg_type, %message, "application message");
        Ok(Vec::new())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = load_config(DEFAULT_WS_URL)?;
    info!(endpoint = %config.endpoint, "connecting");

    let handle = EngineBuilder::new()
        .with_config(config)
        .with_application(HeartbeatOnly)
        .build()?
        .spawn();

    run_until_ctrl_c(handle).await
}
