//! WebSocket Market Order Client Example
//!
//! Sends one fill-or-kill market order on every successful login and logs
//! the resulting `ExecutionReport`s. Set `FIXP_ACCOUNT` to the trading account.

use async_trait::async_trait;
use ironfixp::prelude::*;
use serde_json::{Value, json};
use tracing::{info, warn};

mod common;
use common::{DEFAULT_WS_URL, init_logging, load_config, run_until_ctrl_c, sending_time};

const SECURITY_ID: &str = "CS.D.GBPUSD.CZD.IP";
const CURRENCY: &str = "USD";

struct MarketOrder;

impl MarketOrder {
    fn new_order_single(ctx: &SessionContext) -> Value {
        let now = sending_time();
        json!({
            "MsgType": "NewOrderSingle",
            "ApplVerID": "FIX50SP2",
            "SendingTime": now,
            "ClOrdID": format!("buy-1#{}", chrono::Utc::now().timestamp_millis()),
            "Side": "Buy",
            "SecurityID": SECURITY_ID,
            "SecurityIDSource": "MarketplaceAssignedIdentifier",
            "Currency": CURRENCY,
            "OrderQty": 1,
            "OrdType": "Market",
            "TimeInForce": "FillOrKill",
            "TransactTime": now,
            "Account": ctx.account(),
        })
    }
}

#[async_trait]
impl Application<Value> for MarketOrder {
    async fn on_established(&self, ctx: &SessionContext) -> Result<Vec<Value>, HandlerError> {
        if ctx.account().is_none() {
            warn!("FIXP_ACCOUNT is not set; the order will likely be rejected");
        }
        info!(security_id = SECURITY_ID, "logged in, sending market order");
        Ok(vec![Self::new_order_single(ctx)])
    }

    async fn on_message(
        &self,
        _ctx: &SessionContext,
        msg_type: &str,
        message: Value,
    ) -> Result<Vec<Value>, HandlerError> {
        match msg_type {
            "ExecutionReport" => {
                info!(
                    exec_type = %message["ExecType"],
                    ord_status = %message["OrdStatus"],
                    cl_ord_id = %message["ClOrdID"],
                    "got execution report"
                );
            }
            other => warn!(msg_type = other, "received unsupported message"),
        }
        Ok(Vec::new())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = load_config(DEFAULT_WS_URL)?;
    info!(endpoint = %config.endpoint, account = ?config.account, "connecting");

    let handle = EngineBuilder::new()
        .with_config(config)
        .with_application(MarketOrder)
        .build()?
        .spawn();

    run_until_ctrl_c(handle).await
}
