//! WebSocket Get-Quotes Client Example
//!
//! Requests the security list once established, sends one snapshot
//! `QuoteRequest` per security, and logs each `Quote`.

use async_trait::async_trait;
use ironfixp::prelude::*;
use serde_json::{Value, json};
use tracing::{info, warn};

mod common;
use common::{DEFAULT_WS_URL, init_logging, load_config, run_until_ctrl_c, sending_time};

struct GetQuotes;

impl GetQuotes {
    fn security_list_request() -> Value {
        json!({
            "MsgType": "SecurityListRequest",
            "ApplVerID": "FIX50SP2",
            "SendingTime": sending_time(),
            "SecurityReqID": "example-secList-1",
            "SecurityListRequestType": "AllSecurities",
            "SubscriptionRequestType": "Snapshot",
        })
    }

    /// The security id doubles as the quote request id, so quotes map back without a lookup.
    fn quote_request(entry: &Value) -> Option<Value> {
        let security_id = entry.get("SecurityID")?.as_str()?;
        Some(json!({
            "MsgType": "QuoteRequest",
            "ApplVerID": "FIX50SP2",
            "SendingTime": sending_time(),
            "QuoteReqID": security_id,
            "SubscriptionRequestType": "Snapshot",
            "QuotReqGrp": [{
                "SecurityID": security_id,
                "SecurityIDSource": entry.get("SecurityIDSource").cloned().unwrap_or(Value::Null),
            }],
        }))
    }
}

#[async_trait]
impl Application<Value> for GetQuotes {
    async fn on_established(&self, _ctx: &SessionContext) -> Result<Vec<Value>, HandlerError> {
        info!("logged in, requesting security list");
        Ok(vec![Self::security_list_request()])
    }

    async fn on_message(
        &self,
        _ctx: &SessionContext,
        msg_type: &str,
        message: Value,
    ) -> Result<Vec<Value>, HandlerError> {
        match msg_type {
            "SecurityList" => {
                let entries = message
                    .get("SecListGrp")
                    .and_then(Value::as_array)
                    .ok_or_else(|| HandlerError::new("SecurityList without SecListGrp"))?;
                info!(securities = entries.len(), "security list received");
                Ok(entries.iter().filter_map(Self::quote_request).collect())
            }
            "Quote" => {
                info!(
                    security_id = %message["QuoteReqID"],
                    bid_id = %message["BidID"],
                    bid_px = %message["BidPx"],
                    offer_id = %message["OfferID"],
                    offer_px = %message["OfferPx"],
                    "got quote"
                );
                Ok(Vec::new())
            }
            other => {
                warn!(msg_type = other, "received unsupported message");
                Ok(Vec::new())
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = load_config(DEFAULT_WS_URL)?;
    info!(endpoint = %config.endpoint, "connecting");

    let handle = EngineBuilder::new()
        .with_config(config)
        .with_application(GetQuotes)
        .build()?
        .spawn();

    run_until_ctrl_c(handle).await
}
