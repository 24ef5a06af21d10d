//! TCP Get-Quotes Client Example
//!
//! The same flow as `ws_get_quotes`, with FIX tag=value messages over TCP.

use async_trait::async_trait;
use ironfixp::prelude::*;
use tracing::{info, warn};

mod common;
use common::{DEFAULT_TCP_URL, init_logging, load_config, run_until_ctrl_c, sending_time};

const SENDING_TIME: u32 = 52;
const SECURITY_ID_SOURCE: u32 = 22;
const SECURITY_ID: u32 = 48;
const QUOTE_REQ_ID: u32 = 131;
const BID_PX: u32 = 132;
const OFFER_PX: u32 = 133;
const NO_RELATED_SYM: u32 = 146;
const SUBSCRIPTION_REQUEST_TYPE: u32 = 263;
const SECURITY_REQ_ID: u32 = 320;
const SECURITY_LIST_REQUEST_TYPE: u32 = 559;

const SECURITY_LIST_REQUEST: &str = "x";
const SECURITY_LIST: &str = "y";
const QUOTE_REQUEST: &str = "R";
const QUOTE: &str = "S";

struct GetQuotes;

impl GetQuotes {
    fn security_list_request() -> FieldMessage {
        FieldMessage::new(SECURITY_LIST_REQUEST)
            .with_field(SENDING_TIME, sending_time())
            .with_field(SECURITY_REQ_ID, "example-secList-1")
            .with_field(SECURITY_LIST_REQUEST_TYPE, "4")
            .with_field(SUBSCRIPTION_REQUEST_TYPE, "0")
    }

    fn quote_request(security_id: &str, source: &str) -> FieldMessage {
        FieldMessage::new(QUOTE_REQUEST)
            .with_field(SENDING_TIME, sending_time())
            .with_field(QUOTE_REQ_ID, security_id)
            .with_field(NO_RELATED_SYM, "1")
            .with_field(SECURITY_ID, security_id)
            .with_field(SECURITY_ID_SOURCE, source)
            .with_field(SUBSCRIPTION_REQUEST_TYPE, "0")
    }
}

#[async_trait]
impl Application<FieldMessage> for GetQuotes {
    async fn on_established(&self, _ctx: &SessionContext) -> Result<Vec<FieldMessage>, HandlerError> {
        info!("logged in, requesting security list");
        Ok(vec![Self::security_list_request()])
    }

    async fn on_message(
        &self,
        _ctx: &SessionContext,
        msg_type: &str,
        message: FieldMessage,
    ) -> Result<Vec<FieldMessage>, HandlerError> {
        match msg_type {
            SECURITY_LIST => {
                let declared: usize = message
                    .parse(NO_RELATED_SYM)
                    .map_err(|e| HandlerError::new(e.to_string()))?
                    .unwrap_or(0);
                let requests: Vec<_> = message
                    .get_all(SECURITY_ID)
                    .zip(message.get_all(SECURITY_ID_SOURCE))
                    .map(|(id, source)| Self::quote_request(id, source))
                    .collect();
                if requests.len() != declared {
                    warn!(declared, found = requests.len(), "security list group count mismatch");
                }
                info!(securities = requests.len(), "security list received");
                Ok(requests)
            }
            QUOTE => {
                info!(
                    security_id = message.get(QUOTE_REQ_ID).unwrap_or_default(),
                    bid_px = message.get(BID_PX).unwrap_or_default(),
                    offer_px = message.get(OFFER_PX).unwrap_or_default(),
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
    let config = load_config(DEFAULT_TCP_URL)?;
    info!(endpoint = %config.endpoint, "connecting");

    let handle = EngineBuilder::new()
        .with_config(config)
        .with_codec(TagValueCodec::default())
        .with_application(GetQuotes)
        .build()?
        .spawn();

    run_until_ctrl_c(handle).await
}
