//! Mock FIXP Acceptor Example
//!
//! A local peer for the client examples. Serves JSON over WebSocket on
//! 9876 and FIX tag=value over TCP on 9877, accepts the `demo` / `demo`
//! login, and answers security list, quote and order requests with canned
//! data.

use futures::{Sink, SinkExt, Stream, StreamExt, future::ready};
use ironfixp::core::{EstablishmentAck, EstablishmentReject, NegotiationReject, NegotiationResponse};
use ironfixp::prelude::*;
use ironfixp::transport::FrameCodec;
use serde_json::{Value, json};
use std::pin::pin;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

mod common;
use common::{DEMO_PASSWORD, DEMO_USERNAME, init_logging};

const WS_ADDR: &str = "127.0.0.1:9876";
const TCP_ADDR: &str = "127.0.0.1:9877";

const SECURITIES: [(&str, &str); 2] = [
    ("CS.D.GBPUSD.CZD.IP", "MarketplaceAssignedIdentifier"),
    ("CS.D.EURUSD.CZD.IP", "MarketplaceAssignedIdentifier"),
];

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let ws = TcpListener::bind(WS_ADDR).await?;
    let tcp = TcpListener::bind(TCP_ADDR).await?;
    info!(ws = WS_ADDR, tcp = TCP_ADDR, "mock acceptor listening");

    loop {
        tokio::select! {
            res = ws.accept() => {
                let (stream, addr) = res?;
                tokio::spawn(async move {
                    if let Err(e) = serve_ws(stream).await {
                        warn!(%addr, error = %e, "websocket session failed");
                    }
                });
            }
            res = tcp.accept() => {
                let (stream, addr) = res?;
                tokio::spawn(async move {
                    if let Err(e) = serve_tcp(stream).await {
                        warn!(%addr, error = %e, "tcp session failed");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("mock acceptor stopped");
    Ok(())
}

async fn serve_ws(stream: TcpStream) -> anyhow::Result<()> {
    let (sink, stream) = tokio_tungstenite::accept_async(stream).await?.split();
    let sink = sink.with(|frame: Frame| {
        ready(Ok::<_, tokio_tungstenite::tungstenite::Error>(match frame {
            Frame::Text(text) => Message::text(text),
            Frame::Binary(bytes) => Message::binary(bytes),
        }))
    });
    let stream = stream
        .take_while(|msg| ready(matches!(msg, Ok(m) if !m.is_close())))
        .filter_map(|msg| {
            ready(match msg {
                Ok(Message::Text(text)) => Some(Frame::Text(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => Some(Frame::Binary(bytes)),
                _ => None,
            })
        });
    serve(JsonCodec::new(), json_reply, sink, stream).await
}

async fn serve_tcp(stream: TcpStream) -> anyhow::Result<()> {
    stream.set_nodelay(true)?;
    let (sink, stream) = Framed::new(stream, FrameCodec::new()).split();
    let sink = sink.with(|frame: Frame| ready(Ok::<_, TransportError>(frame.into_bytes())));
    let stream = stream
        .take_while(|res| ready(res.is_ok()))
        .filter_map(|res| ready(res.ok().map(Frame::Binary)));
    serve(TagValueCodec::default(), tagvalue_reply, sink, stream).await
}

async fn serve<C, Si, St>(
    codec: C,
    reply: fn(&str, C::Message) -> Vec<C::Message>,
    sink: Si,
    stream: St,
) -> anyhow::Result<()>
where
    C: MessageCodec,
    Si: Sink<Frame>,
    Si::Error: std::error::Error + Send + Sync + 'static,
    St: Stream<Item = Frame>,
{
    let mut sink = pin!(sink);
    let mut stream = pin!(stream);
    let mut session_id: Option<String> = None;

    while let Some(frame) = stream.next().await {
        let outbound: Vec<Outbound<C::Message>> = match codec.decode(&frame) {
            Ok(InboundEnvelope::Admin(admin)) => admin_reply(admin, &mut session_id)
                .map(Outbound::Admin)
                .into_iter()
                .collect(),
            Ok(InboundEnvelope::Application { msg_type, message }) => {
                info!(%msg_type, "application message");
                reply(&msg_type, message)
                    .into_iter()
                    .map(Outbound::Application)
                    .collect()
            }
            Ok(InboundEnvelope::Unspecified(_)) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "undecodable frame");
                Vec::new()
            }
        };

        for message in &outbound {
            sink.send(codec.encode(message)?).await?;
        }
        let rejected = outbound.iter().any(|m| {
            matches!(
                m,
                Outbound::Admin(AdminMessage::NegotiationReject(_) | AdminMessage::EstablishmentReject(_))
            )
        });
        if rejected {
            break;
        }
    }

    sink.close().await?;
    info!(session_id = session_id.as_deref().unwrap_or("-"), "connection closed");
    Ok(())
}

fn admin_reply(admin: AdminMessage, session_id: &mut Option<String>) -> Option<AdminMessage> {
    match admin {
        AdminMessage::Negotiate(negotiate) => {
            let expected = format!("{DEMO_USERNAME}:{DEMO_PASSWORD}");
            if negotiate.credentials.expose_token() != expected {
                warn!(session_key = %negotiate.session_key, "rejecting credentials");
                return Some(AdminMessage::NegotiationReject(NegotiationReject {
                    session_id: None,
                    reason: Some("invalid credentials".to_string()),
                }));
            }
            let id = format!("mock-{}", NEXT_SESSION.fetch_add(1, Ordering::Relaxed));
            info!(session_key = %negotiate.session_key, session_id = %id, "negotiated");
            *session_id = Some(id.clone());
            Some(AdminMessage::NegotiationResponse(NegotiationResponse {
                session_id: Some(id),
                request_timestamp: Some(negotiate.timestamp),
                server_flow: Some(FlowType::Unsequenced.to_string()),
            }))
        }
        AdminMessage::Establish(establish) => {
            if session_id.as_deref() != Some(establish.session_id.as_str()) {
                return Some(AdminMessage::EstablishmentReject(EstablishmentReject {
                    session_id: Some(establish.session_id),
                    reason: Some("unknown session".to_string()),
                }));
            }
            info!(keepalive_ms = establish.keepalive_interval, "established");
            Some(AdminMessage::EstablishmentAck(EstablishmentAck {
                session_id: Some(establish.session_id),
                keepalive_interval: Some(establish.keepalive_interval),
            }))
        }
        AdminMessage::UnsequencedHeartbeat => {
            debug!("heartbeat");
            None
        }
        other => {
            warn!(message = %other.kind(), "ignoring administrative message");
            None
        }
    }
}

fn json_reply(msg_type: &str, message: Value) -> Vec<Value> {
    match msg_type {
        "SecurityListRequest" => {
            let entries: Vec<Value> = SECURITIES
                .iter()
                .map(|(id, source)| json!({"SecurityID": id, "SecurityIDSource": source}))
                .collect();
            vec![json!({
                "MsgType": "SecurityList",
                "SecurityReqID": message["SecurityReqID"],
                "SecListGrp": entries,
            })]
        }
        "QuoteRequest" => vec![json!({
            "MsgType": "Quote",
            "QuoteReqID": message["QuoteReqID"],
            "BidID": "bid-1",
            "BidPx": 1.2710,
            "OfferID": "offer-1",
            "OfferPx": 1.2712,
        })],
        "NewOrderSingle" => vec![json!({
            "MsgType": "ExecutionReport",
            "ClOrdID": message["ClOrdID"],
            "ExecType": "Trade",
            "OrdStatus": "Filled",
            "SecurityID": message["SecurityID"],
        })],
        _ => Vec::new(),
    }
}

fn tagvalue_reply(msg_type: &str, message: FieldMessage) -> Vec<FieldMessage> {
    match msg_type {
        "x" => {
            let mut list = FieldMessage::new("y")
                .with_field(320, message.get(320).unwrap_or_default())
                .with_field(146, SECURITIES.len().to_string());
            for (id, source) in SECURITIES {
                list.push(48, id);
                list.push(22, source);
            }
            vec![list]
        }
        "R" => vec![
            FieldMessage::new("S")
                .with_field(131, message.get(131).unwrap_or_default())
                .with_field(132, "1.2710")
                .with_field(133, "1.2712"),
        ],
        _ => Vec::new(),
    }
}
