/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! JSON codec.
//!
//! Each frame is one JSON object. Administrative messages carry their type in
//! `MessageType`; application messages in `MsgType`. Application payloads are
//! kept as [`serde_json::Value`] so handlers can read any field.

use crate::MessageCodec;
use ironfixp_core::{AdminKind, AdminMessage, DecodeError, EncodeError, Frame, InboundEnvelope, Outbound};
use serde_json::Value;

/// Field holding the administrative discriminator.
pub const ADMIN_TYPE_FIELD: &str = "MessageType";

/// Field holding the application discriminator.
pub const APP_TYPE_FIELD: &str = "MsgType";

/// JSON codec over text frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Creates a new JSON codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MessageCodec for JsonCodec {
    type Message = Value;

    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, message: &Outbound<Value>) -> Result<Frame, EncodeError> {
        let text = match message {
            Outbound::Admin(admin) => serde_json::to_string(admin),
            Outbound::Application(value) => serde_json::to_string(value),
        }
        .map_err(|e| EncodeError::Serialization(e.to_string()))?;
        Ok(Frame::Text(text))
    }

    fn decode(&self, frame: &Frame) -> Result<InboundEnvelope<Value>, DecodeError> {
        let value: Value = serde_json::from_slice(frame.as_bytes())
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(DecodeError::Malformed("expected a JSON object".to_string()));
        }

        match value.get(ADMIN_TYPE_FIELD) {
            Some(Value::String(name)) => {
                let Some(kind) = AdminKind::from_name(name) else {
                    let msg_type = name.clone();
                    return Ok(InboundEnvelope::Application {
                        msg_type,
                        message: value,
                    });
                };
                let admin: AdminMessage = serde_json::from_value(value).map_err(|e| {
                    DecodeError::InvalidAdminMessage {
                        kind: kind.as_str(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(InboundEnvelope::Admin(admin))
            }
            Some(_) => Err(DecodeError::InvalidFieldValue {
                field: ADMIN_TYPE_FIELD.to_string(),
                reason: "must be a string".to_string(),
            }),
            None => match value.get(APP_TYPE_FIELD).and_then(Value::as_str) {
                Some(msg_type) if !msg_type.is_empty() => {
                    let msg_type = msg_type.to_string();
                    Ok(InboundEnvelope::Application {
                        msg_type,
                        message: value,
                    })
                }
                _ => Ok(InboundEnvelope::Unspecified(value)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironfixp_core::{Credentials, Discriminator, Establish, FlowType, Negotiate, SessionKey, Timestamp};
    use serde_json::json;

    fn decode(value: Value) -> Result<InboundEnvelope<Value>, DecodeError> {
        JsonCodec.decode(&Frame::Text(value.to_string()))
    }

    #[test]
    fn test_decode_admin() {
        let envelope = decode(json!({
            "MessageType": "NegotiationResponse",
            "SessionId": "S-1"
        }))
        .unwrap();

        match envelope {
            InboundEnvelope::Admin(AdminMessage::NegotiationResponse(resp)) => {
                assert_eq!(resp.session_id.as_deref(), Some("S-1"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_heartbeat() {
        let envelope = decode(json!({"MessageType": "UnsequencedHeartbeat"})).unwrap();
        assert_eq!(
            envelope.discriminator(),
            Discriminator::Admin(AdminKind::UnsequencedHeartbeat)
        );
    }

    #[test]
    fn test_decode_application_by_msg_type() {
        let envelope = decode(json!({"MsgType": "ExecutionReport", "OrdStatus": "2"})).unwrap();
        match envelope {
            InboundEnvelope::Application { msg_type, message } => {
                assert_eq!(msg_type, "ExecutionReport");
                assert_eq!(message["OrdStatus"], "2");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_message_type_is_application() {
        let envelope = decode(json!({"MessageType": "Sequence", "NextSeqNo": 4})).unwrap();
        assert_eq!(
            envelope.discriminator(),
            Discriminator::Application("Sequence".to_string())
        );
    }

    #[test]
    fn test_message_type_wins_over_msg_type() {
        let envelope = decode(json!({
            "MessageType": "UnsequencedHeartbeat",
            "MsgType": "Quote"
        }))
        .unwrap();
        assert!(matches!(envelope, InboundEnvelope::Admin(_)));
    }

    #[test]
    fn test_decode_unspecified() {
        let envelope = decode(json!({"Text": "hello"})).unwrap();
        assert_eq!(envelope.discriminator(), Discriminator::Unspecified);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            JsonCodec.decode(&Frame::Text("{not json".to_string())),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(decode(json!([1, 2])), Err(DecodeError::Malformed(_))));
        assert!(matches!(
            decode(json!({"MessageType": 7})),
            Err(DecodeError::InvalidFieldValue { .. })
        ));
        assert!(matches!(
            decode(json!({"MessageType": "Establish", "SessionId": 5})),
            Err(DecodeError::InvalidAdminMessage { kind: "Establish", .. })
        ));
    }

    #[test]
    fn test_encode_establish() {
        let frame = JsonCodec
            .encode_admin(AdminMessage::Establish(Establish {
                session_id: "S-1".to_string(),
                timestamp: Timestamp::from_millis(1),
                keepalive_interval: 60_000,
            }))
            .unwrap();

        let Frame::Text(text) = frame else {
            panic!("expected text frame");
        };
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["MessageType"], "Establish");
        assert_eq!(value["SessionId"], "S-1");
        assert_eq!(value["Timestamp"], 1_000_000);
        assert_eq!(value["KeepaliveInterval"], 60_000);
    }

    #[test]
    fn test_negotiate_decodes_back_as_admin() {
        let key = SessionKey::generate();
        let frame = JsonCodec
            .encode_admin(AdminMessage::Negotiate(Negotiate {
                session_key: key,
                timestamp: Timestamp::from_nanos(5),
                client_flow: FlowType::Unsequenced,
                credentials: Credentials::login("u", "p"),
            }))
            .unwrap();

        match JsonCodec.decode(&frame).unwrap() {
            InboundEnvelope::Admin(AdminMessage::Negotiate(negotiate)) => {
                assert_eq!(negotiate.session_key, key);
                assert_eq!(negotiate.credentials.expose_token(), "u:p");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_encode_application_passthrough() {
        let order = json!({"MsgType": "NewOrderSingle", "Account": "ACC-1"});
        let frame = JsonCodec.encode(&Outbound::Application(order.clone())).unwrap();
        let back: Value = serde_json::from_slice(frame.as_bytes()).unwrap();
        assert_eq!(back, order);
    }
}
