/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tag-value codec.
//!
//! Administrative messages are sent with their name in MsgType (tag 35) and
//! their fields in the user-defined tag range. Anything else in tag 35 is an
//! application message. An empty tag 35 is unspecified.

use crate::MessageCodec;
use ironfixp_core::{
    AdminKind, AdminMessage, Credentials, DecodeError, EncodeError, Establish, EstablishmentAck,
    EstablishmentReject, Frame, InboundEnvelope, Negotiate, NegotiationReject, NegotiationResponse,
    Outbound, SessionKey, Terminate, Timestamp,
};
use ironfixp_tagvalue::{FieldMessage, decode_message, encode_message, tags};
use std::str::FromStr;

/// Tags used for administrative message fields.
pub mod admin_tags {
    /// Session identifier; the session key in `Negotiate`.
    pub const SESSION_ID: u32 = 5001;
    /// Send-time in nanoseconds since the epoch.
    pub const TIMESTAMP: u32 = 5002;
    /// Flow type (`ClientFlow` or `ServerFlow`).
    pub const FLOW_TYPE: u32 = 5003;
    /// Credentials type.
    pub const CREDENTIALS_TYPE: u32 = 5004;
    /// Credentials token.
    pub const CREDENTIALS_TOKEN: u32 = 5005;
    /// Keepalive interval in milliseconds.
    pub const KEEPALIVE_INTERVAL: u32 = 5006;
    /// Echoed request timestamp.
    pub const REQUEST_TIMESTAMP: u32 = 5007;
    /// Reject or terminate reason.
    pub const REASON: u32 = super::tags::TEXT;
}

/// Default BeginString.
pub const DEFAULT_BEGIN_STRING: &str = "FIXT.1.1";

/// Tag-value codec over binary frames.
#[derive(Debug, Clone)]
pub struct TagValueCodec {
    begin_string: String,
}

impl TagValueCodec {
    /// Creates a codec that writes the given BeginString.
    #[must_use]
    pub fn new(begin_string: impl Into<String>) -> Self {
        Self {
            begin_string: begin_string.into(),
        }
    }

    /// Returns the BeginString written on outbound frames.
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }
}

impl Default for TagValueCodec {
    fn default() -> Self {
        Self::new(DEFAULT_BEGIN_STRING)
    }
}

impl MessageCodec for TagValueCodec {
    type Message = FieldMessage;

    fn name(&self) -> &'static str {
        "tagvalue"
    }

    fn encode(&self, message: &Outbound<FieldMessage>) -> Result<Frame, EncodeError> {
        let bytes = match message {
            Outbound::Admin(admin) => encode_message(&self.begin_string, &admin_to_fields(admin))?,
            Outbound::Application(fields) => {
                if fields.msg_type().is_empty() {
                    return Err(EncodeError::InvalidFieldValue {
                        field: "35".to_string(),
                        reason: "application message has no MsgType".to_string(),
                    });
                }
                encode_message(&self.begin_string, fields)?
            }
        };
        Ok(Frame::Binary(bytes))
    }

    fn decode(&self, frame: &Frame) -> Result<InboundEnvelope<FieldMessage>, DecodeError> {
        let message = decode_message(frame.as_bytes())?;
        if message.msg_type().is_empty() {
            return Ok(InboundEnvelope::Unspecified(message));
        }
        match AdminKind::from_name(message.msg_type()) {
            Some(kind) => admin_from_fields(kind, &message).map(InboundEnvelope::Admin),
            None => Ok(InboundEnvelope::Application {
                msg_type: message.msg_type().to_string(),
                message,
            }),
        }
    }
}

fn admin_to_fields(admin: &AdminMessage) -> FieldMessage {
    use admin_tags::*;

    let mut fields = FieldMessage::new(admin.kind().as_str());
    match admin {
        AdminMessage::Negotiate(m) => {
            fields.push(SESSION_ID, m.session_key.to_string());
            fields.push(TIMESTAMP, m.timestamp.as_nanos().to_string());
            fields.push(FLOW_TYPE, m.client_flow.as_str());
            fields.push(CREDENTIALS_TYPE, m.credentials.kind());
            fields.push(CREDENTIALS_TOKEN, m.credentials.expose_token());
        }
        AdminMessage::NegotiationResponse(m) => {
            push_opt(&mut fields, SESSION_ID, m.session_id.as_deref());
            push_opt(
                &mut fields,
                REQUEST_TIMESTAMP,
                m.request_timestamp.map(|t| t.as_nanos().to_string()).as_deref(),
            );
            push_opt(&mut fields, FLOW_TYPE, m.server_flow.as_deref());
        }
        AdminMessage::Establish(m) => {
            fields.push(SESSION_ID, m.session_id.as_str());
            fields.push(TIMESTAMP, m.timestamp.as_nanos().to_string());
            fields.push(KEEPALIVE_INTERVAL, m.keepalive_interval.to_string());
        }
        AdminMessage::EstablishmentAck(m) => {
            push_opt(&mut fields, SESSION_ID, m.session_id.as_deref());
            push_opt(
                &mut fields,
                KEEPALIVE_INTERVAL,
                m.keepalive_interval.map(|k| k.to_string()).as_deref(),
            );
        }
        AdminMessage::NegotiationReject(NegotiationReject { session_id, reason })
        | AdminMessage::EstablishmentReject(EstablishmentReject { session_id, reason })
        | AdminMessage::Terminate(Terminate { session_id, reason }) => {
            push_opt(&mut fields, SESSION_ID, session_id.as_deref());
            push_opt(&mut fields, REASON, reason.as_deref());
        }
        AdminMessage::UnsequencedHeartbeat => {}
    }
    fields
}

fn push_opt(fields: &mut FieldMessage, tag: u32, value: Option<&str>) {
    if let Some(value) = value {
        fields.push(tag, value);
    }
}

fn admin_from_fields(kind: AdminKind, fields: &FieldMessage) -> Result<AdminMessage, DecodeError> {
    use admin_tags::*;

    let reader = AdminReader { kind, fields };
    let message = match kind {
        AdminKind::Negotiate => AdminMessage::Negotiate(Negotiate {
            session_key: reader.required::<SessionKey>(SESSION_ID)?,
            timestamp: Timestamp::from_nanos(reader.required(TIMESTAMP)?),
            client_flow: reader.optional(FLOW_TYPE)?.unwrap_or_default(),
            credentials: Credentials::new(
                reader.required::<String>(CREDENTIALS_TYPE)?,
                reader.required::<String>(CREDENTIALS_TOKEN)?,
            ),
        }),
        AdminKind::NegotiationResponse => AdminMessage::NegotiationResponse(NegotiationResponse {
            session_id: reader.optional(SESSION_ID)?,
            request_timestamp: reader.optional(REQUEST_TIMESTAMP)?.map(Timestamp::from_nanos),
            server_flow: reader.optional(FLOW_TYPE)?,
        }),
        AdminKind::NegotiationReject => AdminMessage::NegotiationReject(NegotiationReject {
            session_id: reader.optional(SESSION_ID)?,
            reason: reader.optional(REASON)?,
        }),
        AdminKind::Establish => AdminMessage::Establish(Establish {
            session_id: reader.required(SESSION_ID)?,
            timestamp: Timestamp::from_nanos(reader.required(TIMESTAMP)?),
            keepalive_interval: reader.required(KEEPALIVE_INTERVAL)?,
        }),
        AdminKind::EstablishmentAck => AdminMessage::EstablishmentAck(EstablishmentAck {
            session_id: reader.optional(SESSION_ID)?,
            keepalive_interval: reader.optional(KEEPALIVE_INTERVAL)?,
        }),
        AdminKind::EstablishmentReject => AdminMessage::EstablishmentReject(EstablishmentReject {
            session_id: reader.optional(SESSION_ID)?,
            reason: reader.optional(REASON)?,
        }),
        AdminKind::UnsequencedHeartbeat => AdminMessage::UnsequencedHeartbeat,
        AdminKind::Terminate => AdminMessage::Terminate(Terminate {
            session_id: reader.optional(SESSION_ID)?,
            reason: reader.optional(REASON)?,
        }),
    };
    Ok(message)
}

struct AdminReader<'a> {
    kind: AdminKind,
    fields: &'a FieldMessage,
}

impl AdminReader<'_> {
    fn optional<T: FromStr>(&self, tag: u32) -> Result<Option<T>, DecodeError> {
        let Some(raw) = self.fields.get(tag) else {
            return Ok(None);
        };
        raw.parse().map(Some).map_err(|_| DecodeError::InvalidAdminMessage {
            kind: self.kind.as_str(),
            reason: format!("invalid value '{raw}' in tag {tag}"),
        })
    }

    fn required<T: FromStr>(&self, tag: u32) -> Result<T, DecodeError> {
        self.optional(tag)?.ok_or_else(|| DecodeError::InvalidAdminMessage {
            kind: self.kind.as_str(),
            reason: format!("missing tag {tag}"),
        })
    }
}
