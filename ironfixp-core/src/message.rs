/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message types for the FIXP session layer.
//!
//! This module provides:
//! - [`Frame`]: One raw unit of transport traffic
//! - [`AdminMessage`]: The administrative messages interpreted by the session itself
//! - [`Discriminator`]: The logical type of an inbound frame
//! - [`InboundEnvelope`] / [`Outbound`]: Decoded inbound and to-be-encoded outbound traffic
//!
//! Application messages are opaque here; each codec picks its own
//! representation and the session only looks at the discriminator.

use crate::types::{Credentials, FlowType, SessionKey, Timestamp};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One frame of transport traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame (JSON encoding).
    Text(String),
    /// Binary frame (tag-value encoding).
    Binary(Bytes),
}

impl Frame {
    /// Returns the frame payload as bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    /// Converts the frame into its payload bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Text(text) => Bytes::from(text),
            Self::Binary(bytes) => bytes,
        }
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for Frame {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Bytes> for Frame {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}

/// Names of the administrative messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminKind {
    /// Client → peer: start negotiation.
    Negotiate,
    /// Peer → client: negotiation accepted, carries the session identifier.
    NegotiationResponse,
    /// Peer → client: negotiation refused.
    NegotiationReject,
    /// Client → peer: activate the negotiated session.
    Establish,
    /// Peer → client: session is active.
    EstablishmentAck,
    /// Peer → client: activation refused.
    EstablishmentReject,
    /// Keepalive on an unsequenced flow.
    UnsequencedHeartbeat,
    /// Either side: the session is over.
    Terminate,
}

impl AdminKind {
    /// All administrative kinds.
    pub const ALL: [Self; 8] = [
        Self::Negotiate,
        Self::NegotiationResponse,
        Self::NegotiationReject,
        Self::Establish,
        Self::EstablishmentAck,
        Self::EstablishmentReject,
        Self::UnsequencedHeartbeat,
        Self::Terminate,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Negotiate => "Negotiate",
            Self::NegotiationResponse => "NegotiationResponse",
            Self::NegotiationReject => "NegotiationReject",
            Self::Establish => "Establish",
            Self::EstablishmentAck => "EstablishmentAck",
            Self::EstablishmentReject => "EstablishmentReject",
            Self::UnsequencedHeartbeat => "UnsequencedHeartbeat",
            Self::Terminate => "Terminate",
        }
    }

    /// Looks up an administrative kind by wire name.
    ///
    /// Returns `None` for anything that is not administrative, which callers
    /// treat as an application discriminator.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for AdminKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Negotiate`: the first frame of every connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Negotiate {
    /// Client-generated correlation token.
    #[serde(rename = "SessionId")]
    pub session_key: SessionKey,
    /// Send-time.
    pub timestamp: Timestamp,
    /// Requested flow type for client → peer traffic.
    pub client_flow: FlowType,
    /// Login credentials.
    pub credentials: Credentials,
}

/// `NegotiationResponse`: negotiation accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NegotiationResponse {
    /// Session identifier assigned by the peer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Echo of the `Negotiate` send-time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timestamp: Option<Timestamp>,
    /// Flow type of peer → client traffic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_flow: Option<String>,
}

/// `NegotiationReject`: negotiation refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NegotiationReject {
    /// Session identifier, if the peer echoes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Human-readable reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `Establish`: activate the negotiated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Establish {
    /// Session identifier from `NegotiationResponse`.
    pub session_id: String,
    /// Send-time.
    pub timestamp: Timestamp,
    /// Heartbeat timeout the peer should apply, in milliseconds.
    pub keepalive_interval: u64,
}

/// `EstablishmentAck`: session active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EstablishmentAck {
    /// Session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// The peer's own keepalive interval in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keepalive_interval: Option<u64>,
}

/// `EstablishmentReject`: activation refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EstablishmentReject {
    /// Session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Human-readable reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `Terminate`: the session is over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Terminate {
    /// Session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Human-readable reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Administrative messages, tagged on the wire by `MessageType`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "MessageType")]
pub enum AdminMessage {
    /// See [`Negotiate`].
    Negotiate(Negotiate),
    /// See [`NegotiationResponse`].
    NegotiationResponse(NegotiationResponse),
    /// See [`NegotiationReject`].
    NegotiationReject(NegotiationReject),
    /// See [`Establish`].
    Establish(Establish),
    /// See [`EstablishmentAck`].
    EstablishmentAck(EstablishmentAck),
    /// See [`EstablishmentReject`].
    EstablishmentReject(EstablishmentReject),
    /// Keepalive; carries no fields.
    UnsequencedHeartbeat,
    /// See [`Terminate`].
    Terminate(Terminate),
}

impl AdminMessage {
    /// Returns the kind of this message.
    #[must_use]
    pub const fn kind(&self) -> AdminKind {
        match self {
            Self::Negotiate(_) => AdminKind::Negotiate,
            Self::NegotiationResponse(_) => AdminKind::NegotiationResponse,
            Self::NegotiationReject(_) => AdminKind::NegotiationReject,
            Self::Establish(_) => AdminKind::Establish,
            Self::EstablishmentAck(_) => AdminKind::EstablishmentAck,
            Self::EstablishmentReject(_) => AdminKind::EstablishmentReject,
            Self::UnsequencedHeartbeat => AdminKind::UnsequencedHeartbeat,
            Self::Terminate(_) => AdminKind::Terminate,
        }
    }
}

/// The logical type of an inbound frame, resolved once at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Discriminator {
    /// A recognised administrative message.
    Admin(AdminKind),
    /// Anything else that names a type; forwarded to the application.
    Application(String),
    /// The frame names no type at all.
    Unspecified,
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin(kind) => f.write_str(kind.as_str()),
            Self::Application(msg_type) => f.write_str(msg_type),
            Self::Unspecified => f.write_str("<unspecified>"),
        }
    }
}

/// A decoded inbound frame.
///
/// `M` is the codec's application message representation.
#[derive(Debug, Clone)]
pub enum InboundEnvelope<M> {
    /// Administrative message, handled by the session.
    Admin(AdminMessage),
    /// Application message, forwarded to the registered handler.
    Application {
        /// The application discriminator.
        msg_type: String,
        /// The decoded message.
        message: M,
    },
    /// A frame without any discriminator.
    Unspecified(M),
}

impl<M> InboundEnvelope<M> {
    /// Returns the discriminator of the envelope.
    #[must_use]
    pub fn discriminator(&self) -> Discriminator {
        match self {
            Self::Admin(admin) => Discriminator::Admin(admin.kind()),
            Self::Application { msg_type, .. } => Discriminator::Application(msg_type.clone()),
            Self::Unspecified(_) => Discriminator::Unspecified,
        }
    }
}

/// A message waiting to be encoded and sent.
#[derive(Debug, Clone)]
pub enum Outbound<M> {
    /// Administrative message produced by the session.
    Admin(AdminMessage),
    /// Application message produced by a handler.
    Application(M),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_admin_kind_lookup() {
        for kind in AdminKind::ALL {
            assert_eq!(AdminKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(AdminKind::from_name("ExecutionReport"), None);
        assert_eq!(AdminKind::from_name(""), None);
    }

    #[test]
    fn test_negotiate_json_shape() {
        let negotiate = AdminMessage::Negotiate(Negotiate {
            session_key: SessionKey::generate(),
            timestamp: Timestamp::from_nanos(7),
            client_flow: FlowType::Unsequenced,
            credentials: Credentials::login("user", "pw"),
        });

        let value = serde_json::to_value(&negotiate).unwrap();
        assert_eq!(value["MessageType"], "Negotiate");
        assert_eq!(value["Timestamp"], 7);
        assert_eq!(value["ClientFlow"], "Unsequenced");
        assert_eq!(value["Credentials"]["CredentialsType"], "login");
        assert!(value["SessionId"].is_string());
    }

    #[test]
    fn test_heartbeat_json_shape() {
        let value = serde_json::to_value(AdminMessage::UnsequencedHeartbeat).unwrap();
        assert_eq!(value, json!({"MessageType": "UnsequencedHeartbeat"}));
    }

    #[test]
    fn test_negotiation_response_tolerates_extra_fields() {
        let value = json!({
            "MessageType": "NegotiationResponse",
            "SessionId": "S1",
            "ServerFlow": "Unsequenced",
            "Vendor": "something new"
        });
        let admin: AdminMessage = serde_json::from_value(value).unwrap();
        match admin {
            AdminMessage::NegotiationResponse(resp) => {
                assert_eq!(resp.session_id.as_deref(), Some("S1"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_envelope_discriminator() {
        let admin: InboundEnvelope<()> = InboundEnvelope::Admin(AdminMessage::UnsequencedHeartbeat);
        assert_eq!(
            admin.discriminator(),
            Discriminator::Admin(AdminKind::UnsequencedHeartbeat)
        );

        let app = InboundEnvelope::Application {
            msg_type: "Quote".to_string(),
            message: (),
        };
        assert_eq!(app.discriminator().to_string(), "Quote");
        assert_eq!(
            InboundEnvelope::Unspecified(()).discriminator(),
            Discriminator::Unspecified
        );
    }

    #[test]
    fn test_frame_bytes() {
        let text = Frame::from("{}".to_string());
        assert_eq!(text.as_bytes(), b"{}");
        assert_eq!(text.len(), 2);

        let binary = Frame::from(Bytes::from_static(b"8=FIXT.1.1\x01"));
        assert!(!binary.is_empty());
        assert_eq!(binary.into_bytes(), Bytes::from_static(b"8=FIXT.1.1\x01"));
    }
}
