/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the IronFixp session client.
//!
//! Every failure that can end a connection attempt is one of the variants of
//! [`FixpError`]. The reconnect supervisor treats them all the same way (close
//! the connection, wait, try again); the split exists so that logs say what
//! actually went wrong.

use thiserror::Error;

/// Result type alias using [`FixpError`] as the error type.
pub type Result<T> = std::result::Result<T, FixpError>;

/// Top-level error type for all IronFixp operations.
#[derive(Debug, Error)]
pub enum FixpError {
    /// Connection could not be opened, or broke while in use.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The peer violated or ended the session protocol.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// An inbound frame could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An outbound message could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// An application callback failed.
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FixpError {
    /// Returns a short, stable label for the error family.
    ///
    /// Used as the `kind` field in structured log records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Protocol(_) => "protocol",
            Self::Decode(_) | Self::Encode(_) => "codec",
            Self::Handler(_) => "handler",
            Self::Config(_) => "config",
        }
    }
}

/// Errors raised while opening or using a transport connection.
///
/// Connection refused, TLS failures, and mid-stream I/O failures all land here
/// and are retried identically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint could not be parsed or uses an unsupported scheme.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The endpoint as configured.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The connection could not be opened.
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect {
        /// The endpoint being connected to.
        endpoint: String,
        /// Underlying failure.
        reason: String,
    },

    /// Opening the connection took longer than allowed.
    #[error("connect to {endpoint} timed out after {timeout_ms} ms")]
    ConnectTimeout {
        /// The endpoint being connected to.
        endpoint: String,
        /// Configured connect timeout in milliseconds.
        timeout_ms: u64,
    },

    /// WebSocket protocol or handshake failure.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// The byte stream could not be split into frames.
    #[error("framing error: {0}")]
    Framing(String),

    /// I/O error on the underlying socket.
    #[error("io error: {0}")]
    Io(String),

    /// The peer closed the connection.
    #[error("connection closed")]
    Closed,
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Session protocol violations and peer-initiated session endings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The peer answered `Negotiate` with `NegotiationReject`.
    #[error("negotiation rejected: {reason}")]
    NegotiationRejected {
        /// Reason given by the peer, if any.
        reason: String,
    },

    /// The peer answered `Establish` with `EstablishmentReject`.
    #[error("establishment rejected: {reason}")]
    EstablishmentRejected {
        /// Reason given by the peer, if any.
        reason: String,
    },

    /// The peer sent `Terminate`.
    #[error("session terminated by peer: {reason}")]
    Terminated {
        /// Reason given by the peer, if any.
        reason: String,
    },

    /// A message arrived that is not valid in the current session state.
    #[error("unexpected {message} while {state}")]
    UnexpectedMessage {
        /// Session state at the time of receipt.
        state: String,
        /// Discriminator of the offending message.
        message: String,
    },

    /// A handshake message lacked a field the session needs.
    #[error("{message} is missing required field {field}")]
    MissingField {
        /// The handshake message name.
        message: &'static str,
        /// The missing field name.
        field: &'static str,
    },

    /// The handshake did not complete in time.
    #[error("handshake not completed after {elapsed_ms} ms (state {state})")]
    HandshakeTimeout {
        /// Session state when the timeout fired.
        state: String,
        /// Elapsed time in milliseconds.
        elapsed_ms: u64,
    },

    /// Nothing was received from the peer for too long.
    #[error("no traffic from peer for {elapsed_ms} ms")]
    PeerTimeout {
        /// Elapsed time in milliseconds since the last inbound frame.
        elapsed_ms: u64,
    },
}

/// Errors that occur while decoding an inbound frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame is not well-formed for the codec's wire format.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// Tag-value frame does not start with BeginString (tag 8).
    #[error("invalid begin string: frame must start with 8=")]
    InvalidBeginString,

    /// Tag-value frame is missing BodyLength (tag 9).
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// Tag-value BodyLength could not be parsed.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// Tag-value frame is missing its message type (tag 35).
    #[error("missing message type field (tag 35)")]
    MissingMsgType,

    /// Tag-value checksum does not match the frame contents.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum value.
        calculated: u8,
        /// Declared checksum value in the frame.
        declared: u8,
    },

    /// A tag number is not a valid integer.
    #[error("invalid tag format: {0}")]
    InvalidTag(String),

    /// A field value could not be interpreted.
    #[error("invalid value for {field}: {reason}")]
    InvalidFieldValue {
        /// Field name or tag number.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// A frame carried a recognised administrative type but an unusable body.
    #[error("invalid {kind} message: {reason}")]
    InvalidAdminMessage {
        /// Administrative message name.
        kind: &'static str,
        /// Underlying decode failure.
        reason: String,
    },

    /// Field text is not valid UTF-8.
    #[error("invalid utf-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Errors that occur while encoding an outbound message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Serialisation of the message failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A field value cannot be represented on the wire.
    #[error("invalid value for {field}: {reason}")]
    InvalidFieldValue {
        /// Field name or tag number.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },
}

/// Failure raised by an application callback.
///
/// Returning this from a handler closes the current connection; the session is
/// re-established from scratch on the next attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct HandlerError {
    reason: String,
}

impl HandlerError {
    /// Creates a handler error with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the failure reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A setting was provided with an unusable value.
    #[error("invalid value for {setting}: {reason}")]
    Invalid {
        /// The setting name.
        setting: &'static str,
        /// Why the value is unusable.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::UnexpectedMessage {
            state: "Negotiating".to_string(),
            message: "ExecutionReport".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected ExecutionReport while Negotiating");
    }

    #[test]
    fn test_fixp_error_from_transport() {
        let err: FixpError = TransportError::Closed.into();
        assert!(matches!(err, FixpError::Transport(TransportError::Closed)));
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn test_fixp_error_kinds() {
        let decode: FixpError = DecodeError::MissingMsgType.into();
        let encode: FixpError = EncodeError::Serialization("boom".into()).into();
        let handler: FixpError = HandlerError::new("bad order").into();
        let config: FixpError = ConfigError::Missing("url").into();

        assert_eq!(decode.kind(), "codec");
        assert_eq!(encode.kind(), "codec");
        assert_eq!(handler.kind(), "handler");
        assert_eq!(config.kind(), "config");
    }

    #[test]
    fn test_handler_error_display() {
        let err = HandlerError::new("unknown instrument");
        assert_eq!(err.reason(), "unknown instrument");
        assert_eq!(
            FixpError::from(err).to_string(),
            "handler error: unknown instrument"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = TransportError::from(io);
        assert_eq!(err, TransportError::Io("reset by peer".to_string()));
    }
}
