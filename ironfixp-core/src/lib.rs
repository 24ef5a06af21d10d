/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronFixp Core
//!
//! Core types, administrative messages, and error definitions for the IronFixp
//! session-layer client.
//!
//! This crate provides the building blocks shared by every IronFixp crate:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Message types**: `Frame`, `AdminMessage`, `InboundEnvelope`, `Outbound`
//! - **Core types**: `Timestamp`, `SessionKey`, `FlowType`, `Credentials`
//!
//! Nothing here knows about sockets or timers; those live in the transport,
//! session, and engine crates.

pub mod error;
pub mod message;
pub mod types;

pub use error::{
    ConfigError, DecodeError, EncodeError, FixpError, HandlerError, ProtocolError, Result,
    TransportError,
};
pub use message::{
    AdminKind, AdminMessage, Discriminator, Establish, EstablishmentAck, EstablishmentReject,
    Frame, InboundEnvelope, Negotiate, NegotiationReject, NegotiationResponse, Outbound,
    Terminate,
};
pub use types::{Credentials, FlowType, SessionKey, Timestamp};
