/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronFixp
//!
//! A FIXP session-layer client for Rust.
//!
//! IronFixp opens a WebSocket or TCP connection, performs the
//! Negotiate / Establish handshake on an unsequenced flow, keeps the session
//! alive with `UnsequencedHeartbeat`, hands application messages to your
//! handler and reconnects on a constant interval whenever anything fails.
//!
//! ## Features
//!
//! - **Two wire formats**: JSON objects over WebSocket text frames, FIX tag=value over TCP or WebSocket binary frames
//! - **Pure state machine**: The handshake is testable without sockets
//! - **Single writer**: Heartbeats and replies never interleave on the wire
//! - **Async support**: Built on Tokio
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ironfixp::prelude::*;
//!
//! let config = SessionConfig::from_env()?;
//! let handle = EngineBuilder::new()
//!     .with_config(config)
//!     .with_application(MyApplication)
//!     .build()?
//!     .spawn();
//!
//! tokio::signal::ctrl_c().await?;
//! handle.shutdown().await;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Administrative messages, core types, and error definitions
//! - [`tagvalue`]: FIX tag=value encoding and decoding
//! - [`codec`]: Wire codecs mapping frames to messages
//! - [`transport`]: WebSocket, TCP and in-memory connections
//! - [`session`]: Handshake state machine, heartbeats and configuration
//! - [`engine`]: Reconnecting initiator and application interface

pub mod core {
    //! Administrative messages, core types, and error definitions.
    pub use ironfixp_core::*;
}

pub mod tagvalue {
    //! FIX tag=value encoding and decoding.
    pub use ironfixp_tagvalue::*;
}

pub mod codec {
    //! Wire codecs mapping frames to messages.
    pub use ironfixp_codec::*;
}

pub mod transport {
    //! WebSocket, TCP and in-memory connections.
    pub use ironfixp_transport::*;
}

pub mod session {
    //! Handshake state machine, heartbeats and configuration.
    pub use ironfixp_session::*;
}

pub mod engine {
    //! Reconnecting initiator and application interface.
    pub use ironfixp_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use ironfixp_core::{
        AdminKind, AdminMessage, ConfigError, Credentials, DecodeError, EncodeError, FixpError,
        FlowType, Frame, HandlerError, InboundEnvelope, Outbound, ProtocolError, SessionKey,
        Timestamp, TransportError,
    };

    // Tag-value encoding
    pub use ironfixp_tagvalue::{FieldMessage, tags};

    // Codecs
    pub use ironfixp_codec::{JsonCodec, MessageCodec, TagValueCodec};

    // Transport
    pub use ironfixp_transport::{Connector, Endpoint};

    // Session
    pub use ironfixp_session::{SessionConfig, SessionConfigBuilder, SessionState};

    // Engine
    pub use ironfixp_engine::{
        Application, EngineBuilder, Initiator, InitiatorHandle, NoOpApplication, SessionContext,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _ts = Timestamp::now();
        let _key = SessionKey::generate();
        assert_eq!(FlowType::Unsequenced.as_str(), "Unsequenced");
        assert_eq!(AdminKind::UnsequencedHeartbeat.as_str(), "UnsequencedHeartbeat");
    }

    #[test]
    fn test_builder_from_prelude() {
        let config = SessionConfigBuilder::new()
            .endpoint("wss://fixp.example.com/ws")
            .login("user", "pass")
            .build()
            .unwrap();
        let initiator = EngineBuilder::new().with_config(config).build().unwrap();
        assert_eq!(initiator.state(), SessionState::Disconnected);
    }
}
