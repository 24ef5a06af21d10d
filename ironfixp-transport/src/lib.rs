/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronFixp Transport
//!
//! Connection layer for the IronFixp session client.
//!
//! This crate provides:
//! - **Endpoints**: `ws://`, `wss://` and `tcp://` URLs
//! - **WebSocket transport**: tokio-tungstenite with rustls
//! - **TCP transport**: Tag-value framing via a tokio codec
//! - **In-memory transport**: A connector paired with a scriptable peer

pub mod codec;
pub mod connection;
pub mod endpoint;
pub mod memory;
pub mod tcp;
pub mod ws;

pub use codec::FrameCodec;
pub use connection::{Connection, Connector, FrameSink, FrameStream, connector_for};
pub use endpoint::Endpoint;
pub use memory::{MemoryAcceptor, MemoryConnector, PeerConnection, memory_transport};
pub use tcp::TcpConnector;
pub use ws::WsConnector;
