/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! The connection abstraction shared by all transports.
//!
//! A [`Connection`] is a frame sink plus a frame stream. Dropping both halves
//! releases the underlying socket, so every exit path of the session runner
//! closes the connection.

use crate::endpoint::Endpoint;
use crate::tcp::TcpConnector;
use crate::ws::WsConnector;
use async_trait::async_trait;
use futures::{Sink, Stream};
use ironfixp_core::{Frame, TransportError};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

/// Outbound half of a connection.
pub type FrameSink = Pin<Box<dyn Sink<Frame, Error = TransportError> + Send>>;

/// Inbound half of a connection. Ends when the peer closes.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, TransportError>> + Send>>;

/// One open duplex connection.
pub struct Connection {
    sink: FrameSink,
    stream: FrameStream,
    peer: String,
}

impl Connection {
    /// Wraps an already-open sink and stream.
    #[must_use]
    pub fn new(sink: FrameSink, stream: FrameStream, peer: impl Into<String>) -> Self {
        Self {
            sink,
            stream,
            peer: peer.into(),
        }
    }

    /// Returns a description of the remote side.
    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Splits into the outbound and inbound halves.
    #[must_use]
    pub fn into_split(self) -> (FrameSink, FrameStream) {
        (self.sink, self.stream)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").field("peer", &self.peer).finish_non_exhaustive()
    }
}

/// Opens connections to one endpoint.
#[async_trait]
pub trait Connector: Send + Sync + fmt::Debug {
    /// Opens a new connection.
    ///
    /// # Errors
    /// Returns `TransportError` if the connection cannot be opened.
    async fn connect(&self) -> Result<Connection, TransportError>;

    /// Describes the endpoint for logs.
    fn describe(&self) -> String;
}

/// Returns the connector for an endpoint.
#[must_use]
pub fn connector_for(endpoint: &Endpoint) -> Arc<dyn Connector> {
    match endpoint {
        Endpoint::WebSocket(url) => Arc::new(WsConnector::new(url.clone())),
        Endpoint::Tcp { host, port } => Arc::new(TcpConnector::new(host.clone(), *port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_for_endpoint() {
        let ws = connector_for(&"ws://localhost:8080/fixp".parse().unwrap());
        assert_eq!(ws.describe(), "ws://localhost:8080/fixp");

        let tcp = connector_for(&"tcp://localhost:9880".parse().unwrap());
        assert_eq!(tcp.describe(), "tcp://localhost:9880");
    }
}
