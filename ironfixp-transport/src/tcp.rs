/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! TCP transport with tag-value framing.

use crate::codec::FrameCodec;
use crate::connection::{Connection, Connector};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt, future};
use ironfixp_core::{Frame, TransportError};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::debug;

/// Connector for `tcp://host:port` endpoints.
///
/// Frames are delimited with [`FrameCodec`], so this transport only carries
/// tag-value traffic.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    host: String,
    port: u16,
}

impl TcpConnector {
    /// Creates a connector for `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> Result<Connection, TransportError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| TransportError::Connect {
                endpoint: self.describe(),
                reason: e.to_string(),
            })?;
        stream.set_nodelay(true)?;
        let peer = stream
            .peer_addr()
            .map_or_else(|_| self.describe(), |addr| addr.to_string());
        debug!(%peer, "tcp connection open");

        let (write, read) = Framed::new(stream, FrameCodec::new()).split();
        let sink = write.with(|frame: Frame| future::ready(Ok::<_, TransportError>(frame.into_bytes())));
        let stream = read.map(|item| item.map(Frame::Binary));

        Ok(Connection::new(Box::pin(sink), Box::pin(stream), peer))
    }

    fn describe(&self) -> String {
        format!("tcp://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironfixp_tagvalue::{FieldMessage, encode_message};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_frames_both_ways() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let frame = encode_message("FIXT.1.1", &FieldMessage::new("UnsequencedHeartbeat")).unwrap();
        let expected = frame.clone();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; expected.len()];
            socket.read_exact(&mut buf).await.unwrap();
            assert_eq!(&buf[..], &expected[..]);
            // Write the frame back in two pieces.
            let (a, b) = buf.split_at(5);
            socket.write_all(a).await.unwrap();
            socket.write_all(b).await.unwrap();
        });

        let connector = TcpConnector::new("127.0.0.1", port);
        let (mut sink, mut stream) = connector.connect().await.unwrap().into_split();
        sink.send(Frame::Binary(frame.clone())).await.unwrap();

        let echoed = stream.next().await.unwrap().unwrap();
        assert_eq!(echoed, Frame::Binary(frame));

        server.await.unwrap();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_tcp_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = TcpConnector::new("127.0.0.1", port).connect().await.unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
    }
}
