/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! In-memory transport.
//!
//! [`memory_transport`] returns a connector and an acceptor. Every
//! successful `connect` hands a [`PeerConnection`] to the acceptor, which
//! plays the remote side: it sees every frame the client sends and decides
//! what the client receives. Connect failures can be scripted ahead of time.

use crate::connection::{Connection, Connector};
use async_trait::async_trait;
use futures::{sink, stream};
use ironfixp_core::{Frame, TransportError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

type Inbound = Result<Frame, TransportError>;

/// Creates a connected connector / acceptor pair.
#[must_use]
pub fn memory_transport(name: impl Into<String>) -> (MemoryConnector, MemoryAcceptor) {
    let (accept_tx, accept_rx) = mpsc::unbounded_channel();
    let connector = MemoryConnector {
        inner: Arc::new(Inner {
            name: name.into(),
            accept_tx,
            failures: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
        }),
    };
    (connector, MemoryAcceptor { accept_rx })
}

#[derive(Debug)]
struct Inner {
    name: String,
    accept_tx: mpsc::UnboundedSender<PeerConnection>,
    failures: Mutex<VecDeque<TransportError>>,
    attempts: AtomicUsize,
}

/// Client side of the in-memory transport.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    inner: Arc<Inner>,
}

impl MemoryConnector {
    /// Makes the next `connect` call fail with `err`.
    ///
    /// Calls queue up; each failure is used once.
    pub fn fail_next(&self, err: TransportError) {
        self.inner.failures.lock().push_back(err);
    }

    /// Returns how many times `connect` has been called.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.inner.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Connection, TransportError> {
        self.inner.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.inner.failures.lock().pop_front() {
            return Err(err);
        }

        let (client_tx, peer_rx) = mpsc::unbounded_channel::<Frame>();
        let (peer_tx, client_rx) = mpsc::unbounded_channel::<Inbound>();

        let peer = PeerConnection {
            rx: peer_rx,
            tx: Some(peer_tx),
        };
        self.inner
            .accept_tx
            .send(peer)
            .map_err(|_| TransportError::Connect {
                endpoint: self.describe(),
                reason: "no acceptor".to_string(),
            })?;

        let outbound = sink::unfold(client_tx, |tx, frame: Frame| async move {
            tx.send(frame).map_err(|_| TransportError::Closed)?;
            Ok::<_, TransportError>(tx)
        });
        let inbound = stream::unfold(client_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });

        Ok(Connection::new(
            Box::pin(outbound),
            Box::pin(inbound),
            self.describe(),
        ))
    }

    fn describe(&self) -> String {
        format!("memory://{}", self.inner.name)
    }
}

/// Receives the peer side of each connection.
#[derive(Debug)]
pub struct MemoryAcceptor {
    accept_rx: mpsc::UnboundedReceiver<PeerConnection>,
}

impl MemoryAcceptor {
    /// Waits for the next client connection.
    ///
    /// Returns `None` once every connector clone is dropped.
    pub async fn accept(&mut self) -> Option<PeerConnection> {
        self.accept_rx.recv().await
    }
}

/// The remote side of one in-memory connection.
#[derive(Debug)]
pub struct PeerConnection {
    rx: mpsc::UnboundedReceiver<Frame>,
    tx: Option<mpsc::UnboundedSender<Inbound>>,
}

impl PeerConnection {
    /// Waits for the next frame from the client.
    ///
    /// Returns `None` once the client has dropped its sink.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    /// Returns a frame the client already sent, without waiting.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.rx.try_recv().ok()
    }

    /// Delivers a frame to the client. Returns false if the client is gone.
    pub fn send(&self, frame: Frame) -> bool {
        self.tx.as_ref().is_some_and(|tx| tx.send(Ok(frame)).is_ok())
    }

    /// Delivers an I/O failure to the client's read stream.
    pub fn fail(&self, err: TransportError) -> bool {
        self.tx.as_ref().is_some_and(|tx| tx.send(Err(err)).is_ok())
    }

    /// Ends the client's read stream.
    pub fn close(&mut self) {
        self.tx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{SinkExt, StreamExt};

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let (connector, mut acceptor) = memory_transport("test");
        let (mut sink, mut stream) = connector.connect().await.unwrap().into_split();
        let mut peer = acceptor.accept().await.unwrap();

        sink.send(Frame::Text("ping".into())).await.unwrap();
        assert_eq!(peer.recv().await, Some(Frame::Text("ping".into())));

        assert!(peer.send(Frame::Text("pong".into())));
        assert_eq!(stream.next().await, Some(Ok(Frame::Text("pong".into()))));

        peer.close();
        assert_eq!(stream.next().await, None);
        assert!(!peer.send(Frame::Text("late".into())));
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let (connector, mut acceptor) = memory_transport("test");
        connector.fail_next(TransportError::Connect {
            endpoint: "memory://test".into(),
            reason: "refused".into(),
        });

        assert!(connector.connect().await.is_err());
        assert!(connector.connect().await.is_ok());
        assert_eq!(connector.attempts(), 2);
        assert!(acceptor.accept().await.is_some());
    }

    #[tokio::test]
    async fn test_peer_sees_client_drop() {
        let (connector, mut acceptor) = memory_transport("test");
        let connection = connector.connect().await.unwrap();
        let mut peer = acceptor.accept().await.unwrap();

        drop(connection);
        assert_eq!(peer.recv().await, None);
    }

    #[tokio::test]
    async fn test_connect_without_acceptor() {
        let (connector, acceptor) = memory_transport("test");
        drop(acceptor);
        assert!(matches!(
            connector.connect().await,
            Err(TransportError::Connect { .. })
        ));
    }

    #[tokio::test]
    async fn test_injected_read_error() {
        let (connector, mut acceptor) = memory_transport("test");
        let (_sink, mut stream) = connector.connect().await.unwrap().into_split();
        let peer = acceptor.accept().await.unwrap();

        assert!(peer.fail(TransportError::Io("reset".into())));
        assert_eq!(stream.next().await, Some(Err(TransportError::Io("reset".into()))));
    }
}
