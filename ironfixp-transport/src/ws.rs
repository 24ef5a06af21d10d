/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! WebSocket transport.
//!
//! Text messages become [`Frame::Text`], binary messages [`Frame::Binary`].
//! Ping and pong are answered by tungstenite and never surface. A close
//! message ends the inbound stream.

use crate::connection::{Connection, Connector};
use async_trait::async_trait;
use futures::{SinkExt, Stream, StreamExt, future};
use ironfixp_core::{Frame, TransportError};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, trace};
use url::Url;

/// Connector for `ws://` and `wss://` endpoints.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: Url,
}

impl WsConnector {
    /// Creates a connector for the given URL.
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self { url }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<Connection, TransportError> {
        let (ws_stream, response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|e| TransportError::Connect {
                    endpoint: self.url.to_string(),
                    reason: e.to_string(),
                })?;
        debug!(endpoint = %self.url, status = %response.status(), "websocket handshake complete");

        let (write, read) = ws_stream.split();
        let sink = write
            .sink_map_err(|e| TransportError::WebSocket(e.to_string()))
            .with(|frame: Frame| future::ready(Ok::<_, TransportError>(to_message(frame))));

        Ok(Connection::new(
            Box::pin(sink),
            Box::pin(inbound_frames(read)),
            self.url.to_string(),
        ))
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

fn to_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Binary(bytes) => Message::Binary(bytes),
    }
}

fn inbound_frames<S>(mut read: S) -> impl Stream<Item = Result<Frame, TransportError>> + Send
where
    S: Stream<Item = Result<Message, WsError>> + Unpin + Send + 'static,
{
    async_stream::stream! {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => yield Ok(Frame::Text(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => yield Ok(Frame::Binary(bytes)),
                Ok(Message::Close(close)) => {
                    debug!(?close, "peer sent close");
                    break;
                }
                Ok(other) => trace!(?other, "ignoring control message"),
                Err(e) => {
                    yield Err(TransportError::WebSocket(e.to_string()));
                    break;
                }
            }
        }
    }
}
