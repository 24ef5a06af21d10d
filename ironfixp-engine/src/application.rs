/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Application callback interface.
//!
//! The session handles every administrative message itself. Everything else
//! is handed to an [`Application`], which answers with zero or more messages
//! to send. Returning an error closes the connection; the supervisor then
//! reconnects from scratch.

use async_trait::async_trait;
use ironfixp_core::{FixpError, HandlerError, SessionKey};
use tracing::trace;

/// What a handler knows about the session it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session_id: String,
    session_key: SessionKey,
    account: Option<String>,
    attempt: u64,
}

impl SessionContext {
    /// Creates a context.
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        session_key: SessionKey,
        account: Option<String>,
        attempt: u64,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            session_key,
            account,
            attempt,
        }
    }

    /// Returns the session identifier assigned by the peer.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the negotiation key of this connection.
    #[must_use]
    pub const fn session_key(&self) -> SessionKey {
        self.session_key
    }

    /// Returns the configured account, if any.
    #[must_use]
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Returns the connection attempt number, starting at 1.
    #[must_use]
    pub const fn attempt(&self) -> u64 {
        self.attempt
    }
}

/// Application callback interface.
///
/// `M` is the codec's application message type, for example
/// `serde_json::Value` for the JSON codec.
#[async_trait]
pub trait Application<M: Send + Sync + 'static>: Send + Sync + 'static {
    /// Called once per connection when the session becomes established.
    ///
    /// The returned messages are sent in order, typically an initial
    /// subscription or order.
    ///
    /// # Errors
    /// Returning `HandlerError` closes the connection.
    async fn on_established(&self, _ctx: &SessionContext) -> Result<Vec<M>, HandlerError> {
        Ok(Vec::new())
    }

    /// Called for every application message received while established.
    ///
    /// # Arguments
    /// * `ctx` - The current session
    /// * `msg_type` - The message discriminator
    /// * `message` - The decoded message, unchanged
    ///
    /// # Errors
    /// Returning `HandlerError` closes the connection.
    async fn on_message(
        &self,
        ctx: &SessionContext,
        msg_type: &str,
        message: M,
    ) -> Result<Vec<M>, HandlerError>;

    /// Called after a connection attempt fails, before the reconnect delay.
    async fn on_disconnect(&self, _error: &FixpError) {}
}

/// Application that ignores every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpApplication;

#[async_trait]
impl<M: Send + Sync + 'static> Application<M> for NoOpApplication {
    async fn on_message(
        &self,
        ctx: &SessionContext,
        msg_type: &str,
        _message: M,
    ) -> Result<Vec<M>, HandlerError> {
        trace!(session_id = ctx.session_id(), msg_type, "ignoring application message");
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_context() {
        let key = SessionKey::generate();
        let ctx = SessionContext::new("S1", key, Some("ACC".to_string()), 3);
        assert_eq!(ctx.session_id(), "S1");
        assert_eq!(ctx.session_key(), key);
        assert_eq!(ctx.account(), Some("ACC"));
        assert_eq!(ctx.attempt(), 3);
    }

    #[tokio::test]
    async fn test_noop_application() {
        let app = NoOpApplication;
        let ctx = SessionContext::new("S1", SessionKey::generate(), None, 1);

        let initial = Application::<String>::on_established(&app, &ctx).await.unwrap();
        assert!(initial.is_empty());

        let replies = app
            .on_message(&ctx, "Quote", "payload".to_string())
            .await
            .unwrap();
        assert!(replies.is_empty());
    }
}
