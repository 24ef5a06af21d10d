/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Reconnect supervisor.
//!
//! The [`Initiator`] owns the retry loop: connect, run the session until it
//! fails, wait the reconnect interval, start over with a fresh session. At
//! most one connection is live at any time. Only shutdown ends the loop.

use crate::application::Application;
use crate::connection::ConnectionRunner;
use ironfixp_codec::MessageCodec;
use ironfixp_core::{ConfigError, FixpError, TransportError};
use ironfixp_session::{SessionConfig, SessionState};
use ironfixp_transport::Connector;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};

/// Session initiator with constant-interval reconnect.
pub struct Initiator<C: MessageCodec, A> {
    config: Arc<SessionConfig>,
    connector: Arc<dyn Connector>,
    codec: Arc<C>,
    application: Arc<A>,
    state_tx: watch::Sender<SessionState>,
}

impl<C, A> Initiator<C, A>
where
    C: MessageCodec,
    A: Application<C::Message>,
{
    /// Creates an initiator.
    ///
    /// Prefer [`EngineBuilder`](crate::EngineBuilder), which also picks a
    /// connector for the endpoint.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if an interval or timeout is zero.
    pub fn new(
        config: SessionConfig,
        connector: Arc<dyn Connector>,
        codec: C,
        application: Arc<A>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (state_tx, _) = watch::channel(SessionState::Disconnected);
        Ok(Self {
            config: Arc::new(config),
            connector,
            codec: Arc::new(codec),
            application,
            state_tx,
        })
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Subscribes to session state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Runs the reconnect loop until `shutdown` is cancelled.
    ///
    /// The first attempt starts immediately. After any failure the loop
    /// waits `reconnect_interval` and tries again; there is no attempt limit.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut attempt = 0u64;

        loop {
            attempt += 1;
            let span = info_span!("connection", attempt, endpoint = %self.connector.describe());
            let result = self.attempt(attempt, &shutdown).instrument(span).await;
            self.state_tx.send_replace(SessionState::Disconnected);

            if let Err(err) = result {
                warn!(attempt, kind = err.kind(), error = %err, "connection attempt failed");
                self.application.on_disconnect(&err).await;
            }
            if shutdown.is_cancelled() {
                break;
            }

            info!(
                delay_ms = u64::try_from(self.config.reconnect_interval.as_millis()).unwrap_or(u64::MAX),
                "reconnecting"
            );
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                () = sleep(self.config.reconnect_interval) => {}
            }
        }

        self.state_tx.send_replace(SessionState::Disconnected);
        info!(attempts = attempt, "initiator stopped");
    }

    async fn attempt(&self, attempt: u64, shutdown: &CancellationToken) -> Result<(), FixpError> {
        let connect = timeout(self.config.connect_timeout, self.connector.connect());
        let connection = tokio::select! {
            biased;
            () = shutdown.cancelled() => return Ok(()),
            res = connect => match res {
                Ok(connection) => connection?,
                Err(_) => {
                    return Err(TransportError::ConnectTimeout {
                        endpoint: self.connector.describe(),
                        timeout_ms: u64::try_from(self.config.connect_timeout.as_millis())
                            .unwrap_or(u64::MAX),
                    }
                    .into());
                }
            },
        };
        info!(peer = connection.peer(), "transport connected");

        ConnectionRunner::new(
            Arc::clone(&self.config),
            Arc::clone(&self.codec),
            Arc::clone(&self.application),
            self.state_tx.clone(),
            attempt,
        )
        .run(connection, shutdown.clone())
        .await
    }

    /// Spawns the reconnect loop on the current runtime.
    #[must_use]
    pub fn spawn(self) -> InitiatorHandle {
        let shutdown = CancellationToken::new();
        let state_rx = self.state_receiver();
        let token = shutdown.clone();
        let task = tokio::spawn(async move { self.run(token).await });
        InitiatorHandle {
            shutdown,
            state_rx,
            task,
        }
    }
}

/// Handle to a spawned [`Initiator`].
#[derive(Debug)]
pub struct InitiatorHandle {
    shutdown: CancellationToken,
    state_rx: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl InitiatorHandle {
    /// Returns the current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Subscribes to session state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Returns a token that stops the initiator when cancelled.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stops the initiator and waits for the live connection to close.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "initiator task failed");
        }
    }
}
