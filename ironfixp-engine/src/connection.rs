/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! One connection attempt, from the first `Negotiate` to teardown.
//!
//! Three activities share the connection:
//! - the reader, which decodes frames and drives the [`SessionMachine`]
//! - the heartbeat task, started once established
//! - the writer task, the only owner of the outbound sink
//!
//! Reader and heartbeat push encoded frames into one bounded queue that the
//! writer drains, so frames are never interleaved. All three share a
//! cancellation token that is cancelled on every exit path.

use crate::application::{Application, SessionContext};
use futures::{SinkExt, StreamExt};
use ironfixp_codec::MessageCodec;
use ironfixp_core::{
    AdminMessage, FixpError, Frame, InboundEnvelope, Outbound, ProtocolError, TransportError,
};
use ironfixp_session::{
    HeartbeatScheduler, PeerLiveness, SessionConfig, SessionMachine, SessionState, Transition,
};
use ironfixp_transport::{Connection, FrameSink, FrameStream};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Capacity of the outbound frame queue.
const OUTBOUND_CAPACITY: usize = 256;

/// How long the writer may take to flush and close after the reader stops.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Runs one connection attempt.
pub struct ConnectionRunner<C: MessageCodec, A> {
    config: Arc<SessionConfig>,
    codec: Arc<C>,
    application: Arc<A>,
    state_tx: watch::Sender<SessionState>,
    attempt: u64,
}

impl<C, A> ConnectionRunner<C, A>
where
    C: MessageCodec,
    A: Application<C::Message>,
{
    /// Creates a runner for attempt number `attempt`.
    #[must_use]
    pub fn new(
        config: Arc<SessionConfig>,
        codec: Arc<C>,
        application: Arc<A>,
        state_tx: watch::Sender<SessionState>,
        attempt: u64,
    ) -> Self {
        Self {
            config,
            codec,
            application,
            state_tx,
            attempt,
        }
    }

    /// Runs the session over `connection` until it fails or `token` is cancelled.
    ///
    /// The connection is closed before this returns.
    ///
    /// # Errors
    /// Returns the first transport, codec, protocol or handler error. `Ok`
    /// means the token was cancelled.
    pub async fn run(&self, connection: Connection, token: CancellationToken) -> Result<(), FixpError> {
        let token = token.child_token();
        let _guard = token.clone().drop_guard();

        let (sink, stream) = connection.into_split();
        let (out_tx, out_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let mut writer = tokio::spawn(write_frames(sink, out_rx, token.clone()));
        let mut machine = SessionMachine::new(
            self.config.credentials.clone(),
            self.config.heartbeat_interval,
        );

        let mut writer_done = false;
        let result = tokio::select! {
            biased;
            res = self.drive(&mut machine, stream, &out_tx, &token) => res,
            res = &mut writer => {
                writer_done = true;
                writer_outcome(res, &token)
            }
        };

        machine.terminate();
        self.state_tx.send_replace(machine.state());
        token.cancel();
        drop(out_tx);

        if !writer_done {
            match timeout(CLOSE_GRACE, &mut writer).await {
                Ok(Ok(Err(e))) => debug!(error = %e, "error while closing connection"),
                Ok(_) => {}
                Err(_) => {
                    debug!("connection close timed out");
                    writer.abort();
                }
            }
        }

        result
    }

    async fn drive(
        &self,
        machine: &mut SessionMachine,
        mut stream: FrameStream,
        out_tx: &mpsc::Sender<Frame>,
        token: &CancellationToken,
    ) -> Result<(), FixpError> {
        let started = Instant::now();
        let handshake_deadline = started + self.config.handshake_timeout;
        let mut liveness = PeerLiveness::new(self.config.peer_timeout);
        let mut context: Option<SessionContext> = None;

        let negotiate = machine.on_connected()?;
        self.state_tx.send_replace(machine.state());
        self.send(out_tx, &Outbound::Admin(negotiate)).await?;
        info!(session_key = %machine.identity().session_key(), "negotiate sent");

        loop {
            let handshaking = machine.state().is_handshaking();
            let peer_deadline = if handshaking { None } else { liveness.deadline() };

            let frame = tokio::select! {
                biased;
                () = token.cancelled() => return Ok(()),
                () = sleep_until(handshake_deadline), if handshaking => {
                    return Err(ProtocolError::HandshakeTimeout {
                        state: machine.state().to_string(),
                        elapsed_ms: millis(started.elapsed()),
                    }
                    .into());
                }
                () = sleep_until_opt(peer_deadline), if peer_deadline.is_some() => {
                    return Err(ProtocolError::PeerTimeout {
                        elapsed_ms: millis(liveness.silence()),
                    }
                    .into());
                }
                next = stream.next() => match next {
                    Some(Ok(frame)) => frame,
                    Some(Err(e)) => return Err(e.into()),
                    None => return Err(TransportError::Closed.into()),
                },
            };
            liveness.on_received();
            trace!(len = frame.len(), "frame received");

            match self.codec.decode(&frame)? {
                InboundEnvelope::Admin(admin) => {
                    trace!(message = %admin.kind(), "administrative message");
                    match machine.on_admin(admin)? {
                        Transition::Send(reply) => {
                            self.state_tx.send_replace(machine.state());
                            self.send(out_tx, &Outbound::Admin(reply)).await?;
                            info!(
                                session_id = machine.identity().session_id().unwrap_or_default(),
                                "establish sent"
                            );
                        }
                        Transition::Established => {
                            let ctx = SessionContext::new(
                                machine.identity().session_id().unwrap_or_default(),
                                machine.identity().session_key(),
                                self.config.account.clone(),
                                self.attempt,
                            );
                            self.state_tx.send_replace(machine.state());
                            info!(session_id = ctx.session_id(), "session established");

                            let beat = self.codec.encode_admin(AdminMessage::UnsequencedHeartbeat)?;
                            HeartbeatScheduler::new(self.config.heartbeat_interval, beat)
                                .spawn(out_tx.clone(), token.clone());

                            let initial = self.application.on_established(&ctx).await?;
                            self.send_all(out_tx, initial).await?;
                            context = Some(ctx);
                        }
                        Transition::Ignore => {}
                    }
                }
                InboundEnvelope::Application { msg_type, message } => {
                    machine.on_application(&msg_type)?;
                    if let Some(ctx) = context.as_ref() {
                        trace!(%msg_type, "dispatching application message");
                        let replies = self.application.on_message(ctx, &msg_type, message).await?;
                        self.send_all(out_tx, replies).await?;
                    }
                }
                InboundEnvelope::Unspecified(_) => {
                    warn!(len = frame.len(), "dropping frame without a message type");
                }
            }
        }
    }

    async fn send(&self, out_tx: &mpsc::Sender<Frame>, message: &Outbound<C::Message>) -> Result<(), FixpError> {
        let frame = self.codec.encode(message)?;
        out_tx.send(frame).await.map_err(|_| TransportError::Closed)?;
        Ok(())
    }

    async fn send_all(&self, out_tx: &mpsc::Sender<Frame>, messages: Vec<C::Message>) -> Result<(), FixpError> {
        for message in messages {
            self.send(out_tx, &Outbound::Application(message)).await?;
        }
        Ok(())
    }
}

/// Drains the outbound queue into the sink, then closes it.
///
/// Frames already queued when the token is cancelled are still written.
async fn write_frames(
    mut sink: FrameSink,
    mut rx: mpsc::Receiver<Frame>,
    token: CancellationToken,
) -> Result<(), TransportError> {
    loop {
        let frame = tokio::select! {
            biased;
            frame = rx.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
            () = token.cancelled() => break,
        };
        trace!(len = frame.len(), "frame sent");
        sink.send(frame).await?;
    }
    sink.close().await
}

fn writer_outcome(
    res: Result<Result<(), TransportError>, tokio::task::JoinError>,
    token: &CancellationToken,
) -> Result<(), FixpError> {
    match res {
        Ok(Ok(())) if token.is_cancelled() => Ok(()),
        Ok(Ok(())) => Err(TransportError::Closed.into()),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(TransportError::Io(e.to_string()).into()),
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
