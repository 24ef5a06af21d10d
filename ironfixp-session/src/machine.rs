/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! The session handshake state machine.
//!
//! [`SessionMachine`] is pure: it consumes inbound administrative messages
//! and returns what to send next, without touching the connection. One
//! machine lives for exactly one connection attempt.
//!
//! ```text
//! Disconnected --connect--> Negotiating --NegotiationResponse--> Establishing
//!                                |                                   |
//!                          NegotiationReject                 EstablishmentAck
//!                                v                                   v
//!                           Terminated <---- any failure ----- Established
//! ```

use crate::state::{SessionIdentity, SessionState};
use ironfixp_core::{
    AdminMessage, Credentials, Establish, Negotiate, ProtocolError, Timestamp,
};
use std::time::Duration;
use tracing::debug;

/// What the connection runner must do after an inbound administrative message.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Send this message.
    Send(AdminMessage),
    /// The session just became established.
    Established,
    /// Nothing to do.
    Ignore,
}

/// Handshake state machine for one connection attempt.
#[derive(Debug)]
pub struct SessionMachine {
    state: SessionState,
    identity: SessionIdentity,
    credentials: Credentials,
    heartbeat_interval: Duration,
}

impl SessionMachine {
    /// Creates a machine in `Disconnected` with a fresh identity.
    ///
    /// # Arguments
    /// * `credentials` - Credentials presented in `Negotiate`
    /// * `heartbeat_interval` - Local heartbeat interval; twice this is advertised in `Establish`
    #[must_use]
    pub fn new(credentials: Credentials, heartbeat_interval: Duration) -> Self {
        Self {
            state: SessionState::Disconnected,
            identity: SessionIdentity::fresh(),
            credentials,
            heartbeat_interval,
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the session identity.
    #[must_use]
    pub const fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    /// Returns the keepalive interval advertised in `Establish`, in milliseconds.
    #[must_use]
    pub fn keepalive_interval_ms(&self) -> u64 {
        u64::try_from(self.heartbeat_interval.saturating_mul(2).as_millis()).unwrap_or(u64::MAX)
    }

    /// Handles a successful transport connect.
    ///
    /// Moves to `Negotiating` and returns the `Negotiate` message, which must
    /// be the first frame sent.
    ///
    /// # Errors
    /// Returns `ProtocolError::UnexpectedMessage` unless the machine is
    /// `Disconnected`.
    pub fn on_connected(&mut self) -> Result<AdminMessage, ProtocolError> {
        if self.state != SessionState::Disconnected {
            return Err(self.unexpected("connect"));
        }
        self.transition(SessionState::Negotiating);
        Ok(AdminMessage::Negotiate(Negotiate {
            session_key: self.identity.session_key(),
            timestamp: Timestamp::now(),
            client_flow: self.identity.flow_type(),
            credentials: self.credentials.clone(),
        }))
    }

    /// Handles an inbound administrative message.
    ///
    /// # Errors
    /// Returns `ProtocolError` for rejects, `Terminate`, a
    /// `NegotiationResponse` without a session identifier, or a message that
    /// is not valid in the current state. The machine is `Terminated`
    /// afterwards.
    pub fn on_admin(&mut self, message: AdminMessage) -> Result<Transition, ProtocolError> {
        use SessionState::*;

        match (self.state, message) {
            (Disconnected | Terminated, other) => Err(self.unexpected(other.kind().as_str())),

            (_, AdminMessage::Terminate(terminate)) => Err(self.fail(ProtocolError::Terminated {
                reason: terminate.reason.unwrap_or_default(),
            })),

            (Negotiating, AdminMessage::NegotiationResponse(response)) => {
                let Some(session_id) = response.session_id.filter(|id| !id.is_empty()) else {
                    return Err(self.fail(ProtocolError::MissingField {
                        message: "NegotiationResponse",
                        field: "SessionId",
                    }));
                };
                self.identity.assign_session_id(session_id.clone());
                self.transition(Establishing);
                Ok(Transition::Send(AdminMessage::Establish(Establish {
                    session_id,
                    timestamp: Timestamp::now(),
                    keepalive_interval: self.keepalive_interval_ms(),
                })))
            }

            (Negotiating, AdminMessage::NegotiationReject(reject)) => {
                Err(self.fail(ProtocolError::NegotiationRejected {
                    reason: reject.reason.unwrap_or_default(),
                }))
            }

            (Establishing, AdminMessage::EstablishmentAck(_)) => {
                self.transition(Established);
                Ok(Transition::Established)
            }

            (Establishing, AdminMessage::EstablishmentReject(reject)) => {
                Err(self.fail(ProtocolError::EstablishmentRejected {
                    reason: reject.reason.unwrap_or_default(),
                }))
            }

            (Negotiating | Establishing, AdminMessage::UnsequencedHeartbeat) => Ok(Transition::Ignore),

            (Established, other) => {
                debug!(message = %other.kind(), "dropping administrative message");
                Ok(Transition::Ignore)
            }

            (_, other) => Err(self.unexpected(other.kind().as_str())),
        }
    }

    /// Checks that an application message may be delivered.
    ///
    /// # Errors
    /// Returns `ProtocolError::UnexpectedMessage` before `Established`; the
    /// machine is `Terminated` afterwards.
    pub fn on_application(&mut self, msg_type: &str) -> Result<(), ProtocolError> {
        if self.state.is_established() {
            Ok(())
        } else {
            Err(self.unexpected(msg_type))
        }
    }

    /// Ends the attempt.
    pub fn terminate(&mut self) {
        self.transition(SessionState::Terminated);
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "session state change");
            self.state = next;
        }
    }

    fn unexpected(&mut self, message: &str) -> ProtocolError {
        let err = ProtocolError::UnexpectedMessage {
            state: self.state.to_string(),
            message: message.to_string(),
        };
        self.fail(err)
    }

    fn fail(&mut self, err: ProtocolError) -> ProtocolError {
        self.terminate();
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironfixp_core::{
        EstablishmentAck, EstablishmentReject, NegotiationReject, NegotiationResponse, Terminate,
    };

    fn machine() -> SessionMachine {
        SessionMachine::new(Credentials::login("user", "pw"), Duration::from_secs(1))
    }

    fn response(id: &str) -> AdminMessage {
        AdminMessage::NegotiationResponse(NegotiationResponse {
            session_id: Some(id.to_string()),
            ..Default::default()
        })
    }

    fn established() -> SessionMachine {
        let mut m = machine();
        m.on_connected().unwrap();
        m.on_admin(response("S1")).unwrap();
        m.on_admin(AdminMessage::EstablishmentAck(EstablishmentAck::default()))
            .unwrap();
        m
    }

    #[test]
    fn test_negotiate_on_connect() {
        let mut m = machine();
        let negotiate = m.on_connected().unwrap();

        assert_eq!(m.state(), SessionState::Negotiating);
        match negotiate {
            AdminMessage::Negotiate(n) => {
                assert_eq!(n.session_key, m.identity().session_key());
                assert_eq!(n.credentials.expose_token(), "user:pw");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(m.on_connected().is_err());
    }

    #[test]
    fn test_establish_carries_session_id_and_keepalive() {
        let mut m = machine();
        m.on_connected().unwrap();

        match m.on_admin(response("S1")).unwrap() {
            Transition::Send(AdminMessage::Establish(establish)) => {
                assert_eq!(establish.session_id, "S1");
                assert_eq!(establish.keepalive_interval, 2_000);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(m.state(), SessionState::Establishing);
        assert_eq!(m.identity().session_id(), Some("S1"));
    }

    #[test]
    fn test_establishment_ack() {
        let m = established();
        assert_eq!(m.state(), SessionState::Established);
    }

    #[test]
    fn test_missing_session_id() {
        let mut m = machine();
        m.on_connected().unwrap();

        let err = m.on_admin(response("")).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField { field: "SessionId", .. }));
        assert_eq!(m.state(), SessionState::Terminated);
    }

    #[test]
    fn test_negotiation_reject() {
        let mut m = machine();
        m.on_connected().unwrap();

        let err = m
            .on_admin(AdminMessage::NegotiationReject(NegotiationReject {
                session_id: None,
                reason: Some("bad credentials".to_string()),
            }))
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::NegotiationRejected {
                reason: "bad credentials".to_string()
            }
        );
        assert_eq!(m.state(), SessionState::Terminated);
    }

    #[test]
    fn test_establishment_reject() {
        let mut m = machine();
        m.on_connected().unwrap();
        m.on_admin(response("S1")).unwrap();

        let err = m
            .on_admin(AdminMessage::EstablishmentReject(EstablishmentReject::default()))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::EstablishmentRejected { .. }));
    }

    #[test]
    fn test_ack_before_response_is_unexpected() {
        let mut m = machine();
        m.on_connected().unwrap();

        let err = m
            .on_admin(AdminMessage::EstablishmentAck(EstablishmentAck::default()))
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::UnexpectedMessage {
                state: "Negotiating".to_string(),
                message: "EstablishmentAck".to_string(),
            }
        );
        assert_eq!(m.state(), SessionState::Terminated);
    }

    #[test]
    fn test_application_before_established() {
        let mut m = machine();
        m.on_connected().unwrap();
        assert!(m.on_application("ExecutionReport").is_err());
        assert_eq!(m.state(), SessionState::Terminated);

        let mut m = established();
        assert!(m.on_application("ExecutionReport").is_ok());
    }

    #[test]
    fn test_heartbeats_ignored() {
        let mut m = machine();
        m.on_connected().unwrap();
        assert!(matches!(
            m.on_admin(AdminMessage::UnsequencedHeartbeat),
            Ok(Transition::Ignore)
        ));

        let mut m = established();
        assert!(matches!(
            m.on_admin(AdminMessage::UnsequencedHeartbeat),
            Ok(Transition::Ignore)
        ));
        assert!(matches!(m.on_admin(response("S2")), Ok(Transition::Ignore)));
        assert_eq!(m.identity().session_id(), Some("S1"));
    }

    #[test]
    fn test_terminate_in_any_state() {
        let mut m = established();
        let err = m
            .on_admin(AdminMessage::Terminate(Terminate {
                session_id: Some("S1".to_string()),
                reason: Some("end of day".to_string()),
            }))
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Terminated {
                reason: "end of day".to_string()
            }
        );
        assert_eq!(m.state(), SessionState::Terminated);
        assert!(m.on_admin(AdminMessage::UnsequencedHeartbeat).is_err());
    }

    #[test]
    fn test_establish_never_precedes_response() {
        // Feed every non-response admin message first; none may yield Establish.
        let inputs = [
            AdminMessage::UnsequencedHeartbeat,
            AdminMessage::EstablishmentAck(EstablishmentAck::default()),
            AdminMessage::EstablishmentReject(EstablishmentReject::default()),
            AdminMessage::Terminate(Terminate::default()),
            AdminMessage::NegotiationReject(NegotiationReject::default()),
        ];
        for first in inputs {
            let mut m = machine();
            m.on_connected().unwrap();
            let result = m.on_admin(first);
            assert!(!matches!(
                result,
                Ok(Transition::Send(AdminMessage::Establish(_)))
            ));
        }
    }

    #[test]
    fn test_fresh_key_per_machine() {
        let mut a = machine();
        let mut b = machine();
        let (AdminMessage::Negotiate(na), AdminMessage::Negotiate(nb)) =
            (a.on_connected().unwrap(), b.on_connected().unwrap())
        else {
            panic!("expected Negotiate");
        };
        assert_ne!(na.session_key, nb.session_key);
    }
}
