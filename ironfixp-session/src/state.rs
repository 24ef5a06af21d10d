/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session state and identity.

use ironfixp_core::{FlowType, SessionKey};
use std::fmt;

/// Lifecycle state of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No transport connection.
    #[default]
    Disconnected,
    /// `Negotiate` sent, waiting for the response.
    Negotiating,
    /// `Establish` sent, waiting for the acknowledgement.
    Establishing,
    /// Session active; application traffic and heartbeats flow.
    Established,
    /// The attempt is over. Terminal.
    Terminated,
}

impl SessionState {
    /// Returns the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Negotiating => "Negotiating",
            Self::Establishing => "Establishing",
            Self::Established => "Established",
            Self::Terminated => "Terminated",
        }
    }

    /// Returns true if the session is established.
    #[inline]
    #[must_use]
    pub const fn is_established(self) -> bool {
        matches!(self, Self::Established)
    }

    /// Returns true while the handshake is in progress.
    #[inline]
    #[must_use]
    pub const fn is_handshaking(self) -> bool {
        matches!(self, Self::Negotiating | Self::Establishing)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one negotiated session.
///
/// A fresh identity is created for every connection attempt. The session
/// identifier is filled in once, from `NegotiationResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    session_key: SessionKey,
    session_id: Option<String>,
    flow_type: FlowType,
}

impl SessionIdentity {
    /// Creates an identity with a newly generated session key.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            session_key: SessionKey::generate(),
            session_id: None,
            flow_type: FlowType::Unsequenced,
        }
    }

    /// Returns the negotiation key.
    #[must_use]
    pub const fn session_key(&self) -> SessionKey {
        self.session_key
    }

    /// Returns the session identifier assigned by the peer, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns the flow type.
    #[must_use]
    pub const fn flow_type(&self) -> FlowType {
        self.flow_type
    }

    pub(crate) fn assign_session_id(&mut self, session_id: String) {
        self.session_id = Some(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert_eq!(SessionState::default(), SessionState::Disconnected);
        assert!(SessionState::Negotiating.is_handshaking());
        assert!(SessionState::Establishing.is_handshaking());
        assert!(!SessionState::Established.is_handshaking());
        assert!(SessionState::Established.is_established());
        assert_eq!(SessionState::Terminated.to_string(), "Terminated");
    }

    #[test]
    fn test_fresh_identity() {
        let a = SessionIdentity::fresh();
        let b = SessionIdentity::fresh();

        assert_ne!(a.session_key(), b.session_key());
        assert_eq!(a.session_id(), None);
        assert_eq!(a.flow_type(), FlowType::Unsequenced);
    }
}
