/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronFixp Session
//!
//! FIXP session layer for the IronFixp client.
//!
//! This crate provides:
//! - **State machine**: Negotiate / Establish handshake and inbound classification
//! - **Heartbeat handling**: Fixed-interval `UnsequencedHeartbeat` emission and optional peer liveness
//! - **Configuration**: Session configuration, builder and environment loading
//!
//! Nothing here performs I/O; the engine crate drives these types over a
//! live connection.

pub mod config;
pub mod heartbeat;
pub mod machine;
pub mod state;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use heartbeat::{HeartbeatScheduler, PeerLiveness};
pub use machine::{SessionMachine, Transition};
pub use state::{SessionIdentity, SessionState};
