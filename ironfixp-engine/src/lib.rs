/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # IronFixp Engine
//!
//! Reconnecting FIXP session initiator.
//!
//! This crate provides:
//! - **Initiator**: The reconnect supervisor; one live connection at a time, constant retry interval
//! - **Connection runner**: Handshake, inbound dispatch, heartbeats and a single serialized writer per connection
//! - **Application trait**: Callback interface for application messages
//! - **Builder API**: Fluent configuration for engine setup

pub mod application;
pub mod builder;
pub mod connection;
pub mod initiator;

pub use application::{Application, NoOpApplication, SessionContext};
pub use builder::EngineBuilder;
pub use initiator::{Initiator, InitiatorHandle};
