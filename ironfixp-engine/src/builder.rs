/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Engine builder for fluent configuration.
//!
//! This module provides a builder API for assembling an [`Initiator`] from a
//! session configuration, a codec and an application.

use crate::application::{Application, NoOpApplication};
use crate::initiator::Initiator;
use ironfixp_codec::{JsonCodec, MessageCodec};
use ironfixp_core::{ConfigError, FixpError};
use ironfixp_session::SessionConfig;
use ironfixp_transport::{Connector, connector_for};
use std::sync::Arc;

/// Builder for configuring a FIXP session initiator.
pub struct EngineBuilder<C = JsonCodec, A = NoOpApplication> {
    /// Session configuration.
    config: Option<SessionConfig>,
    /// Wire codec.
    codec: C,
    /// Application callback handler.
    application: Arc<A>,
    /// Overrides the connector derived from the endpoint.
    connector: Option<Arc<dyn Connector>>,
}

impl Default for EngineBuilder<JsonCodec, NoOpApplication> {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder<JsonCodec, NoOpApplication> {
    /// Creates a builder with the JSON codec and no application handler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            codec: JsonCodec::new(),
            application: Arc::new(NoOpApplication),
            connector: None,
        }
    }
}

impl<C, A> EngineBuilder<C, A>
where
    C: MessageCodec,
    A: Application<C::Message>,
{
    /// Sets the session configuration.
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the wire codec.
    #[must_use]
    pub fn with_codec<D: MessageCodec>(self, codec: D) -> EngineBuilder<D, A> {
        EngineBuilder {
            config: self.config,
            codec,
            application: self.application,
            connector: self.connector,
        }
    }

    /// Sets the application callback handler.
    #[must_use]
    pub fn with_application<B>(self, application: B) -> EngineBuilder<C, B> {
        self.with_shared_application(Arc::new(application))
    }

    /// Sets an application handler the caller keeps a reference to.
    #[must_use]
    pub fn with_shared_application<B>(self, application: Arc<B>) -> EngineBuilder<C, B> {
        EngineBuilder {
            config: self.config,
            codec: self.codec,
            application,
            connector: self.connector,
        }
    }

    /// Uses `connector` instead of the one derived from the endpoint.
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Returns the configuration, if set.
    #[must_use]
    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    /// Returns the codec.
    #[must_use]
    pub const fn codec(&self) -> &C {
        &self.codec
    }

    /// Builds the initiator.
    ///
    /// # Errors
    /// Returns `ConfigError` if no configuration was given, the configuration
    /// is invalid, or a TCP endpoint is paired with a codec other than
    /// tag-value.
    pub fn build(self) -> Result<Initiator<C, A>, FixpError> {
        let config = self.config.ok_or(ConfigError::Missing("config"))?;
        config.validate()?;

        let connector = match self.connector {
            Some(connector) => connector,
            None => {
                if !config.endpoint.is_websocket() && self.codec.name() != "tagvalue" {
                    return Err(ConfigError::Invalid {
                        setting: "codec",
                        reason: format!("{} codec cannot be framed over TCP", self.codec.name()),
                    }
                    .into());
                }
                connector_for(&config.endpoint)
            }
        };

        Ok(Initiator::new(config, connector, self.codec, self.application)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironfixp_codec::TagValueCodec;
    use ironfixp_core::Credentials;
    use ironfixp_session::SessionState;
    use ironfixp_transport::memory_transport;
    use std::time::Duration;

    fn config(endpoint: &str) -> SessionConfig {
        SessionConfig::new(endpoint.parse().unwrap(), Credentials::login("user", "pass"))
    }

    #[test]
    fn test_engine_builder_default() {
        let builder = EngineBuilder::new();
        assert!(builder.config().is_none());
        assert_eq!(builder.codec().name(), "json");
    }

    #[test]
    fn test_build_requires_config() {
        let err = EngineBuilder::new().build().err().unwrap();
        assert!(matches!(err, FixpError::Config(ConfigError::Missing("config"))));
    }

    #[test]
    fn test_build_validates_config() {
        let config = config("ws://127.0.0.1:9").with_heartbeat_interval(Duration::ZERO);
        let err = EngineBuilder::new().with_config(config).build().err().unwrap();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_tcp_requires_tagvalue_codec() {
        let err = EngineBuilder::new()
            .with_config(config("tcp://127.0.0.1:9876"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            FixpError::Config(ConfigError::Invalid { setting: "codec", .. })
        ));

        let initiator = EngineBuilder::new()
            .with_config(config("tcp://127.0.0.1:9876"))
            .with_codec(TagValueCodec::default())
            .build()
            .unwrap();
        assert_eq!(initiator.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_connector_override() {
        let (connector, _acceptor) = memory_transport("builder");
        let initiator = EngineBuilder::new()
            .with_config(config("tcp://127.0.0.1:9876"))
            .with_connector(Arc::new(connector))
            .build()
            .unwrap();
        assert_eq!(initiator.config().endpoint.to_string(), "tcp://127.0.0.1:9876");
    }
}
