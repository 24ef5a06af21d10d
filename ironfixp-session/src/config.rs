/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session configuration.
//!
//! Configuration is supplied once at startup and shared read-only by every
//! connection attempt.

use ironfixp_core::{ConfigError, Credentials};
use ironfixp_transport::Endpoint;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Environment variable holding the endpoint URL.
pub const ENV_URL: &str = "FIXP_URL";
/// Environment variable holding the login user name.
pub const ENV_USERNAME: &str = "FIXP_USERNAME";
/// Environment variable holding the login password.
pub const ENV_PASSWORD: &str = "FIXP_PASSWORD";
/// Environment variable holding the trading account.
pub const ENV_ACCOUNT: &str = "FIXP_ACCOUNT";
/// Environment variable holding the heartbeat interval in milliseconds.
pub const ENV_HEARTBEAT_INTERVAL_MS: &str = "FIXP_HEARTBEAT_INTERVAL_MS";
/// Environment variable holding the reconnect interval in milliseconds.
pub const ENV_RECONNECT_INTERVAL_MS: &str = "FIXP_RECONNECT_INTERVAL_MS";

/// Configuration for a FIXP session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Where to connect.
    pub endpoint: Endpoint,
    /// Credentials presented in `Negotiate`.
    pub credentials: Credentials,
    /// Account handed to application handlers.
    pub account: Option<String>,
    /// Interval between outbound heartbeats.
    pub heartbeat_interval: Duration,
    /// Delay between a failed attempt and the next one.
    pub reconnect_interval: Duration,
    /// Upper bound on opening the transport.
    pub connect_timeout: Duration,
    /// Upper bound from connect to `EstablishmentAck`.
    pub handshake_timeout: Duration,
    /// Maximum silence from the peer once established. `None` disables the check.
    pub peer_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Creates a configuration with default timings.
    ///
    /// # Arguments
    /// * `endpoint` - The peer endpoint
    /// * `credentials` - Credentials presented in `Negotiate`
    #[must_use]
    pub fn new(endpoint: Endpoint, credentials: Credentials) -> Self {
        Self {
            endpoint,
            credentials,
            account: None,
            heartbeat_interval: Duration::from_secs(30),
            reconnect_interval: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(10),
            peer_timeout: None,
        }
    }

    /// Sets the account.
    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets the reconnect interval.
    #[must_use]
    pub const fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the handshake timeout.
    #[must_use]
    pub const fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Enables the peer liveness check.
    #[must_use]
    pub const fn with_peer_timeout(mut self, timeout: Duration) -> Self {
        self.peer_timeout = Some(timeout);
        self
    }

    /// Returns the keepalive interval advertised in `Establish`.
    ///
    /// Twice the heartbeat interval, so the peer tolerates one missed beat.
    #[must_use]
    pub fn keepalive_interval(&self) -> Duration {
        self.heartbeat_interval.saturating_mul(2)
    }

    /// Checks the timings.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if an interval or timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("heartbeat_interval", self.heartbeat_interval),
            ("reconnect_interval", self.reconnect_interval),
            ("connect_timeout", self.connect_timeout),
            ("handshake_timeout", self.handshake_timeout),
        ];
        for (setting, value) in non_zero {
            if value.is_zero() {
                return Err(ConfigError::Invalid {
                    setting,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if self.peer_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::Invalid {
                setting: "peer_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Loads the configuration from `FIXP_*` environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError` if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary key lookup.
    ///
    /// # Errors
    /// See [`SessionConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let millis = |key: &'static str| -> Result<Option<Duration>, ConfigError> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map(Duration::from_millis)
                        .map_err(|e| ConfigError::Invalid {
                            setting: key,
                            reason: e.to_string(),
                        })
                })
                .transpose()
        };

        let mut builder = SessionConfigBuilder::new()
            .endpoint(required(ENV_URL)?)
            .login(required(ENV_USERNAME)?, required(ENV_PASSWORD)?);
        if let Some(account) = lookup(ENV_ACCOUNT).filter(|a| !a.is_empty()) {
            builder = builder.account(account);
        }
        if let Some(interval) = millis(ENV_HEARTBEAT_INTERVAL_MS)? {
            builder = builder.heartbeat_interval(interval);
        }
        if let Some(interval) = millis(ENV_RECONNECT_INTERVAL_MS)? {
            builder = builder.reconnect_interval(interval);
        }
        builder.build()
    }
}

/// Builder for [`SessionConfig`].
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<SecretString>,
    credentials: Option<Credentials>,
    account: Option<String>,
    heartbeat_interval: Option<Duration>,
    reconnect_interval: Option<Duration>,
    connect_timeout: Option<Duration>,
    handshake_timeout: Option<Duration>,
    peer_timeout: Option<Duration>,
}

impl SessionConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint URL (`ws://`, `wss://` or `tcp://`).
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets `login` credentials from a user name and password.
    #[must_use]
    pub fn login(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Sets explicit credentials, overriding [`SessionConfigBuilder::login`].
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the account.
    #[must_use]
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Sets the reconnect interval.
    #[must_use]
    pub const fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = Some(interval);
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the handshake timeout.
    #[must_use]
    pub const fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = Some(timeout);
        self
    }

    /// Enables the peer liveness check.
    #[must_use]
    pub const fn peer_timeout(mut self, timeout: Duration) -> Self {
        self.peer_timeout = Some(timeout);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::Missing` if the endpoint or credentials are not
    /// set, and `ConfigError::Invalid` if the endpoint does not parse, the
    /// user name is empty, or a timing is zero.
    pub fn build(self) -> Result<SessionConfig, ConfigError> {
        let raw_endpoint = self.endpoint.ok_or(ConfigError::Missing("endpoint"))?;
        let endpoint: Endpoint = raw_endpoint.parse().map_err(|e: ironfixp_core::TransportError| {
            ConfigError::Invalid {
                setting: "endpoint",
                reason: e.to_string(),
            }
        })?;

        let credentials = match (self.credentials, self.username) {
            (Some(credentials), _) => credentials,
            (None, Some(username)) => {
                if username.trim().is_empty() {
                    return Err(ConfigError::Invalid {
                        setting: "username",
                        reason: "must not be empty".to_string(),
                    });
                }
                let password = self.password.as_ref().map_or("", |p| p.expose_secret());
                Credentials::login(&username, password)
            }
            (None, None) => return Err(ConfigError::Missing("username")),
        };

        let mut config = SessionConfig::new(endpoint, credentials);
        config.account = self.account;
        if let Some(interval) = self.heartbeat_interval {
            config.heartbeat_interval = interval;
        }
        if let Some(interval) = self.reconnect_interval {
            config.reconnect_interval = interval;
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout = timeout;
        }
        if let Some(timeout) = self.handshake_timeout {
            config.handshake_timeout = timeout;
        }
        config.peer_timeout = self.peer_timeout;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::new(
            "wss://demo.example.com/fixp".parse().unwrap(),
            Credentials::login("user", "pw"),
        );

        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(config.reconnect_interval, Duration::from_secs(5));
        assert_eq!(config.keepalive_interval(), Duration::from_secs(60));
        assert_eq!(config.peer_timeout, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfigBuilder::new()
            .endpoint("ws://localhost:8080")
            .login("alice", "s3cret")
            .account("ACC-1")
            .heartbeat_interval(Duration::from_millis(500))
            .reconnect_interval(Duration::from_secs(1))
            .peer_timeout(Duration::from_secs(3))
            .build()
            .unwrap();

        assert_eq!(config.credentials.expose_token(), "alice:s3cret");
        assert_eq!(config.account.as_deref(), Some("ACC-1"));
        assert_eq!(config.keepalive_interval(), Duration::from_secs(1));
        assert_eq!(config.peer_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_builder_rejects_bad_input() {
        assert_eq!(
            SessionConfigBuilder::new().login("u", "p").build().unwrap_err(),
            ConfigError::Missing("endpoint")
        );
        assert_eq!(
            SessionConfigBuilder::new().endpoint("ws://x").build().unwrap_err(),
            ConfigError::Missing("username")
        );
        assert!(matches!(
            SessionConfigBuilder::new().endpoint("ftp://x").login("u", "p").build(),
            Err(ConfigError::Invalid { setting: "endpoint", .. })
        ));
        assert!(matches!(
            SessionConfigBuilder::new().endpoint("ws://x").login(" ", "p").build(),
            Err(ConfigError::Invalid { setting: "username", .. })
        ));
        assert!(matches!(
            SessionConfigBuilder::new()
                .endpoint("ws://x")
                .login("u", "p")
                .heartbeat_interval(Duration::ZERO)
                .build(),
            Err(ConfigError::Invalid { setting: "heartbeat_interval", .. })
        ));
    }

    #[test]
    fn test_from_lookup() {
        let config = SessionConfig::from_lookup(lookup(&[
            (ENV_URL, "tcp://127.0.0.1:9880"),
            (ENV_USERNAME, "bob"),
            (ENV_PASSWORD, "pw"),
            (ENV_ACCOUNT, "ACC-9"),
            (ENV_HEARTBEAT_INTERVAL_MS, "1500"),
        ]))
        .unwrap();

        assert!(!config.endpoint.is_websocket());
        assert_eq!(config.account.as_deref(), Some("ACC-9"));
        assert_eq!(config.heartbeat_interval, Duration::from_millis(1500));
        assert_eq!(config.reconnect_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_errors() {
        assert_eq!(
            SessionConfig::from_lookup(lookup(&[(ENV_USERNAME, "bob")])).unwrap_err(),
            ConfigError::Missing(ENV_URL)
        );
        assert!(matches!(
            SessionConfig::from_lookup(lookup(&[
                (ENV_URL, "ws://x"),
                (ENV_USERNAME, "bob"),
                (ENV_PASSWORD, "pw"),
                (ENV_RECONNECT_INTERVAL_MS, "soon"),
            ])),
            Err(ConfigError::Invalid { setting: ENV_RECONNECT_INTERVAL_MS, .. })
        ));
    }
}
