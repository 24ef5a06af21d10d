/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Core types for FIXP session operations.
//!
//! This module provides fundamental types used throughout the IronFixp client:
//! - [`Timestamp`]: Send-time with nanosecond precision
//! - [`SessionKey`]: Client-generated negotiation correlation token
//! - [`FlowType`]: Delivery-ordering mode of a session flow
//! - [`Credentials`]: Login credentials carried by `Negotiate`

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Send-time with nanosecond precision.
///
/// On the wire this is the number of nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp {
    /// Nanoseconds since Unix epoch (1970-01-01 00:00:00 UTC).
    nanos_since_epoch: u64,
}

impl Timestamp {
    /// Creates a timestamp from nanoseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self {
            nanos_since_epoch: nanos,
        }
    }

    /// Creates a timestamp from milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            nanos_since_epoch: millis * 1_000_000,
        }
    }

    /// Returns the current UTC time.
    #[inline]
    #[must_use]
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Returns nanoseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos_since_epoch
    }

    /// Returns milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.nanos_since_epoch / 1_000_000
    }

    /// Converts to a chrono `DateTime<Utc>`.
    #[must_use]
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(i64::try_from(self.nanos_since_epoch).unwrap_or(i64::MAX))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        let nanos = dt.timestamp_nanos_opt().unwrap_or(0).max(0);
        Self::from_nanos(u64::try_from(nanos).unwrap_or(0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().format("%Y%m%d-%H:%M:%S%.9f"))
    }
}

/// Negotiation key sent in `Negotiate`.
///
/// A fresh key is generated for every connection attempt so that the peer can
/// correlate its response with exactly one negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(Uuid);

impl SessionKey {
    /// Generates a new random key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for SessionKey {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::str::FromStr for SessionKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery-ordering mode of a session flow.
///
/// Only unsequenced flows are supported: no gap detection and no replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlowType {
    /// Messages carry no sequence numbers and are never retransmitted.
    #[default]
    Unsequenced,
}

impl FlowType {
    /// Returns the wire name of the flow type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unsequenced => "Unsequenced",
        }
    }
}

impl std::str::FromStr for FlowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unsequenced" => Ok(Self::Unsequenced),
            other => Err(format!("unsupported flow type '{other}'")),
        }
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Login credentials presented in `Negotiate`.
///
/// The token is kept in a [`SecretString`]; `Debug` output never shows it.
#[derive(Serialize, Deserialize)]
pub struct Credentials {
    /// Credentials type, e.g. `"login"`.
    #[serde(rename = "CredentialsType")]
    kind: String,
    /// Opaque credential value.
    #[serde(
        rename = "Token",
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    token: SecretString,
}

impl Credentials {
    /// Credentials type used for username/password logins.
    pub const LOGIN: &'static str = "login";

    /// Creates credentials with an explicit type and token.
    #[must_use]
    pub fn new(kind: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            token: SecretString::from(token.into()),
        }
    }

    /// Creates `login` credentials whose token is `username:password`.
    #[must_use]
    pub fn login(username: &str, password: &str) -> Self {
        Self::new(Self::LOGIN, format!("{username}:{password}"))
    }

    /// Returns the credentials type.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the secret token.
    ///
    /// Only the codecs should need this.
    #[must_use]
    pub fn expose_token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self::new(self.kind.clone(), self.expose_token())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("kind", &self.kind)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

fn serialize_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn deserialize_secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversions() {
        let ts = Timestamp::from_millis(1_700_000_000_123);
        assert_eq!(ts.as_nanos(), 1_700_000_000_123_000_000);
        assert_eq!(ts.as_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_timestamp_display() {
        let ts = Timestamp::from_nanos(1_700_000_000_123_456_789);
        assert_eq!(ts.to_string(), "20231114-22:13:20.123456789");
    }

    #[test]
    fn test_timestamp_saturates_past_chrono_range() {
        let ts = Timestamp::from_nanos(u64::MAX);
        assert_eq!(ts.to_datetime(), DateTime::from_timestamp_nanos(i64::MAX));
        assert_eq!(ts.to_string(), "22620411-23:47:16.854775807");
    }

    #[test]
    fn test_timestamp_serializes_as_nanos() {
        let ts = Timestamp::from_nanos(42);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "42");
    }

    #[test]
    fn test_session_keys_are_fresh() {
        let a = SessionKey::generate();
        let b = SessionKey::generate();
        assert_ne!(a, b);
        assert_eq!(a.to_string().parse::<SessionKey>().unwrap(), a);
        assert!("not-a-uuid".parse::<SessionKey>().is_err());
    }

    #[test]
    fn test_flow_type_parse() {
        assert_eq!("Unsequenced".parse::<FlowType>(), Ok(FlowType::Unsequenced));
        assert!("Recoverable".parse::<FlowType>().is_err());
        assert_eq!(FlowType::default().to_string(), "Unsequenced");
    }

    #[test]
    fn test_login_credentials() {
        let creds = Credentials::login("alice", "s3cret");
        assert_eq!(creds.kind(), "login");
        assert_eq!(creds.expose_token(), "alice:s3cret");
        assert_eq!(creds.clone().expose_token(), "alice:s3cret");
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let creds = Credentials::login("alice", "s3cret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_credentials_json_shape() {
        let creds = Credentials::login("alice", "pw");
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json["CredentialsType"], "login");
        assert_eq!(json["Token"], "alice:pw");

        let back: Credentials = serde_json::from_value(json).unwrap();
        assert_eq!(back.expose_token(), "alice:pw");
    }
}
