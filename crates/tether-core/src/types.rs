// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by adapters, pools, and the registry.

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::time::Instant;

/// General open/dial timeout applied when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a healthy status may be reused before it is re-verified.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Upper bound on a single liveness ping.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Advisory capacity of a session pool.
pub const DEFAULT_MAX_OPEN: usize = 10;

/// The backend family an adapter talks to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AdapterKind {
    SqlServer,
    Oracle,
    Postgres,
    Mysql,
    Ldap,
    Sftp,
}

impl AdapterKind {
    /// The backend's documented default port.
    ///
    /// LDAP moves to 636 when TLS is requested.
    pub fn default_port(self, tls: bool) -> u16 {
        match self {
            AdapterKind::SqlServer => 1433,
            AdapterKind::Oracle => 1521,
            AdapterKind::Postgres => 5432,
            AdapterKind::Mysql => 3306,
            AdapterKind::Ldap if tls => 636,
            AdapterKind::Ldap => 389,
            AdapterKind::Sftp => 22,
        }
    }

    /// Whether the transport is encrypted when the config does not say.
    pub fn default_tls(self) -> bool {
        matches!(self, AdapterKind::SqlServer | AdapterKind::Sftp)
    }

    /// Name of the field this backend cannot work without.
    pub fn required_field(self) -> &'static str {
        match self {
            AdapterKind::SqlServer | AdapterKind::Postgres | AdapterKind::Mysql => "database",
            AdapterKind::Oracle => "service_name",
            AdapterKind::Ldap => "base_dn",
            AdapterKind::Sftp => "username",
        }
    }

    /// Directory backends lease bound sessions from a pool instead of
    /// holding one handle.
    pub fn is_pooled(self) -> bool {
        matches!(self, AdapterKind::Ldap)
    }
}

/// Last-known operational state of an adapter's connection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HealthState {
    Unknown,
    ValidateFailed,
    OpenFailed,
    PingFailed,
    Timeout,
    NetworkError,
    Healthy,
    Closed,
}

impl HealthState {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            HealthState::ValidateFailed
                | HealthState::OpenFailed
                | HealthState::PingFailed
                | HealthState::Timeout
                | HealthState::NetworkError
        )
    }
}

/// A health state plus the moment it was last recorded.
///
/// `updated_at` is monotonic and drives staleness; `observed_at` is the
/// wall-clock equivalent for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub state: HealthState,
    pub updated_at: Instant,
    pub observed_at: DateTime<Utc>,
}

impl HealthStatus {
    pub fn new(state: HealthState) -> Self {
        Self {
            state,
            updated_at: Instant::now(),
            observed_at: Utc::now(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(HealthState::Unknown)
    }

    pub fn is_healthy(&self) -> bool {
        self.state == HealthState::Healthy
    }

    /// Time elapsed since the status was recorded.
    pub fn age(&self) -> Duration {
        self.updated_at.elapsed()
    }

    /// True once the status is older than `ttl`.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Staleness and ping bounds applied by the lock-upgrade accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    /// A healthy status older than this is re-verified before reuse.
    pub stale_after: Duration,
    /// Deadline for one liveness ping.
    pub ping_timeout: Duration,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            stale_after: DEFAULT_STALE_AFTER,
            ping_timeout: DEFAULT_PING_TIMEOUT,
        }
    }
}

/// Identity and credentials of one configured backend.
///
/// Owned by the adapter. Only `validate` (defaulting) and explicit
/// reconfiguration mutate it.
#[derive(Debug, Clone)]
pub struct AdapterIdentity {
    pub kind: AdapterKind,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub database: String,
    pub service_name: String,
    pub base_dn: String,
    pub connect_timeout: Duration,
    pub tls: Option<bool>,
}

impl AdapterIdentity {
    /// An identity with only kind and name set; everything else is left for
    /// `validate` to default.
    pub fn new(kind: AdapterKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            host: String::new(),
            port: 0,
            username: String::new(),
            password: SecretString::from(String::new()),
            database: String::new(),
            service_name: String::new(),
            base_dn: String::new(),
            connect_timeout: Duration::ZERO,
            tls: None,
        }
    }

    /// `host:port`, as used in error messages and logs.
    pub fn address(&self) -> String {
        if self.host.is_empty() {
            format!("<unset>:{}", self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Value of the field named by [`AdapterKind::required_field`].
    pub fn required_value(&self) -> &str {
        match self.kind {
            AdapterKind::SqlServer | AdapterKind::Postgres | AdapterKind::Mysql => &self.database,
            AdapterKind::Oracle => &self.service_name,
            AdapterKind::Ldap => &self.base_dn,
            AdapterKind::Sftp => &self.username,
        }
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.unwrap_or_else(|| self.kind.default_tls())
    }
}

impl PartialEq for AdapterIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.name == other.name
            && self.host == other.host
            && self.port == other.port
            && self.username == other.username
            && self.password.expose_secret() == other.password.expose_secret()
            && self.database == other.database
            && self.service_name == other.service_name
            && self.base_dn == other.base_dn
            && self.connect_timeout == other.connect_timeout
            && self.tls == other.tls
    }
}

impl Eq for AdapterIdentity {}
