// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Tether.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tether_core::{AdapterIdentity, AdapterKind, HealthPolicy};

/// Top-level Tether configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TetherConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Health staleness and ping settings shared by every adapter.
    #[serde(default)]
    pub health: HealthConfig,

    /// Session pool settings for pooled (directory) adapters.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Configured backend adapters, keyed by their unique name.
    #[serde(default)]
    pub adapters: Vec<AdapterConfig>,
}

impl TetherConfig {
    /// Find an adapter section by name.
    pub fn adapter(&self, name: &str) -> Option<&AdapterConfig> {
        self.adapters.iter().find(|a| a.name == name)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    /// Seconds a healthy status is trusted before it is re-verified.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,

    /// Seconds a single liveness ping may take.
    #[serde(default = "default_ping_timeout_secs")]
    pub ping_timeout_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: default_stale_after_secs(),
            ping_timeout_secs: default_ping_timeout_secs(),
        }
    }
}

impl HealthConfig {
    pub fn policy(&self) -> HealthPolicy {
        HealthPolicy {
            stale_after: Duration::from_secs(self.stale_after_secs),
            ping_timeout: Duration::from_secs(self.ping_timeout_secs),
        }
    }
}

fn default_stale_after_secs() -> u64 {
    300
}

fn default_ping_timeout_secs() -> u64 {
    5
}

/// Session pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    /// Advisory cap on open sessions per pool. Exceeding it logs a warning
    /// but never blocks a caller.
    #[serde(default = "default_max_open")]
    pub max_open: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_open: default_max_open(),
        }
    }
}

fn default_max_open() -> usize {
    tether_core::DEFAULT_MAX_OPEN
}

/// One `[[adapters]]` entry.
///
/// Zero / empty values are deliberate "unset" markers: the adapter's
/// `validate` replaces them with backend defaults at runtime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    /// Unique registry key.
    pub name: String,

    /// Backend family (sql-server, oracle, postgres, mysql, ldap, sftp).
    pub kind: AdapterKind,

    #[serde(default)]
    pub host: String,

    /// `0` selects the backend's default port.
    #[serde(default)]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    /// Never written back out when the config is serialized.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Database name (SQL backends).
    #[serde(default)]
    pub database: String,

    /// Service name (Oracle).
    #[serde(default)]
    pub service_name: String,

    /// Search base (LDAP).
    #[serde(default)]
    pub base_dn: String,

    /// `0` selects the 30 second default.
    #[serde(default)]
    pub connect_timeout_secs: u64,

    /// Transport encryption; unset selects the backend default.
    #[serde(default)]
    pub tls: Option<bool>,
}

impl AdapterConfig {
    /// A minimal entry with everything else left to defaults.
    pub fn new(name: impl Into<String>, kind: AdapterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            host: String::new(),
            port: 0,
            username: String::new(),
            password: None,
            database: String::new(),
            service_name: String::new(),
            base_dn: String::new(),
            connect_timeout_secs: 0,
            tls: None,
        }
    }

    /// Build the adapter identity this entry describes. No defaults are
    /// applied here.
    pub fn identity(&self) -> AdapterIdentity {
        let mut identity = AdapterIdentity::new(self.kind, self.name.clone());
        identity.host = self.host.clone();
        identity.port = self.port;
        identity.username = self.username.clone();
        identity.password = SecretString::from(self.password.clone().unwrap_or_default());
        identity.database = self.database.clone();
        identity.service_name = self.service_name.clone();
        identity.base_dn = self.base_dn.clone();
        identity.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        identity.tls = self.tls;
        identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn adapter_entry_deserializes_with_defaults() {
        let toml_str = r#"
[[adapters]]
name = "hr-db"
kind = "sql-server"
database = "hr"
"#;
        let config: TetherConfig = toml::from_str(toml_str).unwrap();
        let entry = config.adapter("hr-db").unwrap();
        assert_eq!(entry.kind, AdapterKind::SqlServer);
        assert_eq!(entry.port, 0);
        assert!(entry.host.is_empty());
        assert!(entry.tls.is_none());
        assert!(entry.password.is_none());
    }

    #[test]
    fn unknown_adapter_kind_is_rejected() {
        let toml_str = r#"
[[adapters]]
name = "x"
kind = "mongodb"
"#;
        assert!(toml::from_str::<TetherConfig>(toml_str).is_err());
    }

    #[test]
    fn adapters_deny_unknown_fields() {
        let toml_str = r#"
[[adapters]]
name = "x"
kind = "oracle"
servce_name = "ORCL"
"#;
        assert!(toml::from_str::<TetherConfig>(toml_str).is_err());
    }

    #[test]
    fn identity_carries_every_field() {
        let mut entry = AdapterConfig::new("files", AdapterKind::Sftp);
        entry.host = "sftp.internal".into();
        entry.port = 2222;
        entry.username = "deploy".into();
        entry.password = Some("s3cret".into());
        entry.connect_timeout_secs = 10;
        entry.tls = Some(true);

        let identity = entry.identity();
        assert_eq!(identity.name, "files");
        assert_eq!(identity.port, 2222);
        assert_eq!(identity.password.expose_secret(), "s3cret");
        assert_eq!(identity.connect_timeout, Duration::from_secs(10));
        assert_eq!(identity.tls, Some(true));
    }

    #[test]
    fn password_is_not_serialized() {
        let mut entry = AdapterConfig::new("pg", AdapterKind::Postgres);
        entry.password = Some("hunter2".into());
        let out = toml::to_string(&entry).unwrap();
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn health_policy_from_config() {
        let health = HealthConfig {
            stale_after_secs: 60,
            ping_timeout_secs: 2,
        };
        let policy = health.policy();
        assert_eq!(policy.stale_after, Duration::from_secs(60));
        assert_eq!(policy.ping_timeout, Duration::from_secs(2));
    }
}
