// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared adapter state: identity, validation/defaulting, and health.
//!
//! Every backend adapter embeds one [`AdapterCore`] behind its own lock.
//! Nothing here performs I/O.

use tracing::info;

use tether_core::{
    AdapterIdentity, HealthPolicy, HealthState, HealthStatus, TetherError,
    DEFAULT_CONNECT_TIMEOUT,
};

/// Identity, health policy and last-known health of one adapter.
#[derive(Debug)]
pub struct AdapterCore {
    identity: AdapterIdentity,
    policy: HealthPolicy,
    health: HealthStatus,
    validated: bool,
}

impl AdapterCore {
    pub fn new(identity: AdapterIdentity, policy: HealthPolicy) -> Self {
        Self {
            identity,
            policy,
            health: HealthStatus::unknown(),
            validated: false,
        }
    }

    pub fn identity(&self) -> &AdapterIdentity {
        &self.identity
    }

    pub fn policy(&self) -> HealthPolicy {
        self.policy
    }

    pub fn health(&self) -> &HealthStatus {
        &self.health
    }

    /// `host:port` for errors and logs.
    pub fn host(&self) -> String {
        self.identity.address()
    }

    /// True once `validate` has succeeded for the current identity.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Healthy and verified within the staleness window.
    pub fn is_fresh(&self) -> bool {
        self.health.is_healthy() && !self.health.is_stale(self.policy.stale_after)
    }

    /// Normalize and default the identity, recording `ValidateFailed` on error.
    pub fn validate(&mut self) -> Result<(), TetherError> {
        match normalize(&mut self.identity) {
            Ok(()) => {
                self.validated = true;
                Ok(())
            }
            Err(err) => {
                self.validated = false;
                self.record(HealthState::ValidateFailed);
                Err(err)
            }
        }
    }

    /// Record a health outcome, stamping it with the current time.
    pub fn record(&mut self, state: HealthState) {
        let previous = self.health.state;
        self.health = HealthStatus::new(state);
        if previous != state {
            info!(
                adapter = %self.identity.name,
                host = %self.identity.address(),
                from = %previous,
                to = %state,
                "health transition"
            );
        }
    }

    /// Swap in a new identity. Health returns to `Unknown` and the next
    /// access validates again.
    pub fn replace_identity(&mut self, identity: AdapterIdentity) {
        self.identity = identity;
        self.validated = false;
        self.record(HealthState::Unknown);
    }
}

/// Trim text fields, fill backend defaults, and check the required field.
///
/// Applying it twice yields the same identity as applying it once.
pub fn normalize(identity: &mut AdapterIdentity) -> Result<(), TetherError> {
    trim_in_place(&mut identity.name);
    trim_in_place(&mut identity.host);
    trim_in_place(&mut identity.username);
    trim_in_place(&mut identity.database);
    trim_in_place(&mut identity.service_name);
    trim_in_place(&mut identity.base_dn);

    if identity.host.is_empty() {
        identity.host = "localhost".to_string();
    }
    let tls = *identity.tls.get_or_insert(identity.kind.default_tls());
    if identity.port == 0 {
        identity.port = identity.kind.default_port(tls);
    }
    if identity.connect_timeout.is_zero() {
        identity.connect_timeout = DEFAULT_CONNECT_TIMEOUT;
    }

    if identity.name.is_empty() {
        return Err(TetherError::ConfigInvalid {
            host: identity.address(),
            message: "adapter name must not be empty".to_string(),
        });
    }
    if identity.required_value().is_empty() {
        return Err(TetherError::ConfigInvalid {
            host: identity.address(),
            message: format!(
                "{} adapter `{}` requires `{}`",
                identity.kind,
                identity.name,
                identity.kind.required_field()
            ),
        });
    }
    Ok(())
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use proptest::prelude::*;
    use tether_core::AdapterKind;

    use super::*;

    fn identity(kind: AdapterKind) -> AdapterIdentity {
        let mut id = AdapterIdentity::new(kind, "backend");
        id.database = "app".into();
        id.service_name = "ORCL".into();
        id.base_dn = "dc=example,dc=com".into();
        id.username = "svc".into();
        id
    }

    #[test]
    fn defaults_are_filled() {
        let mut id = identity(AdapterKind::SqlServer);
        normalize(&mut id).unwrap();
        assert_eq!(id.host, "localhost");
        assert_eq!(id.port, 1433);
        assert_eq!(id.connect_timeout, Duration::from_secs(30));
        assert_eq!(id.tls, Some(true));
    }

    #[test]
    fn zero_port_becomes_backend_default() {
        for (kind, port) in [
            (AdapterKind::SqlServer, 1433),
            (AdapterKind::Oracle, 1521),
            (AdapterKind::Postgres, 5432),
            (AdapterKind::Mysql, 3306),
            (AdapterKind::Ldap, 389),
            (AdapterKind::Sftp, 22),
        ] {
            let mut id = identity(kind);
            normalize(&mut id).unwrap();
            assert_eq!(id.port, port, "{kind}");
            normalize(&mut id).unwrap();
            assert_eq!(id.port, port, "{kind} after second pass");
        }
    }

    #[test]
    fn ldaps_default_port() {
        let mut id = identity(AdapterKind::Ldap);
        id.tls = Some(true);
        normalize(&mut id).unwrap();
        assert_eq!(id.port, 636);
    }

    #[test]
    fn explicit_values_are_kept() {
        let mut id = identity(AdapterKind::Postgres);
        id.host = " pg.internal ".into();
        id.port = 6432;
        id.tls = Some(true);
        id.connect_timeout = Duration::from_secs(3);
        normalize(&mut id).unwrap();
        assert_eq!(id.host, "pg.internal");
        assert_eq!(id.port, 6432);
        assert_eq!(id.tls, Some(true));
        assert_eq!(id.connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut id = identity(AdapterKind::Oracle);
        id.service_name = "   ".into();
        let err = normalize(&mut id).unwrap_err();
        assert!(matches!(err, TetherError::ConfigInvalid { .. }));
        assert!(err.to_string().contains("service_name"), "{err}");
        assert!(err.to_string().starts_with("validate localhost:1521"), "{err}");
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut id = identity(AdapterKind::Mysql);
        id.name = " ".into();
        let err = normalize(&mut id).unwrap_err();
        assert!(err.to_string().contains("name must not be empty"));
    }

    #[test]
    fn failed_validate_records_validate_failed() {
        let mut id = identity(AdapterKind::Ldap);
        id.base_dn.clear();
        let mut core = AdapterCore::new(id, HealthPolicy::default());
        assert!(core.validate().is_err());
        assert_eq!(core.health().state, HealthState::ValidateFailed);
        assert!(!core.is_validated());
    }

    #[test]
    fn replace_identity_resets_health() {
        let mut core = AdapterCore::new(identity(AdapterKind::Sftp), HealthPolicy::default());
        core.validate().unwrap();
        core.record(HealthState::Healthy);
        core.replace_identity(identity(AdapterKind::Sftp));
        assert_eq!(core.health().state, HealthState::Unknown);
        assert!(!core.is_validated());
    }

    fn kind_strategy() -> impl Strategy<Value = AdapterKind> {
        prop_oneof![
            Just(AdapterKind::SqlServer),
            Just(AdapterKind::Oracle),
            Just(AdapterKind::Postgres),
            Just(AdapterKind::Mysql),
            Just(AdapterKind::Ldap),
            Just(AdapterKind::Sftp),
        ]
    }

    proptest! {
        #[test]
        fn validate_is_idempotent(
            kind in kind_strategy(),
            host in "[ a-z.]{0,12}",
            port in prop_oneof![Just(0u16), any::<u16>()],
            required in "[ a-zA-Z=,]{0,10}",
            tls in proptest::option::of(any::<bool>()),
            timeout_secs in 0u64..120,
        ) {
            let mut id = AdapterIdentity::new(kind, " backend ");
            id.host = host;
            id.port = port;
            id.tls = tls;
            id.connect_timeout = Duration::from_secs(timeout_secs);
            id.database = required.clone();
            id.service_name = required.clone();
            id.base_dn = required.clone();
            id.username = required;

            let first = normalize(&mut id).is_ok();
            let snapshot = format!("{id:?}");
            let second = normalize(&mut id).is_ok();

            prop_assert_eq!(first, second);
            prop_assert_eq!(snapshot, format!("{id:?}"));
        }
    }
}
