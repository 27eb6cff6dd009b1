// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrent name-to-adapter map.
//!
//! Lookups take the shared lock; inserts and removals take the exclusive
//! lock. Adapters handed out are shared views: anything that changes an
//! adapter goes through that adapter's own lock, never this one. Health
//! checks and closes always run after the registry lock is released.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use tether_core::{ConnectionAdapter, HealthStatus, TetherError};

/// Outcome of testing one registered adapter.
#[derive(Debug)]
pub struct TestReport {
    pub name: String,
    pub outcome: Result<HealthStatus, TetherError>,
    pub elapsed: Duration,
}

impl TestReport {
    pub fn is_healthy(&self) -> bool {
        self.outcome.as_ref().is_ok_and(HealthStatus::is_healthy)
    }
}

/// Name-keyed directory of adapter instances.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: RwLock<HashMap<String, Arc<dyn ConnectionAdapter>>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry").finish_non_exhaustive()
    }
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own name.
    ///
    /// Fails if `adapter` is `None` or its name is empty or whitespace.
    /// Otherwise any adapter already registered under that name is replaced
    /// (last writer wins).
    pub async fn set(&self, adapter: Option<Arc<dyn ConnectionAdapter>>) -> Result<(), TetherError> {
        let Some(adapter) = adapter else {
            return Err(TetherError::InvalidArgument(
                "adapter is nil; cannot register a missing adapter".to_string(),
            ));
        };
        let name = adapter.name().trim().to_string();
        if name.is_empty() {
            return Err(TetherError::InvalidArgument(
                "adapter name is empty; every registered adapter needs a name".to_string(),
            ));
        }

        let replaced = self.adapters.write().await.insert(name.clone(), adapter);
        if replaced.is_some() {
            warn!(adapter = %name, "replacing registered adapter");
        } else {
            debug!(adapter = %name, "adapter registered");
        }
        Ok(())
    }

    /// Convenience for registering a concrete adapter type.
    pub async fn insert<A: ConnectionAdapter>(&self, adapter: Arc<A>) -> Result<(), TetherError> {
        self.set(Some(adapter as Arc<dyn ConnectionAdapter>)).await
    }

    /// The adapter registered under `name`, if any.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn ConnectionAdapter>> {
        self.adapters.read().await.get(name).cloned()
    }

    /// Like [`get`](Self::get), for callers that treat absence as an error.
    pub async fn require(&self, name: &str) -> Result<Arc<dyn ConnectionAdapter>, TetherError> {
        self.get(name).await.ok_or_else(|| TetherError::AdapterNotFound {
            name: name.to_string(),
        })
    }

    /// Unregister `name` and close its connection. Absent names are ignored.
    pub async fn remove(&self, name: &str) {
        let removed = self.adapters.write().await.remove(name);
        let Some(adapter) = removed else {
            return;
        };
        info!(adapter = %name, "adapter removed");
        if let Err(err) = adapter.close_connection().await {
            warn!(adapter = %name, error = %err, "error closing removed adapter");
        }
    }

    /// Registered names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.read().await.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub async fn len(&self) -> usize {
        self.adapters.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.adapters.read().await.is_empty()
    }

    /// Test every adapter concurrently. Reports are sorted by name.
    pub async fn test_all(&self) -> Vec<TestReport> {
        let snapshot = self.snapshot().await;
        let checks = snapshot.into_iter().map(|(name, adapter)| async move {
            let start = Instant::now();
            let outcome = adapter.test().await;
            TestReport {
                name,
                outcome,
                elapsed: start.elapsed(),
            }
        });
        futures::future::join_all(checks).await
    }

    /// Empty the registry and close every adapter.
    ///
    /// Every adapter is closed even if some fail; failures come back paired
    /// with the adapter name.
    pub async fn close_all(&self) -> Vec<(String, TetherError)> {
        let drained: Vec<_> = self.adapters.write().await.drain().collect();
        let mut failures = Vec::new();
        for (name, adapter) in drained {
            if let Err(err) = adapter.close_connection().await {
                warn!(adapter = %name, error = %err, "error closing adapter");
                failures.push((name, err));
            }
        }
        failures.sort_by(|a, b| a.0.cmp(&b.0));
        failures
    }

    async fn snapshot(&self) -> Vec<(String, Arc<dyn ConnectionAdapter>)> {
        let mut entries: Vec<_> = self
            .adapters
            .read()
            .await
            .iter()
            .map(|(name, adapter)| (name.clone(), Arc::clone(adapter)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use tether_adapter::Adapter;
    use tether_core::{AdapterIdentity, AdapterKind, HealthPolicy};
    use tether_test_utils::MockDriver;

    use super::*;

    fn adapter(name: &str) -> Arc<Adapter<MockDriver>> {
        let mut id = AdapterIdentity::new(AdapterKind::Postgres, name);
        id.database = "app".into();
        Arc::new(Adapter::new(id, HealthPolicy::default(), MockDriver::new()))
    }

    #[tokio::test]
    async fn set_none_names_the_nil_argument() {
        let registry = AdapterRegistry::new();
        let err = registry.set(None).await.unwrap_err();
        assert!(matches!(err, TetherError::InvalidArgument(_)));
        assert!(err.to_string().contains("nil"), "{err}");
    }

    #[tokio::test]
    async fn set_rejects_blank_names() {
        let registry = AdapterRegistry::new();
        for name in ["", "   "] {
            let err = registry.insert(adapter(name)).await.unwrap_err();
            assert!(matches!(err, TetherError::InvalidArgument(_)));
            assert!(err.to_string().contains("name is empty"), "{err}");
        }
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn unknown_name_is_none() {
        let registry = AdapterRegistry::new();
        assert!(registry.get("missing").await.is_none());
        let Err(err) = registry.require("missing").await else {
            panic!("require should fail for an unknown name");
        };
        assert_eq!(err.to_string(), "adapter not found: missing");
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let registry = AdapterRegistry::new();
        let first = adapter("orders");
        let second = adapter("orders");
        registry.insert(Arc::clone(&first)).await.unwrap();
        registry.insert(Arc::clone(&second)).await.unwrap();

        let found = registry.get("orders").await.unwrap();
        let second_dyn: Arc<dyn ConnectionAdapter> = second;
        assert!(Arc::ptr_eq(&found, &second_dyn));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn remove_absent_name_is_a_no_op() {
        let registry = AdapterRegistry::new();
        registry.insert(adapter("orders")).await.unwrap();
        registry.remove("billing").await;
        assert_eq!(registry.names().await, vec!["orders".to_string()]);
    }
}
