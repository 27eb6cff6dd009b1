// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry behavior with real adapters behind it.

use std::sync::Arc;

use tether_adapter::{Adapter, DirectoryAdapter};
use tether_core::{
    AdapterIdentity, AdapterKind, ConnectionAdapter, HealthPolicy, HealthState, TetherError,
};
use tether_registry::AdapterRegistry;
use tether_test_utils::{MockDirectory, MockDriver};
use tracing_test::traced_test;

fn sql(name: &str, driver: &MockDriver) -> Arc<Adapter<MockDriver>> {
    let mut id = AdapterIdentity::new(AdapterKind::Mysql, name);
    id.host = format!("{name}.db");
    id.database = "app".into();
    Arc::new(Adapter::new(id, HealthPolicy::default(), driver.clone()))
}

fn ldap(name: &str, directory: &MockDirectory) -> Arc<DirectoryAdapter<MockDirectory>> {
    let mut id = AdapterIdentity::new(AdapterKind::Ldap, name);
    id.base_dn = "dc=example,dc=com".into();
    Arc::new(DirectoryAdapter::new(
        id,
        HealthPolicy::default(),
        4,
        directory.clone(),
    ))
}

#[tokio::test]
async fn test_all_reports_every_adapter_by_name() {
    let registry = AdapterRegistry::new();
    let healthy = MockDriver::new();
    let broken = MockDriver::new();
    broken.fail_next_connect("no route to host");
    let directory = MockDirectory::new();

    registry.insert(sql("orders", &healthy)).await.unwrap();
    registry.insert(sql("billing", &broken)).await.unwrap();
    registry.insert(ldap("people", &directory)).await.unwrap();

    let reports = registry.test_all().await;
    let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["billing", "orders", "people"]);

    assert!(matches!(reports[0].outcome, Err(TetherError::OpenFailed { .. })));
    assert!(!reports[0].is_healthy());
    assert_eq!(reports[1].outcome.as_ref().unwrap().state, HealthState::Healthy);
    assert!(reports[2].is_healthy());
}

#[tokio::test]
async fn remove_closes_the_adapter() {
    let registry = AdapterRegistry::new();
    let driver = MockDriver::new();
    let adapter = sql("orders", &driver);
    registry.insert(Arc::clone(&adapter)).await.unwrap();
    adapter.open_connection().await.unwrap();

    registry.remove("orders").await;

    assert!(registry.get("orders").await.is_none());
    assert_eq!(driver.stats().transport_closes(), 1);
    assert_eq!(adapter.health().await.state, HealthState::Closed);
}

#[tokio::test]
async fn close_all_drains_and_reports_failures() {
    let registry = AdapterRegistry::new();
    let good = MockDriver::new();
    let bad = MockDriver::new();
    bad.fail_transport_close("broken pipe");

    let a = sql("orders", &good);
    let b = sql("billing", &bad);
    registry.insert(Arc::clone(&a)).await.unwrap();
    registry.insert(Arc::clone(&b)).await.unwrap();
    a.open_connection().await.unwrap();
    b.open_connection().await.unwrap();

    let failures = registry.close_all().await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "billing");
    assert!(matches!(failures[0].1, TetherError::CloseFailed { .. }));
    assert!(registry.is_empty().await);
    assert_eq!(good.stats().transport_closes(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_and_readers() {
    let registry = Arc::new(AdapterRegistry::new());
    let driver = MockDriver::new();

    let writers: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let adapter = sql(&format!("db{}", i % 4), &driver);
            tokio::spawn(async move { registry.insert(adapter).await })
        })
        .collect();
    let readers: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.get(&format!("db{}", i % 4)).await.is_some() })
        })
        .collect();

    for writer in writers {
        writer.await.unwrap().unwrap();
    }
    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(registry.names().await, ["db0", "db1", "db2", "db3"]);
}

#[tokio::test]
#[traced_test]
async fn overwriting_a_name_is_logged() {
    let registry = AdapterRegistry::new();
    let driver = MockDriver::new();
    registry.insert(sql("orders", &driver)).await.unwrap();
    registry.insert(sql("orders", &driver)).await.unwrap();

    assert!(logs_contain("replacing registered adapter"));
}
