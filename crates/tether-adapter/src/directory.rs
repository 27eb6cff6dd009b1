// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pooled adapter for directory servers.
//!
//! Each pooled session is a dialed and bound connection. Health checks
//! borrow a session from the pool, ping it, and hand it back (or discard it
//! when the ping fails).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use tether_config::AdapterConfig;
use tether_core::{
    AdapterIdentity, AdapterKind, BoxError, ConnectionAdapter, DirectoryDriver, HealthPolicy,
    HealthState, HealthStatus, PooledSession, SessionFactory, TetherError,
};
use tether_pool::{Lease, Pool};

use crate::classify::bounded_ping;
use crate::state::AdapterCore;

/// Builds pooled directory sessions: dial, then bind with the adapter's
/// credentials.
pub struct BindFactory<D: DirectoryDriver> {
    driver: Arc<D>,
}

impl<D: DirectoryDriver> BindFactory<D> {
    pub fn new(driver: Arc<D>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl<D: DirectoryDriver> SessionFactory for BindFactory<D> {
    type Config = AdapterIdentity;
    type Session = D::Conn;

    async fn create(&self, identity: &AdapterIdentity) -> Result<D::Conn, TetherError> {
        let host = identity.address();
        let deadline = identity.connect_timeout;

        let conn = match tokio::time::timeout(deadline, self.driver.dial(identity)).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(source)) => return Err(TetherError::OpenFailed { host, source }),
            Err(elapsed) => {
                return Err(TetherError::OpenFailed {
                    host,
                    source: Box::new(elapsed),
                });
            }
        };

        let bound = tokio::time::timeout(
            deadline,
            self.driver
                .bind(&conn, &identity.username, &identity.password),
        )
        .await;
        let failure: Option<BoxError> = match bound {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err),
            Err(elapsed) => Some(Box::new(elapsed)),
        };
        if let Some(source) = failure {
            if let Err(err) = conn.close().await {
                debug!(host = %host, error = %err, "error closing connection after failed bind");
            }
            return Err(TetherError::OpenFailed { host, source });
        }
        Ok(conn)
    }
}

/// A directory adapter backed by a pool of bound sessions.
pub struct DirectoryAdapter<D: DirectoryDriver> {
    name: String,
    kind: AdapterKind,
    driver: Arc<D>,
    core: RwLock<AdapterCore>,
    pool: Pool<BindFactory<D>>,
}

impl<D: DirectoryDriver> DirectoryAdapter<D> {
    pub fn new(identity: AdapterIdentity, policy: HealthPolicy, max_open: usize, driver: D) -> Self {
        let name = identity.name.trim().to_string();
        let driver = Arc::new(driver);
        Self {
            kind: identity.kind,
            pool: Pool::new(name.clone(), max_open, BindFactory::new(Arc::clone(&driver))),
            core: RwLock::new(AdapterCore::new(identity, policy)),
            driver,
            name,
        }
    }

    /// Build an adapter from one `[[adapters]]` entry.
    pub fn from_config(
        config: &AdapterConfig,
        policy: HealthPolicy,
        max_open: usize,
        driver: D,
    ) -> Self {
        Self::new(config.identity(), policy, max_open, driver)
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn pool(&self) -> &Pool<BindFactory<D>> {
        &self.pool
    }

    /// Check out a bound session, validating the identity first if needed.
    ///
    /// The adapter lock is released before dialing, so a slow bind never
    /// blocks health checks or closes.
    pub async fn acquire(&self) -> Result<Lease<D::Conn>, TetherError> {
        let identity = {
            let core = self.core.read().await;
            if core.is_validated() {
                core.identity().clone()
            } else {
                drop(core);
                let mut core = self.core.write().await;
                core.validate()?;
                core.identity().clone()
            }
        };
        self.pool.acquire(&identity).await
    }

    /// Return a session for reuse.
    pub async fn release(&self, lease: Lease<D::Conn>) {
        self.pool.release(lease).await;
    }

    /// Close a session found broken.
    pub async fn discard(&self, lease: Lease<D::Conn>) {
        self.pool.discard(lease).await;
    }

    /// Borrow a session, ping it, and record the outcome.
    async fn verify_locked(&self, core: &mut AdapterCore) -> Result<(), TetherError> {
        core.validate()?;
        let host = core.host();

        let lease = match self.pool.acquire(core.identity()).await {
            Ok(lease) => lease,
            Err(err) => {
                core.record(err.health_state());
                warn!(adapter = %self.name, host = %host, error = %err, "failed to open directory session");
                return Err(err);
            }
        };

        let deadline = core.policy().ping_timeout;
        match bounded_ping(&host, deadline, self.driver.ping(&lease)).await {
            Ok(()) => {
                self.pool.release(lease).await;
                core.record(HealthState::Healthy);
                Ok(())
            }
            Err(err) => {
                self.pool.discard(lease).await;
                core.record(err.health_state());
                warn!(adapter = %self.name, host = %host, error = %err, "directory ping failed");
                Err(err)
            }
        }
    }

    /// Close every pooled session, relabelling errors with the backend
    /// address.
    async fn close_locked(&self, core: &mut AdapterCore) -> Result<(), TetherError> {
        if self.pool.open_count().await == 0 && self.pool.idle_count().await == 0 {
            return Ok(());
        }
        let host = core.host();
        let closed = self.pool.close_all().await;
        core.record(HealthState::Closed);
        match closed {
            Ok(()) => {
                info!(adapter = %self.name, host = %host, "directory pool closed");
                Ok(())
            }
            Err(TetherError::CloseFailed { errors, .. }) => {
                Err(TetherError::CloseFailed { host, errors })
            }
            Err(other) => Err(other),
        }
    }
}

#[async_trait]
impl<D: DirectoryDriver> ConnectionAdapter for DirectoryAdapter<D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AdapterKind {
        self.kind
    }

    async fn validate(&self) -> Result<(), TetherError> {
        self.core.write().await.validate()
    }

    async fn test(&self) -> Result<HealthStatus, TetherError> {
        {
            let core = self.core.read().await;
            if core.is_fresh() {
                return Ok(core.health().clone());
            }
        }
        let mut core = self.core.write().await;
        if !core.is_fresh() {
            self.verify_locked(&mut core).await?;
        }
        Ok(core.health().clone())
    }

    async fn open_connection(&self) -> Result<(), TetherError> {
        let mut core = self.core.write().await;
        self.verify_locked(&mut core).await
    }

    async fn close_connection(&self) -> Result<(), TetherError> {
        let mut core = self.core.write().await;
        self.close_locked(&mut core).await
    }

    async fn refresh(&self) -> Result<HealthStatus, TetherError> {
        let mut core = self.core.write().await;
        if let Err(err) = self.close_locked(&mut core).await {
            warn!(adapter = %self.name, error = %err, "ignoring close errors during refresh");
        }
        self.verify_locked(&mut core).await?;
        Ok(core.health().clone())
    }

    async fn health(&self) -> HealthStatus {
        self.core.read().await.health().clone()
    }
}
