// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle of a single-handle backend adapter.
//!
//! [`Adapter`] owns at most one live connection (transport plus session)
//! built by its [`Driver`]. Opening dials, handshakes and pings under one
//! write lock. Closing tears down both layers and reports every failure.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use tether_config::AdapterConfig;
use tether_core::{
    AdapterIdentity, AdapterKind, BoxError, ConnectionAdapter, Driver, HealthPolicy, HealthState,
    HealthStatus, TetherError,
};

use crate::classify::bounded_ping;
use crate::state::AdapterCore;

/// Live handles for one open connection.
pub(crate) struct Connection<D: Driver> {
    pub(crate) transport: D::Transport,
    pub(crate) session: Arc<D::Session>,
}

/// Everything guarded by the adapter lock.
pub(crate) struct Slot<D: Driver> {
    pub(crate) core: AdapterCore,
    pub(crate) conn: Option<Connection<D>>,
}

/// A single-connection adapter for SQL and SFTP style backends.
pub struct Adapter<D: Driver> {
    name: String,
    kind: AdapterKind,
    pub(crate) driver: D,
    pub(crate) slot: RwLock<Slot<D>>,
}

impl<D: Driver> Adapter<D> {
    pub fn new(identity: AdapterIdentity, policy: HealthPolicy, driver: D) -> Self {
        Self {
            name: identity.name.trim().to_string(),
            kind: identity.kind,
            driver,
            slot: RwLock::new(Slot {
                core: AdapterCore::new(identity, policy),
                conn: None,
            }),
        }
    }

    /// Build an adapter from one `[[adapters]]` entry.
    pub fn from_config(config: &AdapterConfig, policy: HealthPolicy, driver: D) -> Self {
        Self::new(config.identity(), policy, driver)
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Snapshot of the current identity, including any defaults applied by
    /// validation.
    pub async fn identity(&self) -> AdapterIdentity {
        self.slot.read().await.core.identity().clone()
    }

    /// Close the current connection and adopt a new identity.
    ///
    /// The adapter name cannot change. Health returns to `Unknown`, so the
    /// next access validates and dials against the new identity. The new
    /// identity is adopted even when closing the old connection fails; the
    /// close error is still returned.
    pub async fn reconfigure(&self, identity: AdapterIdentity) -> Result<(), TetherError> {
        if identity.name.trim() != self.name {
            return Err(TetherError::InvalidArgument(format!(
                "adapter `{}` cannot be renamed to `{}`",
                self.name,
                identity.name.trim()
            )));
        }
        let mut slot = self.slot.write().await;
        let closed = self.close_locked(&mut slot).await;
        slot.core.replace_identity(identity);
        info!(adapter = %self.name, "adapter reconfigured");
        closed
    }

    /// Dial, handshake and verify a new connection.
    ///
    /// Must be called with the write lock held and no connection present.
    /// Every failure here is an `OpenFailed`, and anything already built is
    /// torn down before returning.
    pub(crate) async fn open_locked(&self, slot: &mut Slot<D>) -> Result<(), TetherError> {
        let host = slot.core.host();
        let policy = slot.core.policy();
        let connect_timeout = slot.core.identity().connect_timeout;
        debug!(adapter = %self.name, host = %host, "dialing backend");

        let dialed = tokio::time::timeout(
            connect_timeout,
            self.driver.connect(slot.core.identity()),
        )
        .await;
        let transport = match flatten(dialed) {
            Ok(transport) => transport,
            Err(source) => return Err(open_failed(&mut slot.core, &self.name, host, source)),
        };

        let handshake = tokio::time::timeout(
            connect_timeout,
            self.driver.handshake(&transport, slot.core.identity()),
        )
        .await;
        let session = match flatten(handshake) {
            Ok(session) => session,
            Err(source) => {
                if let Err(err) = self.driver.close_transport(&transport).await {
                    debug!(adapter = %self.name, error = %err, "error closing transport after failed handshake");
                }
                return Err(open_failed(&mut slot.core, &self.name, host, source));
            }
        };

        if let Err(err) = bounded_ping(&host, policy.ping_timeout, self.driver.ping(&session)).await
        {
            if let Err(close_err) = self.driver.close_session(&session).await {
                debug!(adapter = %self.name, error = %close_err, "error closing session after failed verification");
            }
            if let Err(close_err) = self.driver.close_transport(&transport).await {
                debug!(adapter = %self.name, error = %close_err, "error closing transport after failed verification");
            }
            return Err(open_failed(&mut slot.core, &self.name, host, Box::new(err)));
        }

        slot.conn = Some(Connection {
            transport,
            session: Arc::new(session),
        });
        slot.core.record(HealthState::Healthy);
        info!(adapter = %self.name, host = %host, "connection opened");
        Ok(())
    }

    /// Tear down both layers of the current connection, if any.
    ///
    /// Both closes are attempted; their errors are combined into one
    /// `CloseFailed`. With a connection present the adapter always ends up
    /// `Closed` with no handles, even on error.
    pub(crate) async fn close_locked(&self, slot: &mut Slot<D>) -> Result<(), TetherError> {
        let Some(conn) = slot.conn.take() else {
            return Ok(());
        };
        let host = slot.core.host();

        let mut errors: Vec<BoxError> = Vec::new();
        if let Err(err) = self.driver.close_session(&conn.session).await {
            errors.push(err);
        }
        if let Err(err) = self.driver.close_transport(&conn.transport).await {
            errors.push(err);
        }
        slot.core.record(HealthState::Closed);

        if errors.is_empty() {
            info!(adapter = %self.name, host = %host, "connection closed");
            Ok(())
        } else {
            warn!(adapter = %self.name, host = %host, failures = errors.len(), "errors while closing connection");
            Err(TetherError::CloseFailed { host, errors })
        }
    }
}

fn flatten<T>(
    outcome: Result<Result<T, BoxError>, tokio::time::error::Elapsed>,
) -> Result<T, BoxError> {
    match outcome {
        Ok(inner) => inner,
        Err(elapsed) => Err(Box::new(elapsed)),
    }
}

fn open_failed(core: &mut AdapterCore, name: &str, host: String, source: BoxError) -> TetherError {
    core.record(HealthState::OpenFailed);
    warn!(adapter = %name, host = %host, error = %source, "failed to open connection");
    TetherError::OpenFailed { host, source }
}

#[async_trait]
impl<D: Driver> ConnectionAdapter for Adapter<D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AdapterKind {
        self.kind
    }

    async fn validate(&self) -> Result<(), TetherError> {
        self.slot.write().await.core.validate()
    }

    async fn test(&self) -> Result<HealthStatus, TetherError> {
        self.check().await
    }

    async fn open_connection(&self) -> Result<(), TetherError> {
        let mut slot = self.slot.write().await;
        if slot.conn.is_some() {
            debug!(adapter = %self.name, "connection already open");
            return Ok(());
        }
        slot.core.validate()?;
        self.open_locked(&mut slot).await
    }

    async fn close_connection(&self) -> Result<(), TetherError> {
        let mut slot = self.slot.write().await;
        self.close_locked(&mut slot).await
    }

    async fn refresh(&self) -> Result<HealthStatus, TetherError> {
        let mut slot = self.slot.write().await;
        if let Err(err) = self.close_locked(&mut slot).await {
            warn!(adapter = %self.name, error = %err, "ignoring close errors during refresh");
        }
        slot.core.validate()?;
        self.open_locked(&mut slot).await?;
        Ok(slot.core.health().clone())
    }

    async fn health(&self) -> HealthStatus {
        self.slot.read().await.core.health().clone()
    }
}
