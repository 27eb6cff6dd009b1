// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Health-gated access to an adapter's session.
//!
//! The fast path takes only the read lock and returns the cached session
//! while health is fresh. Otherwise the caller upgrades to the write lock,
//! re-checks (another caller may have verified meanwhile), and then pings
//! the existing handle or opens a new one. A handle that fails its ping is
//! closed and reopened under the same lock. At most one dial per adapter is
//! ever in flight.

use std::sync::Arc;

use tracing::{debug, warn};

use tether_core::{Driver, HealthState, HealthStatus, TetherError};

use crate::adapter::{Adapter, Slot};
use crate::classify::bounded_ping;

impl<D: Driver> Adapter<D> {
    /// The current session, verified if health is stale or unknown.
    ///
    /// A handle whose ping fails is closed and reopened before returning. An
    /// error means no handle could be produced.
    pub async fn session(&self) -> Result<Arc<D::Session>, TetherError> {
        {
            let slot = self.slot.read().await;
            if slot.core.is_fresh()
                && let Some(conn) = &slot.conn
            {
                return Ok(Arc::clone(&conn.session));
            }
        }

        let mut slot = self.slot.write().await;
        self.verify_locked(&mut slot).await?;
        slot.conn
            .as_ref()
            .map(|conn| Arc::clone(&conn.session))
            .ok_or_else(|| {
                TetherError::Internal("verification succeeded without a connection".to_string())
            })
    }

    /// Health check behind `ConnectionAdapter::test`.
    pub(crate) async fn check(&self) -> Result<HealthStatus, TetherError> {
        {
            let slot = self.slot.read().await;
            if slot.core.is_fresh() && slot.conn.is_some() {
                debug!(adapter = %slot.core.identity().name, "health fresh; skipping ping");
                return Ok(slot.core.health().clone());
            }
        }

        let mut slot = self.slot.write().await;
        self.verify_locked(&mut slot).await?;
        Ok(slot.core.health().clone())
    }

    /// Bring health up to date with the write lock held.
    async fn verify_locked(&self, slot: &mut Slot<D>) -> Result<(), TetherError> {
        if slot.core.is_fresh() && slot.conn.is_some() {
            return Ok(());
        }
        slot.core.validate()?;

        let Some(session) = slot.conn.as_ref().map(|conn| Arc::clone(&conn.session)) else {
            return self.open_locked(slot).await;
        };

        let host = slot.core.host();
        let deadline = slot.core.policy().ping_timeout;
        match bounded_ping(&host, deadline, self.driver.ping(&session)).await {
            Ok(()) => {
                slot.core.record(HealthState::Healthy);
                Ok(())
            }
            Err(err) => {
                slot.core.record(err.health_state());
                warn!(
                    adapter = %slot.core.identity().name,
                    host = %host,
                    error = %err,
                    "ping failed on existing connection; reopening"
                );
                self.reopen_locked(slot, err).await
            }
        }
    }

    /// Replace a connection that failed its ping.
    ///
    /// On success the adapter is healthy again. If the reopen fails too, the
    /// adapter is left without a handle, health keeps the ping's
    /// classification, and the ping error is returned.
    async fn reopen_locked(
        &self,
        slot: &mut Slot<D>,
        ping_err: TetherError,
    ) -> Result<(), TetherError> {
        if let Err(err) = self.close_locked(slot).await {
            debug!(adapter = %slot.core.identity().name, error = %err, "errors closing broken connection");
        }
        match self.open_locked(slot).await {
            Ok(()) => Ok(()),
            Err(open_err) => {
                slot.core.record(ping_err.health_state());
                warn!(adapter = %slot.core.identity().name, error = %open_err, "reopen after failed ping failed");
                Err(ping_err)
            }
        }
    }
}
