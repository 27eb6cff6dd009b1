// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The capability trait every backend adapter exposes.

use async_trait::async_trait;

use crate::error::TetherError;
use crate::types::{AdapterKind, HealthStatus};

/// Uniform lifecycle surface shared by every backend adapter.
///
/// Implementations keep their own lock; callers holding an
/// `Arc<dyn ConnectionAdapter>` from the registry never need another one.
#[async_trait]
pub trait ConnectionAdapter: Send + Sync + 'static {
    /// Unique registry key of this adapter instance.
    fn name(&self) -> &str;

    /// Backend family.
    fn kind(&self) -> AdapterKind;

    /// Normalizes and defaults the configuration. Idempotent.
    async fn validate(&self) -> Result<(), TetherError>;

    /// Reuses a fresh healthy handle, otherwise runs validate, open and ping.
    ///
    /// Always records the outcome in the adapter's health status.
    async fn test(&self) -> Result<HealthStatus, TetherError>;

    /// Dials the backend and verifies the new handle with one ping.
    async fn open_connection(&self) -> Result<(), TetherError>;

    /// Tears down every owned resource layer, aggregating errors.
    async fn close_connection(&self) -> Result<(), TetherError>;

    /// Forces a close followed by a fresh open.
    async fn refresh(&self) -> Result<HealthStatus, TetherError>;

    /// Snapshot of the last recorded health status. Performs no I/O.
    async fn health(&self) -> HealthStatus;
}
