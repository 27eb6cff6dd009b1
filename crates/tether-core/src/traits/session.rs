// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contracts for sessions held in a pool and the factories that build them.

use async_trait::async_trait;

use crate::error::{BoxError, TetherError};

/// A reusable session that can report its own liveness without I/O.
#[async_trait]
pub trait PooledSession: Send + Sync + 'static {
    /// Local check: true once the session knows it is shutting down.
    fn is_closing(&self) -> bool;

    async fn close(&self) -> Result<(), BoxError>;
}

/// Builds new pooled sessions; swapped for a mock in tests.
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    type Config: Send + Sync + ?Sized;
    type Session: PooledSession;

    /// Connects and authenticates a brand-new session.
    ///
    /// On failure any partially opened resource must already be closed.
    async fn create(&self, config: &Self::Config) -> Result<Self::Session, TetherError>;
}
