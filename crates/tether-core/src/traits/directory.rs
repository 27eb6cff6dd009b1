// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Driver contract for directory servers.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::BoxError;
use crate::traits::session::PooledSession;
use crate::types::AdapterIdentity;

/// A directory client library. Binding is expensive, so connections are
/// pooled and reused while they report themselves alive.
#[async_trait]
pub trait DirectoryDriver: Send + Sync + 'static {
    type Conn: PooledSession;

    async fn dial(&self, identity: &AdapterIdentity) -> Result<Self::Conn, BoxError>;

    async fn bind(
        &self,
        conn: &Self::Conn,
        bind_dn: &str,
        secret: &SecretString,
    ) -> Result<(), BoxError>;

    /// Round trip on a bound connection (e.g. a root DSE read).
    async fn ping(&self, conn: &Self::Conn) -> Result<(), BoxError>;
}
