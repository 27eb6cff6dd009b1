// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend driver contract for adapters that hold one long-lived handle.

use async_trait::async_trait;

use crate::error::BoxError;
use crate::types::AdapterIdentity;

/// A backend client library, seen from the adapter.
///
/// A handle has two layers: the transport (socket, SSH connection, database
/// pool) and the session-level client built on it (ORM handle, SFTP
/// subsystem). Each layer is closed on its own so a failure in one never
/// leaks the other.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    type Transport: Send + Sync + 'static;
    type Session: Send + Sync + 'static;

    /// Dials `identity.address()` within `identity.connect_timeout`.
    async fn connect(&self, identity: &AdapterIdentity) -> Result<Self::Transport, BoxError>;

    /// Builds the session-level client on an established transport.
    async fn handshake(
        &self,
        transport: &Self::Transport,
        identity: &AdapterIdentity,
    ) -> Result<Self::Session, BoxError>;

    /// Cheap round trip proving the session is still usable.
    async fn ping(&self, session: &Self::Session) -> Result<(), BoxError>;

    async fn close_session(&self, session: &Self::Session) -> Result<(), BoxError>;

    async fn close_transport(&self, transport: &Self::Transport) -> Result<(), BoxError>;
}
