// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A protocol-agnostic driver that only checks TCP reachability.
//!
//! Used by the `doctor` command, which has no wire protocol for any backend.
//! The transport is a connected socket; the session records the peer
//! address; a ping connects again to prove the listener is still there.

use std::net::SocketAddr;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

use tether_core::{AdapterIdentity, BoxError, DirectoryDriver, Driver, PooledSession};

/// TCP reachability driver for every backend kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbeDriver;

/// Connected socket held open for the adapter's lifetime.
#[derive(Debug)]
pub struct ProbeTransport {
    stream: Mutex<Option<TcpStream>>,
    peer: SocketAddr,
}

/// Peer address confirmed by the handshake.
#[derive(Debug, Clone)]
pub struct ProbeSession {
    pub peer: SocketAddr,
}

impl TcpProbeDriver {
    async fn open_socket(identity: &AdapterIdentity) -> Result<ProbeTransport, BoxError> {
        let stream = TcpStream::connect((identity.host.as_str(), identity.port)).await?;
        let peer = stream.peer_addr()?;
        debug!(peer = %peer, "tcp probe connected");
        Ok(ProbeTransport {
            stream: Mutex::new(Some(stream)),
            peer,
        })
    }

    async fn reconnect(peer: SocketAddr) -> Result<(), BoxError> {
        let mut stream = TcpStream::connect(peer).await?;
        stream.shutdown().await?;
        Ok(())
    }
}

#[async_trait]
impl Driver for TcpProbeDriver {
    type Transport = ProbeTransport;
    type Session = ProbeSession;

    async fn connect(&self, identity: &AdapterIdentity) -> Result<ProbeTransport, BoxError> {
        Self::open_socket(identity).await
    }

    async fn handshake(
        &self,
        transport: &ProbeTransport,
        _identity: &AdapterIdentity,
    ) -> Result<ProbeSession, BoxError> {
        Ok(ProbeSession {
            peer: transport.peer,
        })
    }

    async fn ping(&self, session: &ProbeSession) -> Result<(), BoxError> {
        Self::reconnect(session.peer).await
    }

    async fn close_session(&self, _session: &ProbeSession) -> Result<(), BoxError> {
        Ok(())
    }

    async fn close_transport(&self, transport: &ProbeTransport) -> Result<(), BoxError> {
        transport.shutdown().await
    }
}

impl ProbeTransport {
    async fn shutdown(&self) -> Result<(), BoxError> {
        if let Some(mut stream) = self.stream.lock().await.take() {
            stream.shutdown().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl PooledSession for ProbeTransport {
    fn is_closing(&self) -> bool {
        self.stream.try_lock().is_ok_and(|stream| stream.is_none())
    }

    async fn close(&self) -> Result<(), BoxError> {
        self.shutdown().await
    }
}

#[async_trait]
impl DirectoryDriver for TcpProbeDriver {
    type Conn = ProbeTransport;

    async fn dial(&self, identity: &AdapterIdentity) -> Result<ProbeTransport, BoxError> {
        Self::open_socket(identity).await
    }

    async fn bind(
        &self,
        _conn: &ProbeTransport,
        _bind_dn: &str,
        _secret: &SecretString,
    ) -> Result<(), BoxError> {
        Ok(())
    }

    async fn ping(&self, conn: &ProbeTransport) -> Result<(), BoxError> {
        Self::reconnect(conn.peer).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tether_core::{AdapterKind, ConnectionAdapter, HealthPolicy, HealthState, TetherError};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::{Adapter, DirectoryAdapter};

    async fn listener() -> (SocketAddr, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        (addr, task)
    }

    fn identity(kind: AdapterKind, addr: SocketAddr) -> AdapterIdentity {
        let mut id = AdapterIdentity::new(kind, "probe");
        id.host = addr.ip().to_string();
        id.port = addr.port();
        id.database = "app".into();
        id.base_dn = "dc=example".into();
        id
    }

    #[tokio::test]
    async fn reachable_listener_is_healthy() {
        let (addr, _task) = listener().await;
        let adapter = Adapter::new(
            identity(AdapterKind::Postgres, addr),
            HealthPolicy::default(),
            TcpProbeDriver,
        );

        let status = adapter.test().await.unwrap();
        assert_eq!(status.state, HealthState::Healthy);
        adapter.close_connection().await.unwrap();
        assert_eq!(adapter.health().await.state, HealthState::Closed);
    }

    #[tokio::test]
    async fn closed_port_fails_to_open() {
        let (addr, task) = listener().await;
        task.abort();
        let _ = task.await;

        let adapter = Adapter::new(
            identity(AdapterKind::Mysql, addr),
            HealthPolicy::default(),
            TcpProbeDriver,
        );
        let err = adapter.test().await.unwrap_err();
        assert!(matches!(err, TetherError::OpenFailed { .. }), "{err}");
        assert_eq!(adapter.health().await.state, HealthState::OpenFailed);
    }

    #[tokio::test]
    async fn listener_going_away_is_a_network_error() {
        let (addr, task) = listener().await;
        let policy = HealthPolicy {
            stale_after: Duration::from_millis(1),
            ..HealthPolicy::default()
        };
        let adapter = Adapter::new(identity(AdapterKind::Postgres, addr), policy, TcpProbeDriver);
        adapter.test().await.unwrap();

        task.abort();
        let _ = task.await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        let err = adapter.test().await.unwrap_err();
        assert!(matches!(err, TetherError::NetworkError { .. }), "{err}");
        assert_eq!(adapter.health().await.state, HealthState::NetworkError);
    }

    #[tokio::test]
    async fn directory_probe_pools_the_socket() {
        let (addr, _task) = listener().await;
        let adapter = DirectoryAdapter::new(
            identity(AdapterKind::Ldap, addr),
            HealthPolicy::default(),
            2,
            TcpProbeDriver,
        );

        adapter.test().await.unwrap();
        assert_eq!(adapter.pool().idle_count().await, 1);
        adapter.close_connection().await.unwrap();
        assert_eq!(adapter.pool().idle_count().await, 0);
    }
}
