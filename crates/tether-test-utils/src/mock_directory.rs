// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock directory server driver.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tether_core::{AdapterIdentity, BoxError, DirectoryDriver};

use crate::conn::MockConn;

#[derive(Default)]
struct Inner {
    dials: AtomicUsize,
    binds: AtomicUsize,
    pings: AtomicUsize,
    closes: Arc<AtomicUsize>,
    dial_errors: Mutex<VecDeque<String>>,
    bind_errors: Mutex<VecDeque<String>>,
    ping_errors: Mutex<VecDeque<String>>,
    last_bind: Mutex<Option<(String, String)>>,
    issued: Mutex<Vec<MockConn>>,
    dial_delay: Mutex<Duration>,
    dials_in_flight: AtomicUsize,
    max_concurrent_dials: AtomicUsize,
    /// Connections with an id at or below this were lost in a restart.
    dead_through: AtomicUsize,
}

/// A scriptable [`DirectoryDriver`] handing out [`MockConn`]s.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct MockDirectory {
    inner: Arc<Inner>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every dial sleeps this long before succeeding or failing.
    pub fn with_dial_delay(self, delay: Duration) -> Self {
        *self.inner.dial_delay.lock().expect("mock lock poisoned") = delay;
        self
    }

    /// Simulate a server restart: every connection dialed so far fails its
    /// pings from now on, while new dials succeed.
    pub fn restart_backend(&self) {
        self.inner
            .dead_through
            .store(self.dials(), Ordering::SeqCst);
    }

    pub fn fail_next_dial(&self, message: impl Into<String>) {
        self.inner
            .dial_errors
            .lock()
            .expect("mock lock poisoned")
            .push_back(message.into());
    }

    pub fn fail_next_bind(&self, message: impl Into<String>) {
        self.inner
            .bind_errors
            .lock()
            .expect("mock lock poisoned")
            .push_back(message.into());
    }

    pub fn fail_next_ping(&self, message: impl Into<String>) {
        self.inner
            .ping_errors
            .lock()
            .expect("mock lock poisoned")
            .push_back(message.into());
    }

    pub fn dials(&self) -> usize {
        self.inner.dials.load(Ordering::SeqCst)
    }

    pub fn binds(&self) -> usize {
        self.inner.binds.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> usize {
        self.inner.pings.load(Ordering::SeqCst)
    }

    pub fn max_concurrent_dials(&self) -> usize {
        self.inner.max_concurrent_dials.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    /// Bind DN and secret of the most recent bind attempt.
    pub fn last_bind(&self) -> Option<(String, String)> {
        self.inner.last_bind.lock().expect("mock lock poisoned").clone()
    }

    /// Handles to every connection dialed so far.
    pub fn issued(&self) -> Vec<MockConn> {
        self.inner.issued.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl DirectoryDriver for MockDirectory {
    type Conn = MockConn;

    async fn dial(&self, _identity: &AdapterIdentity) -> Result<MockConn, BoxError> {
        let id = self.inner.dials.fetch_add(1, Ordering::SeqCst) + 1;
        let in_flight = self.inner.dials_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner
            .max_concurrent_dials
            .fetch_max(in_flight, Ordering::SeqCst);

        let delay = *self.inner.dial_delay.lock().expect("mock lock poisoned");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.inner.dials_in_flight.fetch_sub(1, Ordering::SeqCst);

        let failure = self
            .inner
            .dial_errors
            .lock()
            .expect("mock lock poisoned")
            .pop_front();
        if let Some(message) = failure {
            return Err(message.into());
        }
        let conn = MockConn::new(id, Arc::clone(&self.inner.closes));
        self.inner
            .issued
            .lock()
            .expect("mock lock poisoned")
            .push(conn.clone());
        Ok(conn)
    }

    async fn bind(
        &self,
        _conn: &MockConn,
        bind_dn: &str,
        secret: &SecretString,
    ) -> Result<(), BoxError> {
        self.inner.binds.fetch_add(1, Ordering::SeqCst);
        *self.inner.last_bind.lock().expect("mock lock poisoned") =
            Some((bind_dn.to_string(), secret.expose_secret().to_string()));
        let failure = self
            .inner
            .bind_errors
            .lock()
            .expect("mock lock poisoned")
            .pop_front();
        match failure {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }

    async fn ping(&self, conn: &MockConn) -> Result<(), BoxError> {
        self.inner.pings.fetch_add(1, Ordering::SeqCst);
        if conn.id <= self.inner.dead_through.load(Ordering::SeqCst) {
            return Err("connection reset by server".into());
        }
        let failure = self
            .inner
            .ping_errors
            .lock()
            .expect("mock lock poisoned")
            .pop_front();
        match failure {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }
}
