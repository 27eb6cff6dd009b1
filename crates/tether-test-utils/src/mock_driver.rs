// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock two-layer backend driver for deterministic adapter tests.
//!
//! `MockDriver` implements `Driver` with scripted failures and delays,
//! recording every call so tests can assert on dial counts and teardown.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tether_core::{AdapterIdentity, BoxError, Driver};

/// Call counters shared between a driver and the test that scripts it.
#[derive(Debug, Default)]
pub struct DriverStats {
    pub connects: AtomicUsize,
    pub handshakes: AtomicUsize,
    pub pings: AtomicUsize,
    pub session_closes: AtomicUsize,
    pub transport_closes: AtomicUsize,
    dials_in_flight: AtomicUsize,
    pub max_concurrent_dials: AtomicUsize,
}

impl DriverStats {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn session_closes(&self) -> usize {
        self.session_closes.load(Ordering::SeqCst)
    }

    pub fn transport_closes(&self) -> usize {
        self.transport_closes.load(Ordering::SeqCst)
    }

    pub fn max_concurrent_dials(&self) -> usize {
        self.max_concurrent_dials.load(Ordering::SeqCst)
    }
}

/// Transport handle produced by [`MockDriver::connect`].
#[derive(Debug)]
pub struct MockTransport {
    pub id: usize,
}

/// Session handle produced by [`MockDriver::handshake`].
#[derive(Debug)]
pub struct MockSession {
    pub id: usize,
}

#[derive(Default)]
struct Script {
    connect_errors: VecDeque<String>,
    handshake_errors: VecDeque<String>,
    ping_errors: VecDeque<BoxError>,
    connect_delay: Duration,
    ping_delay: Duration,
    session_close_error: Option<String>,
    transport_close_error: Option<String>,
    /// Sessions with an id at or below this were lost in a restart.
    dead_through: usize,
}

/// A scriptable [`Driver`].
///
/// Clones share the script and the counters.
#[derive(Clone, Default)]
pub struct MockDriver {
    stats: Arc<DriverStats>,
    script: Arc<Mutex<Script>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Arc<DriverStats> {
        Arc::clone(&self.stats)
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().expect("mock lock poisoned")
    }

    /// Every dial sleeps this long before succeeding or failing.
    pub fn with_connect_delay(self, delay: Duration) -> Self {
        self.script().connect_delay = delay;
        self
    }

    /// Every ping sleeps this long first.
    pub fn with_ping_delay(self, delay: Duration) -> Self {
        self.script().ping_delay = delay;
        self
    }

    /// The next dial fails with `message`.
    pub fn fail_next_connect(&self, message: impl Into<String>) {
        self.script().connect_errors.push_back(message.into());
    }

    /// The next handshake fails with `message` (the transport stays open
    /// until the adapter closes it).
    pub fn fail_next_handshake(&self, message: impl Into<String>) {
        self.script().handshake_errors.push_back(message.into());
    }

    /// The next ping fails with `message`.
    pub fn fail_next_ping(&self, message: impl Into<String>) {
        let message: String = message.into();
        self.script().ping_errors.push_back(message.into());
    }

    /// The next ping fails with an arbitrary error value.
    pub fn fail_next_ping_with(&self, error: BoxError) {
        self.script().ping_errors.push_back(error);
    }

    /// Simulate a backend restart: every session opened so far fails its
    /// pings from now on, while new dials succeed.
    pub fn restart_backend(&self) {
        let opened = self.stats.connects();
        self.script().dead_through = opened;
    }

    pub fn fail_session_close(&self, message: impl Into<String>) {
        self.script().session_close_error = Some(message.into());
    }

    pub fn fail_transport_close(&self, message: impl Into<String>) {
        self.script().transport_close_error = Some(message.into());
    }
}

#[async_trait]
impl Driver for MockDriver {
    type Transport = MockTransport;
    type Session = MockSession;

    async fn connect(&self, _identity: &AdapterIdentity) -> Result<MockTransport, BoxError> {
        let id = self.stats.connects.fetch_add(1, Ordering::SeqCst) + 1;
        let in_flight = self.stats.dials_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats
            .max_concurrent_dials
            .fetch_max(in_flight, Ordering::SeqCst);

        let delay = self.script().connect_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.stats.dials_in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.script().connect_errors.pop_front() {
            Some(message) => Err(message.into()),
            None => Ok(MockTransport { id }),
        }
    }

    async fn handshake(
        &self,
        transport: &MockTransport,
        _identity: &AdapterIdentity,
    ) -> Result<MockSession, BoxError> {
        self.stats.handshakes.fetch_add(1, Ordering::SeqCst);
        match self.script().handshake_errors.pop_front() {
            Some(message) => Err(message.into()),
            None => Ok(MockSession { id: transport.id }),
        }
    }

    async fn ping(&self, session: &MockSession) -> Result<(), BoxError> {
        self.stats.pings.fetch_add(1, Ordering::SeqCst);
        let delay = self.script().ping_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut script = self.script();
        if session.id <= script.dead_through {
            return Err("server closed the connection unexpectedly".into());
        }
        match script.ping_errors.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn close_session(&self, _session: &MockSession) -> Result<(), BoxError> {
        self.stats.session_closes.fetch_add(1, Ordering::SeqCst);
        match self.script().session_close_error.clone() {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }

    async fn close_transport(&self, _transport: &MockTransport) -> Result<(), BoxError> {
        self.stats.transport_closes.fetch_add(1, Ordering::SeqCst);
        match self.script().transport_close_error.clone() {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }
}
