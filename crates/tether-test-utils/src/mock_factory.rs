// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock session factory for pool tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tether_core::{SessionFactory, TetherError};

use crate::conn::MockConn;

#[derive(Default)]
struct Inner {
    creates: AtomicUsize,
    closes: Arc<AtomicUsize>,
    failures: Mutex<VecDeque<String>>,
    close_error: Mutex<Option<String>>,
    issued: Mutex<Vec<MockConn>>,
}

/// Session factory that hands out [`MockConn`]s and counts calls.
///
/// Clones share state; keep one in the test and give one to the pool.
#[derive(Clone, Default)]
pub struct MockSessionFactory {
    inner: Arc<Inner>,
}

impl MockSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `create` call fails with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.inner
            .failures
            .lock()
            .expect("mock lock poisoned")
            .push_back(message.into());
    }

    /// Every session created from now on fails to close.
    pub fn fail_closes(&self, message: impl Into<String>) {
        *self.inner.close_error.lock().expect("mock lock poisoned") = Some(message.into());
    }

    /// Number of `create` calls, including failed ones.
    pub fn creates(&self) -> usize {
        self.inner.creates.load(Ordering::SeqCst)
    }

    /// Number of `close` calls across all issued sessions.
    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    /// Handles to every session created so far, in creation order.
    pub fn issued(&self) -> Vec<MockConn> {
        self.inner.issued.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    type Config = str;
    type Session = MockConn;

    async fn create(&self, config: &str) -> Result<MockConn, TetherError> {
        let id = self.inner.creates.fetch_add(1, Ordering::SeqCst) + 1;

        let failure = self
            .inner
            .failures
            .lock()
            .expect("mock lock poisoned")
            .pop_front();
        if let Some(message) = failure {
            return Err(TetherError::OpenFailed {
                host: config.to_string(),
                source: message.into(),
            });
        }

        let mut conn = MockConn::new(id, Arc::clone(&self.inner.closes));
        if let Some(message) = self.inner.close_error.lock().expect("mock lock poisoned").clone() {
            conn = conn.with_close_error(message);
        }
        self.inner
            .issued
            .lock()
            .expect("mock lock poisoned")
            .push(conn.clone());
        Ok(conn)
    }
}
