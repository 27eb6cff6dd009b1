// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A pooled connection whose liveness signal tests can flip.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tether_core::{BoxError, PooledSession};

/// Mock pooled session.
///
/// Clones share the same closing flag, so a test can keep a clone and mark
/// the connection as closing while the pool holds the original.
#[derive(Debug, Clone)]
pub struct MockConn {
    pub id: usize,
    closing: Arc<AtomicBool>,
    closes: Arc<AtomicUsize>,
    close_error: Arc<Mutex<Option<String>>>,
}

impl MockConn {
    /// `closes` is the counter shared with whoever created the connection.
    pub fn new(id: usize, closes: Arc<AtomicUsize>) -> Self {
        Self {
            id,
            closing: Arc::new(AtomicBool::new(false)),
            closes,
            close_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Make `close` fail with the given message (after counting the call).
    pub fn with_close_error(self, message: impl Into<String>) -> Self {
        self.set_close_error(message);
        self
    }

    /// Like [`with_close_error`](Self::with_close_error), through a shared
    /// handle.
    pub fn set_close_error(&self, message: impl Into<String>) {
        *self.close_error.lock().expect("mock lock poisoned") = Some(message.into());
    }

    /// Simulate the server dropping the connection.
    pub fn mark_closing(&self) {
        self.closing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PooledSession for MockConn {
    fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<(), BoxError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.closing.store(true, Ordering::SeqCst);
        let failure = self.close_error.lock().expect("mock lock poisoned").clone();
        match failure {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }
}
