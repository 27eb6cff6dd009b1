// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, lazily-evicting session pool.
//!
//! The hot path is a local liveness check on an idle session. Reconnecting
//! and re-authenticating only happens when no idle session is alive.

use std::ops::Deref;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use tether_core::{BoxError, PooledSession, SessionFactory, TetherError};

/// A session checked out of a [`Pool`].
///
/// The holder owns the session exclusively until it hands the lease back
/// with [`Pool::release`] or [`Pool::discard`].
#[derive(Debug)]
pub struct Lease<S> {
    session: S,
    generation: u64,
}

impl<S> Lease<S> {
    pub fn session(&self) -> &S {
        &self.session
    }
}

impl<S> Deref for Lease<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

struct PoolState<S> {
    idle: Vec<Lease<S>>,
    /// Sessions created in the current generation and not yet discarded,
    /// whether idle or leased.
    open: usize,
    /// Bumped by `close_all`; leases from older generations are closed on
    /// release instead of pooled.
    generation: u64,
}

/// Pool of reusable sessions built by a [`SessionFactory`].
pub struct Pool<F: SessionFactory> {
    label: String,
    max_open: usize,
    factory: F,
    state: Mutex<PoolState<F::Session>>,
}

impl<F: SessionFactory> Pool<F> {
    /// Create an empty pool. `label` names the backend in logs and errors.
    pub fn new(label: impl Into<String>, max_open: usize, factory: F) -> Self {
        Self {
            label: label.into(),
            max_open,
            factory,
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                open: 0,
                generation: 0,
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Advisory capacity.
    pub fn capacity(&self) -> usize {
        self.max_open
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Sessions currently tracked as open (idle plus leased).
    pub async fn open_count(&self) -> usize {
        self.state.lock().await.open
    }

    pub async fn idle_count(&self) -> usize {
        self.state.lock().await.idle.len()
    }

    /// Check out a live session, building a new one only if none is idle.
    ///
    /// Idle sessions that report themselves closing are dropped along the
    /// way. Reaching `max_open` does not block: a warning is logged and a
    /// new session is built anyway.
    pub async fn acquire(&self, config: &F::Config) -> Result<Lease<F::Session>, TetherError> {
        let mut evicted = Vec::new();
        let generation = {
            let mut state = self.state.lock().await;
            let mut reused = None;
            while let Some(lease) = state.idle.pop() {
                if lease.session.is_closing() {
                    state.open = state.open.saturating_sub(1);
                    evicted.push(lease);
                } else {
                    reused = Some(lease);
                    break;
                }
            }

            if let Some(lease) = reused {
                drop(state);
                self.close_evicted(evicted).await;
                debug!(pool = %self.label, "reusing idle session");
                return Ok(lease);
            }

            state.open += 1;
            if state.open > self.max_open {
                warn!(
                    pool = %self.label,
                    open = state.open,
                    max_open = self.max_open,
                    "pool over capacity; building session anyway"
                );
            }
            state.generation
        };

        self.close_evicted(evicted).await;

        match self.factory.create(config).await {
            Ok(session) => {
                debug!(pool = %self.label, "built new session");
                Ok(Lease {
                    session,
                    generation,
                })
            }
            Err(err) => {
                let mut state = self.state.lock().await;
                if state.generation == generation {
                    state.open = state.open.saturating_sub(1);
                }
                Err(err)
            }
        }
    }

    /// Return a session for reuse.
    ///
    /// A lease from before the last [`close_all`](Self::close_all) is closed
    /// instead.
    pub async fn release(&self, lease: Lease<F::Session>) {
        let mut state = self.state.lock().await;
        if lease.generation == state.generation {
            state.idle.push(lease);
            return;
        }
        drop(state);

        debug!(pool = %self.label, "closing session released after pool shutdown");
        if let Err(err) = lease.session.close().await {
            warn!(pool = %self.label, error = %err, "failed to close stale session");
        }
    }

    /// Close a session the holder found broken and stop tracking it.
    pub async fn discard(&self, lease: Lease<F::Session>) {
        {
            let mut state = self.state.lock().await;
            if lease.generation == state.generation {
                state.open = state.open.saturating_sub(1);
            }
        }
        if let Err(err) = lease.session.close().await {
            debug!(pool = %self.label, error = %err, "error closing discarded session");
        }
    }

    /// Close every idle session and reset the pool.
    ///
    /// All closes are attempted even when some fail; failures come back as
    /// one [`TetherError::CloseFailed`]. Sessions leased out right now are
    /// closed when they are released. The pool stays usable afterwards.
    pub async fn close_all(&self) -> Result<(), TetherError> {
        let idle = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.open = 0;
            std::mem::take(&mut state.idle)
        };

        let mut errors: Vec<BoxError> = Vec::new();
        for lease in idle {
            if let Err(err) = lease.session.close().await {
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            warn!(pool = %self.label, failures = errors.len(), "errors while closing pool");
            Err(TetherError::CloseFailed {
                host: self.label.clone(),
                errors,
            })
        }
    }

    async fn close_evicted(&self, evicted: Vec<Lease<F::Session>>) {
        for lease in evicted {
            debug!(pool = %self.label, "evicting closing session");
            if let Err(err) = lease.session.close().await {
                debug!(pool = %self.label, error = %err, "error closing evicted session");
            }
        }
    }
}
