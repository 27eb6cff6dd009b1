// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Tether backend adapters.
//!
//! This crate provides the error taxonomy, health types, adapter identity,
//! and the collaborator traits used throughout the workspace. Backend
//! drivers implement the traits defined here; adapters, pools and the
//! registry consume them.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{BoxError, TetherError};
pub use types::{
    AdapterIdentity, AdapterKind, HealthPolicy, HealthState, HealthStatus,
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_OPEN, DEFAULT_PING_TIMEOUT, DEFAULT_STALE_AFTER,
};

pub use traits::{ConnectionAdapter, DirectoryDriver, Driver, PooledSession, SessionFactory};
