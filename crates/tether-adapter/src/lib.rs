// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend adapters for Tether.
//!
//! [`Adapter`] manages a single transport-plus-session connection for SQL
//! and SFTP backends; [`DirectoryAdapter`] keeps a pool of bound sessions
//! for directory servers. Both implement
//! [`ConnectionAdapter`](tether_core::ConnectionAdapter) and share the
//! validation and health bookkeeping in [`AdapterCore`].

mod accessor;
pub mod adapter;
pub mod classify;
pub mod state;
pub mod directory;
pub mod probe;

pub use adapter::Adapter;
pub use classify::{bounded_ping, classify_ping_error};
pub use state::{normalize, AdapterCore};
pub use directory::{BindFactory, DirectoryAdapter};
pub use probe::{ProbeSession, ProbeTransport, TcpProbeDriver};
