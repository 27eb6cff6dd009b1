// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tether crates.
//!
//! Provides scriptable mock implementations of every backend collaborator
//! trait, each with shared counters so tests can assert how many dials,
//! pings and closes actually happened.

pub mod conn;
pub mod mock_directory;
pub mod mock_driver;
pub mod mock_factory;

pub use conn::MockConn;
pub use mock_directory::MockDirectory;
pub use mock_driver::{DriverStats, MockDriver, MockSession, MockTransport};
pub use mock_factory::MockSessionFactory;
