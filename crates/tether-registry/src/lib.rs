// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of configured adapters, keyed by adapter name.
//!
//! One instance is built at startup and passed to whoever needs to resolve
//! a backend by name. It is torn down with
//! [`AdapterRegistry::close_all`] at shutdown.

pub mod registry;

pub use registry::{AdapterRegistry, TestReport};
