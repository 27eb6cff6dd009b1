// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session pooling for backends where session setup is expensive.
//!
//! A [`Pool`] reuses sessions that still report themselves alive and
//! evicts dead ones lazily, on the next acquire, instead of sweeping in
//! the background. Its capacity is advisory: construction never blocks.

pub mod pool;

pub use pool::{Lease, Pool};
