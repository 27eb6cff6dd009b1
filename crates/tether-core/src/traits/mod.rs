// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for adapters and the backend collaborators they wrap.
//!
//! Everything that talks to a real backend is a trait here, using
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod directory;
pub mod driver;
pub mod session;

pub use adapter::ConnectionAdapter;
pub use directory::DirectoryDriver;
pub use driver::Driver;
pub use session::{PooledSession, SessionFactory};
