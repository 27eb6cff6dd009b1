// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Tether adapters, pools, and the registry.

use std::time::Duration;

use thiserror::Error;

use crate::types::HealthState;

/// Boxed error returned by backend drivers across the trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all Tether adapter traits and core operations.
///
/// Every adapter-level variant names the host it was talking to so that a
/// message alone identifies which backend and which phase failed.
#[derive(Debug, Error)]
pub enum TetherError {
    /// Configuration loading errors (unreadable file, bad TOML, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// A required field is missing or malformed; raised by `validate`.
    #[error("validate {host}: {message}")]
    ConfigInvalid { host: String, message: String },

    /// Dial, handshake, or the initial verification ping failed.
    #[error("open {host}: {source}")]
    OpenFailed { host: String, source: BoxError },

    /// A liveness ping on an existing handle failed.
    #[error("ping {host}: {source}")]
    PingFailed { host: String, source: BoxError },

    /// A liveness ping did not complete within its deadline.
    #[error("ping {host}: timed out after {duration:?}")]
    Timeout { host: String, duration: Duration },

    /// A liveness ping failed at the network layer.
    #[error("ping {host}: network error: {source}")]
    NetworkError { host: String, source: BoxError },

    /// One or more teardown steps failed. Every step was still attempted.
    #[error("close {host}: {}", join_errors(errors))]
    CloseFailed { host: String, errors: Vec<BoxError> },

    /// A caller passed an argument that can never be valid (nil adapter, empty name).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No adapter is registered under the given name.
    #[error("adapter not found: {name}")]
    AdapterNotFound { name: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

fn join_errors(errors: &[BoxError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl TetherError {
    /// The health state an adapter records when this error ends a check.
    pub fn health_state(&self) -> HealthState {
        match self {
            TetherError::ConfigInvalid { .. } => HealthState::ValidateFailed,
            TetherError::OpenFailed { .. } => HealthState::OpenFailed,
            TetherError::PingFailed { .. } => HealthState::PingFailed,
            TetherError::Timeout { .. } => HealthState::Timeout,
            TetherError::NetworkError { .. } => HealthState::NetworkError,
            TetherError::CloseFailed { .. } => HealthState::Closed,
            _ => HealthState::Unknown,
        }
    }

    /// Short name of the lifecycle phase that produced this error.
    pub fn phase(&self) -> &'static str {
        match self {
            TetherError::Config(_) => "config",
            TetherError::ConfigInvalid { .. } => "validate",
            TetherError::OpenFailed { .. } => "open",
            TetherError::PingFailed { .. }
            | TetherError::Timeout { .. }
            | TetherError::NetworkError { .. } => "ping",
            TetherError::CloseFailed { .. } => "close",
            TetherError::InvalidArgument(_) | TetherError::AdapterNotFound { .. } => "registry",
            TetherError::Internal(_) => "internal",
        }
    }
}
