// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether doctor` command implementation.
//!
//! Builds a registry of probe-backed adapters from the configuration,
//! tests them all concurrently, prints one line per adapter, and tears the
//! registry down again.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use tether_adapter::{Adapter, DirectoryAdapter, TcpProbeDriver};
use tether_config::TetherConfig;
use tether_core::TetherError;
use tether_registry::{AdapterRegistry, TestReport};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
}

/// Result of checking one adapter.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl From<&TestReport> for CheckResult {
    fn from(report: &TestReport) -> Self {
        let (status, message) = match &report.outcome {
            Ok(health) if health.is_healthy() => (CheckStatus::Pass, health.state.to_string()),
            Ok(health) => (CheckStatus::Fail, health.state.to_string()),
            Err(err) => (CheckStatus::Fail, err.to_string()),
        };
        Self {
            name: report.name.clone(),
            status,
            message,
            duration: report.elapsed,
        }
    }
}

/// Register one TCP-probe adapter per configured backend.
pub async fn build_registry(config: &TetherConfig) -> Result<AdapterRegistry, TetherError> {
    let registry = AdapterRegistry::new();
    let policy = config.health.policy();
    for entry in &config.adapters {
        if entry.kind.is_pooled() {
            let adapter =
                DirectoryAdapter::from_config(entry, policy, config.pool.max_open, TcpProbeDriver);
            registry.insert(Arc::new(adapter)).await?;
        } else {
            let adapter = Adapter::from_config(entry, policy, TcpProbeDriver);
            registry.insert(Arc::new(adapter)).await?;
        }
    }
    Ok(registry)
}

/// Run the `tether doctor` command.
///
/// Returns `Ok(false)` when any adapter is unhealthy. With `plain`, output
/// is never colored.
pub async fn run_doctor(config: &TetherConfig, plain: bool) -> Result<bool, TetherError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let registry = build_registry(config).await?;

    let results: Vec<CheckResult> = registry
        .test_all()
        .await
        .iter()
        .map(CheckResult::from)
        .collect();

    for (name, err) in registry.close_all().await {
        tracing::warn!(adapter = %name, error = %err, "error closing adapter after checks");
    }

    println!();
    println!("  tether doctor");
    println!("  {}", "-".repeat(50));

    if results.is_empty() {
        println!("    no adapters configured");
    }
    for result in &results {
        println!("{}", format_line(result, use_color));
    }
    println!();

    let failures = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    if failures > 0 {
        let word = if failures == 1 { "adapter" } else { "adapters" };
        println!("  {failures} {word} unhealthy.");
    } else {
        println!("  All adapters healthy.");
    }
    println!();

    Ok(failures == 0)
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    match (&result.status, use_color) {
        (CheckStatus::Pass, true) => {
            use colored::Colorize;
            format!(
                "    {} {:<20} {} ({duration_ms}ms)",
                "✓".green(),
                result.name,
                result.message
            )
        }
        (CheckStatus::Fail, true) => {
            use colored::Colorize;
            format!(
                "    {} {:<20} {} ({duration_ms}ms)",
                "✗".red(),
                result.name,
                result.message.red()
            )
        }
        (CheckStatus::Pass, false) => format!(
            "    [OK]   {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        ),
        (CheckStatus::Fail, false) => format!(
            "    [FAIL] {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        ),
    }
}
