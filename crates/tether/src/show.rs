// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether config` command: print adapters as they will be used, after
//! defaults are applied. Passwords are never printed.

use secrecy::ExposeSecret;

use tether_adapter::normalize;
use tether_config::TetherConfig;

/// Print every configured adapter on one line each.
pub fn run_config(config: &TetherConfig) {
    println!(
        "log.level={} health.stale_after_secs={} health.ping_timeout_secs={} pool.max_open={}",
        config.log.level,
        config.health.stale_after_secs,
        config.health.ping_timeout_secs,
        config.pool.max_open
    );
    for line in render_adapters(config) {
        println!("{line}");
    }
}

fn render_adapters(config: &TetherConfig) -> Vec<String> {
    config
        .adapters
        .iter()
        .map(|entry| {
            let mut identity = entry.identity();
            if let Err(err) = normalize(&mut identity) {
                return format!("{:<16} {:<10} invalid: {err}", entry.name, entry.kind);
            }
            let password = if identity.password.expose_secret().is_empty() {
                "(none)"
            } else {
                "********"
            };
            format!(
                "{:<16} {:<10} {} tls={} {}={} user={} password={} timeout={}s",
                identity.name,
                identity.kind,
                identity.address(),
                identity.tls_enabled(),
                identity.kind.required_field(),
                identity.required_value(),
                if identity.username.is_empty() { "-" } else { identity.username.as_str() },
                password,
                identity.connect_timeout.as_secs()
            )
        })
        .collect()
}
