// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping driver ping failures onto the adapter error taxonomy.

use std::future::Future;
use std::io;
use std::time::Duration;

use tether_core::{BoxError, TetherError};

/// Classify a ping failure on an existing handle.
///
/// Deadline expiry becomes `Timeout`; refused connections and anything whose
/// message mentions the network become `NetworkError`; the rest is
/// `PingFailed`.
pub fn classify_ping_error(host: &str, deadline: Duration, err: BoxError) -> TetherError {
    if is_deadline(&*err) {
        return TetherError::Timeout {
            host: host.to_string(),
            duration: deadline,
        };
    }
    if is_network(&*err) {
        return TetherError::NetworkError {
            host: host.to_string(),
            source: err,
        };
    }
    TetherError::PingFailed {
        host: host.to_string(),
        source: err,
    }
}

/// Run a ping under `deadline` and classify whatever goes wrong.
pub async fn bounded_ping<F>(host: &str, deadline: Duration, ping: F) -> Result<(), TetherError>
where
    F: Future<Output = Result<(), BoxError>>,
{
    match tokio::time::timeout(deadline, ping).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(classify_ping_error(host, deadline, err)),
        Err(elapsed) => Err(classify_ping_error(host, deadline, Box::new(elapsed))),
    }
}

fn chain<'a>(
    err: &'a (dyn std::error::Error + 'static),
) -> impl Iterator<Item = &'a (dyn std::error::Error + 'static)> {
    std::iter::successors(Some(err), |e| e.source())
}

fn is_deadline(err: &(dyn std::error::Error + Send + Sync + 'static)) -> bool {
    chain(err).any(|e| {
        e.is::<tokio::time::error::Elapsed>()
            || e.downcast_ref::<io::Error>()
                .is_some_and(|io| io.kind() == io::ErrorKind::TimedOut)
    })
}

fn is_network(err: &(dyn std::error::Error + Send + Sync + 'static)) -> bool {
    chain(err).any(|e| {
        if e.downcast_ref::<io::Error>()
            .is_some_and(|io| io.kind() == io::ErrorKind::ConnectionRefused)
        {
            return true;
        }
        let message = e.to_string().to_lowercase();
        message.contains("network") || message.contains("connection refused")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "db.internal:5432";
    const DEADLINE: Duration = Duration::from_secs(5);

    #[test]
    fn refused_message_is_network_error() {
        let err = classify_ping_error(HOST, DEADLINE, "dial tcp: Connection Refused".into());
        assert!(matches!(err, TetherError::NetworkError { .. }), "{err}");
    }

    #[test]
    fn network_word_is_network_error() {
        let err = classify_ping_error(HOST, DEADLINE, "network is unreachable".into());
        assert!(matches!(err, TetherError::NetworkError { .. }), "{err}");
    }

    #[test]
    fn refused_io_kind_is_network_error() {
        let io = io::Error::new(io::ErrorKind::ConnectionRefused, "os error 111");
        let err = classify_ping_error(HOST, DEADLINE, Box::new(io));
        assert!(matches!(err, TetherError::NetworkError { .. }), "{err}");
    }

    #[test]
    fn timed_out_io_kind_is_timeout() {
        let io = io::Error::new(io::ErrorKind::TimedOut, "read timed out");
        let err = classify_ping_error(HOST, DEADLINE, Box::new(io));
        match err {
            TetherError::Timeout { host, duration } => {
                assert_eq!(host, HOST);
                assert_eq!(duration, DEADLINE);
            }
            other => panic!("expected timeout, got {other}"),
        }
    }

    #[test]
    fn anything_else_is_ping_failed() {
        let err = classify_ping_error(HOST, DEADLINE, "ORA-03113: end-of-file on channel".into());
        assert!(matches!(err, TetherError::PingFailed { .. }), "{err}");
        assert_eq!(err.to_string(), "ping db.internal:5432: ORA-03113: end-of-file on channel");
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_ping_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<(), BoxError>(())
        };
        let err = bounded_ping(HOST, DEADLINE, slow).await.unwrap_err();
        assert!(matches!(err, TetherError::Timeout { .. }), "{err}");
    }

    #[tokio::test]
    async fn bounded_ping_passes_success_through() {
        bounded_ping(HOST, DEADLINE, async { Ok::<(), BoxError>(()) }).await.unwrap();
    }
}
