//! Operational telemetry events and sinks.
//!
//! The proxy records one event per authorization and comment write so that
//! operators can count verified accesses, installation checks, and outcomes.
//! Exporting the events is the embedding binary's concern.

use std::io;

use serde::{Deserialize, Serialize};

#[cfg(feature = "test-support")]
pub mod test_support;

/// A structured telemetry event emitted by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// An identity was matched against a target repository.
    RepositoryAccessVerified {
        /// `owner/repo` of the target.
        repository: String,
    },
    /// Installation verifiers were consulted for a target repository.
    InstallationVerificationAttempted {
        /// `owner/repo` of the target.
        repository: String,
    },
    /// A new comment was posted.
    CommentCreated {
        /// `owner/repo` of the target.
        repository: String,
        /// Pull request number.
        pull_request: u64,
    },
    /// An existing comment was replaced.
    CommentUpdated {
        /// `owner/repo` of the target.
        repository: String,
        /// Pull request number.
        pull_request: u64,
    },
    /// A request completed.
    ExecutionSucceeded,
    /// A request failed.
    ExecutionFailed {
        /// Failure category.
        reason: String,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}
