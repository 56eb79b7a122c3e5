//! Polling for asynchronous scanner jobs
//!
//! Scans and report exports run server-side; the client waits for them by
//! fetching a status at a fixed interval until it reaches a final state.
//! A deadline bounds the wait; dropping the future cancels it too.

use std::future::Future;
use std::time::Duration;

use log::debug;
use serde::{Serialize, Serializer};

use super::reply::Reply;

/// How often to poll and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    /// Give up after this long; `None` waits indefinitely
    pub deadline: Option<Duration>,
}

impl PollOptions {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Result of one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep<T> {
    Done(T),
    Pending,
    /// The job is gone or failed; stop polling
    Abort,
}

/// Result of a whole wait.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    Ready(T),
    Aborted,
    TimedOut,
}

impl<T> PollOutcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            PollOutcome::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Call `poll` until it reports `Done` or `Abort`, sleeping `interval`
/// between calls.
pub async fn wait_until<T, F, Fut>(poll: F, options: PollOptions) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollStep<T>>,
{
    let polling = poll_loop(poll, options.interval);
    match options.deadline {
        Some(deadline) => tokio::time::timeout(deadline, polling)
            .await
            .unwrap_or(PollOutcome::TimedOut),
        None => polling.await,
    }
}

async fn poll_loop<T, F, Fut>(mut poll: F, interval: Duration) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollStep<T>>,
{
    let mut polls = 0u32;
    loop {
        polls += 1;
        match poll().await {
            PollStep::Done(value) => return PollOutcome::Ready(value),
            PollStep::Abort => return PollOutcome::Aborted,
            PollStep::Pending => {
                debug!("poll {} pending; sleeping {:?}", polls, interval);
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Scan state as reported in `info.status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Pending,
    Running,
    Paused,
    Stopping,
    Completed,
    Canceled,
    Imported,
    /// The scan details call itself returned an error object
    Error(String),
    Other(String),
}

impl ScanStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "pending" => ScanStatus::Pending,
            "running" => ScanStatus::Running,
            "paused" => ScanStatus::Paused,
            "stopping" => ScanStatus::Stopping,
            "completed" => ScanStatus::Completed,
            "canceled" => ScanStatus::Canceled,
            "imported" => ScanStatus::Imported,
            other => ScanStatus::Other(other.to_string()),
        }
    }

    /// No further progress is expected.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanStatus::Completed | ScanStatus::Canceled | ScanStatus::Imported
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Running => "running",
            ScanStatus::Paused => "paused",
            ScanStatus::Stopping => "stopping",
            ScanStatus::Completed => "completed",
            ScanStatus::Canceled => "canceled",
            ScanStatus::Imported => "imported",
            ScanStatus::Error(_) => "error",
            ScanStatus::Other(status) => status.as_str(),
        }
    }
}

impl Serialize for ScanStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpret a scan details reply.
///
/// An error object ends the wait with [`ScanStatus::Error`]. Degraded
/// replies and missing statuses keep polling.
pub fn scan_step(reply: Reply) -> PollStep<ScanStatus> {
    if let Reply::ServerError { message, .. } = reply {
        return PollStep::Done(ScanStatus::Error(message));
    }

    let body = reply.into_json();
    let status = body
        .pointer("/info/status")
        .and_then(|status| status.as_str())
        .map(ScanStatus::parse);

    match status {
        Some(status) if status.is_terminal() => PollStep::Done(status),
        Some(status) => {
            debug!("scan status: {}", status);
            PollStep::Pending
        }
        None => PollStep::Pending,
    }
}

/// Interpret an export status reply.
///
/// An empty or missing status means the export is unknown or failed.
pub fn export_step(reply: Reply) -> PollStep<()> {
    let body = reply.into_json();
    match body.get("status").and_then(|status| status.as_str()) {
        None | Some("") => PollStep::Abort,
        Some("ready") => PollStep::Done(()),
        Some(status) => {
            debug!("export status: {}", status);
            PollStep::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::reply::Degraded;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_polls_until_done() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let outcome = wait_until(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n == 3 {
                        PollStep::Done(n)
                    } else {
                        PollStep::Pending
                    }
                }
            },
            PollOptions::every(Duration::from_secs(5)),
        )
        .await;

        assert_eq!(outcome, PollOutcome::Ready(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_abort() {
        let outcome: PollOutcome<()> = wait_until(
            || async { PollStep::Abort },
            PollOptions::every(Duration::from_secs(1)),
        )
        .await;
        assert_eq!(outcome, PollOutcome::Aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_deadline() {
        let calls = AtomicU32::new(0);

        let outcome: PollOutcome<()> = wait_until(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { PollStep::Pending }
            },
            PollOptions::every(Duration::from_secs(1)).with_deadline(Duration::from_millis(3500)),
        )
        .await;

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_scan_status_terminal_set() {
        for status in ["completed", "canceled", "imported"] {
            assert!(ScanStatus::parse(status).is_terminal());
        }
        for status in ["running", "pending", "paused", "stopping", "aborted", ""] {
            assert!(!ScanStatus::parse(status).is_terminal());
        }
        assert_eq!(ScanStatus::parse("aborted"), ScanStatus::Other("aborted".to_string()));
    }

    #[test]
    fn test_scan_step() {
        let running = Reply::Json(json!({"info": {"status": "running"}}));
        assert_eq!(scan_step(running), PollStep::Pending);

        let done = Reply::Json(json!({"info": {"status": "completed"}}));
        assert_eq!(scan_step(done), PollStep::Done(ScanStatus::Completed));

        let error = Reply::ServerError {
            status: 404,
            message: "The requested scan does not exist".to_string(),
            body: json!({"error": "The requested scan does not exist"}),
        };
        assert_eq!(
            scan_step(error),
            PollStep::Done(ScanStatus::Error(
                "The requested scan does not exist".to_string()
            ))
        );

        let degraded = Reply::Degraded(Degraded::Unparseable { status: 502 });
        assert_eq!(scan_step(degraded), PollStep::Pending);
    }

    #[test]
    fn test_export_step() {
        assert_eq!(export_step(Reply::Json(json!({"status": ""}))), PollStep::Abort);
        assert_eq!(export_step(Reply::Json(json!({}))), PollStep::Abort);
        assert_eq!(
            export_step(Reply::Json(json!({"status": "loading"}))),
            PollStep::Pending
        );
        assert_eq!(
            export_step(Reply::Json(json!({"status": "ready"}))),
            PollStep::Done(())
        );
        assert_eq!(
            export_step(Reply::Degraded(Degraded::InvalidUri("x".to_string()))),
            PollStep::Abort
        );
    }

    #[test]
    fn test_scan_status_display() {
        assert_eq!(ScanStatus::Completed.to_string(), "completed");
        assert_eq!(ScanStatus::Error("boom".to_string()).to_string(), "error");
    }
}
