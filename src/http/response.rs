use std::time::Duration;

/// Response as seen by the dispatch engine, independent of the transport that
/// produced it.
///
/// A transport that gives up after its retries returns a failure sentinel:
/// no status, an error message, and an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    status: Option<u16>,
    body: String,
    elapsed: Duration,
    attempts: u64,
    error: Option<String>,
}

impl TransportResponse {
    #[must_use]
    pub const fn completed(status: u16, body: String, elapsed: Duration, attempts: u64) -> Self {
        Self {
            status: Some(status),
            body,
            elapsed,
            attempts,
            error: None,
        }
    }

    #[must_use]
    pub const fn failed(error: String, elapsed: Duration, attempts: u64) -> Self {
        Self {
            status: None,
            body: String::new(),
            elapsed,
            attempts,
            error: Some(error),
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// `true` for 2xx statuses.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.is_some_and(|status| (200..300).contains(&status))
    }

    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        self.status.is_none()
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub const fn attempts(&self) -> u64 {
        self.attempts
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
