use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("bulksend/", env!("CARGO_PKG_VERSION"));

/// Requests per second when neither the CLI nor the config sets a rate.
pub(crate) const DEFAULT_RATE: f64 = 1.0;

/// Transport attempts per request before the failure sentinel is returned.
pub(crate) const DEFAULT_RETRY_ATTEMPTS: u64 = 120;

pub(crate) const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
