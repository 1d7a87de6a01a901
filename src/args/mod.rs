//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::SenderArgs;
pub use types::{DispatchMode, HttpMethod, OutputFormat, PositiveU64};

pub(crate) use defaults::{
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF,
    DEFAULT_USER_AGENT,
};
pub(crate) use parsers::{
    parse_delay_range, parse_delay_range_value, parse_duration_arg, parse_duration_value,
    parse_header, parse_rate, validate_rate,
};
