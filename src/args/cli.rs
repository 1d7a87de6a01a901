use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_delay_range, parse_duration_arg, parse_header, parse_positive_u64, parse_rate};
use super::defaults::DEFAULT_RATE;
use super::types::{DispatchMode, HttpMethod, OutputFormat, PositiveU64};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Bulk JSON request dispatcher for load and fuzz testing - paced sync, async, and protected (resend-on-failure) modes."
)]
pub struct SenderArgs {
    /// Path to config file (TOML or JSON)
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// HTTP method to use (POST, PUT, or DELETE)
    #[arg(long, short = 'X', default_value = "post", ignore_case = true)]
    pub method: HttpMethod,

    /// Target host, including scheme (e.g., https://api.example.com)
    #[arg(long, short = 'u', alias = "url")]
    pub host: Option<String>,

    /// Endpoint path appended to the host
    #[arg(long, short = 'p', default_value = "/")]
    pub path: String,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long, short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Bundle of payloads (.json array or .jsonl, one payload per line)
    #[arg(long, short = 'b', conflicts_with = "data")]
    pub bundle: Option<String>,

    /// Inline JSON payload, repeated --repeat times
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Number of copies of --data to send
    #[arg(long, short = 'n', default_value = "1", value_parser = parse_positive_u64)]
    pub repeat: PositiveU64,

    /// Requests per second (fractional values allowed, must be > 0)
    #[arg(long, short = 'r', default_value_t = DEFAULT_RATE, value_parser = parse_rate)]
    pub rate: f64,

    /// Random delay range between sends instead of a stable rate (e.g., 0-5, 100ms-2s)
    #[arg(long = "random-delay", value_parser = parse_delay_range)]
    pub random_delay: Option<(Duration, Duration)>,

    /// Dispatch strategy
    #[arg(long, short = 'm', default_value = "sync", ignore_case = true)]
    pub mode: DispatchMode,

    /// Request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Transport attempts per request on connection errors
    #[arg(long = "retries", default_value = "120", value_parser = parse_positive_u64)]
    pub retries: PositiveU64,

    /// Delay between transport attempts (supports ms/s/m/h)
    #[arg(
        long = "retry-backoff",
        default_value = "1s",
        value_parser = parse_duration_arg
    )]
    pub retry_backoff: Duration,

    /// Suspend the run for this long whenever a response is not OK
    #[arg(long = "pause-on-error", value_parser = parse_duration_arg)]
    pub pause_on_error: Option<Duration>,

    /// Status codes that trigger a resend in protected mode (comma separated; default: any non-2xx)
    #[arg(
        long = "resend-status",
        value_delimiter = ',',
        value_parser = clap::value_parser!(u16).range(100..=599)
    )]
    pub resend_status: Vec<u16>,

    /// Summary output format
    #[arg(long = "output-format", default_value = "text")]
    pub output_format: OutputFormat,

    /// Write the results bundle to a JSON file
    #[arg(long = "export-json")]
    pub export_json: Option<String>,

    /// Enable debug logging (every request and response)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
