use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveU64, SenderArgs, parse_delay_range_value, parse_header, validate_rate};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments. Options given on the
/// command line are left untouched.
///
/// # Errors
///
/// Returns an error when config values are invalid or conflict with each other.
pub fn apply_config(
    args: &mut SenderArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if config.bundle.is_some() && config.data.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "bundle",
            right: "data",
        }));
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "host")
        && let Some(host) = config.host.clone()
    {
        args.host = Some(host);
    }

    if !is_cli(matches, "path")
        && let Some(path) = config.path.clone()
    {
        args.path = path;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        args.headers = parse_headers(headers)?;
    }

    // A payload source on the command line replaces both config sources.
    let cli_payloads = is_cli(matches, "bundle") || is_cli(matches, "data");
    if !cli_payloads {
        if let Some(bundle) = config.bundle.clone() {
            args.bundle = Some(bundle);
        }
        if let Some(data) = config.data.clone() {
            args.data = Some(data);
        }
    }

    if !is_cli(matches, "repeat")
        && let Some(repeat) = config.repeat
    {
        args.repeat = ensure_positive_u64(repeat, "repeat")?;
    }

    if !is_cli(matches, "rate")
        && let Some(rate) = config.rate
    {
        args.rate = validate_rate(rate).map_err(|err| invalid_field("rate", err))?;
    }

    if !is_cli(matches, "random_delay")
        && let Some(range) = config.random_delay.as_deref()
    {
        args.random_delay =
            Some(parse_delay_range_value(range).map_err(|err| invalid_field("random_delay", err))?);
    }

    if !is_cli(matches, "mode")
        && let Some(mode) = config.mode
    {
        args.mode = mode;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = to_duration(timeout, "timeout")?;
    }

    if !is_cli(matches, "retries")
        && let Some(retries) = config.retries
    {
        args.retries = ensure_positive_u64(retries, "retries")?;
    }

    if !is_cli(matches, "retry_backoff")
        && let Some(backoff) = config.retry_backoff.as_ref()
    {
        args.retry_backoff = to_duration(backoff, "retry_backoff")?;
    }

    if !is_cli(matches, "pause_on_error")
        && let Some(pause) = config.pause_on_error.as_ref()
    {
        args.pause_on_error = Some(to_duration(pause, "pause_on_error")?);
    }

    if !is_cli(matches, "resend_status")
        && let Some(statuses) = config.resend_status.as_ref()
    {
        if let Some(invalid) = statuses
            .iter()
            .find(|status| !(100..=599).contains(*status))
        {
            return Err(invalid_field(
                "resend_status",
                ValidationError::InvalidStatusCode {
                    value: invalid.to_string(),
                },
            ));
        }
        args.resend_status = statuses.clone();
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    if !is_cli(matches, "export_json")
        && let Some(path) = config.export_json.clone()
    {
        args.export_json = Some(path);
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn parse_headers(headers: &[String]) -> AppResult<Vec<(String, String)>> {
    headers
        .iter()
        .map(|header| {
            parse_header(header)
                .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))
        })
        .collect()
}

fn to_duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value.to_duration().map_err(|err| invalid_field(field, err))
}

fn invalid_field(field: &'static str, source: ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidField { field, source })
}
