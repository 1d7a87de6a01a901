use std::time::Duration;

use clap::Parser;

use super::*;
use crate::error::{AppError, AppResult, ValidationError};

fn parse_test_args<I, T>(args: I) -> AppResult<SenderArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    SenderArgs::try_parse_from(args)
        .map_err(|err| AppError::validation(format!("Expected parse success: {}", err)))
}

#[test]
fn parse_args_defaults() -> AppResult<()> {
    let args = parse_test_args(["bulksend", "-u", "http://localhost", "-d", "{}"])?;

    let checks = [
        (args.method == HttpMethod::Post, "Expected HttpMethod::Post"),
        (args.mode == DispatchMode::Sync, "Expected DispatchMode::Sync"),
        (args.path == "/", "Unexpected path"),
        (args.headers.is_empty(), "Expected no headers"),
        (args.bundle.is_none(), "Expected bundle to be None"),
        (args.repeat.get() == 1, "Unexpected repeat"),
        ((args.rate - defaults::DEFAULT_RATE).abs() < f64::EPSILON, "Unexpected rate"),
        (args.random_delay.is_none(), "Expected random_delay to be None"),
        (
            args.request_timeout == DEFAULT_REQUEST_TIMEOUT,
            "Unexpected request_timeout",
        ),
        (
            args.retries.get() == DEFAULT_RETRY_ATTEMPTS,
            "Unexpected retries",
        ),
        (
            args.retry_backoff == DEFAULT_RETRY_BACKOFF,
            "Unexpected retry_backoff",
        ),
        (args.pause_on_error.is_none(), "Expected pause_on_error unset"),
        (args.resend_status.is_empty(), "Expected resend_status empty"),
        (
            args.output_format == OutputFormat::Text,
            "Expected OutputFormat::Text",
        ),
        (args.export_json.is_none(), "Expected export_json unset"),
        (!args.verbose, "Expected verbose to be false"),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(AppError::validation(message));
        }
    }
    Ok(())
}

#[test]
fn parse_args_full_option_set() -> AppResult<()> {
    let args = parse_test_args([
        "bulksend",
        "--url",
        "https://api.example.com",
        "-X",
        "put",
        "-p",
        "/v1/items",
        "-H",
        "Authorization: Bearer abc",
        "-b",
        "payloads.jsonl",
        "-r",
        "2.5",
        "--random-delay",
        "100ms-2s",
        "-m",
        "protected",
        "--timeout",
        "5s",
        "--retries",
        "3",
        "--retry-backoff",
        "250ms",
        "--pause-on-error",
        "10s",
        "--resend-status",
        "429,503",
        "--output-format",
        "json",
        "--export-json",
        "out.json",
        "-v",
    ])?;

    let checks = [
        (args.method == HttpMethod::Put, "Expected HttpMethod::Put"),
        (
            args.host.as_deref() == Some("https://api.example.com"),
            "Unexpected host",
        ),
        (args.path == "/v1/items", "Unexpected path"),
        (
            args.headers == vec![("Authorization".to_owned(), "Bearer abc".to_owned())],
            "Unexpected headers",
        ),
        (
            args.bundle.as_deref() == Some("payloads.jsonl"),
            "Unexpected bundle",
        ),
        ((args.rate - 2.5).abs() < f64::EPSILON, "Unexpected rate"),
        (
            args.random_delay == Some((Duration::from_millis(100), Duration::from_secs(2))),
            "Unexpected random_delay",
        ),
        (args.mode == DispatchMode::Protected, "Expected protected mode"),
        (
            args.request_timeout == Duration::from_secs(5),
            "Unexpected timeout",
        ),
        (args.retries.get() == 3, "Unexpected retries"),
        (
            args.retry_backoff == Duration::from_millis(250),
            "Unexpected retry_backoff",
        ),
        (
            args.pause_on_error == Some(Duration::from_secs(10)),
            "Unexpected pause_on_error",
        ),
        (args.resend_status == vec![429, 503], "Unexpected resend_status"),
        (
            args.output_format == OutputFormat::Json,
            "Expected OutputFormat::Json",
        ),
        (
            args.export_json.as_deref() == Some("out.json"),
            "Unexpected export_json",
        ),
        (args.verbose, "Expected verbose"),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(AppError::validation(message));
        }
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_and_negative_rate() -> AppResult<()> {
    for rate in ["0", "-1", "nan", "fast"] {
        if SenderArgs::try_parse_from(["bulksend", "-d", "{}", "-r", rate]).is_ok() {
            return Err(AppError::validation(format!(
                "Expected rate '{}' to be rejected",
                rate
            )));
        }
    }
    Ok(())
}

#[test]
fn parse_args_rejects_unknown_mode() -> AppResult<()> {
    if SenderArgs::try_parse_from(["bulksend", "-d", "{}", "-m", "turbo"]).is_ok() {
        return Err(AppError::validation("Expected unknown mode to be rejected"));
    }
    Ok(())
}

#[test]
fn parse_args_bundle_conflicts_with_data() -> AppResult<()> {
    if SenderArgs::try_parse_from(["bulksend", "-b", "a.json", "-d", "{}"]).is_ok() {
        return Err(AppError::validation("Expected --bundle/--data conflict"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_out_of_range_status() -> AppResult<()> {
    if SenderArgs::try_parse_from(["bulksend", "-d", "{}", "--resend-status", "42"]).is_ok() {
        return Err(AppError::validation("Expected status 42 to be rejected"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_repeat() -> AppResult<()> {
    if SenderArgs::try_parse_from(["bulksend", "-d", "{}", "-n", "0"]).is_ok() {
        return Err(AppError::validation("Expected repeat 0 to be rejected"));
    }
    Ok(())
}

#[test]
fn get_method_parses_but_is_not_dispatchable() -> AppResult<()> {
    let args = parse_test_args(["bulksend", "-d", "{}", "-X", "GET"])?;
    if args.method != HttpMethod::Get || args.method.is_dispatchable() {
        return Err(AppError::validation("Expected GET to parse as non-dispatchable"));
    }
    for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete] {
        if !method.is_dispatchable() {
            return Err(AppError::validation(format!("{} should dispatch", method)));
        }
    }
    if parse_test_args(["bulksend", "-d", "{}", "-X", "PATCH"]).is_ok() {
        return Err(AppError::validation("PATCH is not an accepted method"));
    }
    Ok(())
}

#[test]
fn parse_header_valid() -> AppResult<()> {
    let (key, value) = parse_header("Content-Type: application/json")
        .map_err(|err| AppError::validation(format!("Expected Ok, got Err: {}", err)))?;
    if key != "Content-Type" || value != "application/json" {
        return Err(AppError::validation(format!(
            "Unexpected header: {}: {}",
            key, value
        )));
    }
    Ok(())
}

#[test]
fn parse_header_invalid() -> AppResult<()> {
    match parse_header("MissingDelimiter") {
        Err(ValidationError::InvalidHeaderFormat { .. }) => Ok(()),
        other => Err(AppError::validation(format!(
            "Expected InvalidHeaderFormat, got {:?}",
            other
        ))),
    }
}

#[test]
fn parse_rate_accepts_fractions() -> AppResult<()> {
    let rate = parse_rate("0.5")?;
    if (rate - 0.5).abs() > f64::EPSILON {
        return Err(AppError::validation(format!("Unexpected rate: {}", rate)));
    }
    match parse_rate("0") {
        Err(AppError::Validation(ValidationError::RateMustBePositive { .. })) => Ok(()),
        other => Err(AppError::validation(format!(
            "Expected RateMustBePositive, got {:?}",
            other
        ))),
    }
}

#[test]
fn parse_duration_units() -> AppResult<()> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("3", Duration::from_secs(3)),
        ("2s", Duration::from_secs(2)),
        ("1m", Duration::from_secs(60)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_arg(input)?;
        if parsed != expected {
            return Err(AppError::validation(format!(
                "parse_duration_arg({}) = {:?}",
                input, parsed
            )));
        }
    }
    for input in ["", "0s", "5d", "ms"] {
        if parse_duration_arg(input).is_ok() {
            return Err(AppError::validation(format!(
                "Expected '{}' to be rejected",
                input
            )));
        }
    }
    Ok(())
}

#[test]
fn parse_delay_range_bounds() -> AppResult<()> {
    let (low, high) = parse_delay_range("0-5")?;
    if low != Duration::ZERO || high != Duration::from_secs(5) {
        return Err(AppError::validation("Unexpected range for 0-5"));
    }
    for input in ["5-5", "3-1", "5", "a-b"] {
        if parse_delay_range(input).is_ok() {
            return Err(AppError::validation(format!(
                "Expected '{}' to be rejected",
                input
            )));
        }
    }
    Ok(())
}
