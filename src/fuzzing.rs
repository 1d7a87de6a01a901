//! Entry points for the `cargo fuzz` targets under `fuzz/`.
use std::path::Path;
use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::{
    PositiveU64, SenderArgs, parse_delay_range, parse_duration_arg, parse_header, parse_rate,
};
use crate::bundle::RequestBundle;
use crate::config::apply_config;
use crate::config::types::ConfigFile;
use crate::error::{AppError, AppResult};

thread_local! {
    static BASE_MATCHES: ArgMatches = SenderArgs::command().get_matches_from(["bulksend"]);
}

/// Parses a header string in `Key: Value` format.
///
/// # Errors
///
/// Returns an error when the header is malformed.
pub fn parse_header_input(input: &str) -> AppResult<(String, String)> {
    parse_header(input).map_err(AppError::from)
}

/// Parses a duration argument (e.g. `10s`, `500ms`).
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_arg_input(input: &str) -> AppResult<Duration> {
    parse_duration_arg(input)
}

/// # Errors
///
/// Returns an error when the range is malformed or empty.
pub fn parse_delay_range_input(input: &str) -> AppResult<(Duration, Duration)> {
    parse_delay_range(input)
}

/// # Errors
///
/// Returns an error when the rate is not a finite value > 0.
pub fn parse_rate_input(input: &str) -> AppResult<f64> {
    parse_rate(input)
}

/// # Errors
///
/// Returns an error when the value is invalid or zero.
pub fn parse_positive_u64_input(input: &str) -> AppResult<u64> {
    let value: PositiveU64 = input.parse()?;
    Ok(value.get())
}

/// Parses newline-delimited JSON the way `.jsonl` bundles are loaded.
///
/// # Errors
///
/// Returns an error naming the first line that is not valid JSON.
pub fn parse_bundle_lines_input(input: &str) -> AppResult<usize> {
    RequestBundle::parse_lines(input, Path::new("<fuzz>.jsonl")).map(|bundle| bundle.len())
}

/// Parses a JSON document the way `.json` bundles are loaded.
///
/// # Errors
///
/// Returns an error when the document is not valid JSON.
pub fn parse_bundle_document_input(input: &str) -> AppResult<usize> {
    RequestBundle::parse_document(input, Path::new("<fuzz>.json")).map(|bundle| bundle.len())
}

/// Parses TOML config and applies it to defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_toml(input: &str) -> AppResult<()> {
    let config: ConfigFile = toml::from_str(input)?;
    apply_config_to_defaults(&config)
}

/// Parses JSON config and applies it to defaults.
///
/// # Errors
///
/// Returns an error when parsing or validation fails.
pub fn apply_config_from_json(input: &[u8]) -> AppResult<()> {
    let config: ConfigFile = serde_json::from_slice(input)?;
    apply_config_to_defaults(&config)
}

/// Loads a config file from disk to exercise extension handling.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn load_config_file_input(path: &Path) -> AppResult<()> {
    crate::config::load_config_file(path).map(|_| ())
}

fn apply_config_to_defaults(config: &ConfigFile) -> AppResult<()> {
    BASE_MATCHES.with(|matches| {
        let mut args = SenderArgs::from_arg_matches(matches)?;
        apply_config(&mut args, matches, config)
    })
}
