use std::time::Duration;

use super::types::PositiveU64;
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) => Ok((key.trim().to_owned(), value.trim().to_owned())),
        None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

/// Parses a requests-per-second value; fractional rates are allowed.
pub(crate) fn parse_rate(s: &str) -> AppResult<f64> {
    let value = s.trim();
    let rate: f64 = value.parse().map_err(|err| {
        AppError::validation(ValidationError::InvalidRateNumber {
            value: value.to_owned(),
            source: err,
        })
    })?;
    validate_rate(rate).map_err(AppError::from)
}

pub(crate) fn validate_rate(rate: f64) -> Result<f64, ValidationError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ValidationError::RateMustBePositive { value: rate });
    }
    Ok(rate)
}

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s, false).map_err(AppError::from)
}

pub(crate) fn parse_delay_range(s: &str) -> AppResult<(Duration, Duration)> {
    parse_delay_range_value(s).map_err(AppError::from)
}

/// Parses `low-high` (e.g. `0-5`, `100ms-2s`) into a half-open delay range.
pub(crate) fn parse_delay_range_value(s: &str) -> Result<(Duration, Duration), ValidationError> {
    let value = s.trim();
    let Some((low, high)) = value.split_once('-') else {
        return Err(ValidationError::InvalidDelayRangeFormat {
            value: value.to_owned(),
        });
    };
    let low = parse_duration_value(low, true)?;
    let high = parse_duration_value(high, true)?;
    if low >= high {
        return Err(ValidationError::DelayRangeEmpty);
    }
    Ok((low, high))
}

/// Parses `<number>[ms|s|m|h]`; a bare number is seconds.
pub(crate) fn parse_duration_value(s: &str, allow_zero: bool) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => Duration::from_secs(
            number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?,
        ),
        "h" => Duration::from_secs(
            number
                .checked_mul(3600)
                .ok_or(ValidationError::DurationOverflow)?,
        ),
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if !allow_zero && duration.is_zero() {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}
