use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid header format: '{value}'. Expected 'Key: Value'")]
    InvalidHeaderFormat { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Invalid delay range '{value}'. Expected 'low-high' (e.g., 100ms-2s).")]
    InvalidDelayRangeFormat { value: String },
    #[error("Delay range low bound must be < high bound.")]
    DelayRangeEmpty,
    #[error("Invalid rate '{value}': {source}")]
    InvalidRateNumber {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("Rate must be a finite value > 0 (got {value}).")]
    RateMustBePositive { value: f64 },
    #[error("Unsupported HTTP method '{method}'. Use POST, PUT, or DELETE.")]
    UnsupportedMethod { method: String },
    #[error("Unsupported dispatch mode '{mode}'. Use sync, async, or protected.")]
    UnsupportedMode { mode: String },
    #[error("Host must not be empty.")]
    HostEmpty,
    #[error("Missing host (set --host or provide in config).")]
    MissingHost,
    #[error("Missing payloads (set --bundle or --data, or provide in config).")]
    MissingPayloads,
    #[error("Bundle must contain at least one payload.")]
    BundleEmpty,
    #[error("Invalid status code '{value}'.")]
    InvalidStatusCode { value: String },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Repeat count {value} exceeds the maximum of {max}.")]
    RepeatTooLarge { value: u64, max: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
