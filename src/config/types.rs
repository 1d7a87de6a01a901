use std::time::Duration;

use serde::Deserialize;

use crate::args::{DispatchMode, HttpMethod, OutputFormat, parse_duration_value};
use crate::error::ValidationError;

/// File-level settings. Every field is optional; CLI flags win over values
/// set here.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub method: Option<HttpMethod>,
    #[serde(alias = "url")]
    pub host: Option<String>,
    pub path: Option<String>,
    pub headers: Option<Vec<String>>,
    pub bundle: Option<String>,
    pub data: Option<String>,
    pub repeat: Option<u64>,
    pub rate: Option<f64>,
    /// `"low-high"`, e.g. `"0-5"` or `"100ms-2s"`.
    pub random_delay: Option<String>,
    pub mode: Option<DispatchMode>,
    pub timeout: Option<DurationValue>,
    pub retries: Option<u64>,
    pub retry_backoff: Option<DurationValue>,
    pub pause_on_error: Option<DurationValue>,
    pub resend_status: Option<Vec<u16>>,
    pub output_format: Option<OutputFormat>,
    pub export_json: Option<String>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}

/// A duration given either as whole seconds or as text with a unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_value(text, false),
        }
    }
}
