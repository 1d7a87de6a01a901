use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to join path '{path}' onto '{host}': {source}")]
    JoinPathFailed {
        host: String,
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid header name '{header}': {source}")]
    InvalidHeaderName {
        header: String,
        #[source]
        source: reqwest::header::InvalidHeaderName,
    },
    #[error("Invalid header value for '{header}': {source}")]
    InvalidHeaderValue {
        header: String,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read bundle '{path}': {source}")]
    ReadBundle {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse bundle '{path}': {source}")]
    ParseBundle {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse line {line} of bundle '{path}': {source}")]
    ParseBundleLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse inline payload: {source}")]
    ParseInlinePayload {
        #[source]
        source: serde_json::Error,
    },
}
