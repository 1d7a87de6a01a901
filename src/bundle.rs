//! Ordered payload collections and the loaders that build them.
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// Upper bound for `--repeat`; larger inline bundles belong in a file.
pub const MAX_REPEAT: u64 = 10_000_000;

/// Payloads in send order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBundle {
    payloads: Vec<Value>,
}

impl RequestBundle {
    #[must_use]
    pub const fn new(payloads: Vec<Value>) -> Self {
        Self { payloads }
    }

    /// `count` copies of the same payload.
    #[must_use]
    pub fn repeated(payload: &Value, count: usize) -> Self {
        Self {
            payloads: vec![payload.clone(); count],
        }
    }

    /// Loads a bundle from disk.
    ///
    /// `.jsonl` / `.ndjson` files hold one payload per line (blank lines are
    /// skipped). Anything else is parsed as a single JSON document: an array
    /// becomes the bundle, any other value becomes a one-element bundle.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            AppError::http(HttpError::ReadBundle {
                path: path.to_path_buf(),
                source: err,
            })
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("jsonl" | "ndjson") => Self::parse_lines(&content, path),
            Some(_) | None => Self::parse_document(&content, path),
        }
    }

    /// # Errors
    ///
    /// Returns an error when `count` exceeds [`MAX_REPEAT`] or `text` is not
    /// valid JSON.
    pub fn from_inline(text: &str, count: u64) -> AppResult<Self> {
        let copies = usize::try_from(count)
            .ok()
            .filter(|_| count <= MAX_REPEAT)
            .ok_or(ValidationError::RepeatTooLarge {
                value: count,
                max: MAX_REPEAT,
            })?;
        let payload: Value = serde_json::from_str(text)
            .map_err(|err| AppError::http(HttpError::ParseInlinePayload { source: err }))?;
        Ok(Self::repeated(&payload, copies))
    }

    pub(crate) fn parse_document(content: &str, path: &Path) -> AppResult<Self> {
        let value: Value = serde_json::from_str(content).map_err(|err| {
            AppError::http(HttpError::ParseBundle {
                path: PathBuf::from(path),
                source: err,
            })
        })?;
        Ok(match value {
            Value::Array(payloads) => Self::new(payloads),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Object(_) => {
                Self::new(vec![value])
            }
        })
    }

    pub(crate) fn parse_lines(content: &str, path: &Path) -> AppResult<Self> {
        let mut payloads = Vec::new();
        for (line_idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value = serde_json::from_str(line).map_err(|err| {
                AppError::http(HttpError::ParseBundleLine {
                    path: PathBuf::from(path),
                    line: line_idx.saturating_add(1),
                    source: err,
                })
            })?;
            payloads.push(value);
        }
        Ok(Self::new(payloads))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.payloads.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.payloads.iter()
    }
}

impl From<Vec<Value>> for RequestBundle {
    fn from(payloads: Vec<Value>) -> Self {
        Self::new(payloads)
    }
}

impl FromIterator<Value> for RequestBundle {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RequestBundle {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn loads_json_array_in_order() -> Result<(), String> {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let path = dir.path().join("bundle.json");
        std::fs::write(&path, r#"[{"n": 1}, {"n": 2}, {"n": 3}]"#)
            .map_err(|err| format!("write failed: {}", err))?;

        let bundle = RequestBundle::from_path(&path).map_err(|err| err.to_string())?;
        let expected: Vec<Value> = vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})];
        if bundle.iter().cloned().collect::<Vec<_>>() != expected {
            return Err(format!("Unexpected bundle: {:?}", bundle));
        }
        Ok(())
    }

    #[test]
    fn loads_jsonl_skipping_blank_lines() -> Result<(), String> {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let path = dir.path().join("bundle.jsonl");
        std::fs::write(&path, "{\"a\": 1}\n\n  {\"a\": 2}\n")
            .map_err(|err| format!("write failed: {}", err))?;

        let bundle = RequestBundle::from_path(&path).map_err(|err| err.to_string())?;
        if bundle.len() != 2 || bundle.get(1) != Some(&json!({"a": 2})) {
            return Err(format!("Unexpected bundle: {:?}", bundle));
        }
        Ok(())
    }

    #[test]
    fn jsonl_errors_report_line_number() -> Result<(), String> {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let path = dir.path().join("bundle.jsonl");
        std::fs::write(&path, "{\"a\": 1}\nnot json\n")
            .map_err(|err| format!("write failed: {}", err))?;

        match RequestBundle::from_path(&path) {
            Err(AppError::Http(HttpError::ParseBundleLine { line: 2, .. })) => Ok(()),
            other => Err(format!("Unexpected result: {:?}", other)),
        }
    }

    #[test]
    fn single_document_becomes_one_payload() -> Result<(), String> {
        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let path = dir.path().join("payload.json");
        std::fs::write(&path, r#"{"data": "hello"}"#)
            .map_err(|err| format!("write failed: {}", err))?;

        let bundle = RequestBundle::from_path(&path).map_err(|err| err.to_string())?;
        if bundle.len() != 1 {
            return Err(format!("Expected one payload, got {}", bundle.len()));
        }
        Ok(())
    }

    #[test]
    fn inline_payload_is_repeated() -> Result<(), String> {
        let bundle =
            RequestBundle::from_inline(r#"{"data": "hi"}"#, 10).map_err(|err| err.to_string())?;
        if bundle.len() != 10 || bundle.iter().any(|payload| payload != &json!({"data": "hi"})) {
            return Err(format!("Unexpected bundle: {:?}", bundle));
        }
        if RequestBundle::from_inline("{oops", 1).is_ok() {
            return Err("Expected invalid inline payload to fail".to_owned());
        }
        Ok(())
    }

    #[test]
    fn oversized_repeat_is_rejected_before_allocating() -> Result<(), String> {
        for count in [MAX_REPEAT.saturating_add(1), 1_000_000_000_000_000_000] {
            match RequestBundle::from_inline("{}", count) {
                Err(AppError::Validation(ValidationError::RepeatTooLarge { value, .. }))
                    if value == count => {}
                other => return Err(format!("Unexpected result for {}: {:?}", count, other)),
            }
        }
        Ok(())
    }
}
