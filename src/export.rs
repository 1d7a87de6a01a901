use serde::Serialize;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::dispatch::{DispatchResult, ResultRecord};
use crate::error::{AppResult, MetricsError};
use crate::summary::RunSummary;

#[derive(Serialize)]
struct ResultsExport<'a> {
    summary: &'a RunSummary,
    results: Vec<ResultRecord<'a>>,
}

/// Writes the summary and every recorded result, in results-bundle order, as
/// one pretty-printed JSON document.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub(crate) async fn export_results_json(
    path: &str,
    summary: &RunSummary,
    results: &[DispatchResult],
) -> AppResult<()> {
    let payload = ResultsExport {
        summary,
        results: results.iter().map(ResultRecord::from).collect(),
    };
    let json = serde_json::to_vec_pretty(&payload).map_err(|err| MetricsError::Json {
        context: "serialize results export",
        source: err,
    })?;

    let file = tokio::fs::File::create(path)
        .await
        .map_err(|err| export_io(err, "create results export"))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&json)
        .await
        .map_err(|err| export_io(err, "write results export"))?;
    writer
        .flush()
        .await
        .map_err(|err| export_io(err, "flush results export"))?;
    Ok(())
}

const fn export_io(source: std::io::Error, context: &'static str) -> MetricsError {
    MetricsError::Io { context, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::DispatchMode;
    use crate::dispatch::RunReport;
    use crate::http::TransportResponse;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn exports_results_in_bundle_order() -> Result<(), String> {
        let results = vec![
            DispatchResult {
                response: TransportResponse::completed(
                    200,
                    "ok".to_owned(),
                    Duration::from_millis(12),
                    1,
                ),
                index: Some(2),
            },
            DispatchResult {
                response: TransportResponse::failed(
                    "connection refused".to_owned(),
                    Duration::from_millis(3),
                    4,
                ),
                index: Some(0),
            },
        ];
        let report = RunReport {
            mode: DispatchMode::Protected,
            payloads: 3,
            recorded: 2,
            flagged_for_resend: 1,
            aborted: false,
            elapsed: Duration::from_secs(1),
        };
        let summary = RunSummary::from_results(&report, &results).map_err(|err| err.to_string())?;

        let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
        let path = dir.path().join("results.json");
        let path_str = path
            .to_str()
            .ok_or_else(|| "temp path is not UTF-8".to_owned())?
            .to_owned();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| format!("Failed to build runtime: {}", err))?;
        runtime
            .block_on(export_results_json(&path_str, &summary, &results))
            .map_err(|err| err.to_string())?;

        let content =
            std::fs::read_to_string(&path).map_err(|err| format!("read failed: {}", err))?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|err| format!("parse failed: {}", err))?;
        let records = value
            .get("results")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| format!("Missing results array: {}", content))?;
        let indices: Vec<Option<u64>> = records
            .iter()
            .map(|record| record.get("index").and_then(serde_json::Value::as_u64))
            .collect();
        if indices != vec![Some(2), Some(0)] {
            return Err(format!("Unexpected indices: {:?}", indices));
        }
        let failed = records.get(1).ok_or_else(|| "Missing second record".to_owned())?;
        if failed.get("status") != Some(&serde_json::Value::Null)
            || failed.get("error").and_then(serde_json::Value::as_str) != Some("connection refused")
        {
            return Err(format!("Unexpected failure record: {}", failed));
        }
        if value.pointer("/summary/recorded").and_then(serde_json::Value::as_u64) != Some(2) {
            return Err(format!("Unexpected summary: {}", content));
        }
        Ok(())
    }
}
