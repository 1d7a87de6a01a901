//! End-of-run statistics derived from the results bundle.
use hdrhistogram::Histogram;
use serde::Serialize;

use crate::args::{DispatchMode, OutputFormat};
use crate::dispatch::{DispatchResult, RunReport};
use crate::error::{AppResult, MetricsError};

/// Fixed-point scale used for rates and percentages (two decimals).
const FIXED_POINT_SCALE: u128 = 100;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: DispatchMode,
    pub payloads: usize,
    pub recorded: usize,
    pub successful: usize,
    pub error_status: usize,
    pub transport_failures: usize,
    pub flagged_for_resend: usize,
    pub aborted: bool,
    pub duration_ms: u128,
    pub p50_latency_ms: u64,
    pub p90_latency_ms: u64,
    pub p99_latency_ms: u64,
    pub max_latency_ms: u64,
    /// Recorded results per second, times 100.
    pub avg_rps_x100: u64,
}

impl RunSummary {
    /// # Errors
    ///
    /// Returns an error when a latency cannot be recorded in the histogram.
    pub fn from_results(report: &RunReport, results: &[DispatchResult]) -> AppResult<Self> {
        let mut histogram = Histogram::<u64>::new(3).map_err(|err| MetricsError::Histogram {
            context: "create latency histogram",
            source: Box::new(err),
        })?;

        let mut successful = 0usize;
        let mut error_status = 0usize;
        let mut transport_failures = 0usize;
        for result in results {
            let response = &result.response;
            if response.is_ok() {
                successful = successful.saturating_add(1);
            } else if response.is_transport_failure() {
                transport_failures = transport_failures.saturating_add(1);
            } else {
                error_status = error_status.saturating_add(1);
            }

            let latency_ms = u64::try_from(response.elapsed().as_millis()).unwrap_or(u64::MAX);
            histogram
                .record(latency_ms.max(1))
                .map_err(|err| MetricsError::Histogram {
                    context: "record latency",
                    source: Box::new(err),
                })?;
        }

        let (p50, p90, p99) = if histogram.len() == 0 {
            (0, 0, 0)
        } else {
            (
                histogram.value_at_quantile(0.5),
                histogram.value_at_quantile(0.9),
                histogram.value_at_quantile(0.99),
            )
        };

        let duration_ms = report.elapsed.as_millis();
        let avg_rps_x100 = u128::try_from(results.len())
            .unwrap_or(u128::MAX)
            .saturating_mul(FIXED_POINT_SCALE)
            .saturating_mul(1000)
            .checked_div(duration_ms.max(1))
            .unwrap_or(0);

        Ok(Self {
            mode: report.mode,
            payloads: report.payloads,
            recorded: results.len(),
            successful,
            error_status,
            transport_failures,
            flagged_for_resend: report.flagged_for_resend,
            aborted: report.aborted,
            duration_ms,
            p50_latency_ms: p50,
            p90_latency_ms: p90,
            p99_latency_ms: p99,
            max_latency_ms: if histogram.len() == 0 { 0 } else { histogram.max() },
            avg_rps_x100: u64::try_from(avg_rps_x100).unwrap_or(u64::MAX),
        })
    }

    /// Share of recorded results with a 2xx status, times 100.
    #[must_use]
    pub fn success_rate_x100(&self) -> u64 {
        let scaled = u128::try_from(self.successful)
            .unwrap_or(u128::MAX)
            .saturating_mul(FIXED_POINT_SCALE)
            .saturating_mul(FIXED_POINT_SCALE)
            .checked_div(u128::try_from(self.recorded).unwrap_or(u128::MAX))
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    /// Renders the summary in `format`.
    ///
    /// # Errors
    ///
    /// Returns an error when JSON serialization fails.
    pub fn render(&self, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => serde_json::to_string_pretty(self).map_err(|err| {
                MetricsError::Json {
                    context: "render summary",
                    source: err,
                }
                .into()
            }),
        }
    }

    fn render_text(&self) -> String {
        let success_rate = self.success_rate_x100();
        let mut lines = vec![
            format!("Mode: {}", self.mode),
            format!("Duration: {}ms", self.duration_ms),
            format!("Payloads: {}", self.payloads),
            format!("Recorded: {}", self.recorded),
            format!(
                "Successful: {} ({}.{:02}%)",
                self.successful,
                success_rate / 100,
                success_rate % 100
            ),
            format!("Error Status: {}", self.error_status),
            format!("Transport Failures: {}", self.transport_failures),
        ];
        if self.mode == DispatchMode::Protected {
            lines.push(format!("Flagged For Resend: {}", self.flagged_for_resend));
        }
        lines.push(format!(
            "P50/P90/P99 Latency: {}ms / {}ms / {}ms",
            self.p50_latency_ms, self.p90_latency_ms, self.p99_latency_ms
        ));
        lines.push(format!("Max Latency: {}ms", self.max_latency_ms));
        lines.push(format!(
            "Avg RPS: {}.{:02}",
            self.avg_rps_x100 / 100,
            self.avg_rps_x100 % 100
        ));
        if self.aborted {
            lines.push("Run aborted before completion.".to_owned());
        }
        lines.join("\n")
    }
}
