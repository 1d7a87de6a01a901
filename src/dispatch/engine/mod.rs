mod pass;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use super::control::DispatchControl;
use super::hooks::{HandlerHooks, RequestContext, ResponseContext};
use super::rate::{RateController, RateMode};
use super::resend::ResendSelector;
use super::results::DispatchResult;
use crate::args::{DispatchMode, HttpMethod};
use crate::bundle::RequestBundle;
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{ReqwestTransport, Transport, TransportConfig, TransportResponse};
use pass::{Pass, PassOutcome};

/// What to send and how to pace it.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub method: HttpMethod,
    pub path: String,
    pub mode: DispatchMode,
    /// Requests per second; must be a finite value > 0.
    pub rate: f64,
    /// When set, replaces the stable rate with a uniform random delay.
    pub random_delay: Option<(Duration, Duration)>,
}

impl DispatchSettings {
    /// Checks the settings and returns the initial pacing.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedMethod` for verbs other than POST, PUT and DELETE,
    /// `RateMustBePositive` for a rate <= 0, and `DelayRangeEmpty` for an
    /// empty random range.
    pub fn validate(&self) -> Result<RateMode, ValidationError> {
        if !self.method.is_dispatchable() {
            return Err(ValidationError::UnsupportedMethod {
                method: self.method.as_str().to_owned(),
            });
        }
        let stable = RateMode::from_rps(self.rate)?;
        match self.random_delay {
            Some((low, high)) => RateMode::random(low, high),
            None => Ok(stable),
        }
    }
}

/// Summary of one `start` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub mode: DispatchMode,
    pub payloads: usize,
    pub recorded: usize,
    /// Requests the resend predicate flagged during the protected pass.
    pub flagged_for_resend: usize,
    pub aborted: bool,
    pub elapsed: Duration,
}

/// Sends a bundle of JSON payloads to one endpoint under a controlled rate.
///
/// Control operations (`stop`, `suspend`, `resume`, `set_rate`) are also
/// available on the handle returned by [`DispatchEngine::control`], which can
/// be moved into hooks or other tasks while `start` runs.
pub struct DispatchEngine {
    method: HttpMethod,
    path: String,
    mode: DispatchMode,
    bundle: RequestBundle,
    transport: Arc<dyn Transport>,
    control: DispatchControl,
    hooks: HandlerHooks,
    rate: RateController,
    results: Vec<DispatchResult>,
}

impl DispatchEngine {
    /// Builds an engine backed by a `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unsupported method, a rate <= 0, or
    /// an empty/invalid host, and an HTTP error when the client cannot be
    /// built. No request is sent.
    pub fn connect(
        settings: &DispatchSettings,
        transport: &TransportConfig,
        bundle: RequestBundle,
    ) -> AppResult<Self> {
        let pacing = settings.validate()?;
        let transport = ReqwestTransport::new(transport)?;
        transport.endpoint(&settings.path).map_err(AppError::http)?;
        Ok(Self::assemble(settings, pacing, bundle, Arc::new(transport)))
    }

    /// Builds an engine on top of any transport.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unsupported method or a rate <= 0.
    pub fn with_transport(
        settings: &DispatchSettings,
        bundle: RequestBundle,
        transport: Arc<dyn Transport>,
    ) -> AppResult<Self> {
        let pacing = settings.validate()?;
        Ok(Self::assemble(settings, pacing, bundle, transport))
    }

    fn assemble(
        settings: &DispatchSettings,
        pacing: RateMode,
        bundle: RequestBundle,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            method: settings.method,
            path: settings.path.clone(),
            mode: settings.mode,
            bundle,
            transport,
            control: DispatchControl::new(pacing),
            hooks: HandlerHooks::default(),
            rate: RateController::new(),
            results: Vec::new(),
        }
    }

    /// Runs the bundle to completion or until aborted.
    ///
    /// Results from a previous call are discarded. Abort is sticky: after
    /// `stop` every later call returns without sending anything.
    pub async fn start(&mut self) -> RunReport {
        let Self {
            method,
            path,
            mode,
            bundle,
            transport,
            control,
            hooks,
            rate,
            results,
        } = self;
        let bundle: &RequestBundle = bundle;
        results.clear();

        let started = Instant::now();
        let mode = *mode;
        info!(mode = %mode, payloads = bundle.len(), "Dispatch started");

        let mut pass = Pass {
            method: *method,
            path: path.as_str(),
            bundle,
            transport,
            control,
            hooks,
            rate: &mut *rate,
            results: &mut *results,
            paced: false,
        };

        let mut flagged_for_resend = 0usize;
        let outcome = match mode {
            DispatchMode::Sync => pass.run_sync(bundle.iter().enumerate(), false).await,
            DispatchMode::Async => pass.run_concurrent(None).await,
            DispatchMode::Protected => {
                let mut selector = ResendSelector::new();
                let first_pass = pass.run_concurrent(Some(&mut selector)).await;
                flagged_for_resend = selector.len();
                match first_pass {
                    PassOutcome::Completed => {
                        let indices = selector.drain();
                        if indices.is_empty() {
                            PassOutcome::Completed
                        } else {
                            info!(count = indices.len(), "Resending flagged requests");
                            let items = indices.into_iter().filter_map(move |index| {
                                bundle.get(index).map(|payload| (index, payload))
                            });
                            pass.run_sync(items, true).await
                        }
                    }
                    PassOutcome::Aborted => {
                        if flagged_for_resend > 0 {
                            warn!(
                                count = flagged_for_resend,
                                "Run aborted; flagged requests were not resent"
                            );
                        }
                        PassOutcome::Aborted
                    }
                }
            }
        };

        let report = RunReport {
            mode,
            payloads: bundle.len(),
            recorded: results.len(),
            flagged_for_resend,
            aborted: outcome == PassOutcome::Aborted,
            elapsed: started.elapsed(),
        };
        if report.aborted {
            info!(recorded = report.recorded, "Dispatch aborted");
        } else {
            info!(
                recorded = report.recorded,
                elapsed_ms = report.elapsed.as_millis(),
                "Dispatch finished"
            );
        }
        report
    }

    /// Handle for steering the run from elsewhere.
    #[must_use]
    pub fn control(&self) -> DispatchControl {
        self.control.clone()
    }

    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn suspend(&self) {
        self.control.suspend();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    /// Replaces the active pacing with a stable `rps` for later iterations.
    ///
    /// # Errors
    ///
    /// Returns `RateMustBePositive` when `rps` is not a finite value > 0.
    pub fn set_rate(&self, rps: f64) -> Result<(), ValidationError> {
        self.control.set_rate(rps)
    }

    pub fn set_rate_mode(&self, mode: RateMode) {
        self.control.set_rate_mode(mode);
    }

    /// Swaps the random source, e.g. for a seeded controller in tests.
    pub fn set_rate_controller(&mut self, controller: RateController) {
        self.rate = controller;
    }

    pub fn on_before_request<F>(&mut self, hook: F)
    where
        F: Fn(&RequestContext<'_>) + Send + Sync + 'static,
    {
        self.hooks.before_request = Box::new(hook);
    }

    pub fn on_after_response<F>(&mut self, hook: F)
    where
        F: Fn(&ResponseContext<'_>) + Send + Sync + 'static,
    {
        self.hooks.after_response = Box::new(hook);
    }

    /// Predicate deciding, per response, whether a protected run resends it.
    /// Ignored in sync and async modes.
    pub fn resend_when<F>(&mut self, predicate: F)
    where
        F: Fn(&TransportResponse) -> bool + Send + Sync + 'static,
    {
        self.hooks.should_resend = Box::new(predicate);
    }

    #[must_use]
    pub fn results_bundle(&self) -> &[DispatchResult] {
        &self.results
    }

    #[must_use]
    pub const fn mode(&self) -> DispatchMode {
        self.mode
    }

    #[must_use]
    pub const fn bundle(&self) -> &RequestBundle {
        &self.bundle
    }
}
