use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error};

use super::super::control::{Checkpoint, DispatchControl};
use super::super::hooks::{HandlerHooks, RequestContext, ResponseContext};
use super::super::rate::RateController;
use super::super::resend::ResendSelector;
use super::super::results::DispatchResult;
use crate::args::HttpMethod;
use crate::bundle::RequestBundle;
use crate::http::{Transport, TransportResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PassOutcome {
    Completed,
    Aborted,
}

/// Disjoint borrows of the engine for the duration of one `start` call.
pub(super) struct Pass<'a> {
    pub(super) method: HttpMethod,
    pub(super) path: &'a str,
    pub(super) bundle: &'a RequestBundle,
    pub(super) transport: &'a Arc<dyn Transport>,
    pub(super) control: &'a DispatchControl,
    pub(super) hooks: &'a HandlerHooks,
    pub(super) rate: &'a mut RateController,
    pub(super) results: &'a mut Vec<DispatchResult>,
    /// Set after the first item of the run; the first send is never delayed.
    pub(super) paced: bool,
}

impl Pass<'_> {
    /// Sends `items` one at a time, each awaited to completion before the
    /// next starts. Results are tagged with their bundle index when
    /// `tag_index` is set (the protected resend pass).
    pub(super) async fn run_sync<'b, I>(&mut self, items: I, tag_index: bool) -> PassOutcome
    where
        I: IntoIterator<Item = (usize, &'b Value)>,
    {
        for (index, payload) in items {
            self.pace().await;
            if self.control.checkpoint().await == Checkpoint::Abort {
                return PassOutcome::Aborted;
            }

            self.hooks.before_request(&RequestContext {
                index,
                payload,
                control: self.control,
            });
            let response = self.transport.send(self.method, self.path, payload).await;
            self.after_response(index, payload, &response);

            self.results.push(DispatchResult {
                response,
                index: tag_index.then_some(index),
            });
        }
        PassOutcome::Completed
    }

    /// Submits every payload up front, then drains completions in submission
    /// order.
    ///
    /// Pacing and the abort/suspend checkpoint run between drains, not between
    /// submissions: the rate bounds how fast responses are consumed, while
    /// every request is already on the wire. Requests still pending when the
    /// pass aborts keep running detached; their responses are discarded.
    ///
    /// The checkpoint also runs once before anything is submitted, so an
    /// aborted engine sends nothing and a suspended one submits only after
    /// it is resumed.
    ///
    /// `before_request` fires at drain time, right before the response is
    /// awaited, so in these modes the request is already on the wire when the
    /// hook runs.
    ///
    /// With a `resend` selector the pass is protected: results carry their
    /// bundle index and responses matching the resend predicate are flagged
    /// instead of recorded.
    pub(super) async fn run_concurrent(
        &mut self,
        mut resend: Option<&mut ResendSelector>,
    ) -> PassOutcome {
        if self.control.checkpoint().await == Checkpoint::Abort {
            return PassOutcome::Aborted;
        }
        let protected = resend.is_some();
        let pending: Vec<(usize, JoinHandle<TransportResponse>)> = self
            .bundle
            .iter()
            .enumerate()
            .map(|(index, payload)| (index, self.submit(payload)))
            .collect();
        debug!(submitted = pending.len(), protected, "Submitted bundle");

        for (index, handle) in pending {
            self.pace().await;
            if self.control.checkpoint().await == Checkpoint::Abort {
                return PassOutcome::Aborted;
            }
            let Some(payload) = self.bundle.get(index) else {
                continue;
            };

            self.hooks.before_request(&RequestContext {
                index,
                payload,
                control: self.control,
            });
            let response = match handle.await {
                Ok(response) => response,
                Err(err) => {
                    error!(index, "Request task failed: {}", err);
                    TransportResponse::failed(
                        format!("request task failed: {}", err),
                        Duration::ZERO,
                        0,
                    )
                }
            };
            self.after_response(index, payload, &response);

            if let Some(selector) = resend.as_deref_mut()
                && self.hooks.should_resend(&response)
            {
                selector.flag(index);
                debug!(index, "Flagged for resend");
                continue;
            }

            self.results.push(DispatchResult {
                response,
                index: protected.then_some(index),
            });
        }
        PassOutcome::Completed
    }

    fn submit(&self, payload: &Value) -> JoinHandle<TransportResponse> {
        let transport = Arc::clone(self.transport);
        let method = self.method;
        let path = self.path.to_owned();
        let payload = payload.clone();
        tokio::spawn(async move { transport.send(method, &path, &payload).await })
    }

    async fn pace(&mut self) {
        if !self.paced {
            self.paced = true;
            return;
        }
        let mode = self.control.rate_mode();
        let delay = self.rate.delay(&mode);
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }

    fn after_response(&self, index: usize, payload: &Value, response: &TransportResponse) {
        self.hooks.after_response(&ResponseContext {
            index,
            payload,
            response,
            results: self.results.as_slice(),
            control: self.control,
        });
    }
}
