use serde_json::Value;

use super::control::DispatchControl;
use super::results::DispatchResult;
use crate::http::TransportResponse;

/// View handed to the before-request hook.
pub struct RequestContext<'a> {
    pub index: usize,
    pub payload: &'a Value,
    pub control: &'a DispatchControl,
}

/// View handed to the after-response hook; `response` is the one just obtained.
pub struct ResponseContext<'a> {
    pub index: usize,
    pub payload: &'a Value,
    pub response: &'a TransportResponse,
    /// Results recorded so far in this run, not including `response`.
    pub results: &'a [DispatchResult],
    pub control: &'a DispatchControl,
}

pub type BeforeRequestHook = Box<dyn Fn(&RequestContext<'_>) + Send + Sync>;
pub type AfterResponseHook = Box<dyn Fn(&ResponseContext<'_>) + Send + Sync>;
pub type ResendPredicate = Box<dyn Fn(&TransportResponse) -> bool + Send + Sync>;

/// Callbacks invoked at fixed points of every request.
///
/// Hooks are registered through `&mut` access to the engine, so they cannot be
/// swapped while a run holds the engine.
pub struct HandlerHooks {
    pub(crate) before_request: BeforeRequestHook,
    pub(crate) after_response: AfterResponseHook,
    pub(crate) should_resend: ResendPredicate,
}

impl HandlerHooks {
    pub(crate) fn before_request(&self, context: &RequestContext<'_>) {
        (self.before_request)(context);
    }

    pub(crate) fn after_response(&self, context: &ResponseContext<'_>) {
        (self.after_response)(context);
    }

    pub(crate) fn should_resend(&self, response: &TransportResponse) -> bool {
        (self.should_resend)(response)
    }
}

impl Default for HandlerHooks {
    fn default() -> Self {
        Self {
            before_request: Box::new(|_| {}),
            after_response: Box::new(|_| {}),
            should_resend: Box::new(|_| false),
        }
    }
}
