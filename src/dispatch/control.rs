use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use super::rate::RateMode;
use crate::error::ValidationError;

/// Abort and suspend flags observed by the dispatch loop between iterations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub abort: bool,
    pub suspended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Checkpoint {
    Proceed,
    Abort,
}

/// Cloneable handle used to steer a run from hooks, signal handlers, or other
/// tasks. Every clone shares the same flags and rate.
///
/// Changes are picked up at the next iteration; a request that is already in
/// flight is never cancelled.
#[derive(Debug, Clone)]
pub struct DispatchControl {
    flags: Arc<watch::Sender<ControlFlags>>,
    rate: Arc<watch::Sender<RateMode>>,
}

impl DispatchControl {
    pub(crate) fn new(rate: RateMode) -> Self {
        let (flags, _) = watch::channel(ControlFlags::default());
        let (rate, _) = watch::channel(rate);
        Self {
            flags: Arc::new(flags),
            rate: Arc::new(rate),
        }
    }

    /// Requests an abort. Once set it is never cleared for the lifetime of
    /// this handle.
    pub fn stop(&self) {
        let changed = self.flags.send_if_modified(|flags| {
            let was_aborted = flags.abort;
            flags.abort = true;
            !was_aborted
        });
        if changed {
            info!("Abort requested");
        }
    }

    pub fn suspend(&self) {
        let changed = self.flags.send_if_modified(|flags| {
            let was_suspended = flags.suspended;
            flags.suspended = true;
            !was_suspended
        });
        if changed {
            info!("Suspend requested");
        }
    }

    pub fn resume(&self) {
        let changed = self.flags.send_if_modified(|flags| {
            let was_suspended = flags.suspended;
            flags.suspended = false;
            was_suspended
        });
        if changed {
            info!("Resumed");
        }
    }

    /// Replaces the pacing with a stable rate of `rps` requests per second.
    ///
    /// # Errors
    ///
    /// Returns `RateMustBePositive` when `rps` is not a finite value > 0; the
    /// active rate is left untouched.
    pub fn set_rate(&self, rps: f64) -> Result<(), ValidationError> {
        let mode = RateMode::from_rps(rps)?;
        self.set_rate_mode(mode);
        Ok(())
    }

    pub fn set_rate_mode(&self, mode: RateMode) {
        debug!("Rate mode set to {:?}", mode);
        self.rate.send_replace(mode);
    }

    #[must_use]
    pub fn rate_mode(&self) -> RateMode {
        *self.rate.borrow()
    }

    #[must_use]
    pub fn flags(&self) -> ControlFlags {
        *self.flags.borrow()
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.flags().abort
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.flags().suspended
    }

    /// Resolves once `stop` has been called on any clone.
    pub async fn aborted(&self) {
        let mut flags_rx = self.flags.subscribe();
        drop(flags_rx.wait_for(|flags| flags.abort).await);
    }

    /// Abort wins over suspend. While suspended this waits for `resume` or
    /// `stop` without polling.
    pub(crate) async fn checkpoint(&self) -> Checkpoint {
        let current = self.flags();
        if current.abort {
            return Checkpoint::Abort;
        }
        if !current.suspended {
            return Checkpoint::Proceed;
        }

        debug!("Dispatch suspended; waiting for resume");
        let mut flags_rx = self.flags.subscribe();
        let settled = match flags_rx
            .wait_for(|flags| flags.abort || !flags.suspended)
            .await
        {
            Ok(flags) => *flags,
            // The sender lives in `self`, so this only happens during teardown.
            Err(_closed) => return Checkpoint::Abort,
        };
        if settled.abort {
            Checkpoint::Abort
        } else {
            Checkpoint::Proceed
        }
    }
}
