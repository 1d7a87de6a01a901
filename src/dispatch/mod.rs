//! Dispatch engine: pacing, run control, hooks, and the three send strategies.
mod control;
mod engine;
mod hooks;
mod rate;
mod resend;
mod results;


pub use control::{ControlFlags, DispatchControl};
pub use engine::{DispatchEngine, DispatchSettings, RunReport};
pub use hooks::{RequestContext, ResponseContext};
pub use rate::{RateController, RateMode};
pub use results::{DispatchResult, ResultRecord};
