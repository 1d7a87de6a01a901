use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::args::{OutputFormat, SenderArgs};
use crate::bundle::RequestBundle;
use crate::config::{DEFAULT_CONFIG_FILES, apply_config, load_config};
use crate::dispatch::{DispatchControl, DispatchEngine, DispatchSettings};
use crate::error::{AppError, AppResult, ValidationError};
use crate::export::export_results_json;
use crate::http::{RetryPolicy, TransportConfig};
use crate::shutdown_handlers::setup_signal_controls;
use crate::summary::RunSummary;

/// Everything a run needs, validated before the runtime starts.
struct RunPlan {
    settings: DispatchSettings,
    transport: TransportConfig,
    bundle: RequestBundle,
    pause_on_error: Option<Duration>,
    resend_status: Vec<u16>,
    output_format: OutputFormat,
    export_json: Option<String>,
}

impl RunPlan {
    fn from_args(args: SenderArgs) -> AppResult<Self> {
        let Some(host) = args.host else {
            error!("Missing host (set --host or provide in config).");
            return Err(AppError::validation(ValidationError::MissingHost));
        };

        let bundle = match (args.bundle.as_deref(), args.data.as_deref()) {
            (Some(path), _) => RequestBundle::from_path(Path::new(path))?,
            (None, Some(data)) => RequestBundle::from_inline(data, args.repeat.get())?,
            (None, None) => {
                error!("Missing payloads (set --bundle or --data, or provide in config).");
                return Err(AppError::validation(ValidationError::MissingPayloads));
            }
        };
        if bundle.is_empty() {
            return Err(AppError::validation(ValidationError::BundleEmpty));
        }

        let mut transport = TransportConfig::new(host);
        transport.headers = args.headers;
        transport.request_timeout = args.request_timeout;
        transport.retry = RetryPolicy {
            max_attempts: args.retries.get(),
            backoff: args.retry_backoff,
        };

        Ok(Self {
            settings: DispatchSettings {
                method: args.method,
                path: args.path,
                mode: args.mode,
                rate: args.rate,
                random_delay: args.random_delay,
            },
            transport,
            bundle,
            pause_on_error: args.pause_on_error,
            resend_status: args.resend_status,
            output_format: args.output_format,
            export_json: args.export_json,
        })
    }
}

/// Runs the CLI end to end.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, an unreadable
/// bundle, an invalid engine setup, or a failed export. Failed requests never
/// make the run fail.
pub fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    let plan = RunPlan::from_args(args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(plan))
}

fn parse_args() -> AppResult<Option<SenderArgs>> {
    let mut cmd = SenderArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let mut args = SenderArgs::from_arg_matches(&matches)?;
    apply_file_config(&mut args, &matches)?;
    Ok(Some(args))
}

fn apply_file_config(args: &mut SenderArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(args, matches, &config)?;
    }
    Ok(())
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

async fn run_async(plan: RunPlan) -> AppResult<()> {
    let RunPlan {
        settings,
        transport,
        bundle,
        pause_on_error,
        resend_status,
        output_format,
        export_json,
    } = plan;

    let mut engine = DispatchEngine::connect(&settings, &transport, bundle)?;
    install_hooks(&mut engine, pause_on_error, resend_status);

    let signals = setup_signal_controls(&engine.control());
    info!(
        host = %transport.host,
        path = %settings.path,
        method = %settings.method,
        "Dispatching bundle"
    );
    let report = engine.start().await;
    // Ends the signal listener once the run is over.
    engine.stop();
    if let Err(err) = signals.await {
        warn!("Signal handler task failed: {}", err);
    }

    let summary = RunSummary::from_results(&report, engine.results_bundle())?;
    println!("{}", summary.render(output_format)?);

    if let Some(path) = export_json.as_deref() {
        export_results_json(path, &summary, engine.results_bundle()).await?;
        info!(path, "Results exported");
    }
    Ok(())
}

/// Suspends the run for a fixed duration. Each new pause replaces the pending
/// resume, so the run stays suspended for `duration` after the latest error.
struct ErrorPause {
    duration: Duration,
    pending_resume: Mutex<Option<JoinHandle<()>>>,
}

impl ErrorPause {
    fn new(duration: Duration) -> Self {
        Self {
            duration,
            pending_resume: Mutex::new(None),
        }
    }

    fn pause(&self, control: &DispatchControl) {
        control.suspend();
        let resumer = control.clone();
        let duration = self.duration;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            resumer.resume();
        });
        let previous = self
            .pending_resume
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

fn install_hooks(
    engine: &mut DispatchEngine,
    pause_on_error: Option<Duration>,
    resend_status: Vec<u16>,
) {
    if let Some(pause) = pause_on_error {
        let pauser = ErrorPause::new(pause);
        engine.on_after_response(move |context| {
            if context.response.is_ok() {
                return;
            }
            warn!(
                index = context.index,
                status = ?context.response.status(),
                pause_ms = pause.as_millis(),
                "Response not OK; pausing dispatch"
            );
            pauser.pause(context.control);
        });
    }

    if resend_status.is_empty() {
        engine.resend_when(|response| !response.is_ok());
    } else {
        let statuses: BTreeSet<u16> = resend_status.into_iter().collect();
        engine.resend_when(move |response| match response.status() {
            Some(status) => statuses.contains(&status),
            None => true,
        });
    }
}
