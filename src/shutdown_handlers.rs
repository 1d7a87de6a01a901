//! Process signals mapped onto dispatch control.
//!
//! Ctrl+C and SIGTERM stop the run. On Unix, SIGUSR1 suspends it and SIGUSR2
//! resumes it.
use crate::dispatch::DispatchControl;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Spawns the signal listener. The task ends once the run is aborted, by a
/// signal or by any other holder of `control`.
pub fn setup_signal_controls(control: &DispatchControl) -> tokio::task::JoinHandle<()> {
    let control = control.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            let mut term_signal = register(SignalKind::terminate(), "SIGTERM");
            let mut suspend_signal = register(SignalKind::user_defined1(), "SIGUSR1");
            let mut resume_signal = register(SignalKind::user_defined2(), "SIGUSR2");

            loop {
                tokio::select! {
                    () = control.aborted() => break,
                    _ = tokio::signal::ctrl_c() => {
                        control.stop();
                        break;
                    }
                    () = next_signal(term_signal.as_mut()) => {
                        control.stop();
                        break;
                    }
                    () = next_signal(suspend_signal.as_mut()) => control.suspend(),
                    () = next_signal(resume_signal.as_mut()) => control.resume(),
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                () = control.aborted() => {}
                _ = tokio::signal::ctrl_c() => control.stop(),
            }
        }
    })
}

#[cfg(unix)]
fn register(kind: SignalKind, name: &str) -> Option<Signal> {
    match signal(kind) {
        Ok(signal) => Some(signal),
        Err(err) => {
            tracing::warn!("Failed to register {} handler: {}", name, err);
            None
        }
    }
}

#[cfg(unix)]
async fn next_signal(signal: Option<&mut Signal>) {
    match signal {
        Some(signal) => {
            if signal.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}
