//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT, SIGTERM or SIGHUP (Ctrl+C elsewhere)
//! - Translate the first one received into a shutdown trigger

use crate::lifecycle::shutdown::Shutdown;

/// Wait for an interrupt-class signal, returning its name.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = hangup.recv() => "SIGHUP",
    };
    Ok(name)
}

#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}

/// Trigger `shutdown` on the first signal, or once it is triggered internally.
pub fn spawn_signal_handler(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    let internal = shutdown.subscribe();
    let fallback = shutdown.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            result = wait_for_signal() => match result {
                Ok(name) => tracing::info!(signal = name, "Received system shutdown signal"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install signal handlers");
                    fallback.recv().await;
                }
            },
            _ = internal.recv() => tracing::info!("Received internal shutdown signal"),
        }
        shutdown.trigger();
    })
}
