//! Shutdown signalling and the scope that guarantees resources are closed.

use crate::error::Error;
use crate::lifecycle::{Lifecycle, LifecycleState};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// How long a running bot gets to stop on its own after a shutdown request.
pub const GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Receiving half of the shutdown flag. Cheap to clone.
pub type ShutdownListener = watch::Receiver<bool>;

/// Spawn a task that flips the shutdown flag on SIGINT or SIGTERM.
pub fn listen_for_signals() -> ShutdownListener {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping bot...");
        let _ = tx.send(true);
    });
    rx
}

/// Resolve once shutdown has been requested. Never resolves if the sending
/// side went away without requesting it.
pub async fn requested(listener: &mut ShutdownListener) {
    if listener.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Drive `run` until it finishes or shutdown is requested, then always await
/// `close`.
///
/// After a shutdown request `run` gets `grace` to wind down by itself (the bot
/// stops its shards on the same signal) before it is dropped.
pub async fn run_scoped<R, C>(
    lifecycle: &Lifecycle,
    mut shutdown: ShutdownListener,
    grace: Duration,
    run: R,
    close: C,
) -> Result<(), Error>
where
    R: Future<Output = Result<(), Error>>,
    C: Future<Output = ()>,
{
    tokio::pin!(run);

    let outcome = tokio::select! {
        result = &mut run => result,
        () = requested(&mut shutdown) => {
            match tokio::time::timeout(grace, &mut run).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(grace_secs = grace.as_secs(), "Bot did not stop within the grace period");
                    Ok(())
                }
            }
        }
    };

    lifecycle.advance(LifecycleState::ShuttingDown);
    close.await;
    lifecycle.advance(LifecycleState::Closed);

    outcome
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
