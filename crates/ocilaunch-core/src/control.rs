//! Launch cancellation: a shared token tripped by Ctrl-C or SIGTERM.
//!
//! The launch loop checks the token before each attempt and races it
//! against every backoff wait.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Which signal tripped the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    CtrlC,
    Terminate,
}

/// Spawn a task that cancels `token` on the first interrupt signal.
/// Must be called from within a tokio runtime.
pub fn install_interrupt_handler(token: CancellationToken) -> JoinHandle<Option<Interrupt>> {
    tokio::spawn(async move {
        let signal = tokio::select! {
            _ = token.cancelled() => return None,
            s = wait_for_interrupt() => s,
        };
        match signal {
            Some(kind) => {
                tracing::warn!(?kind, "interrupt received, cancelling launch");
                token.cancel();
                Some(kind)
            }
            None => None,
        }
    })
}

#[cfg(unix)]
async fn wait_for_interrupt() -> Option<Interrupt> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!("SIGTERM handler unavailable: {}", e);
            return tokio::signal::ctrl_c().await.ok().map(|_| Interrupt::CtrlC);
        }
    };
    tokio::select! {
        r = tokio::signal::ctrl_c() => r.ok().map(|_| Interrupt::CtrlC),
        _ = term.recv() => Some(Interrupt::Terminate),
    }
}

#[cfg(not(unix))]
async fn wait_for_interrupt() -> Option<Interrupt> {
    tokio::signal::ctrl_c().await.ok().map(|_| Interrupt::CtrlC)
}
