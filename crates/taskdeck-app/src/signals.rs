//! Quit on SIGINT/SIGTERM (Ctrl+C on Windows)

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use taskdeck_core::{Error, Result};

use crate::message::Message;

/// Forward the first termination signal to the engine as [`Message::Quit`].
///
/// The task ends without sending anything once `shutdown` flips to `true`.
pub fn spawn_signal_handler(
    tx: mpsc::Sender<Message>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            received = termination_signal() => match received {
                Ok(name) => {
                    info!("{} received, quitting", name);
                    if tx.send(Message::Quit).await.is_err() {
                        debug!("Engine already gone, dropping {}", name);
                    }
                }
                Err(e) => warn!("Console will not react to signals: {}", e),
            },
            _ = async { let _ = shutdown.wait_for(|stop| *stop).await; } => {
                debug!("Signal handler stopped");
            }
        }
    })
}

/// Resolves with the name of the signal that arrived
async fn termination_signal() -> Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let listen = |kind: SignalKind, name: &str| {
            signal(kind).map_err(|e| Error::signal(format!("{}: {}", name, e)))
        };
        let mut sigint = listen(SignalKind::interrupt(), "SIGINT")?;
        let mut sigterm = listen(SignalKind::terminate(), "SIGTERM")?;

        Ok(tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        })
    }

    #[cfg(windows)]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| Error::signal(format!("Ctrl+C: {}", e)))?;
        Ok("Ctrl+C")
    }
}
