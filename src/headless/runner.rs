//! Headless mode runner - main event loop
//!
//! Reads commands from stdin on a blocking thread, feeds them to the engine,
//! and emits a snapshot event whenever the published snapshot changed.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use taskdeck_app::config::Settings;
use taskdeck_app::confirm;
use taskdeck_app::{AppSnapshot, Engine, Message, Route};
use taskdeck_client::{Gateway, MemoryStore};
use taskdeck_core::prelude::*;

use super::command::parse_command;
use super::HeadlessEvent;

/// Run the console against the in-memory backend.
///
/// `start` overrides the configured start route.
pub async fn run_headless(settings: Settings, start: Option<Route>) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("taskdeck starting in HEADLESS mode");
    info!(
        "Backend: memory (latency {}ms, demo data: {})",
        settings.backend.latency_ms, settings.backend.seed_demo_data
    );
    info!("═══════════════════════════════════════════════════════");

    let store =
        MemoryStore::new().with_latency(Duration::from_millis(settings.backend.latency_ms));
    if settings.backend.seed_demo_data {
        store.seed_demo().await;
    }

    let confirm = confirm::from_policy(settings.behavior.confirm_deletes);
    let mut engine = Engine::new(store.gateway(), settings, confirm);

    let route = match start {
        Some(route) => route,
        None => engine.start_route().context("Resolving start route")?,
    };

    // Spawn headless-specific stdin reader
    let stdin_tx = engine.msg_sender();
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(stdin_tx);
    });

    let mut snapshots = engine.subscribe();
    engine.start(route);
    emit_snapshot_if_changed(&mut snapshots);

    let result = headless_event_loop(&mut engine, &mut snapshots).await;

    engine.shutdown();
    info!("taskdeck headless mode exiting");
    result
}

/// Main headless event loop
async fn headless_event_loop<G>(
    engine: &mut Engine<G>,
    snapshots: &mut watch::Receiver<AppSnapshot>,
) -> Result<()>
where
    G: Gateway + Sync + 'static,
{
    loop {
        if engine.should_quit() {
            info!("Quit requested");
            break;
        }

        match engine.msg_rx.recv().await {
            Some(msg) => {
                let is_command = msg.is_command();
                engine.process_message(msg);

                if is_command {
                    if let Some(notice) = &engine.state.notice {
                        HeadlessEvent::error(notice.clone(), false).emit();
                    }
                }
                emit_snapshot_if_changed(snapshots);
            }
            None => {
                info!("Message channel closed");
                break;
            }
        }
    }

    Ok(())
}

fn emit_snapshot_if_changed(snapshots: &mut watch::Receiver<AppSnapshot>) {
    match snapshots.has_changed() {
        Ok(true) => {
            let snapshot = snapshots.borrow_and_update().clone();
            HeadlessEvent::snapshot(snapshot).emit();
        }
        Ok(false) => {}
        Err(_) => warn!("Snapshot channel closed"),
    }
}

/// Read commands from stdin and forward them to the message channel.
///
/// End of input quits the console.
fn spawn_stdin_reader_blocking(msg_tx: mpsc::Sender<Message>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            Ok(Some(message)) => {
                let quit = matches!(message, Message::Quit);
                if msg_tx.blocking_send(message).is_err() {
                    warn!("Engine stopped, dropping stdin command");
                    return;
                }
                if quit {
                    info!("Stdin: quit requested");
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Rejected stdin command {:?}: {}", line, e);
                HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
            }
        }
    }

    info!("Stdin closed, quitting");
    let _ = msg_tx.blocking_send(Message::Quit);
}
