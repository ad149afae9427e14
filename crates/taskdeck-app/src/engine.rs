//! Engine - orchestration state shared by every front end
//!
//! The Engine owns the TEA state, the message channel, the gateway used by
//! background actions, the shutdown signal, and the settings. After each
//! processed message it republishes the [`AppSnapshot`] on a `watch`
//! channel; subscribers are only woken when the snapshot actually changed.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use taskdeck_client::Gateway;
use taskdeck_core::{Error, Result};

use crate::config::Settings;
use crate::confirm::BoxedConfirm;
use crate::message::Message;
use crate::navigation::Route;
use crate::process;
use crate::signals;
use crate::snapshot::AppSnapshot;
use crate::state::AppState;

/// Orchestration engine for the console.
///
/// Encapsulates:
/// - TEA state management
/// - Message channel
/// - Shutdown signaling
/// - Snapshot publishing for observers
/// - Settings
pub struct Engine<G> {
    /// TEA application state (the Model)
    pub state: AppState,

    /// Sender half of the unified message channel.
    /// Clone this to give to input sources (signal handler, stdin reader).
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the unified message channel.
    pub msg_rx: mpsc::Receiver<Message>,

    /// Sender for the shutdown signal. Send `true` to initiate shutdown.
    pub shutdown_tx: watch::Sender<bool>,

    /// Receiver for the shutdown signal. Clone for background tasks.
    pub shutdown_rx: watch::Receiver<bool>,

    /// Loaded settings
    pub settings: Settings,

    gateway: Arc<G>,

    snapshot_tx: watch::Sender<AppSnapshot>,
}

impl<G> Engine<G>
where
    G: Gateway + Sync + 'static,
{
    /// Create an Engine over `gateway`.
    ///
    /// - Creates AppState with the confirmation capability
    /// - Creates message channel (capacity 256)
    /// - Creates shutdown signal channel
    /// - Creates the snapshot channel
    /// - Spawns signal handler
    pub fn new(gateway: G, settings: Settings, confirm: BoxedConfirm) -> Self {
        let state = AppState::new(confirm);
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(256);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (snapshot_tx, _) = watch::channel(AppSnapshot::capture(&state));

        signals::spawn_signal_handler(msg_tx.clone(), shutdown_rx.clone());

        Self {
            state,
            msg_tx,
            msg_rx,
            shutdown_tx,
            shutdown_rx,
            settings,
            gateway: Arc::new(gateway),
            snapshot_tx,
        }
    }

    /// Route configured as the first screen
    pub fn start_route(&self) -> Result<Route> {
        let raw = &self.settings.behavior.start_route;
        raw.parse::<Route>()
            .map_err(|e| Error::invalid_route(format!("{}: {}", raw, e)))
    }

    /// Open the first screen
    pub fn start(&mut self, route: Route) {
        info!("Starting at {}", route);
        self.process_message(Message::Navigate(route));
    }

    /// Subscribe to snapshot changes.
    ///
    /// The receiver always holds the latest snapshot; intermediate ones may be
    /// skipped if the observer is slower than the loop.
    pub fn subscribe(&self) -> watch::Receiver<AppSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> AppSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Process a single message through the TEA update cycle and publish
    /// the resulting snapshot if it changed.
    pub fn process_message(&mut self, msg: Message) {
        process::process_message(
            &mut self.state,
            msg,
            &self.msg_tx,
            &self.gateway,
            &self.shutdown_rx,
        );
        self.publish();
    }

    /// Drain and process all pending messages from the channel.
    ///
    /// Returns the number of messages processed.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Wait for the next message and process it.
    ///
    /// Returns `false` once the channel is closed.
    pub async fn step(&mut self) -> bool {
        match self.msg_rx.recv().await {
            Some(msg) => {
                self.process_message(msg);
                true
            }
            None => false,
        }
    }

    fn publish(&self) {
        let next = AppSnapshot::capture(&self.state);
        let changed = self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            debug!("Snapshot updated");
        }
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Get a clone of the shutdown receiver for background tasks.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Check if the application should quit.
    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Signal background tasks to stop. Calls still in flight are abandoned.
    pub fn shutdown(&mut self) {
        info!("Shutting down");
        if self.shutdown_tx.send(true).is_err() {
            warn!("No background task was listening for shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AutoConfirm;
    use taskdeck_client::{MemoryGateway, MemoryStore};
    use taskdeck_core::EntityKind;

    async fn engine() -> (Engine<MemoryGateway>, MemoryStore) {
        let store = MemoryStore::new();
        store.seed_demo().await;
        let engine = Engine::new(
            store.gateway(),
            Settings::default(),
            Box::new(AutoConfirm(true)),
        );
        (engine, store)
    }

    #[tokio::test]
    async fn test_start_route_from_settings() {
        let (mut engine, _) = engine().await;
        assert_eq!(engine.start_route().unwrap(), Route::List(EntityKind::Task));

        engine.settings.behavior.start_route = "/nowhere".to_string();
        assert!(engine.start_route().is_err());
    }

    #[tokio::test]
    async fn test_start_publishes_snapshot_then_loaded_data() {
        let (mut engine, _) = engine().await;
        let mut rx = engine.subscribe();

        engine.start(Route::List(EntityKind::Project));
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.route.as_deref(), Some("/projects"));
        assert!(snapshot.list().unwrap().content.is_loading());

        assert!(engine.step().await);
        let projects = engine.snapshot();
        let data = projects.list().unwrap().content.data().unwrap().clone();
        assert_eq!(data.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_unchanged_snapshot_does_not_notify() {
        let (mut engine, _) = engine().await;
        engine.start(Route::List(EntityKind::Project));
        engine.step().await;

        let mut rx = engine.subscribe();
        rx.borrow_and_update();

        // A stale completion changes nothing
        engine.process_message(Message::FetchCompleted {
            screen: crate::screens::ScreenId(999),
            slot: crate::screens::CellSlot::Primary,
            generation: 1,
            result: Err(taskdeck_core::ApiError::network("late")),
        });
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_quit_and_shutdown() {
        let (mut engine, _) = engine().await;
        engine.process_message(Message::Quit);
        assert!(engine.should_quit());

        let mut shutdown_rx = engine.shutdown_receiver();
        engine.shutdown();
        assert!(shutdown_rx.has_changed().unwrap());
        assert!(*shutdown_rx.borrow_and_update());
    }
}
