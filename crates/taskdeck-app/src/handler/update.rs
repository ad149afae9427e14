//! Main update function - handles state transitions (TEA pattern)

use tracing::{debug, trace, warn};

use crate::confirm::Confirm;
use crate::message::Message;
use crate::navigation::Route;
use crate::resource::Completion;
use crate::screens::{Effect, Screen, ScreenController, ScreenError};
use crate::state::AppState;

use super::UpdateResult;

/// Process a message and update state
/// Returns optional follow-up message and actions
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    if message.is_command() {
        state.notice = None;
    }

    match message {
        Message::Quit => {
            state.request_quit();
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Navigation
        // ─────────────────────────────────────────────────────────
        Message::Navigate(route) => navigate(state, route),

        Message::Back => match state.navigator.back() {
            Some(route) => open_screen(state, route),
            None => reject(state, "Nothing to go back to"),
        },

        Message::Reload => on_screen(state, |screen, _| Ok(screen.reload())),

        // ─────────────────────────────────────────────────────────
        // Screen commands
        // ─────────────────────────────────────────────────────────
        Message::Delete { id } => on_screen(state, |screen, confirm| screen.delete(id, confirm)),
        Message::View { id } => on_screen(state, |screen, _| screen.view(Some(id))),
        Message::Edit { id } => on_screen(state, |screen, _| screen.edit(id)),
        Message::Create => on_screen(state, |screen, _| screen.create()),
        Message::SetField { field, value } => on_screen(state, |screen, _| {
            screen.set_field(&field, value)?;
            Ok(Vec::new())
        }),
        Message::TouchField { field } => on_screen(state, |screen, _| {
            screen.touch_field(&field)?;
            Ok(Vec::new())
        }),
        Message::Submit => on_screen(state, |screen, _| screen.submit()),
        Message::Cancel => on_screen(state, |screen, _| screen.cancel()),

        // ─────────────────────────────────────────────────────────
        // Completions
        // ─────────────────────────────────────────────────────────
        Message::FetchCompleted {
            screen,
            slot,
            generation,
            result,
        } => {
            match state.active.as_mut() {
                Some(active) if active.id == screen => {
                    let controller = active.screen.controller_mut();
                    let completion = controller.on_fetch(slot, generation, result);
                    if completion == Completion::Stale {
                        trace!("Dropped stale {} fetch for {}", slot, screen);
                    }
                }
                _ => trace!("Dropped {} fetch for closed {}", slot, screen),
            }
            UpdateResult::none()
        }

        Message::MutationSettled {
            screen,
            ticket,
            result,
        } => match state.active.as_mut() {
            Some(active) if active.id == screen => {
                let effects = active.screen.controller_mut().on_mutation(ticket, result);
                UpdateResult::from_effects(active.id, effects)
            }
            _ => {
                debug!("Mutation {} settled after {} closed", ticket, screen);
                UpdateResult::none()
            }
        },
    }
}

/// Open `route`, letting the current screen follow it when it can
fn navigate(state: &mut AppState, route: Route) -> UpdateResult {
    if let Some(active) = state.active.as_mut() {
        if let Some(effects) = active.screen.controller_mut().reenter(route) {
            debug!("{} follows route {}", active.id, route);
            state.navigator.navigate(route);
            return UpdateResult::from_effects(active.id, effects);
        }
    }

    if Screen::for_route(route).is_none() {
        return reject(state, format!("No screen for {}", route));
    }
    state.navigator.navigate(route);
    open_screen(state, route)
}

/// Replace the open screen with a fresh one for `route`
fn open_screen(state: &mut AppState, route: Route) -> UpdateResult {
    let Some(screen) = Screen::for_route(route) else {
        return reject(state, format!("No screen for {}", route));
    };
    let id = state.open_screen(screen);
    debug!("Opened {} for {}", id, route);

    let effects = state
        .screen_mut()
        .map(|screen| screen.controller_mut().enter())
        .unwrap_or_default();
    UpdateResult::from_effects(id, effects)
}

/// Run a command against the open screen
fn on_screen<F>(state: &mut AppState, command: F) -> UpdateResult
where
    F: FnOnce(&mut dyn ScreenController, &dyn Confirm) -> Result<Vec<Effect>, ScreenError>,
{
    let AppState {
        active,
        confirm,
        notice,
        ..
    } = state;

    let Some(active) = active.as_mut() else {
        warn!("Command with no open screen");
        *notice = Some("No screen is open".to_string());
        return UpdateResult::none();
    };

    match command(active.screen.controller_mut(), &**confirm) {
        Ok(effects) => UpdateResult::from_effects(active.id, effects),
        Err(e) => {
            warn!("Command rejected on {}: {}", active.id, e);
            *notice = Some(e.to_string());
            UpdateResult::none()
        }
    }
}

fn reject(state: &mut AppState, message: impl Into<String>) -> UpdateResult {
    let message = message.into();
    warn!("{}", message);
    state.notice = Some(message);
    UpdateResult::none()
}
