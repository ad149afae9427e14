//! Application state (Model in TEA pattern)

use crate::confirm::BoxedConfirm;
use crate::navigation::Navigator;
use crate::screens::{Screen, ScreenId};

/// Lifecycle of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Running,
    Quitting,
}

/// The open screen and the id its completions are addressed to
#[derive(Debug)]
pub struct ActiveScreen {
    pub id: ScreenId,
    pub screen: Screen,
}

/// Complete application state (the Model in TEA)
pub struct AppState {
    /// Current route and history
    pub navigator: Navigator,

    /// Screen for the current route. `None` before the first navigation.
    pub active: Option<ActiveScreen>,

    /// Last rejected command or routing problem, cleared by the next command
    pub notice: Option<String>,

    pub phase: AppPhase,

    /// Delete confirmation
    pub(crate) confirm: BoxedConfirm,

    next_screen_id: u64,
}

impl AppState {
    pub fn new(confirm: BoxedConfirm) -> Self {
        Self {
            navigator: Navigator::new(),
            active: None,
            notice: None,
            phase: AppPhase::Running,
            confirm,
            next_screen_id: 0,
        }
    }

    /// Replace the open screen, returning the new instance's id
    pub fn open_screen(&mut self, screen: Screen) -> ScreenId {
        self.next_screen_id += 1;
        let id = ScreenId(self.next_screen_id);
        self.active = Some(ActiveScreen { id, screen });
        id
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.active.as_ref().map(|a| &a.screen)
    }

    pub fn screen_mut(&mut self) -> Option<&mut Screen> {
        self.active.as_mut().map(|a| &mut a.screen)
    }

    pub fn screen_id(&self) -> Option<ScreenId> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn should_quit(&self) -> bool {
        self.phase == AppPhase::Quitting
    }

    pub fn request_quit(&mut self) {
        self.phase = AppPhase::Quitting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AutoConfirm;
    use crate::navigation::Route;
    use taskdeck_core::EntityKind;

    #[test]
    fn test_open_screen_assigns_fresh_ids() {
        let mut state = AppState::new(Box::new(AutoConfirm(true)));
        assert!(state.screen().is_none());

        let first = state.open_screen(Screen::for_route(Route::List(EntityKind::Task)).unwrap());
        let second = state.open_screen(Screen::for_route(Route::List(EntityKind::Task)).unwrap());
        assert_ne!(first, second);
        assert_eq!(state.screen_id(), Some(second));
    }

    #[test]
    fn test_quit() {
        let mut state = AppState::new(Box::new(AutoConfirm(false)));
        assert!(!state.should_quit());
        state.request_quit();
        assert!(state.should_quit());
    }
}
