//! Screen navigation.

use std::sync::{Arc, Mutex, PoisonError};

/// The screens a user can be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Login form (the unauthenticated landing screen).
    #[default]
    Login,
    /// Registration form.
    Register,
    /// Tabbed dashboard; requires a validated session.
    Dashboard,
}

/// Shared handle to the current screen.
///
/// Clones observe the same screen, so the dashboard and the session manager
/// can both redirect.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    screen: Arc<Mutex<Screen>>,
}

impl Navigator {
    /// Start on `screen`.
    #[must_use]
    pub fn new(screen: Screen) -> Self {
        Self {
            screen: Arc::new(Mutex::new(screen)),
        }
    }

    /// The screen currently shown.
    #[must_use]
    pub fn current(&self) -> Screen {
        *self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch to `screen`.
    pub fn go(&self, screen: Screen) {
        let mut current = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != screen {
            tracing::debug!(from = ?*current, to = ?screen, "Navigating");
        }
        *current = screen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_screen() {
        let nav = Navigator::new(Screen::Dashboard);
        let other = nav.clone();
        other.go(Screen::Login);
        assert_eq!(nav.current(), Screen::Login);
    }
}
