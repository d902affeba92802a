use std::fmt;

use tracing::debug;

use crate::settings_session::LeaveGuard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Home,
    Capture,
    History,
    Settings,
}

impl fmt::Display for Surface {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Surface::Home => "home",
            Surface::Capture => "capture",
            Surface::History => "history",
            Surface::Settings => "settings",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Moved,
    /// Leaving settings with unsaved edits; the user must choose first.
    Blocked { pending: Surface },
}

/// Which surface is showing, plus the leave guard of the settings
/// surface while it is mounted.
pub struct Navigation {
    current: Surface,
    settings_guard: Option<LeaveGuard>,
}

impl Navigation {
    pub fn new(start: Surface) -> Self {
        Self {
            current: start,
            settings_guard: None,
        }
    }

    pub fn current(&self) -> Surface {
        self.current
    }

    /// Registers the guard consulted when leaving [`Surface::Settings`].
    pub fn mount_settings_guard(
        &mut self,
        guard: LeaveGuard,
    ) {
        self.settings_guard = Some(guard);
    }

    pub fn navigate(
        &mut self,
        target: Surface,
    ) -> NavigationOutcome {
        let leaving_settings = self.current == Surface::Settings && target != Surface::Settings;
        if leaving_settings && self.settings_guard.as_ref().is_some_and(LeaveGuard::blocks_leaving) {
            debug!(%target, "leave blocked by unsaved settings");
            return NavigationOutcome::Blocked { pending: target };
        }
        self.force(target);
        NavigationOutcome::Moved
    }

    /// Moves without consulting the guard.
    pub fn force(
        &mut self,
        target: Surface,
    ) {
        debug!(from = %self.current, to = %target, "navigate");
        self.current = target;
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new(Surface::Home)
    }
}
