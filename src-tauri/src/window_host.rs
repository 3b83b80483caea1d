//! Capability surface the supervisor drives. The desktop build implements it
//! on top of Tauri; tests use an in-memory recorder.

use std::{future::Future, pin::Pin};

use crate::{
    escape_hatches::EscapeHatch,
    permission_bridge::{BridgeGrant, BridgeInjection},
    MAIN_WINDOW_LABEL, SPLASH_WINDOW_LABEL,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum WindowRole {
    Splash,
    Main,
}

impl WindowRole {
    pub(crate) fn label(self) -> &'static str {
        match self {
            WindowRole::Splash => SPLASH_WINDOW_LABEL,
            WindowRole::Main => MAIN_WINDOW_LABEL,
        }
    }

    pub(crate) fn from_label(label: &str) -> Option<Self> {
        match label {
            SPLASH_WINDOW_LABEL => Some(WindowRole::Splash),
            MAIN_WINDOW_LABEL => Some(WindowRole::Main),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WindowContent {
    /// Static document shipped with the application.
    Bundled(&'static str),
    Remote(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WindowSpec {
    pub(crate) role: WindowRole,
    pub(crate) title: &'static str,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) resizable: bool,
    pub(crate) decorations: bool,
    pub(crate) focusable: bool,
    pub(crate) always_on_top: bool,
    pub(crate) permission_bridge: Option<BridgeInjection>,
    pub(crate) content: WindowContent,
}

pub(crate) type HostTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
pub(crate) type UiTask = Box<dyn FnOnce() + Send + 'static>;

pub(crate) trait WindowHost: Send + Sync + 'static {
    type Window: Clone + Send + Sync + 'static;

    /// Creates the window and starts loading its content.
    fn create_window(&self, spec: &WindowSpec) -> Result<Self::Window, String>;
    /// Tears the window down without raising a close request.
    fn destroy_window(&self, window: &Self::Window) -> Result<(), String>;
    fn is_destroyed(&self, window: &Self::Window) -> bool;
    fn load_bundled(&self, window: &Self::Window, document: &'static str) -> Result<(), String>;
    fn load_document(&self, window: &Self::Window, html: &str) -> Result<(), String>;
    fn reload(&self, window: &Self::Window) -> Result<(), String>;
    fn open_diagnostics(&self, window: &Self::Window) -> Result<(), String>;
    fn register_shortcut(&self, hatch: EscapeHatch) -> Result<(), String>;
    fn unregister_all_shortcuts(&self) -> Result<(), String>;
    /// Allows pages from the granted origin to reach the permission bridge.
    fn install_permission_interception(&self, grant: &BridgeGrant) -> Result<(), String>;
    fn spawn(&self, task: HostTask);
    /// Fails when the UI event loop no longer accepts work.
    fn run_on_ui(&self, task: UiTask) -> Result<(), String>;
    fn exit(&self, code: i32);
}

#[cfg(test)]
mod tests {
    use super::WindowRole;

    #[test]
    fn window_role_round_trips_through_label() {
        for role in [WindowRole::Splash, WindowRole::Main] {
            assert_eq!(WindowRole::from_label(role.label()), Some(role));
        }
        assert_eq!(WindowRole::from_label("devtools"), None);
    }
}
