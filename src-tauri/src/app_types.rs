use crate::{escape_hatches::EscapeHatch, main_window::WindowLifecycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadinessPhase {
    Idle,
    Polling,
    Ready,
    TimedOut,
}

/// Process-wide kiosk state, owned by the supervisor.
#[derive(Debug)]
pub(crate) struct AppSession<W> {
    pub(crate) splash: Option<W>,
    pub(crate) main: Option<W>,
    pub(crate) force_quit: bool,
    pub(crate) bindings: Vec<EscapeHatch>,
    pub(crate) readiness: ReadinessPhase,
    pub(crate) readiness_generation: u64,
}

impl<W> Default for AppSession<W> {
    fn default() -> Self {
        Self {
            splash: None,
            main: None,
            force_quit: false,
            bindings: Vec::new(),
            readiness: ReadinessPhase::Idle,
            readiness_generation: 0,
        }
    }
}

impl<W> AppSession<W> {
    pub(crate) fn lifecycle(&self) -> WindowLifecycle {
        if self.force_quit {
            WindowLifecycle::Terminated
        } else if self.main.is_some() {
            WindowLifecycle::MainVisible
        } else if self.splash.is_some() {
            WindowLifecycle::SplashVisible
        } else {
            WindowLifecycle::NoWindow
        }
    }

    /// Starts a new readiness generation unless one is already polling.
    pub(crate) fn begin_readiness(&mut self) -> Option<u64> {
        if self.readiness == ReadinessPhase::Polling {
            return None;
        }
        self.readiness_generation += 1;
        self.readiness = ReadinessPhase::Polling;
        Some(self.readiness_generation)
    }

    /// Moves the current generation to a terminal phase. Stale generations
    /// and already-finished sessions are refused.
    pub(crate) fn finish_readiness(&mut self, generation: u64, phase: ReadinessPhase) -> bool {
        if generation != self.readiness_generation || self.readiness != ReadinessPhase::Polling {
            return false;
        }
        self.readiness = phase;
        true
    }

    /// Current window for diagnostics and reload: main if it exists, else splash.
    pub(crate) fn current_window(&self) -> Option<&W> {
        self.main.as_ref().or(self.splash.as_ref())
    }
}
