use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    app_types::{AppSession, ReadinessPhase},
    backend_readiness::{poll_until_ready, HealthProbe},
    error_page::{self, ErrorTarget},
    escape_hatches::{self, EscapeHatch},
    kiosk_config::KioskConfig,
    main_window::{self, CloseDecision, WindowLifecycle},
    permission_bridge,
    permission_gate::{PermissionDecision, PermissionGate},
    splash_window,
    window_host::{WindowHost, WindowRole},
};

pub(crate) type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Owns the kiosk session and reacts to every host event.
///
/// Lock scopes never span a host call, so host callbacks may re-enter the
/// supervisor freely.
pub(crate) struct Supervisor<H: WindowHost, P: HealthProbe> {
    host: H,
    probe: Arc<P>,
    config: KioskConfig,
    gate: PermissionGate,
    session: Mutex<AppSession<H::Window>>,
    log: LogSink,
}

impl<H: WindowHost, P: HealthProbe> Supervisor<H, P> {
    pub(crate) fn new(host: H, probe: P, config: KioskConfig, log: LogSink) -> Arc<Self> {
        let gate = PermissionGate::new(&config.app_url, &*log);
        Arc::new(Self {
            host,
            probe: Arc::new(probe),
            config,
            gate,
            session: Mutex::new(AppSession::default()),
            log,
        })
    }

    fn log(&self, message: &str) {
        (self.log)(message);
    }

    fn session(&self) -> MutexGuard<'_, AppSession<H::Window>> {
        // Session fields stay consistent across a panic in another handler.
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub(crate) fn lifecycle(&self) -> WindowLifecycle {
        self.session().lifecycle()
    }

    #[cfg(test)]
    pub(crate) fn readiness_phase(&self) -> ReadinessPhase {
        self.session().readiness
    }

    pub(crate) fn is_force_quit(&self) -> bool {
        self.session().force_quit
    }

    pub(crate) fn start(self: &Arc<Self>) {
        self.log(&format!(
            "kiosk supervisor starting for {}",
            self.config.app_url
        ));

        if let Some(origin) = self.gate.allowed_origin() {
            let grant = permission_bridge::bridge_grant(&origin);
            if let Err(error) = self.host.install_permission_interception(&grant) {
                self.log(&format!("failed to install permission interception: {error}"));
            }
        }

        match splash_window::show_splash(&self.host, &*self.log) {
            Ok(splash) => self.session().splash = Some(splash),
            Err(error) => self.log(&format!("failed to show splash window: {error}")),
        }

        let registered = escape_hatches::register_escape_hatches(&self.host, &*self.log);
        self.session().bindings = registered;

        self.begin_readiness_wait();
    }

    /// Starts a readiness wait unless one is already running. Results are
    /// marshalled back to the UI thread tagged with their generation.
    pub(crate) fn begin_readiness_wait(self: &Arc<Self>) -> bool {
        let Some(generation) = self.session().begin_readiness() else {
            self.log("readiness wait already in progress");
            return false;
        };

        let supervisor = Arc::clone(self);
        self.host.spawn(Box::pin(async move {
            let on_ready = {
                let supervisor = Arc::clone(&supervisor);
                move || {
                    let target = Arc::clone(&supervisor);
                    let dispatched = supervisor
                        .host
                        .run_on_ui(Box::new(move || target.handle_ready(generation)));
                    if let Err(error) = dispatched {
                        supervisor.abandon_readiness(generation, &error);
                    }
                }
            };
            let on_timeout = {
                let supervisor = Arc::clone(&supervisor);
                move |timeout: &crate::backend_readiness::ReadinessTimeout| {
                    let target = Arc::clone(&supervisor);
                    let message = timeout.message();
                    let dispatched = supervisor.host.run_on_ui(Box::new(move || {
                        target.handle_readiness_timeout(generation, &message)
                    }));
                    if let Err(error) = dispatched {
                        supervisor.abandon_readiness(generation, &error);
                    }
                }
            };

            poll_until_ready(
                Arc::clone(&supervisor.probe),
                &supervisor.config.app_url,
                supervisor.config.readiness,
                on_ready,
                on_timeout,
                |message| supervisor.log(message),
            )
            .await;
        }));
        true
    }

    /// Closes a session whose result never reached the UI thread, so Reload
    /// can start a fresh wait.
    fn abandon_readiness(&self, generation: u64, error: &str) {
        self.log(&format!(
            "failed to deliver readiness result for session {generation}: {error}"
        ));
        self.session()
            .finish_readiness(generation, ReadinessPhase::TimedOut);
    }

    /// Splash → Main handoff. Runs at most once per process.
    pub(crate) fn handle_ready(&self, generation: u64) {
        let splash = {
            let mut session = self.session();
            match session.lifecycle() {
                WindowLifecycle::MainVisible => {
                    self.log("readiness signal ignored: main window already exists");
                    return;
                }
                WindowLifecycle::Terminated => {
                    self.log("readiness signal ignored: kiosk is shutting down");
                    return;
                }
                WindowLifecycle::NoWindow | WindowLifecycle::SplashVisible => {}
            }
            if !session.finish_readiness(generation, ReadinessPhase::Ready) {
                self.log(&format!(
                    "readiness signal ignored for stale session {generation}"
                ));
                return;
            }
            session.splash.clone()
        };

        match main_window::open_main_window(
            &self.host,
            &self.config.app_url,
            splash.as_ref(),
            &*self.log,
        ) {
            Ok(main) => {
                let mut session = self.session();
                session.main = Some(main);
                session.splash = None;
                drop(session);
                self.log("main window visible");
            }
            Err(error) => {
                self.log(&format!("failed to open main window: {error}"));
                self.session().readiness = ReadinessPhase::TimedOut;
                self.present_error(&format!("The kiosk window could not be opened: {error}"));
            }
        }
    }

    pub(crate) fn handle_readiness_timeout(&self, generation: u64, message: &str) {
        if !self
            .session()
            .finish_readiness(generation, ReadinessPhase::TimedOut)
        {
            self.log(&format!(
                "readiness timeout ignored for stale session {generation}"
            ));
            return;
        }
        self.present_error(message);
    }

    pub(crate) fn present_error(&self, message: &str) -> ErrorTarget {
        let (splash, main) = {
            let session = self.session();
            (session.splash.clone(), session.main.clone())
        };
        error_page::present_error(
            &self.host,
            splash.as_ref(),
            main.as_ref(),
            message,
            &*self.log,
        )
    }

    pub(crate) fn handle_close_requested(&self, role: WindowRole) -> CloseDecision {
        let decision = main_window::decide_close(self.is_force_quit());
        if decision == CloseDecision::Prevent {
            self.log(&format!(
                "blocked attempt to close {} window",
                role.label()
            ));
        }
        decision
    }

    pub(crate) fn handle_exit_requested(&self) -> CloseDecision {
        let decision = main_window::decide_close(self.is_force_quit());
        match decision {
            CloseDecision::Prevent => self.log("blocked process exit request"),
            CloseDecision::Allow => self.shutdown(),
        }
        decision
    }

    pub(crate) fn handle_escape_hatch(self: &Arc<Self>, hatch: EscapeHatch) {
        match hatch {
            EscapeHatch::Diagnostics => self.open_diagnostics(),
            EscapeHatch::Reload => self.reload(),
            EscapeHatch::ForcedExit => self.force_exit(),
        }
    }

    fn open_diagnostics(&self) {
        let Some(window) = self.session().current_window().cloned() else {
            self.log("diagnostics skipped: no window");
            return;
        };
        match self.host.open_diagnostics(&window) {
            Ok(()) => self.log("diagnostics panel opened"),
            Err(error) => self.log(&format!("failed to open diagnostics: {error}")),
        }
    }

    fn reload(self: &Arc<Self>) {
        let (splash, main, phase) = {
            let session = self.session();
            (
                session.splash.clone(),
                session.main.clone(),
                session.readiness,
            )
        };

        if let Some(main) = main {
            self.log("reloading main window");
            if let Err(error) = self.host.reload(&main) {
                self.log(&format!("failed to reload main window: {error}"));
            }
            return;
        }

        let Some(splash) = splash else {
            self.log("reload skipped: no window");
            return;
        };

        splash_window::restore_splash(&self.host, &splash, &*self.log);
        if phase == ReadinessPhase::Polling {
            self.log("reloaded splash; readiness wait still running");
        } else {
            self.log("retrying backend readiness wait");
            self.begin_readiness_wait();
        }
    }

    fn force_exit(&self) {
        self.session().force_quit = true;
        self.log("forced exit requested");
        self.shutdown();
        self.host.exit(0);
    }

    /// Releases every escape-hatch binding. Safe to call more than once.
    pub(crate) fn shutdown(&self) {
        let registered = std::mem::take(&mut self.session().bindings);
        escape_hatches::release_escape_hatches(&self.host, registered, &*self.log);
    }

    pub(crate) fn decide_permission(
        &self,
        capability: &str,
        requesting_url: Option<&str>,
    ) -> PermissionDecision {
        self.gate.decide(capability, requesting_url, &*self.log)
    }
}
