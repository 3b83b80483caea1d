use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::time::Instant;

use crate::{
    backend_readiness::{HealthProbe, ProbeResult},
    escape_hatches::EscapeHatch,
    permission_bridge::BridgeGrant,
    supervisor::LogSink,
    window_host::{HostTask, UiTask, WindowContent, WindowHost, WindowRole, WindowSpec},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostCall {
    CreateWindow(WindowRole),
    DestroyWindow(u32),
    LoadBundled(u32, &'static str),
    LoadDocument(u32, String),
    Reload(u32),
    OpenDiagnostics(u32),
    RegisterShortcut(EscapeHatch),
    UnregisterAllShortcuts,
    InstallPermissionInterception(BridgeGrant),
    Exit(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeWindow {
    pub(crate) id: u32,
    pub(crate) role: WindowRole,
}

#[derive(Default)]
struct FakeHostState {
    next_id: u32,
    calls: Vec<HostCall>,
    windows: Vec<(FakeWindow, Option<WindowContent>)>,
    destroyed: HashSet<u32>,
    failing_roles: HashSet<WindowRole>,
    failing_shortcuts: HashSet<EscapeHatch>,
    failing_dispatch: bool,
}

/// In-memory host that records every call the supervisor makes.
#[derive(Clone, Default)]
pub(crate) struct FakeHost {
    state: Arc<Mutex<FakeHostState>>,
}

impl FakeHost {
    fn with_state<T>(&self, f: impl FnOnce(&mut FakeHostState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    fn record(&self, call: HostCall) {
        self.with_state(|state| state.calls.push(call));
    }

    pub(crate) fn fail_create(&self, role: WindowRole) {
        self.with_state(|state| state.failing_roles.insert(role));
    }

    pub(crate) fn fail_shortcut(&self, hatch: EscapeHatch) {
        self.with_state(|state| state.failing_shortcuts.insert(hatch));
    }

    /// Makes `run_on_ui` refuse every task, as a shut-down event loop does.
    pub(crate) fn fail_dispatch(&self) {
        self.with_state(|state| state.failing_dispatch = true);
    }

    /// Adds a live window without going through `create_window`.
    pub(crate) fn open(&self, role: WindowRole) -> FakeWindow {
        self.with_state(|state| {
            state.next_id += 1;
            let window = FakeWindow {
                id: state.next_id,
                role,
            };
            state.windows.push((window.clone(), None));
            window
        })
    }

    pub(crate) fn calls(&self) -> Vec<HostCall> {
        self.with_state(|state| state.calls.clone())
    }

    pub(crate) fn window_for(&self, role: WindowRole) -> Option<FakeWindow> {
        self.with_state(|state| {
            state
                .windows
                .iter()
                .find(|(window, _)| window.role == role)
                .map(|(window, _)| window.clone())
        })
    }

    pub(crate) fn content_of(&self, role: WindowRole) -> Option<WindowContent> {
        self.with_state(|state| {
            state
                .windows
                .iter()
                .find(|(window, _)| window.role == role)
                .and_then(|(_, content)| content.clone())
        })
    }

    pub(crate) fn documents_for(&self, id: u32) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::LoadDocument(window_id, html) if window_id == id => Some(html),
                _ => None,
            })
            .collect()
    }

    fn ensure_live(&self, window: &FakeWindow) -> Result<(), String> {
        if self.is_destroyed(window) {
            return Err(format!("window {} destroyed", window.id));
        }
        Ok(())
    }
}

impl WindowHost for FakeHost {
    type Window = FakeWindow;

    fn create_window(&self, spec: &WindowSpec) -> Result<FakeWindow, String> {
        self.record(HostCall::CreateWindow(spec.role));
        if self.with_state(|state| state.failing_roles.contains(&spec.role)) {
            return Err(format!("cannot create {} window", spec.role.label()));
        }
        let window = self.open(spec.role);
        self.with_state(|state| {
            if let Some(entry) = state.windows.iter_mut().find(|(w, _)| w.id == window.id) {
                entry.1 = Some(spec.content.clone());
            }
        });
        Ok(window)
    }

    fn destroy_window(&self, window: &FakeWindow) -> Result<(), String> {
        self.record(HostCall::DestroyWindow(window.id));
        self.with_state(|state| state.destroyed.insert(window.id));
        Ok(())
    }

    fn is_destroyed(&self, window: &FakeWindow) -> bool {
        self.with_state(|state| state.destroyed.contains(&window.id))
    }

    fn load_bundled(&self, window: &FakeWindow, document: &'static str) -> Result<(), String> {
        self.ensure_live(window)?;
        self.record(HostCall::LoadBundled(window.id, document));
        Ok(())
    }

    fn load_document(&self, window: &FakeWindow, html: &str) -> Result<(), String> {
        self.ensure_live(window)?;
        self.record(HostCall::LoadDocument(window.id, html.to_string()));
        Ok(())
    }

    fn reload(&self, window: &FakeWindow) -> Result<(), String> {
        self.ensure_live(window)?;
        self.record(HostCall::Reload(window.id));
        Ok(())
    }

    fn open_diagnostics(&self, window: &FakeWindow) -> Result<(), String> {
        self.ensure_live(window)?;
        self.record(HostCall::OpenDiagnostics(window.id));
        Ok(())
    }

    fn register_shortcut(&self, hatch: EscapeHatch) -> Result<(), String> {
        if self.with_state(|state| state.failing_shortcuts.contains(&hatch)) {
            return Err(format!("{} already taken", hatch.accelerator()));
        }
        self.record(HostCall::RegisterShortcut(hatch));
        Ok(())
    }

    fn unregister_all_shortcuts(&self) -> Result<(), String> {
        self.record(HostCall::UnregisterAllShortcuts);
        Ok(())
    }

    fn install_permission_interception(&self, grant: &BridgeGrant) -> Result<(), String> {
        self.record(HostCall::InstallPermissionInterception(grant.clone()));
        Ok(())
    }

    fn spawn(&self, task: HostTask) {
        tokio::spawn(task);
    }

    fn run_on_ui(&self, task: UiTask) -> Result<(), String> {
        if self.with_state(|state| state.failing_dispatch) {
            return Err("event loop closed".to_string());
        }
        task();
        Ok(())
    }

    fn exit(&self, code: i32) {
        self.record(HostCall::Exit(code));
    }
}

#[derive(Clone, Default)]
pub(crate) struct LogCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    pub(crate) fn sink_fn(&self) -> impl Fn(&str) + Send + Sync + 'static {
        let lines = Arc::clone(&self.lines);
        move |line: &str| lines.lock().unwrap().push(line.to_string())
    }

    pub(crate) fn sink(&self) -> LogSink {
        Arc::new(self.sink_fn())
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub(crate) fn contains(&self, fragment: &str) -> bool {
        self.lines().iter().any(|line| line.contains(fragment))
    }

    pub(crate) fn count_starting_with(&self, prefix: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }
}

/// Probe whose answer depends on how long ago it was created (tokio clock).
pub(crate) struct ScriptedProbe {
    origin: Instant,
    healthy_after: Option<Duration>,
    unreachable: bool,
    latency: Duration,
    calls: Arc<AtomicUsize>,
    completions: Arc<AtomicUsize>,
}

impl ScriptedProbe {
    fn new(healthy_after: Option<Duration>, unreachable: bool) -> Self {
        Self {
            origin: Instant::now(),
            healthy_after,
            unreachable,
            latency: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            completions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn healthy_after(after: Duration) -> Self {
        Self::new(Some(after), false)
    }

    pub(crate) fn never_healthy() -> Self {
        Self::new(None, false)
    }

    pub(crate) fn unreachable_until(after: Duration) -> Self {
        Self::new(Some(after), true)
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub(crate) fn completions(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.completions)
    }
}

impl HealthProbe for ScriptedProbe {
    async fn probe(&self, _url: &str) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.completions.fetch_add(1, Ordering::SeqCst);

        let elapsed = Instant::now().saturating_duration_since(self.origin);
        match self.healthy_after {
            Some(after) if elapsed >= after => ProbeResult::Healthy,
            _ if self.unreachable => ProbeResult::Unreachable("connection refused".to_string()),
            _ => ProbeResult::NotReady(503),
        }
    }
}
