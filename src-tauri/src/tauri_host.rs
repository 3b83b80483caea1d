use std::sync::Arc;

use tauri::{
    ipc::CapabilityBuilder, AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder,
};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};
use url::Url;

use crate::{
    append_kiosk_log,
    backend_readiness::HttpProbe,
    error_page,
    escape_hatches::EscapeHatch,
    permission_bridge::BridgeGrant,
    supervisor::Supervisor,
    window_host::{HostTask, UiTask, WindowContent, WindowHost, WindowSpec},
};

pub(crate) type DesktopSupervisor = Supervisor<TauriHost, HttpProbe>;

pub(crate) struct KioskState(Arc<DesktopSupervisor>);

impl KioskState {
    pub(crate) fn new(supervisor: Arc<DesktopSupervisor>) -> Self {
        Self(supervisor)
    }

    pub(crate) fn supervisor(&self) -> &Arc<DesktopSupervisor> {
        &self.0
    }
}

#[derive(Clone)]
pub(crate) struct TauriHost {
    app_handle: AppHandle,
}

impl TauriHost {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

/// Origin the bundled assets are served from by the custom protocol.
fn bundled_url(document: &str) -> Result<Url, String> {
    let base = if cfg!(windows) {
        "http://tauri.localhost/"
    } else {
        "tauri://localhost/"
    };
    Url::parse(base)
        .and_then(|base| base.join(document))
        .map_err(|error| format!("Invalid bundled document {document}: {error}"))
}

fn parse_url(raw: &str) -> Result<Url, String> {
    Url::parse(raw).map_err(|error| format!("Invalid URL '{raw}': {error}"))
}

fn bridge_capability(grant: &BridgeGrant) -> CapabilityBuilder {
    CapabilityBuilder::new(grant.identifier)
        .remote(grant.remote_url.clone())
        .window(grant.window)
        .permission(grant.permission.clone())
}

impl WindowHost for TauriHost {
    type Window = WebviewWindow;

    fn create_window(&self, spec: &WindowSpec) -> Result<WebviewWindow, String> {
        let url = match &spec.content {
            WindowContent::Bundled(document) => WebviewUrl::App((*document).into()),
            WindowContent::Remote(raw) => WebviewUrl::External(parse_url(raw)?),
        };

        let mut builder = WebviewWindowBuilder::new(&self.app_handle, spec.role.label(), url)
            .title(spec.title)
            .inner_size(spec.width, spec.height)
            .resizable(spec.resizable)
            .decorations(spec.decorations)
            .focusable(spec.focusable)
            .focused(spec.focusable)
            .always_on_top(spec.always_on_top)
            .center();
        if let Some(bridge) = &spec.permission_bridge {
            builder = if bridge.all_frames {
                builder.initialization_script_for_all_frames(bridge.script.as_str())
            } else {
                builder.initialization_script(bridge.script.as_str())
            };
        }

        builder.build().map_err(|error| {
            format!("Failed to create {} window: {error}", spec.role.label())
        })
    }

    fn destroy_window(&self, window: &WebviewWindow) -> Result<(), String> {
        window
            .destroy()
            .map_err(|error| format!("Failed to destroy {} window: {error}", window.label()))
    }

    fn is_destroyed(&self, window: &WebviewWindow) -> bool {
        self.app_handle.get_webview_window(window.label()).is_none()
    }

    fn load_bundled(&self, window: &WebviewWindow, document: &'static str) -> Result<(), String> {
        let url = bundled_url(document)?;
        window
            .navigate(url)
            .map_err(|error| format!("Failed to load {document} in {}: {error}", window.label()))
    }

    fn load_document(&self, window: &WebviewWindow, html: &str) -> Result<(), String> {
        let url = parse_url(&error_page::document_data_url(html))?;
        window
            .navigate(url)
            .map_err(|error| format!("Failed to load document in {}: {error}", window.label()))
    }

    fn reload(&self, window: &WebviewWindow) -> Result<(), String> {
        window
            .reload()
            .map_err(|error| format!("Failed to reload {}: {error}", window.label()))
    }

    fn open_diagnostics(&self, window: &WebviewWindow) -> Result<(), String> {
        window.open_devtools();
        Ok(())
    }

    fn register_shortcut(&self, hatch: EscapeHatch) -> Result<(), String> {
        self.app_handle
            .global_shortcut()
            .on_shortcut(hatch.accelerator(), move |app_handle, _shortcut, event| {
                if event.state() != ShortcutState::Pressed {
                    return;
                }
                let Some(state) = app_handle.try_state::<KioskState>() else {
                    append_kiosk_log("escape hatch ignored: supervisor not ready");
                    return;
                };
                state.supervisor().handle_escape_hatch(hatch);
            })
            .map_err(|error| format!("Failed to register {}: {error}", hatch.accelerator()))
    }

    fn unregister_all_shortcuts(&self) -> Result<(), String> {
        self.app_handle
            .global_shortcut()
            .unregister_all()
            .map_err(|error| format!("Failed to unregister shortcuts: {error}"))
    }

    fn install_permission_interception(&self, grant: &BridgeGrant) -> Result<(), String> {
        self.app_handle
            .add_capability(bridge_capability(grant))
            .map_err(|error| {
                format!(
                    "Failed to allow permission bridge for {}: {error}",
                    grant.remote_url
                )
            })
    }

    fn spawn(&self, task: HostTask) {
        tauri::async_runtime::spawn(task);
    }

    fn run_on_ui(&self, task: UiTask) -> Result<(), String> {
        self.app_handle
            .run_on_main_thread(task)
            .map_err(|error| format!("Failed to dispatch to main thread: {error}"))
    }

    fn exit(&self, code: i32) {
        self.app_handle.exit(code);
    }
}
