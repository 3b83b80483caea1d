use std::sync::Arc;

use tauri::{Manager, RunEvent, WindowEvent};
use tauri_plugin_autostart::{MacosLauncher, ManagerExt};

use crate::{
    append_kiosk_log,
    backend_readiness::HttpProbe,
    kiosk_config::KioskConfig,
    logging,
    main_window::CloseDecision,
    supervisor::{LogSink, Supervisor},
    tauri_host::{KioskState, TauriHost},
    window_host::WindowRole,
};

/// Must run before the webview runtime initialises.
fn apply_gpu_workaround() {
    #[cfg(target_os = "linux")]
    {
        if std::env::var_os("WEBKIT_DISABLE_COMPOSITING_MODE").is_none() {
            std::env::set_var("WEBKIT_DISABLE_COMPOSITING_MODE", "1");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var_os("WEBVIEW2_ADDITIONAL_BROWSER_ARGUMENTS").is_none() {
            std::env::set_var("WEBVIEW2_ADDITIONAL_BROWSER_ARGUMENTS", "--disable-gpu");
        }
    }
}

fn sync_open_at_login(app_handle: &tauri::AppHandle, enabled: bool) {
    let autolaunch = app_handle.autolaunch();
    let result = if enabled {
        autolaunch.enable()
    } else {
        autolaunch.disable()
    };
    match result {
        Ok(()) => append_kiosk_log(&format!(
            "open at login {}",
            if enabled { "enabled" } else { "disabled" }
        )),
        Err(error) => append_kiosk_log(&format!("failed to update open at login: {error}")),
    }
}

pub fn run() {
    let config = KioskConfig::from_env();

    append_kiosk_log("kiosk process starting");
    append_kiosk_log(&format!(
        "kiosk log path: {}",
        logging::kiosk_log_path().display()
    ));
    if config.disable_gpu {
        apply_gpu_workaround();
        append_kiosk_log("gpu compositing disabled for webview");
    }

    tauri::Builder::default()
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .plugin(tauri_plugin_autostart::init(
            MacosLauncher::LaunchAgent,
            None,
        ))
        .invoke_handler(tauri::generate_handler![
            crate::permission_bridge::kiosk_permission_request,
        ])
        .on_window_event(|window, event| {
            let WindowEvent::CloseRequested { api, .. } = event else {
                return;
            };
            let Some(role) = WindowRole::from_label(window.label()) else {
                return;
            };
            let Some(state) = window.app_handle().try_state::<KioskState>() else {
                return;
            };
            if state.supervisor().handle_close_requested(role) == CloseDecision::Prevent {
                api.prevent_close();
            }
        })
        .setup(move |app| {
            let app_handle = app.handle().clone();
            sync_open_at_login(&app_handle, config.open_at_login);

            let probe = HttpProbe::new(config.readiness.probe_timeout)?;
            let log: LogSink = Arc::new(append_kiosk_log);
            let supervisor = Supervisor::new(TauriHost::new(app_handle), probe, config, log);
            app.manage(KioskState::new(Arc::clone(&supervisor)));
            supervisor.start();
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { api, .. } => {
                let Some(state) = app_handle.try_state::<KioskState>() else {
                    return;
                };
                if state.supervisor().handle_exit_requested() == CloseDecision::Prevent {
                    api.prevent_exit();
                }
            }
            RunEvent::Exit => {
                append_kiosk_log("kiosk process exiting");
                if let Some(state) = app_handle.try_state::<KioskState>() {
                    state.supervisor().shutdown();
                }
            }
            _ => {}
        });
}
