use crate::{
    permission_bridge,
    window_host::{WindowContent, WindowHost, WindowRole, WindowSpec},
    MAIN_WINDOW_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowLifecycle {
    NoWindow,
    SplashVisible,
    MainVisible,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseDecision {
    Allow,
    Prevent,
}

pub(crate) fn main_window_spec(app_url: &str) -> WindowSpec {
    WindowSpec {
        role: WindowRole::Main,
        title: "Kiosk",
        width: MAIN_WINDOW_SIZE.0,
        height: MAIN_WINDOW_SIZE.1,
        resizable: true,
        decorations: false,
        focusable: true,
        always_on_top: true,
        permission_bridge: Some(permission_bridge::bridge_injection()),
        content: WindowContent::Remote(app_url.to_string()),
    }
}

/// Close guard: supervised windows only close once forced exit was requested.
pub(crate) fn decide_close(force_quit: bool) -> CloseDecision {
    if force_quit {
        CloseDecision::Allow
    } else {
        CloseDecision::Prevent
    }
}

/// Creates the main window on `app_url` and tears the splash down.
///
/// The splash is only destroyed once the main window exists, so a failed
/// creation leaves the splash in place for the error screen.
pub(crate) fn open_main_window<H, F>(
    host: &H,
    app_url: &str,
    splash: Option<&H::Window>,
    log: F,
) -> Result<H::Window, String>
where
    H: WindowHost,
    F: Fn(&str),
{
    let main = host.create_window(&main_window_spec(app_url))?;
    log(&format!("main window created, loading {app_url}"));

    if let Some(splash) = splash {
        if !host.is_destroyed(splash) {
            if let Err(error) = host.destroy_window(splash) {
                log(&format!("failed to destroy splash window: {error}"));
            }
        }
    }

    Ok(main)
}
