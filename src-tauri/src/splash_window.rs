use crate::{
    window_host::{WindowContent, WindowHost, WindowRole, WindowSpec},
    SPLASH_DOCUMENT, SPLASH_WINDOW_SIZE,
};

pub(crate) fn splash_window_spec() -> WindowSpec {
    WindowSpec {
        role: WindowRole::Splash,
        title: "Starting",
        width: SPLASH_WINDOW_SIZE.0,
        height: SPLASH_WINDOW_SIZE.1,
        resizable: false,
        decorations: false,
        focusable: false,
        always_on_top: true,
        permission_bridge: None,
        content: WindowContent::Bundled(SPLASH_DOCUMENT),
    }
}

pub(crate) fn show_splash<H, F>(host: &H, log: F) -> Result<H::Window, String>
where
    H: WindowHost,
    F: Fn(&str),
{
    let window = host.create_window(&splash_window_spec())?;
    log("splash window shown");
    Ok(window)
}

/// Puts the bundled placeholder back after an error screen replaced it.
pub(crate) fn restore_splash<H, F>(host: &H, window: &H::Window, log: F)
where
    H: WindowHost,
    F: Fn(&str),
{
    if host.is_destroyed(window) {
        log("restore_splash skipped: splash window already destroyed");
        return;
    }
    if let Err(error) = host.load_bundled(window, SPLASH_DOCUMENT) {
        log(&format!("failed to restore splash document: {error}"));
    }
}
