use std::time::Duration;

pub(crate) const DEFAULT_APP_URL: &str = "http://127.0.0.1:6010/";
pub(crate) const APP_DIR_NAME: &str = "kiosk-shell";
pub(crate) const KIOSK_LOG_FILE: &str = "kiosk.log";

pub(crate) const SPLASH_WINDOW_LABEL: &str = "splash";
pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const SPLASH_DOCUMENT: &str = "splash.html";

pub(crate) const SPLASH_WINDOW_SIZE: (f64, f64) = (800.0, 600.0);
pub(crate) const MAIN_WINDOW_SIZE: (f64, f64) = (1280.0, 800.0);

pub(crate) const APP_URL_ENV: &str = "KIOSK_APP_URL";
pub(crate) const READY_TIMEOUT_ENV: &str = "KIOSK_READY_TIMEOUT_MS";
pub(crate) const READY_POLL_INTERVAL_ENV: &str = "KIOSK_READY_POLL_INTERVAL_MS";
pub(crate) const READY_PROBE_TIMEOUT_ENV: &str = "KIOSK_READY_PROBE_TIMEOUT_MS";
pub(crate) const OPEN_AT_LOGIN_ENV: &str = "KIOSK_OPEN_AT_LOGIN";
pub(crate) const DISABLE_GPU_ENV: &str = "KIOSK_DISABLE_GPU";
pub(crate) const LOG_DIR_ENV: &str = "KIOSK_LOG_DIR";

pub(crate) const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(60_000);
pub(crate) const DEFAULT_READY_POLL_INTERVAL_MS: u64 = 1_000;
pub(crate) const READY_POLL_INTERVAL_MIN_MS: u64 = 50;
pub(crate) const READY_POLL_INTERVAL_MAX_MS: u64 = 10_000;
pub(crate) const DEFAULT_READY_PROBE_TIMEOUT_MS: u64 = 800;
pub(crate) const READY_PROBE_TIMEOUT_MIN_MS: u64 = 100;
pub(crate) const READY_PROBE_TIMEOUT_MAX_MS: u64 = 30_000;

pub(crate) const PERMISSION_REQUEST_COMMAND: &str = "kiosk_permission_request";
pub(crate) const PERMISSION_BRIDGE_CAPABILITY: &str = "kiosk-permission-bridge";

#[cfg(test)]
mod tests {
    use super::{PERMISSION_REQUEST_COMMAND, SPLASH_DOCUMENT};

    #[test]
    fn bundler_builds_the_desktop_runtime() {
        let config: serde_json::Value =
            serde_json::from_str(include_str!("../tauri.conf.json")).unwrap();
        assert_eq!(config["build"]["features"], serde_json::json!(["desktop"]));
        assert_eq!(config["build"]["frontendDist"], "splash");
        assert!(std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("splash")
            .join(SPLASH_DOCUMENT)
            .is_file());
    }

    #[test]
    fn build_manifest_declares_the_permission_command() {
        let build_script = include_str!("../build.rs");
        assert!(build_script.contains(&format!("\"{PERMISSION_REQUEST_COMMAND}\"")));
    }
}
