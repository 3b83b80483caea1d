// Without the desktop runtime the core is only driven by its tests.
#![cfg_attr(not(feature = "desktop"), allow(dead_code))]

mod app_constants;
mod app_types;
mod backend_readiness;
mod error_page;
mod escape_hatches;
mod kiosk_config;
mod logging;
mod main_window;
mod permission_bridge;
mod permission_gate;
mod splash_window;
mod supervisor;
mod window_host;

#[cfg(feature = "desktop")]
mod app_runtime;
#[cfg(feature = "desktop")]
mod tauri_host;

#[cfg(test)]
mod test_support;

pub(crate) use app_constants::*;
pub(crate) use logging::append_kiosk_log;

pub use escape_hatches::{hatch_from_accelerator, EscapeHatch};

#[cfg(feature = "desktop")]
pub use app_runtime::run;
