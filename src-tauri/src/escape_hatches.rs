use crate::window_host::WindowHost;

pub const DIAGNOSTICS_ACCELERATOR: &str = "F12";
pub const RELOAD_ACCELERATOR: &str = "Control+R";
pub const FORCED_EXIT_ACCELERATOR: &str = "Shift+D";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapeHatch {
    Diagnostics,
    Reload,
    ForcedExit,
}

pub(crate) const ESCAPE_HATCHES: [EscapeHatch; 3] = [
    EscapeHatch::Diagnostics,
    EscapeHatch::Reload,
    EscapeHatch::ForcedExit,
];

impl EscapeHatch {
    pub fn accelerator(self) -> &'static str {
        match self {
            EscapeHatch::Diagnostics => DIAGNOSTICS_ACCELERATOR,
            EscapeHatch::Reload => RELOAD_ACCELERATOR,
            EscapeHatch::ForcedExit => FORCED_EXIT_ACCELERATOR,
        }
    }

    /// Key label shown to operators on the fallback screen.
    pub fn key_label(self) -> &'static str {
        match self {
            EscapeHatch::Diagnostics => "F12",
            EscapeHatch::Reload => "Ctrl+R",
            EscapeHatch::ForcedExit => "Shift+D",
        }
    }

    pub fn purpose(self) -> &'static str {
        match self {
            EscapeHatch::Diagnostics => "DevTools",
            EscapeHatch::Reload => "retry",
            EscapeHatch::ForcedExit => "quit",
        }
    }
}

pub fn hatch_from_accelerator(accelerator: &str) -> Option<EscapeHatch> {
    let accelerator = accelerator.trim();
    ESCAPE_HATCHES
        .into_iter()
        .find(|hatch| hatch.accelerator().eq_ignore_ascii_case(accelerator))
}

/// Registers every binding; failures are logged and skipped so one conflicting
/// shortcut cannot take the others down. Returns what actually registered.
pub(crate) fn register_escape_hatches<H, F>(host: &H, log: F) -> Vec<EscapeHatch>
where
    H: WindowHost,
    F: Fn(&str),
{
    let mut registered = Vec::with_capacity(ESCAPE_HATCHES.len());
    for hatch in ESCAPE_HATCHES {
        match host.register_shortcut(hatch) {
            Ok(()) => registered.push(hatch),
            Err(error) => log(&format!(
                "failed to register escape hatch {}: {}",
                hatch.accelerator(),
                error
            )),
        }
    }
    log(&format!(
        "escape hatches registered: {}",
        registered
            .iter()
            .map(|hatch| hatch.accelerator())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    registered
}

pub(crate) fn release_escape_hatches<H, F>(host: &H, registered: Vec<EscapeHatch>, log: F)
where
    H: WindowHost,
    F: Fn(&str),
{
    if registered.is_empty() {
        return;
    }

    match host.unregister_all_shortcuts() {
        Ok(()) => log(&format!("released {} escape hatch bindings", registered.len())),
        Err(error) => log(&format!("failed to release escape hatch bindings: {error}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeHost, HostCall, LogCapture};

    #[test]
    fn hatch_from_accelerator_maps_all_known_bindings() {
        assert_eq!(
            hatch_from_accelerator(DIAGNOSTICS_ACCELERATOR),
            Some(EscapeHatch::Diagnostics)
        );
        assert_eq!(
            hatch_from_accelerator("control+r"),
            Some(EscapeHatch::Reload)
        );
        assert_eq!(
            hatch_from_accelerator(" Shift+D "),
            Some(EscapeHatch::ForcedExit)
        );
    }

    #[test]
    fn hatch_from_accelerator_returns_none_for_unknown_binding() {
        assert_eq!(hatch_from_accelerator("Alt+F4"), None);
    }

    #[test]
    fn register_skips_failed_bindings_and_keeps_the_rest() {
        let host = FakeHost::default();
        host.fail_shortcut(EscapeHatch::Reload);
        let logs = LogCapture::default();

        let registered = register_escape_hatches(&host, logs.sink_fn());

        assert_eq!(
            registered,
            vec![EscapeHatch::Diagnostics, EscapeHatch::ForcedExit]
        );
        assert!(logs.contains("failed to register escape hatch Control+R"));
    }

    #[test]
    fn release_is_a_no_op_when_nothing_is_registered() {
        let host = FakeHost::default();
        let logs = LogCapture::default();

        release_escape_hatches(&host, Vec::new(), logs.sink_fn());
        assert!(!host.calls().contains(&HostCall::UnregisterAllShortcuts));

        release_escape_hatches(&host, ESCAPE_HATCHES.to_vec(), logs.sink_fn());
        assert_eq!(
            host.calls()
                .iter()
                .filter(|call| **call == HostCall::UnregisterAllShortcuts)
                .count(),
            1
        );
    }
}
