//! Routes the page's permission-requesting web APIs through the permission
//! gate. The webview has no native permission hook we can reach portably, so
//! every frame of the main window gets an initialization script that asks the
//! shell first. Frames without IPC access get a refusal.

use crate::{MAIN_WINDOW_LABEL, PERMISSION_BRIDGE_CAPABILITY, PERMISSION_REQUEST_COMMAND};

const PERMISSION_BRIDGE_SCRIPT: &str = r#"
(() => {
  if (window.__KIOSK_PERMISSION_BRIDGE__) {
    return;
  }
  window.__KIOSK_PERMISSION_BRIDGE__ = true;

  const command = __KIOSK_PERMISSION_COMMAND__;
  const ask = (capability) => {
    const internals = window.__TAURI_INTERNALS__;
    if (!internals || typeof internals.invoke !== 'function') {
      return Promise.resolve(false);
    }
    return internals
      .invoke(command, { capability })
      .then((outcome) => outcome === 'allow', () => false);
  };
  const refusal = (name) =>
    new DOMException(`${name} permission denied by kiosk policy`, 'NotAllowedError');

  const geolocation = navigator.geolocation;
  if (geolocation) {
    const getCurrentPosition = geolocation.getCurrentPosition.bind(geolocation);
    const watchPosition = geolocation.watchPosition.bind(geolocation);
    const clearWatch = geolocation.clearWatch.bind(geolocation);
    const positionError = { code: 1, PERMISSION_DENIED: 1, message: 'User denied Geolocation' };
    const watches = new Map();
    let nextWatchId = 1;

    geolocation.getCurrentPosition = (success, error, options) => {
      ask('geolocation').then((allowed) => {
        if (allowed) {
          getCurrentPosition(success, error, options);
        } else if (typeof error === 'function') {
          error(positionError);
        }
      });
    };
    geolocation.watchPosition = (success, error, options) => {
      const watchId = nextWatchId++;
      watches.set(watchId, null);
      ask('geolocation').then((allowed) => {
        if (!watches.has(watchId)) {
          return;
        }
        if (allowed) {
          watches.set(watchId, watchPosition(success, error, options));
        } else if (typeof error === 'function') {
          error(positionError);
        }
      });
      return watchId;
    };
    geolocation.clearWatch = (watchId) => {
      const nativeId = watches.get(watchId);
      watches.delete(watchId);
      if (nativeId !== null && nativeId !== undefined) {
        clearWatch(nativeId);
      }
    };
  }

  const mediaDevices = navigator.mediaDevices;
  if (mediaDevices && typeof mediaDevices.getUserMedia === 'function') {
    const getUserMedia = mediaDevices.getUserMedia.bind(mediaDevices);
    mediaDevices.getUserMedia = async (constraints = {}) => {
      const wanted = [];
      if (constraints.video) {
        wanted.push('camera');
      }
      if (constraints.audio) {
        wanted.push('microphone');
      }
      for (const capability of wanted) {
        if (!(await ask(capability))) {
          throw refusal(capability);
        }
      }
      return getUserMedia(constraints);
    };
  }

  if (window.Notification && typeof window.Notification.requestPermission === 'function') {
    const requestPermission = window.Notification.requestPermission.bind(window.Notification);
    window.Notification.requestPermission = async (callback) => {
      const result = (await ask('notifications')) ? await requestPermission() : 'denied';
      if (typeof callback === 'function') {
        callback(result);
      }
      return result;
    };
  }
})();
"#;

pub(crate) fn permission_bridge_script() -> String {
    let command = serde_json::to_string(PERMISSION_REQUEST_COMMAND)
        .unwrap_or_else(|_| "\"\"".to_string());
    PERMISSION_BRIDGE_SCRIPT.replace("__KIOSK_PERMISSION_COMMAND__", &command)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BridgeInjection {
    pub(crate) script: String,
    /// Subframes share the page's origin, so they must be covered too.
    pub(crate) all_frames: bool,
}

pub(crate) fn bridge_injection() -> BridgeInjection {
    BridgeInjection {
        script: permission_bridge_script(),
        all_frames: true,
    }
}

/// Runtime ACL entry letting the application origin call the bridge command
/// from the main window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BridgeGrant {
    pub(crate) identifier: &'static str,
    pub(crate) remote_url: String,
    pub(crate) window: &'static str,
    pub(crate) permission: String,
}

/// Name of the allow permission generated for an app command declared in the
/// build manifest.
pub(crate) fn command_permission(command: &str) -> String {
    format!("allow-{}", command.replace('_', "-"))
}

pub(crate) fn bridge_grant(origin: &str) -> BridgeGrant {
    BridgeGrant {
        identifier: PERMISSION_BRIDGE_CAPABILITY,
        remote_url: format!("{}/*", origin.trim_end_matches('/')),
        window: MAIN_WINDOW_LABEL,
        permission: command_permission(PERMISSION_REQUEST_COMMAND),
    }
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub(crate) fn kiosk_permission_request(
    webview: tauri::Webview,
    state: tauri::State<'_, crate::tauri_host::KioskState>,
    capability: String,
) -> crate::permission_gate::PermissionOutcome {
    let requesting_url = webview.url().ok().map(|url| url.to_string());
    state
        .supervisor()
        .decide_permission(&capability, requesting_url.as_deref())
        .outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission_gate::PermissionOutcome;

    #[test]
    fn bridge_script_invokes_the_permission_command() {
        let script = permission_bridge_script();
        assert!(script.contains("const command = \"kiosk_permission_request\";"));
        assert!(!script.contains("__KIOSK_PERMISSION_COMMAND__"));
    }

    #[test]
    fn bridge_script_only_treats_allow_as_granted() {
        let script = permission_bridge_script();
        assert!(script.contains("outcome === 'allow'"));
        assert_eq!(
            serde_json::to_string(&PermissionOutcome::Allow).unwrap(),
            "\"allow\""
        );
        assert_eq!(
            serde_json::to_string(&PermissionOutcome::Deny).unwrap(),
            "\"deny\""
        );
    }

    #[test]
    fn bridge_is_injected_into_every_frame() {
        let injection = bridge_injection();
        assert!(injection.all_frames);
        assert_eq!(injection.script, permission_bridge_script());
    }

    #[test]
    fn bridge_grant_allows_the_command_for_the_application_origin() {
        let grant = bridge_grant("http://127.0.0.1:6010");
        assert_eq!(grant.identifier, "kiosk-permission-bridge");
        assert_eq!(grant.remote_url, "http://127.0.0.1:6010/*");
        assert_eq!(grant.window, "main");
        assert_eq!(grant.permission, "allow-kiosk-permission-request");
    }

    #[test]
    fn bridge_script_covers_location_media_and_notifications() {
        let script = permission_bridge_script();
        for capability in ["'geolocation'", "'camera'", "'microphone'", "'notifications'"] {
            assert!(script.contains(capability), "{capability}");
        }
    }
}
