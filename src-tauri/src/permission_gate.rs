use std::fmt;

use serde::Serialize;
use url::{Origin, Url};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Capability {
    Geolocation,
    Camera,
    Microphone,
    Notifications,
    Other(String),
}

impl Capability {
    pub(crate) fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "geolocation" | "location" => Capability::Geolocation,
            "camera" | "videocapture" => Capability::Camera,
            "microphone" | "audiocapture" => Capability::Microphone,
            "notifications" | "notification" => Capability::Notifications,
            other => Capability::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Geolocation => f.write_str("geolocation"),
            Capability::Camera => f.write_str("camera"),
            Capability::Microphone => f.write_str("microphone"),
            Capability::Notifications => f.write_str("notifications"),
            Capability::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PermissionOutcome {
    Allow,
    Deny,
}

impl PermissionOutcome {
    fn as_str(self) -> &'static str {
        match self {
            PermissionOutcome::Allow => "allow",
            PermissionOutcome::Deny => "deny",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PermissionDecision {
    pub(crate) capability: Capability,
    pub(crate) origin: Option<String>,
    pub(crate) outcome: PermissionOutcome,
}

impl PermissionDecision {
    #[cfg(test)]
    pub(crate) fn is_allowed(&self) -> bool {
        self.outcome == PermissionOutcome::Allow
    }
}

/// Location access is granted only to the configured application origin;
/// every other capability is refused.
#[derive(Debug, Clone)]
pub(crate) struct PermissionGate {
    allowed_origin: Option<Origin>,
}

impl PermissionGate {
    /// Never fails: a malformed application URL disables the gate, which then
    /// denies everything.
    pub(crate) fn new<F>(app_url: &str, log: F) -> Self
    where
        F: Fn(&str),
    {
        let allowed_origin = match resolve_origin(Some(app_url)) {
            Ok(origin) => Some(origin),
            Err(error) => {
                log(&format!(
                    "invalid application url '{app_url}': {error}; permission gate disabled, all permission requests will be denied"
                ));
                None
            }
        };
        Self { allowed_origin }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.allowed_origin.is_some()
    }

    pub(crate) fn allowed_origin(&self) -> Option<String> {
        self.allowed_origin
            .as_ref()
            .map(Origin::ascii_serialization)
    }

    pub(crate) fn decide<F>(
        &self,
        capability: &str,
        requesting_url: Option<&str>,
        log: F,
    ) -> PermissionDecision
    where
        F: Fn(&str),
    {
        let capability = Capability::parse(capability);
        let requesting_origin = match resolve_origin(requesting_url) {
            Ok(origin) => origin,
            Err(error) => {
                log(&format!(
                    "permission {capability} denied: cannot resolve requesting origin ({error})"
                ));
                return PermissionDecision {
                    capability,
                    origin: None,
                    outcome: PermissionOutcome::Deny,
                };
            }
        };

        let outcome = match (&self.allowed_origin, &capability) {
            (Some(allowed), Capability::Geolocation) if *allowed == requesting_origin => {
                PermissionOutcome::Allow
            }
            _ => PermissionOutcome::Deny,
        };
        let origin = requesting_origin.ascii_serialization();

        if self.is_enabled() {
            log(&format!(
                "permission {capability} for origin {origin}: {}",
                outcome.as_str()
            ));
        } else {
            log(&format!(
                "permission {capability} for origin {origin}: deny (permission gate disabled)"
            ));
        }

        PermissionDecision {
            capability,
            origin: Some(origin),
            outcome,
        }
    }
}

fn resolve_origin(raw: Option<&str>) -> Result<Origin, String> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| "missing url".to_string())?;
    let parsed = Url::parse(raw).map_err(|error| format!("invalid url '{raw}': {error}"))?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(format!("url '{raw}' has an opaque origin"));
    }
    Ok(origin)
}
