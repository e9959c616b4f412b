use crate::core::adb::{AdbError, Cmd as AdbCmd, PackId, PmLsPackFlag};
use std::fmt;

/// Health of the mail application, as far as the extension is concerned.
///
/// Exactly one is active; recomputed each time the screen is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvailabilityStatus {
    NotInstalled,
    PermissionDenied,
    Disabled,
    Available,
}

/// What activating the status entry does for a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Remediation {
    OpenStore,
    OpenAppInfo,
    LaunchApp,
    None,
}

impl AvailabilityStatus {
    #[must_use]
    pub const fn remediation(self) -> Remediation {
        match self {
            Self::NotInstalled => Remediation::OpenStore,
            Self::PermissionDenied => Remediation::OpenAppInfo,
            Self::Disabled => Remediation::LaunchApp,
            Self::Available => Remediation::None,
        }
    }

    /// Text shown under the status entry. `None` when there is nothing to fix.
    #[must_use]
    pub const fn summary(self) -> Option<&'static str> {
        match self {
            Self::NotInstalled => {
                Some("K-9 Mail is not installed. Click to open its store listing.")
            }
            Self::PermissionDenied => Some(
                "Missing permission to read K-9 Mail messages. Reinstall this extension after K-9 Mail, or check its app info.",
            ),
            Self::Disabled => {
                Some("K-9 Mail is not set up yet. Click to start it and add an account.")
            }
            Self::Available => None,
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotInstalled => "not installed",
            Self::PermissionDenied => "permission denied",
            Self::Disabled => "disabled",
            Self::Available => "available",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error(transparent)]
    Adb(#[from] AdbError),
    #[error("unexpected output: {0}")]
    Parse(String),
}

/// The three questions asked about the mail application.
///
/// Implementations must answer `Ok(false)` rather than fail when the
/// application is simply absent.
pub trait AppInspector {
    fn is_installed(&self, target: &PackId) -> Result<bool, InspectError>;
    /// Does this extension hold the permission to read `target`'s messages?
    fn has_read_permission(&self, target: &PackId) -> Result<bool, InspectError>;
    /// Is the component of `target` that exposes messages enabled?
    fn is_enabled(&self, target: &PackId) -> Result<bool, InspectError>;
}

/// Resolves the availability of `target`.
///
/// Checks are ordered: there's no point asking about permissions of an
/// app that isn't installed. A failing query is logged and degrades to
/// `NotInstalled`, so the user is still offered a way out.
pub fn probe(inspector: &dyn AppInspector, target: &PackId) -> AvailabilityStatus {
    match resolve(inspector, target) {
        Ok(status) => {
            debug!("[PROBE] {target} is {status}");
            status
        }
        Err(err) => {
            error!("[PROBE] Couldn't inspect {target}, assuming not installed: {err}");
            AvailabilityStatus::NotInstalled
        }
    }
}

fn resolve(
    inspector: &dyn AppInspector,
    target: &PackId,
) -> Result<AvailabilityStatus, InspectError> {
    Ok(if !inspector.is_installed(target)? {
        AvailabilityStatus::NotInstalled
    } else if !inspector.has_read_permission(target)? {
        AvailabilityStatus::PermissionDenied
    } else if !inspector.is_enabled(target)? {
        AvailabilityStatus::Disabled
    } else {
        AvailabilityStatus::Available
    })
}

/// Answers the inspector queries with `pm` and `dumpsys` on the device.
#[derive(Debug, Clone)]
pub struct AdbInspector {
    /// If empty, ADB chooses the default device.
    pub device_serial: String,
    /// This extension, the holder of `read_permission`
    pub extension: PackId,
    pub read_permission: String,
    /// Fully-qualified class name of the message provider
    pub provider_component: String,
}

impl AppInspector for AdbInspector {
    fn is_installed(&self, target: &PackId) -> Result<bool, InspectError> {
        let packs = AdbCmd::new()
            .sh(&self.device_serial)
            .pm()
            .ls_packs(None, target)?;
        Ok(packs.iter().any(|p| p == target.as_str()))
    }

    fn has_read_permission(&self, _target: &PackId) -> Result<bool, InspectError> {
        let dump = AdbCmd::new()
            .sh(&self.device_serial)
            .dumpsys_package(&self.extension)?;
        if dump.starts_with("Unable to find package") {
            return Err(InspectError::Parse(dump));
        }
        Ok(is_permission_granted(&dump, &self.read_permission))
    }

    fn is_enabled(&self, target: &PackId) -> Result<bool, InspectError> {
        let enabled = AdbCmd::new()
            .sh(&self.device_serial)
            .pm()
            .ls_packs(Some(PmLsPackFlag::E), target)?;
        if !enabled.iter().any(|p| p == target.as_str()) {
            return Ok(false);
        }
        let dump = AdbCmd::new().sh(&self.device_serial).dumpsys_package(target)?;
        Ok(!is_component_disabled(&dump, &self.provider_component))
    }
}

/// Looks for `permission` in a `dumpsys package` dump.
///
/// Android 6+ prints `<perm>: granted=true` under the runtime/install
/// permission sections; older releases list bare names under
/// `grantedPermissions:`.
///
/// Bare names only count inside `grantedPermissions:`; `requested permissions:`
/// lists them whether granted or not. An explicit `granted=false` wins.
fn is_permission_granted(dump: &str, permission: &str) -> bool {
    let granted = format!("{permission}: granted=true");
    let denied = format!("{permission}: granted=false");
    let mut legacy_indent = None;
    let mut found = false;
    for line in dump.lines() {
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();
        if trimmed.starts_with(&denied) {
            return false;
        }
        match legacy_indent {
            Some(i) if indent > i => found |= trimmed == permission,
            _ => legacy_indent = (trimmed == "grantedPermissions:").then_some(indent),
        }
        found |= trimmed.starts_with(&granted);
    }
    found
}

/// Whether `component` appears in a `disabledComponents:` section.
fn is_component_disabled(dump: &str, component: &str) -> bool {
    let mut section_indent = None;
    for line in dump.lines() {
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();
        match section_indent {
            Some(i) if indent > i => {
                if trimmed == component {
                    return true;
                }
            }
            _ => {
                section_indent = (trimmed == "disabledComponents:").then_some(indent);
            }
        }
    }
    false
}
