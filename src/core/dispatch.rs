use crate::core::adb::{AdbError, Cmd as AdbCmd, Intent, PackId};
use std::fmt;

/// Something handed over to whatever the platform offers to handle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handoff {
    /// Store page of a package
    StoreListing(PackId),
    /// OS "app info" page of a package
    AppInfo(PackId),
    /// Launcher entry of a package
    LaunchApp(PackId),
    /// Compose a mail to this address
    Compose(String),
    /// Open this URI
    Browse(String),
}

impl Handoff {
    pub fn intent(&self) -> Intent {
        match self {
            Self::StoreListing(p) => {
                Intent::new("android.intent.action.VIEW").data(format!("market://details?id={p}"))
            }
            Self::AppInfo(p) => Intent::new("android.settings.APPLICATION_DETAILS_SETTINGS")
                .category("android.intent.category.DEFAULT")
                .data(format!("package:{p}")),
            Self::LaunchApp(p) => Intent::new("android.intent.action.MAIN")
                .category("android.intent.category.LAUNCHER")
                .package(p.clone()),
            Self::Compose(address) => {
                Intent::new("android.intent.action.SENDTO").data(format!("mailto:{address}"))
            }
            Self::Browse(uri) => Intent::new("android.intent.action.VIEW").data(uri.clone()),
        }
    }
}

impl fmt::Display for Handoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreListing(p) => write!(f, "store listing of {p}"),
            Self::AppInfo(p) => write!(f, "app info of {p}"),
            Self::LaunchApp(p) => write!(f, "launch {p}"),
            Self::Compose(a) => write!(f, "mail to {a}"),
            Self::Browse(u) => write!(f, "browse {u}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no handler for {0}")]
    NoHandler(String),
    #[error(transparent)]
    Adb(#[from] AdbError),
}

pub trait Dispatcher {
    fn dispatch(&self, handoff: &Handoff) -> Result<(), DispatchError>;
}

/// Hands off to the device's activity manager.
#[derive(Debug, Clone, Default)]
pub struct DeviceDispatcher {
    /// If empty, ADB chooses the default device.
    pub device_serial: String,
}

impl Dispatcher for DeviceDispatcher {
    fn dispatch(&self, handoff: &Handoff) -> Result<(), DispatchError> {
        let intent = handoff.intent();
        match AdbCmd::new().sh(&self.device_serial).am().start(&intent) {
            Ok(o) => {
                info!("[DISPATCH] {intent} -> {o}");
                Ok(())
            }
            Err(AdbError::Failed(o)) if o.contains("unable to resolve Intent") => {
                Err(DispatchError::NoHandler(intent.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Dispatches `handoff`, absorbing any failure.
///
/// Handlers are expected to exist on nearly every device, so a failure is
/// only logged; the action just appears to do nothing.
pub fn dispatch_or_log(dispatcher: &dyn Dispatcher, handoff: &Handoff) -> bool {
    match dispatcher.dispatch(handoff) {
        Ok(()) => true,
        Err(e) => {
            error!("Couldn't open {handoff}: {e}");
            false
        }
    }
}

#[allow(clippy::unwrap_used, reason = "tests")]
#[cfg(test)]
mod tests {
    use super::*;

    struct NoHandler;
    impl Dispatcher for NoHandler {
        fn dispatch(&self, handoff: &Handoff) -> Result<(), DispatchError> {
            Err(DispatchError::NoHandler(handoff.intent().to_string()))
        }
    }

    #[test]
    fn failures_are_absorbed() {
        let h = Handoff::Browse("https://example.org".to_string());
        assert!(!dispatch_or_log(&NoHandler, &h));
    }

    #[test]
    fn intents() {
        let k9 = PackId::new("com.fsck.k9").unwrap();
        let store = Handoff::StoreListing(k9.clone()).intent();
        assert_eq!(store.action, "android.intent.action.VIEW");
        assert_eq!(store.data.as_deref(), Some("market://details?id=com.fsck.k9"));

        let info = Handoff::AppInfo(PackId::new("de.cketti.smartwatch.k9").unwrap()).intent();
        assert_eq!(info.data.as_deref(), Some("package:de.cketti.smartwatch.k9"));

        let launch = Handoff::LaunchApp(k9.clone()).intent();
        assert_eq!(launch.package, Some(k9));
        assert_eq!(
            launch.category.as_deref(),
            Some("android.intent.category.LAUNCHER")
        );

        let mail = Handoff::Compose("ck@cketti.de".to_string()).intent();
        assert_eq!(mail.action, "android.intent.action.SENDTO");
        assert_eq!(mail.data.as_deref(), Some("mailto:ck@cketti.de"));
    }
}
