use serde::{Deserialize, Serialize};

/// Capabilities advertised by the paired accessory.
///
/// Read once when the screen is built and never changed afterwards.
/// Flags the accessory doesn't advertise stay `None`.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_history: Option<bool>,
}

/// Whether the accessory can show past events, i.e. whether clearing them means anything.
#[must_use]
pub fn supports_history(caps: &HostCapabilities) -> bool {
    caps.supports_history.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_flag_is_false() {
        assert!(!supports_history(&HostCapabilities::default()));
        assert!(!supports_history(&HostCapabilities {
            supports_history: Some(false)
        }));
        assert!(supports_history(&HostCapabilities {
            supports_history: Some(true)
        }));
    }
}
