use crate::core::adb::PackId;
use crate::core::capability::HostCapabilities;
use crate::core::settings::Targets;
use crate::core::theme::Theme;
use crate::CONFIG_DIR;
use serde::{Deserialize, Serialize};
use static_init::dynamic;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub extension: ExtensionSettings,
    /// Without a `[host]` table, assume a SmartWatch, which keeps a history.
    #[serde(default = "default_host")]
    pub host: HostCapabilities,
}

fn default_host() -> HostCapabilities {
    HostCapabilities {
        supports_history: Some(true),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            extension: ExtensionSettings::default(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralSettings {
    pub theme: String,
    /// If empty, ADB chooses the default device
    pub device_serial: String,
}

/// Who is who on the device.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ExtensionSettings {
    pub package: PackId,
    pub target_package: PackId,
    pub read_permission: String,
    pub provider_component: String,
    pub event_provider: String,
    pub developer_email: String,
    pub more_apps_uri: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default().to_string(),
            device_serial: String::default(),
        }
    }
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        let pack = |p: &str| PackId::new(p).unwrap_or_else(|| unreachable!());
        Self {
            package: pack("de.cketti.smartwatch.k9"),
            target_package: pack("com.fsck.k9"),
            read_permission: "com.fsck.k9.permission.READ_MESSAGES".to_string(),
            provider_component: "com.fsck.k9.provider.MessageProvider".to_string(),
            event_provider: "content://com.sonyericsson.extras.liveware.aef.notification"
                .to_string(),
            developer_email: "ck@cketti.de".to_string(),
            more_apps_uri: "https://play.google.com/store/apps/developer?id=cketti".to_string(),
        }
    }
}

#[dynamic]
static CONFIG_FILE: PathBuf = CONFIG_DIR.join("config.toml");

impl Config {
    pub fn load_configuration_file() -> Self {
        Self::load_from(&CONFIG_FILE)
    }

    /// Reads `path`; an unreadable or invalid file is replaced by the defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => match toml::from_str(&s) {
                Ok(config) => return config,
                Err(e) => error!("Invalid config file: `{}`", e),
            },
            Err(e) => error!("Failed to read config file: `{}`", e),
        }
        error!("Restoring default config file");
        let config = Self::default();
        config.save_to(path);
        config
    }

    pub fn save_to(&self, path: &Path) {
        let written = toml::to_string(self)
            .map_err(|e| e.to_string())
            .and_then(|toml| fs::write(path, toml).map_err(|e| e.to_string()));
        if let Err(e) = written {
            error!("Could not write config file to disk: {e}");
        }
    }

    /// `ANDROID_SERIAL` wins over the config file, as it does for ADB itself.
    pub fn device_serial(&self) -> String {
        env::var("ANDROID_SERIAL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.general.device_serial.clone())
    }

    pub fn targets(&self) -> Targets {
        Targets {
            target: self.extension.target_package.clone(),
            extension: self.extension.package.clone(),
            developer_email: self.extension.developer_email.clone(),
            more_apps_uri: self.extension.more_apps_uri.clone(),
        }
    }
}
