//! Alert configuration: defaults + per-user registry overrides
//! (HKCU\Software\TrayAlert)

use std::time::Duration;
use thiserror::Error;

#[cfg(windows)]
use winreg::RegKey;
#[cfg(windows)]
use winreg::enums::{HKEY_CURRENT_USER, KEY_READ, KEY_WRITE};

#[cfg(windows)]
const SETTINGS_KEY: &str = r"Software\TrayAlert";
#[cfg(windows)]
const BALLOON_TITLE: &str = "BalloonTitle";
#[cfg(windows)]
const LINGER_SECS: &str = "LingerSecs";
#[cfg(windows)]
const SHOW_TRAY_ICON: &str = "ShowTrayIcon";

/// Title displayed on every balloon unless overridden
pub const DEFAULT_BALLOON_TITLE: &str = "QR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Registry access failed: {0}")]
    Registry(#[from] std::io::Error),
}

/// Alert configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    /// Balloon title; the caller's title only goes to the tooltip
    pub balloon_title: String,
    pub class_name: String,
    pub window_title: String,
    /// How long the binary pumps messages before removing the icon
    pub linger: Duration,
    /// Also set the tray image (otherwise only the balloon shows the icon)
    pub show_tray_icon: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            balloon_title: DEFAULT_BALLOON_TITLE.to_string(),
            class_name: "TrayAlertWindow".to_string(),
            window_title: "Tray Alert".to_string(),
            linger: Duration::from_secs(10),
            show_tray_icon: false,
        }
    }
}

/// Values read from the registry; None = not set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub balloon_title: Option<String>,
    pub linger_secs: Option<u32>,
    pub show_tray_icon: Option<u32>,
}

impl AlertConfig {
    /// Defaults overlaid with registry values
    pub fn load() -> Self {
        let mut config = Self::default();
        config.apply(&read_overrides());
        config
    }

    /// Overlay set values; empty title keeps the default
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(title) = overrides.balloon_title.as_deref().filter(|t| !t.is_empty()) {
            self.balloon_title = title.to_string();
        }
        if let Some(secs) = overrides.linger_secs {
            self.linger = Duration::from_secs(u64::from(secs));
        }
        if let Some(flag) = overrides.show_tray_icon {
            self.show_tray_icon = flag != 0;
        }
    }
}

/// Registry changes requested from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    /// Remove every override first
    pub reset: bool,
    pub balloon_title: Option<String>,
    pub linger: Option<Duration>,
    pub show_tray_icon: Option<bool>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ========== Registry Persistence ==========

/// Read overrides from HKCU (missing key → all None)
#[cfg(windows)]
pub fn read_overrides() -> Overrides {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let Ok(key) = hkcu.open_subkey_with_flags(SETTINGS_KEY, KEY_READ) else {
        return Overrides::default();
    };
    Overrides {
        balloon_title: key.get_value::<String, _>(BALLOON_TITLE).ok(),
        linger_secs: key.get_value::<u32, _>(LINGER_SECS).ok(),
        show_tray_icon: key.get_value::<u32, _>(SHOW_TRAY_ICON).ok(),
    }
}

#[cfg(not(windows))]
pub fn read_overrides() -> Overrides {
    Overrides::default()
}

/// Persist balloon title override
#[cfg(windows)]
pub fn store_balloon_title(title: &str) -> Result<(), ConfigError> {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (key, _) = hkcu.create_subkey(SETTINGS_KEY)?;
    key.set_value(BALLOON_TITLE, &title.to_string())?;
    Ok(())
}

/// Persist linger override
#[cfg(windows)]
pub fn store_linger(linger: Duration) -> Result<(), ConfigError> {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (key, _) = hkcu.create_subkey(SETTINGS_KEY)?;
    let secs = u32::try_from(linger.as_secs()).unwrap_or(u32::MAX);
    key.set_value(LINGER_SECS, &secs)?;
    Ok(())
}

/// Persist tray image switch
#[cfg(windows)]
pub fn store_show_tray_icon(show: bool) -> Result<(), ConfigError> {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (key, _) = hkcu.create_subkey(SETTINGS_KEY)?;
    key.set_value(SHOW_TRAY_ICON, &u32::from(show))?;
    Ok(())
}

/// Apply `update`: reset first, then each set value
#[cfg(windows)]
pub fn store(update: &ConfigUpdate) -> Result<(), ConfigError> {
    if update.reset {
        clear()?;
    }
    if let Some(title) = &update.balloon_title {
        store_balloon_title(title)?;
    }
    if let Some(linger) = update.linger {
        store_linger(linger)?;
    }
    if let Some(show) = update.show_tray_icon {
        store_show_tray_icon(show)?;
    }
    Ok(())
}

/// Remove all overrides
#[cfg(windows)]
pub fn clear() -> Result<(), ConfigError> {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = match hkcu.open_subkey_with_flags(SETTINGS_KEY, KEY_WRITE) {
        Ok(key) => key,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    // Ignore error if value doesn't exist
    let _ = key.delete_value(BALLOON_TITLE);
    let _ = key.delete_value(LINGER_SECS);
    let _ = key.delete_value(SHOW_TRAY_ICON);
    Ok(())
}
