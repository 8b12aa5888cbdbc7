use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{AppDescriptor, Icon};

pub const MIN_SAMPLE_INTERVAL_MS: u64 = 100;

fn default_apps() -> Vec<AppDescriptor> {
    vec![
        AppDescriptor::new("Kodi", "kodi", Icon::Tv),
        AppDescriptor::new("Stremio", "stremio", Icon::Play),
        AppDescriptor::new("IPTV", "omarchy-iptv", Icon::Video),
        AppDescriptor::new("Tidal", "tidal-hifi", Icon::Music),
        AppDescriptor::new("Bluetooth", "blueman-manager", Icon::Bluetooth),
    ]
}

fn default_settings_command() -> String {
    "gnome-control-center".to_string()
}
fn default_reboot_command() -> String {
    "sudo reboot".to_string()
}
fn default_poweroff_command() -> String {
    "sudo poweroff".to_string()
}
fn default_sample_interval() -> u64 {
    2000
}
fn default_thermal_zone() -> PathBuf {
    PathBuf::from("/sys/class/thermal/thermal_zone0/temp")
}
fn default_true() -> bool {
    true
}

/// Launcher configuration, read from `config.yaml`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LauncherConfig {
    /// Tiles, in display order
    #[serde(default = "default_apps")]
    pub apps: Vec<AppDescriptor>,

    /// Command launched from the settings badge
    #[serde(default = "default_settings_command")]
    pub settings_command: String,

    #[serde(default = "default_reboot_command")]
    pub reboot_command: String,

    #[serde(default = "default_poweroff_command")]
    pub poweroff_command: String,

    /// Telemetry sampling period
    #[serde(default = "default_sample_interval")]
    pub sample_interval_ms: u64,

    /// Thermal sensor pseudo-file (milli-degrees Celsius)
    #[serde(default = "default_thermal_zone")]
    pub thermal_zone: PathBuf,

    /// Wallpaper image; a generated gradient is used when absent or unreadable
    #[serde(default)]
    pub wallpaper: Option<PathBuf>,

    /// Draw icons with Nerd Font code points
    #[serde(default = "default_true")]
    pub nerd_font: bool,

    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            apps: default_apps(),
            settings_command: default_settings_command(),
            reboot_command: default_reboot_command(),
            poweroff_command: default_poweroff_command(),
            sample_interval_ms: default_sample_interval(),
            thermal_zone: default_thermal_zone(),
            wallpaper: None,
            nerd_font: true,
            log_file: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    NoApps,
    EmptyField { field: String },
    IntervalTooShort { interval_ms: u64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Yaml(e) => write!(f, "YAML parse error: {}", e),
            Self::NoApps => write!(f, "at least one app must be configured"),
            Self::EmptyField { field } => write!(f, "'{}' must not be empty", field),
            Self::IntervalTooShort { interval_ms } => write!(
                f,
                "sample_interval_ms is {} but must be at least {}",
                interval_ms, MIN_SAMPLE_INTERVAL_MS
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl LauncherConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse and validate config from a YAML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: LauncherConfig = serde_yaml::from_str(content)?;
        config.expand_paths(std::env::var_os("HOME").map(PathBuf::from).as_deref());
        config.validate()?;
        Ok(config)
    }

    /// Standard locations, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("tvdeck").join("config.yaml"));
        }
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("tvdeck")
                    .join("config.yaml"),
            );
        }
        paths.push(PathBuf::from("/etc/tvdeck/config.yaml"));
        paths
    }

    /// Load the first config found in `candidates`, or the built-in defaults
    /// when none exists. A config that exists but fails to parse is an error.
    pub fn discover(candidates: &[PathBuf]) -> Result<(Option<PathBuf>, Self), ConfigError> {
        for path in candidates {
            if path.is_file() {
                let config = Self::load(path)?;
                return Ok((Some(path.clone()), config));
            }
        }
        Ok((None, Self::default()))
    }

    fn expand_paths(&mut self, home: Option<&Path>) {
        let Some(home) = home else { return };
        let expand = |p: &PathBuf| match p.strip_prefix("~") {
            Ok(rest) => home.join(rest),
            Err(_) => p.clone(),
        };
        self.wallpaper = self.wallpaper.as_ref().map(expand);
        self.log_file = self.log_file.as_ref().map(expand);
        self.thermal_zone = expand(&self.thermal_zone);
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.apps.is_empty() {
            return Err(ConfigError::NoApps);
        }

        for (i, app) in self.apps.iter().enumerate() {
            if app.name.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    field: format!("apps[{}].name", i),
                });
            }
            if app.command.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    field: format!("apps[{}].command", i),
                });
            }
        }

        for (field, value) in [
            ("settings_command", &self.settings_command),
            ("reboot_command", &self.reboot_command),
            ("poweroff_command", &self.poweroff_command),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    field: field.to_string(),
                });
            }
        }

        if self.sample_interval_ms < MIN_SAMPLE_INTERVAL_MS {
            return Err(ConfigError::IntervalTooShort {
                interval_ms: self.sample_interval_ms,
            });
        }

        Ok(())
    }

    pub fn sample_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.sample_interval_ms)
    }
}
