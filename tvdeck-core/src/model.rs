use serde::{Deserialize, Serialize};

/// Glyph identifier for a tile or badge. The front end decides how each one
/// is drawn (Nerd Font code point or a plain Unicode fallback).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Tv,
    Play,
    Video,
    Music,
    Bluetooth,
    Settings,
    Cpu,
    Memory,
    Temperature,
    Disk,
    #[default]
    Generic,
}

/// One launchable application, shown as a tile.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppDescriptor {
    pub name: String,
    /// Shell command line, run through `sh -c`
    pub command: String,
    #[serde(default)]
    pub icon: Icon,
}

impl AppDescriptor {
    pub fn new(name: &str, command: &str, icon: Icon) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            icon,
        }
    }
}

/// One consistent system load reading. All four fields always come from the
/// same sampling pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    pub cpu_percent: u8,
    pub mem_percent: u8,
    pub temp_celsius: i32,
    pub disk_percent: u8,
}

/// Privileged actions that need an explicit confirmation first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerAction {
    Reboot,
    PowerOff,
}

impl PowerAction {
    pub fn label(&self) -> &'static str {
        match self {
            PowerAction::Reboot => "Reboot",
            PowerAction::PowerOff => "Power Off",
        }
    }
}
