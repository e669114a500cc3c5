//! Configuration for RelayKit
//!
//! Connection defaults and the fixed relay command table. Configuration is
//! in-memory only; RelayKit does not persist settings between runs.

use serde::{Deserialize, Serialize};

/// Default baud rate for Arduino-style boards
pub const DEFAULT_BAUD: u32 = 9600;

/// Port offered in the selector when enumeration finds no hardware
pub const DEFAULT_PORT: &str = "COM5";

/// A relay channel with its on/off command tokens
///
/// The sketch expects two-character commands ending in `#`; the tokens are
/// sent verbatim, with no terminator appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCommand {
    /// Label shown on the button pair
    pub label: String,
    /// Bytes sent by the ON button
    pub on_command: String,
    /// Bytes sent by the OFF button
    pub off_command: String,
}

impl DeviceCommand {
    /// Create a new device command
    pub fn new(
        label: impl Into<String>,
        on_command: impl Into<String>,
        off_command: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            on_command: on_command.into(),
            off_command: off_command.into(),
        }
    }
}

/// The built-in command table, in display order
pub fn default_devices() -> Vec<DeviceCommand> {
    vec![
        DeviceCommand::new("Switch", "A#", "a#"),
        DeviceCommand::new("Light", "B#", "b#"),
        DeviceCommand::new("Light", "C#", "c#"),
        DeviceCommand::new("Light", "D#", "d#"),
        DeviceCommand::new("Fan", "E#", "e#"),
    ]
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fallback port when enumeration finds nothing
    pub default_port: String,
    /// Initial baud rate shown in the baud entry
    pub baud_rate: u32,
    /// Relay command table, one ON/OFF button pair per entry
    pub devices: Vec<DeviceCommand>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD,
            devices: default_devices(),
        }
    }
}
