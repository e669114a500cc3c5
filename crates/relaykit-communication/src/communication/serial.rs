//! Serial port discovery
//!
//! Enumerates attached serial devices for the port selector. Absence of
//! hardware is a valid result, not a failure: when nothing is found (or
//! enumeration itself fails) the configured default port is offered instead,
//! so the selector is never empty.

use serde::Serialize;

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
        }
    }
}

/// List available serial ports on the system
///
/// Returns every port the OS reports, in enumeration order. If the result
/// is empty (including when enumeration itself fails), a single entry for
/// `default_port` is returned instead.
pub fn list_ports(default_port: &str) -> Vec<SerialPortInfo> {
    let found = match serialport::available_ports() {
        Ok(ports) => ports
            .iter()
            .map(|port| SerialPortInfo::new(&port.port_name, get_port_description(port)))
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate serial ports: {}", e);
            Vec::new()
        }
    };

    ports_or_default(found, default_port)
}

/// Substitute the default port when enumeration came back empty
fn ports_or_default(ports: Vec<SerialPortInfo>, default_port: &str) -> Vec<SerialPortInfo> {
    if ports.is_empty() {
        vec![SerialPortInfo::new(default_port, "Default port")]
    } else {
        ports
    }
}

/// Get a user-friendly description for a port
fn get_port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_enumeration_falls_back_to_default() {
        let ports = ports_or_default(Vec::new(), "COM5");
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port_name, "COM5");
    }

    #[test]
    fn non_empty_enumeration_is_kept_in_order() {
        let found = vec![
            SerialPortInfo::new("/dev/ttyACM0", "USB Arduino Uno"),
            SerialPortInfo::new("/dev/ttyUSB0", "USB Serial Port"),
        ];
        let ports = ports_or_default(found.clone(), "COM5");
        assert_eq!(ports, found);
    }
}
