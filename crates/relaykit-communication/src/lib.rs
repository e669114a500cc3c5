//! # RelayKit Communication
//!
//! Serial transport for RelayKit: port discovery plus the connection
//! session that owns the reader thread and the incoming line queue.

pub mod communication;

pub use communication::{
    serial::{list_ports, SerialPortInfo},
    session::{ConnectionState, SerialLink, SerialSession},
};
