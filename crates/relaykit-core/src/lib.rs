//! # RelayKit Core
//!
//! Core types for RelayKit: the unified error type and the application
//! configuration, including the fixed relay command table.

pub mod config;
pub mod error;

pub use config::{default_devices, AppConfig, DeviceCommand, DEFAULT_BAUD, DEFAULT_PORT};
pub use error::{ConnectionError, Error, Result};
