//! Communication layer: port discovery and the serial session

pub mod serial;
pub mod session;
