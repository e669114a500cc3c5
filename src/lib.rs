//! # RelayKit
//!
//! A GTK4/libadwaita desktop controller for Arduino-style relay boards.
//! RelayKit opens a serial connection to the board, sends the fixed
//! `#`-terminated command tokens the sketch expects, and shows everything
//! the board writes back in a scrolling console.
//!
//! ## Architecture
//!
//! RelayKit is organized as a workspace with multiple crates:
//!
//! 1. **relaykit-core** - Error types and configuration (device command table)
//! 2. **relaykit-communication** - Port discovery and the serial session
//!    (connection state machine, reader thread, incoming line queue)
//! 3. **relaykit-ui** - GTK4/libadwaita user interface
//! 4. **relaykit** - Main binary that integrates all crates

pub use relaykit_communication::{list_ports, SerialPortInfo, SerialSession};
pub use relaykit_core::{
    default_devices, AppConfig, ConnectionError, DeviceCommand, Error, Result,
};
pub use relaykit_ui::ui;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with console output and `RUST_LOG`
/// environment variable support (INFO level by default).
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
