//! # RelayKit UI
//!
//! GTK4/libadwaita user interface: the application shell, the control
//! panel, and the device console.

pub mod gtk_app;
pub mod ui;

pub use ui::console_panel::{ConsolePanel, LogDirection, LogEntry};
