//! GTK widget implementations

pub mod control_panel;
pub mod device_console;
pub mod dialogs;
pub mod status_bar;
