//! UI modules: headless models plus the GTK views

pub mod console_panel;
pub mod gtk;
