use gtk4::prelude::*;
use gtk4::{Align, Box, Label, Orientation};

/// Bottom status strip: connection indicator, summary, and app version
#[derive(Clone)]
pub struct StatusBar {
    pub widget: Box,
    status_indicator: Label,
    summary_label: Label,
}

impl StatusBar {
    pub fn new(version: &str) -> Self {
        let widget = Box::new(Orientation::Horizontal, 10);
        widget.set_height_request(30);
        widget.add_css_class("status-bar");
        widget.set_margin_start(5);
        widget.set_margin_end(5);
        widget.set_margin_top(2);
        widget.set_margin_bottom(2);

        let status_indicator = Label::new(Some("■"));
        status_indicator.add_css_class("status-indicator");
        widget.append(&status_indicator);

        let summary_label = Label::new(Some("Disconnected"));
        summary_label.add_css_class("status-text");
        summary_label.set_hexpand(true);
        summary_label.set_halign(Align::Start);
        widget.append(&summary_label);

        let version_label = Label::new(Some(&format!("v{}", version)));
        version_label.add_css_class("status-text");
        version_label.add_css_class("dim-label");
        version_label.set_halign(Align::End);
        widget.append(&version_label);

        Self {
            widget,
            status_indicator,
            summary_label,
        }
    }

    /// Update the indicator and summary text
    pub fn set_connected(&self, connected: bool, summary: &str) {
        if connected {
            self.status_indicator.add_css_class("connected");
            self.summary_label.set_text(summary);
        } else {
            self.status_indicator.remove_css_class("connected");
            self.summary_label.set_text("Disconnected");
        }
    }
}
