use gtk4::prelude::*;
use gtk4::{ScrolledWindow, TextView, WrapMode};
use std::borrow::Cow;

/// Scrolling read-only console showing the serial traffic
pub struct DeviceConsoleView {
    pub widget: ScrolledWindow,
    console_text: TextView,
}

impl DeviceConsoleView {
    pub fn new() -> Self {
        let widget = ScrolledWindow::new();
        widget.set_hexpand(true);
        widget.set_vexpand(true);
        widget.add_css_class("view");
        widget.add_css_class("console-view");

        let console_text = TextView::new();
        console_text.set_editable(false);
        console_text.set_monospace(true);
        console_text.set_wrap_mode(WrapMode::WordChar);
        console_text.set_cursor_visible(false);

        widget.set_child(Some(&console_text));

        Self {
            widget,
            console_text,
        }
    }

    /// Append one line and keep the view scrolled to the bottom
    pub fn append_line(&self, line: &str) {
        let buffer = self.console_text.buffer();
        // GTK/glib strings must not contain NUL bytes.
        let line: Cow<'_, str> = if line.contains('\0') {
            Cow::Owned(line.replace('\0', ""))
        } else {
            Cow::Borrowed(line)
        };

        let mut iter = buffer.end_iter();
        buffer.insert(&mut iter, line.as_ref());
        buffer.insert(&mut buffer.end_iter(), "\n");

        let mark = buffer.create_mark(None, &buffer.end_iter(), false);
        self.console_text.scroll_to_mark(&mark, 0.0, true, 0.0, 1.0);
        buffer.delete_mark(&mark);
    }
}

impl Default for DeviceConsoleView {
    fn default() -> Self {
        Self::new()
    }
}
