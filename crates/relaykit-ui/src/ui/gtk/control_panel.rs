//! Main control panel
//!
//! Port selection row, relay ON/OFF button grid, custom exact-bytes send,
//! and the device console. Owns the 100 ms timer that drains the incoming
//! line queue onto the console; the timer runs regardless of connection
//! state and is the only reader of the queue.

use gtk4::glib;
use gtk4::prelude::*;
use gtk4::{Align, Box, Button, ComboBoxText, Entry, Grid, Label, Orientation};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use relaykit_communication::{list_ports, SerialPortInfo, SerialSession};
use relaykit_core::AppConfig;

use crate::ui::console_panel::{ConsolePanel, LogDirection};
use crate::ui::gtk::device_console::DeviceConsoleView;
use crate::ui::gtk::dialogs;
use crate::ui::gtk::status_bar::StatusBar;

/// Cadence of the queue-drain timer
const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

pub struct ControlPanel {
    pub widget: Box,
    pub port_combo: ComboBoxText,
    pub baud_entry: Entry,
    pub refresh_btn: Button,
    pub connect_btn: Button,
    pub custom_entry: Entry,
    pub custom_send_btn: Button,
    console: DeviceConsoleView,
    device_buttons: Vec<(Button, String)>,
    log_model: Rc<RefCell<ConsolePanel>>,
    session: Rc<RefCell<SerialSession>>,
    config: AppConfig,
    status_bar: StatusBar,
}

impl ControlPanel {
    pub fn new(
        session: Rc<RefCell<SerialSession>>,
        config: AppConfig,
        status_bar: StatusBar,
    ) -> Rc<Self> {
        let widget = Box::new(Orientation::Vertical, 10);
        widget.set_margin_top(10);
        widget.set_margin_bottom(10);
        widget.set_margin_start(10);
        widget.set_margin_end(10);

        // Connection row
        let conn_row = Box::new(Orientation::Horizontal, 6);

        conn_row.append(&Label::new(Some("Port:")));

        let port_combo = ComboBoxText::with_entry();
        port_combo.set_hexpand(true);
        conn_row.append(&port_combo);

        conn_row.append(&Label::new(Some("Baud:")));

        let baud_entry = Entry::new();
        baud_entry.set_text(&config.baud_rate.to_string());
        baud_entry.set_width_chars(8);
        conn_row.append(&baud_entry);

        let refresh_btn = Button::from_icon_name("view-refresh-symbolic");
        refresh_btn.set_tooltip_text(Some("Refresh ports"));
        conn_row.append(&refresh_btn);

        let connect_btn = Button::with_label("Connect");
        connect_btn.add_css_class("suggested-action");
        conn_row.append(&connect_btn);

        widget.append(&conn_row);

        // Relay button grid: ON column on the left, OFF on the right, to
        // avoid confusion.
        let grid = Grid::new();
        grid.set_row_spacing(4);
        grid.set_column_spacing(4);
        grid.set_halign(Align::Start);

        let mut device_buttons = Vec::new();
        for (row, device) in config.devices.iter().enumerate() {
            let on_btn = Button::with_label(&format!("{} ON", device.label));
            let off_btn = Button::with_label(&format!("{} OFF", device.label));
            on_btn.set_size_request(160, -1);
            off_btn.set_size_request(160, -1);
            grid.attach(&on_btn, 0, row as i32, 1, 1);
            grid.attach(&off_btn, 1, row as i32, 1, 1);
            device_buttons.push((on_btn, device.on_command.clone()));
            device_buttons.push((off_btn, device.off_command.clone()));
        }
        widget.append(&grid);

        // Custom send row
        let custom_row = Box::new(Orientation::Horizontal, 6);
        custom_row.append(&Label::new(Some("Custom (send exact bytes):")));

        let custom_entry = Entry::new();
        custom_entry.set_hexpand(true);
        custom_row.append(&custom_entry);

        let custom_send_btn = Button::with_label("Send");
        custom_row.append(&custom_send_btn);

        widget.append(&custom_row);

        // Console
        let incoming_label = Label::new(Some("Incoming:"));
        incoming_label.set_halign(Align::Start);
        widget.append(&incoming_label);

        let console = DeviceConsoleView::new();
        widget.append(&console.widget);

        let view = Rc::new(Self {
            widget,
            port_combo,
            baud_entry,
            refresh_btn,
            connect_btn,
            custom_entry,
            custom_send_btn,
            console,
            device_buttons,
            log_model: Rc::new(RefCell::new(ConsolePanel::new())),
            session,
            config,
            status_bar,
        });

        view.refresh_ports();
        Self::wire_handlers(&view);
        Self::start_drain_timer(&view);

        view
    }

    /// Repopulate the port selector; never leaves it empty
    ///
    /// A port the operator already picked or typed survives the refresh: it
    /// is re-selected if still enumerated, or kept as entry text if not.
    pub fn refresh_ports(&self) {
        let current = self
            .port_combo
            .active_text()
            .map(|t| t.to_string())
            .unwrap_or_default();

        self.port_combo.remove_all();
        let ports = list_ports(&self.config.default_port);
        for port in &ports {
            self.port_combo
                .append(Some(&port.port_name), &port.port_name);
        }

        match selection_after_refresh(&ports, &current) {
            Some(idx) => {
                self.port_combo.set_active(Some(idx as u32));
            }
            None => {
                if let Some(entry) = self.port_combo.child().and_downcast::<Entry>() {
                    entry.set_text(&current);
                }
            }
        }
    }

    fn wire_handlers(view: &Rc<Self>) {
        let view_clone = view.clone();
        view.refresh_btn.connect_clicked(move |_| {
            view_clone.refresh_ports();
        });

        // Single toggle control: inspects state, then connects or
        // disconnects.
        let view_clone = view.clone();
        view.connect_btn.connect_clicked(move |_| {
            let connected = view_clone.session.borrow().is_connected();
            if connected {
                view_clone.disconnect();
            } else {
                view_clone.connect();
            }
        });

        for (btn, command) in &view.device_buttons {
            let view_clone = view.clone();
            let bytes = command.clone().into_bytes();
            btn.connect_clicked(move |_| {
                view_clone.send_command(&bytes);
            });
        }

        let view_clone = view.clone();
        view.custom_send_btn.connect_clicked(move |_| {
            view_clone.send_custom();
        });

        let view_clone = view.clone();
        view.custom_entry.connect_activate(move |_| {
            view_clone.send_custom();
        });
    }

    /// Drain the incoming line queue onto the console every tick
    fn start_drain_timer(view: &Rc<Self>) {
        let view = view.clone();
        glib::timeout_add_local(DRAIN_INTERVAL, move || {
            loop {
                let line = view.session.borrow().try_recv();
                match line {
                    Some(line) => view.log(LogDirection::Inbound, &line),
                    None => break,
                }
            }
            glib::ControlFlow::Continue
        });
    }

    fn connect(&self) {
        let Some(port) = self.port_combo.active_text() else {
            return;
        };
        let port = port.to_string();
        if port.is_empty() {
            return;
        }

        let baud_text = self.baud_entry.text();
        let baud = match baud_text.trim().parse::<u32>() {
            Ok(baud) => baud,
            Err(_) => {
                dialogs::show_error_dialog(
                    "Invalid baud rate",
                    &format!("'{}' is not a valid baud rate", baud_text),
                    None,
                );
                return;
            }
        };

        let result = self.session.borrow_mut().connect(&port, baud);
        match result {
            Ok(()) => {
                self.connect_btn.set_label("Disconnect");
                self.connect_btn.remove_css_class("suggested-action");
                self.connect_btn.add_css_class("destructive-action");
                self.port_combo.set_sensitive(false);
                self.refresh_btn.set_sensitive(false);
                self.baud_entry.set_sensitive(false);

                let summary = self.session.borrow().summary();
                self.status_bar.set_connected(true, &summary);
                self.log(LogDirection::Info, &summary);
            }
            Err(e) => {
                tracing::warn!("connection to {} failed: {}", port, e);
                self.status_bar.set_connected(false, "");
                dialogs::show_error_dialog(
                    "Connection failed",
                    &format!("Could not open {}: {}", port, e),
                    None,
                );
            }
        }
    }

    pub fn disconnect(&self) {
        self.session.borrow_mut().disconnect();

        self.connect_btn.set_label("Connect");
        self.connect_btn.remove_css_class("destructive-action");
        self.connect_btn.add_css_class("suggested-action");
        self.port_combo.set_sensitive(true);
        self.refresh_btn.set_sensitive(true);
        self.baud_entry.set_sensitive(true);

        self.status_bar.set_connected(false, "");
        self.log(LogDirection::Info, "Disconnected");
    }

    /// Write exact bytes to the board and echo them to the console
    fn send_command(&self, bytes: &[u8]) {
        if !self.session.borrow().is_connected() {
            dialogs::show_warning_dialog("Not connected", "Open a serial connection first", None);
            return;
        }

        let result = self.session.borrow_mut().send(bytes);
        match result {
            Ok(()) => {
                let echo = String::from_utf8_lossy(bytes).to_string();
                self.log(LogDirection::Outbound, &echo);
            }
            Err(e) => {
                // Known gap: a failed write does not auto-disconnect.
                tracing::warn!("serial write failed: {}", e);
                dialogs::show_error_dialog("Send failed", &e.to_string(), None);
            }
        }
    }

    fn send_custom(&self) {
        let text = self.custom_entry.text();
        if text.is_empty() {
            return;
        }
        self.send_command(text.as_bytes());
    }

    fn log(&self, direction: LogDirection, text: &str) {
        let formatted = match direction {
            LogDirection::Outbound => self.log_model.borrow_mut().add_outbound(text),
            LogDirection::Inbound => self.log_model.borrow_mut().add_inbound(text),
            LogDirection::Info => self.log_model.borrow_mut().add_info(text),
        };
        self.console.append_line(&formatted);
    }
}

/// Index to re-select after repopulating the port list, or `None` to keep
/// the operator's typed text in the entry
fn selection_after_refresh(ports: &[SerialPortInfo], current: &str) -> Option<usize> {
    if current.is_empty() {
        return Some(0);
    }
    ports.iter().position(|p| p.port_name == current)
}
