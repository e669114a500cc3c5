use gtk4::glib;
use gtk4::prelude::*;
use gtk4::{ApplicationWindow, Box, CssProvider, HeaderBar, Orientation};
use libadwaita::prelude::*;
use libadwaita::Application as AdwApplication;
use std::cell::RefCell;
use std::rc::Rc;

use crate::ui::gtk::control_panel::ControlPanel;
use crate::ui::gtk::status_bar::StatusBar;
use relaykit_communication::SerialSession;
use relaykit_core::AppConfig;

pub fn main() {
    let app = AdwApplication::builder()
        .application_id("com.github.relaykit.RelayKit")
        .build();

    app.connect_startup(|_| {
        load_css();
    });

    app.connect_activate(|app| {
        let config = AppConfig::default();
        let session = Rc::new(RefCell::new(SerialSession::new()));

        let window = ApplicationWindow::builder()
            .application(app)
            .title("RelayKit")
            .default_width(560)
            .default_height(640)
            .build();

        let header = HeaderBar::new();
        window.set_titlebar(Some(&header));

        let main_box = Box::new(Orientation::Vertical, 0);

        let status_bar = StatusBar::new(env!("CARGO_PKG_VERSION"));
        let panel = ControlPanel::new(session.clone(), config, status_bar.clone());
        main_box.append(&panel.widget);
        main_box.append(&status_bar.widget);

        window.set_child(Some(&main_box));

        // Best-effort teardown before the process exits.
        let session_close = session.clone();
        window.connect_close_request(move |_| {
            session_close.borrow_mut().disconnect();
            glib::Propagation::Proceed
        });

        window.present();
    });

    app.run();
}

fn load_css() {
    let provider = CssProvider::new();
    provider.load_from_data(include_str!("ui/gtk/style.css"));

    gtk4::style_context_add_provider_for_display(
        &gtk4::gdk::Display::default().expect("Could not connect to a display."),
        &provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
