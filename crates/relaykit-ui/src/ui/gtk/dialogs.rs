//! Blocking user-facing dialogs

use gtk4::prelude::*;
use gtk4::{ButtonsType, MessageDialog, MessageType};

pub fn show_error_dialog(title: &str, message: &str, parent: Option<&gtk4::Window>) {
    show_dialog(MessageType::Error, title, message, parent);
}

pub fn show_warning_dialog(title: &str, message: &str, parent: Option<&gtk4::Window>) {
    show_dialog(MessageType::Warning, title, message, parent);
}

fn show_dialog(kind: MessageType, title: &str, message: &str, parent: Option<&gtk4::Window>) {
    let mut builder = MessageDialog::builder()
        .message_type(kind)
        .buttons(ButtonsType::Ok)
        .text(title)
        .secondary_text(message);

    if let Some(win) = parent {
        builder = builder.transient_for(win).modal(true);
    }

    let dialog = builder.build();
    dialog.connect_response(|d, _| d.destroy());
    dialog.show();
}
