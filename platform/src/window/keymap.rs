//! egui keys, named and numbered the way egui enumerates them.

use eframe::egui;
use keycodes_shared_types::{KeyDefinition, KeyEvent, KeyRole, Modifiers};

pub fn key_name(key: egui::Key) -> &'static str {
    match key {
        egui::Key::Escape => "<Esc>",
        other => other.name(),
    }
}

pub fn key_code(key: egui::Key) -> u32 {
    key as u32
}

pub fn modifiers(mods: egui::Modifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    if mods.shift {
        out |= Modifiers::SHIFT;
    }
    if mods.ctrl {
        out |= Modifiers::CTRL;
    }
    if mods.alt {
        out |= Modifiers::ALT;
    }
    if mods.mac_cmd {
        out |= Modifiers::META;
    }
    out
}

pub fn translate(key: egui::Key, pressed: bool, mods: egui::Modifiers) -> KeyEvent {
    let (code, name) = (key_code(key), key_name(key));
    let event = if pressed {
        KeyEvent::down(code, name)
    } else {
        KeyEvent::up(code, name)
    }
    .with_modifiers(modifiers(mods));

    match key {
        egui::Key::Escape => event.with_role(KeyRole::Escape),
        egui::Key::F1 => event.with_role(KeyRole::Help),
        _ => event,
    }
}

/// The key behind a clipboard event. egui-winit swallows the key press for
/// these shortcuts, so the frame's modifiers decide between the Ctrl and
/// Shift variants. Ctrl+Insert cannot be told apart from Ctrl+C.
pub fn clipboard_key(event: &egui::Event, mods: egui::Modifiers) -> Option<egui::Key> {
    let shift_only = mods.shift && !mods.command && !mods.ctrl;
    match event {
        egui::Event::Copy => Some(egui::Key::C),
        egui::Event::Cut if shift_only => Some(egui::Key::Delete),
        egui::Event::Cut => Some(egui::Key::X),
        egui::Event::Paste(_) if shift_only => Some(egui::Key::Insert),
        egui::Event::Paste(_) => Some(egui::Key::V),
        _ => None,
    }
}

/// Every key egui defines, sorted by code.
pub fn definitions() -> Vec<KeyDefinition> {
    let mut defs: Vec<KeyDefinition> = egui::Key::ALL
        .iter()
        .map(|&key| KeyDefinition {
            name: key_name(key),
            code: key_code(key),
        })
        .collect();
    defs.sort_by_key(|def| def.code);
    defs
}
