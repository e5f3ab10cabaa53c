//! crossterm key events mapped onto SDL-style key codes and names.
//!
//! Printable keys keep their character value, control keys their ASCII
//! value, and every other key is its USB HID scancode with bit 30 set.

use crossterm::event::{
    KeyCode, KeyEvent as TermKeyEvent, KeyEventKind, KeyEventState, KeyModifiers, MediaKeyCode,
    ModifierKeyCode,
};
use keycodes_shared_types::{KeyDefinition, KeyEvent, KeyRole, Modifiers};

const SCANCODE_MASK: u32 = 1 << 30;

const fn scancode(code: u32) -> u32 {
    code | SCANCODE_MASK
}

const PRINTABLE: &str = "!\"#$%&'()*+,-./0123456789:;<=>?@[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

const FUNCTION_KEY_NAMES: [&str; 24] = [
    "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12", "f13", "f14",
    "f15", "f16", "f17", "f18", "f19", "f20", "f21", "f22", "f23", "f24",
];

const NAMED_KEYS: [KeyCode; 37] = [
    KeyCode::Backspace,
    KeyCode::Tab,
    KeyCode::Enter,
    KeyCode::Esc,
    KeyCode::Char(' '),
    KeyCode::Delete,
    KeyCode::CapsLock,
    KeyCode::PrintScreen,
    KeyCode::ScrollLock,
    KeyCode::Pause,
    KeyCode::Insert,
    KeyCode::Home,
    KeyCode::PageUp,
    KeyCode::End,
    KeyCode::PageDown,
    KeyCode::Right,
    KeyCode::Left,
    KeyCode::Down,
    KeyCode::Up,
    KeyCode::NumLock,
    KeyCode::Menu,
    KeyCode::Media(MediaKeyCode::MuteVolume),
    KeyCode::Media(MediaKeyCode::RaiseVolume),
    KeyCode::Media(MediaKeyCode::LowerVolume),
    KeyCode::Media(MediaKeyCode::TrackNext),
    KeyCode::Media(MediaKeyCode::TrackPrevious),
    KeyCode::Media(MediaKeyCode::Stop),
    KeyCode::Media(MediaKeyCode::PlayPause),
    KeyCode::Modifier(ModifierKeyCode::LeftControl),
    KeyCode::Modifier(ModifierKeyCode::LeftShift),
    KeyCode::Modifier(ModifierKeyCode::LeftAlt),
    KeyCode::Modifier(ModifierKeyCode::LeftSuper),
    KeyCode::Modifier(ModifierKeyCode::RightControl),
    KeyCode::Modifier(ModifierKeyCode::RightShift),
    KeyCode::Modifier(ModifierKeyCode::RightAlt),
    KeyCode::Modifier(ModifierKeyCode::RightSuper),
    KeyCode::F(1),
];

fn named(code: KeyCode) -> Option<(&'static str, u32)> {
    let named = match code {
        KeyCode::Backspace => ("backspace", 8),
        KeyCode::Tab | KeyCode::BackTab => ("tab", 9),
        KeyCode::Enter => ("return", 13),
        KeyCode::Esc => ("escape", 27),
        KeyCode::Char(' ') => ("space", 32),
        KeyCode::Delete => ("delete", 127),
        KeyCode::CapsLock => ("caps lock", scancode(57)),
        KeyCode::F(n @ 1..=12) => (FUNCTION_KEY_NAMES[n as usize - 1], scancode(57 + n as u32)),
        KeyCode::F(n @ 13..=24) => (FUNCTION_KEY_NAMES[n as usize - 1], scancode(91 + n as u32)),
        KeyCode::PrintScreen => ("print screen", scancode(70)),
        KeyCode::ScrollLock => ("scroll lock", scancode(71)),
        KeyCode::Pause => ("pause", scancode(72)),
        KeyCode::Insert => ("insert", scancode(73)),
        KeyCode::Home => ("home", scancode(74)),
        KeyCode::PageUp => ("page up", scancode(75)),
        KeyCode::End => ("end", scancode(77)),
        KeyCode::PageDown => ("page down", scancode(78)),
        KeyCode::Right => ("right", scancode(79)),
        KeyCode::Left => ("left", scancode(80)),
        KeyCode::Down => ("down", scancode(81)),
        KeyCode::Up => ("up", scancode(82)),
        KeyCode::NumLock => ("numlock", scancode(83)),
        KeyCode::Menu => ("menu", scancode(118)),
        KeyCode::Media(media) => match media {
            MediaKeyCode::MuteVolume => ("mute", scancode(127)),
            MediaKeyCode::RaiseVolume => ("volume up", scancode(128)),
            MediaKeyCode::LowerVolume => ("volume down", scancode(129)),
            MediaKeyCode::TrackNext => ("audio next", scancode(258)),
            MediaKeyCode::TrackPrevious => ("audio prev", scancode(259)),
            MediaKeyCode::Stop => ("audio stop", scancode(260)),
            MediaKeyCode::Play | MediaKeyCode::PlayPause => ("audio play", scancode(261)),
            _ => return None,
        },
        KeyCode::Modifier(modifier) => match modifier {
            ModifierKeyCode::LeftControl => ("left ctrl", scancode(224)),
            ModifierKeyCode::LeftShift => ("left shift", scancode(225)),
            ModifierKeyCode::LeftAlt => ("left alt", scancode(226)),
            ModifierKeyCode::LeftSuper => ("left meta", scancode(227)),
            ModifierKeyCode::RightControl => ("right ctrl", scancode(228)),
            ModifierKeyCode::RightShift => ("right shift", scancode(229)),
            ModifierKeyCode::RightAlt => ("right alt", scancode(230)),
            ModifierKeyCode::RightSuper => ("right meta", scancode(231)),
            _ => return None,
        },
        _ => return None,
    };
    Some(named)
}

fn modifiers(key: &TermKeyEvent) -> Modifiers {
    let mut mods = Modifiers::empty();
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        mods |= Modifiers::SHIFT;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        mods |= Modifiers::CTRL;
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        mods |= Modifiers::ALT;
    }
    if key.state.contains(KeyEventState::CAPS_LOCK) {
        mods |= Modifiers::CAPS_LOCK;
    }
    if key.state.contains(KeyEventState::NUM_LOCK) {
        mods |= Modifiers::NUM_LOCK;
    }
    if key
        .modifiers
        .intersects(KeyModifiers::SUPER | KeyModifiers::META | KeyModifiers::HYPER)
    {
        mods |= Modifiers::META;
    }
    mods
}

/// Translates a crossterm key event. Keys without an SDL equivalent yield `None`.
pub fn translate(key: TermKeyEvent) -> Option<KeyEvent> {
    let mut mods = modifiers(&key);

    let (name, code) = match key.code {
        KeyCode::Char(' ') => ("space".to_string(), 32),
        KeyCode::Char(c) if c.is_ascii_uppercase() => {
            mods |= Modifiers::SHIFT;
            let lower = c.to_ascii_lowercase();
            (lower.to_string(), lower as u32)
        }
        KeyCode::Char(c) if !c.is_control() => (c.to_string(), c as u32),
        KeyCode::BackTab => {
            mods |= Modifiers::SHIFT;
            ("tab".to_string(), 9)
        }
        other => {
            let (name, code) = named(other)?;
            (name.to_string(), code)
        }
    };

    let mut event = match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => KeyEvent::down(code, name),
        KeyEventKind::Release => KeyEvent::up(code, name),
    }
    .with_modifiers(mods);

    if matches!(
        key.code,
        KeyCode::Modifier(_) | KeyCode::CapsLock | KeyCode::NumLock
    ) {
        event = event.modifier_key();
    }

    match key.code {
        KeyCode::Esc => Some(event.with_role(KeyRole::Escape)),
        KeyCode::F(1) => Some(event.with_role(KeyRole::Help)),
        _ => Some(event),
    }
}

/// Every named key plus printable ASCII, sorted by code.
pub fn definitions() -> Vec<KeyDefinition> {
    let mut defs: Vec<KeyDefinition> = NAMED_KEYS
        .into_iter()
        .chain((2..=24).map(KeyCode::F))
        .filter_map(named)
        .map(|(name, code)| KeyDefinition { name, code })
        .collect();

    defs.extend(PRINTABLE.char_indices().map(|(idx, c)| KeyDefinition {
        name: &PRINTABLE[idx..idx + c.len_utf8()],
        code: c as u32,
    }));

    defs.sort_by_key(|def| def.code);
    defs
}
