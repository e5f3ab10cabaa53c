use std::fmt;

use crate::Modifiers;

#[derive(Debug, Clone)]
pub enum AppEvent {
    ShutdownRequested,
    Key(KeyRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Down,
    Up,
}

/// Keys the viewers react to beyond recording them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Escape,
    Help,
}

/// A key event translated out of a toolkit's own event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: u32,
    pub name: String,
    pub modifiers: Modifiers,
    pub direction: KeyDirection,
    pub is_modifier_key: bool,
    pub role: Option<KeyRole>,
}

impl KeyEvent {
    pub fn down(code: u32, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            modifiers: Modifiers::empty(),
            direction: KeyDirection::Down,
            is_modifier_key: false,
            role: None,
        }
    }

    pub fn up(code: u32, name: impl Into<String>) -> Self {
        Self {
            direction: KeyDirection::Up,
            ..Self::down(code, name)
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_role(mut self, role: KeyRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn modifier_key(mut self) -> Self {
        self.is_modifier_key = true;
        self
    }

    pub fn is_down(&self) -> bool {
        self.direction == KeyDirection::Down
    }
}

/// One displayed line: the formatted label and the code it was reported with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub direction: KeyDirection,
    pub label: String,
    pub code: u32,
}

impl fmt::Display for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            KeyDirection::Down => "Key Down",
            KeyDirection::Up => "Key Up",
        };
        write!(f, "{direction}: {} (Code: {})", self.label, self.code)
    }
}

/// A key a toolkit defines, independent of any press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDefinition {
    pub name: &'static str,
    pub code: u32,
}

impl fmt::Display for KeyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.code)
    }
}
