//! Toolkit-neutral viewer state: label formatting, the rolling display
//! buffer and the double-Escape quit rule.

use std::collections::VecDeque;

use keycodes_shared_types::{KeyDirection, KeyEvent, KeyRecord, KeyRole};
use tracing::{debug, info};

pub const HELP_TEXT: [&str; 3] = [
    "Press a key and note the returned value.",
    "Press F1 for help. (This screen.)",
    "Press Esc twice to quit. (Or three times from this dialog.)",
];

/// Joins the active modifier names with the key name.
///
/// Modifier keys contribute only through their modifier bit; when a toolkit
/// reports a modifier key without its bit set, the key's own name is used.
pub fn key_label(event: &KeyEvent) -> String {
    if event.direction == KeyDirection::Up {
        return event.name.clone();
    }

    let mut parts: Vec<&str> = event.modifiers.names().collect();
    if !event.is_modifier_key && !event.name.is_empty() {
        parts.push(&event.name);
    }

    if parts.is_empty() {
        event.name.clone()
    } else {
        parts.join("+")
    }
}

pub fn record_for(event: &KeyEvent) -> KeyRecord {
    KeyRecord {
        direction: event.direction,
        label: key_label(event),
        code: event.code,
    }
}

/// Fixed-capacity list of records, oldest first.
#[derive(Debug, Clone)]
pub struct KeyLog {
    entries: VecDeque<KeyRecord>,
    capacity: usize,
}

impl KeyLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: KeyRecord) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(record);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &KeyRecord> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&KeyRecord> {
        self.entries.back()
    }
}

/// Counts consecutive Escape presses.
#[derive(Debug, Clone)]
pub struct EscapeCounter {
    count: u8,
    threshold: u8,
}

impl EscapeCounter {
    pub fn new(threshold: u8) -> Self {
        Self {
            count: 0,
            threshold: threshold.max(1),
        }
    }

    /// Feeds one key-down. Returns true once the threshold is reached.
    pub fn observe(&mut self, is_escape: bool) -> bool {
        if is_escape {
            self.count = self.count.saturating_add(1);
        } else {
            self.reset();
        }
        self.count >= self.threshold
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u8 {
        self.count
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub record: Option<KeyRecord>,
    pub quit: bool,
}

#[derive(Debug, Clone)]
pub struct KeyViewer {
    log: KeyLog,
    escape: EscapeCounter,
    show_key_up: bool,
    help_visible: bool,
}

impl KeyViewer {
    pub fn new(capacity: usize, escape_presses_to_quit: u8, show_key_up: bool) -> Self {
        Self {
            log: KeyLog::new(capacity),
            escape: EscapeCounter::new(escape_presses_to_quit),
            show_key_up,
            help_visible: false,
        }
    }

    pub fn handle(&mut self, event: KeyEvent) -> Outcome {
        if event.direction == KeyDirection::Up {
            if !self.show_key_up {
                return Outcome::default();
            }
            return Outcome {
                record: Some(self.record(&event)),
                quit: false,
            };
        }

        let is_escape = event.role == Some(KeyRole::Escape);

        if is_escape && self.help_visible {
            debug!("escape closed help");
            self.help_visible = false;
            self.escape.reset();
            return Outcome::default();
        }

        if event.role == Some(KeyRole::Help) {
            self.help_visible = !self.help_visible;
        }

        let record = self.record(&event);
        let quit = self.escape.observe(is_escape);
        if is_escape && !quit {
            info!(count = self.escape.count(), "escape pressed, press again to quit");
        }

        Outcome {
            record: Some(record),
            quit,
        }
    }

    fn record(&mut self, event: &KeyEvent) -> KeyRecord {
        let record = record_for(event);
        self.log.push(record.clone());
        record
    }

    pub fn log(&self) -> &KeyLog {
        &self.log
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn hide_help(&mut self) {
        self.help_visible = false;
    }
}
