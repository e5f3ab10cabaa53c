use bitflags::bitflags;

bitflags! {
    /// Modifier state reported alongside a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const CAPS_LOCK = 1 << 3;
        const NUM_LOCK = 1 << 4;
        const META = 1 << 5;
    }
}

const DISPLAY_ORDER: [(Modifiers, &str); 6] = [
    (Modifiers::SHIFT, "Shift"),
    (Modifiers::CTRL, "Ctrl"),
    (Modifiers::ALT, "Alt"),
    (Modifiers::CAPS_LOCK, "Caps Lock"),
    (Modifiers::NUM_LOCK, "Num Lock"),
    (Modifiers::META, "Meta (Command/Windows)"),
];

impl Modifiers {
    /// Names of the active modifiers, always in display order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        DISPLAY_ORDER
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}
