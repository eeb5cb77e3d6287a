// Inputbind Modifier System
// Modifier bitsets and the two modifier comparison predicates

use std::fmt;

use bitflags::bitflags;

use crate::Key;

bitflags! {
    /// Set of keyboard modifiers held alongside a key or mouse button.
    ///
    /// Bit order is the canonical encoding order used when a set is
    /// written back to bind documents.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyMod: u16 {
        const LSHIFT = 1 << 0;
        const RSHIFT = 1 << 1;
        const LCTRL = 1 << 2;
        const RCTRL = 1 << 3;
        const LALT = 1 << 4;
        const RALT = 1 << 5;
        const LGUI = 1 << 6;
        const RGUI = 1 << 7;
        const NUM = 1 << 8;
        const CAPS = 1 << 9;
        const ALTGR = 1 << 10;
        const SCROLL = 1 << 11;
    }
}

/// Lock modifiers. They never take part in a comparison.
pub const OPTIONAL_MODS: KeyMod = KeyMod::NUM.union(KeyMod::CAPS).union(KeyMod::SCROLL);

/// Modifier names in canonical order
const MODIFIER_NAMES: [(KeyMod, &str); 12] = [
    (KeyMod::LSHIFT, "LShift"),
    (KeyMod::RSHIFT, "RShift"),
    (KeyMod::LCTRL, "LCtrl"),
    (KeyMod::RCTRL, "RCtrl"),
    (KeyMod::LALT, "LAlt"),
    (KeyMod::RALT, "RAlt"),
    (KeyMod::LGUI, "LGui"),
    (KeyMod::RGUI, "RGui"),
    (KeyMod::NUM, "Num"),
    (KeyMod::CAPS, "Caps"),
    (KeyMod::ALTGR, "AltGr"),
    (KeyMod::SCROLL, "Scroll"),
];

impl KeyMod {
    /// Look up a single modifier by name ("LShift", "Caps", ...)
    pub fn from_mod_name(name: &str) -> Option<KeyMod> {
        MODIFIER_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(m, _)| *m)
    }

    /// Names of every set bit, strict and optional, in canonical order
    pub fn names(self) -> Vec<&'static str> {
        MODIFIER_NAMES
            .iter()
            .filter(|(m, _)| self.contains(*m))
            .map(|(_, n)| *n)
            .collect()
    }

    /// The modifier a physical key toggles when pressed, if any
    pub fn from_key(key: Key) -> Option<KeyMod> {
        match key {
            Key::LShift => Some(KeyMod::LSHIFT),
            Key::RShift => Some(KeyMod::RSHIFT),
            Key::LCtrl => Some(KeyMod::LCTRL),
            Key::RCtrl => Some(KeyMod::RCTRL),
            Key::LAlt => Some(KeyMod::LALT),
            Key::RAlt => Some(KeyMod::RALT),
            Key::LGui => Some(KeyMod::LGUI),
            Key::RGui => Some(KeyMod::RGUI),
            Key::AltGr => Some(KeyMod::ALTGR),
            Key::ScrollLock => Some(KeyMod::SCROLL),
            _ => None,
        }
    }

    /// The strict part of this set (lock modifiers removed)
    pub fn strict(self) -> KeyMod {
        self.difference(OPTIONAL_MODS)
    }
}

impl fmt::Display for KeyMod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join("+"))
    }
}

/// Lenient comparison used when resolving binds.
///
/// `input` matches `test` when every strict modifier required by `test` is
/// held in `input`. Extra modifiers in `input` are allowed; the priority
/// tier walk decides whether a more specific bind wins instead.
#[inline]
pub fn matches_lenient(input: KeyMod, test: KeyMod) -> bool {
    let input = input | OPTIONAL_MODS;
    let test = test | OPTIONAL_MODS;
    (test & input) == test
}

/// Exact comparison used by explicit modifier queries.
///
/// Strict modifiers must be identical on both sides; lock modifiers are
/// ignored entirely.
#[inline]
pub fn matches_strict(input: KeyMod, test: KeyMod) -> bool {
    (input | OPTIONAL_MODS) == (test | OPTIONAL_MODS)
}
