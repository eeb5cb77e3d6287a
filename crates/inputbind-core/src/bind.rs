// Inputbind Bind Types
// A bind ties one physical input (plus required modifiers) to a logical action

use std::fmt;

use crate::key::{ControllerButton, Key, MouseButton};
use crate::modifier::KeyMod;

/// Keyboard key bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub key: Key,
    pub mods: KeyMod,
    /// Number of distinct modifiers named by the bind
    pub priority: u8,
}

impl KeyBind {
    /// Create a key bind; priority is the number of modifiers in `mods`
    pub fn new(key: Key, mods: KeyMod) -> Self {
        Self {
            key,
            mods,
            priority: mods.bits().count_ones() as u8,
        }
    }
}

/// Mouse button bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseBind {
    pub button: MouseButton,
    pub mods: KeyMod,
    pub priority: u8,
}

impl MouseBind {
    pub fn new(button: MouseButton, mods: KeyMod) -> Self {
        Self {
            button,
            mods,
            priority: mods.bits().count_ones() as u8,
        }
    }
}

/// Controller button bind. Has no modifiers and always ranks at priority 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerBind {
    pub button: ControllerButton,
    pub controller: u32,
}

impl ControllerBind {
    pub fn new(button: ControllerButton) -> Self {
        Self {
            button,
            controller: 0,
        }
    }
}

/// A configured physical input for a bind entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bind {
    Key(KeyBind),
    Mouse(MouseBind),
    Controller(ControllerBind),
}

impl Bind {
    /// The physical input this bind listens to
    pub fn input(&self) -> InputVariant {
        match self {
            Bind::Key(bind) => InputVariant::Key(bind.key),
            Bind::Mouse(bind) => InputVariant::Mouse(bind.button),
            Bind::Controller(bind) => InputVariant::Controller(bind.button),
        }
    }

    /// Modifiers required by the bind (empty for controller binds)
    pub fn mods(&self) -> KeyMod {
        match self {
            Bind::Key(bind) => bind.mods,
            Bind::Mouse(bind) => bind.mods,
            Bind::Controller(_) => KeyMod::empty(),
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            Bind::Key(bind) => bind.priority,
            Bind::Mouse(bind) => bind.priority,
            Bind::Controller(_) => 0,
        }
    }
}

impl From<KeyBind> for Bind {
    fn from(bind: KeyBind) -> Self {
        Bind::Key(bind)
    }
}

impl From<MouseBind> for Bind {
    fn from(bind: MouseBind) -> Self {
        Bind::Mouse(bind)
    }
}

impl From<ControllerBind> for Bind {
    fn from(bind: ControllerBind) -> Self {
        Bind::Controller(bind)
    }
}

impl fmt::Display for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mods = self.mods();
        if !mods.is_empty() {
            write!(f, "{}+", mods)?;
        }
        match self {
            Bind::Key(bind) => write!(f, "{}", bind.key),
            Bind::Mouse(bind) => write!(f, "Mouse{}", bind.button),
            Bind::Controller(bind) if bind.controller != 0 => {
                write!(f, "Controller{}:{}", bind.controller, bind.button)
            }
            Bind::Controller(bind) => write!(f, "Controller:{}", bind.button),
        }
    }
}

/// Physical input identifier used to key the mapping index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputVariant {
    Key(Key),
    Mouse(MouseButton),
    Controller(ControllerButton),
}

impl From<Key> for InputVariant {
    fn from(key: Key) -> Self {
        InputVariant::Key(key)
    }
}

impl From<MouseButton> for InputVariant {
    fn from(button: MouseButton) -> Self {
        InputVariant::Mouse(button)
    }
}

impl From<ControllerButton> for InputVariant {
    fn from(button: ControllerButton) -> Self {
        InputVariant::Controller(button)
    }
}

impl fmt::Display for InputVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputVariant::Key(key) => write!(f, "{}", key),
            InputVariant::Mouse(button) => write!(f, "Mouse{}", button),
            InputVariant::Controller(button) => write!(f, "Controller:{}", button),
        }
    }
}
