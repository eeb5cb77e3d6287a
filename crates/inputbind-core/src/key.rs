// Inputbind Physical Inputs
// Keyboard keys, mouse buttons and controller buttons, addressed by name

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// A keyboard key.
///
/// Names match the spelling used in bind documents and in the user
/// override store (`"A"`, `"Return"`, `"LShift"`, `"/"`, ...). Parsing is
/// case sensitive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Key {
    Backspace,
    Tab,
    Clear,
    Return,
    Escape,
    Space,
    #[strum(serialize = "'")]
    Apostrophe,
    #[strum(serialize = ",")]
    Comma,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = ".")]
    Period,
    #[strum(serialize = "/")]
    Slash,
    #[strum(serialize = "0")]
    Zero,
    #[strum(serialize = "1")]
    One,
    #[strum(serialize = "2")]
    Two,
    #[strum(serialize = "3")]
    Three,
    #[strum(serialize = "4")]
    Four,
    #[strum(serialize = "5")]
    Five,
    #[strum(serialize = "6")]
    Six,
    #[strum(serialize = "7")]
    Seven,
    #[strum(serialize = "8")]
    Eight,
    #[strum(serialize = "9")]
    Nine,
    #[strum(serialize = ";")]
    Semicolon,
    #[strum(serialize = "=")]
    Equals,
    #[strum(serialize = "[")]
    LeftBracket,
    #[strum(serialize = "\\")]
    Backslash,
    #[strum(serialize = "]")]
    RightBracket,
    #[strum(serialize = "`")]
    Backquote,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Delete,
    Kp0,
    Kp1,
    Kp2,
    Kp3,
    Kp4,
    Kp5,
    Kp6,
    Kp7,
    Kp8,
    Kp9,
    #[strum(serialize = "Kp_period")]
    KpPeriod,
    #[strum(serialize = "Kp_divide")]
    KpDivide,
    #[strum(serialize = "Kp_multiply")]
    KpMultiply,
    #[strum(serialize = "Kp_minus")]
    KpMinus,
    #[strum(serialize = "Kp_plus")]
    KpPlus,
    #[strum(serialize = "Kp_enter")]
    KpEnter,
    #[strum(serialize = "Kp_equals")]
    KpEquals,
    Up,
    Down,
    Right,
    Left,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    NumLock,
    CapsLock,
    ScrollLock,
    RShift,
    LShift,
    RCtrl,
    LCtrl,
    RAlt,
    LAlt,
    RGui,
    LGui,
    AltGr,
    Compose,
    Help,
    PrintScreen,
    SysReq,
    Pause,
    Menu,
    Power,
}

impl Key {
    /// Name of this key as written in bind documents
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Parse a key name
    pub fn from_name(name: &str) -> Option<Key> {
        Key::from_str(name).ok()
    }
}

/// A mouse button.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    FourthButton,
    FifthButton,
}

impl MouseButton {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn from_name(name: &str) -> Option<MouseButton> {
        MouseButton::from_str(name).ok()
    }
}

/// Direction of a mouse wheel tick.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum MouseWheel {
    Up,
    Down,
}

impl MouseWheel {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn from_name(name: &str) -> Option<MouseWheel> {
        MouseWheel::from_str(name).ok()
    }
}

/// A game controller button.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum ControllerButton {
    A,
    B,
    X,
    Y,
    Back,
    Guide,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Misc1,
    Paddle1,
    Paddle2,
    Paddle3,
    Paddle4,
    Touchpad,
}

impl ControllerButton {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn from_name(name: &str) -> Option<ControllerButton> {
        ControllerButton::from_str(name).ok()
    }
}

/// Integer screen position or movement delta.
///
/// Serializes as a two element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2I(pub i32, pub i32);

impl Vec2I {
    pub fn new(x: i32, y: i32) -> Self {
        Self(x, y)
    }

    pub fn x(self) -> i32 {
        self.0
    }

    pub fn y(self) -> i32 {
        self.1
    }
}

impl fmt::Display for Vec2I {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}
