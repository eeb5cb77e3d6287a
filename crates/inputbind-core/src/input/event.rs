// Inputbind Input Layer - Raw Events
// Discrete events produced by the platform layer

use crate::key::{ControllerButton, Key, MouseButton, MouseWheel, Vec2I};
use crate::modifier::KeyMod;

/// A raw input event, delivered in platform order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown { key: Key, mods: KeyMod },
    KeyUp { key: Key },
    MouseButtonDown { button: MouseButton, position: Vec2I },
    MouseButtonUp { button: MouseButton, position: Vec2I },
    MouseWheel { wheel: MouseWheel, position: Vec2I },
    MouseMove { delta: Vec2I, position: Vec2I },
    ControllerButtonDown { button: ControllerButton, controller: u32 },
    ControllerButtonUp { button: ControllerButton, controller: u32 },
}

impl InputEvent {
    pub fn key_down(key: Key, mods: KeyMod) -> Self {
        InputEvent::KeyDown { key, mods }
    }

    pub fn key_up(key: Key) -> Self {
        InputEvent::KeyUp { key }
    }

    pub fn mouse_down(button: MouseButton, position: Vec2I) -> Self {
        InputEvent::MouseButtonDown { button, position }
    }

    pub fn mouse_up(button: MouseButton, position: Vec2I) -> Self {
        InputEvent::MouseButtonUp { button, position }
    }

    pub fn controller_down(button: ControllerButton, controller: u32) -> Self {
        InputEvent::ControllerButtonDown { button, controller }
    }

    pub fn controller_up(button: ControllerButton, controller: u32) -> Self {
        InputEvent::ControllerButtonUp { button, controller }
    }

    /// Returns true for the press half of a button-like event
    pub fn is_press(&self) -> bool {
        matches!(
            self,
            InputEvent::KeyDown { .. }
                | InputEvent::MouseButtonDown { .. }
                | InputEvent::ControllerButtonDown { .. }
        )
    }

    /// Returns true for the release half of a button-like event
    pub fn is_release(&self) -> bool {
        matches!(
            self,
            InputEvent::KeyUp { .. }
                | InputEvent::MouseButtonUp { .. }
                | InputEvent::ControllerButtonUp { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_classification() {
        assert!(InputEvent::key_down(Key::A, KeyMod::empty()).is_press());
        assert!(InputEvent::key_up(Key::A).is_release());
        assert!(InputEvent::mouse_down(MouseButton::Left, Vec2I::default()).is_press());
        assert!(InputEvent::controller_up(ControllerButton::A, 0).is_release());
    }

    #[test]
    fn test_motion_events_are_neither() {
        let wheel = InputEvent::MouseWheel {
            wheel: MouseWheel::Up,
            position: Vec2I::new(1, 1),
        };
        let motion = InputEvent::MouseMove {
            delta: Vec2I::new(2, 0),
            position: Vec2I::new(10, 10),
        };
        assert!(!wheel.is_press() && !wheel.is_release());
        assert!(!motion.is_press() && !motion.is_release());
    }
}
