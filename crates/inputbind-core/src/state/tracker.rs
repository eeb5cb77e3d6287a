// Inputbind State Tracker
// Owns every tracked input state plus the per-frame event log

use std::collections::HashMap;
use std::hash::Hash;

use super::InputState;
use crate::input::InputEvent;
use crate::key::{ControllerButton, Key, MouseButton, Vec2I};
use crate::modifier::KeyMod;
use crate::registry::EntryId;

/// Tracked states for keys, mouse buttons, controller buttons and binds.
///
/// Also holds the accumulator of currently pressed modifier keys, which is
/// updated for every key event regardless of consumption.
#[derive(Debug, Default)]
pub struct StateTracker {
    events: Vec<(InputEvent, bool)>,
    keys: HashMap<Key, InputState>,
    mouse: HashMap<MouseButton, InputState>,
    controller: HashMap<ControllerButton, InputState>,
    binds: HashMap<EntryId, InputState>,
    pressed_mods: KeyMod,
}

/// Drop released states and clear edges of held ones
fn reclaim<K: Eq + Hash>(states: &mut HashMap<K, InputState>) {
    states.retain(|_, state| {
        if state.held() {
            state.reset();
        }
        state.held()
    });
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self, event: InputEvent, consumed: bool) {
        self.events.push((event, consumed));
    }

    /// Events routed since the last frame reset, with their consumed flag
    pub fn events(&self) -> &[(InputEvent, bool)] {
        &self.events
    }

    /// Frame boundary: clear the event log and reclaim released states
    pub fn reset(&mut self) {
        self.events.clear();
        reclaim(&mut self.keys);
        reclaim(&mut self.mouse);
        reclaim(&mut self.controller);
        reclaim(&mut self.binds);
    }

    /// Forget every bind state; entry ids from an old registry are meaningless
    pub fn clear_binds(&mut self) {
        self.binds.clear();
    }

    pub fn pressed_mods(&self) -> KeyMod {
        self.pressed_mods
    }

    pub fn add_pressed_mods(&mut self, mods: KeyMod) {
        self.pressed_mods |= mods;
    }

    pub fn remove_pressed_mods(&mut self, mods: KeyMod) {
        self.pressed_mods &= !mods;
    }

    pub fn key(&self, key: Key) -> Option<&InputState> {
        self.keys.get(&key)
    }

    pub fn mouse(&self, button: MouseButton) -> Option<&InputState> {
        self.mouse.get(&button)
    }

    pub fn controller(&self, button: ControllerButton) -> Option<&InputState> {
        self.controller.get(&button)
    }

    pub fn bind(&self, entry: EntryId) -> Option<&InputState> {
        self.binds.get(&entry)
    }

    /// Number of tracked states across all kinds
    pub fn tracked(&self) -> usize {
        self.keys.len() + self.mouse.len() + self.controller.len() + self.binds.len()
    }

    /// Press a key, creating its state; `mods` is the key's own modifier bit
    pub fn press_key(&mut self, key: Key, mods: KeyMod) {
        let state = self.keys.entry(key).or_default();
        state.add_mods(mods);
        state.press();
    }

    /// Release a key if it is tracked. Returns false for untracked keys.
    pub fn release_key(&mut self, key: Key, mods: KeyMod) -> bool {
        match self.keys.get_mut(&key) {
            Some(state) => {
                state.remove_mods(mods);
                state.release();
                true
            }
            None => false,
        }
    }

    pub fn press_mouse(&mut self, button: MouseButton, position: Vec2I) {
        let state = self.mouse.entry(button).or_default();
        state.push_press_position(position);
        state.press();
    }

    pub fn release_mouse(&mut self, button: MouseButton, position: Vec2I) -> bool {
        match self.mouse.get_mut(&button) {
            Some(state) => {
                state.push_release_position(position);
                state.release();
                true
            }
            None => false,
        }
    }

    pub fn press_controller(&mut self, button: ControllerButton) {
        self.controller.entry(button).or_default().press();
    }

    pub fn release_controller(&mut self, button: ControllerButton) -> bool {
        match self.controller.get_mut(&button) {
            Some(state) => {
                state.release();
                true
            }
            None => false,
        }
    }

    pub fn press_bind(&mut self, entry: EntryId) {
        self.binds.entry(entry).or_default().press();
    }

    /// Release a bind if it is tracked; binds never pressed stay untracked
    pub fn release_bind(&mut self, entry: EntryId) -> bool {
        match self.binds.get_mut(&entry) {
            Some(state) => {
                state.release();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_lifecycle() {
        let mut tracker = StateTracker::new();
        tracker.press_key(Key::K, KeyMod::empty());
        assert_eq!(tracker.key(Key::K).unwrap().presses(), 1);

        tracker.reset();
        let state = tracker.key(Key::K).unwrap();
        assert_eq!(state.presses(), 0);
        assert!(state.held());

        assert!(tracker.release_key(Key::K, KeyMod::empty()));
        assert_eq!(tracker.key(Key::K).unwrap().releases(), 1);
        tracker.reset();
        assert!(tracker.key(Key::K).is_none());
        assert_eq!(tracker.tracked(), 0);
    }

    #[test]
    fn test_release_of_untracked_is_ignored() {
        let mut tracker = StateTracker::new();
        assert!(!tracker.release_key(Key::A, KeyMod::empty()));
        assert!(!tracker.release_mouse(MouseButton::Left, Vec2I::default()));
        assert!(!tracker.release_controller(ControllerButton::A));
        assert!(!tracker.release_bind(EntryId::new(0, 0)));
        assert_eq!(tracker.tracked(), 0);
    }

    #[test]
    fn test_modifier_key_bits() {
        let mut tracker = StateTracker::new();
        tracker.press_key(Key::LShift, KeyMod::LSHIFT);
        assert_eq!(tracker.key(Key::LShift).unwrap().mods(), KeyMod::LSHIFT);
        tracker.release_key(Key::LShift, KeyMod::LSHIFT);
        assert!(tracker.key(Key::LShift).unwrap().mods().is_empty());
    }

    #[test]
    fn test_mouse_positions_per_frame() {
        let mut tracker = StateTracker::new();
        tracker.press_mouse(MouseButton::Left, Vec2I::new(1, 2));
        tracker.release_mouse(MouseButton::Left, Vec2I::new(3, 4));
        tracker.press_mouse(MouseButton::Left, Vec2I::new(5, 6));
        let state = tracker.mouse(MouseButton::Left).unwrap();
        assert_eq!(state.press_positions(), &[Vec2I::new(1, 2), Vec2I::new(5, 6)]);
        assert_eq!(state.release_positions(), &[Vec2I::new(3, 4)]);

        tracker.reset();
        let state = tracker.mouse(MouseButton::Left).unwrap();
        assert!(state.press_positions().is_empty());
        assert!(state.held());
    }

    #[test]
    fn test_reset_clears_event_log_only_for_events() {
        let mut tracker = StateTracker::new();
        tracker.add_pressed_mods(KeyMod::LCTRL);
        tracker.record_event(InputEvent::key_down(Key::LCtrl, KeyMod::LCTRL), false);
        assert_eq!(tracker.events().len(), 1);
        tracker.reset();
        assert!(tracker.events().is_empty());
        assert_eq!(tracker.pressed_mods(), KeyMod::LCTRL);
    }

    #[test]
    fn test_clear_binds() {
        let mut tracker = StateTracker::new();
        tracker.press_bind(EntryId::new(0, 1));
        tracker.press_controller(ControllerButton::Start);
        tracker.clear_binds();
        assert!(tracker.bind(EntryId::new(0, 1)).is_none());
        assert!(tracker.controller(ControllerButton::Start).is_some());
    }
}
