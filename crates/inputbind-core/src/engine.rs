// Inputbind Engine
// Routes raw input events into key, button and bind state and answers queries

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::bind::{Bind, InputVariant};
use crate::config::{decode_bind, encode_binds, BindSource, CodecError, ConfigStore};
use crate::error::InputError;
use crate::input::InputEvent;
use crate::key::{ControllerButton, Key, MouseButton, Vec2I};
use crate::mapping::{select_candidates, MappingIndex};
use crate::modifier::{matches_strict, KeyMod};
use crate::registry::{BindEntry, BindRegistry};
use crate::reload::{ReloadHub, ReloadListener};
use crate::state::{InputState, StateTracker};

static ENGINE_ALIVE: AtomicBool = AtomicBool::new(false);

/// Serializes tests that build engines, since only one may exist per process
#[cfg(test)]
pub(crate) static ENGINE_TEST_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());

/// Marks the one live engine of the process
#[derive(Debug)]
struct InstanceGuard(());

impl InstanceGuard {
    fn acquire() -> Result<Self, InputError> {
        ENGINE_ALIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InstanceGuard(()))
            .map_err(|_| InputError::AlreadyInitialized)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        ENGINE_ALIVE.store(false, Ordering::Release);
    }
}

/// The binding engine.
///
/// Owns the bind registry, the mapping index derived from it and all tracked
/// input state. Events are routed with [`BindEngine::handle_input`] in
/// delivery order and [`BindEngine::update`] must run once per frame after
/// the queries for that frame.
///
/// Only one engine may be alive per process. A second construction, from
/// any thread, fails with [`InputError::AlreadyInitialized`].
pub struct BindEngine {
    source: Box<dyn BindSource>,
    store: Box<dyn ConfigStore>,
    registry: BindRegistry,
    mappings: MappingIndex,
    state: StateTracker,
    text_input_active: bool,
    reload_listener: Option<ReloadListener>,
    _guard: InstanceGuard,
}

impl std::fmt::Debug for BindEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindEngine")
            .field("categories", &self.registry.categories().count())
            .field("entries", &self.registry.entry_count())
            .field("mapped_inputs", &self.mappings.len())
            .field("text_input_active", &self.text_input_active)
            .finish_non_exhaustive()
    }
}

impl BindEngine {
    /// Create the engine and load binds from `source`, applying overrides
    /// from `store`.
    pub fn new(
        source: impl BindSource + 'static,
        store: impl ConfigStore + 'static,
    ) -> Result<Self, InputError> {
        let guard = InstanceGuard::acquire()?;
        let mut engine = Self {
            source: Box::new(source),
            store: Box::new(store),
            registry: BindRegistry::new(),
            mappings: MappingIndex::new(),
            state: StateTracker::new(),
            text_input_active: false,
            reload_listener: None,
            _guard: guard,
        };
        engine.reload();
        Ok(engine)
    }

    /// Like [`BindEngine::new`], also reloading whenever `hub` is notified.
    /// The subscription ends when the engine is dropped.
    pub fn with_reload(
        source: impl BindSource + 'static,
        store: impl ConfigStore + 'static,
        hub: &ReloadHub,
    ) -> Result<Self, InputError> {
        let mut engine = Self::new(source, store)?;
        engine.reload_listener = Some(hub.subscribe());
        Ok(engine)
    }

    /// Whether an engine is alive anywhere in the process
    pub fn exists() -> bool {
        ENGINE_ALIVE.load(Ordering::Acquire)
    }

    /// Rebuild the registry from the source and the store, then the index.
    ///
    /// Bind states are dropped since entry identities are re-derived.
    pub fn reload(&mut self) {
        self.registry = BindRegistry::load(self.source.as_ref(), self.store.as_ref());
        self.state.clear_binds();

        let count = self.registry.entry_count();
        log::info!("Binds: Loaded {} bind{}", count, if count == 1 { "" } else { "s" });

        self.rebuild_mappings();
    }

    /// Frame reset followed by a full index rebuild
    pub fn rebuild_mappings(&mut self) {
        self.reset();
        self.mappings.rebuild(&self.registry);
    }

    /// Frame boundary: run a pending reload, then reset per-frame state
    pub fn update(&mut self) {
        let pending = self
            .reload_listener
            .as_ref()
            .is_some_and(ReloadListener::take_pending);
        if pending {
            self.reload();
        }
        self.reset();
    }

    /// Clear the event log and edge counters, reclaiming released state
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Route one raw event.
    ///
    /// `consumed` reports that the host already handled the event. The
    /// return value is reserved for consumption signalling and is always
    /// false.
    pub fn handle_input(&mut self, event: &InputEvent, consumed: bool) -> bool {
        self.state.record_event(event.clone(), consumed);

        match *event {
            InputEvent::KeyDown { key, mods } => {
                let key_mod = KeyMod::from_key(key).unwrap_or_default();
                self.state.add_pressed_mods(key_mod);

                if !consumed && !self.text_input_active {
                    self.state.press_key(key, key_mod);
                    self.press_binds(key.into(), mods);
                }
            }
            InputEvent::KeyUp { key } => {
                let key_mod = KeyMod::from_key(key).unwrap_or_default();
                self.state.remove_pressed_mods(key_mod);
                self.state.release_key(key, key_mod);
                self.release_binds(key.into());
            }
            InputEvent::MouseButtonDown { button, position } => {
                if !consumed {
                    self.state.press_mouse(button, position);
                    let mods = self.state.pressed_mods();
                    self.press_binds(button.into(), mods);
                }
            }
            InputEvent::MouseButtonUp { button, position } => {
                self.state.release_mouse(button, position);
                self.release_binds(button.into());
            }
            InputEvent::ControllerButtonDown { button, .. } => {
                if !consumed {
                    self.state.press_controller(button);
                    self.press_binds(button.into(), KeyMod::empty());
                }
            }
            InputEvent::ControllerButtonUp { button, .. } => {
                self.state.release_controller(button);
                self.release_binds(button.into());
            }
            InputEvent::MouseWheel { .. } | InputEvent::MouseMove { .. } => {}
        }

        false
    }

    /// Press every bind in the highest priority tier matching `mods`
    fn press_binds(&mut self, input: InputVariant, mods: KeyMod) {
        let selected = select_candidates(self.mappings.candidates(input), mods);
        for entry in selected {
            log::trace!("Binds: {} pressed bind {:?}", input, entry);
            self.state.press_bind(entry);
        }
    }

    /// Release every bind mapped from `input`, whatever its modifiers
    fn release_binds(&mut self, input: InputVariant) {
        for candidate in self.mappings.candidates(input) {
            self.state.release_bind(candidate.entry);
        }
    }

    /// While active, key presses do not reach key or bind state
    pub fn set_text_input_active(&mut self, active: bool) {
        self.text_input_active = active;
    }

    pub fn text_input_active(&self) -> bool {
        self.text_input_active
    }

    /// Events routed since the last frame reset, with their consumed flag
    pub fn events_this_frame(&self) -> &[(InputEvent, bool)] {
        self.state.events()
    }

    /// Modifier keys currently held, as seen by every key event
    pub fn pressed_mods(&self) -> KeyMod {
        self.state.pressed_mods()
    }

    fn bind_state(&self, category_id: &str, entry_id: &str) -> Option<&InputState> {
        let id = self.registry.entry_id(category_id, entry_id)?;
        self.state.bind(id)
    }

    pub fn bind_down(&self, category_id: &str, entry_id: &str) -> Option<u32> {
        self.bind_state(category_id, entry_id)
            .map(InputState::presses)
            .filter(|&n| n > 0)
    }

    pub fn bind_held(&self, category_id: &str, entry_id: &str) -> bool {
        self.bind_state(category_id, entry_id)
            .is_some_and(InputState::held)
    }

    pub fn bind_up(&self, category_id: &str, entry_id: &str) -> Option<u32> {
        self.bind_state(category_id, entry_id)
            .map(InputState::releases)
            .filter(|&n| n > 0)
    }

    /// Presses of `key` this frame. With `mods`, the modifier bits recorded on
    /// the key state must strictly equal them.
    pub fn key_down(&self, key: Key, mods: Option<KeyMod>) -> Option<u32> {
        let state = self.state.key(key)?;
        let matches = mods.map_or(true, |mods| matches_strict(mods, state.mods()));
        (state.presses() > 0 && matches).then_some(state.presses())
    }

    pub fn key_held(&self, key: Key) -> bool {
        self.state.key(key).is_some_and(InputState::held)
    }

    pub fn key_up(&self, key: Key) -> Option<u32> {
        self.state
            .key(key)
            .map(InputState::releases)
            .filter(|&n| n > 0)
    }

    /// Click positions of this frame's presses of `button`
    pub fn mouse_down(&self, button: MouseButton) -> Option<&[Vec2I]> {
        self.state
            .mouse(button)
            .filter(|state| state.presses() > 0)
            .map(InputState::press_positions)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.state.mouse(button).is_some_and(InputState::held)
    }

    /// Positions of this frame's releases of `button`
    pub fn mouse_up(&self, button: MouseButton) -> Option<&[Vec2I]> {
        self.state
            .mouse(button)
            .filter(|state| state.releases() > 0)
            .map(InputState::release_positions)
    }

    pub fn controller_down(&self, button: ControllerButton) -> Option<u32> {
        self.state
            .controller(button)
            .map(InputState::presses)
            .filter(|&n| n > 0)
    }

    pub fn controller_held(&self, button: ControllerButton) -> bool {
        self.state.controller(button).is_some_and(InputState::held)
    }

    pub fn controller_up(&self, button: ControllerButton) -> Option<u32> {
        self.state
            .controller(button)
            .map(InputState::releases)
            .filter(|&n| n > 0)
    }

    pub fn entry(&self, category_id: &str, entry_id: &str) -> Result<&BindEntry, InputError> {
        self.registry.entry(category_id, entry_id)
    }

    /// Encoded custom binds of an entry
    pub fn get_binds(&self, category_id: &str, entry_id: &str) -> Result<Value, InputError> {
        Ok(encode_binds(self.entry(category_id, entry_id)?.custom_binds()))
    }

    /// Encoded default binds of an entry
    pub fn get_default_binds(&self, category_id: &str, entry_id: &str) -> Result<Value, InputError> {
        Ok(encode_binds(self.entry(category_id, entry_id)?.default_binds()))
    }

    /// Replace an entry's custom binds, persist them and rebuild the index.
    /// An empty list restores the defaults.
    pub fn set_binds(
        &mut self,
        category_id: &str,
        entry_id: &str,
        binds: Vec<Bind>,
    ) -> Result<(), InputError> {
        self.registry
            .set_custom_binds(category_id, entry_id, binds, self.store.as_mut())?;
        self.binds_changed()
    }

    /// Decode a JSON array of bind records and apply it with
    /// [`BindEngine::set_binds`]. Records of unknown type are dropped; any
    /// other decode failure rejects the whole call.
    pub fn set_binds_json(
        &mut self,
        category_id: &str,
        entry_id: &str,
        binds: &Value,
    ) -> Result<(), InputError> {
        self.entry(category_id, entry_id)?;
        let records = binds.as_array().ok_or_else(|| {
            CodecError::Malformed(<serde_json::Error as serde::de::Error>::custom(
                "bind list must be an array",
            ))
        })?;

        let mut decoded = Vec::with_capacity(records.len());
        for record in records {
            if let Some(bind) = decode_bind(record)? {
                decoded.push(bind);
            }
        }
        self.set_binds(category_id, entry_id, decoded)
    }

    /// Restore an entry's default binds, persist them and rebuild the index
    pub fn reset_binds(&mut self, category_id: &str, entry_id: &str) -> Result<(), InputError> {
        self.registry
            .reset_custom_binds(category_id, entry_id, self.store.as_mut())?;
        self.binds_changed()
    }

    fn binds_changed(&mut self) -> Result<(), InputError> {
        self.rebuild_mappings();
        self.store.flush()?;
        Ok(())
    }

    pub fn registry(&self) -> &BindRegistry {
        &self.registry
    }

    pub fn mappings(&self) -> &MappingIndex {
        &self.mappings
    }

    pub fn state(&self) -> &StateTracker {
        &self.state
    }

    pub fn store(&self) -> &dyn ConfigStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JsonConfigStore, StaticBindSource};
    use serde_json::json;

    fn source() -> StaticBindSource {
        StaticBindSource::new(vec![json!({
            "player": {
                "name": "Player",
                "binds": {
                    "jump": { "default": [{ "type": "key", "value": "Space" }] },
                    "crouch": { "default": [{ "type": "key", "value": "C" }] },
                    "sprint": { "default": [{ "type": "key", "value": "Space", "mods": ["LShift"] }] },
                    "fire": { "default": [
                        { "type": "mouse", "value": "Left" },
                        { "type": "controller", "value": "RightShoulder" }
                    ] },
                    "aim": { "default": [{ "type": "mouse", "value": "Left", "mods": ["LAlt"] }] }
                }
            }
        })])
    }

    fn engine() -> BindEngine {
        BindEngine::new(source(), JsonConfigStore::new()).unwrap()
    }

    #[test]
    fn test_second_instance_is_rejected() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let first = engine();
        assert!(BindEngine::exists());
        let err = BindEngine::new(source(), JsonConfigStore::new()).unwrap_err();
        assert!(matches!(err, InputError::AlreadyInitialized));

        drop(first);
        assert!(!BindEngine::exists());
        assert!(BindEngine::new(source(), JsonConfigStore::new()).is_ok());
    }

    #[test]
    fn test_second_instance_rejected_from_other_thread() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let _first = engine();
        let rejected = std::thread::spawn(|| {
            matches!(
                BindEngine::new(source(), JsonConfigStore::new()),
                Err(InputError::AlreadyInitialized)
            )
        })
        .join()
        .unwrap();
        assert!(rejected);
        assert!(BindEngine::exists());
    }

    #[test]
    fn test_key_press_activates_bind() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        assert!(!engine.handle_input(&InputEvent::key_down(Key::Space, KeyMod::empty()), false));
        assert_eq!(engine.key_down(Key::Space, None), Some(1));
        assert_eq!(engine.bind_down("player", "jump"), Some(1));
        assert!(engine.bind_held("player", "jump"));
        assert_eq!(engine.bind_down("player", "sprint"), None);
    }

    #[test]
    fn test_modified_press_picks_higher_tier() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        engine.handle_input(&InputEvent::key_down(Key::LShift, KeyMod::LSHIFT), false);
        engine.handle_input(&InputEvent::key_down(Key::Space, KeyMod::LSHIFT), false);
        assert_eq!(engine.bind_down("player", "sprint"), Some(1));
        assert_eq!(engine.bind_down("player", "jump"), None);
    }

    #[test]
    fn test_release_reaches_every_mapped_bind() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        engine.handle_input(&InputEvent::key_down(Key::Space, KeyMod::LSHIFT), false);
        engine.handle_input(&InputEvent::key_up(Key::Space), false);
        assert_eq!(engine.bind_up("player", "sprint"), Some(1));
        assert!(!engine.bind_held("player", "sprint"));
        // jump was never pressed so it stays untracked
        assert_eq!(engine.bind_up("player", "jump"), None);
    }

    #[test]
    fn test_consumed_press_is_logged_but_ignored() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        engine.handle_input(&InputEvent::key_down(Key::C, KeyMod::empty()), true);
        assert_eq!(engine.events_this_frame().len(), 1);
        assert!(engine.events_this_frame()[0].1);
        assert!(!engine.key_held(Key::C));
        assert!(!engine.bind_held("player", "crouch"));
    }

    #[test]
    fn test_consumed_release_still_releases() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        engine.handle_input(&InputEvent::key_down(Key::C, KeyMod::empty()), false);
        engine.handle_input(&InputEvent::key_up(Key::C), true);
        assert_eq!(engine.key_up(Key::C), Some(1));
        assert_eq!(engine.bind_up("player", "crouch"), Some(1));
    }

    #[test]
    fn test_text_input_blocks_presses_only() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        engine.handle_input(&InputEvent::key_down(Key::C, KeyMod::empty()), false);
        engine.set_text_input_active(true);
        engine.handle_input(&InputEvent::key_down(Key::Space, KeyMod::empty()), false);
        engine.handle_input(&InputEvent::key_down(Key::LCtrl, KeyMod::LCTRL), false);
        engine.handle_input(&InputEvent::key_up(Key::C), false);

        assert!(!engine.key_held(Key::Space));
        assert!(!engine.bind_held("player", "jump"));
        assert_eq!(engine.pressed_mods(), KeyMod::LCTRL);
        assert_eq!(engine.bind_up("player", "crouch"), Some(1));
    }

    #[test]
    fn test_mouse_uses_modifier_accumulator() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        engine.handle_input(&InputEvent::key_down(Key::LAlt, KeyMod::LALT), false);
        engine.handle_input(&InputEvent::mouse_down(MouseButton::Left, Vec2I::new(4, 2)), false);
        assert_eq!(engine.bind_down("player", "aim"), Some(1));
        assert_eq!(engine.bind_down("player", "fire"), None);
        assert_eq!(engine.mouse_down(MouseButton::Left), Some(&[Vec2I::new(4, 2)][..]));

        engine.handle_input(&InputEvent::key_up(Key::LAlt), false);
        engine.handle_input(&InputEvent::mouse_up(MouseButton::Left, Vec2I::new(5, 2)), false);
        assert_eq!(engine.mouse_up(MouseButton::Left), Some(&[Vec2I::new(5, 2)][..]));
        assert!(engine.pressed_mods().is_empty());
    }

    #[test]
    fn test_controller_buttons() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        engine.set_text_input_active(true);
        engine.handle_input(&InputEvent::controller_down(ControllerButton::RightShoulder, 1), false);
        assert_eq!(engine.controller_down(ControllerButton::RightShoulder), Some(1));
        assert!(engine.bind_held("player", "fire"));

        engine.handle_input(&InputEvent::controller_up(ControllerButton::RightShoulder, 1), false);
        assert_eq!(engine.controller_up(ControllerButton::RightShoulder), Some(1));
        assert!(!engine.controller_held(ControllerButton::RightShoulder));
    }

    #[test]
    fn test_key_down_with_explicit_mods() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        engine.handle_input(&InputEvent::key_down(Key::LShift, KeyMod::LSHIFT), false);
        assert_eq!(engine.key_down(Key::LShift, Some(KeyMod::LSHIFT | KeyMod::CAPS)), Some(1));
        assert_eq!(engine.key_down(Key::LShift, Some(KeyMod::empty())), None);
        assert_eq!(engine.key_down(Key::A, None), None);
    }

    #[test]
    fn test_update_resets_frame() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        engine.handle_input(&InputEvent::key_down(Key::Space, KeyMod::empty()), false);
        engine.update();
        assert!(engine.events_this_frame().is_empty());
        assert_eq!(engine.bind_down("player", "jump"), None);
        assert!(engine.bind_held("player", "jump"));
    }

    #[test]
    fn test_unknown_entry_queries() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        assert_eq!(engine.bind_down("player", "fly"), None);
        assert!(!engine.bind_held("ui", "jump"));
        assert!(matches!(
            engine.get_binds("player", "fly"),
            Err(InputError::NotFound { .. })
        ));
        assert!(engine.reset_binds("ui", "open").is_err());
    }

    #[test]
    fn test_set_binds_json() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let mut engine = engine();
        engine
            .set_binds_json(
                "player",
                "crouch",
                &json!([{ "type": "key", "value": "LCtrl" }, { "type": "gesture", "value": "x" }]),
            )
            .unwrap();
        assert_eq!(
            engine.get_binds("player", "crouch").unwrap(),
            json!([{ "type": "key", "value": "LCtrl" }])
        );
        assert_eq!(
            engine.get_default_binds("player", "crouch").unwrap(),
            json!([{ "type": "key", "value": "C" }])
        );

        let err = engine
            .set_binds_json("player", "crouch", &json!([{ "type": "key", "value": "Nope" }]))
            .unwrap_err();
        assert!(matches!(err, InputError::Codec(_)));
        let err = engine.set_binds_json("player", "crouch", &json!({})).unwrap_err();
        assert!(matches!(err, InputError::Codec(_)));
    }

    #[test]
    fn test_reload_via_hub() {
        let _lock = ENGINE_TEST_LOCK.lock();
        let hub = ReloadHub::new();
        let mut engine = BindEngine::with_reload(source(), JsonConfigStore::new(), &hub).unwrap();
        assert_eq!(hub.listener_count(), 1);
        let generation = engine.mappings().generation();

        engine.update();
        assert_eq!(engine.mappings().generation(), generation);

        hub.notify();
        engine.update();
        assert_eq!(engine.mappings().generation(), generation + 1);

        drop(engine);
        assert_eq!(hub.listener_count(), 0);
    }
}
