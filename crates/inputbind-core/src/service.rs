// Inputbind Service Slot
// Makes the engine of the frame thread reachable without passing it around

use std::cell::RefCell;

use crate::engine::BindEngine;
use crate::error::InputError;

thread_local! {
    static ENGINE: RefCell<Option<BindEngine>> = const { RefCell::new(None) };
}

/// Put `engine` in the slot of the current thread.
///
/// Fails with `AlreadyInitialized` if an engine is installed already; the
/// rejected engine is dropped.
pub fn install(engine: BindEngine) -> Result<(), InputError> {
    ENGINE.with(|slot| {
        let mut slot = slot
            .try_borrow_mut()
            .map_err(|_| InputError::AlreadyInitialized)?;
        if slot.is_some() {
            return Err(InputError::AlreadyInitialized);
        }
        *slot = Some(engine);
        Ok(())
    })
}

/// Take the engine out of the slot
pub fn uninstall() -> Option<BindEngine> {
    ENGINE.with(|slot| slot.try_borrow_mut().ok().and_then(|mut slot| slot.take()))
}

pub fn is_installed() -> bool {
    ENGINE.with(|slot| slot.try_borrow().is_ok_and(|slot| slot.is_some()))
}

/// Run `f` against the installed engine.
///
/// Fails with `NotInitialized` when nothing is installed. Calls must not be
/// nested; an inner call sees no engine.
pub fn with_engine<R>(f: impl FnOnce(&mut BindEngine) -> R) -> Result<R, InputError> {
    ENGINE.with(|slot| {
        let mut slot = slot
            .try_borrow_mut()
            .map_err(|_| InputError::NotInitialized)?;
        let engine = slot.as_mut().ok_or(InputError::NotInitialized)?;
        Ok(f(engine))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JsonConfigStore, StaticBindSource};
    use crate::engine::ENGINE_TEST_LOCK;
    use crate::input::InputEvent;
    use crate::key::Key;
    use crate::modifier::KeyMod;
    use serde_json::json;

    fn engine() -> BindEngine {
        let source = StaticBindSource::new(vec![json!({
            "menu": { "binds": { "open": { "default": [{ "type": "key", "value": "Escape" }] } } }
        })]);
        BindEngine::new(source, JsonConfigStore::new()).unwrap()
    }

    #[test]
    fn test_use_before_install() {
        let result = with_engine(|engine| engine.pressed_mods());
        assert!(matches!(result, Err(InputError::NotInitialized)));
        assert!(!is_installed());
    }

    #[test]
    fn test_install_and_use() {
        let _lock = ENGINE_TEST_LOCK.lock();
        install(engine()).unwrap();
        assert!(is_installed());

        with_engine(|engine| {
            engine.handle_input(&InputEvent::key_down(Key::Escape, KeyMod::empty()), false)
        })
        .unwrap();
        let down = with_engine(|engine| engine.bind_down("menu", "open")).unwrap();
        assert_eq!(down, Some(1));

        let engine = uninstall().unwrap();
        drop(engine);
        assert!(!is_installed());
        assert!(!BindEngine::exists());
    }

    #[test]
    fn test_nested_access_sees_nothing() {
        let _lock = ENGINE_TEST_LOCK.lock();
        install(engine()).unwrap();
        let inner = with_engine(|_| with_engine(|_| ())).unwrap();
        assert!(matches!(inner, Err(InputError::NotInitialized)));
        uninstall();
    }

    #[test]
    fn test_second_engine_cannot_be_built_while_installed() {
        let _lock = ENGINE_TEST_LOCK.lock();
        install(engine()).unwrap();
        let second = BindEngine::new(StaticBindSource::default(), JsonConfigStore::new());
        assert!(matches!(second, Err(InputError::AlreadyInitialized)));
        uninstall();
    }
}
