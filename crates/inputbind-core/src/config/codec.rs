// Inputbind Config API - Bind Codec
// Converts binds, modifier sets and raw events to and from their JSON records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bind::{Bind, ControllerBind, KeyBind, MouseBind};
use crate::input::InputEvent;
use crate::key::{ControllerButton, Key, MouseButton, MouseWheel, Vec2I};
use crate::modifier::KeyMod;

/// Errors that can occur while decoding a record
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unknown key name: '{0}'")]
    UnknownKey(String),

    #[error("unknown mouse button: '{0}'")]
    UnknownMouseButton(String),

    #[error("unknown mouse wheel direction: '{0}'")]
    UnknownMouseWheel(String),

    #[error("unknown controller button: '{0}'")]
    UnknownControllerButton(String),

    #[error("unknown modifier: '{0}'")]
    UnknownModifier(String),

    #[error("bind of type '{0}' has no value")]
    MissingValue(String),

    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Wire shape of a single bind:
/// `{ "type": "key"|"mouse"|"controller", "value": <name>, "mods"?: [<name>...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindRecord {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mods: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub controller: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl BindRecord {
    /// Build the record for a bind. Empty modifier sets are omitted.
    pub fn from_bind(bind: &Bind) -> Self {
        match bind {
            Bind::Key(bind) => Self {
                kind: "key".to_string(),
                value: Some(bind.key.name().to_string()),
                mods: encode_mods(bind.mods),
                controller: 0,
            },
            Bind::Mouse(bind) => Self {
                kind: "mouse".to_string(),
                value: Some(bind.button.name().to_string()),
                mods: encode_mods(bind.mods),
                controller: 0,
            },
            Bind::Controller(bind) => Self {
                kind: "controller".to_string(),
                value: Some(bind.button.name().to_string()),
                mods: None,
                controller: bind.controller,
            },
        }
    }

    /// Resolve the record against the key, button and modifier tables.
    ///
    /// An unrecognised `type` yields `Ok(None)`: the record is a no-op
    /// rather than an error.
    pub fn to_bind(&self) -> Result<Option<Bind>, CodecError> {
        let value = || {
            self.value
                .as_deref()
                .ok_or_else(|| CodecError::MissingValue(self.kind.clone()))
        };
        let mods = || -> Result<(KeyMod, u8), CodecError> {
            match &self.mods {
                Some(names) => decode_mods(names),
                None => Ok((KeyMod::empty(), 0)),
            }
        };

        let bind = match self.kind.as_str() {
            "key" => {
                let name = value()?;
                let key =
                    Key::from_name(name).ok_or_else(|| CodecError::UnknownKey(name.to_string()))?;
                let (mods, priority) = mods()?;
                Bind::Key(KeyBind {
                    key,
                    mods,
                    priority,
                })
            }
            "mouse" => {
                let name = value()?;
                let button = MouseButton::from_name(name)
                    .ok_or_else(|| CodecError::UnknownMouseButton(name.to_string()))?;
                let (mods, priority) = mods()?;
                Bind::Mouse(MouseBind {
                    button,
                    mods,
                    priority,
                })
            }
            "controller" => {
                let name = value()?;
                let button = ControllerButton::from_name(name)
                    .ok_or_else(|| CodecError::UnknownControllerButton(name.to_string()))?;
                Bind::Controller(ControllerBind {
                    button,
                    controller: self.controller,
                })
            }
            other => {
                log::debug!("Binds: ignoring bind of unknown type '{}'", other);
                return Ok(None);
            }
        };
        Ok(Some(bind))
    }
}

/// Encode a modifier set as names in canonical order; `None` when empty
pub fn encode_mods(mods: KeyMod) -> Option<Vec<String>> {
    if mods.is_empty() {
        return None;
    }
    Some(mods.names().into_iter().map(str::to_string).collect())
}

/// Decode an ordered list of modifier names.
///
/// Returns the modifier set and its priority: the number of names that
/// actually added a bit, so repeated names count once.
pub fn decode_mods<S: AsRef<str>>(names: &[S]) -> Result<(KeyMod, u8), CodecError> {
    let mut mods = KeyMod::empty();
    let mut priority: u8 = 0;
    for name in names {
        let name = name.as_ref();
        let bit =
            KeyMod::from_mod_name(name).ok_or_else(|| CodecError::UnknownModifier(name.to_string()))?;
        let changed = mods | bit;
        if changed != mods {
            mods = changed;
            priority += 1;
        }
    }
    Ok((mods, priority))
}

/// Decode a bind from its JSON record. `null` and unknown types decode to `None`.
pub fn decode_bind(json: &Value) -> Result<Option<Bind>, CodecError> {
    if json.is_null() {
        return Ok(None);
    }
    let record = BindRecord::deserialize(json)?;
    record.to_bind()
}

/// Encode a bind as its JSON record
pub fn encode_bind(bind: &Bind) -> Value {
    // A struct of strings, integers and string lists always serializes
    serde_json::to_value(BindRecord::from_bind(bind)).unwrap_or(Value::Null)
}

/// Encode a list of binds as a JSON array
pub fn encode_binds(binds: &[Bind]) -> Value {
    Value::Array(binds.iter().map(encode_bind).collect())
}

/// Diagnostic record of a raw event: `{ "type": <kind>, "data": {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
enum EventRecord {
    KeyDown {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mods: Option<Vec<String>>,
    },
    KeyUp {
        key: String,
    },
    MouseButtonDown {
        #[serde(rename = "mouseButton")]
        mouse_button: String,
        #[serde(rename = "mousePosition")]
        mouse_position: Vec2I,
    },
    MouseButtonUp {
        #[serde(rename = "mouseButton")]
        mouse_button: String,
        #[serde(rename = "mousePosition")]
        mouse_position: Vec2I,
    },
    MouseWheel {
        #[serde(rename = "mouseWheel")]
        mouse_wheel: String,
        #[serde(rename = "mousePosition")]
        mouse_position: Vec2I,
    },
    MouseMove {
        #[serde(rename = "mouseMove")]
        mouse_move: Vec2I,
        #[serde(rename = "mousePosition")]
        mouse_position: Vec2I,
    },
}

/// Encode a raw event for diagnostics or recording.
///
/// Controller events have no record and encode to `None`.
pub fn encode_event(event: &InputEvent) -> Option<Value> {
    let record = match *event {
        InputEvent::KeyDown { key, mods } => EventRecord::KeyDown {
            key: key.name().to_string(),
            mods: encode_mods(mods),
        },
        InputEvent::KeyUp { key } => EventRecord::KeyUp {
            key: key.name().to_string(),
        },
        InputEvent::MouseButtonDown { button, position } => EventRecord::MouseButtonDown {
            mouse_button: button.name().to_string(),
            mouse_position: position,
        },
        InputEvent::MouseButtonUp { button, position } => EventRecord::MouseButtonUp {
            mouse_button: button.name().to_string(),
            mouse_position: position,
        },
        InputEvent::MouseWheel { wheel, position } => EventRecord::MouseWheel {
            mouse_wheel: wheel.name().to_string(),
            mouse_position: position,
        },
        InputEvent::MouseMove { delta, position } => EventRecord::MouseMove {
            mouse_move: delta,
            mouse_position: position,
        },
        InputEvent::ControllerButtonDown { .. } | InputEvent::ControllerButtonUp { .. } => {
            return None
        }
    };
    serde_json::to_value(record).ok()
}

/// Decode an event record produced by [`encode_event`]. `null` decodes to `None`.
pub fn decode_event(json: &Value) -> Result<Option<InputEvent>, CodecError> {
    if json.is_null() {
        return Ok(None);
    }
    let key = |name: &str| Key::from_name(name).ok_or_else(|| CodecError::UnknownKey(name.to_string()));
    let button = |name: &str| {
        MouseButton::from_name(name).ok_or_else(|| CodecError::UnknownMouseButton(name.to_string()))
    };

    let event = match EventRecord::deserialize(json)? {
        EventRecord::KeyDown { key: name, mods } => InputEvent::KeyDown {
            key: key(&name)?,
            mods: match mods {
                Some(names) => decode_mods(&names)?.0,
                None => KeyMod::empty(),
            },
        },
        EventRecord::KeyUp { key: name } => InputEvent::KeyUp { key: key(&name)? },
        EventRecord::MouseButtonDown {
            mouse_button,
            mouse_position,
        } => InputEvent::MouseButtonDown {
            button: button(&mouse_button)?,
            position: mouse_position,
        },
        EventRecord::MouseButtonUp {
            mouse_button,
            mouse_position,
        } => InputEvent::MouseButtonUp {
            button: button(&mouse_button)?,
            position: mouse_position,
        },
        EventRecord::MouseWheel {
            mouse_wheel,
            mouse_position,
        } => InputEvent::MouseWheel {
            wheel: MouseWheel::from_name(&mouse_wheel)
                .ok_or(CodecError::UnknownMouseWheel(mouse_wheel))?,
            position: mouse_position,
        },
        EventRecord::MouseMove {
            mouse_move,
            mouse_position,
        } => InputEvent::MouseMove {
            delta: mouse_move,
            position: mouse_position,
        },
    };
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_counts_distinct_names() {
        let (mods, priority) = decode_mods(&["LShift", "LShift", "LCtrl"]).unwrap();
        assert_eq!(mods, KeyMod::LSHIFT | KeyMod::LCTRL);
        assert_eq!(priority, 2);
    }

    #[test]
    fn test_priority_counts_optional_modifiers() {
        let (mods, priority) = decode_mods(&["Caps", "LAlt"]).unwrap();
        assert_eq!(mods, KeyMod::CAPS | KeyMod::LALT);
        assert_eq!(priority, 2);
    }

    #[test]
    fn test_unknown_modifier_is_an_error() {
        let result = decode_mods(&["LCtrl", "Hyper"]);
        assert!(matches!(result, Err(CodecError::UnknownModifier(name)) if name == "Hyper"));
    }

    #[test]
    fn test_encode_mods_canonical_and_empty() {
        assert_eq!(encode_mods(KeyMod::empty()), None);
        let names = encode_mods(KeyMod::SCROLL | KeyMod::RCTRL).unwrap();
        assert_eq!(names, vec!["RCtrl".to_string(), "Scroll".to_string()]);
    }

    #[test]
    fn test_decode_key_bind() {
        let bind = decode_bind(&json!({ "type": "key", "value": "E", "mods": ["LCtrl", "LCtrl", "LAlt"] }))
            .unwrap()
            .unwrap();
        assert_eq!(
            bind,
            Bind::Key(KeyBind {
                key: Key::E,
                mods: KeyMod::LCTRL | KeyMod::LALT,
                priority: 2,
            })
        );
    }

    #[test]
    fn test_decode_mouse_and_controller_binds() {
        let mouse = decode_bind(&json!({ "type": "mouse", "value": "Right" })).unwrap().unwrap();
        assert_eq!(mouse, Bind::Mouse(MouseBind::new(MouseButton::Right, KeyMod::empty())));

        let pad = decode_bind(&json!({ "type": "controller", "value": "Start", "controller": 1 }))
            .unwrap()
            .unwrap();
        assert_eq!(
            pad,
            Bind::Controller(ControllerBind {
                button: ControllerButton::Start,
                controller: 1,
            })
        );
    }

    #[test]
    fn test_unknown_type_is_a_no_op() {
        assert!(decode_bind(&json!({ "type": "joystick", "value": "X" })).unwrap().is_none());
        assert!(decode_bind(&Value::Null).unwrap().is_none());
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode_bind(&json!({ "type": "key", "value": "NoSuchKey" })),
            Err(CodecError::UnknownKey(_))
        ));
        assert!(matches!(
            decode_bind(&json!({ "type": "mouse", "value": "Sixth" })),
            Err(CodecError::UnknownMouseButton(_))
        ));
        assert!(matches!(
            decode_bind(&json!({ "type": "key" })),
            Err(CodecError::MissingValue(_))
        ));
        assert!(matches!(decode_bind(&json!("key")), Err(CodecError::Malformed(_))));
        assert!(matches!(
            decode_bind(&json!({ "type": "key", "value": "A", "mods": "LCtrl" })),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_encode_omits_empty_mods() {
        let bind = Bind::Key(KeyBind::new(Key::Space, KeyMod::empty()));
        assert_eq!(encode_bind(&bind), json!({ "type": "key", "value": "Space" }));
    }

    #[test]
    fn test_round_trip_reorders_mods_canonically() {
        let record = json!({ "type": "key", "value": "Z", "mods": ["LAlt", "Caps", "LShift"] });
        let bind = decode_bind(&record).unwrap().unwrap();
        let encoded = encode_bind(&bind);
        assert_eq!(
            encoded,
            json!({ "type": "key", "value": "Z", "mods": ["LShift", "LAlt", "Caps"] })
        );
        assert_eq!(decode_bind(&encoded).unwrap().unwrap(), bind);
    }

    #[test]
    fn test_encode_controller_bind() {
        let bind = Bind::Controller(ControllerBind::new(ControllerButton::A));
        assert_eq!(encode_bind(&bind), json!({ "type": "controller", "value": "A" }));
    }

    #[test]
    fn test_encode_key_down_event() {
        let event = InputEvent::key_down(Key::W, KeyMod::LSHIFT);
        assert_eq!(
            encode_event(&event).unwrap(),
            json!({ "type": "KeyDown", "data": { "key": "W", "mods": ["LShift"] } })
        );
    }

    #[test]
    fn test_encode_mouse_event() {
        let event = InputEvent::mouse_down(MouseButton::Left, Vec2I::new(10, 20));
        assert_eq!(
            encode_event(&event).unwrap(),
            json!({ "type": "MouseButtonDown", "data": { "mouseButton": "Left", "mousePosition": [10, 20] } })
        );
    }

    #[test]
    fn test_controller_events_have_no_record() {
        assert!(encode_event(&InputEvent::controller_down(ControllerButton::B, 0)).is_none());
    }

    #[test]
    fn test_event_records_decode_back() {
        let events = [
            InputEvent::key_down(Key::Q, KeyMod::LCTRL | KeyMod::NUM),
            InputEvent::key_up(Key::Q),
            InputEvent::mouse_up(MouseButton::Middle, Vec2I::new(-1, 5)),
            InputEvent::MouseWheel {
                wheel: MouseWheel::Down,
                position: Vec2I::new(0, 0),
            },
            InputEvent::MouseMove {
                delta: Vec2I::new(3, 4),
                position: Vec2I::new(30, 40),
            },
        ];
        for event in events {
            let record = encode_event(&event).unwrap();
            assert_eq!(decode_event(&record).unwrap(), Some(event));
        }
    }

    #[test]
    fn test_decode_event_rejects_unknown_kind() {
        assert!(matches!(
            decode_event(&json!({ "type": "Touch", "data": {} })),
            Err(CodecError::Malformed(_))
        ));
    }
}
