// Inputbind Core Library
// Input binding engine: named actions bound to keys, mouse and controller buttons

pub mod bind;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod key;
pub mod mapping;
pub mod modifier;
pub mod registry;
pub mod reload;
pub mod service;
pub mod settings;
pub mod state;

pub use bind::{Bind, ControllerBind, InputVariant, KeyBind, MouseBind};
pub use config::{
    decode_bind, decode_event, decode_mods, encode_bind, encode_binds, encode_event, encode_mods,
    BindRecord, BindSource, CodecError, ConfigStore, DirBindSource, JsonConfigStore, SourceError,
    StaticBindSource, StoreError,
};
pub use engine::BindEngine;
pub use error::InputError;
pub use input::InputEvent;
pub use key::{ControllerButton, Key, MouseButton, MouseWheel, Vec2I};
pub use mapping::{select_candidates, BindRef, MappingIndex};
pub use modifier::{matches_lenient, matches_strict, KeyMod, OPTIONAL_MODS};
pub use registry::{BindCategory, BindEntry, BindRegistry, EntryId, BINDING_CONFIG_ROOT};
pub use reload::{ReloadHub, ReloadListener};
pub use settings::{default_settings_content, Settings, SettingsError};
pub use state::{InputState, StateTracker};
