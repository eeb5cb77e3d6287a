// Inputbind Config API
// Bind records, bind documents and the user override store

pub mod codec;
pub mod source;
pub mod store;

pub use codec::{
    decode_bind, decode_event, decode_mods, encode_bind, encode_binds, encode_event, encode_mods,
    BindRecord, CodecError,
};
pub use source::{load_document, BindSource, DirBindSource, SourceError, StaticBindSource};
pub use store::{ConfigStore, JsonConfigStore, StoreError};
