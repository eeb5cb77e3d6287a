// Inputbind Input Layer
// Raw events handed over by the platform layer

mod event;

pub use event::InputEvent;
