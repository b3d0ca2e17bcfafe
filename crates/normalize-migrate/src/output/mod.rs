//! Output emitters - render the converted module for external printers.

#[cfg(feature = "write-json")]
pub mod json;

#[cfg(feature = "write-json")]
pub use json::{JSON_EMITTER, JsonEmitter, emit_json};
