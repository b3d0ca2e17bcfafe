//! JSON emitter: the interchange format for target-language printers.

use crate::ir::Module;
use crate::traits::{EmitError, Emitter};

/// Static instance of the JSON emitter.
pub static JSON_EMITTER: JsonEmitter = JsonEmitter;

pub struct JsonEmitter;

impl Emitter for JsonEmitter {
    fn language(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn emit(&self, module: &Module) -> Result<String, EmitError> {
        Ok(emit_json(module)?)
    }
}

/// Pretty-printed JSON for a converted module.
pub fn emit_json(module: &Module) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(module)
}
