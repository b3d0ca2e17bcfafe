//! Input readers - turn front-end output into the source tree.

#[cfg(feature = "read-json")]
pub mod json;

#[cfg(feature = "read-json")]
pub use json::{JSON_READER, JsonReader, read_json};
