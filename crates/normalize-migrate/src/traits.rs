//! Traits for source readers and target emitters.

use crate::ir::Module;
use crate::source::CompilationUnit;

/// Error that can occur when reading a source tree.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported syntax: {0}")]
    Unsupported(String),

    #[error("malformed syntax tree: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error that can occur when rendering a converted module.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("failed to serialize module: {0}")]
    Json(#[from] serde_json::Error),
}

/// A reader turns front-end output into the input syntax tree.
pub trait SourceReader: Send + Sync {
    /// Format identifier (e.g., "json").
    fn language(&self) -> &'static str;

    /// File extensions this reader handles (e.g., &["json"]).
    fn extensions(&self) -> &'static [&'static str];

    /// Parse front-end output into a compilation unit.
    fn read(&self, source: &str) -> Result<CompilationUnit, ReadError>;
}

/// An emitter renders a converted module for an external printer.
pub trait Emitter: Send + Sync {
    /// Format identifier (e.g., "json").
    fn language(&self) -> &'static str;

    /// File extension for output (e.g., "json").
    fn extension(&self) -> &'static str;

    /// Render the module.
    fn emit(&self, module: &Module) -> Result<String, EmitError>;
}
