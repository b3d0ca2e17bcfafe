//! C# syntax trees to an effect-explicit target syntax tree.
//!
//! `normalize-migrate` is the core of an incremental migration tool: it takes
//! a C# compilation unit (already parsed by an external front end) and
//! produces a structured module for a language with no method chaining, no
//! embedded assignment and explicit effect annotations. Printing the result
//! is left to external tools.
//!
//! # Architecture
//!
//! ```text
//! front end            source tree        converter               target
//! ─────────────    ─────────────────    ─────────────────────    ──────────
//! JSON (reader) ─> CompilationUnit ──> SourceTreeWalker      ──> ir::Module
//!                   (source/)            ├ Converter (stmts,       (ir/)
//!                                        │  exprs, patterns)         │
//!                                        ├ chain decomposition       v
//!                                        └ EffectInferencer       emitter
//! ```
//!
//! Conversion is total. Constructs that cannot be expressed become fallback
//! nodes carrying the original text, with a matching warning in
//! [`ConversionResult::issues`] and a workaround from the [`capability`]
//! registry.
//!
//! # Example
//!
//! ```ignore
//! use normalize_migrate::{ConversionOptions, convert_source, input::JSON_READER};
//!
//! let result = convert_source(&JSON_READER, &front_end_json, &ConversionOptions::default())?;
//! for issue in result.warnings() {
//!     eprintln!("{}:{}: {}", issue.line, issue.column, issue.message);
//! }
//! let json = normalize_migrate::output::emit_json(&result.module)?;
//! ```
//!
//! # Note on Translation Fidelity
//!
//! This is a structural migration aid. Type names are mapped textually and
//! shape heuristics (string-like receivers, event-like names) stand in for
//! semantic analysis, so converted code is meant to be reviewed.

pub mod capability;
pub mod chain;
pub mod config;
pub mod context;
pub mod convert;
pub mod effects;
pub mod error;
pub mod ir;
pub mod native;
pub mod source;
pub mod traits;
pub mod types;
pub mod walker;

pub mod input;
pub mod output;

// Re-exports: core types
pub use config::{ConfigError, ConversionOptions};
pub use context::{
    ConversionContext, ConversionIssue, ConversionResult, ConversionStats, IssueKind, Severity,
};
pub use convert::{Converter, Hoists};
pub use effects::{BUILTIN_EFFECTS, EffectAnnotation, EffectCategory, EffectLookup};
pub use error::ConvertError;
pub use source::CompilationUnit;
pub use walker::SourceTreeWalker;

// Re-exports: Traits
pub use traits::{EmitError, Emitter, ReadError, SourceReader};

// Re-exports: Built-in readers
#[cfg(feature = "read-json")]
pub use input::{JSON_READER, JsonReader, read_json};

// Re-exports: Built-in writers
#[cfg(feature = "write-json")]
pub use output::{JSON_EMITTER, JsonEmitter, emit_json};

/// Convert a compilation unit with the built-in effect table.
pub fn convert(unit: &CompilationUnit, options: &ConversionOptions) -> ConversionResult {
    convert_with(unit, options, &BUILTIN_EFFECTS)
}

/// Convert a compilation unit with a caller-supplied effect table.
pub fn convert_with(
    unit: &CompilationUnit,
    options: &ConversionOptions,
    effects: &dyn EffectLookup,
) -> ConversionResult {
    let _span = tracing::debug_span!("convert", usings = unit.usings.len()).entered();
    let mut ctx = ConversionContext::new();
    let module = SourceTreeWalker::new(Converter::new(&mut ctx, options, effects)).walk(unit);
    let result = ctx.into_result(module);
    tracing::debug!(
        issues = result.issues.len(),
        fallbacks = result.stats.fallbacks,
        "conversion finished"
    );
    result
}

/// Read front-end output and convert it. A reader failure is the only error;
/// nothing is converted in that case.
pub fn convert_source(
    reader: &dyn SourceReader,
    source: &str,
    options: &ConversionOptions,
) -> Result<ConversionResult, ConvertError> {
    let unit = reader.read(source)?;
    Ok(convert(&unit, options))
}
