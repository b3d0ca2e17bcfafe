//! Conversion errors.

use crate::traits::ReadError;

/// Failures that stop a conversion, or one declaration of it.
///
/// Most problems never become errors: unsupported constructs degrade to
/// fallback nodes and are reported as issues on the context.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The front end could not produce a tree. Fatal for the whole job.
    #[error(transparent)]
    Parse(#[from] ReadError),

    /// A malformed declaration. The walker records it and moves on.
    #[error("{line}:{column}: {message}")]
    Conversion {
        message: String,
        line: u32,
        column: u32,
    },
}

impl ConvertError {
    pub fn conversion(message: impl Into<String>, span: crate::source::Span) -> Self {
        ConvertError::Conversion {
            message: message.into(),
            line: span.line,
            column: span.column,
        }
    }
}
