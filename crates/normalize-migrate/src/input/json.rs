//! JSON reader for syntax trees serialized by an external C# front end.

use crate::source::CompilationUnit;
use crate::traits::{ReadError, SourceReader};

/// Static instance of the JSON reader.
pub static JSON_READER: JsonReader = JsonReader;

/// Reads a [`CompilationUnit`] serialized as JSON.
pub struct JsonReader;

impl SourceReader for JsonReader {
    fn language(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn read(&self, source: &str) -> Result<CompilationUnit, ReadError> {
        read_json(source)
    }
}

/// Parse a JSON-serialized compilation unit.
pub fn read_json(source: &str) -> Result<CompilationUnit, ReadError> {
    if source.trim().is_empty() {
        return Err(ReadError::Parse("empty input".into()));
    }
    Ok(serde_json::from_str(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Declaration, ExprKind, StmtKind};

    #[test]
    fn test_read_global_statement() {
        let json = r#"{
            "members": [
                {"global_statement": {
                    "kind": {"expr": {"kind": {"ident": "x"}, "span": {"line": 1, "column": 1}}},
                    "span": {"line": 1, "column": 1},
                    "text": "x;"
                }}
            ]
        }"#;
        let unit = read_json(json).unwrap();
        assert!(unit.usings.is_empty());
        match &unit.members[0] {
            Declaration::GlobalStatement(stmt) => {
                assert_eq!(stmt.text.as_deref(), Some("x;"));
                match &stmt.kind {
                    StmtKind::Expr(e) => assert_eq!(e.kind, ExprKind::Ident("x".into())),
                    _ => panic!("expected expression statement"),
                }
            }
            _ => panic!("expected global statement"),
        }
    }

    #[test]
    fn test_read_errors() {
        assert!(matches!(read_json("   "), Err(ReadError::Parse(_))));
        assert!(matches!(read_json("{\"members\": 3}"), Err(ReadError::Json(_))));
    }

    #[test]
    fn test_reader_metadata() {
        assert_eq!(JSON_READER.language(), "json");
        assert_eq!(JSON_READER.extensions(), &["json"]);
    }
}
