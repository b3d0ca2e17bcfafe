//! Shape predicates shared by expression conversion and chain hoisting.
//!
//! Everything here inspects syntax only. There is no type information, so
//! whether `x.Contains(y)` is a string search or a collection lookup is
//! decided from how `x` is spelled. Both the statement-level chain decomposer
//! and the expression-level hoist call [`classify`]; they must agree, or a
//! chain would be split twice.

use crate::source::{BinaryOp, Expr, ExprKind, Literal};

/// A target-native operation replacing an idiomatic library call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeOp {
    StrLen,
    StrIsEmpty,
    StrIsBlank,
    StrJoin,
    StrConcat,
    StrContains,
    StrStartsWith,
    StrEndsWith,
    StrIndexOf,
    StrLastIndexOf,
    StrUpper,
    StrLower,
    StrTrim,
    StrTrimStart,
    StrTrimEnd,
    StrSubstring,
    StrPadLeft,
    StrPadRight,
    StrSplit,
    StrReplace,
    CharIsDigit,
    CharIsLetter,
    CharIsLetterOrDigit,
    CharIsWhitespace,
    CharIsUpper,
    CharIsLower,
    CharToUpper,
    CharToLower,
    RegexTest,
    RegexMatch,
    RegexReplace,
    RegexSplit,
    SbNew,
    SbAppend,
    SbAppendLine,
    SbInsert,
    SbClear,
    SbToString,
    SbLen,
}

impl NativeOp {
    pub fn tag(self) -> &'static str {
        match self {
            NativeOp::StrLen => "str.len",
            NativeOp::StrIsEmpty => "str.is_empty",
            NativeOp::StrIsBlank => "str.is_blank",
            NativeOp::StrJoin => "str.join",
            NativeOp::StrConcat => "str.concat",
            NativeOp::StrContains => "str.contains",
            NativeOp::StrStartsWith => "str.starts_with",
            NativeOp::StrEndsWith => "str.ends_with",
            NativeOp::StrIndexOf => "str.index_of",
            NativeOp::StrLastIndexOf => "str.last_index_of",
            NativeOp::StrUpper => "str.upper",
            NativeOp::StrLower => "str.lower",
            NativeOp::StrTrim => "str.trim",
            NativeOp::StrTrimStart => "str.trim_start",
            NativeOp::StrTrimEnd => "str.trim_end",
            NativeOp::StrSubstring => "str.substring",
            NativeOp::StrPadLeft => "str.pad_left",
            NativeOp::StrPadRight => "str.pad_right",
            NativeOp::StrSplit => "str.split",
            NativeOp::StrReplace => "str.replace",
            NativeOp::CharIsDigit => "char.is_digit",
            NativeOp::CharIsLetter => "char.is_letter",
            NativeOp::CharIsLetterOrDigit => "char.is_alnum",
            NativeOp::CharIsWhitespace => "char.is_whitespace",
            NativeOp::CharIsUpper => "char.is_upper",
            NativeOp::CharIsLower => "char.is_lower",
            NativeOp::CharToUpper => "char.upper",
            NativeOp::CharToLower => "char.lower",
            NativeOp::RegexTest => "regex.test",
            NativeOp::RegexMatch => "regex.match",
            NativeOp::RegexReplace => "regex.replace",
            NativeOp::RegexSplit => "regex.split",
            NativeOp::SbNew => "sb.new",
            NativeOp::SbAppend => "sb.append",
            NativeOp::SbAppendLine => "sb.append_line",
            NativeOp::SbInsert => "sb.insert",
            NativeOp::SbClear => "sb.clear",
            NativeOp::SbToString => "sb.to_string",
            NativeOp::SbLen => "sb.len",
        }
    }

    /// The operation yields a string.
    pub fn returns_string(self) -> bool {
        matches!(
            self,
            NativeOp::StrJoin
                | NativeOp::StrConcat
                | NativeOp::StrUpper
                | NativeOp::StrLower
                | NativeOp::StrTrim
                | NativeOp::StrTrimStart
                | NativeOp::StrTrimEnd
                | NativeOp::StrSubstring
                | NativeOp::StrPadLeft
                | NativeOp::StrPadRight
                | NativeOp::StrReplace
                | NativeOp::RegexReplace
                | NativeOp::SbToString
        )
    }

    /// The operation yields the builder it was called on.
    pub fn returns_builder(self) -> bool {
        matches!(
            self,
            NativeOp::SbNew
                | NativeOp::SbAppend
                | NativeOp::SbAppendLine
                | NativeOp::SbInsert
                | NativeOp::SbClear
        )
    }
}

/// Result of classifying a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeCall {
    pub op: NativeOp,
    /// The receiver becomes the first argument (instance calls). Static
    /// calls such as `string.IsNullOrEmpty(s)` drop the receiver.
    pub takes_receiver: bool,
}

impl NativeCall {
    fn instance(op: NativeOp) -> Option<Self> {
        Some(Self {
            op,
            takes_receiver: true,
        })
    }

    fn static_call(op: NativeOp) -> Option<Self> {
        Some(Self {
            op,
            takes_receiver: false,
        })
    }
}

/// Would `receiver.method(<argc args>)` become a native operation?
pub fn classify(receiver: &Expr, method: &str, argc: usize) -> Option<NativeCall> {
    if let ExprKind::Ident(name) = &receiver.kind {
        match name.as_str() {
            "string" | "String" => {
                return match (method, argc) {
                    ("IsNullOrEmpty", 1) => NativeCall::static_call(NativeOp::StrIsEmpty),
                    ("IsNullOrWhiteSpace", 1) => NativeCall::static_call(NativeOp::StrIsBlank),
                    ("Join", n) if n >= 2 => NativeCall::static_call(NativeOp::StrJoin),
                    ("Concat", n) if n >= 1 => NativeCall::static_call(NativeOp::StrConcat),
                    _ => None,
                };
            }
            "char" | "Char" => {
                let op = match method {
                    "IsDigit" => NativeOp::CharIsDigit,
                    "IsLetter" => NativeOp::CharIsLetter,
                    "IsLetterOrDigit" => NativeOp::CharIsLetterOrDigit,
                    "IsWhiteSpace" => NativeOp::CharIsWhitespace,
                    "IsUpper" => NativeOp::CharIsUpper,
                    "IsLower" => NativeOp::CharIsLower,
                    "ToUpper" => NativeOp::CharToUpper,
                    "ToLower" => NativeOp::CharToLower,
                    _ => return None,
                };
                return if argc == 1 {
                    NativeCall::static_call(op)
                } else {
                    None
                };
            }
            "Regex" => {
                return match (method, argc) {
                    ("IsMatch", 2) => NativeCall::static_call(NativeOp::RegexTest),
                    ("Match", 2) => NativeCall::static_call(NativeOp::RegexMatch),
                    ("Replace", 3) => NativeCall::static_call(NativeOp::RegexReplace),
                    ("Split", 2) => NativeCall::static_call(NativeOp::RegexSplit),
                    _ => None,
                };
            }
            _ => {}
        }
    }

    if is_builder_like(receiver) {
        return match (method, argc) {
            ("Append", 1) => NativeCall::instance(NativeOp::SbAppend),
            ("AppendLine", 0 | 1) => NativeCall::instance(NativeOp::SbAppendLine),
            ("Insert", 2) => NativeCall::instance(NativeOp::SbInsert),
            ("Clear", 0) => NativeCall::instance(NativeOp::SbClear),
            ("ToString", 0) => NativeCall::instance(NativeOp::SbToString),
            _ => None,
        };
    }

    let op = match (method, argc) {
        ("StartsWith", 1) => NativeOp::StrStartsWith,
        ("EndsWith", 1) => NativeOp::StrEndsWith,
        ("ToUpper" | "ToUpperInvariant", 0) => NativeOp::StrUpper,
        ("ToLower" | "ToLowerInvariant", 0) => NativeOp::StrLower,
        ("Trim", 0) => NativeOp::StrTrim,
        ("TrimStart", 0) => NativeOp::StrTrimStart,
        ("TrimEnd", 0) => NativeOp::StrTrimEnd,
        ("Substring", 1 | 2) => NativeOp::StrSubstring,
        ("PadLeft", 1 | 2) => NativeOp::StrPadLeft,
        ("PadRight", 1 | 2) => NativeOp::StrPadRight,
        ("Split", n) if n >= 1 => NativeOp::StrSplit,
        ("Replace", 2) => NativeOp::StrReplace,
        // Shared with collections; only when the receiver reads as a string.
        ("Contains", 1) if is_string_like(receiver) => NativeOp::StrContains,
        ("IndexOf", 1 | 2) if is_string_like(receiver) => NativeOp::StrIndexOf,
        ("LastIndexOf", 1) if is_string_like(receiver) => NativeOp::StrLastIndexOf,
        _ => return None,
    };
    NativeCall::instance(op)
}

/// Property reads: `s.Length`, `sb.Length`.
pub fn classify_member(receiver: &Expr, name: &str) -> Option<NativeOp> {
    match name {
        "Length" if is_builder_like(receiver) => Some(NativeOp::SbLen),
        "Length" if is_string_like(receiver) => Some(NativeOp::StrLen),
        _ => None,
    }
}

/// `new StringBuilder()` / `new StringBuilder(initial)`.
pub fn classify_new(ty: &str, argc: usize) -> Option<NativeOp> {
    let bare = ty.rsplit('.').next().unwrap_or(ty);
    (bare == "StringBuilder" && argc <= 1).then_some(NativeOp::SbNew)
}

/// Receiver-name fragments that suggest a string.
const STRING_HINTS: &[&str] = &[
    "str", "text", "name", "path", "line", "word", "title", "message", "msg", "label", "prefix",
    "suffix", "input", "content", "description", "url", "email", "query", "token",
];

/// Does this expression read as a string value?
pub fn is_string_like(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Literal(Literal::String(_)) => true,
        ExprKind::Interpolated(_) => true,
        ExprKind::Ident(name) => name_suggests_string(name),
        ExprKind::Member { name, .. } => name_suggests_string(name),
        ExprKind::Invoke { callee, args } => match &callee.kind {
            ExprKind::Member { object, name, .. } => {
                name == "ToString"
                    || classify(object, name, args.len()).is_some_and(|c| c.op.returns_string())
            }
            _ => false,
        },
        ExprKind::Binary { op, left, right } => {
            *op == BinaryOp::Add && (is_string_like(left) || is_string_like(right))
        }
        ExprKind::Conditional {
            then, otherwise, ..
        } => is_string_like(then) && is_string_like(otherwise),
        _ => false,
    }
}

fn name_suggests_string(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if lower == "s" {
        return true;
    }
    // Plurals name collections of strings.
    if lower.ends_with('s') && !lower.ends_with("ss") {
        return false;
    }
    STRING_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Does this expression read as a `StringBuilder`?
pub fn is_builder_like(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(name) | ExprKind::Member { name, .. } => {
            let lower = name.to_ascii_lowercase();
            lower == "sb" || lower.ends_with("builder")
        }
        ExprKind::New { ty: Some(ty), args, .. } => classify_new(ty, args.len()).is_some(),
        ExprKind::Invoke { callee, args } => match &callee.kind {
            ExprKind::Member { object, name, .. } => {
                is_builder_like(object)
                    && classify(object, name, args.len()).is_some_and(|c| c.op.returns_builder())
            }
            _ => false,
        },
        _ => false,
    }
}

/// Event-name heuristic for `+=` / `-=`.
///
/// Capitalized names with a conventional event suffix. `Counter += 1` is
/// not an event; `Button.Clicked += handler` is.
pub fn is_event_like(name: &str) -> bool {
    const SUFFIXES: &[&str] = &[
        "Changed",
        "Changing",
        "Click",
        "Clicked",
        "Handler",
        "Event",
        "Received",
        "Completed",
        "Occurred",
        "Raised",
        "Requested",
        "Updated",
    ];
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && SUFFIXES.iter().any(|s| name.ends_with(s))
}
