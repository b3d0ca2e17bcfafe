//! Bidirectional type-name mapping between C# and the target language.
//!
//! Purely textual. Names the tables do not know pass through unchanged in
//! both directions.
//!
//! ```text
//! C#                         target
//! ─────────────────────      ─────────────────────
//! int?                   <-> ?i32
//! string[]               <-> [str]
//! Dictionary<string, T>  <-> Dict<str, T>
//! Func<int, bool>        <-> fn(i32) -> bool
//! (int, string)          <-> (i32, str)
//! ```
//!
//! The target side also has an expanded spelling (`INT[bits=32][signed=true]`)
//! for emitters that want explicit widths; see [`expand`] and [`collapse`].

/// C# keyword ↔ target primitive.
const PRIMITIVES: &[(&str, &str)] = &[
    ("int", "i32"),
    ("long", "i64"),
    ("short", "i16"),
    ("sbyte", "i8"),
    ("uint", "u32"),
    ("ulong", "u64"),
    ("ushort", "u16"),
    ("byte", "u8"),
    ("float", "f32"),
    ("double", "f64"),
    ("decimal", "dec"),
    ("bool", "bool"),
    ("char", "char"),
    ("string", "str"),
    ("object", "any"),
    ("void", "void"),
];

/// CLR type names; these map forward only.
const CLR_ALIASES: &[(&str, &str)] = &[
    ("Int32", "int"),
    ("Int64", "long"),
    ("Int16", "short"),
    ("SByte", "sbyte"),
    ("UInt32", "uint"),
    ("UInt64", "ulong"),
    ("UInt16", "ushort"),
    ("Byte", "byte"),
    ("Single", "float"),
    ("Double", "double"),
    ("Decimal", "decimal"),
    ("Boolean", "bool"),
    ("Char", "char"),
    ("String", "string"),
    ("Object", "object"),
    ("Void", "void"),
];

/// Generic type names that change spelling.
const GENERIC_NAMES: &[(&str, &str)] = &[
    ("List", "List"),
    ("Dictionary", "Dict"),
    ("HashSet", "Set"),
    ("IEnumerable", "Seq"),
    ("Task", "Task"),
];

/// Map a C# type name to the target spelling.
pub fn to_target(source: &str) -> String {
    let s = source.trim();
    if s.is_empty() {
        return String::new();
    }

    if let Some(inner) = s.strip_suffix('?') {
        return format!("?{}", to_target(inner));
    }
    if let Some(inner) = s.strip_suffix("[]") {
        return format!("[{}]", to_target(inner));
    }
    if let Some(inner) = tuple_inner(s) {
        let elements: Vec<String> = split_generic_args(inner)
            .iter()
            .map(|element| map_tuple_element(element, to_target))
            .collect();
        return format!("({})", elements.join(", "));
    }
    if let Some((name, args)) = split_generic(s) {
        let args = split_generic_args(args);
        let mapped: Vec<String> = args.iter().map(|a| to_target(a)).collect();
        return match (name, mapped.as_slice()) {
            ("Nullable" | "System.Nullable", [inner]) => format!("?{inner}"),
            ("Func" | "System.Func", [params @ .., ret]) => {
                format!("fn({}) -> {ret}", params.join(", "))
            }
            ("Action" | "System.Action", params) => format!("fn({})", params.join(", ")),
            _ => {
                let name = lookup(GENERIC_NAMES, name, |&(src, _)| src)
                    .map_or(name, |&(_, dst)| dst);
                format!("{name}<{}>", mapped.join(", "))
            }
        };
    }
    if s == "Action" {
        return "fn()".to_string();
    }

    let bare = s.strip_prefix("System.").unwrap_or(s);
    let keyword = lookup(CLR_ALIASES, bare, |&(clr, _)| clr).map_or(bare, |&(_, kw)| kw);
    match lookup(PRIMITIVES, keyword, |&(src, _)| src) {
        Some((_, dst)) => dst.to_string(),
        None => s.to_string(),
    }
}

/// Map a target type name (plain or expanded) back to C#.
pub fn to_source(target: &str) -> String {
    let s = target.trim();
    if s.is_empty() {
        return String::new();
    }

    if let Some(inner) = s.strip_prefix('?') {
        return format!("{}?", to_source(inner));
    }
    if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return format!("{}[]", to_source(inner));
    }
    if let Some(rest) = s.strip_prefix("fn(") {
        if let Some(close) = matching_close(rest) {
            let params: Vec<String> = split_generic_args(&rest[..close])
                .iter()
                .map(|p| to_source(p))
                .collect();
            let tail = rest[close + 1..].trim();
            return match tail.strip_prefix("->") {
                Some(ret) => {
                    let mut args = params;
                    args.push(to_source(ret));
                    format!("Func<{}>", args.join(", "))
                }
                None if params.is_empty() => "Action".to_string(),
                None => format!("Action<{}>", params.join(", ")),
            };
        }
        return s.to_string();
    }
    if let Some(inner) = tuple_inner(s) {
        let elements: Vec<String> = split_generic_args(inner)
            .iter()
            .map(|element| map_tuple_element(element, to_source))
            .collect();
        return format!("({})", elements.join(", "));
    }
    if parse_expanded(s).is_some() {
        let collapsed = collapse(s);
        if collapsed != s {
            return to_source(&collapsed);
        }
        return s.to_string();
    }
    if let Some((name, args)) = split_generic(s) {
        let mapped: Vec<String> = split_generic_args(args)
            .iter()
            .map(|a| to_source(a))
            .collect();
        let name = lookup(GENERIC_NAMES, name, |&(_, dst)| dst).map_or(name, |&(src, _)| src);
        return format!("{name}<{}>", mapped.join(", "));
    }

    match lookup(PRIMITIVES, s, |&(_, dst)| dst) {
        Some((src, _)) => src.to_string(),
        None => s.to_string(),
    }
}

/// Split a generic argument list at top-level commas.
///
/// Nesting is tracked across `<>`, `()` and `[]`; the `>` of a `->` arrow
/// never closes a bracket. Each argument is trimmed.
pub fn split_generic_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut prev = '\0';
    for (i, c) in args.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' if prev == '-' => {}
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(args[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
        prev = c;
    }
    let last = args[start..].trim();
    if !last.is_empty() || !out.is_empty() {
        out.push(last.to_string());
    }
    out
}

/// Rewrite a target type name into its expanded spelling.
///
/// `i32` becomes `INT[bits=32][signed=true]`, `?T` becomes `OPTION[inner=T]`,
/// `[T]` becomes `ARRAY[element=T]`, `Result<T, E>` becomes
/// `RESULT[ok=T][err=E]`. Generic arguments are expanded recursively.
pub fn expand(target: &str) -> String {
    let s = target.trim();
    if let Some(inner) = s.strip_prefix('?') {
        return format!("OPTION[inner={}]", expand(inner));
    }
    if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return format!("ARRAY[element={}]", expand(inner));
    }
    if let Some((name, args)) = split_generic(s) {
        let args: Vec<String> = split_generic_args(args).iter().map(|a| expand(a)).collect();
        if name == "Result" && args.len() == 2 {
            return format!("RESULT[ok={}][err={}]", args[0], args[1]);
        }
        return format!("{name}<{}>", args.join(", "));
    }
    match s {
        "bool" => "BOOL".to_string(),
        "str" => "STRING".to_string(),
        "char" => "CHAR".to_string(),
        "f32" => "FLOAT[bits=32]".to_string(),
        "f64" => "FLOAT[bits=64]".to_string(),
        _ => match int_width(s) {
            Some((bits, signed)) => format!("INT[bits={bits}][signed={signed}]"),
            None => s.to_string(),
        },
    }
}

/// Inverse of [`expand`]. Anything that is not an expanded form passes
/// through unchanged.
pub fn collapse(expanded: &str) -> String {
    let s = expanded.trim();
    if let Some((keyword, attrs)) = parse_expanded(s) {
        let attr = |key: &str| {
            attrs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| *v)
        };
        let collapsed = match keyword {
            "BOOL" if attrs.is_empty() => Some("bool".to_string()),
            "STRING" if attrs.is_empty() => Some("str".to_string()),
            "CHAR" if attrs.is_empty() => Some("char".to_string()),
            "INT" => {
                let bits = attr("bits").unwrap_or("32");
                let signed = attr("signed").unwrap_or("true") == "true";
                matches!(bits, "8" | "16" | "32" | "64")
                    .then(|| format!("{}{bits}", if signed { "i" } else { "u" }))
            }
            "FLOAT" => match attr("bits").unwrap_or("64") {
                bits @ ("32" | "64") => Some(format!("f{bits}")),
                _ => None,
            },
            "OPTION" => attr("inner").map(|inner| format!("?{}", collapse(inner))),
            "ARRAY" => attr("element").map(|element| format!("[{}]", collapse(element))),
            "RESULT" => match (attr("ok"), attr("err")) {
                (Some(ok), Some(err)) => {
                    Some(format!("Result<{}, {}>", collapse(ok), collapse(err)))
                }
                _ => None,
            },
            _ => None,
        };
        return collapsed.unwrap_or_else(|| s.to_string());
    }
    if let Some((name, args)) = split_generic(s) {
        let args: Vec<String> = split_generic_args(args).iter().map(|a| collapse(a)).collect();
        return format!("{name}<{}>", args.join(", "));
    }
    s.to_string()
}

fn lookup<'a, F>(
    table: &'a [(&'static str, &'static str)],
    key: &str,
    field: F,
) -> Option<&'a (&'static str, &'static str)>
where
    F: Fn(&(&'static str, &'static str)) -> &'static str,
{
    table.iter().find(|entry| field(entry) == key)
}

fn int_width(s: &str) -> Option<(u32, bool)> {
    let signed = match s.as_bytes().first()? {
        b'i' => true,
        b'u' => false,
        _ => return None,
    };
    match &s[1..] {
        "8" => Some((8, signed)),
        "16" => Some((16, signed)),
        "32" => Some((32, signed)),
        "64" => Some((64, signed)),
        _ => None,
    }
}

/// `Name<args>` → `("Name", "args")`, only when the outer `<` closes at the end.
fn split_generic(s: &str) -> Option<(&str, &str)> {
    let open = s.find('<')?;
    let inner = s[open + 1..].strip_suffix('>')?;
    let name = s[..open].trim();
    if name.is_empty() || name.contains(['(', '[', ' ']) {
        return None;
    }
    Some((name, inner))
}

/// `(A, B)` → `"A, B"` when the parentheses enclose the whole string.
fn tuple_inner(s: &str) -> Option<&str> {
    let rest = s.strip_prefix('(')?;
    let close = matching_close(rest)?;
    (close == rest.len() - 1).then(|| &rest[..close])
}

/// Index of the `)` that closes an already-consumed `(`.
fn matching_close(rest: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in rest.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Tuple elements may carry a name: `int count` → `i32 count`.
fn map_tuple_element(element: &str, map: fn(&str) -> String) -> String {
    let mut depth = 0usize;
    let mut split_at = None;
    for (i, c) in element.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ' ' if depth == 0 => split_at = Some(i),
            _ => {}
        }
    }
    match split_at {
        Some(i) => {
            let (ty, name) = element.split_at(i);
            let name = name.trim();
            if !ty.trim().ends_with("->")
                && name.chars().all(|c| c.is_alphanumeric() || c == '_')
            {
                format!("{} {name}", map(ty))
            } else {
                map(element)
            }
        }
        None => map(element),
    }
}

/// `KEYWORD[k=v][k=v]` with nested brackets allowed in values.
fn parse_expanded(s: &str) -> Option<(&str, Vec<(&str, &str)>)> {
    let keyword_end = s.find('[').unwrap_or(s.len());
    let keyword = &s[..keyword_end];
    if keyword.is_empty() || !keyword.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    let mut attrs = Vec::new();
    let mut rest = &s[keyword_end..];
    while let Some(body) = rest.strip_prefix('[') {
        let mut depth = 0usize;
        let mut close = None;
        for (i, c) in body.char_indices() {
            match c {
                '[' => depth += 1,
                ']' if depth == 0 => {
                    close = Some(i);
                    break;
                }
                ']' => depth -= 1,
                _ => {}
            }
        }
        let close = close?;
        let (key, value) = body[..close].split_once('=')?;
        attrs.push((key.trim(), value.trim()));
        rest = &body[close + 1..];
    }
    rest.is_empty().then_some((keyword, attrs))
}
