//! Capability registry: how well each source-language feature converts.
//!
//! The catalog is static and immutable. Every degrade path in the converter
//! looks its feature up here so the emitted fallback carries the catalog's
//! workaround text.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// How completely a feature converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportLevel {
    Full,
    Partial,
    NotSupported,
    ManualRequired,
}

impl SupportLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SupportLevel::Full => "full",
            SupportLevel::Partial => "partial",
            SupportLevel::NotSupported => "not-supported",
            SupportLevel::ManualRequired => "manual-required",
        }
    }

    /// Output for this feature needs a human look.
    pub fn needs_review(self) -> bool {
        !matches!(self, SupportLevel::Full)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureInfo {
    pub name: &'static str,
    pub support: SupportLevel,
    pub description: &'static str,
    pub workaround: Option<&'static str>,
}

const fn feature(
    name: &'static str,
    support: SupportLevel,
    description: &'static str,
    workaround: Option<&'static str>,
) -> FeatureInfo {
    FeatureInfo {
        name,
        support,
        description,
        workaround,
    }
}

use SupportLevel::{Full, ManualRequired, NotSupported, Partial};

static CATALOG: &[FeatureInfo] = &[
    // === Types and members ===
    feature("classes", Full, "Class declarations", None),
    feature("interfaces", Full, "Interface declarations", None),
    feature("enums", Full, "Enum declarations", None),
    feature("delegates", Full, "Delegate type declarations", None),
    feature("generics", Full, "Generic types and methods", None),
    feature("properties", Full, "Properties with get/set/init accessors", None),
    feature("events", Full, "Event declarations and += / -= subscription", None),
    feature(
        "structs",
        Partial,
        "Value-type declarations",
        Some("Converted as classes; review copy semantics at assignment and call sites"),
    ),
    feature(
        "records",
        Partial,
        "Records and record structs",
        Some("Positional parameters become init-only properties; value equality is not generated"),
    ),
    feature(
        "partial-classes",
        Partial,
        "Types split across several declarations",
        Some("Each part converts separately; merge the resulting classes"),
    ),
    feature(
        "static-constructors",
        Partial,
        "Type initializers",
        Some("Runs eagerly in the target; check initialization order"),
    ),
    feature(
        "operator-overloading",
        Partial,
        "User-defined operators",
        Some("Converted to static op_* methods; call sites still use the operator"),
    ),
    feature(
        "conversion-operators",
        Partial,
        "implicit/explicit conversion operators",
        Some("Converted to op_Implicit_/op_Explicit_ methods; insert explicit calls"),
    ),
    feature(
        "indexers",
        Partial,
        "this[...] indexers",
        Some("Converted to get_Item/set_Item methods"),
    ),
    feature(
        "extension-methods",
        Partial,
        "Static methods with a this-modified receiver",
        Some("Receiver kept as the first parameter; call sites need rewriting"),
    ),
    feature(
        "default-interface-methods",
        Partial,
        "Interface members with bodies",
        Some("Bodies are kept; check the target supports default implementations"),
    ),
    feature(
        "finalizers",
        ManualRequired,
        "Destructors",
        Some("Converted to a Finalize method; replace with explicit disposal"),
    ),
    feature(
        "ref-parameters",
        Partial,
        "ref / out / in parameters",
        Some("Return a tuple instead of writing through the parameter"),
    ),
    feature(
        "attributes",
        Partial,
        "Attributes on declarations",
        Some("Attributes are dropped; re-apply target annotations by hand"),
    ),
    // === Statements ===
    feature("exceptions", Full, "try/catch/finally and throw", None),
    feature(
        "exception-filters",
        Partial,
        "catch ... when (filter)",
        Some("Filter kept as a guard; rethrow semantics differ"),
    ),
    feature("using-statement", Full, "using blocks and using declarations", None),
    feature("iterators", Full, "yield return / yield break", None),
    feature("local-functions", Full, "Functions declared inside method bodies", None),
    feature("foreach", Full, "foreach loops, including deconstruction", None),
    feature(
        "switch-statement",
        Full,
        "switch statements with case labels and patterns",
        None,
    ),
    feature(
        "lock-statement",
        Partial,
        "lock (obj) { ... }",
        Some("Body kept without synchronization; use a target mutex"),
    ),
    feature(
        "checked-arithmetic",
        Partial,
        "checked/unchecked blocks and expressions",
        Some("Overflow checking is not preserved; use explicit checked operations"),
    ),
    feature(
        "goto",
        NotSupported,
        "goto, goto case and goto default",
        Some("Restructure with loops, break/continue or a state variable"),
    ),
    feature(
        "labeled-statement",
        NotSupported,
        "Labeled statements",
        Some("Remove the label and restructure the jump that targets it"),
    ),
    feature(
        "unsafe-code",
        NotSupported,
        "unsafe blocks",
        Some("Rewrite with safe APIs or move behind a native boundary"),
    ),
    feature(
        "fixed-statement",
        NotSupported,
        "fixed (T* p = ...) pinning",
        Some("Use safe buffers; pinning has no target equivalent"),
    ),
    feature(
        "unknown-statement",
        NotSupported,
        "Statement kinds the converter does not model",
        Some("Convert by hand"),
    ),
    // === Expressions ===
    feature("lambdas", Full, "Lambda expressions and anonymous methods", None),
    feature("async-await", Full, "async methods and await", None),
    feature("string-interpolation", Full, "Interpolated strings", None),
    feature("null-coalescing", Full, "?? and ??=", None),
    feature("null-conditional", Full, "?. and ?[] access", None),
    feature("object-initializers", Full, "new T { X = 1 }", None),
    feature("collection-initializers", Full, "Collection and dictionary initializers", None),
    feature("tuples", Full, "Tuple literals and tuple types", None),
    feature("nameof", Full, "nameof(...)", None),
    feature("with-expressions", Full, "Non-destructive record mutation", None),
    feature("switch-expressions", Full, "switch expressions", None),
    feature(
        "pattern-matching",
        Partial,
        "is patterns and switch patterns",
        Some("Declaration patterns become a type test plus a cast binding"),
    ),
    feature(
        "list-patterns",
        NotSupported,
        "[a, .., b] list patterns",
        Some("Test the length and index elements explicitly"),
    ),
    feature(
        "combinator-patterns",
        Partial,
        "and / or patterns in switch positions",
        Some("Split into separate cases or use a guard"),
    ),
    feature("linq-method-syntax", Full, "Chained LINQ method calls", None),
    feature(
        "conditional-hoisting",
        Partial,
        "Nested calls in operands that only run on some paths",
        Some("Split the condition into nested if statements"),
    ),
    feature(
        "linq-query-syntax",
        NotSupported,
        "from ... select query expressions",
        Some("Rewrite as method syntax: Where/Select/OrderBy chains"),
    ),
    feature(
        "embedded-assignment",
        NotSupported,
        "Assignments and increments used as values",
        Some("Move the assignment into its own statement before the use"),
    ),
    feature(
        "throw-expressions",
        NotSupported,
        "throw used as an expression",
        Some("Replace with an if statement that throws"),
    ),
    feature(
        "ranges",
        NotSupported,
        "Range (a..b) and index-from-end (^n) expressions",
        Some("Use explicit slice or length arithmetic"),
    ),
    feature(
        "pointers",
        NotSupported,
        "Pointer types, address-of and dereference",
        Some("Rewrite with references or indices"),
    ),
    feature(
        "stackalloc",
        NotSupported,
        "stackalloc buffers",
        Some("Use a fixed-size array"),
    ),
    feature(
        "sizeof",
        NotSupported,
        "sizeof(T)",
        Some("Replace with a constant"),
    ),
    feature(
        "dynamic",
        NotSupported,
        "dynamic typing",
        Some("Introduce an explicit interface"),
    ),
    feature(
        "reflection",
        ManualRequired,
        "typeof/GetType-driven reflection",
        Some("Replace reflective access with explicit code"),
    ),
    feature(
        "unknown-expression",
        NotSupported,
        "Expression kinds the converter does not model",
        Some("Convert by hand"),
    ),
];

fn index() -> &'static HashMap<String, &'static FeatureInfo> {
    static INDEX: OnceLock<HashMap<String, &'static FeatureInfo>> = OnceLock::new();
    INDEX.get_or_init(|| {
        CATALOG
            .iter()
            .map(|info| (info.name.to_ascii_lowercase(), info))
            .collect()
    })
}

/// Look a feature up by name (case-insensitive).
pub fn lookup(name: &str) -> Option<&'static FeatureInfo> {
    index().get(&name.to_ascii_lowercase()).copied()
}

/// Support level for a feature.
///
/// Unknown features are assumed `Full`.
pub fn support_level(name: &str) -> SupportLevel {
    lookup(name).map_or(SupportLevel::Full, |info| info.support)
}

pub fn workaround(name: &str) -> Option<&'static str> {
    lookup(name).and_then(|info| info.workaround)
}

/// The whole catalog, sorted by name.
pub fn features() -> Vec<&'static FeatureInfo> {
    let mut all: Vec<_> = CATALOG.iter().collect();
    all.sort_by_key(|info| info.name);
    all
}

/// Features at the given support level, sorted by name.
pub fn features_at(level: SupportLevel) -> Vec<&'static FeatureInfo> {
    features()
        .into_iter()
        .filter(|info| info.support == level)
        .collect()
}
