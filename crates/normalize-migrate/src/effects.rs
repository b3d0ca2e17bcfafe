//! Coarse side-effect inference over converted bodies.
//!
//! A read-only pass: walks a converted method body once and collects
//! `(category, value)` tags for calls the [`EffectLookup`] knows about.

use crate::ir::{CollectionItem, Expr, InterpolationPart, LambdaBody, Stmt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    Io,
    Mutation,
    Nondeterminism,
    Exception,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Effect {
    pub category: EffectCategory,
    pub value: String,
}

impl Effect {
    pub fn new(category: EffectCategory, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
        }
    }
}

/// Effects of one callable, grouped by category with duplicates merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectAnnotation {
    effects: BTreeMap<EffectCategory, BTreeSet<String>>,
}

impl EffectAnnotation {
    pub fn add(&mut self, effect: Effect) {
        self.effects
            .entry(effect.category)
            .or_default()
            .insert(effect.value);
    }

    pub fn contains(&self, category: EffectCategory, value: &str) -> bool {
        self.effects
            .get(&category)
            .is_some_and(|values| values.contains(value))
    }

    pub fn has_category(&self, category: EffectCategory) -> bool {
        self.effects.contains_key(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// All `(category, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (EffectCategory, &str)> {
        self.effects
            .iter()
            .flat_map(|(cat, values)| values.iter().map(move |v| (*cat, v.as_str())))
    }
}

/// Source of known effectful call targets.
///
/// Keys are `Receiver.Method` (`Console.WriteLine`), bare method names
/// (`Add`), `Type..ctor` for construction, native-operation tags
/// (`sb.append`) and member reads (`DateTime.Now`).
pub trait EffectLookup {
    fn effects_of(&self, target: &str) -> Vec<Effect>;
}

impl<F> EffectLookup for F
where
    F: Fn(&str) -> Vec<Effect>,
{
    fn effects_of(&self, target: &str) -> Vec<Effect> {
        self(target)
    }
}

/// Built-in table of well-known .NET library effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEffects;

pub static BUILTIN_EFFECTS: BuiltinEffects = BuiltinEffects;

use EffectCategory::{Exception, Io, Memory, Mutation, Nondeterminism};

const BUILTIN_TABLE: &[(&str, EffectCategory, &str)] = &[
    // Console
    ("Console.WriteLine", Io, "console"),
    ("Console.Write", Io, "console"),
    ("Console.ReadLine", Io, "console"),
    ("Console.ReadKey", Io, "console"),
    ("Console.Clear", Io, "console"),
    // Files
    ("File.ReadAllText", Io, "file"),
    ("File.ReadAllLines", Io, "file"),
    ("File.ReadAllBytes", Io, "file"),
    ("File.WriteAllText", Io, "file"),
    ("File.WriteAllLines", Io, "file"),
    ("File.WriteAllBytes", Io, "file"),
    ("File.AppendAllText", Io, "file"),
    ("File.Exists", Io, "file"),
    ("File.Delete", Io, "file"),
    ("File.Copy", Io, "file"),
    ("File.Move", Io, "file"),
    ("File.Open", Io, "file"),
    ("File.OpenRead", Io, "file"),
    ("File.OpenWrite", Io, "file"),
    ("File.Create", Io, "file"),
    ("Directory.CreateDirectory", Io, "file"),
    ("Directory.Delete", Io, "file"),
    ("Directory.Exists", Io, "file"),
    ("Directory.GetFiles", Io, "file"),
    ("Directory.EnumerateFiles", Io, "file"),
    ("FileStream..ctor", Io, "file"),
    ("StreamReader..ctor", Io, "file"),
    ("StreamWriter..ctor", Io, "file"),
    // Network
    ("HttpClient..ctor", Io, "network"),
    ("GetAsync", Io, "network"),
    ("PostAsync", Io, "network"),
    ("PutAsync", Io, "network"),
    ("DeleteAsync", Io, "network"),
    ("SendAsync", Io, "network"),
    ("GetStringAsync", Io, "network"),
    ("Dns.GetHostAddresses", Io, "network"),
    // Environment
    ("Environment.GetEnvironmentVariable", Io, "environment"),
    ("Environment.SetEnvironmentVariable", Io, "environment"),
    ("Environment.Exit", Io, "process"),
    ("Process.Start", Io, "process"),
    // Time
    ("DateTime.Now", Nondeterminism, "time"),
    ("DateTime.UtcNow", Nondeterminism, "time"),
    ("DateTime.Today", Nondeterminism, "time"),
    ("DateTimeOffset.Now", Nondeterminism, "time"),
    ("DateTimeOffset.UtcNow", Nondeterminism, "time"),
    ("Environment.TickCount", Nondeterminism, "time"),
    ("Stopwatch.StartNew", Nondeterminism, "time"),
    ("Thread.Sleep", Nondeterminism, "time"),
    ("Task.Delay", Nondeterminism, "time"),
    // Randomness
    ("Random..ctor", Nondeterminism, "random"),
    ("Random.Shared", Nondeterminism, "random"),
    ("Guid.NewGuid", Nondeterminism, "random"),
    ("Next", Nondeterminism, "random"),
    ("NextDouble", Nondeterminism, "random"),
    ("NextBytes", Nondeterminism, "random"),
    // Parsing
    ("int.Parse", Exception, "parse"),
    ("long.Parse", Exception, "parse"),
    ("double.Parse", Exception, "parse"),
    ("decimal.Parse", Exception, "parse"),
    ("float.Parse", Exception, "parse"),
    ("Int32.Parse", Exception, "parse"),
    ("Int64.Parse", Exception, "parse"),
    ("DateTime.Parse", Exception, "parse"),
    ("Guid.Parse", Exception, "parse"),
    ("Enum.Parse", Exception, "parse"),
    ("Convert.ToInt32", Exception, "parse"),
    ("Convert.ToInt64", Exception, "parse"),
    ("Convert.ToDouble", Exception, "parse"),
    ("Convert.ToDecimal", Exception, "parse"),
    ("JsonSerializer.Deserialize", Exception, "parse"),
    // Collection mutation
    ("Add", Mutation, "collection"),
    ("AddRange", Mutation, "collection"),
    ("Remove", Mutation, "collection"),
    ("RemoveAt", Mutation, "collection"),
    ("RemoveAll", Mutation, "collection"),
    ("Clear", Mutation, "collection"),
    ("Push", Mutation, "collection"),
    ("Pop", Mutation, "collection"),
    ("Enqueue", Mutation, "collection"),
    ("Dequeue", Mutation, "collection"),
    ("Sort", Mutation, "collection"),
    ("TryAdd", Mutation, "collection"),
    ("sb.append", Mutation, "string-builder"),
    ("sb.append_line", Mutation, "string-builder"),
    ("sb.insert", Mutation, "string-builder"),
    ("sb.clear", Mutation, "string-builder"),
    // Memory
    ("Marshal.AllocHGlobal", Memory, "marshal"),
    ("Marshal.FreeHGlobal", Memory, "marshal"),
    ("Marshal.Copy", Memory, "marshal"),
    ("GC.Collect", Memory, "gc"),
    ("GC.SuppressFinalize", Memory, "gc"),
    ("GC.KeepAlive", Memory, "gc"),
];

impl EffectLookup for BuiltinEffects {
    fn effects_of(&self, target: &str) -> Vec<Effect> {
        static INDEX: OnceLock<HashMap<&'static str, Vec<(EffectCategory, &'static str)>>> =
            OnceLock::new();
        let index = INDEX.get_or_init(|| {
            let mut index: HashMap<_, Vec<_>> = HashMap::new();
            for &(key, category, value) in BUILTIN_TABLE {
                index.entry(key).or_default().push((category, value));
            }
            index
        });
        index
            .get(target)
            .map(|entries| {
                entries
                    .iter()
                    .map(|&(category, value)| Effect::new(category, value))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Walks a converted body and aggregates the effects of everything in it.
pub struct EffectInferencer<'a> {
    lookup: &'a dyn EffectLookup,
    found: EffectAnnotation,
}

impl<'a> EffectInferencer<'a> {
    pub fn new(lookup: &'a dyn EffectLookup) -> Self {
        Self {
            lookup,
            found: EffectAnnotation::default(),
        }
    }

    /// Effects of `body`, or `None` when nothing effectful was found.
    pub fn infer(lookup: &'a dyn EffectLookup, body: &[Stmt]) -> Option<EffectAnnotation> {
        let mut inferencer = Self::new(lookup);
        inferencer.visit_block(body);
        inferencer.finish()
    }

    pub fn finish(self) -> Option<EffectAnnotation> {
        (!self.found.is_empty()).then_some(self.found)
    }

    /// Add the effects of the first key that resolves.
    fn resolve<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = String>,
    {
        for key in keys {
            let effects = self.lookup.effects_of(&key);
            if !effects.is_empty() {
                for effect in effects {
                    self.found.add(effect);
                }
                return;
            }
        }
    }

    pub fn visit_block(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.visit_stmt(stmt);
        }
    }

    pub fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Bind { init, .. } => {
                if let Some(init) = init {
                    self.visit_expr(init);
                }
            }
            Stmt::Assign { target, value } | Stmt::CompoundAssign { target, value, .. } => {
                self.visit_expr(target);
                self.visit_expr(value);
            }
            Stmt::Subscribe { event, handler } | Stmt::Unsubscribe { event, handler } => {
                self.visit_expr(event);
                self.visit_expr(handler);
            }
            Stmt::Expr(e) | Stmt::Yield(e) => self.visit_expr(e),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                self.visit_expr(cond);
                self.visit_block(then_body);
                if let Some(else_body) = else_body {
                    self.visit_block(else_body);
                }
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                self.visit_block(init);
                if let Some(cond) = cond {
                    self.visit_expr(cond);
                }
                self.visit_block(step);
                self.visit_block(body);
            }
            Stmt::ForRange {
                start,
                end,
                step,
                body,
                ..
            } => {
                self.visit_expr(start);
                self.visit_expr(end);
                self.visit_expr(step);
                self.visit_block(body);
            }
            Stmt::ForEach { iterable, body, .. } => {
                self.visit_expr(iterable);
                self.visit_block(body);
            }
            Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
                self.visit_expr(cond);
                self.visit_block(body);
            }
            Stmt::Try {
                body,
                catches,
                finally,
            } => {
                self.visit_block(body);
                for catch in catches {
                    if let Some(filter) = &catch.filter {
                        self.visit_expr(filter);
                    }
                    self.visit_block(&catch.body);
                }
                if let Some(finally) = finally {
                    self.visit_block(finally);
                }
            }
            Stmt::Match { subject, cases } => {
                self.visit_expr(subject);
                for case in cases {
                    if let Some(guard) = &case.guard {
                        self.visit_expr(guard);
                    }
                    self.visit_block(&case.body);
                }
            }
            Stmt::Throw(value) => {
                if let Some(value) = value {
                    self.visit_expr(value);
                }
                self.found.add(Effect::new(Exception, "throw"));
            }
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            Stmt::Using { resource, body, .. } => {
                self.visit_expr(resource);
                self.visit_block(body);
            }
            Stmt::Block(body) => self.visit_block(body),
            // Local functions carry their own annotation.
            Stmt::LocalFunction(_) => {}
            Stmt::Break | Stmt::Continue | Stmt::YieldBreak | Stmt::Fallback(_) => {}
        }
    }

    pub fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Call { callee, args, .. } => {
                match callee.as_ref() {
                    Expr::Member { object, name } => {
                        self.resolve(call_keys(object, name));
                        self.visit_expr(object);
                    }
                    Expr::Ref(name) => self.resolve([name.clone()]),
                    other => self.visit_expr(other),
                }
                for arg in args {
                    self.visit_expr(&arg.value);
                }
            }
            Expr::Member { object, name } => {
                self.resolve(member_keys(object, name));
                self.visit_expr(object);
            }
            Expr::NativeOp { op, args } => {
                self.resolve([op.clone()]);
                for arg in args {
                    self.visit_expr(arg);
                }
            }
            Expr::New {
                ty,
                args,
                initializers,
            } => {
                if let Some(ty) = ty {
                    let bare = ty.split('<').next().unwrap_or(ty);
                    let short = bare.rsplit('.').next().unwrap_or(bare);
                    self.resolve([format!("{bare}..ctor"), format!("{short}..ctor")]);
                }
                for arg in args {
                    self.visit_expr(&arg.value);
                }
                for init in initializers {
                    self.visit_expr(&init.value);
                }
            }
            Expr::Binary { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            Expr::Unary { operand, .. } => self.visit_expr(operand),
            Expr::Index { object, args } => {
                self.visit_expr(object);
                for arg in args {
                    self.visit_expr(arg);
                }
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.visit_expr(cond);
                self.visit_expr(then);
                self.visit_expr(otherwise);
            }
            Expr::Lambda { body, .. } => match body {
                LambdaBody::Expr(e) => self.visit_expr(e),
                LambdaBody::Block(stmts) => self.visit_block(stmts),
            },
            Expr::Array { size, elements, .. } => {
                if let Some(size) = size {
                    self.visit_expr(size);
                }
                for e in elements {
                    self.visit_expr(e);
                }
            }
            Expr::Collection { items, .. } => {
                for item in items {
                    match item {
                        CollectionItem::Element(e) => self.visit_expr(e),
                        CollectionItem::Entry { key, value } => {
                            self.visit_expr(key);
                            self.visit_expr(value);
                        }
                    }
                }
            }
            Expr::TypeTest { value, .. } | Expr::Cast { value, .. } | Expr::Await(value) => {
                self.visit_expr(value)
            }
            Expr::Interpolation(parts) => {
                for part in parts {
                    if let InterpolationPart::Expr { expr, .. } = part {
                        self.visit_expr(expr);
                    }
                }
            }
            Expr::Match { subject, arms } => {
                self.visit_expr(subject);
                for arm in arms {
                    if let Some(guard) = &arm.guard {
                        self.visit_expr(guard);
                    }
                    self.visit_expr(&arm.value);
                }
            }
            Expr::Tuple(items) => {
                for item in items {
                    self.visit_expr(item);
                }
            }
            Expr::With { value, updates } => {
                self.visit_expr(value);
                for update in updates {
                    self.visit_expr(&update.value);
                }
            }
            Expr::Literal(_)
            | Expr::Ref(_)
            | Expr::This
            | Expr::Base
            | Expr::TypeOf(_)
            | Expr::Default(_)
            | Expr::Fallback(_) => {}
        }
    }
}

/// `System.IO.File` → `Some("System.IO.File")`; anything but refs and
/// member paths → `None`.
fn dotted_path(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ref(name) => Some(name.clone()),
        Expr::Member { object, name } => dotted_path(object).map(|p| format!("{p}.{name}")),
        _ => None,
    }
}

/// Longest qualified key first, then shorter suffixes.
fn dotted_keys(object: &Expr, name: &str) -> Vec<String> {
    let Some(path) = dotted_path(object) else {
        return Vec::new();
    };
    let segments: Vec<&str> = path.split('.').collect();
    (0..segments.len())
        .map(|i| format!("{}.{name}", segments[i..].join(".")))
        .collect()
}

fn call_keys(object: &Expr, name: &str) -> Vec<String> {
    let mut keys = dotted_keys(object, name);
    keys.push(name.to_string());
    keys
}

/// Property reads only match qualified keys; a bare `Count` is no effect.
fn member_keys(object: &Expr, name: &str) -> Vec<String> {
    dotted_keys(object, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(receiver: &str, method: &str) -> Stmt {
        Stmt::expr(Expr::call(
            Expr::member(Expr::reference(receiver), method),
            vec![],
        ))
    }

    #[test]
    fn test_pure_body_has_no_annotation() {
        let body = vec![
            Stmt::bind("x", None, Expr::int(1)),
            Stmt::ret(Some(Expr::reference("x"))),
        ];
        assert_eq!(EffectInferencer::infer(&BUILTIN_EFFECTS, &body), None);
    }

    #[test]
    fn test_console_and_throw() {
        let body = vec![
            call("Console", "WriteLine"),
            Stmt::Throw(Some(Expr::reference("e"))),
        ];
        let effects = EffectInferencer::infer(&BUILTIN_EFFECTS, &body).unwrap();
        assert!(effects.contains(Io, "console"));
        assert!(effects.contains(Exception, "throw"));
        let pairs: Vec<_> = effects.iter().collect();
        assert_eq!(pairs, vec![(Io, "console"), (Exception, "throw")]);
    }

    #[test]
    fn test_qualified_and_bare_keys() {
        let qualified = Stmt::expr(Expr::call(
            Expr::member(
                Expr::member(
                    Expr::member(Expr::reference("System"), "IO"),
                    "File",
                ),
                "ReadAllText",
            ),
            vec![Expr::string("a.txt")],
        ));
        let body = vec![qualified, call("items", "Add"), call("items", "Add")];
        let effects = EffectInferencer::infer(&BUILTIN_EFFECTS, &body).unwrap();
        assert!(effects.contains(Io, "file"));
        assert!(effects.contains(Mutation, "collection"));
        assert_eq!(effects.iter().count(), 2);
    }

    #[test]
    fn test_member_read_and_constructor() {
        let body = vec![
            Stmt::bind(
                "now",
                None,
                Expr::member(Expr::reference("DateTime"), "Now"),
            ),
            Stmt::bind(
                "rng",
                None,
                Expr::New {
                    ty: Some("Random".into()),
                    args: vec![],
                    initializers: vec![],
                },
            ),
            Stmt::bind("n", None, Expr::member(Expr::reference("items"), "Count")),
        ];
        let effects = EffectInferencer::infer(&BUILTIN_EFFECTS, &body).unwrap();
        assert!(effects.contains(Nondeterminism, "time"));
        assert!(effects.contains(Nondeterminism, "random"));
        assert_eq!(effects.iter().count(), 2);
    }

    #[test]
    fn test_nested_lambda_and_branches() {
        let lambda = Expr::Lambda {
            params: vec![],
            body: LambdaBody::Block(vec![call("Console", "Write")]),
            is_async: false,
        };
        let body = vec![Stmt::if_stmt(
            Expr::bool(true),
            vec![Stmt::expr(Expr::call(Expr::reference("Run"), vec![lambda]))],
            Some(vec![Stmt::expr(Expr::native("sb.append", vec![]))]),
        )];
        let effects = EffectInferencer::infer(&BUILTIN_EFFECTS, &body).unwrap();
        assert!(effects.contains(Io, "console"));
        assert!(effects.contains(Mutation, "string-builder"));
    }

    #[test]
    fn test_custom_lookup() {
        let lookup = |target: &str| {
            if target == "Audit.Log" {
                vec![Effect::new(Io, "audit")]
            } else {
                Vec::new()
            }
        };
        let effects = EffectInferencer::infer(&lookup, &[call("Audit", "Log")]).unwrap();
        assert!(effects.contains(Io, "audit"));
        assert!(EffectInferencer::infer(&lookup, &[call("Console", "WriteLine")]).is_none());
    }

    #[test]
    fn test_annotation_serializes_by_category() {
        let mut effects = EffectAnnotation::default();
        effects.add(Effect::new(Mutation, "collection"));
        effects.add(Effect::new(Io, "file"));
        effects.add(Effect::new(Io, "console"));
        let json = serde_json::to_string(&effects).unwrap();
        insta::assert_snapshot!(json, @r#"{"io":["console","file"],"mutation":["collection"]}"#);
    }
}
