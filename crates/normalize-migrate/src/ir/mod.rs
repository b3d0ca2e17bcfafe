//! Target syntax tree.
//!
//! The effect-explicit target language's tree, produced by the converter and
//! handed to an [`Emitter`](crate::traits::Emitter). Every statement and
//! expression slot can hold a [`Fallback`], which carries the original source
//! text verbatim so degraded output stays inspectable.

use crate::effects::EffectAnnotation;
use serde::{Deserialize, Serialize};

/// One converted compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeDef>,
    /// Module-level functions (the synthetic entry point, if any).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Method>,
}

impl Module {
    pub fn find_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name() == name)
    }

    pub fn find_function(&self, name: &str) -> Option<&Method> {
        self.functions.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    #[default]
    Private,
    Protected,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeDef {
    Class(ClassDef),
    Interface(InterfaceDef),
    Enum(EnumDef),
    Delegate(DelegateDef),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Class(c) => &c.name,
            TypeDef::Interface(i) => &i.name,
            TypeDef::Enum(e) => &e.name,
            TypeDef::Delegate(d) => &d.name,
        }
    }

    pub fn as_class(&self) -> Option<&ClassDef> {
        match self {
            TypeDef::Class(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Struct,
    Record,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub id: String,
    pub name: String,
    pub kind: ClassKind,
    /// Dotted namespace path, empty at the top level.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_sealed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<Constructor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<TypeDef>,
}

impl ClassDef {
    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    /// Body-less signatures, plus default implementations when present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlying: Option<String>,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DelegateDef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    /// `readonly` or `const`.
    #[serde(default)]
    pub is_readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessor {
    pub visibility: Visibility,
    #[serde(default)]
    pub init_only: bool,
    /// `None` for auto-implemented accessors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<Stmt>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<EffectAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub ty: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub getter: Option<Accessor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setter: Option<Accessor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamModifier {
    Ref,
    Out,
    In,
    Variadic,
    /// Extension-method receiver.
    Receiver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    /// `None` for implicitly typed lambda parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<ParamModifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Expr>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty.into()),
            modifier: None,
            default: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub id: String,
    pub name: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub is_override: bool,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    pub return_type: String,
    /// `None` for abstract and interface members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<Stmt>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<EffectAnnotation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitializerTarget {
    Base,
    This,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtorInitializer {
    pub target: InitializerTarget,
    pub args: Vec<Arg>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constructor {
    pub id: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<CtorInitializer>,
    pub body: Vec<Stmt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<EffectAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub ty: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
}

/// Degraded node: original text plus the capability it needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fallback {
    pub text: String,
    pub feature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Coalesce,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCase {
    pub pattern: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    /// `let name: ty = init` (immutable) or `var` (mutable).
    Bind {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
        mutable: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        init: Option<Expr>,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    CompoundAssign {
        op: CompoundOp,
        target: Expr,
        value: Expr,
    },
    Subscribe {
        event: Expr,
        handler: Expr,
    },
    Unsubscribe {
        event: Expr,
        handler: Expr,
    },
    Expr(Expr),
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_body: Option<Vec<Stmt>>,
    },
    For {
        init: Vec<Stmt>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cond: Option<Expr>,
        step: Vec<Stmt>,
        body: Vec<Stmt>,
    },
    /// Counting loop over `start..end` (or `start..=end`).
    ForRange {
        var: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
        start: Expr,
        end: Expr,
        step: Expr,
        inclusive: bool,
        body: Vec<Stmt>,
    },
    ForEach {
        var: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
        iterable: Expr,
        body: Vec<Stmt>,
        #[serde(default)]
        is_await: bool,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        cond: Expr,
    },
    Try {
        body: Vec<Stmt>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        catches: Vec<CatchClause>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        finally: Option<Vec<Stmt>>,
    },
    Match {
        subject: Expr,
        cases: Vec<MatchCase>,
    },
    Throw(Option<Expr>),
    Return(Option<Expr>),
    Break,
    Continue,
    Using {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
        resource: Expr,
        body: Vec<Stmt>,
    },
    Yield(Expr),
    YieldBreak,
    Block(Vec<Stmt>),
    LocalFunction(Box<Method>),
    Fallback(Fallback),
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    /// Immutable binding.
    pub fn bind(name: impl Into<String>, ty: Option<String>, init: Expr) -> Self {
        Stmt::Bind {
            name: name.into(),
            ty,
            mutable: false,
            init: Some(init),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Stmt::Assign { target, value }
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Stmt::Return(value)
    }

    pub fn if_stmt(cond: Expr, then_body: Vec<Stmt>, else_body: Option<Vec<Stmt>>) -> Self {
        Stmt::If {
            cond,
            then_body,
            else_body,
        }
    }

    pub fn fallback(
        text: impl Into<String>,
        feature: impl Into<String>,
        suggestion: Option<String>,
    ) -> Self {
        Stmt::Fallback(Fallback {
            text: text.into(),
            feature: feature.into(),
            suggestion,
        })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Stmt::Fallback(_))
    }

    /// Name introduced by a `Bind`, if any.
    pub fn bound_name(&self) -> Option<&str> {
        match self {
            Stmt::Bind { name, .. } => Some(name),
            _ => None,
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: Expr,
}

impl From<Expr> for Arg {
    fn from(value: Expr) -> Self {
        Self { name: None, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    List,
    Map,
    Set,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionItem {
    Element(Expr),
    Entry { key: Expr, value: Expr },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationPart {
    Text(String),
    Expr {
        expr: Expr,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Literal(Literal),
    Ref(String),
    This,
    Base,
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_args: Vec<String>,
        args: Vec<Arg>,
    },
    Member {
        object: Box<Expr>,
        name: String,
    },
    Index {
        object: Box<Expr>,
        args: Vec<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Lambda {
        params: Vec<Param>,
        body: LambdaBody,
        #[serde(default)]
        is_async: bool,
    },
    New {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
        args: Vec<Arg>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        initializers: Vec<FieldInit>,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        elem_ty: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<Box<Expr>>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        elements: Vec<Expr>,
    },
    Collection {
        kind: CollectionKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
        items: Vec<CollectionItem>,
    },
    /// Target-native operation replacing an idiomatic library call.
    NativeOp {
        op: String,
        args: Vec<Expr>,
    },
    TypeTest {
        value: Box<Expr>,
        ty: String,
    },
    /// `safe` casts yield null instead of failing.
    Cast {
        value: Box<Expr>,
        ty: String,
        safe: bool,
    },
    Await(Box<Expr>),
    Interpolation(Vec<InterpolationPart>),
    Match {
        subject: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Tuple(Vec<Expr>),
    TypeOf(String),
    Default(Option<String>),
    With {
        value: Box<Expr>,
        updates: Vec<FieldInit>,
    },
    Fallback(Fallback),
}

impl Expr {
    pub fn reference(name: impl Into<String>) -> Self {
        Expr::Ref(name.into())
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn bool(value: bool) -> Self {
        Expr::Literal(Literal::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn member(object: Expr, name: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            name: name.into(),
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            type_args: Vec::new(),
            args: args.into_iter().map(Arg::from).collect(),
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn conditional(cond: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn native(op: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::NativeOp {
            op: op.into(),
            args,
        }
    }

    pub fn fallback(
        text: impl Into<String>,
        feature: impl Into<String>,
        suggestion: Option<String>,
    ) -> Self {
        Expr::Fallback(Fallback {
            text: text.into(),
            feature: feature.into(),
            suggestion,
        })
    }

    /// References, literals, `this` and `base`: safe to evaluate twice.
    pub fn is_trivial(&self) -> bool {
        matches!(
            self,
            Expr::Ref(_) | Expr::Literal(_) | Expr::This | Expr::Base
        )
    }
}

// ============================================================================
// Patterns
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationalOp {
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPattern {
    pub name: String,
    pub pattern: Pattern,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Wildcard,
    Literal(Literal),
    /// Non-literal constant (enum member, named constant).
    Constant(Expr),
    Var(String),
    Type {
        ty: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        binding: Option<String>,
    },
    Relational {
        op: RelationalOp,
        value: Expr,
    },
    Property {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
        fields: Vec<FieldPattern>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        binding: Option<String>,
    },
    Positional {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
        elements: Vec<Pattern>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        binding: Option<String>,
    },
    Not(Box<Pattern>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_serializes_text() {
        let stmt = Stmt::fallback("goto end;", "goto", None);
        let json = serde_json::to_string(&stmt).unwrap();
        insta::assert_snapshot!(json, @r#"{"fallback":{"text":"goto end;","feature":"goto"}}"#);
    }

    #[test]
    fn test_module_lookup() {
        let module = Module {
            name: "App".into(),
            types: vec![TypeDef::Class(ClassDef {
                name: "Widget".into(),
                ..Default::default()
            })],
            functions: vec![Method {
                name: "main".into(),
                return_type: "void".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(module.find_type("Widget").and_then(TypeDef::as_class).is_some());
        assert!(module.find_function("main").is_some());
        assert!(module.find_type("Gadget").is_none());
    }

    #[test]
    fn test_trivial_exprs() {
        assert!(Expr::reference("x").is_trivial());
        assert!(Expr::int(1).is_trivial());
        assert!(!Expr::call(Expr::reference("f"), vec![]).is_trivial());
    }
}
