//! Input syntax tree.
//!
//! This is the shape an external C# front end hands to the converter. The
//! core never lexes or parses C# itself; readers (see [`crate::traits`])
//! produce a [`CompilationUnit`], typically by deserializing JSON.
//!
//! Every statement and expression carries its [`Span`] and, optionally, the
//! verbatim original text. The text is what fallback nodes preserve; when a
//! front end omits it, the canonical rendering from [`display`] stands in.

mod display;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// 1-based source position. `0` means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// One parsed source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilationUnit {
    pub usings: Vec<String>,
    pub members: Vec<Declaration>,
}

impl CompilationUnit {
    pub fn new(members: Vec<Declaration>) -> Self {
        Self {
            usings: Vec::new(),
            members,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Declaration {
    Namespace {
        name: String,
        #[serde(default)]
        members: Vec<Declaration>,
    },
    Type(TypeDecl),
    GlobalStatement(Stmt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    Static,
    Abstract,
    Virtual,
    Override,
    Sealed,
    Readonly,
    Const,
    Async,
    Partial,
    Extern,
    New,
    Unsafe,
    Volatile,
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Struct,
    Record,
    RecordStruct,
    Interface,
    Enum,
    Delegate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeConstraint {
    pub param: String,
    pub bounds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<TypeConstraint>,
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    /// Record primary constructor parameters and delegate parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub enum_members: Vec<EnumMemberDecl>,
    /// Delegate return type.
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub span: Span,
}

impl TypeDecl {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            modifiers: Vec::new(),
            attributes: Vec::new(),
            type_params: Vec::new(),
            constraints: Vec::new(),
            bases: Vec::new(),
            members: Vec::new(),
            parameters: Vec::new(),
            enum_members: Vec::new(),
            return_type: None,
            span: Span::default(),
        }
    }

    pub fn class(name: impl Into<String>, members: Vec<MemberDecl>) -> Self {
        Self {
            members,
            ..Self::new(TypeKind::Class, name)
        }
    }

    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMemberDecl {
    pub name: String,
    #[serde(default)]
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberDecl {
    Field(FieldDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Destructor(DestructorDecl),
    Event(EventDecl),
    Indexer(IndexerDecl),
    Operator(OperatorDecl),
    ConversionOperator(ConversionOperatorDecl),
    NestedType(TypeDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub name: String,
    #[serde(default)]
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub ty: String,
    pub declarators: Vec<VariableDeclarator>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessorKind {
    Get,
    Set,
    Init,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorDecl {
    pub kind: AccessorKind,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// `None` for auto-implemented accessors.
    #[serde(default)]
    pub body: Option<MethodBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub ty: String,
    pub name: String,
    #[serde(default)]
    pub getter: Option<AccessorDecl>,
    #[serde(default)]
    pub setter: Option<AccessorDecl>,
    /// `int X => expr;`
    #[serde(default)]
    pub expression_body: Option<Expr>,
    #[serde(default)]
    pub init: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodBody {
    Block(Vec<Stmt>),
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamModifier {
    Ref,
    Out,
    In,
    Params,
    This,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// `None` for implicitly typed lambda parameters.
    #[serde(default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub modifier: Option<ParamModifier>,
    #[serde(default)]
    pub default: Option<Expr>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty.into()),
            modifier: None,
            default: None,
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            modifier: None,
            default: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub attributes: Vec<String>,
    pub return_type: String,
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<TypeConstraint>,
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub body: Option<MethodBody>,
    #[serde(default)]
    pub span: Span,
}

impl MethodDecl {
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        params: Vec<Parameter>,
        body: Vec<Stmt>,
    ) -> Self {
        Self {
            modifiers: vec![Modifier::Public],
            attributes: Vec::new(),
            return_type: return_type.into(),
            name: name.into(),
            type_params: Vec::new(),
            constraints: Vec::new(),
            params,
            body: Some(MethodBody::Block(body)),
            span: Span::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitializerTarget {
    Base,
    This,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorInitializer {
    pub target: InitializerTarget,
    #[serde(default)]
    pub args: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub name: String,
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub initializer: Option<ConstructorInitializer>,
    #[serde(default)]
    pub body: Option<MethodBody>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestructorDecl {
    pub name: String,
    #[serde(default)]
    pub body: Option<MethodBody>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDecl {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub ty: String,
    pub name: String,
    /// Explicit `add`/`remove` accessors were written.
    #[serde(default)]
    pub has_accessors: bool,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerDecl {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub ty: String,
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub getter: Option<AccessorDecl>,
    #[serde(default)]
    pub setter: Option<AccessorDecl>,
    #[serde(default)]
    pub expression_body: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorDecl {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub return_type: String,
    /// Operator token, e.g. `+` or `==`.
    pub operator: String,
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub body: Option<MethodBody>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOperatorDecl {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub implicit: bool,
    pub target_type: String,
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub body: Option<MethodBody>,
    #[serde(default)]
    pub span: Span,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    #[serde(default)]
    pub span: Span,
    /// Verbatim source text, when the front end provides it.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDecl {
    /// `None` for `var`.
    #[serde(default)]
    pub ty: Option<String>,
    pub declarators: Vec<VariableDeclarator>,
    #[serde(default)]
    pub is_const: bool,
    /// `using var x = ...;`
    #[serde(default)]
    pub is_using: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForEachTarget {
    Name(String),
    Deconstruct(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    #[serde(default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub filter: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchLabel {
    Case(Expr),
    Pattern {
        pattern: Pattern,
        #[serde(default)]
        guard: Option<Expr>,
    },
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchSection {
    pub labels: Vec<SwitchLabel>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    Block(Vec<Stmt>),
    LocalDecl(LocalDecl),
    Expr(Expr),
    If {
        cond: Expr,
        then: Box<Stmt>,
        #[serde(default, rename = "else")]
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        #[serde(default)]
        decl: Option<LocalDecl>,
        #[serde(default)]
        init: Vec<Expr>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        step: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForEach {
        #[serde(default)]
        ty: Option<String>,
        target: ForEachTarget,
        iterable: Expr,
        body: Box<Stmt>,
        #[serde(default)]
        is_await: bool,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Throw(Option<Expr>),
    Try {
        body: Vec<Stmt>,
        #[serde(default)]
        catches: Vec<CatchClause>,
        #[serde(default)]
        finally: Option<Vec<Stmt>>,
    },
    Switch {
        subject: Expr,
        sections: Vec<SwitchSection>,
    },
    Using {
        #[serde(default)]
        decl: Option<LocalDecl>,
        #[serde(default)]
        expr: Option<Expr>,
        body: Box<Stmt>,
    },
    Lock {
        expr: Expr,
        body: Box<Stmt>,
    },
    YieldReturn(Expr),
    YieldBreak,
    LocalFunction(MethodDecl),
    Empty,
    Checked {
        checked: bool,
        body: Vec<Stmt>,
    },
    Labeled {
        label: String,
        stmt: Box<Stmt>,
    },
    /// `goto label;`, `goto case X;`, `goto default;`
    Goto(String),
    Unsafe(Vec<Stmt>),
    Fixed {
        decl: LocalDecl,
        body: Box<Stmt>,
    },
    /// A statement kind the front end recognized but this tree does not model.
    Unknown {
        kind: String,
    },
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            span: Span::default(),
            text: None,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.span = Span::new(line, column);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Original text, or the canonical rendering when none was supplied.
    pub fn source_text(&self) -> Cow<'_, str> {
        match &self.text {
            Some(text) => Cow::Borrowed(text.as_str()),
            None => Cow::Owned(self.to_string()),
        }
    }

    pub fn expr(expr: Expr) -> Self {
        Self::new(StmtKind::Expr(expr))
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Self::new(StmtKind::Block(stmts))
    }

    /// `var name = init;`
    pub fn var(name: impl Into<String>, init: Expr) -> Self {
        Self::new(StmtKind::LocalDecl(LocalDecl {
            ty: None,
            declarators: vec![VariableDeclarator {
                name: name.into(),
                init: Some(init),
            }],
            is_const: false,
            is_using: false,
        }))
    }

    /// `T name = init;`
    pub fn local(ty: impl Into<String>, name: impl Into<String>, init: Option<Expr>) -> Self {
        Self::new(StmtKind::LocalDecl(LocalDecl {
            ty: Some(ty.into()),
            declarators: vec![VariableDeclarator {
                name: name.into(),
                init,
            }],
            is_const: false,
            is_using: false,
        }))
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Self::new(StmtKind::Return(value))
    }

    pub fn if_stmt(cond: Expr, then: Stmt, otherwise: Option<Stmt>) -> Self {
        Self::new(StmtKind::If {
            cond,
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
        })
    }

    pub fn while_loop(cond: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::While {
            cond,
            body: Box::new(body),
        })
    }

    pub fn foreach(name: impl Into<String>, iterable: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::ForEach {
            ty: None,
            target: ForEachTarget::Name(name.into()),
            iterable,
            body: Box::new(body),
            is_await: false,
        })
    }

    pub fn throw(value: Option<Expr>) -> Self {
        Self::new(StmtKind::Throw(value))
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub text: Option<String>,
}

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
    /// `??`
    Coalesce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    AddressOf,
    Deref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    Assign,
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
    /// `??=`
    Coalesce,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub modifier: Option<ParamModifier>,
    pub value: Expr,
}

impl From<Expr> for Argument {
    fn from(value: Expr) -> Self {
        Self {
            name: None,
            modifier: None,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInit {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    Object(Vec<MemberInit>),
    Collection(Vec<Expr>),
    Dictionary(Vec<KeyValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationPart {
    Text(String),
    Expr {
        expr: Expr,
        #[serde(default)]
        format: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchArm {
    pub pattern: Pattern,
    #[serde(default)]
    pub guard: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Literal(Literal),
    Ident(String),
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
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Invoke {
        callee: Box<Expr>,
        #[serde(default)]
        args: Vec<Argument>,
    },
    Member {
        object: Box<Expr>,
        name: String,
        #[serde(default)]
        type_args: Vec<String>,
    },
    /// `a?.b` (`args: None`) or `a?.M(x)`.
    ConditionalAccess {
        object: Box<Expr>,
        name: String,
        #[serde(default)]
        args: Option<Vec<Argument>>,
    },
    Index {
        object: Box<Expr>,
        args: Vec<Argument>,
        #[serde(default)]
        null_conditional: bool,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        #[serde(rename = "else")]
        otherwise: Box<Expr>,
    },
    Lambda {
        params: Vec<Parameter>,
        body: LambdaBody,
        #[serde(default)]
        is_async: bool,
    },
    /// `new T(args) { ... }`; `ty: None` for target-typed `new(...)`.
    New {
        #[serde(default)]
        ty: Option<String>,
        #[serde(default)]
        args: Vec<Argument>,
        #[serde(default)]
        initializer: Option<Initializer>,
    },
    /// `new T[n]`, `new T[] { ... }`, `new[] { ... }`.
    ArrayNew {
        #[serde(default)]
        elem_ty: Option<String>,
        #[serde(default)]
        size: Option<Box<Expr>>,
        #[serde(default)]
        elements: Option<Vec<Expr>>,
    },
    /// `[a, b, c]`
    CollectionLiteral(Vec<Expr>),
    Cast {
        ty: String,
        expr: Box<Expr>,
    },
    As {
        expr: Box<Expr>,
        ty: String,
    },
    Is {
        expr: Box<Expr>,
        ty: String,
    },
    IsPattern {
        expr: Box<Expr>,
        pattern: Box<Pattern>,
    },
    Await(Box<Expr>),
    Interpolated(Vec<InterpolationPart>),
    Switch {
        subject: Box<Expr>,
        arms: Vec<SwitchArm>,
    },
    Tuple(Vec<Expr>),
    TypeOf(String),
    NameOf(Box<Expr>),
    Default(Option<String>),
    ThrowExpr(Box<Expr>),
    With {
        expr: Box<Expr>,
        assignments: Vec<MemberInit>,
    },
    /// LINQ query syntax (`from x in xs select x`).
    Query,
    Checked {
        checked: bool,
        expr: Box<Expr>,
    },
    Range {
        #[serde(default)]
        start: Option<Box<Expr>>,
        #[serde(default)]
        end: Option<Box<Expr>>,
    },
    /// `^n`
    IndexFromEnd(Box<Expr>),
    /// `stackalloc`, `sizeof`, pointer member access.
    Unsafe {
        kind: String,
    },
    Unknown {
        kind: String,
    },
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span::default(),
            text: None,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.span = Span::new(line, column);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Original text, or the canonical rendering when none was supplied.
    pub fn source_text(&self) -> Cow<'_, str> {
        match &self.text {
            Some(text) => Cow::Borrowed(text.as_str()),
            None => Cow::Owned(self.to_string()),
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Ident(name.into()))
    }

    pub fn null() -> Self {
        Self::new(ExprKind::Literal(Literal::Null))
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ExprKind::Literal(Literal::Bool(value)))
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::Literal(Literal::Int(value)))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Literal(Literal::String(value.into())))
    }

    pub fn member(object: Expr, name: impl Into<String>) -> Self {
        Self::new(ExprKind::Member {
            object: Box::new(object),
            name: name.into(),
            type_args: Vec::new(),
        })
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Invoke {
            callee: Box::new(callee),
            args: args.into_iter().map(Argument::from).collect(),
        })
    }

    /// `object.method(args)`
    pub fn method_call(object: Expr, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::call(Self::member(object, method), args)
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Self::new(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn assign(op: AssignOp, target: Expr, value: Expr) -> Self {
        Self::new(ExprKind::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    /// `(a, b) => body`
    pub fn lambda(params: &[&str], body: Expr) -> Self {
        Self::new(ExprKind::Lambda {
            params: params.iter().map(|p| Parameter::untyped(*p)).collect(),
            body: LambdaBody::Expr(Box::new(body)),
            is_async: false,
        })
    }

    pub fn is_pattern(expr: Expr, pattern: Pattern) -> Self {
        Self::new(ExprKind::IsPattern {
            expr: Box::new(expr),
            pattern: Box::new(pattern),
        })
    }

    pub fn new_object(ty: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::New {
            ty: Some(ty.into()),
            args: args.into_iter().map(Argument::from).collect(),
            initializer: None,
        })
    }

    /// `x.M(...)` shape.
    pub fn is_invocation_on_member(&self) -> bool {
        matches!(&self.kind, ExprKind::Invoke { callee, .. } if matches!(callee.kind, ExprKind::Member { .. }))
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
pub struct SubPattern {
    pub name: String,
    pub pattern: Pattern,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Discard,
    Constant(Expr),
    /// `T name`
    Declaration {
        ty: String,
        name: String,
    },
    /// `var name`
    Var(String),
    Type(String),
    Relational {
        op: RelationalOp,
        value: Expr,
    },
    Property {
        #[serde(default)]
        ty: Option<String>,
        fields: Vec<SubPattern>,
        #[serde(default)]
        designation: Option<String>,
    },
    Positional {
        #[serde(default)]
        ty: Option<String>,
        elements: Vec<Pattern>,
        #[serde(default)]
        designation: Option<String>,
    },
    Not(Box<Pattern>),
    And(Box<Pattern>, Box<Pattern>),
    Or(Box<Pattern>, Box<Pattern>),
    List(Vec<Pattern>),
}

impl Pattern {
    pub fn declaration(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Declaration {
            ty: ty.into(),
            name: name.into(),
        }
    }
}

pub fn has_modifier(modifiers: &[Modifier], modifier: Modifier) -> bool {
    modifiers.contains(&modifier)
}
