//! Source-tree to target-tree conversion.
//!
//! [`Converter`] holds the per-run context and options and does the
//! statement and expression work; the declaration walk lives in
//! [`crate::walker`]. Conversion never fails at this level: constructs that
//! cannot be expressed become [`Fallback`](crate::ir::Fallback) nodes with a
//! matching issue on the context.
//!
//! Expressions that need statements before them (chain temporaries, pattern
//! bindings, conditional-access receivers) push them into a caller-owned
//! [`Hoists`] accumulator, which the statement converter drains into the
//! enclosing statement list right before the statement that needed them.

mod expr;
mod pattern;
mod stmt;

use crate::capability;
use crate::config::ConversionOptions;
use crate::context::{ConversionContext, ConversionIssue, IssueKind, Scope, Severity};
use crate::effects::{EffectAnnotation, EffectInferencer, EffectLookup};
use crate::ir;
use crate::native::{self, NativeCall};
use crate::source::{
    Expr, MethodBody, MethodDecl, Modifier, ParamModifier, Parameter, Span, Stmt, StmtKind,
    TypeConstraint, has_modifier,
};
use crate::types;

/// Statements queued by expression conversion for the enclosing statement.
///
/// `stmts` run before the statement in evaluation order. `bindings` are the
/// cast bindings of declaration patterns, which belong at the start of
/// whichever branch the test guards.
#[derive(Debug, Default)]
pub struct Hoists {
    stmts: Vec<ir::Stmt>,
    bindings: Vec<ir::Stmt>,
}

impl Hoists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stmt: ir::Stmt) {
        self.stmts.push(stmt);
    }

    pub fn push_binding(&mut self, stmt: ir::Stmt) {
        self.bindings.push(stmt);
    }

    pub fn take_bindings(&mut self) -> Vec<ir::Stmt> {
        std::mem::take(&mut self.bindings)
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty() && self.bindings.is_empty()
    }

    pub(crate) fn binding_mark(&self) -> usize {
        self.bindings.len()
    }

    /// Bindings queued since `mark` run ahead of the statement instead of
    /// inside the guarded branch, for conditions that read them
    /// (`x is T t && t.Ready`).
    pub(crate) fn bind_early_since(&mut self, mark: usize) {
        let early = self.bindings.split_off(mark.min(self.bindings.len()));
        self.stmts.extend(early);
    }

    /// Move everything into `out`, temporaries first, and clear.
    pub fn drain_into(&mut self, out: &mut Vec<ir::Stmt>) {
        out.append(&mut self.stmts);
        out.append(&mut self.bindings);
    }
}

/// `(() => { body; return value; })()`
pub(crate) fn invoke_block(mut body: Vec<ir::Stmt>, value: ir::Expr) -> ir::Expr {
    body.push(ir::Stmt::Return(Some(value)));
    ir::Expr::call(
        ir::Expr::Lambda {
            params: Vec::new(),
            body: ir::LambdaBody::Block(body),
            is_async: false,
        },
        Vec::new(),
    )
}

/// Statement and expression converter bound to one conversion context.
pub struct Converter<'a> {
    pub(crate) ctx: &'a mut ConversionContext,
    pub(crate) options: &'a ConversionOptions,
    pub(crate) effects: &'a dyn EffectLookup,
}

impl<'a> Converter<'a> {
    pub fn new(
        ctx: &'a mut ConversionContext,
        options: &'a ConversionOptions,
        effects: &'a dyn EffectLookup,
    ) -> Self {
        Self {
            ctx,
            options,
            effects,
        }
    }

    pub fn context(&self) -> &ConversionContext {
        &*self.ctx
    }

    pub fn options(&self) -> &ConversionOptions {
        self.options
    }

    /// Type name in the target spelling, expanded if configured.
    pub fn map_type(&self, ty: &str) -> String {
        let mapped = types::to_target(ty);
        if self.options.expand_types {
            types::expand(&mapped)
        } else {
            mapped
        }
    }

    pub(crate) fn map_opt_type(&self, ty: Option<&str>) -> Option<String> {
        ty.filter(|t| *t != "var").map(|t| self.map_type(t))
    }

    /// The one native-operation predicate used by both hoisting paths.
    pub(crate) fn native_call(&self, receiver: &Expr, method: &str, argc: usize) -> Option<NativeCall> {
        if !self.options.native_operations {
            return None;
        }
        native::classify(receiver, method, argc)
    }

    /// Convert a statement list. A `using var` declaration wraps the rest of
    /// the list in a `Using` statement.
    pub fn convert_block(&mut self, stmts: &[Stmt]) -> Vec<ir::Stmt> {
        let mut out = Vec::new();
        for (i, stmt) in stmts.iter().enumerate() {
            if let StmtKind::LocalDecl(decl) = &stmt.kind
                && decl.is_using
            {
                let rest = &stmts[i + 1..];
                self.ctx.stats.statements += 1;
                self.convert_using_decl(decl, &mut out, |this| this.convert_block(rest));
                return out;
            }
            self.convert_statement(stmt, &mut out);
        }
        out
    }

    /// Convert an expression outside any statement list (field
    /// initializers, parameter defaults). Hoisted statements are kept by
    /// wrapping the value in an immediately invoked block.
    pub fn convert_standalone_expr(&mut self, expr: &Expr) -> ir::Expr {
        let mut hoists = Hoists::new();
        let value = self.convert_expr(expr, &mut hoists);
        if hoists.is_empty() {
            return value;
        }
        let mut body = Vec::new();
        hoists.drain_into(&mut body);
        invoke_block(body, value)
    }

    /// Bind a non-trivial value to a temporary so it can be read twice.
    pub(crate) fn stable_value(&mut self, value: ir::Expr, hoists: &mut Hoists) -> ir::Expr {
        if value.is_trivial() {
            return value;
        }
        let name = self.ctx.fresh_temp("tmp");
        tracing::trace!(temp = %name, "hoisted value for reuse");
        hoists.push(ir::Stmt::bind(name.clone(), None, value));
        ir::Expr::reference(name)
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    fn unsupported(&mut self, feature: &str, span: Span) -> Option<String> {
        let suggestion = capability::workaround(feature).map(str::to_string);
        let what = capability::lookup(feature).map_or(feature, |info| info.description);
        self.ctx.record_feature(feature);
        self.ctx.stats.fallbacks += 1;
        self.ctx.report(ConversionIssue {
            severity: Severity::Warning,
            kind: IssueKind::UnsupportedFeature,
            message: format!("{what} cannot be converted; original text preserved"),
            feature: Some(feature.to_string()),
            line: span.line,
            column: span.column,
            suggestion: suggestion.clone(),
        });
        suggestion
    }

    /// Degrade a statement, keeping its original text.
    pub(crate) fn fallback_stmt(&mut self, stmt: &Stmt, feature: &str) -> ir::Stmt {
        let suggestion = self.unsupported(feature, stmt.span);
        ir::Stmt::fallback(stmt.source_text(), feature, suggestion)
    }

    /// Degrade an expression, keeping its original text.
    pub(crate) fn fallback_expr(&mut self, expr: &Expr, feature: &str) -> ir::Expr {
        let suggestion = self.unsupported(feature, expr.span);
        ir::Expr::fallback(expr.source_text(), feature, suggestion)
    }

    /// Converted, but a human should check the result.
    pub(crate) fn review(&mut self, feature: &str, message: impl Into<String>, span: Span) {
        self.ctx.record_feature(feature);
        self.ctx.report(ConversionIssue {
            severity: Severity::Warning,
            kind: IssueKind::ManualReview,
            message: message.into(),
            feature: Some(feature.to_string()),
            line: span.line,
            column: span.column,
            suggestion: capability::workaround(feature).map(str::to_string),
        });
    }

    pub(crate) fn note(&mut self, feature: &str, message: impl Into<String>, span: Span) {
        self.ctx.record_feature(feature);
        self.ctx.report(ConversionIssue {
            severity: Severity::Info,
            kind: IssueKind::ManualReview,
            message: message.into(),
            feature: Some(feature.to_string()),
            line: span.line,
            column: span.column,
            suggestion: None,
        });
    }

    pub(crate) fn uses(&mut self, feature: &str) {
        self.ctx.record_feature(feature);
    }

    // ------------------------------------------------------------------
    // Callables
    // ------------------------------------------------------------------

    pub(crate) fn visibility(modifiers: &[Modifier], default: ir::Visibility) -> ir::Visibility {
        if has_modifier(modifiers, Modifier::Public) {
            ir::Visibility::Public
        } else if has_modifier(modifiers, Modifier::Protected) {
            ir::Visibility::Protected
        } else if has_modifier(modifiers, Modifier::Internal) {
            ir::Visibility::Internal
        } else if has_modifier(modifiers, Modifier::Private) {
            ir::Visibility::Private
        } else {
            default
        }
    }

    pub(crate) fn type_params(
        &self,
        names: &[String],
        constraints: &[TypeConstraint],
    ) -> Vec<ir::TypeParam> {
        names
            .iter()
            .map(|name| ir::TypeParam {
                name: name.clone(),
                bounds: constraints
                    .iter()
                    .filter(|c| &c.param == name)
                    .flat_map(|c| c.bounds.iter().map(|b| self.map_type(b)))
                    .collect(),
            })
            .collect()
    }

    pub(crate) fn convert_params(&mut self, params: &[Parameter], span: Span) -> Vec<ir::Param> {
        params
            .iter()
            .map(|param| {
                let modifier = match param.modifier {
                    None => None,
                    Some(ParamModifier::Params) => Some(ir::ParamModifier::Variadic),
                    Some(ParamModifier::This) => {
                        self.uses("extension-methods");
                        Some(ir::ParamModifier::Receiver)
                    }
                    Some(m) => {
                        let (keyword, target) = match m {
                            ParamModifier::Ref => ("ref", ir::ParamModifier::Ref),
                            ParamModifier::Out => ("out", ir::ParamModifier::Out),
                            _ => ("in", ir::ParamModifier::In),
                        };
                        self.review(
                            "ref-parameters",
                            format!("`{keyword}` parameter `{}` writes through a reference", param.name),
                            span,
                        );
                        Some(target)
                    }
                };
                ir::Param {
                    name: param.name.clone(),
                    ty: self.map_opt_type(param.ty.as_deref()),
                    modifier,
                    default: param
                        .default
                        .as_ref()
                        .map(|d| self.convert_standalone_expr(d)),
                }
            })
            .collect()
    }

    /// Convert a method or expression body. Expression bodies become a
    /// `return` when the callable returns a value.
    pub(crate) fn convert_body(&mut self, body: &MethodBody, returns_value: bool) -> Vec<ir::Stmt> {
        match body {
            MethodBody::Block(stmts) => self.convert_block(stmts),
            MethodBody::Expr(expr) => {
                let kind = if returns_value {
                    StmtKind::Return(Some(expr.clone()))
                } else {
                    StmtKind::Expr(expr.clone())
                };
                let stmt = Stmt {
                    kind,
                    span: expr.span,
                    text: None,
                };
                self.convert_block(std::slice::from_ref(&stmt))
            }
        }
    }

    pub(crate) fn infer_effects(&self, body: &[ir::Stmt]) -> Option<EffectAnnotation> {
        if !self.options.infer_effects {
            return None;
        }
        EffectInferencer::infer(self.effects, body)
    }

    /// Methods, local functions, and the accessor-like members the walker
    /// lowers to methods.
    pub fn convert_method(&mut self, decl: &MethodDecl) -> ir::Method {
        let _span = tracing::debug_span!("method", method = %decl.name).entered();
        self.ctx.push_scope(Scope::Method(decl.name.clone()));
        self.ctx.stats.methods += 1;

        let is_async = has_modifier(&decl.modifiers, Modifier::Async);
        if is_async {
            self.uses("async-await");
        }
        if !decl.type_params.is_empty() {
            self.uses("generics");
        }
        if !decl.attributes.is_empty() {
            self.note(
                "attributes",
                format!("attributes on `{}` dropped: {}", decl.name, decl.attributes.join(", ")),
                decl.span,
            );
        }

        let return_type = self.map_type(&decl.return_type);
        let returns_value = decl.return_type != "void" && !(is_async && decl.return_type == "Task");
        let params = self.convert_params(&decl.params, decl.span);
        let body = decl
            .body
            .as_ref()
            .map(|body| self.convert_body(body, returns_value));
        let effects = body.as_deref().and_then(|b| self.infer_effects(b));

        let method = ir::Method {
            id: self.ctx.next_id("fn"),
            name: decl.name.clone(),
            visibility: Self::visibility(&decl.modifiers, ir::Visibility::Private),
            is_static: has_modifier(&decl.modifiers, Modifier::Static),
            is_abstract: has_modifier(&decl.modifiers, Modifier::Abstract),
            is_virtual: has_modifier(&decl.modifiers, Modifier::Virtual),
            is_override: has_modifier(&decl.modifiers, Modifier::Override),
            is_async,
            type_params: self.type_params(&decl.type_params, &decl.constraints),
            params,
            return_type,
            body,
            effects,
        };
        self.ctx.pop_scope();
        method
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::BUILTIN_EFFECTS;
    use crate::source::{BinaryOp, ExprKind, LambdaBody, Literal, Pattern};

    fn convert_stmts(stmts: &[Stmt]) -> (Vec<ir::Stmt>, ConversionContext) {
        let mut ctx = ConversionContext::new();
        let options = ConversionOptions::default();
        let out = Converter::new(&mut ctx, &options, &BUILTIN_EFFECTS).convert_block(stmts);
        (out, ctx)
    }

    #[test]
    fn test_hoists_drain_order() {
        let mut hoists = Hoists::new();
        hoists.push_binding(ir::Stmt::bind("b", None, ir::Expr::int(2)));
        hoists.push(ir::Stmt::bind("a", None, ir::Expr::int(1)));
        let mut out = Vec::new();
        hoists.drain_into(&mut out);
        let names: Vec<_> = out.iter().filter_map(ir::Stmt::bound_name).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(hoists.is_empty());
    }

    #[test]
    fn test_using_declaration_wraps_rest_of_block() {
        let mut using = Stmt::var("reader", Expr::new_object("StreamReader", vec![Expr::ident("path")]));
        if let StmtKind::LocalDecl(decl) = &mut using.kind {
            decl.is_using = true;
        }
        let (out, _) = convert_stmts(&[
            Stmt::expr(Expr::call(Expr::ident("Before"), vec![])),
            using,
            Stmt::expr(Expr::method_call(Expr::ident("reader"), "Close", vec![])),
        ]);
        assert_eq!(out.len(), 2);
        match &out[1] {
            ir::Stmt::Using { name, body, .. } => {
                assert_eq!(name.as_deref(), Some("reader"));
                assert_eq!(body.len(), 1);
            }
            _ => panic!("expected using"),
        }
    }

    #[test]
    fn test_standalone_expr_wraps_hoists() {
        let mut ctx = ConversionContext::new();
        let options = ConversionOptions::default();
        let mut conv = Converter::new(&mut ctx, &options, &BUILTIN_EFFECTS);
        let value = Expr::is_pattern(
            Expr::method_call(Expr::ident("Load"), "Get", vec![]),
            Pattern::declaration("Foo", "f"),
        );
        match conv.convert_standalone_expr(&value) {
            ir::Expr::Call { callee, args, .. } => {
                assert!(args.is_empty());
                match *callee {
                    ir::Expr::Lambda {
                        body: ir::LambdaBody::Block(body),
                        ..
                    } => {
                        assert!(matches!(body.last(), Some(ir::Stmt::Return(Some(_)))));
                        assert_eq!(body.len(), 3);
                    }
                    _ => panic!("expected lambda"),
                }
            }
            _ => panic!("expected call"),
        }
    }

    #[test]
    fn test_expression_bodied_method_returns() {
        let mut ctx = ConversionContext::new();
        let options = ConversionOptions::default();
        let mut conv = Converter::new(&mut ctx, &options, &BUILTIN_EFFECTS);
        let mut decl = MethodDecl::new(
            "Twice",
            "int",
            vec![Parameter::new("x", "int")],
            Vec::new(),
        );
        decl.body = Some(MethodBody::Expr(Expr::binary(
            Expr::ident("x"),
            BinaryOp::Mul,
            Expr::int(2),
        )));
        let method = conv.convert_method(&decl);
        assert_eq!(method.id, "fn001");
        assert_eq!(method.return_type, "i32");
        assert_eq!(method.params[0].ty.as_deref(), Some("i32"));
        assert!(matches!(
            method.body.as_deref(),
            Some([ir::Stmt::Return(Some(ir::Expr::Binary { .. }))])
        ));
        assert!(method.effects.is_none());
    }

    #[test]
    fn test_method_effects_and_toggle() {
        let body = vec![Stmt::expr(Expr::method_call(
            Expr::ident("Console"),
            "WriteLine",
            vec![Expr::string("hi")],
        ))];
        let decl = MethodDecl::new("Greet", "void", Vec::new(), body);

        let mut ctx = ConversionContext::new();
        let options = ConversionOptions::default();
        let method = Converter::new(&mut ctx, &options, &BUILTIN_EFFECTS).convert_method(&decl);
        let effects = method.effects.unwrap();
        assert!(effects.contains(crate::effects::EffectCategory::Io, "console"));

        let mut ctx = ConversionContext::new();
        let options = ConversionOptions {
            infer_effects: false,
            ..ConversionOptions::default()
        };
        let method = Converter::new(&mut ctx, &options, &BUILTIN_EFFECTS).convert_method(&decl);
        assert!(method.effects.is_none());
    }

    #[test]
    fn test_ref_parameter_needs_review() {
        let mut ctx = ConversionContext::new();
        let options = ConversionOptions::default();
        let mut conv = Converter::new(&mut ctx, &options, &BUILTIN_EFFECTS);
        let mut param = Parameter::new("count", "int");
        param.modifier = Some(ParamModifier::Out);
        let params = conv.convert_params(&[param], Span::new(3, 5));
        assert_eq!(params[0].modifier, Some(ir::ParamModifier::Out));
        let issue = &ctx.issues()[0];
        assert_eq!(issue.feature.as_deref(), Some("ref-parameters"));
        assert_eq!((issue.line, issue.column), (3, 5));
    }

    #[test]
    fn test_expand_types_option() {
        let mut ctx = ConversionContext::new();
        let options = ConversionOptions {
            expand_types: true,
            ..ConversionOptions::default()
        };
        let conv = Converter::new(&mut ctx, &options, &BUILTIN_EFFECTS);
        assert_eq!(conv.map_type("int?"), "OPTION[inner=INT[bits=32][signed=true]]");
        assert_eq!(conv.map_opt_type(Some("var")), None);
    }

    #[test]
    fn test_lambda_literal_sanity() {
        let lambda = Expr::new(ExprKind::Lambda {
            params: vec![Parameter::untyped("x")],
            body: LambdaBody::Expr(Box::new(Expr::new(ExprKind::Literal(Literal::Bool(true))))),
            is_async: false,
        });
        let (out, _) = convert_stmts(&[Stmt::var("f", lambda)]);
        match &out[0] {
            ir::Stmt::Bind {
                init: Some(ir::Expr::Lambda { params, body, .. }),
                ..
            } => {
                assert_eq!(params[0].name, "x");
                assert!(matches!(body, ir::LambdaBody::Expr(_)));
            }
            _ => panic!("expected lambda binding"),
        }
    }
}
