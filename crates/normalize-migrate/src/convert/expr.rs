//! Expression conversion.

use super::{Converter, Hoists, invoke_block};
use crate::ir;
use crate::native;
use crate::source::{
    Argument, AssignOp, BinaryOp, Expr, ExprKind, Initializer, InterpolationPart, LambdaBody,
    Literal, Stmt, UnaryOp,
};

impl Converter<'_> {
    /// Convert one expression. Statements it needs first go to `hoists`.
    pub fn convert_expr(&mut self, expr: &Expr, hoists: &mut Hoists) -> ir::Expr {
        self.ctx.stats.expressions += 1;
        match &expr.kind {
            ExprKind::Literal(lit) => ir::Expr::Literal(convert_literal(lit)),
            ExprKind::Ident(name) => ir::Expr::reference(name.as_str()),
            ExprKind::This => ir::Expr::This,
            ExprKind::Base => ir::Expr::Base,

            ExprKind::Binary { op, left, right } => match binary_op(*op) {
                Some(ir_op) => {
                    let mark = hoists.binding_mark();
                    let left = self.convert_expr(left, hoists);
                    let right = match op {
                        BinaryOp::And => {
                            // The right side may read what the left side binds.
                            hoists.bind_early_since(mark);
                            self.convert_guarded(right, hoists)
                        }
                        BinaryOp::Or => self.convert_guarded(right, hoists),
                        _ => self.convert_expr(right, hoists),
                    };
                    ir::Expr::binary(left, ir_op, right)
                }
                None => self.convert_coalesce(left, right, hoists),
            },

            ExprKind::Unary { op, operand } => {
                let op = match op {
                    UnaryOp::Neg => ir::UnaryOp::Neg,
                    UnaryOp::Plus => ir::UnaryOp::Plus,
                    UnaryOp::Not => ir::UnaryOp::Not,
                    UnaryOp::BitNot => ir::UnaryOp::BitNot,
                    UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => {
                        return self.fallback_expr(expr, "embedded-assignment");
                    }
                    UnaryOp::AddressOf | UnaryOp::Deref => {
                        return self.fallback_expr(expr, "pointers");
                    }
                };
                ir::Expr::Unary {
                    op,
                    operand: Box::new(self.convert_expr(operand, hoists)),
                }
            }

            // Assignments only survive as statements.
            ExprKind::Assign { .. } => self.fallback_expr(expr, "embedded-assignment"),

            ExprKind::Invoke { callee, args } => self.convert_invoke(callee, args, hoists),

            ExprKind::Member { object, name, .. } => {
                if self.options.native_operations
                    && let Some(op) = native::classify_member(object, name)
                {
                    self.ctx.stats.native_ops += 1;
                    let receiver = self.convert_expr(object, hoists);
                    return ir::Expr::native(op.tag(), vec![receiver]);
                }
                ir::Expr::member(self.convert_expr(object, hoists), name.as_str())
            }

            ExprKind::ConditionalAccess { object, name, args } => {
                self.uses("null-conditional");
                let object = self.convert_expr(object, hoists);
                let object = self.stable_value(object, hoists);
                let access = ir::Expr::member(object.clone(), name.as_str());
                let access = match args {
                    Some(args) => ir::Expr::Call {
                        callee: Box::new(access),
                        type_args: Vec::new(),
                        args: self.convert_guarded_args(args, hoists),
                    },
                    None => access,
                };
                null_guarded(object, access)
            }

            ExprKind::Index {
                object,
                args,
                null_conditional,
            } => {
                let object = self.convert_expr(object, hoists);
                let object = if *null_conditional {
                    self.uses("null-conditional");
                    self.stable_value(object, hoists)
                } else {
                    object
                };
                let args = if *null_conditional {
                    self.convert_guarded_args(args, hoists)
                } else {
                    self.convert_args(args, hoists)
                };
                let args = args.into_iter().map(|a| a.value).collect();
                let access = ir::Expr::Index {
                    object: Box::new(object.clone()),
                    args,
                };
                if *null_conditional {
                    null_guarded(object, access)
                } else {
                    access
                }
            }

            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.convert_expr(cond, hoists);
                let then = self.convert_guarded(then, hoists);
                let otherwise = self.convert_guarded(otherwise, hoists);
                ir::Expr::conditional(cond, then, otherwise)
            }

            ExprKind::Lambda {
                params,
                body,
                is_async,
            } => {
                self.uses("lambdas");
                if *is_async {
                    self.uses("async-await");
                }
                let params = self.convert_params(params, expr.span);
                let body = self.convert_lambda_body(body);
                ir::Expr::Lambda {
                    params,
                    body,
                    is_async: *is_async,
                }
            }

            ExprKind::New {
                ty,
                args,
                initializer,
            } => self.convert_new(ty.as_deref(), args, initializer.as_ref(), hoists),

            ExprKind::ArrayNew {
                elem_ty,
                size,
                elements,
            } => ir::Expr::Array {
                elem_ty: self.map_opt_type(elem_ty.as_deref()),
                size: size
                    .as_ref()
                    .map(|s| Box::new(self.convert_expr(s, hoists))),
                elements: elements
                    .iter()
                    .flatten()
                    .map(|e| self.convert_expr(e, hoists))
                    .collect(),
            },

            ExprKind::CollectionLiteral(items) => ir::Expr::Collection {
                kind: ir::CollectionKind::List,
                ty: None,
                items: items
                    .iter()
                    .map(|e| ir::CollectionItem::Element(self.convert_expr(e, hoists)))
                    .collect(),
            },

            ExprKind::Cast { ty, expr: inner } => ir::Expr::Cast {
                value: Box::new(self.convert_expr(inner, hoists)),
                ty: self.map_type(ty),
                safe: false,
            },
            ExprKind::As { expr: inner, ty } => ir::Expr::Cast {
                value: Box::new(self.convert_expr(inner, hoists)),
                ty: self.map_type(ty),
                safe: true,
            },
            ExprKind::Is { expr: inner, ty } => ir::Expr::TypeTest {
                value: Box::new(self.convert_expr(inner, hoists)),
                ty: self.map_type(ty),
            },
            ExprKind::IsPattern {
                expr: inner,
                pattern,
            } => self.convert_is_pattern(inner, pattern, expr.span, hoists),

            ExprKind::Await(inner) => {
                self.uses("async-await");
                ir::Expr::Await(Box::new(self.convert_expr(inner, hoists)))
            }

            ExprKind::Interpolated(parts) => {
                self.uses("string-interpolation");
                let parts = parts
                    .iter()
                    .map(|part| match part {
                        InterpolationPart::Text(text) => ir::InterpolationPart::Text(text.clone()),
                        InterpolationPart::Expr { expr, format } => ir::InterpolationPart::Expr {
                            expr: self.convert_expr(expr, hoists),
                            format: format.clone(),
                        },
                    })
                    .collect();
                ir::Expr::Interpolation(parts)
            }

            ExprKind::Switch { subject, arms } => {
                self.uses("switch-expressions");
                self.convert_switch_expr(subject, arms, expr.span, hoists)
            }

            ExprKind::Tuple(items) => {
                self.uses("tuples");
                ir::Expr::Tuple(items.iter().map(|e| self.convert_expr(e, hoists)).collect())
            }

            ExprKind::TypeOf(ty) => ir::Expr::TypeOf(self.map_type(ty)),
            ExprKind::NameOf(inner) => {
                self.uses("nameof");
                ir::Expr::string(name_of(inner))
            }
            ExprKind::Default(ty) => ir::Expr::Default(self.map_opt_type(ty.as_deref())),

            ExprKind::With {
                expr: inner,
                assignments,
            } => {
                self.uses("with-expressions");
                let value = self.convert_expr(inner, hoists);
                let updates = assignments
                    .iter()
                    .map(|a| ir::FieldInit {
                        name: a.name.clone(),
                        value: self.convert_expr(&a.value, hoists),
                    })
                    .collect();
                ir::Expr::With {
                    value: Box::new(value),
                    updates,
                }
            }

            ExprKind::Checked { checked, expr: inner } => {
                let keyword = if *checked { "checked" } else { "unchecked" };
                self.review(
                    "checked-arithmetic",
                    format!("`{keyword}` overflow context dropped"),
                    expr.span,
                );
                self.convert_expr(inner, hoists)
            }

            ExprKind::ThrowExpr(_) => self.fallback_expr(expr, "throw-expressions"),
            ExprKind::Query => self.fallback_expr(expr, "linq-query-syntax"),
            ExprKind::Range { .. } | ExprKind::IndexFromEnd(_) => self.fallback_expr(expr, "ranges"),
            ExprKind::Unsafe { kind } => {
                let feature = match kind.as_str() {
                    "stackalloc" => "stackalloc",
                    "sizeof" => "sizeof",
                    _ => "pointers",
                };
                self.fallback_expr(expr, feature)
            }
            ExprKind::Unknown { .. } => self.fallback_expr(expr, "unknown-expression"),
        }
    }

    pub(crate) fn convert_args(&mut self, args: &[Argument], hoists: &mut Hoists) -> Vec<ir::Arg> {
        args.iter()
            .map(|arg| {
                if arg.modifier.is_some() {
                    self.review(
                        "ref-parameters",
                        "argument passed by reference",
                        arg.value.span,
                    );
                }
                ir::Arg {
                    name: arg.name.clone(),
                    value: self.convert_expr(&arg.value, hoists),
                }
            })
            .collect()
    }

    /// Convert an operand that only runs on some paths: the right side of
    /// `&&`, `||` and `??`, conditional branches, `?.` arguments, switch arms
    /// and guards. Its hoisted statements must not run ahead of the enclosing
    /// statement, so they move into an inline block evaluated in the
    /// operand's place. Temporaries and bindings stay declared outside the
    /// block so the rest of the statement can read them.
    pub(crate) fn convert_guarded(&mut self, expr: &Expr, hoists: &mut Hoists) -> ir::Expr {
        let mut inner = Hoists::new();
        let value = self.convert_expr(expr, &mut inner);
        if inner.stmts.is_empty() {
            hoists.bindings.append(&mut inner.bindings);
            return value;
        }
        tracing::trace!(line = expr.span.line, "conditional operand kept in an inline block");
        self.review(
            "conditional-hoisting",
            "nested call in a conditionally evaluated operand moved into an inline block",
            expr.span,
        );
        let mut pending = Vec::new();
        inner.drain_into(&mut pending);
        let mut body = Vec::with_capacity(pending.len());
        for stmt in pending {
            match stmt {
                ir::Stmt::Bind {
                    name,
                    ty,
                    init: Some(init),
                    ..
                } => {
                    hoists.push(ir::Stmt::Bind {
                        name: name.clone(),
                        ty,
                        mutable: true,
                        init: None,
                    });
                    body.push(ir::Stmt::assign(ir::Expr::reference(name), init));
                }
                declaration @ ir::Stmt::Bind { init: None, .. } => hoists.push(declaration),
                other => body.push(other),
            }
        }
        invoke_block(body, value)
    }

    fn convert_guarded_args(&mut self, args: &[Argument], hoists: &mut Hoists) -> Vec<ir::Arg> {
        args.iter()
            .map(|arg| ir::Arg {
                name: arg.name.clone(),
                value: self.convert_guarded(&arg.value, hoists),
            })
            .collect()
    }

    fn convert_invoke(&mut self, callee: &Expr, args: &[Argument], hoists: &mut Hoists) -> ir::Expr {
        let ExprKind::Member {
            object,
            name,
            type_args,
        } = &callee.kind
        else {
            let callee = self.convert_expr(callee, hoists);
            return ir::Expr::Call {
                callee: Box::new(callee),
                type_args: Vec::new(),
                args: self.convert_args(args, hoists),
            };
        };

        if let Some(native) = self.native_call(object, name, args.len()) {
            self.ctx.stats.native_ops += 1;
            let mut operands = Vec::with_capacity(args.len() + 1);
            if native.takes_receiver {
                operands.push(self.convert_expr(object, hoists));
            }
            operands.extend(self.convert_args(args, hoists).into_iter().map(|a| a.value));
            return ir::Expr::native(native.op.tag(), operands);
        }

        let receiver = self.convert_receiver(object, hoists);
        ir::Expr::Call {
            callee: Box::new(ir::Expr::member(receiver, name.as_str())),
            type_args: type_args.iter().map(|t| self.map_type(t)).collect(),
            args: self.convert_args(args, hoists),
        }
    }

    /// A receiver that is itself a method call is bound to a temporary.
    fn convert_receiver(&mut self, object: &Expr, hoists: &mut Hoists) -> ir::Expr {
        let value = self.convert_expr(object, hoists);
        if !self.options.hoist_nested_calls || !object.is_invocation_on_member() {
            return value;
        }
        let temp = self.ctx.fresh_temp("tmp");
        tracing::trace!(temp = %temp, "hoisted nested call receiver");
        hoists.push(ir::Stmt::bind(temp.clone(), None, value));
        ir::Expr::reference(temp)
    }

    /// `x ?? y` becomes `x == null ? y : x`.
    fn convert_coalesce(&mut self, left: &Expr, right: &Expr, hoists: &mut Hoists) -> ir::Expr {
        self.uses("null-coalescing");
        let left = self.convert_expr(left, hoists);
        let left = self.stable_value(left, hoists);
        let right = self.convert_guarded(right, hoists);
        ir::Expr::conditional(
            ir::Expr::binary(left.clone(), ir::BinaryOp::Eq, ir::Expr::null()),
            right,
            left,
        )
    }

    /// Lambda bodies hoist into their own scope, never the caller's.
    fn convert_lambda_body(&mut self, body: &LambdaBody) -> ir::LambdaBody {
        match body {
            LambdaBody::Block(stmts) => ir::LambdaBody::Block(self.convert_block(stmts)),
            LambdaBody::Expr(e) if is_statement_expr(e) => {
                ir::LambdaBody::Block(self.convert_block(&[Stmt::expr(e.as_ref().clone())]))
            }
            LambdaBody::Expr(e) => {
                let mut inner = Hoists::new();
                let value = self.convert_expr(e, &mut inner);
                if inner.is_empty() {
                    return ir::LambdaBody::Expr(Box::new(value));
                }
                let mut stmts = Vec::new();
                inner.drain_into(&mut stmts);
                stmts.push(ir::Stmt::Return(Some(value)));
                ir::LambdaBody::Block(stmts)
            }
        }
    }

    fn convert_new(
        &mut self,
        ty: Option<&str>,
        args: &[Argument],
        initializer: Option<&Initializer>,
        hoists: &mut Hoists,
    ) -> ir::Expr {
        if let Some(ty) = ty
            && initializer.is_none()
            && self.options.native_operations
            && let Some(op) = native::classify_new(ty, args.len())
        {
            self.ctx.stats.native_ops += 1;
            let operands = self
                .convert_args(args, hoists)
                .into_iter()
                .map(|a| a.value)
                .collect();
            return ir::Expr::native(op.tag(), operands);
        }

        let mapped = self.map_opt_type(ty);
        match initializer {
            None => ir::Expr::New {
                ty: mapped,
                args: self.convert_args(args, hoists),
                initializers: Vec::new(),
            },
            Some(Initializer::Object(inits)) => {
                self.uses("object-initializers");
                let args = self.convert_args(args, hoists);
                let initializers = inits
                    .iter()
                    .map(|init| ir::FieldInit {
                        name: init.name.clone(),
                        value: self.convert_expr(&init.value, hoists),
                    })
                    .collect();
                ir::Expr::New {
                    ty: mapped,
                    args,
                    initializers,
                }
            }
            Some(Initializer::Collection(items)) => {
                self.uses("collection-initializers");
                let kind = collection_kind(ty);
                let items = items
                    .iter()
                    .map(|item| match (&item.kind, kind) {
                        (ExprKind::Tuple(pair) | ExprKind::CollectionLiteral(pair), ir::CollectionKind::Map)
                            if pair.len() == 2 =>
                        {
                            ir::CollectionItem::Entry {
                                key: self.convert_expr(&pair[0], hoists),
                                value: self.convert_expr(&pair[1], hoists),
                            }
                        }
                        _ => ir::CollectionItem::Element(self.convert_expr(item, hoists)),
                    })
                    .collect();
                ir::Expr::Collection {
                    kind,
                    ty: mapped,
                    items,
                }
            }
            Some(Initializer::Dictionary(entries)) => {
                self.uses("collection-initializers");
                let items = entries
                    .iter()
                    .map(|kv| ir::CollectionItem::Entry {
                        key: self.convert_expr(&kv.key, hoists),
                        value: self.convert_expr(&kv.value, hoists),
                    })
                    .collect();
                ir::Expr::Collection {
                    kind: ir::CollectionKind::Map,
                    ty: mapped,
                    items,
                }
            }
        }
    }
}

pub(crate) fn convert_literal(lit: &Literal) -> ir::Literal {
    match lit {
        Literal::Null => ir::Literal::Null,
        Literal::Bool(b) => ir::Literal::Bool(*b),
        Literal::Int(n) => ir::Literal::Int(*n),
        Literal::Float(f) => ir::Literal::Float(*f),
        Literal::Char(c) => ir::Literal::Char(*c),
        Literal::String(s) => ir::Literal::String(s.clone()),
    }
}

/// `None` for `??`, which has no direct counterpart.
pub(crate) fn binary_op(op: BinaryOp) -> Option<ir::BinaryOp> {
    Some(match op {
        BinaryOp::Add => ir::BinaryOp::Add,
        BinaryOp::Sub => ir::BinaryOp::Sub,
        BinaryOp::Mul => ir::BinaryOp::Mul,
        BinaryOp::Div => ir::BinaryOp::Div,
        BinaryOp::Mod => ir::BinaryOp::Mod,
        BinaryOp::Eq => ir::BinaryOp::Eq,
        BinaryOp::Ne => ir::BinaryOp::Ne,
        BinaryOp::Lt => ir::BinaryOp::Lt,
        BinaryOp::Le => ir::BinaryOp::Le,
        BinaryOp::Gt => ir::BinaryOp::Gt,
        BinaryOp::Ge => ir::BinaryOp::Ge,
        BinaryOp::And => ir::BinaryOp::And,
        BinaryOp::Or => ir::BinaryOp::Or,
        BinaryOp::BitAnd => ir::BinaryOp::BitAnd,
        BinaryOp::BitOr => ir::BinaryOp::BitOr,
        BinaryOp::BitXor => ir::BinaryOp::BitXor,
        BinaryOp::Shl => ir::BinaryOp::Shl,
        BinaryOp::Shr => ir::BinaryOp::Shr,
        BinaryOp::Coalesce => return None,
    })
}

/// `None` for plain `=`.
pub(crate) fn compound_op(op: AssignOp) -> Option<ir::CompoundOp> {
    Some(match op {
        AssignOp::Assign => return None,
        AssignOp::Add => ir::CompoundOp::Add,
        AssignOp::Sub => ir::CompoundOp::Sub,
        AssignOp::Mul => ir::CompoundOp::Mul,
        AssignOp::Div => ir::CompoundOp::Div,
        AssignOp::Mod => ir::CompoundOp::Mod,
        AssignOp::BitAnd => ir::CompoundOp::BitAnd,
        AssignOp::BitOr => ir::CompoundOp::BitOr,
        AssignOp::BitXor => ir::CompoundOp::BitXor,
        AssignOp::Shl => ir::CompoundOp::Shl,
        AssignOp::Shr => ir::CompoundOp::Shr,
        AssignOp::Coalesce => ir::CompoundOp::Coalesce,
    })
}

/// Assignments and increments, which convert as statements.
pub(crate) fn is_statement_expr(expr: &Expr) -> bool {
    matches!(
        &expr.kind,
        ExprKind::Assign { .. }
            | ExprKind::Unary {
                op: UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec,
                ..
            }
    )
}

/// `value == null ? null : access`
fn null_guarded(value: ir::Expr, access: ir::Expr) -> ir::Expr {
    ir::Expr::conditional(
        ir::Expr::binary(value, ir::BinaryOp::Eq, ir::Expr::null()),
        ir::Expr::null(),
        access,
    )
}

fn collection_kind(ty: Option<&str>) -> ir::CollectionKind {
    let Some(ty) = ty else {
        return ir::CollectionKind::List;
    };
    let bare = ty.split('<').next().unwrap_or(ty);
    let bare = bare.rsplit('.').next().unwrap_or(bare);
    match bare {
        "Dictionary" | "IDictionary" | "SortedDictionary" | "ConcurrentDictionary"
        | "IReadOnlyDictionary" => ir::CollectionKind::Map,
        "HashSet" | "ISet" | "SortedSet" => ir::CollectionKind::Set,
        _ => ir::CollectionKind::List,
    }
}

/// Last identifier of a `nameof` operand.
fn name_of(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Ident(name) | ExprKind::Member { name, .. } => name.clone(),
        ExprKind::Invoke { callee, .. } => name_of(callee),
        _ => expr.source_text().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::context::ConversionContext;
    use crate::effects::BUILTIN_EFFECTS;
    use crate::source::{KeyValue, MemberInit, Pattern};

    fn convert(expr: &Expr) -> (ir::Expr, Vec<ir::Stmt>, ConversionContext) {
        convert_with(expr, ConversionOptions::default())
    }

    fn convert_with(
        expr: &Expr,
        options: ConversionOptions,
    ) -> (ir::Expr, Vec<ir::Stmt>, ConversionContext) {
        let mut ctx = ConversionContext::new();
        let mut hoists = Hoists::new();
        let value = Converter::new(&mut ctx, &options, &BUILTIN_EFFECTS).convert_expr(expr, &mut hoists);
        let mut out = Vec::new();
        hoists.drain_into(&mut out);
        (value, out, ctx)
    }

    #[test]
    fn test_coalesce_becomes_conditional() {
        let expr = Expr::binary(Expr::ident("x"), BinaryOp::Coalesce, Expr::ident("y"));
        let (value, hoisted, ctx) = convert(&expr);
        assert!(hoisted.is_empty());
        assert_eq!(
            value,
            ir::Expr::conditional(
                ir::Expr::binary(ir::Expr::reference("x"), ir::BinaryOp::Eq, ir::Expr::null()),
                ir::Expr::reference("y"),
                ir::Expr::reference("x"),
            )
        );
        assert_eq!(ctx.feature_usage().get("null-coalescing"), Some(&1));
    }

    #[test]
    fn test_coalesce_hoists_complex_left() {
        let expr = Expr::binary(
            Expr::call(Expr::ident("Find"), vec![]),
            BinaryOp::Coalesce,
            Expr::string("none"),
        );
        let (value, hoisted, _) = convert(&expr);
        assert_eq!(hoisted.len(), 1);
        assert_eq!(hoisted[0].bound_name(), Some("_tmp1"));
        match value {
            ir::Expr::Conditional { otherwise, .. } => {
                assert_eq!(*otherwise, ir::Expr::reference("_tmp1"));
            }
            _ => panic!("expected conditional"),
        }
    }

    #[test]
    fn test_nested_call_receiver_hoisted() {
        let expr = Expr::method_call(
            Expr::method_call(Expr::ident("repo"), "Load", vec![]),
            "Save",
            vec![],
        );
        let (value, hoisted, ctx) = convert(&expr);
        assert_eq!(hoisted.len(), 1);
        match &hoisted[0] {
            ir::Stmt::Bind {
                name,
                mutable,
                init: Some(ir::Expr::Call { .. }),
                ..
            } => {
                assert_eq!(name, "_tmp1");
                assert!(!mutable);
            }
            _ => panic!("expected hoisted binding"),
        }
        match value {
            ir::Expr::Call { callee, .. } => {
                assert_eq!(*callee, ir::Expr::member(ir::Expr::reference("_tmp1"), "Save"));
            }
            _ => panic!("expected call"),
        }
        assert_eq!(ctx.stats.temporaries, 1);
    }

    #[test]
    fn test_short_circuit_operand_keeps_its_calls() {
        // x != null && x.Load().Run()
        let expr = Expr::binary(
            Expr::binary(Expr::ident("x"), BinaryOp::Ne, Expr::null()),
            BinaryOp::And,
            Expr::method_call(Expr::method_call(Expr::ident("x"), "Load", vec![]), "Run", vec![]),
        );
        let (value, hoisted, ctx) = convert(&expr);
        assert_eq!(
            hoisted,
            vec![ir::Stmt::Bind {
                name: "_tmp1".into(),
                ty: None,
                mutable: true,
                init: None,
            }]
        );
        let ir::Expr::Binary {
            op: ir::BinaryOp::And,
            right,
            ..
        } = value
        else {
            panic!("expected &&");
        };
        match *right {
            ir::Expr::Call { callee, args, .. } => {
                assert!(args.is_empty());
                match *callee {
                    ir::Expr::Lambda {
                        body: ir::LambdaBody::Block(body),
                        ..
                    } => {
                        assert_eq!(body.len(), 2);
                        assert!(matches!(
                            &body[0],
                            ir::Stmt::Assign { target: ir::Expr::Ref(name), .. } if name == "_tmp1"
                        ));
                        assert!(matches!(&body[1], ir::Stmt::Return(Some(ir::Expr::Call { .. }))));
                    }
                    _ => panic!("expected inline block"),
                }
            }
            _ => panic!("expected invoked block"),
        }
        let issue = &ctx.issues()[0];
        assert_eq!(issue.kind, crate::context::IssueKind::ManualReview);
        assert_eq!(issue.feature.as_deref(), Some("conditional-hoisting"));
    }

    #[test]
    fn test_conditional_branches_evaluate_lazily() {
        let expr = Expr::new(ExprKind::Conditional {
            cond: Box::new(Expr::ident("cached")),
            then: Box::new(Expr::ident("last")),
            otherwise: Box::new(Expr::method_call(
                Expr::method_call(Expr::ident("repo"), "Load", vec![]),
                "First",
                vec![],
            )),
        });
        let (value, hoisted, _) = convert(&expr);
        assert_eq!(hoisted.len(), 1);
        assert!(matches!(&hoisted[0], ir::Stmt::Bind { init: None, .. }));
        match value {
            ir::Expr::Conditional { then, otherwise, .. } => {
                assert_eq!(*then, ir::Expr::reference("last"));
                assert!(matches!(*otherwise, ir::Expr::Call { .. }));
            }
            _ => panic!("expected conditional"),
        }

        // Nothing to hoist: operands convert in place with no issue.
        let expr = Expr::binary(Expr::ident("a"), BinaryOp::Or, Expr::call(Expr::ident("Check"), vec![]));
        let (value, hoisted, ctx) = convert(&expr);
        assert!(hoisted.is_empty());
        assert!(matches!(value, ir::Expr::Binary { op: ir::BinaryOp::Or, .. }));
        assert!(ctx.issues().is_empty());
    }

    #[test]
    fn test_native_outer_call_not_hoisted() {
        let expr = Expr::method_call(
            Expr::method_call(Expr::ident("reader"), "ReadLine", vec![]),
            "Trim",
            vec![],
        );
        let (value, hoisted, ctx) = convert(&expr);
        assert!(hoisted.is_empty());
        match value {
            ir::Expr::NativeOp { op, args } => {
                assert_eq!(op, "str.trim");
                assert!(matches!(args[0], ir::Expr::Call { .. }));
            }
            _ => panic!("expected native op"),
        }
        assert_eq!(ctx.stats.native_ops, 1);
    }

    #[test]
    fn test_native_operations_disabled() {
        let expr = Expr::method_call(Expr::ident("name"), "Trim", vec![]);
        let options = ConversionOptions {
            native_operations: false,
            ..ConversionOptions::default()
        };
        let (value, _, _) = convert_with(&expr, options);
        assert!(matches!(value, ir::Expr::Call { .. }));
    }

    #[test]
    fn test_string_length_is_native() {
        let expr = Expr::member(Expr::ident("name"), "Length");
        let (value, _, _) = convert(&expr);
        assert_eq!(
            value,
            ir::Expr::native("str.len", vec![ir::Expr::reference("name")])
        );
        let expr = Expr::member(Expr::ident("items"), "Length");
        let (value, _, _) = convert(&expr);
        assert!(matches!(value, ir::Expr::Member { .. }));
    }

    #[test]
    fn test_conditional_access() {
        let expr = Expr::new(ExprKind::ConditionalAccess {
            object: Box::new(Expr::ident("user")),
            name: "Name".into(),
            args: None,
        });
        let (value, hoisted, _) = convert(&expr);
        assert!(hoisted.is_empty());
        assert_eq!(
            value,
            ir::Expr::conditional(
                ir::Expr::binary(ir::Expr::reference("user"), ir::BinaryOp::Eq, ir::Expr::null()),
                ir::Expr::null(),
                ir::Expr::member(ir::Expr::reference("user"), "Name"),
            )
        );
    }

    #[test]
    fn test_embedded_assignment_falls_back() {
        let expr = Expr::assign(AssignOp::Assign, Expr::ident("a"), Expr::int(1)).with_text("a = 1");
        let (value, _, ctx) = convert(&expr);
        match value {
            ir::Expr::Fallback(fallback) => {
                assert_eq!(fallback.text, "a = 1");
                assert_eq!(fallback.feature, "embedded-assignment");
            }
            _ => panic!("expected fallback"),
        }
        assert_eq!(ctx.stats.fallbacks, 1);
        assert_eq!(ctx.issues().len(), 1);
    }

    #[test]
    fn test_unsupported_expressions_are_total() {
        let cases = [
            (ExprKind::Query, "linq-query-syntax"),
            (ExprKind::IndexFromEnd(Box::new(Expr::int(1))), "ranges"),
            (ExprKind::Unsafe { kind: "stackalloc".into() }, "stackalloc"),
            (ExprKind::Unsafe { kind: "member".into() }, "pointers"),
            (ExprKind::ThrowExpr(Box::new(Expr::ident("e"))), "throw-expressions"),
            (ExprKind::Unknown { kind: "ref".into() }, "unknown-expression"),
        ];
        for (kind, feature) in cases {
            let (value, _, _) = convert(&Expr::new(kind));
            match value {
                ir::Expr::Fallback(fallback) => assert_eq!(fallback.feature, feature),
                _ => panic!("expected fallback for {feature}"),
            }
        }
    }

    #[test]
    fn test_lambda_assignment_body_is_block() {
        let expr = Expr::lambda(
            &["x"],
            Expr::assign(AssignOp::Add, Expr::ident("total"), Expr::ident("x")),
        );
        let (value, hoisted, _) = convert(&expr);
        assert!(hoisted.is_empty());
        match value {
            ir::Expr::Lambda {
                body: ir::LambdaBody::Block(body),
                ..
            } => assert!(matches!(
                body.as_slice(),
                [ir::Stmt::CompoundAssign {
                    op: ir::CompoundOp::Add,
                    ..
                }]
            )),
            _ => panic!("expected block lambda"),
        }
    }

    #[test]
    fn test_lambda_keeps_hoists_inside() {
        let body = Expr::is_pattern(
            Expr::method_call(Expr::ident("x"), "Get", vec![]),
            Pattern::Type("Foo".into()),
        );
        let (value, hoisted, _) = convert(&Expr::lambda(&["x"], body));
        assert!(hoisted.is_empty());
        assert!(matches!(
            value,
            ir::Expr::Lambda {
                body: ir::LambdaBody::Expr(_),
                ..
            }
        ));

        let nested = Expr::method_call(
            Expr::method_call(Expr::ident("x"), "Load", vec![]),
            "Save",
            vec![],
        );
        let (value, hoisted, _) = convert(&Expr::lambda(&["x"], nested));
        assert!(hoisted.is_empty());
        match value {
            ir::Expr::Lambda {
                body: ir::LambdaBody::Block(body),
                ..
            } => {
                assert_eq!(body.len(), 2);
                assert!(matches!(body[1], ir::Stmt::Return(Some(_))));
            }
            _ => panic!("expected block lambda"),
        }
    }

    #[test]
    fn test_initializers() {
        let object = Expr::new(ExprKind::New {
            ty: Some("Point".into()),
            args: Vec::new(),
            initializer: Some(Initializer::Object(vec![MemberInit {
                name: "X".into(),
                value: Expr::int(1),
            }])),
        });
        match convert(&object).0 {
            ir::Expr::New {
                ty, initializers, ..
            } => {
                assert_eq!(ty.as_deref(), Some("Point"));
                assert_eq!(initializers[0].name, "X");
            }
            _ => panic!("expected new"),
        }

        let dict = Expr::new(ExprKind::New {
            ty: Some("Dictionary<string, int>".into()),
            args: Vec::new(),
            initializer: Some(Initializer::Dictionary(vec![KeyValue {
                key: Expr::string("a"),
                value: Expr::int(1),
            }])),
        });
        match convert(&dict).0 {
            ir::Expr::Collection { kind, ty, items } => {
                assert_eq!(kind, ir::CollectionKind::Map);
                assert_eq!(ty.as_deref(), Some("Dict<str, i32>"));
                assert!(matches!(items[0], ir::CollectionItem::Entry { .. }));
            }
            _ => panic!("expected collection"),
        }

        let set = Expr::new(ExprKind::New {
            ty: Some("HashSet<int>".into()),
            args: Vec::new(),
            initializer: Some(Initializer::Collection(vec![Expr::int(1), Expr::int(2)])),
        });
        match convert(&set).0 {
            ir::Expr::Collection { kind, items, .. } => {
                assert_eq!(kind, ir::CollectionKind::Set);
                assert_eq!(items.len(), 2);
            }
            _ => panic!("expected collection"),
        }
    }

    #[test]
    fn test_string_builder_new_is_native() {
        let (value, _, _) = convert(&Expr::new_object("StringBuilder", vec![]));
        assert_eq!(value, ir::Expr::native("sb.new", vec![]));
    }

    #[test]
    fn test_nameof_is_string() {
        let expr = Expr::new(ExprKind::NameOf(Box::new(Expr::member(
            Expr::new(ExprKind::This),
            "Count",
        ))));
        assert_eq!(convert(&expr).0, ir::Expr::string("Count"));
    }
}
