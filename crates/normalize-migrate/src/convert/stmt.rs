//! Statement conversion.

use super::expr::{compound_op, is_statement_expr};
use super::pattern::{binds_on_failure, is_structural};
use super::{Converter, Hoists};
use crate::chain::ChainTarget;
use crate::ir;
use crate::native;
use crate::source::{
    AssignOp, Expr, ExprKind, ForEachTarget, LocalDecl, Pattern, Span, Stmt, StmtKind,
    SwitchLabel, SwitchSection, UnaryOp,
};

impl Converter<'_> {
    /// Convert one statement, appending the result (and anything hoisted
    /// ahead of it) to `out`. Always appends at least one statement.
    pub fn convert_statement(&mut self, stmt: &Stmt, out: &mut Vec<ir::Stmt>) {
        self.ctx.stats.statements += 1;
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                let body = self.convert_block(stmts);
                out.push(ir::Stmt::Block(body));
            }
            StmtKind::LocalDecl(decl) if decl.is_using => {
                self.convert_using_decl(decl, out, |_| Vec::new());
            }
            StmtKind::LocalDecl(decl) => self.convert_local_decl(decl, out),
            StmtKind::Expr(expr) => self.convert_expr_stmt(expr, out),
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => self.convert_if(cond, then, otherwise.as_deref(), out),

            StmtKind::While { cond, body } => {
                let mut hoists = Hoists::new();
                let cond_ir = self.convert_expr(cond, &mut hoists);
                let bindings = hoists.take_bindings();
                let mut body_ir = Vec::new();
                if !binds_on_failure(cond) {
                    body_ir.extend(bindings.iter().cloned());
                }
                body_ir.extend(self.convert_branch(body));
                self.drain_loop_header(&mut hoists, stmt.span, out);
                out.push(ir::Stmt::While {
                    cond: cond_ir,
                    body: body_ir,
                });
                if binds_on_failure(cond) {
                    out.extend(bindings);
                }
            }

            StmtKind::DoWhile { body, cond } => {
                let body = self.convert_branch(body);
                let mut hoists = Hoists::new();
                let cond = self.convert_expr(cond, &mut hoists);
                self.drain_loop_header(&mut hoists, stmt.span, out);
                out.push(ir::Stmt::DoWhile { body, cond });
            }

            StmtKind::For {
                decl,
                init,
                cond,
                step,
                body,
            } => {
                if let Some(range) = self.convert_for_range(decl.as_ref(), cond.as_ref(), step, body, out) {
                    out.push(range);
                    return;
                }
                let mut init_ir = Vec::new();
                if let Some(decl) = decl {
                    self.convert_local_decl(decl, &mut init_ir);
                }
                for expr in init {
                    self.convert_expr_stmt(expr, &mut init_ir);
                }
                let mut hoists = Hoists::new();
                let cond_ir = cond.as_ref().map(|c| self.convert_expr(c, &mut hoists));
                let bindings = hoists.take_bindings();
                let binds_after = cond.as_ref().is_some_and(binds_on_failure);
                let mut body_ir = if binds_after { Vec::new() } else { bindings.clone() };
                // After the init so the header can see the loop variable.
                self.drain_loop_header(&mut hoists, stmt.span, &mut init_ir);
                let mut step_ir = Vec::new();
                for expr in step {
                    self.convert_expr_stmt(expr, &mut step_ir);
                }
                body_ir.extend(self.convert_branch(body));
                out.push(ir::Stmt::For {
                    init: init_ir,
                    cond: cond_ir,
                    step: step_ir,
                    body: body_ir,
                });
                if binds_after {
                    out.extend(bindings);
                }
            }

            StmtKind::ForEach {
                ty,
                target,
                iterable,
                body,
                is_await,
            } => {
                self.uses("foreach");
                let mut hoists = Hoists::new();
                let iterable = self.convert_expr(iterable, &mut hoists);
                let (var, ty, mut body_ir) = match target {
                    ForEachTarget::Name(name) => (name.clone(), self.map_opt_type(ty.as_deref()), Vec::new()),
                    ForEachTarget::Deconstruct(names) => {
                        self.uses("tuples");
                        let item = self.ctx.fresh_temp("item");
                        let binds: Vec<ir::Stmt> = names
                            .iter()
                            .enumerate()
                            .filter(|(_, name)| name.as_str() != "_")
                            .map(|(i, name)| {
                                ir::Stmt::bind(
                                    name.as_str(),
                                    None,
                                    ir::Expr::member(ir::Expr::reference(item.as_str()), format!("Item{}", i + 1)),
                                )
                            })
                            .collect();
                        (item, None, binds)
                    }
                };
                body_ir.extend(self.convert_branch(body));
                self.drain_loop_header(&mut hoists, stmt.span, out);
                out.push(ir::Stmt::ForEach {
                    var,
                    ty,
                    iterable,
                    body: body_ir,
                    is_await: *is_await,
                });
            }

            StmtKind::Return(None) => out.push(ir::Stmt::Return(None)),
            StmtKind::Return(Some(value)) => {
                if let Some(steps) = self.decomposable_chain(value) {
                    self.decompose_chain(&steps, ChainTarget::Return, out);
                    return;
                }
                let value = self.with_hoists(value, out);
                out.push(ir::Stmt::Return(Some(value)));
            }
            StmtKind::Break => out.push(ir::Stmt::Break),
            StmtKind::Continue => out.push(ir::Stmt::Continue),
            StmtKind::Throw(value) => {
                self.uses("exceptions");
                let value = value.as_ref().map(|v| self.with_hoists(v, out));
                out.push(ir::Stmt::Throw(value));
            }

            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                self.uses("exceptions");
                let body = self.convert_block(body);
                let mut catches_ir = Vec::with_capacity(catches.len());
                for catch in catches {
                    // The filter sees the caught exception, so it cannot
                    // hoist ahead of the `try`.
                    let filter = catch.filter.as_ref().map(|f| {
                        self.uses("exception-filters");
                        self.convert_standalone_expr(f)
                    });
                    catches_ir.push(ir::CatchClause {
                        ty: self.map_opt_type(catch.ty.as_deref()),
                        name: catch.name.clone(),
                        filter,
                        body: self.convert_block(&catch.body),
                    });
                }
                let finally = finally.as_ref().map(|f| self.convert_block(f));
                out.push(ir::Stmt::Try {
                    body,
                    catches: catches_ir,
                    finally,
                });
            }

            StmtKind::Switch { subject, sections } => {
                self.convert_switch(subject, sections, stmt.span, out);
            }

            StmtKind::Using { decl, expr, body } => match (decl, expr) {
                (Some(decl), _) => self.convert_using_decl(decl, out, |this| this.convert_branch(body)),
                (None, Some(resource)) => {
                    self.uses("using-statement");
                    let resource = self.with_hoists(resource, out);
                    let body = self.convert_branch(body);
                    out.push(ir::Stmt::Using {
                        name: None,
                        ty: None,
                        resource,
                        body,
                    });
                }
                (None, None) => {
                    let body = self.convert_branch(body);
                    out.push(ir::Stmt::Block(body));
                }
            },

            StmtKind::Lock { body, .. } => {
                self.review(
                    "lock-statement",
                    "lock removed; the body runs without synchronization",
                    stmt.span,
                );
                let body = self.convert_branch(body);
                out.push(ir::Stmt::Block(body));
            }

            StmtKind::YieldReturn(value) => {
                self.uses("iterators");
                let value = self.with_hoists(value, out);
                out.push(ir::Stmt::Yield(value));
            }
            StmtKind::YieldBreak => {
                self.uses("iterators");
                out.push(ir::Stmt::YieldBreak);
            }

            StmtKind::LocalFunction(decl) => {
                self.uses("local-functions");
                let method = self.convert_method(decl);
                out.push(ir::Stmt::LocalFunction(Box::new(method)));
            }

            StmtKind::Empty => out.push(ir::Stmt::Block(Vec::new())),

            StmtKind::Checked { checked, body } => {
                let keyword = if *checked { "checked" } else { "unchecked" };
                self.review(
                    "checked-arithmetic",
                    format!("`{keyword}` block converted without overflow semantics"),
                    stmt.span,
                );
                let body = self.convert_block(body);
                out.push(ir::Stmt::Block(body));
            }

            StmtKind::Labeled { .. } => out.push(self.fallback_stmt(stmt, "labeled-statement")),
            StmtKind::Goto(_) => out.push(self.fallback_stmt(stmt, "goto")),
            StmtKind::Unsafe(_) => out.push(self.fallback_stmt(stmt, "unsafe-code")),
            StmtKind::Fixed { .. } => out.push(self.fallback_stmt(stmt, "fixed-statement")),
            StmtKind::Unknown { .. } => out.push(self.fallback_stmt(stmt, "unknown-statement")),
        }
    }

    /// Body of a branch or loop. A block contributes its statements
    /// directly.
    pub(crate) fn convert_branch(&mut self, stmt: &Stmt) -> Vec<ir::Stmt> {
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                self.ctx.stats.statements += 1;
                self.convert_block(stmts)
            }
            _ => self.convert_block(std::slice::from_ref(stmt)),
        }
    }

    /// Convert `expr` and flush its hoists into `out`.
    fn with_hoists(&mut self, expr: &Expr, out: &mut Vec<ir::Stmt>) -> ir::Expr {
        let mut hoists = Hoists::new();
        let value = self.convert_expr(expr, &mut hoists);
        hoists.drain_into(out);
        value
    }

    /// Loop headers are hoisted once, ahead of the loop, not re-evaluated
    /// per iteration. Sound only when the hoisted values are lazy.
    fn drain_loop_header(&mut self, hoists: &mut Hoists, span: Span, out: &mut Vec<ir::Stmt>) {
        if !hoists.is_empty() {
            tracing::trace!(line = span.line, "loop header hoisted ahead of the loop");
        }
        hoists.drain_into(out);
    }

    fn convert_local_decl(&mut self, decl: &LocalDecl, out: &mut Vec<ir::Stmt>) {
        let ty = self.map_opt_type(decl.ty.as_deref());
        let mutable = !decl.is_const;
        for declarator in &decl.declarators {
            let Some(init) = &declarator.init else {
                out.push(ir::Stmt::Bind {
                    name: declarator.name.clone(),
                    ty: ty.clone(),
                    mutable,
                    init: None,
                });
                continue;
            };
            if let Some(steps) = self.decomposable_chain(init) {
                let target = ChainTarget::Declare {
                    name: declarator.name.clone(),
                    ty: ty.clone(),
                    mutable,
                };
                self.decompose_chain(&steps, target, out);
                continue;
            }
            let value = self.with_hoists(init, out);
            out.push(ir::Stmt::Bind {
                name: declarator.name.clone(),
                ty: ty.clone(),
                mutable,
                init: Some(value),
            });
        }
    }

    /// `using var a = x, b = y;` or `using (var a = x) { ... }`. Multiple
    /// declarators nest, first outermost. `body` runs after the resources
    /// are converted.
    pub(crate) fn convert_using_decl<F>(&mut self, decl: &LocalDecl, out: &mut Vec<ir::Stmt>, body: F)
    where
        F: FnOnce(&mut Self) -> Vec<ir::Stmt>,
    {
        self.uses("using-statement");
        let ty = self.map_opt_type(decl.ty.as_deref());
        let resources: Vec<(String, ir::Expr)> = decl
            .declarators
            .iter()
            .map(|d| {
                let resource = match &d.init {
                    Some(init) => self.with_hoists(init, out),
                    None => ir::Expr::null(),
                };
                (d.name.clone(), resource)
            })
            .collect();
        let mut body = body(self);
        for (name, resource) in resources.into_iter().rev() {
            body = vec![ir::Stmt::Using {
                name: Some(name),
                ty: ty.clone(),
                resource,
                body,
            }];
        }
        out.append(&mut body);
    }

    fn convert_expr_stmt(&mut self, expr: &Expr, out: &mut Vec<ir::Stmt>) {
        match &expr.kind {
            ExprKind::Assign { op, target, value } => self.convert_assignment(*op, target, value, out),
            ExprKind::Unary { op, operand } if is_statement_expr(expr) => {
                let op = match op {
                    UnaryOp::PreDec | UnaryOp::PostDec => ir::CompoundOp::Sub,
                    _ => ir::CompoundOp::Add,
                };
                let target = self.with_hoists(operand, out);
                out.push(ir::Stmt::CompoundAssign {
                    op,
                    target,
                    value: ir::Expr::int(1),
                });
            }
            _ => {
                if let Some(steps) = self.decomposable_chain(expr) {
                    self.decompose_chain(&steps, ChainTarget::Discard, out);
                    return;
                }
                let value = self.with_hoists(expr, out);
                out.push(ir::Stmt::Expr(value));
            }
        }
    }

    fn convert_assignment(&mut self, op: AssignOp, target: &Expr, value: &Expr, out: &mut Vec<ir::Stmt>) {
        let mut hoists = Hoists::new();
        let target_ir = self.convert_expr(target, &mut hoists);
        let value_ir = self.convert_expr(value, &mut hoists);
        hoists.drain_into(out);

        let event = matches!(op, AssignOp::Add | AssignOp::Sub)
            && matches!(&target.kind, ExprKind::Member { name, .. } if native::is_event_like(name));
        let stmt = if event {
            self.uses("events");
            if op == AssignOp::Add {
                ir::Stmt::Subscribe {
                    event: target_ir,
                    handler: value_ir,
                }
            } else {
                ir::Stmt::Unsubscribe {
                    event: target_ir,
                    handler: value_ir,
                }
            }
        } else {
            match compound_op(op) {
                None => ir::Stmt::assign(target_ir, value_ir),
                Some(op) => {
                    if op == ir::CompoundOp::Coalesce {
                        self.uses("null-coalescing");
                    }
                    ir::Stmt::CompoundAssign {
                        op,
                        target: target_ir,
                        value: value_ir,
                    }
                }
            }
        };
        out.push(stmt);
    }

    fn convert_if(&mut self, cond: &Expr, then: &Stmt, otherwise: Option<&Stmt>, out: &mut Vec<ir::Stmt>) {
        let mut hoists = Hoists::new();
        let cond_ir = self.convert_expr(cond, &mut hoists);
        let bindings = hoists.take_bindings();
        hoists.drain_into(out);

        let mut then_body = self.convert_branch(then);
        let mut else_body = otherwise.map(|s| self.convert_branch(s));

        if bindings.is_empty() {
            out.push(ir::Stmt::if_stmt(cond_ir, then_body, else_body));
        } else if !binds_on_failure(cond) {
            then_body.splice(0..0, bindings);
            out.push(ir::Stmt::if_stmt(cond_ir, then_body, else_body));
        } else if let Some(body) = else_body.as_mut() {
            body.splice(0..0, bindings);
            out.push(ir::Stmt::if_stmt(cond_ir, then_body, else_body));
        } else {
            // `if (!(x is T t)) return;` binds for the code after the `if`.
            out.push(ir::Stmt::if_stmt(cond_ir, then_body, None));
            out.extend(bindings);
        }
    }

    /// `for (int i = a; i < b; i++)` and friends.
    fn convert_for_range(
        &mut self,
        decl: Option<&LocalDecl>,
        cond: Option<&Expr>,
        step: &[Expr],
        body: &Stmt,
        out: &mut Vec<ir::Stmt>,
    ) -> Option<ir::Stmt> {
        let decl = decl?;
        let [declarator] = decl.declarators.as_slice() else {
            return None;
        };
        let start = declarator.init.as_ref()?;
        if decl.ty.as_deref().is_some_and(|ty| !is_integral(ty)) || decl.is_const {
            return None;
        }
        let var = declarator.name.as_str();

        let ExprKind::Binary { op, left, right: end } = &cond?.kind else {
            return None;
        };
        let inclusive = match op {
            crate::source::BinaryOp::Lt => false,
            crate::source::BinaryOp::Le => true,
            _ => return None,
        };
        if !is_ident(left, var) || !is_range_bound(end) {
            return None;
        }

        let [step] = step else {
            return None;
        };
        let step_value = match &step.kind {
            ExprKind::Unary {
                op: UnaryOp::PreInc | UnaryOp::PostInc,
                operand,
            } if is_ident(operand, var) => None,
            ExprKind::Assign {
                op: AssignOp::Add,
                target,
                value,
            } if is_ident(target, var) && is_range_bound(value) => Some(value.as_ref()),
            _ => return None,
        };

        let mut hoists = Hoists::new();
        let start = self.convert_expr(start, &mut hoists);
        let end = self.convert_expr(end, &mut hoists);
        let step = match step_value {
            Some(value) => self.convert_expr(value, &mut hoists),
            None => ir::Expr::int(1),
        };
        hoists.drain_into(out);
        let body = self.convert_branch(body);
        Some(ir::Stmt::ForRange {
            var: var.to_string(),
            ty: self.map_opt_type(decl.ty.as_deref()),
            start,
            end,
            step,
            inclusive,
            body,
        })
    }

    fn convert_switch(&mut self, subject: &Expr, sections: &[SwitchSection], span: Span, out: &mut Vec<ir::Stmt>) {
        self.uses("switch-statement");
        let mut hoists = Hoists::new();
        let subject = self.convert_expr(subject, &mut hoists);
        let guarded = sections.iter().flat_map(|s| &s.labels).any(|label| {
            matches!(label, SwitchLabel::Pattern { pattern, .. } if !is_structural(pattern))
        });
        let subject = if guarded {
            self.stable_value(subject, &mut hoists)
        } else {
            subject
        };

        let mut label_stmts = Vec::new();
        let mut cases = Vec::new();
        for section in sections {
            let mut body = self.convert_block(&section.body);
            strip_trailing_break(&mut body);
            if breaks_out(&body) {
                self.review(
                    "switch-statement",
                    "`break` inside a switch case now targets the enclosing loop",
                    span,
                );
            }
            for label in &section.labels {
                let mut label_hoists = Hoists::new();
                let (pattern, guard) = match label {
                    SwitchLabel::Default => (ir::Pattern::Wildcard, None),
                    SwitchLabel::Case(value) => {
                        let pattern = Pattern::Constant(value.clone());
                        self.arm_pattern(&subject, &pattern, None, span, &mut label_hoists)
                    }
                    SwitchLabel::Pattern { pattern, guard } => {
                        let guard = guard.as_ref().map(|g| self.convert_guarded(g, &mut label_hoists));
                        self.arm_pattern(&subject, pattern, guard, span, &mut label_hoists)
                    }
                };
                let mut case_body = label_hoists.take_bindings();
                case_body.extend(body.iter().cloned());
                label_hoists.drain_into(&mut label_stmts);
                cases.push(ir::MatchCase {
                    pattern,
                    guard,
                    body: case_body,
                });
            }
        }
        hoists.drain_into(out);
        out.append(&mut label_stmts);
        out.push(ir::Stmt::Match { subject, cases });
    }
}

fn is_ident(expr: &Expr, name: &str) -> bool {
    matches!(&expr.kind, ExprKind::Ident(n) if n == name)
}

/// Loop bounds re-read every iteration in the source; only accept shapes
/// whose value is stable enough to read once.
fn is_range_bound(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Ident(_) => true,
        ExprKind::Member { object, .. } => {
            matches!(object.kind, ExprKind::Ident(_) | ExprKind::This)
        }
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => is_range_bound(operand),
        _ => false,
    }
}

fn is_integral(ty: &str) -> bool {
    matches!(
        ty,
        "int" | "long" | "short" | "byte" | "sbyte" | "uint" | "ulong" | "ushort" | "Int32" | "Int64"
    )
}

fn strip_trailing_break(body: &mut Vec<ir::Stmt>) {
    match body.last_mut() {
        Some(ir::Stmt::Break) => {
            body.pop();
        }
        Some(ir::Stmt::Block(inner)) if matches!(inner.last(), Some(ir::Stmt::Break)) => {
            inner.pop();
        }
        _ => {}
    }
}

/// A `break` that would leave the switch, not a nested loop.
fn breaks_out(body: &[ir::Stmt]) -> bool {
    body.iter().any(|stmt| match stmt {
        ir::Stmt::Break => true,
        ir::Stmt::If {
            then_body,
            else_body,
            ..
        } => breaks_out(then_body) || else_body.as_deref().is_some_and(breaks_out),
        ir::Stmt::Block(inner) => breaks_out(inner),
        ir::Stmt::Try {
            body,
            catches,
            finally,
        } => {
            breaks_out(body)
                || catches.iter().any(|c| breaks_out(&c.body))
                || finally.as_deref().is_some_and(breaks_out)
        }
        ir::Stmt::Using { body, .. } => breaks_out(body),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::context::ConversionContext;
    use crate::effects::BUILTIN_EFFECTS;
    use crate::source::BinaryOp;

    fn convert(stmts: &[Stmt]) -> (Vec<ir::Stmt>, ConversionContext) {
        let mut ctx = ConversionContext::new();
        let options = ConversionOptions::default();
        let out = Converter::new(&mut ctx, &options, &BUILTIN_EFFECTS).convert_block(stmts);
        (out, ctx)
    }

    #[test]
    fn test_event_subscription() {
        let stmt = Stmt::expr(Expr::assign(
            AssignOp::Add,
            Expr::member(Expr::ident("button"), "Clicked"),
            Expr::ident("OnClick"),
        ));
        let (out, ctx) = convert(&[stmt]);
        assert!(matches!(out[0], ir::Stmt::Subscribe { .. }));
        assert_eq!(ctx.feature_usage().get("events"), Some(&1));

        let counter = Stmt::expr(Expr::assign(
            AssignOp::Add,
            Expr::member(Expr::new(ExprKind::This), "Counter"),
            Expr::int(1),
        ));
        let (out, _) = convert(&[counter]);
        assert!(matches!(
            out[0],
            ir::Stmt::CompoundAssign {
                op: ir::CompoundOp::Add,
                ..
            }
        ));
    }

    #[test]
    fn test_increment_statement() {
        let stmt = Stmt::expr(Expr::unary(UnaryOp::PostInc, Expr::ident("i")));
        let (out, _) = convert(&[stmt]);
        assert_eq!(
            out,
            vec![ir::Stmt::CompoundAssign {
                op: ir::CompoundOp::Add,
                target: ir::Expr::reference("i"),
                value: ir::Expr::int(1),
            }]
        );
    }

    #[test]
    fn test_canonical_for_becomes_range() {
        let stmt = Stmt::new(StmtKind::For {
            decl: Some(LocalDecl {
                ty: Some("int".into()),
                declarators: vec![crate::source::VariableDeclarator {
                    name: "i".into(),
                    init: Some(Expr::int(0)),
                }],
                is_const: false,
                is_using: false,
            }),
            init: Vec::new(),
            cond: Some(Expr::binary(
                Expr::ident("i"),
                BinaryOp::Lt,
                Expr::member(Expr::ident("items"), "Count"),
            )),
            step: vec![Expr::unary(UnaryOp::PostInc, Expr::ident("i"))],
            body: Box::new(Stmt::block(vec![Stmt::expr(Expr::call(
                Expr::ident("Visit"),
                vec![Expr::ident("i")],
            ))])),
        });
        let (out, _) = convert(&[stmt]);
        match &out[0] {
            ir::Stmt::ForRange {
                var,
                ty,
                step,
                inclusive,
                body,
                ..
            } => {
                assert_eq!(var, "i");
                assert_eq!(ty.as_deref(), Some("i32"));
                assert_eq!(*step, ir::Expr::int(1));
                assert!(!inclusive);
                assert_eq!(body.len(), 1);
            }
            _ => panic!("expected range loop"),
        }
    }

    #[test]
    fn test_general_for_keeps_shape() {
        let stmt = Stmt::new(StmtKind::For {
            decl: None,
            init: vec![Expr::assign(AssignOp::Assign, Expr::ident("i"), Expr::int(0))],
            cond: Some(Expr::binary(
                Expr::call(Expr::ident("More"), vec![]),
                BinaryOp::And,
                Expr::bool(true),
            )),
            step: vec![Expr::unary(UnaryOp::PreDec, Expr::ident("i"))],
            body: Box::new(Stmt::new(StmtKind::Empty)),
        });
        let (out, _) = convert(&[stmt]);
        match &out[0] {
            ir::Stmt::For { init, step, .. } => {
                assert!(matches!(init[0], ir::Stmt::Assign { .. }));
                assert!(matches!(
                    step[0],
                    ir::Stmt::CompoundAssign {
                        op: ir::CompoundOp::Sub,
                        ..
                    }
                ));
            }
            _ => panic!("expected for"),
        }
    }

    #[test]
    fn test_foreach_deconstruction() {
        let stmt = Stmt::new(StmtKind::ForEach {
            ty: None,
            target: ForEachTarget::Deconstruct(vec!["key".into(), "_".into(), "value".into()]),
            iterable: Expr::ident("pairs"),
            body: Box::new(Stmt::block(Vec::new())),
            is_await: false,
        });
        let (out, _) = convert(&[stmt]);
        match &out[0] {
            ir::Stmt::ForEach { var, body, .. } => {
                assert_eq!(var, "_item1");
                assert_eq!(body.len(), 2);
                assert_eq!(body[0].bound_name(), Some("key"));
                match &body[1] {
                    ir::Stmt::Bind {
                        init: Some(ir::Expr::Member { name, .. }),
                        ..
                    } => assert_eq!(name, "Item3"),
                    _ => panic!("expected member binding"),
                }
            }
            _ => panic!("expected foreach"),
        }
    }

    #[test]
    fn test_multi_declarator_and_const() {
        let mut decl = Stmt::local("int", "a", Some(Expr::int(1)));
        if let StmtKind::LocalDecl(d) = &mut decl.kind {
            d.declarators.push(crate::source::VariableDeclarator {
                name: "b".into(),
                init: None,
            });
        }
        let mut constant = Stmt::local("string", "Name", Some(Expr::string("x")));
        if let StmtKind::LocalDecl(d) = &mut constant.kind {
            d.is_const = true;
        }
        let (out, _) = convert(&[decl, constant]);
        assert_eq!(out.len(), 3);
        assert!(matches!(&out[0], ir::Stmt::Bind { mutable: true, init: Some(_), .. }));
        assert!(matches!(&out[1], ir::Stmt::Bind { mutable: true, init: None, .. }));
        assert!(matches!(&out[2], ir::Stmt::Bind { mutable: false, .. }));
    }

    #[test]
    fn test_switch_statement() {
        let stmt = Stmt::new(StmtKind::Switch {
            subject: Expr::ident("code"),
            sections: vec![
                SwitchSection {
                    labels: vec![SwitchLabel::Case(Expr::int(1)), SwitchLabel::Case(Expr::int(2))],
                    body: vec![
                        Stmt::expr(Expr::call(Expr::ident("Low"), vec![])),
                        Stmt::new(StmtKind::Break),
                    ],
                },
                SwitchSection {
                    labels: vec![SwitchLabel::Default],
                    body: vec![Stmt::ret(None)],
                },
            ],
        });
        let (out, ctx) = convert(&[stmt]);
        match &out[0] {
            ir::Stmt::Match { cases, .. } => {
                assert_eq!(cases.len(), 3);
                assert_eq!(cases[0].pattern, ir::Pattern::Literal(ir::Literal::Int(1)));
                assert_eq!(cases[1].body.len(), 1);
                assert_eq!(cases[2].pattern, ir::Pattern::Wildcard);
            }
            _ => panic!("expected match"),
        }
        assert!(ctx.issues().is_empty());
    }

    #[test]
    fn test_goto_case_falls_back() {
        let goto = Stmt::new(StmtKind::Goto("case 2".into())).with_text("goto case 2;");
        let (out, ctx) = convert(&[goto]);
        match &out[0] {
            ir::Stmt::Fallback(fallback) => {
                assert_eq!(fallback.text, "goto case 2;");
                assert_eq!(fallback.feature, "goto");
            }
            _ => panic!("expected fallback"),
        }
        assert_eq!(ctx.issues().len(), 1);
    }

    #[test]
    fn test_negated_pattern_binds_in_else() {
        let test = Expr::unary(
            UnaryOp::Not,
            Expr::is_pattern(Expr::ident("o"), Pattern::declaration("Foo", "f")),
        );
        let stmt = Stmt::if_stmt(
            test.clone(),
            Stmt::ret(None),
            Some(Stmt::expr(Expr::method_call(Expr::ident("f"), "Run", vec![]))),
        );
        let (out, _) = convert(&[stmt]);
        match &out[0] {
            ir::Stmt::If {
                then_body,
                else_body: Some(else_body),
                ..
            } => {
                assert_eq!(then_body.len(), 1);
                assert_eq!(else_body[0].bound_name(), Some("f"));
            }
            _ => panic!("expected if/else"),
        }

        let guard = Stmt::if_stmt(test, Stmt::ret(None), None);
        let (out, _) = convert(&[guard]);
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], ir::Stmt::If { .. }));
        assert_eq!(out[1].bound_name(), Some("f"));
    }

    #[test]
    fn test_pattern_read_in_same_condition_binds_before_if() {
        // if (o is Foo f && f.Ready) { Use(f); }
        let cond = Expr::binary(
            Expr::is_pattern(Expr::ident("o"), Pattern::declaration("Foo", "f")),
            BinaryOp::And,
            Expr::member(Expr::ident("f"), "Ready"),
        );
        let then = Stmt::block(vec![Stmt::expr(Expr::call(Expr::ident("Use"), vec![Expr::ident("f")]))]);
        let (out, ctx) = convert(&[Stmt::if_stmt(cond, then, None)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].bound_name(), Some("f"));
        match &out[1] {
            ir::Stmt::If { then_body, .. } => {
                assert_eq!(then_body.len(), 1);
                assert!(then_body[0].bound_name().is_none());
            }
            _ => panic!("expected if"),
        }
        assert!(ctx.issues().is_empty());

        // Bound on the right of `&&`: still the first thing in the branch.
        let cond = Expr::binary(
            Expr::ident("ready"),
            BinaryOp::And,
            Expr::is_pattern(Expr::ident("o"), Pattern::declaration("Foo", "f")),
        );
        let then = Stmt::expr(Expr::method_call(Expr::ident("f"), "Run", vec![]));
        let (out, _) = convert(&[Stmt::if_stmt(cond, then, None)]);
        assert_eq!(out.len(), 1);
        match &out[0] {
            ir::Stmt::If { then_body, .. } => assert_eq!(then_body[0].bound_name(), Some("f")),
            _ => panic!("expected if"),
        }
    }

    #[test]
    fn test_null_guard_runs_before_guarded_call() {
        // if (x != null && x.Load().Run()) {}
        let cond = Expr::binary(
            Expr::binary(Expr::ident("x"), BinaryOp::Ne, Expr::null()),
            BinaryOp::And,
            Expr::method_call(Expr::method_call(Expr::ident("x"), "Load", vec![]), "Run", vec![]),
        );
        let (out, ctx) = convert(&[Stmt::if_stmt(cond, Stmt::block(Vec::new()), None)]);
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[0], ir::Stmt::Bind { init: None, .. }));
        assert!(matches!(out[1], ir::Stmt::If { .. }));
        let features: Vec<_> = ctx.issues().iter().filter_map(|i| i.feature.as_deref()).collect();
        assert_eq!(features, ["conditional-hoisting"]);
    }

    #[test]
    fn test_while_pattern_binds_at_body_start() {
        let cond = Expr::is_pattern(Expr::ident("next"), Pattern::declaration("Job", "job"));
        let body = Stmt::block(vec![Stmt::expr(Expr::method_call(Expr::ident("job"), "Run", vec![]))]);
        let (out, _) = convert(&[Stmt::while_loop(cond, body)]);
        assert_eq!(out.len(), 1);
        match &out[0] {
            ir::Stmt::While { body, .. } => {
                assert_eq!(body.len(), 2);
                assert_eq!(body[0].bound_name(), Some("job"));
            }
            _ => panic!("expected while"),
        }
    }

    #[test]
    fn test_for_condition_pattern_bindings() {
        let for_loop = |cond: Expr| {
            Stmt::new(StmtKind::For {
                decl: None,
                init: Vec::new(),
                cond: Some(cond),
                step: Vec::new(),
                body: Box::new(Stmt::new(StmtKind::Empty)),
            })
        };
        let test = Expr::is_pattern(Expr::ident("o"), Pattern::declaration("Foo", "f"));

        let (out, _) = convert(&[for_loop(test.clone())]);
        assert_eq!(out.len(), 1);
        match &out[0] {
            ir::Stmt::For { body, .. } => {
                assert_eq!(body.len(), 2);
                assert_eq!(body[0].bound_name(), Some("f"));
            }
            _ => panic!("expected for"),
        }

        // for (; !(o is Foo f); ) { }  binds `f` for the code after the loop.
        let (out, _) = convert(&[for_loop(Expr::unary(UnaryOp::Not, test))]);
        assert_eq!(out.len(), 2);
        match &out[0] {
            ir::Stmt::For { body, .. } => assert!(body.iter().all(|s| s.bound_name().is_none())),
            _ => panic!("expected for"),
        }
        assert_eq!(out[1].bound_name(), Some("f"));
    }

    #[test]
    fn test_lock_and_checked_need_review() {
        let lock = Stmt::new(StmtKind::Lock {
            expr: Expr::ident("gate"),
            body: Box::new(Stmt::block(vec![Stmt::expr(Expr::call(Expr::ident("Work"), vec![]))])),
        });
        let checked = Stmt::new(StmtKind::Checked {
            checked: true,
            body: Vec::new(),
        });
        let (out, ctx) = convert(&[lock, checked]);
        assert!(matches!(&out[0], ir::Stmt::Block(body) if body.len() == 1));
        let features: Vec<_> = ctx.issues().iter().filter_map(|i| i.feature.as_deref()).collect();
        assert_eq!(features, ["lock-statement", "checked-arithmetic"]);
    }
}
