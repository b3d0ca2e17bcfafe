//! Pattern conversion.
//!
//! Patterns are lowered two ways. In boolean position (`x is P`) the
//! preferred form is a plain test expression, with declaration and `var`
//! designations emitted as bindings through [`Hoists`]. In match position
//! (switch arms and cases) patterns map structurally; combinators with no
//! structural counterpart become a wildcard arm guarded by the test.

use super::expr::convert_literal;
use super::{Converter, Hoists};
use crate::ir;
use crate::source::{Expr, ExprKind, Literal, Pattern, RelationalOp, Span, SwitchArm, UnaryOp};

impl Converter<'_> {
    /// `expr is pattern`
    pub(crate) fn convert_is_pattern(
        &mut self,
        expr: &Expr,
        pattern: &Pattern,
        span: Span,
        hoists: &mut Hoists,
    ) -> ir::Expr {
        self.uses("pattern-matching");
        let value = self.convert_expr(expr, hoists);
        let value = if reads_once(pattern) {
            value
        } else {
            self.stable_value(value, hoists)
        };
        if let Some(test) = self.pattern_test(&value, pattern, hoists) {
            return test;
        }
        if let Some(pattern) = self.convert_pattern(pattern, hoists) {
            return ir::Expr::Match {
                subject: Box::new(value),
                arms: vec![
                    ir::MatchArm {
                        pattern,
                        guard: None,
                        value: ir::Expr::bool(true),
                    },
                    ir::MatchArm {
                        pattern: ir::Pattern::Wildcard,
                        guard: None,
                        value: ir::Expr::bool(false),
                    },
                ],
            };
        }
        self.fallback_pattern(pattern, span)
    }

    /// Boolean test of `value` against `pattern`, or `None` when the pattern
    /// has parts (property, positional, list) with no test form.
    ///
    /// `value` is read once per leaf, so callers pass a stable value.
    pub(crate) fn pattern_test(
        &mut self,
        value: &ir::Expr,
        pattern: &Pattern,
        hoists: &mut Hoists,
    ) -> Option<ir::Expr> {
        testable(pattern).then(|| self.build_test(value, pattern, hoists))
    }

    fn build_test(&mut self, value: &ir::Expr, pattern: &Pattern, hoists: &mut Hoists) -> ir::Expr {
        match pattern {
            Pattern::Discard => ir::Expr::bool(true),
            Pattern::Constant(c) if is_null(c) => {
                ir::Expr::binary(value.clone(), ir::BinaryOp::Eq, ir::Expr::null())
            }
            Pattern::Constant(c) => {
                let c = self.convert_expr(c, hoists);
                ir::Expr::binary(value.clone(), ir::BinaryOp::Eq, c)
            }
            Pattern::Type(ty) => ir::Expr::TypeTest {
                value: Box::new(value.clone()),
                ty: self.map_type(ty),
            },
            Pattern::Declaration { ty, name } => {
                let ty = self.map_type(ty);
                hoists.push_binding(ir::Stmt::bind(
                    name.as_str(),
                    Some(ty.clone()),
                    ir::Expr::Cast {
                        value: Box::new(value.clone()),
                        ty: ty.clone(),
                        safe: true,
                    },
                ));
                ir::Expr::TypeTest {
                    value: Box::new(value.clone()),
                    ty,
                }
            }
            Pattern::Var(name) => {
                hoists.push_binding(ir::Stmt::bind(name.as_str(), None, value.clone()));
                ir::Expr::bool(true)
            }
            Pattern::Relational { op, value: bound } => {
                let bound = self.convert_expr(bound, hoists);
                let op = match op {
                    RelationalOp::Lt => ir::BinaryOp::Lt,
                    RelationalOp::Le => ir::BinaryOp::Le,
                    RelationalOp::Gt => ir::BinaryOp::Gt,
                    RelationalOp::Ge => ir::BinaryOp::Ge,
                };
                ir::Expr::binary(value.clone(), op, bound)
            }
            Pattern::Not(inner) => match inner.as_ref() {
                Pattern::Constant(c) if is_null(c) => {
                    ir::Expr::binary(value.clone(), ir::BinaryOp::Ne, ir::Expr::null())
                }
                inner => ir::Expr::not(self.build_test(value, inner, hoists)),
            },
            Pattern::And(a, b) => {
                let a = self.build_test(value, a, hoists);
                let b = self.build_test(value, b, hoists);
                ir::Expr::binary(a, ir::BinaryOp::And, b)
            }
            Pattern::Or(a, b) => {
                let a = self.build_test(value, a, hoists);
                let b = self.build_test(value, b, hoists);
                ir::Expr::binary(a, ir::BinaryOp::Or, b)
            }
            // Excluded by `testable`.
            Pattern::Property { .. } | Pattern::Positional { .. } | Pattern::List(_) => {
                ir::Expr::bool(false)
            }
        }
    }

    /// Structural form, or `None` for `and`/`or`/list patterns.
    pub(crate) fn convert_pattern(&mut self, pattern: &Pattern, hoists: &mut Hoists) -> Option<ir::Pattern> {
        let converted = match pattern {
            Pattern::Discard => ir::Pattern::Wildcard,
            Pattern::Constant(c) => match &c.kind {
                ExprKind::Literal(lit) => ir::Pattern::Literal(convert_literal(lit)),
                _ => ir::Pattern::Constant(self.convert_expr(c, hoists)),
            },
            Pattern::Declaration { ty, name } => ir::Pattern::Type {
                ty: self.map_type(ty),
                binding: Some(name.clone()),
            },
            Pattern::Var(name) => ir::Pattern::Var(name.clone()),
            Pattern::Type(ty) => ir::Pattern::Type {
                ty: self.map_type(ty),
                binding: None,
            },
            Pattern::Relational { op, value } => ir::Pattern::Relational {
                op: match op {
                    RelationalOp::Lt => ir::RelationalOp::Lt,
                    RelationalOp::Le => ir::RelationalOp::Le,
                    RelationalOp::Gt => ir::RelationalOp::Gt,
                    RelationalOp::Ge => ir::RelationalOp::Ge,
                },
                value: self.convert_expr(value, hoists),
            },
            Pattern::Property {
                ty,
                fields,
                designation,
            } => {
                let mut converted = Vec::with_capacity(fields.len());
                for field in fields {
                    converted.push(ir::FieldPattern {
                        name: field.name.clone(),
                        pattern: self.convert_pattern(&field.pattern, hoists)?,
                    });
                }
                ir::Pattern::Property {
                    ty: self.map_opt_type(ty.as_deref()),
                    fields: converted,
                    binding: designation.clone(),
                }
            }
            Pattern::Positional {
                ty,
                elements,
                designation,
            } => {
                let mut converted = Vec::with_capacity(elements.len());
                for element in elements {
                    converted.push(self.convert_pattern(element, hoists)?);
                }
                ir::Pattern::Positional {
                    ty: self.map_opt_type(ty.as_deref()),
                    elements: converted,
                    binding: designation.clone(),
                }
            }
            Pattern::Not(inner) => ir::Pattern::Not(Box::new(self.convert_pattern(inner, hoists)?)),
            Pattern::And(..) | Pattern::Or(..) | Pattern::List(_) => return None,
        };
        Some(converted)
    }

    /// Pattern and guard for one match arm or case label against a stable
    /// `subject`. Bindings of guard tests go to `hoists` as bindings.
    pub(crate) fn arm_pattern(
        &mut self,
        subject: &ir::Expr,
        pattern: &Pattern,
        guard: Option<ir::Expr>,
        span: Span,
        hoists: &mut Hoists,
    ) -> (ir::Pattern, Option<ir::Expr>) {
        if let Some(converted) = self.convert_pattern(pattern, hoists) {
            return (converted, guard);
        }
        let test = match self.pattern_test(subject, pattern, hoists) {
            Some(test) => test,
            None => self.fallback_pattern(pattern, span),
        };
        let guard = match guard {
            Some(guard) => ir::Expr::binary(test, ir::BinaryOp::And, guard),
            None => test,
        };
        (ir::Pattern::Wildcard, Some(guard))
    }

    fn convert_switch_arm(
        &mut self,
        subject: &ir::Expr,
        arm: &SwitchArm,
        span: Span,
        hoists: &mut Hoists,
    ) -> ir::MatchArm {
        let guard = arm.guard.as_ref().map(|g| self.convert_guarded(g, hoists));
        let (pattern, guard) = self.arm_pattern(subject, &arm.pattern, guard, span, hoists);
        ir::MatchArm {
            pattern,
            guard,
            value: self.convert_guarded(&arm.value, hoists),
        }
    }

    pub(crate) fn convert_switch_expr(
        &mut self,
        subject: &Expr,
        arms: &[SwitchArm],
        span: Span,
        hoists: &mut Hoists,
    ) -> ir::Expr {
        let subject = self.convert_expr(subject, hoists);
        let subject = if arms.iter().all(|arm| is_structural(&arm.pattern)) {
            subject
        } else {
            self.stable_value(subject, hoists)
        };
        let arms = arms
            .iter()
            .map(|arm| self.convert_switch_arm(&subject, arm, span, hoists))
            .collect();
        ir::Expr::Match {
            subject: Box::new(subject),
            arms,
        }
    }

    fn fallback_pattern(&mut self, pattern: &Pattern, span: Span) -> ir::Expr {
        let feature = if contains_list(pattern) {
            "list-patterns"
        } else {
            "combinator-patterns"
        };
        let suggestion = self.unsupported(feature, span);
        ir::Expr::fallback(pattern.to_string(), feature, suggestion)
    }
}

/// Does the `if` guarded by `cond` bind its pattern variables on the
/// false branch? True for `!(x is T t)` and `x is not T t`.
pub(crate) fn binds_on_failure(cond: &Expr) -> bool {
    match &cond.kind {
        ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => matches!(&operand.kind, ExprKind::IsPattern { pattern, .. } if has_designation(pattern)),
        ExprKind::IsPattern { pattern, .. } => {
            matches!(pattern.as_ref(), Pattern::Not(inner) if has_designation(inner))
        }
        _ => false,
    }
}

/// Every leaf reads the value at most once, so no temporary is needed.
fn reads_once(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Discard
        | Pattern::Constant(_)
        | Pattern::Type(_)
        | Pattern::Relational { .. }
        | Pattern::Property { .. }
        | Pattern::Positional { .. }
        | Pattern::List(_) => true,
        Pattern::Not(inner) => reads_once(inner),
        Pattern::Declaration { .. } | Pattern::Var(_) | Pattern::And(..) | Pattern::Or(..) => false,
    }
}

fn testable(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Property { .. } | Pattern::Positional { .. } | Pattern::List(_) => false,
        Pattern::Not(inner) => testable(inner),
        Pattern::And(a, b) | Pattern::Or(a, b) => testable(a) && testable(b),
        _ => true,
    }
}

pub(super) fn is_structural(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::And(..) | Pattern::Or(..) | Pattern::List(_) => false,
        Pattern::Not(inner) => is_structural(inner),
        Pattern::Property { fields, .. } => fields.iter().all(|f| is_structural(&f.pattern)),
        Pattern::Positional { elements, .. } => elements.iter().all(is_structural),
        _ => true,
    }
}

fn has_designation(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Declaration { .. } | Pattern::Var(_) => true,
        Pattern::Property { designation, .. } | Pattern::Positional { designation, .. } => {
            designation.is_some()
        }
        Pattern::Not(inner) => has_designation(inner),
        Pattern::And(a, b) | Pattern::Or(a, b) => has_designation(a) || has_designation(b),
        _ => false,
    }
}

fn contains_list(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::List(_) => true,
        Pattern::Not(inner) => contains_list(inner),
        Pattern::And(a, b) | Pattern::Or(a, b) => contains_list(a) || contains_list(b),
        Pattern::Property { fields, .. } => fields.iter().any(|f| contains_list(&f.pattern)),
        Pattern::Positional { elements, .. } => elements.iter().any(contains_list),
        _ => false,
    }
}

fn is_null(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Literal(Literal::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::context::ConversionContext;
    use crate::effects::BUILTIN_EFFECTS;
    use crate::source::SubPattern;

    fn convert(expr: &Expr) -> (ir::Expr, Vec<ir::Stmt>, ConversionContext) {
        let mut ctx = ConversionContext::new();
        let options = ConversionOptions::default();
        let mut hoists = Hoists::new();
        let value = Converter::new(&mut ctx, &options, &BUILTIN_EFFECTS).convert_expr(expr, &mut hoists);
        let mut out = Vec::new();
        hoists.drain_into(&mut out);
        (value, out, ctx)
    }

    #[test]
    fn test_declaration_pattern_binds_cast() {
        let expr = Expr::is_pattern(Expr::ident("obj"), Pattern::declaration("Foo", "f"));
        let (value, hoisted, _) = convert(&expr);
        assert_eq!(
            value,
            ir::Expr::TypeTest {
                value: Box::new(ir::Expr::reference("obj")),
                ty: "Foo".into(),
            }
        );
        match hoisted.as_slice() {
            [ir::Stmt::Bind {
                name,
                ty,
                mutable: false,
                init: Some(ir::Expr::Cast { safe: true, .. }),
            }] => {
                assert_eq!(name, "f");
                assert_eq!(ty.as_deref(), Some("Foo"));
            }
            _ => panic!("expected cast binding"),
        }
    }

    #[test]
    fn test_null_patterns() {
        let is_null = Expr::is_pattern(Expr::ident("x"), Pattern::Constant(Expr::null()));
        assert_eq!(
            convert(&is_null).0,
            ir::Expr::binary(ir::Expr::reference("x"), ir::BinaryOp::Eq, ir::Expr::null())
        );
        let not_null = Expr::is_pattern(
            Expr::ident("x"),
            Pattern::Not(Box::new(Pattern::Constant(Expr::null()))),
        );
        assert_eq!(
            convert(&not_null).0,
            ir::Expr::binary(ir::Expr::reference("x"), ir::BinaryOp::Ne, ir::Expr::null())
        );
    }

    #[test]
    fn test_combinator_pattern_uses_temp() {
        let pattern = Pattern::And(
            Box::new(Pattern::Relational {
                op: RelationalOp::Ge,
                value: Expr::int(0),
            }),
            Box::new(Pattern::Relational {
                op: RelationalOp::Lt,
                value: Expr::int(10),
            }),
        );
        let expr = Expr::is_pattern(Expr::method_call(Expr::ident("input"), "Read", vec![]), pattern);
        let (value, hoisted, _) = convert(&expr);
        assert_eq!(hoisted.len(), 1);
        assert!(matches!(
            value,
            ir::Expr::Binary {
                op: ir::BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_property_pattern_becomes_match() {
        let pattern = Pattern::Property {
            ty: None,
            fields: vec![SubPattern {
                name: "Length".into(),
                pattern: Pattern::Constant(Expr::int(0)),
            }],
            designation: None,
        };
        let (value, _, _) = convert(&Expr::is_pattern(Expr::ident("items"), pattern));
        match value {
            ir::Expr::Match { arms, .. } => {
                assert_eq!(arms.len(), 2);
                assert!(matches!(arms[0].pattern, ir::Pattern::Property { .. }));
                assert_eq!(arms[1].pattern, ir::Pattern::Wildcard);
            }
            _ => panic!("expected match"),
        }
    }

    #[test]
    fn test_list_pattern_falls_back() {
        let pattern = Pattern::List(vec![Pattern::Constant(Expr::int(1)), Pattern::Discard]);
        let (value, _, ctx) = convert(&Expr::is_pattern(Expr::ident("xs"), pattern));
        match value {
            ir::Expr::Fallback(fallback) => assert_eq!(fallback.feature, "list-patterns"),
            _ => panic!("expected fallback"),
        }
        assert_eq!(ctx.stats.fallbacks, 1);
    }

    #[test]
    fn test_switch_expression_or_arm_guarded() {
        let expr = Expr::new(ExprKind::Switch {
            subject: Box::new(Expr::ident("code")),
            arms: vec![
                SwitchArm {
                    pattern: Pattern::Or(
                        Box::new(Pattern::Constant(Expr::int(1))),
                        Box::new(Pattern::Constant(Expr::int(2))),
                    ),
                    guard: None,
                    value: Expr::string("low"),
                },
                SwitchArm {
                    pattern: Pattern::Discard,
                    guard: None,
                    value: Expr::string("other"),
                },
            ],
        });
        let (value, hoisted, ctx) = convert(&expr);
        assert!(hoisted.is_empty());
        match value {
            ir::Expr::Match { arms, .. } => {
                assert_eq!(arms[0].pattern, ir::Pattern::Wildcard);
                assert!(matches!(
                    arms[0].guard,
                    Some(ir::Expr::Binary {
                        op: ir::BinaryOp::Or,
                        ..
                    })
                ));
                assert!(arms[1].guard.is_none());
            }
            _ => panic!("expected match"),
        }
        assert!(ctx.issues().is_empty());
    }

    #[test]
    fn test_binds_on_failure() {
        let positive = Expr::is_pattern(Expr::ident("o"), Pattern::declaration("Foo", "f"));
        assert!(!binds_on_failure(&positive));
        let negated = Expr::unary(UnaryOp::Not, positive);
        assert!(binds_on_failure(&negated));
        let is_not = Expr::is_pattern(
            Expr::ident("o"),
            Pattern::Not(Box::new(Pattern::declaration("Foo", "f"))),
        );
        assert!(binds_on_failure(&is_not));
    }
}
