//! Statement-level decomposition of call chains.
//!
//! `var r = xs.Where(p).Select(f).ToList();` has no chaining form in the
//! target, so it becomes one binding per intermediate step:
//!
//! ```text
//! _chain1 = xs.Where(p)
//! _chain2 = _chain1.Select(f)
//! r = _chain2.ToList()
//! ```
//!
//! The expression-level path in [`crate::convert`] handles calls nested
//! inside larger expressions. Both consult [`Converter::native_call`], and a
//! chain with any native step is left to the expression path, so no chain
//! is decomposed twice.

use crate::convert::{Converter, Hoists};
use crate::ir;
use crate::source::{Argument, Expr, ExprKind, Span};

/// One `.Method(args)` link of a chain, innermost first.
#[derive(Debug, Clone, Copy)]
pub struct ChainStep<'e> {
    /// Source receiver. Only converted for the first step.
    pub receiver: &'e Expr,
    /// Receiver is the previous step's result.
    pub from_previous: bool,
    pub method: &'e str,
    pub type_args: &'e [String],
    pub args: &'e [Argument],
    pub span: Span,
}

/// Where the last step's value goes.
#[derive(Debug, Clone)]
pub enum ChainTarget {
    Declare {
        name: String,
        ty: Option<String>,
        mutable: bool,
    },
    Discard,
    Return,
}

/// Chain steps of `expr`, innermost first. Empty when `expr` is not a call
/// on a member access.
pub fn collect_steps(expr: &Expr) -> Vec<ChainStep<'_>> {
    let mut steps = Vec::new();
    let mut current = expr;
    while let ExprKind::Invoke { callee, args } = &current.kind {
        let ExprKind::Member {
            object,
            name,
            type_args,
        } = &callee.kind
        else {
            break;
        };
        steps.push(ChainStep {
            receiver: object,
            from_previous: false,
            method: name,
            type_args,
            args,
            span: current.span,
        });
        if !object.is_invocation_on_member() {
            break;
        }
        current = object.as_ref();
    }
    steps.reverse();
    for step in steps.iter_mut().skip(1) {
        step.from_previous = true;
    }
    steps
}

impl Converter<'_> {
    /// Steps worth decomposing: two or more, none of them native.
    pub fn decomposable_chain<'e>(&self, expr: &'e Expr) -> Option<Vec<ChainStep<'e>>> {
        if !self.options.decompose_chains {
            return None;
        }
        let steps = collect_steps(expr);
        if steps.len() < 2 {
            return None;
        }
        let any_native = steps
            .iter()
            .any(|s| self.native_call(s.receiver, s.method, s.args.len()).is_some());
        (!any_native).then_some(steps)
    }

    /// Emit one statement per step into `out`.
    pub fn decompose_chain(&mut self, steps: &[ChainStep<'_>], target: ChainTarget, out: &mut Vec<ir::Stmt>) {
        let mut previous: Option<ir::Expr> = None;
        let last = steps.len().saturating_sub(1);
        for (i, step) in steps.iter().enumerate() {
            let mut hoists = Hoists::new();
            let receiver = match previous.take() {
                Some(receiver) => receiver,
                None => self.convert_expr(step.receiver, &mut hoists),
            };
            let args = self.convert_args(step.args, &mut hoists);
            let call = ir::Expr::Call {
                callee: Box::new(ir::Expr::member(receiver, step.method)),
                type_args: step.type_args.iter().map(|t| self.map_type(t)).collect(),
                args,
            };
            hoists.drain_into(out);

            if i < last {
                let temp = self.ctx.fresh_temp("chain");
                out.push(ir::Stmt::bind(temp.clone(), None, call));
                previous = Some(ir::Expr::reference(temp));
                continue;
            }
            out.push(match &target {
                ChainTarget::Declare { name, ty, mutable } => ir::Stmt::Bind {
                    name: name.clone(),
                    ty: ty.clone(),
                    mutable: *mutable,
                    init: Some(call),
                },
                ChainTarget::Discard => ir::Stmt::Expr(call),
                ChainTarget::Return => ir::Stmt::Return(Some(call)),
            });
        }
        self.ctx.stats.chains_decomposed += 1;
        tracing::trace!(steps = steps.len(), "decomposed call chain");
    }
}
