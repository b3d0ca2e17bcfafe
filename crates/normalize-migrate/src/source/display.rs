//! Canonical C#-like rendering of input nodes.
//!
//! Used for fallback text when the front end did not supply the original
//! source, and for receiver-text heuristics.

use super::*;
use std::fmt::{self, Display, Formatter, Write};

fn join<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(n) => write!(f, "{n:?}"),
            Literal::Char(c) => write!(f, "'{}'", c.escape_default()),
            Literal::String(s) => write!(f, "\"{}\"", s.escape_default()),
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Coalesce => "??",
        }
    }
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::Coalesce => "??=",
        }
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        match self.modifier {
            Some(ParamModifier::Ref) => f.write_str("ref ")?,
            Some(ParamModifier::Out) => f.write_str("out ")?,
            Some(ParamModifier::In) => f.write_str("in ")?,
            _ => {}
        }
        write!(f, "{}", self.value)
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.ty {
            Some(ty) => write!(f, "{ty} {}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{lit}"),
            ExprKind::Ident(name) => f.write_str(name),
            ExprKind::This => f.write_str("this"),
            ExprKind::Base => f.write_str("base"),
            ExprKind::Binary { op, left, right } => {
                write!(f, "{left} {} {right}", op.symbol())
            }
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Neg => write!(f, "-{operand}"),
                UnaryOp::Plus => write!(f, "+{operand}"),
                UnaryOp::Not => write!(f, "!{operand}"),
                UnaryOp::BitNot => write!(f, "~{operand}"),
                UnaryOp::PreInc => write!(f, "++{operand}"),
                UnaryOp::PreDec => write!(f, "--{operand}"),
                UnaryOp::PostInc => write!(f, "{operand}++"),
                UnaryOp::PostDec => write!(f, "{operand}--"),
                UnaryOp::AddressOf => write!(f, "&{operand}"),
                UnaryOp::Deref => write!(f, "*{operand}"),
            },
            ExprKind::Assign { op, target, value } => {
                write!(f, "{target} {} {value}", op.symbol())
            }
            ExprKind::Invoke { callee, args } => {
                write!(f, "{callee}(")?;
                join(f, args, ", ")?;
                f.write_str(")")
            }
            ExprKind::Member {
                object,
                name,
                type_args,
            } => {
                write!(f, "{object}.{name}")?;
                if !type_args.is_empty() {
                    write!(f, "<{}>", type_args.join(", "))?;
                }
                Ok(())
            }
            ExprKind::ConditionalAccess { object, name, args } => {
                write!(f, "{object}?.{name}")?;
                if let Some(args) = args {
                    f.write_str("(")?;
                    join(f, args, ", ")?;
                    f.write_str(")")?;
                }
                Ok(())
            }
            ExprKind::Index {
                object,
                args,
                null_conditional,
            } => {
                write!(f, "{object}{}[", if *null_conditional { "?" } else { "" })?;
                join(f, args, ", ")?;
                f.write_str("]")
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => write!(f, "{cond} ? {then} : {otherwise}"),
            ExprKind::Lambda {
                params,
                body,
                is_async,
            } => {
                if *is_async {
                    f.write_str("async ")?;
                }
                if params.len() == 1 && params[0].ty.is_none() {
                    write!(f, "{}", params[0])?;
                } else {
                    f.write_str("(")?;
                    join(f, params, ", ")?;
                    f.write_str(")")?;
                }
                match body {
                    LambdaBody::Expr(e) => write!(f, " => {e}"),
                    LambdaBody::Block(stmts) => {
                        f.write_str(" => { ")?;
                        join(f, stmts, " ")?;
                        f.write_str(" }")
                    }
                }
            }
            ExprKind::New {
                ty,
                args,
                initializer,
            } => {
                write!(f, "new {}(", ty.as_deref().unwrap_or(""))?;
                join(f, args, ", ")?;
                f.write_str(")")?;
                match initializer {
                    None => Ok(()),
                    Some(Initializer::Object(inits)) => {
                        f.write_str(" { ")?;
                        for (i, init) in inits.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{} = {}", init.name, init.value)?;
                        }
                        f.write_str(" }")
                    }
                    Some(Initializer::Collection(items)) => {
                        f.write_str(" { ")?;
                        join(f, items, ", ")?;
                        f.write_str(" }")
                    }
                    Some(Initializer::Dictionary(entries)) => {
                        f.write_str(" { ")?;
                        for (i, kv) in entries.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "[{}] = {}", kv.key, kv.value)?;
                        }
                        f.write_str(" }")
                    }
                }
            }
            ExprKind::ArrayNew {
                elem_ty,
                size,
                elements,
            } => {
                write!(f, "new {}[", elem_ty.as_deref().unwrap_or(""))?;
                if let Some(size) = size {
                    write!(f, "{size}")?;
                }
                f.write_str("]")?;
                if let Some(elements) = elements {
                    f.write_str(" { ")?;
                    join(f, elements, ", ")?;
                    f.write_str(" }")?;
                }
                Ok(())
            }
            ExprKind::CollectionLiteral(items) => {
                f.write_str("[")?;
                join(f, items, ", ")?;
                f.write_str("]")
            }
            ExprKind::Cast { ty, expr } => write!(f, "({ty}){expr}"),
            ExprKind::As { expr, ty } => write!(f, "{expr} as {ty}"),
            ExprKind::Is { expr, ty } => write!(f, "{expr} is {ty}"),
            ExprKind::IsPattern { expr, pattern } => write!(f, "{expr} is {pattern}"),
            ExprKind::Await(e) => write!(f, "await {e}"),
            ExprKind::Interpolated(parts) => {
                f.write_str("$\"")?;
                for part in parts {
                    match part {
                        InterpolationPart::Text(t) => f.write_str(t)?,
                        InterpolationPart::Expr { expr, format } => match format {
                            Some(fmt) => write!(f, "{{{expr}:{fmt}}}")?,
                            None => write!(f, "{{{expr}}}")?,
                        },
                    }
                }
                f.write_str("\"")
            }
            ExprKind::Switch { subject, arms } => {
                write!(f, "{subject} switch {{ ")?;
                for (i, arm) in arms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arm.pattern)?;
                    if let Some(guard) = &arm.guard {
                        write!(f, " when {guard}")?;
                    }
                    write!(f, " => {}", arm.value)?;
                }
                f.write_str(" }")
            }
            ExprKind::Tuple(items) => {
                f.write_str("(")?;
                join(f, items, ", ")?;
                f.write_str(")")
            }
            ExprKind::TypeOf(ty) => write!(f, "typeof({ty})"),
            ExprKind::NameOf(e) => write!(f, "nameof({e})"),
            ExprKind::Default(Some(ty)) => write!(f, "default({ty})"),
            ExprKind::Default(None) => f.write_str("default"),
            ExprKind::ThrowExpr(e) => write!(f, "throw {e}"),
            ExprKind::With { expr, assignments } => {
                write!(f, "{expr} with {{ ")?;
                for (i, init) in assignments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", init.name, init.value)?;
                }
                f.write_str(" }")
            }
            ExprKind::Query => f.write_str("from ... select ..."),
            ExprKind::Checked { checked, expr } => {
                let kw = if *checked { "checked" } else { "unchecked" };
                write!(f, "{kw}({expr})")
            }
            ExprKind::Range { start, end } => {
                if let Some(start) = start {
                    write!(f, "{start}")?;
                }
                f.write_str("..")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                Ok(())
            }
            ExprKind::IndexFromEnd(e) => write!(f, "^{e}"),
            ExprKind::Unsafe { kind } => write!(f, "/* {kind} */"),
            ExprKind::Unknown { kind } => write!(f, "/* {kind} */"),
        }
    }
}

impl Display for RelationalOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelationalOp::Lt => "<",
            RelationalOp::Le => "<=",
            RelationalOp::Gt => ">",
            RelationalOp::Ge => ">=",
        })
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Discard => f.write_str("_"),
            Pattern::Constant(e) => write!(f, "{e}"),
            Pattern::Declaration { ty, name } => write!(f, "{ty} {name}"),
            Pattern::Var(name) => write!(f, "var {name}"),
            Pattern::Type(ty) => f.write_str(ty),
            Pattern::Relational { op, value } => write!(f, "{op} {value}"),
            Pattern::Property {
                ty,
                fields,
                designation,
            } => {
                if let Some(ty) = ty {
                    write!(f, "{ty} ")?;
                }
                f.write_str("{ ")?;
                for (i, sub) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", sub.name, sub.pattern)?;
                }
                f.write_str(" }")?;
                if let Some(d) = designation {
                    write!(f, " {d}")?;
                }
                Ok(())
            }
            Pattern::Positional {
                ty,
                elements,
                designation,
            } => {
                if let Some(ty) = ty {
                    f.write_str(ty)?;
                }
                f.write_str("(")?;
                join(f, elements, ", ")?;
                f.write_str(")")?;
                if let Some(d) = designation {
                    write!(f, " {d}")?;
                }
                Ok(())
            }
            Pattern::Not(p) => write!(f, "not {p}"),
            Pattern::And(a, b) => write!(f, "{a} and {b}"),
            Pattern::Or(a, b) => write!(f, "{a} or {b}"),
            Pattern::List(items) => {
                f.write_str("[")?;
                join(f, items, ", ")?;
                f.write_str("]")
            }
        }
    }
}

fn local_decl_text(decl: &LocalDecl) -> String {
    let mut out = String::new();
    if decl.is_using {
        out.push_str("using ");
    }
    if decl.is_const {
        out.push_str("const ");
    }
    out.push_str(decl.ty.as_deref().unwrap_or("var"));
    out.push(' ');
    for (i, d) in decl.declarators.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&d.name);
        if let Some(init) = &d.init {
            let _ = write!(out, " = {init}");
        }
    }
    out
}

impl Display for LocalDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&local_decl_text(self))
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::Block(stmts) => {
                f.write_str("{ ")?;
                join(f, stmts, " ")?;
                f.write_str(" }")
            }
            StmtKind::LocalDecl(decl) => write!(f, "{decl};"),
            StmtKind::Expr(e) => write!(f, "{e};"),
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                write!(f, "if ({cond}) {then}")?;
                if let Some(otherwise) = otherwise {
                    write!(f, " else {otherwise}")?;
                }
                Ok(())
            }
            StmtKind::While { cond, body } => write!(f, "while ({cond}) {body}"),
            StmtKind::DoWhile { body, cond } => write!(f, "do {body} while ({cond});"),
            StmtKind::For {
                decl,
                init,
                cond,
                step,
                body,
            } => {
                f.write_str("for (")?;
                if let Some(decl) = decl {
                    write!(f, "{decl}")?;
                } else {
                    join(f, init, ", ")?;
                }
                f.write_str("; ")?;
                if let Some(cond) = cond {
                    write!(f, "{cond}")?;
                }
                f.write_str("; ")?;
                join(f, step, ", ")?;
                write!(f, ") {body}")
            }
            StmtKind::ForEach {
                ty,
                target,
                iterable,
                body,
                is_await,
            } => {
                if *is_await {
                    f.write_str("await ")?;
                }
                let ty = ty.as_deref().unwrap_or("var");
                match target {
                    ForEachTarget::Name(name) => write!(f, "foreach ({ty} {name}")?,
                    ForEachTarget::Deconstruct(names) => {
                        write!(f, "foreach ({ty} ({})", names.join(", "))?
                    }
                }
                write!(f, " in {iterable}) {body}")
            }
            StmtKind::Return(Some(e)) => write!(f, "return {e};"),
            StmtKind::Return(None) => f.write_str("return;"),
            StmtKind::Break => f.write_str("break;"),
            StmtKind::Continue => f.write_str("continue;"),
            StmtKind::Throw(Some(e)) => write!(f, "throw {e};"),
            StmtKind::Throw(None) => f.write_str("throw;"),
            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                f.write_str("try { ")?;
                join(f, body, " ")?;
                f.write_str(" }")?;
                for catch in catches {
                    f.write_str(" catch")?;
                    if let Some(ty) = &catch.ty {
                        write!(f, " ({ty}")?;
                        if let Some(name) = &catch.name {
                            write!(f, " {name}")?;
                        }
                        f.write_str(")")?;
                    }
                    if let Some(filter) = &catch.filter {
                        write!(f, " when ({filter})")?;
                    }
                    f.write_str(" { ")?;
                    join(f, &catch.body, " ")?;
                    f.write_str(" }")?;
                }
                if let Some(finally) = finally {
                    f.write_str(" finally { ")?;
                    join(f, finally, " ")?;
                    f.write_str(" }")?;
                }
                Ok(())
            }
            StmtKind::Switch { subject, sections } => {
                write!(f, "switch ({subject}) {{ ")?;
                for section in sections {
                    for label in &section.labels {
                        match label {
                            SwitchLabel::Case(e) => write!(f, "case {e}: ")?,
                            SwitchLabel::Pattern { pattern, guard } => {
                                write!(f, "case {pattern}")?;
                                if let Some(guard) = guard {
                                    write!(f, " when {guard}")?;
                                }
                                f.write_str(": ")?;
                            }
                            SwitchLabel::Default => f.write_str("default: ")?,
                        }
                    }
                    join(f, &section.body, " ")?;
                    f.write_str(" ")?;
                }
                f.write_str("}")
            }
            StmtKind::Using { decl, expr, body } => {
                f.write_str("using (")?;
                if let Some(decl) = decl {
                    write!(f, "{decl}")?;
                } else if let Some(expr) = expr {
                    write!(f, "{expr}")?;
                }
                write!(f, ") {body}")
            }
            StmtKind::Lock { expr, body } => write!(f, "lock ({expr}) {body}"),
            StmtKind::YieldReturn(e) => write!(f, "yield return {e};"),
            StmtKind::YieldBreak => f.write_str("yield break;"),
            StmtKind::LocalFunction(m) => {
                write!(f, "{} {}(", m.return_type, m.name)?;
                join(f, &m.params, ", ")?;
                f.write_str(") { ... }")
            }
            StmtKind::Empty => f.write_str(";"),
            StmtKind::Checked { checked, body } => {
                f.write_str(if *checked { "checked { " } else { "unchecked { " })?;
                join(f, body, " ")?;
                f.write_str(" }")
            }
            StmtKind::Labeled { label, stmt } => write!(f, "{label}: {stmt}"),
            StmtKind::Goto(target) => write!(f, "goto {target};"),
            StmtKind::Unsafe(body) => {
                f.write_str("unsafe { ")?;
                join(f, body, " ")?;
                f.write_str(" }")
            }
            StmtKind::Fixed { decl, body } => write!(f, "fixed ({decl}) {body}"),
            StmtKind::Unknown { kind } => write!(f, "/* {kind} */"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_chain() {
        let e = Expr::method_call(
            Expr::method_call(Expr::ident("items"), "Where", vec![Expr::ident("p")]),
            "ToList",
            vec![],
        );
        assert_eq!(e.to_string(), "items.Where(p).ToList()");
    }

    #[test]
    fn test_render_labeled() {
        let s = Stmt::new(StmtKind::Labeled {
            label: "retry".into(),
            stmt: Box::new(Stmt::expr(Expr::call(Expr::ident("Work"), vec![]))),
        });
        insta::assert_snapshot!(s.to_string(), @"retry: Work();");
    }

    #[test]
    fn test_source_text_prefers_original() {
        let s = Stmt::new(StmtKind::Goto("end".into())).with_text("goto   end;");
        assert_eq!(s.source_text(), "goto   end;");
        let s = Stmt::new(StmtKind::Goto("end".into()));
        assert_eq!(s.source_text(), "goto end;");
    }

    #[test]
    fn test_render_patterns() {
        let p = Pattern::Not(Box::new(Pattern::Constant(Expr::null())));
        assert_eq!(p.to_string(), "not null");
        let e = Expr::is_pattern(Expr::ident("obj"), Pattern::declaration("Foo", "f"));
        assert_eq!(e.to_string(), "obj is Foo f");
    }
}
