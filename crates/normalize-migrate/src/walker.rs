//! Declaration walk over a compilation unit.
//!
//! The walker owns the structural side of a conversion: namespaces, types and
//! members. Method bodies and initializers are handed to the [`Converter`].
//! Top-level statements are gathered into one synthetic entry function.

use crate::context::{ConversionIssue, IssueKind, Scope, Severity};
use crate::convert::Converter;
use crate::error::ConvertError;
use crate::ir;
use crate::source::{
    AccessorDecl, AccessorKind, CompilationUnit, ConstructorDecl, ConversionOperatorDecl,
    Declaration, EventDecl, FieldDecl, IndexerDecl, InitializerTarget, MemberDecl, MethodBody,
    MethodDecl, Modifier, OperatorDecl, Parameter, PropertyDecl, Stmt, TypeDecl, TypeKind,
    has_modifier,
};

/// Walks a [`CompilationUnit`] and builds an [`ir::Module`].
pub struct SourceTreeWalker<'a> {
    conv: Converter<'a>,
    first_namespace: Option<String>,
}

impl<'a> SourceTreeWalker<'a> {
    pub fn new(converter: Converter<'a>) -> Self {
        Self {
            conv: converter,
            first_namespace: None,
        }
    }

    /// Convert the whole unit. Declaration-level failures are recorded as
    /// error issues on the context and the walk moves on to the next one.
    pub fn walk(mut self, unit: &CompilationUnit) -> ir::Module {
        let id = self.conv.ctx.next_id("mod");
        let mut types = Vec::new();
        let mut loose = Vec::new();
        self.walk_declarations(&unit.members, &mut types, &mut loose);

        let mut functions = Vec::new();
        if !loose.is_empty() {
            functions.push(self.entry_point(loose));
        }

        let name = self
            .conv
            .options
            .module_name
            .clone()
            .or(self.first_namespace.take())
            .unwrap_or_else(|| "Program".to_string());
        tracing::debug!(module = %name, types = types.len(), "walked compilation unit");

        ir::Module {
            id,
            name,
            usings: unit.usings.clone(),
            types,
            functions,
        }
    }

    fn walk_declarations<'u>(
        &mut self,
        declarations: &'u [Declaration],
        types: &mut Vec<ir::TypeDef>,
        loose: &mut Vec<&'u Stmt>,
    ) {
        for declaration in declarations {
            match declaration {
                Declaration::Namespace { name, members } => {
                    self.conv.ctx.push_scope(Scope::Namespace(name.clone()));
                    if self.first_namespace.is_none() {
                        self.first_namespace = Some(self.conv.ctx.current_namespace());
                    }
                    self.walk_declarations(members, types, loose);
                    self.conv.ctx.pop_scope();
                }
                Declaration::Type(decl) => match self.convert_type(decl) {
                    Ok(def) => types.push(def),
                    Err(err) => self.record_error(err),
                },
                Declaration::GlobalStatement(stmt) => loose.push(stmt),
            }
        }
    }

    /// Top-level statements become `static void <entry>()`.
    fn entry_point(&mut self, stmts: Vec<&Stmt>) -> ir::Method {
        let body = stmts.into_iter().cloned().collect();
        let name = self.conv.options.entry_point.clone();
        let decl = MethodDecl::new(name, "void", Vec::new(), body)
            .with_modifiers(&[Modifier::Public, Modifier::Static]);
        self.conv.convert_method(&decl)
    }

    fn record_error(&mut self, err: ConvertError) {
        let (line, column) = match &err {
            ConvertError::Conversion { line, column, .. } => (*line, *column),
            ConvertError::Parse(_) => (0, 0),
        };
        let message = match err {
            ConvertError::Conversion { message, .. } => message,
            other => other.to_string(),
        };
        self.conv.ctx.report(ConversionIssue {
            severity: Severity::Error,
            kind: IssueKind::Conversion,
            message,
            feature: None,
            line,
            column,
            suggestion: None,
        });
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn convert_type(&mut self, decl: &TypeDecl) -> Result<ir::TypeDef, ConvertError> {
        if decl.name.trim().is_empty() {
            return Err(ConvertError::conversion(
                format!("{:?} declaration has no name", decl.kind),
                decl.span,
            ));
        }
        tracing::debug!(ty = %decl.name, kind = ?decl.kind, "converting type");
        self.conv.ctx.stats.types += 1;
        if !decl.type_params.is_empty() {
            self.conv.uses("generics");
        }
        if !decl.attributes.is_empty() {
            self.conv.note(
                "attributes",
                format!("attributes on `{}` dropped: {}", decl.name, decl.attributes.join(", ")),
                decl.span,
            );
        }

        self.conv.ctx.push_scope(Scope::Type(decl.name.clone()));
        let def = match decl.kind {
            TypeKind::Class | TypeKind::Struct | TypeKind::Record | TypeKind::RecordStruct => {
                ir::TypeDef::Class(self.convert_class(decl))
            }
            TypeKind::Interface => ir::TypeDef::Interface(self.convert_interface(decl)),
            TypeKind::Enum => ir::TypeDef::Enum(self.convert_enum(decl)),
            TypeKind::Delegate => ir::TypeDef::Delegate(self.convert_delegate(decl)),
        };
        self.conv.ctx.pop_scope();
        Ok(def)
    }

    fn convert_class(&mut self, decl: &TypeDecl) -> ir::ClassDef {
        let kind = match decl.kind {
            TypeKind::Struct => {
                self.conv.review(
                    "structs",
                    format!("struct `{}` becomes a class; copies now share state", decl.name),
                    decl.span,
                );
                ir::ClassKind::Struct
            }
            TypeKind::Record | TypeKind::RecordStruct => {
                self.conv.uses("records");
                ir::ClassKind::Record
            }
            _ => {
                self.conv.uses("classes");
                ir::ClassKind::Class
            }
        };
        if has_modifier(&decl.modifiers, Modifier::Partial) {
            self.conv.review(
                "partial-classes",
                format!("`{}` is partial; other parts are converted separately", decl.name),
                decl.span,
            );
        }

        let (base, interfaces) = self.split_bases(&decl.bases, kind);
        let mut class = ir::ClassDef {
            id: self.conv.ctx.next_id("cls"),
            name: decl.name.clone(),
            kind,
            namespace: self.conv.ctx.current_namespace(),
            visibility: Converter::visibility(&decl.modifiers, ir::Visibility::Internal),
            is_static: has_modifier(&decl.modifiers, Modifier::Static),
            is_abstract: has_modifier(&decl.modifiers, Modifier::Abstract),
            is_sealed: has_modifier(&decl.modifiers, Modifier::Sealed),
            type_params: self.conv.type_params(&decl.type_params, &decl.constraints),
            base,
            interfaces,
            ..Default::default()
        };

        if kind == ir::ClassKind::Record && !decl.parameters.is_empty() {
            self.record_parameters(decl, &mut class);
        }
        for member in &decl.members {
            if let Err(err) = self.convert_member(member, &mut class) {
                self.record_error(err);
            }
        }
        class
    }

    /// The first base is the base class unless it reads like an interface
    /// name (`IFoo`). Structs and records structs never have a base class.
    fn split_bases(&self, bases: &[String], kind: ir::ClassKind) -> (Option<String>, Vec<String>) {
        let mut mapped = bases.iter().map(|b| self.conv.map_type(b));
        let first_is_class = kind != ir::ClassKind::Struct
            && bases.first().is_some_and(|b| !looks_like_interface(b));
        let base = if first_is_class { mapped.next() } else { None };
        (base, mapped.collect())
    }

    /// `record Point(int X, int Y)` gets init-only properties and a
    /// constructor assigning them.
    fn record_parameters(&mut self, decl: &TypeDecl, class: &mut ir::ClassDef) {
        let params = self.conv.convert_params(&decl.parameters, decl.span);
        let mut body = Vec::with_capacity(params.len());
        for param in &params {
            class.properties.push(ir::Property {
                name: param.name.clone(),
                ty: param.ty.clone().unwrap_or_else(|| "any".to_string()),
                visibility: ir::Visibility::Public,
                is_static: false,
                getter: Some(auto_accessor(ir::Visibility::Public, false)),
                setter: Some(auto_accessor(ir::Visibility::Public, true)),
                init: None,
            });
            body.push(ir::Stmt::assign(
                ir::Expr::member(ir::Expr::This, param.name.clone()),
                ir::Expr::reference(param.name.clone()),
            ));
        }
        self.conv.ctx.stats.properties += params.len();
        self.conv.ctx.stats.methods += 1;
        class.constructors.push(ir::Constructor {
            id: self.conv.ctx.next_id("ctor"),
            visibility: ir::Visibility::Public,
            params,
            body,
            ..Default::default()
        });
    }

    fn convert_interface(&mut self, decl: &TypeDecl) -> ir::InterfaceDef {
        self.conv.uses("interfaces");
        let id = self.conv.ctx.next_id("ifc");

        let mut scratch = ir::ClassDef::default();
        for member in &decl.members {
            if let MemberDecl::Method(method) = member
                && method.body.is_some()
            {
                self.conv.review(
                    "default-interface-methods",
                    format!("`{}` has a default body", method.name),
                    method.span,
                );
            }
            if let Err(err) = self.convert_member(member, &mut scratch) {
                self.record_error(err);
            }
        }
        // Interface members are public unless stated otherwise.
        for method in &mut scratch.methods {
            method.visibility = ir::Visibility::Public;
            method.is_abstract = method.body.is_none();
        }
        for property in &mut scratch.properties {
            property.visibility = ir::Visibility::Public;
        }
        for event in &mut scratch.events {
            event.visibility = ir::Visibility::Public;
        }

        ir::InterfaceDef {
            id,
            name: decl.name.clone(),
            namespace: self.conv.ctx.current_namespace(),
            visibility: Converter::visibility(&decl.modifiers, ir::Visibility::Internal),
            type_params: self.conv.type_params(&decl.type_params, &decl.constraints),
            extends: decl.bases.iter().map(|b| self.conv.map_type(b)).collect(),
            properties: scratch.properties,
            methods: scratch.methods,
            events: scratch.events,
        }
    }

    fn convert_enum(&mut self, decl: &TypeDecl) -> ir::EnumDef {
        self.conv.uses("enums");
        ir::EnumDef {
            id: self.conv.ctx.next_id("enum"),
            name: decl.name.clone(),
            namespace: self.conv.ctx.current_namespace(),
            visibility: Converter::visibility(&decl.modifiers, ir::Visibility::Internal),
            underlying: decl.bases.first().map(|b| self.conv.map_type(b)),
            members: decl
                .enum_members
                .iter()
                .map(|m| ir::EnumMember {
                    name: m.name.clone(),
                    value: m.value.as_ref().map(|v| self.conv.convert_standalone_expr(v)),
                })
                .collect(),
        }
    }

    fn convert_delegate(&mut self, decl: &TypeDecl) -> ir::DelegateDef {
        self.conv.uses("delegates");
        ir::DelegateDef {
            id: self.conv.ctx.next_id("dlg"),
            name: decl.name.clone(),
            namespace: self.conv.ctx.current_namespace(),
            visibility: Converter::visibility(&decl.modifiers, ir::Visibility::Internal),
            type_params: self.conv.type_params(&decl.type_params, &decl.constraints),
            params: self.conv.convert_params(&decl.parameters, decl.span),
            return_type: self
                .conv
                .map_type(decl.return_type.as_deref().unwrap_or("void")),
        }
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    fn convert_member(&mut self, member: &MemberDecl, class: &mut ir::ClassDef) -> Result<(), ConvertError> {
        match member {
            MemberDecl::Field(field) => self.convert_field(field, class),
            MemberDecl::Property(prop) => {
                let property = self.convert_property(prop);
                class.properties.push(property);
            }
            MemberDecl::Method(method) => {
                let method = self.conv.convert_method(method);
                class.methods.push(method);
            }
            MemberDecl::Constructor(ctor) => {
                let ctor = self.convert_constructor(ctor);
                class.constructors.push(ctor);
            }
            MemberDecl::Destructor(dtor) => {
                self.conv.review(
                    "finalizers",
                    format!("finalizer of `{}` becomes `Finalize` and is never called implicitly", dtor.name),
                    dtor.span,
                );
                let decl = MethodDecl {
                    body: dtor.body.clone(),
                    span: dtor.span,
                    ..MethodDecl::new("Finalize", "void", Vec::new(), Vec::new())
                        .with_modifiers(&[Modifier::Protected])
                };
                let method = self.conv.convert_method(&decl);
                class.methods.push(method);
            }
            MemberDecl::Event(event) => {
                let event = self.convert_event(event);
                class.events.push(event);
            }
            MemberDecl::Indexer(indexer) => self.convert_indexer(indexer, class),
            MemberDecl::Operator(op) => {
                let method = self.convert_operator(op)?;
                class.methods.push(method);
            }
            MemberDecl::ConversionOperator(op) => {
                let method = self.convert_conversion_operator(op);
                class.methods.push(method);
            }
            MemberDecl::NestedType(nested) => match self.convert_type(nested) {
                Ok(def) => class.nested.push(def),
                Err(err) => self.record_error(err),
            },
        }
        Ok(())
    }

    fn convert_field(&mut self, field: &FieldDecl, class: &mut ir::ClassDef) {
        let is_const = has_modifier(&field.modifiers, Modifier::Const);
        let ty = self.conv.map_type(&field.ty);
        for declarator in &field.declarators {
            self.conv.ctx.stats.fields += 1;
            class.fields.push(ir::Field {
                name: declarator.name.clone(),
                ty: ty.clone(),
                visibility: Converter::visibility(&field.modifiers, ir::Visibility::Private),
                is_static: is_const || has_modifier(&field.modifiers, Modifier::Static),
                is_readonly: is_const || has_modifier(&field.modifiers, Modifier::Readonly),
                init: declarator
                    .init
                    .as_ref()
                    .map(|init| self.conv.convert_standalone_expr(init)),
            });
        }
    }

    fn convert_property(&mut self, prop: &PropertyDecl) -> ir::Property {
        self.conv.uses("properties");
        self.conv.ctx.stats.properties += 1;
        let visibility = Converter::visibility(&prop.modifiers, ir::Visibility::Private);

        let (getter, setter) = match &prop.expression_body {
            Some(expr) => {
                let body = self.conv.convert_body(&MethodBody::Expr(expr.clone()), true);
                let getter = ir::Accessor {
                    visibility,
                    init_only: false,
                    effects: self.conv.infer_effects(&body),
                    body: Some(body),
                };
                (Some(getter), None)
            }
            None => (
                prop.getter
                    .as_ref()
                    .map(|a| self.convert_accessor(a, visibility, true)),
                prop.setter
                    .as_ref()
                    .map(|a| self.convert_accessor(a, visibility, false)),
            ),
        };

        ir::Property {
            name: prop.name.clone(),
            ty: self.conv.map_type(&prop.ty),
            visibility,
            is_static: has_modifier(&prop.modifiers, Modifier::Static),
            getter,
            setter,
            init: prop
                .init
                .as_ref()
                .map(|init| self.conv.convert_standalone_expr(init)),
        }
    }

    fn convert_accessor(
        &mut self,
        accessor: &AccessorDecl,
        default: ir::Visibility,
        returns_value: bool,
    ) -> ir::Accessor {
        let body = accessor
            .body
            .as_ref()
            .map(|body| self.conv.convert_body(body, returns_value));
        ir::Accessor {
            visibility: Converter::visibility(&accessor.modifiers, default),
            init_only: accessor.kind == AccessorKind::Init,
            effects: body.as_deref().and_then(|b| self.conv.infer_effects(b)),
            body,
        }
    }

    fn convert_constructor(&mut self, decl: &ConstructorDecl) -> ir::Constructor {
        self.conv.ctx.push_scope(Scope::Method(decl.name.clone()));
        self.conv.ctx.stats.methods += 1;
        let is_static = has_modifier(&decl.modifiers, Modifier::Static);
        if is_static {
            self.conv.review(
                "static-constructors",
                format!("static constructor of `{}` must be run explicitly", decl.name),
                decl.span,
            );
        }

        let params = self.conv.convert_params(&decl.params, decl.span);
        let initializer = decl.initializer.as_ref().map(|init| ir::CtorInitializer {
            target: match init.target {
                InitializerTarget::Base => ir::InitializerTarget::Base,
                InitializerTarget::This => ir::InitializerTarget::This,
            },
            args: init
                .args
                .iter()
                .map(|arg| ir::Arg {
                    name: arg.name.clone(),
                    value: self.conv.convert_standalone_expr(&arg.value),
                })
                .collect(),
        });
        let body = decl
            .body
            .as_ref()
            .map(|body| self.conv.convert_body(body, false))
            .unwrap_or_default();
        let effects = self.conv.infer_effects(&body);

        let ctor = ir::Constructor {
            id: self.conv.ctx.next_id("ctor"),
            visibility: Converter::visibility(&decl.modifiers, ir::Visibility::Private),
            is_static,
            params,
            initializer,
            body,
            effects,
        };
        self.conv.ctx.pop_scope();
        ctor
    }

    fn convert_event(&mut self, event: &EventDecl) -> ir::Event {
        self.conv.uses("events");
        if event.has_accessors {
            self.conv.review(
                "events",
                format!("custom add/remove accessors of `{}` dropped", event.name),
                event.span,
            );
        }
        ir::Event {
            name: event.name.clone(),
            ty: self.conv.map_type(&event.ty),
            visibility: Converter::visibility(&event.modifiers, ir::Visibility::Private),
            is_static: has_modifier(&event.modifiers, Modifier::Static),
        }
    }

    /// `this[int i]` becomes `get_Item(i)` and `set_Item(i, value)`.
    fn convert_indexer(&mut self, indexer: &IndexerDecl, class: &mut ir::ClassDef) {
        self.conv.uses("indexers");
        let getter_body = match (&indexer.expression_body, &indexer.getter) {
            (Some(expr), _) => Some(Some(MethodBody::Expr(expr.clone()))),
            (None, Some(getter)) => Some(getter.body.clone()),
            (None, None) => None,
        };
        if let Some(body) = getter_body {
            let decl = MethodDecl {
                body,
                span: indexer.span,
                ..MethodDecl::new("get_Item", indexer.ty.clone(), indexer.params.clone(), Vec::new())
                    .with_modifiers(&indexer.modifiers)
            };
            let method = self.conv.convert_method(&decl);
            class.methods.push(method);
        }
        if let Some(setter) = &indexer.setter {
            let mut params = indexer.params.clone();
            params.push(Parameter::new("value", indexer.ty.clone()));
            let decl = MethodDecl {
                body: setter.body.clone(),
                span: indexer.span,
                ..MethodDecl::new("set_Item", "void", params, Vec::new())
                    .with_modifiers(&indexer.modifiers)
            };
            let method = self.conv.convert_method(&decl);
            class.methods.push(method);
        }
    }

    fn convert_operator(&mut self, op: &OperatorDecl) -> Result<ir::Method, ConvertError> {
        let name = operator_method_name(&op.operator, op.params.len()).ok_or_else(|| {
            ConvertError::conversion(
                format!("unknown operator `{}` with {} operand(s)", op.operator, op.params.len()),
                op.span,
            )
        })?;
        self.conv.review(
            "operator-overloading",
            format!("operator `{}` becomes static method `{name}`; call sites must use it", op.operator),
            op.span,
        );
        let decl = MethodDecl {
            body: op.body.clone(),
            span: op.span,
            ..MethodDecl::new(name, op.return_type.clone(), op.params.clone(), Vec::new())
                .with_modifiers(&op.modifiers)
        };
        Ok(self.conv.convert_method(&decl))
    }

    fn convert_conversion_operator(&mut self, op: &ConversionOperatorDecl) -> ir::Method {
        let direction = if op.implicit { "Implicit" } else { "Explicit" };
        let name = format!("op_{direction}_{}", identifier_part(&op.target_type));
        self.conv.review(
            "conversion-operators",
            format!("conversion to `{}` becomes `{name}` and is no longer applied implicitly", op.target_type),
            op.span,
        );
        let decl = MethodDecl {
            body: op.body.clone(),
            span: op.span,
            ..MethodDecl::new(name, op.target_type.clone(), op.params.clone(), Vec::new())
                .with_modifiers(&op.modifiers)
        };
        self.conv.convert_method(&decl)
    }
}

fn auto_accessor(visibility: ir::Visibility, init_only: bool) -> ir::Accessor {
    ir::Accessor {
        visibility,
        init_only,
        body: None,
        effects: None,
    }
}

/// `IDisposable`, `IEnumerable<T>`: an `I` followed by an uppercase letter.
fn looks_like_interface(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('I') && chars.next().is_some_and(|c| c.is_ascii_uppercase())
}

fn identifier_part(ty: &str) -> String {
    ty.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

/// Method name for an overloaded operator token and operand count.
pub fn operator_method_name(token: &str, arity: usize) -> Option<&'static str> {
    let name = match (token, arity) {
        ("+", 1) => "op_UnaryPlus",
        ("-", 1) => "op_UnaryNegation",
        ("!", 1) => "op_LogicalNot",
        ("~", 1) => "op_OnesComplement",
        ("++", 1) => "op_Increment",
        ("--", 1) => "op_Decrement",
        ("true", 1) => "op_True",
        ("false", 1) => "op_False",
        ("+", 2) => "op_Addition",
        ("-", 2) => "op_Subtraction",
        ("*", 2) => "op_Multiply",
        ("/", 2) => "op_Division",
        ("%", 2) => "op_Modulus",
        ("&", 2) => "op_BitwiseAnd",
        ("|", 2) => "op_BitwiseOr",
        ("^", 2) => "op_ExclusiveOr",
        ("<<", 2) => "op_LeftShift",
        (">>", 2) => "op_RightShift",
        (">>>", 2) => "op_UnsignedRightShift",
        ("==", 2) => "op_Equality",
        ("!=", 2) => "op_Inequality",
        ("<", 2) => "op_LessThan",
        (">", 2) => "op_GreaterThan",
        ("<=", 2) => "op_LessThanOrEqual",
        (">=", 2) => "op_GreaterThanOrEqual",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::context::ConversionContext;
    use crate::effects::BUILTIN_EFFECTS;
    use crate::source::{EnumMemberDecl, Expr, Span, VariableDeclarator};

    fn walk(unit: &CompilationUnit) -> (ir::Module, ConversionContext) {
        walk_with(unit, &ConversionOptions::default())
    }

    fn walk_with(unit: &CompilationUnit, options: &ConversionOptions) -> (ir::Module, ConversionContext) {
        let mut ctx = ConversionContext::new();
        let module = SourceTreeWalker::new(Converter::new(&mut ctx, options, &BUILTIN_EFFECTS)).walk(unit);
        (module, ctx)
    }

    fn in_namespace(name: &str, decls: Vec<Declaration>) -> CompilationUnit {
        CompilationUnit::new(vec![Declaration::Namespace {
            name: name.to_string(),
            members: decls,
        }])
    }

    fn field(ty: &str, names: &[&str], modifiers: &[Modifier]) -> MemberDecl {
        MemberDecl::Field(FieldDecl {
            modifiers: modifiers.to_vec(),
            ty: ty.to_string(),
            declarators: names
                .iter()
                .map(|n| VariableDeclarator {
                    name: n.to_string(),
                    init: None,
                })
                .collect(),
            span: Span::default(),
        })
    }

    #[test]
    fn test_namespace_and_ids() {
        let unit = in_namespace(
            "Shop.Orders",
            vec![
                Declaration::Type(TypeDecl::class("Order", vec![])),
                Declaration::Type(TypeDecl::class("Line", vec![])),
            ],
        );
        let (module, ctx) = walk(&unit);
        assert_eq!(module.id, "mod001");
        assert_eq!(module.name, "Shop.Orders");
        let order = module.find_type("Order").and_then(|t| t.as_class()).unwrap();
        assert_eq!(order.id, "cls001");
        assert_eq!(order.namespace, "Shop.Orders");
        assert_eq!(order.visibility, ir::Visibility::Internal);
        let line = module.find_type("Line").and_then(|t| t.as_class()).unwrap();
        assert_eq!(line.id, "cls002");
        assert_eq!(ctx.stats.types, 2);
        assert_eq!(ctx.feature_usage().get("classes"), Some(&2));
    }

    #[test]
    fn test_module_name_option_wins() {
        let unit = in_namespace("App", vec![]);
        let options = ConversionOptions::default().with_module_name("Billing");
        let (module, _) = walk_with(&unit, &options);
        assert_eq!(module.name, "Billing");

        let (module, _) = walk(&CompilationUnit::default());
        assert_eq!(module.name, "Program");
    }

    #[test]
    fn test_top_level_statements_become_entry_point() {
        let unit = CompilationUnit::new(vec![
            Declaration::GlobalStatement(Stmt::expr(Expr::method_call(
                Expr::ident("Console"),
                "WriteLine",
                vec![Expr::string("hi")],
            ))),
            Declaration::Type(TypeDecl::class("Helper", vec![])),
        ]);
        let (module, _) = walk(&unit);
        let main = module.find_function("main").unwrap();
        assert!(main.is_static);
        assert_eq!(main.return_type, "void");
        assert_eq!(main.body.as_ref().map(Vec::len), Some(1));
        assert!(main.effects.is_some());
        assert_eq!(module.types.len(), 1);
    }

    #[test]
    fn test_fields_and_const() {
        let class = TypeDecl::class(
            "Config",
            vec![
                field("int", &["a", "b"], &[Modifier::Private]),
                field("string", &["Name"], &[Modifier::Public, Modifier::Const]),
            ],
        );
        let (module, ctx) = walk(&CompilationUnit::new(vec![Declaration::Type(class)]));
        let class = module.find_type("Config").and_then(|t| t.as_class()).unwrap();
        assert_eq!(class.fields.len(), 3);
        assert_eq!(class.fields[0].ty, "i32");
        let name = &class.fields[2];
        assert!(name.is_static && name.is_readonly);
        assert_eq!(name.visibility, ir::Visibility::Public);
        assert_eq!(ctx.stats.fields, 3);
    }

    #[test]
    fn test_base_class_and_interfaces() {
        let mut decl = TypeDecl::class("Repo", vec![]);
        decl.bases = vec!["RepoBase".into(), "IDisposable".into()];
        let mut other = TypeDecl::class("Only", vec![]);
        other.bases = vec!["IEnumerable<int>".into()];
        let (module, _) = walk(&CompilationUnit::new(vec![
            Declaration::Type(decl),
            Declaration::Type(other),
        ]));
        let repo = module.find_type("Repo").and_then(|t| t.as_class()).unwrap();
        assert_eq!(repo.base.as_deref(), Some("RepoBase"));
        assert_eq!(repo.interfaces, ["IDisposable"]);
        let only = module.find_type("Only").and_then(|t| t.as_class()).unwrap();
        assert_eq!(only.base, None);
        assert_eq!(only.interfaces.len(), 1);
    }

    #[test]
    fn test_record_parameters() {
        let mut decl = TypeDecl::new(TypeKind::Record, "Point");
        decl.parameters = vec![Parameter::new("X", "int"), Parameter::new("Y", "int")];
        let (module, ctx) = walk(&CompilationUnit::new(vec![Declaration::Type(decl)]));
        let point = module.find_type("Point").and_then(|t| t.as_class()).unwrap();
        assert_eq!(point.kind, ir::ClassKind::Record);
        assert_eq!(point.properties.len(), 2);
        assert!(point.properties[0].setter.as_ref().is_some_and(|s| s.init_only));
        assert_eq!(point.constructors.len(), 1);
        match &point.constructors[0].body[1] {
            ir::Stmt::Assign { target, value } => {
                assert_eq!(*target, ir::Expr::member(ir::Expr::This, "Y"));
                assert_eq!(*value, ir::Expr::reference("Y"));
            }
            _ => panic!("expected field assignment"),
        }
        assert_eq!(ctx.feature_usage().get("records"), Some(&1));
    }

    #[test]
    fn test_struct_needs_review() {
        let decl = TypeDecl::new(TypeKind::Struct, "Vec2");
        let (module, ctx) = walk(&CompilationUnit::new(vec![Declaration::Type(decl)]));
        let vec2 = module.find_type("Vec2").and_then(|t| t.as_class()).unwrap();
        assert_eq!(vec2.kind, ir::ClassKind::Struct);
        assert_eq!(ctx.issues().len(), 1);
        assert_eq!(ctx.issues()[0].feature.as_deref(), Some("structs"));
    }

    #[test]
    fn test_interface_members_are_public() {
        let mut decl = TypeDecl::new(TypeKind::Interface, "IShape");
        decl.members = vec![MemberDecl::Method(MethodDecl {
            body: None,
            ..MethodDecl::new("Area", "double", vec![], vec![]).with_modifiers(&[])
        })];
        let (module, _) = walk(&CompilationUnit::new(vec![Declaration::Type(decl)]));
        match module.find_type("IShape") {
            Some(ir::TypeDef::Interface(shape)) => {
                assert_eq!(shape.id, "ifc001");
                let area = &shape.methods[0];
                assert_eq!(area.visibility, ir::Visibility::Public);
                assert!(area.is_abstract);
                assert_eq!(area.return_type, "f64");
            }
            _ => panic!("expected interface"),
        }
    }

    #[test]
    fn test_enum_underlying_and_values() {
        let mut decl = TypeDecl::new(TypeKind::Enum, "Color");
        decl.bases = vec!["byte".into()];
        decl.enum_members = vec![
            EnumMemberDecl {
                name: "Red".into(),
                value: Some(Expr::int(1)),
            },
            EnumMemberDecl {
                name: "Green".into(),
                value: None,
            },
        ];
        let (module, _) = walk(&CompilationUnit::new(vec![Declaration::Type(decl)]));
        match module.find_type("Color") {
            Some(ir::TypeDef::Enum(color)) => {
                assert_eq!(color.underlying.as_deref(), Some("u8"));
                assert_eq!(color.members[0].value, Some(ir::Expr::int(1)));
                assert_eq!(color.members[1].value, None);
            }
            _ => panic!("expected enum"),
        }
    }

    #[test]
    fn test_operator_becomes_static_method() {
        let op = OperatorDecl {
            modifiers: vec![Modifier::Public, Modifier::Static],
            return_type: "Money".into(),
            operator: "+".into(),
            params: vec![Parameter::new("a", "Money"), Parameter::new("b", "Money")],
            body: Some(MethodBody::Expr(Expr::ident("a"))),
            span: Span::new(4, 5),
        };
        let class = TypeDecl::class("Money", vec![MemberDecl::Operator(op)]);
        let (module, ctx) = walk(&CompilationUnit::new(vec![Declaration::Type(class)]));
        let money = module.find_type("Money").and_then(|t| t.as_class()).unwrap();
        let add = money.find_method("op_Addition").unwrap();
        assert!(add.is_static);
        assert_eq!(add.body, Some(vec![ir::Stmt::Return(Some(ir::Expr::reference("a")))]));
        assert_eq!(ctx.issues()[0].feature.as_deref(), Some("operator-overloading"));
        assert_eq!(ctx.issues()[0].line, 4);
    }

    #[test]
    fn test_unknown_operator_is_recorded_and_walk_continues() {
        let op = OperatorDecl {
            modifiers: vec![Modifier::Public, Modifier::Static],
            return_type: "Money".into(),
            operator: "=>".into(),
            params: vec![Parameter::new("a", "Money")],
            body: None,
            span: Span::new(7, 3),
        };
        let class = TypeDecl::class(
            "Money",
            vec![MemberDecl::Operator(op), field("decimal", &["amount"], &[])],
        );
        let (module, ctx) = walk(&CompilationUnit::new(vec![Declaration::Type(class)]));
        let money = module.find_type("Money").and_then(|t| t.as_class()).unwrap();
        assert!(money.methods.is_empty());
        assert_eq!(money.fields.len(), 1);
        let errors: Vec<_> = ctx
            .issues()
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, IssueKind::Conversion);
        assert_eq!((errors[0].line, errors[0].column), (7, 3));
    }

    #[test]
    fn test_unnamed_type_is_an_error() {
        let unit = CompilationUnit::new(vec![
            Declaration::Type(TypeDecl::class("", vec![])),
            Declaration::Type(TypeDecl::class("Kept", vec![])),
        ]);
        let (module, ctx) = walk(&unit);
        assert_eq!(module.types.len(), 1);
        assert_eq!(ctx.issues()[0].severity, Severity::Error);
    }

    #[test]
    fn test_indexer_lowered_to_methods() {
        let indexer = IndexerDecl {
            modifiers: vec![Modifier::Public],
            ty: "string".into(),
            params: vec![Parameter::new("i", "int")],
            getter: None,
            setter: Some(AccessorDecl {
                kind: AccessorKind::Set,
                modifiers: vec![],
                body: Some(MethodBody::Block(vec![])),
            }),
            expression_body: Some(Expr::string("x")),
            span: Span::default(),
        };
        let class = TypeDecl::class("Table", vec![MemberDecl::Indexer(indexer)]);
        let (module, _) = walk(&CompilationUnit::new(vec![Declaration::Type(class)]));
        let table = module.find_type("Table").and_then(|t| t.as_class()).unwrap();
        let get = table.find_method("get_Item").unwrap();
        assert_eq!(get.return_type, "str");
        let set = table.find_method("set_Item").unwrap();
        assert_eq!(set.params.len(), 2);
        assert_eq!(set.params[1].name, "value");
    }

    #[test]
    fn test_accessor_bodies_carry_effects() {
        let read = Expr::method_call(Expr::ident("File"), "ReadAllText", vec![Expr::ident("path")]);
        let log = Stmt::expr(Expr::method_call(
            Expr::ident("Console"),
            "WriteLine",
            vec![Expr::ident("value")],
        ));
        let text = PropertyDecl {
            modifiers: vec![Modifier::Public],
            ty: "string".into(),
            name: "Text".into(),
            getter: None,
            setter: None,
            expression_body: Some(read.clone()),
            init: None,
            span: Span::default(),
        };
        let cached = PropertyDecl {
            name: "Cached".into(),
            expression_body: None,
            getter: Some(AccessorDecl {
                kind: AccessorKind::Get,
                modifiers: vec![],
                body: Some(MethodBody::Expr(read)),
            }),
            setter: Some(AccessorDecl {
                kind: AccessorKind::Set,
                modifiers: vec![],
                body: Some(MethodBody::Block(vec![log])),
            }),
            ..text.clone()
        };
        let plain = PropertyDecl {
            name: "Name".into(),
            expression_body: None,
            getter: Some(AccessorDecl {
                kind: AccessorKind::Get,
                modifiers: vec![],
                body: None,
            }),
            ..text.clone()
        };
        let class = TypeDecl::class(
            "Document",
            vec![
                MemberDecl::Property(text),
                MemberDecl::Property(cached),
                MemberDecl::Property(plain),
            ],
        );
        let (module, _) = walk(&CompilationUnit::new(vec![Declaration::Type(class)]));
        let doc = module.find_type("Document").and_then(|t| t.as_class()).unwrap();

        let getter = doc.find_property("Text").and_then(|p| p.getter.as_ref()).unwrap();
        let effects = getter.effects.as_ref().unwrap();
        assert!(effects.contains(crate::effects::EffectCategory::Io, "file"));

        let cached = doc.find_property("Cached").unwrap();
        let get = cached.getter.as_ref().and_then(|a| a.effects.as_ref()).unwrap();
        assert!(get.contains(crate::effects::EffectCategory::Io, "file"));
        let set = cached.setter.as_ref().and_then(|a| a.effects.as_ref()).unwrap();
        assert!(set.contains(crate::effects::EffectCategory::Io, "console"));

        let name = doc.find_property("Name").and_then(|p| p.getter.as_ref()).unwrap();
        assert!(name.effects.is_none());
    }

    #[test]
    fn test_operator_names() {
        assert_eq!(operator_method_name("-", 1), Some("op_UnaryNegation"));
        assert_eq!(operator_method_name("-", 2), Some("op_Subtraction"));
        assert_eq!(operator_method_name("==", 2), Some("op_Equality"));
        assert_eq!(operator_method_name("==", 1), None);
        assert!(looks_like_interface("IList<T>"));
        assert!(!looks_like_interface("Item"));
        assert_eq!(identifier_part("List<int>"), "List_int");
    }
}
