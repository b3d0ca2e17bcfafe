//! Per-conversion mutable state.

use crate::ir::Module;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A construct degraded to a fallback node.
    UnsupportedFeature,
    /// Converted, but semantics may differ.
    ManualReview,
    /// A local conversion failure.
    Conversion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    /// 1-based; 0 when unknown.
    pub line: u32,
    pub column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Node counts, per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    pub types: usize,
    pub methods: usize,
    pub properties: usize,
    pub fields: usize,
    pub statements: usize,
    pub expressions: usize,
    pub fallbacks: usize,
    pub native_ops: usize,
    pub chains_decomposed: usize,
    pub temporaries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Namespace(String),
    Type(String),
    Method(String),
}

/// State for one conversion job: id and temporary counters, the scope
/// stack, diagnostics and feature usage.
///
/// Never shared between conversions.
#[derive(Debug, Default)]
pub struct ConversionContext {
    ids: HashMap<&'static str, u32>,
    temps: u32,
    scopes: Vec<Scope>,
    issues: Vec<ConversionIssue>,
    pub stats: ConversionStats,
    feature_usage: BTreeMap<String, usize>,
}

impl ConversionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next node id for a prefix: `cls001`, `cls002`, `fn001`, ...
    pub fn next_id(&mut self, prefix: &'static str) -> String {
        let n = self.ids.entry(prefix).or_insert(0);
        *n += 1;
        format!("{prefix}{n:03}")
    }

    /// Fresh temporary name: `_chain1`, `_tmp2`, ...
    ///
    /// One counter serves every prefix, so names never collide within a
    /// context regardless of prefix.
    pub fn fresh_temp(&mut self, prefix: &str) -> String {
        self.temps += 1;
        self.stats.temporaries += 1;
        format!("_{prefix}{}", self.temps)
    }

    pub fn push_scope(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub fn pop_scope(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    /// Dotted namespace path of the enclosing namespaces.
    pub fn current_namespace(&self) -> String {
        self.scopes
            .iter()
            .filter_map(|s| match s {
                Scope::Namespace(name) => Some(name.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn current_type(&self) -> Option<&str> {
        self.scopes.iter().rev().find_map(|s| match s {
            Scope::Type(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn current_method(&self) -> Option<&str> {
        self.scopes.iter().rev().find_map(|s| match s {
            Scope::Method(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn report(&mut self, issue: ConversionIssue) {
        tracing::debug!(
            severity = ?issue.severity,
            feature = issue.feature.as_deref().unwrap_or("-"),
            line = issue.line,
            "{}",
            issue.message
        );
        self.issues.push(issue);
    }

    pub fn record_feature(&mut self, feature: &str) {
        *self.feature_usage.entry(feature.to_string()).or_insert(0) += 1;
    }

    pub fn issues(&self) -> &[ConversionIssue] {
        &self.issues
    }

    pub fn feature_usage(&self) -> &BTreeMap<String, usize> {
        &self.feature_usage
    }

    pub fn into_result(self, module: Module) -> ConversionResult {
        ConversionResult {
            module,
            issues: self.issues,
            stats: self.stats,
            feature_usage: self.feature_usage,
        }
    }
}

/// Output of one conversion job.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    pub module: Module,
    pub issues: Vec<ConversionIssue>,
    pub stats: ConversionStats,
    pub feature_usage: BTreeMap<String, usize>,
}

impl ConversionResult {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConversionIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConversionIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_per_prefix() {
        let mut ctx = ConversionContext::new();
        assert_eq!(ctx.next_id("cls"), "cls001");
        assert_eq!(ctx.next_id("cls"), "cls002");
        assert_eq!(ctx.next_id("fn"), "fn001");
    }

    #[test]
    fn test_temps_unique_across_prefixes() {
        let mut ctx = ConversionContext::new();
        let names = [
            ctx.fresh_temp("chain"),
            ctx.fresh_temp("tmp"),
            ctx.fresh_temp("chain"),
        ];
        assert_eq!(names, ["_chain1", "_tmp2", "_chain3"]);
        assert_eq!(ctx.stats.temporaries, 3);
    }

    #[test]
    fn test_scope_stack() {
        let mut ctx = ConversionContext::new();
        ctx.push_scope(Scope::Namespace("Acme".into()));
        ctx.push_scope(Scope::Namespace("Tools".into()));
        ctx.push_scope(Scope::Type("Widget".into()));
        ctx.push_scope(Scope::Method("Run".into()));
        assert_eq!(ctx.current_namespace(), "Acme.Tools");
        assert_eq!(ctx.current_type(), Some("Widget"));
        assert_eq!(ctx.current_method(), Some("Run"));
        ctx.pop_scope();
        assert_eq!(ctx.current_method(), None);
    }

    #[test]
    fn test_result_filters_by_severity() {
        let mut ctx = ConversionContext::new();
        for severity in [Severity::Info, Severity::Warning, Severity::Error] {
            ctx.report(ConversionIssue {
                severity,
                kind: IssueKind::Conversion,
                message: "m".into(),
                feature: None,
                line: 1,
                column: 1,
                suggestion: None,
            });
        }
        let result = ctx.into_result(Module::default());
        assert!(result.has_errors());
        assert_eq!(result.warnings().count(), 1);
        assert_eq!(result.errors().count(), 1);
    }
}
