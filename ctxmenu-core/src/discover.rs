//! Function discovery from the syntax tree
//!
//! Global invariants enforced:
//! - One walk over the module; candidates come out sorted by start offset
//! - Each candidate spans its binding site, not just the function node
//!
//! Supported constructs:
//! - Function declarations, including `export` / `export default` forms
//! - Function expressions and arrow functions, named by the variable,
//!   assignment target, object key or class property they are bound to
//! - Class methods, private methods, accessors and constructors
//! - Object literal methods
//!
//! Ignored constructs:
//! - Overload signatures and ambient declarations (no body)
//! - Object getters/setters (their inner functions are still visited)

use crate::ast::FunctionShape;
use crate::classify::{block_returns_markup, is_markup};
use crate::parser::ParsedSource;
use std::collections::HashSet;
use swc_common::{Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};

/// A function-like construct found in a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub shape: FunctionShape,
    /// Resolved binding name, if any
    pub name: Option<String>,
    /// Byte offset where the binding site starts
    pub start: usize,
    /// Byte offset just past the binding site
    pub end: usize,
    pub is_async: bool,
    pub is_exported: bool,
    pub has_decorators: bool,
    /// Body returns JSX (or is JSX)
    pub renders_markup: bool,
    /// Declared at module scope; `export default <name>` may refer to it
    top_level: bool,
}

impl Candidate {
    /// Inclusive containment of a byte offset
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// Collect every function-like construct in a parsed module
///
/// Returns candidates sorted by start offset; candidates sharing a start are
/// ordered outermost first.
pub fn discover_functions(parsed: &ParsedSource) -> Vec<Candidate> {
    let mut collector = FunctionCollector {
        parsed,
        candidates: Vec::new(),
        depth: 0,
    };

    parsed.module.visit_with(&mut collector);

    let default_exports = default_exported_names(&parsed.module);
    let mut candidates = collector.candidates;
    for candidate in &mut candidates {
        if candidate.top_level
            && candidate
                .name
                .as_ref()
                .is_some_and(|name| default_exports.contains(name.as_str()))
        {
            candidate.is_exported = true;
        }
    }

    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    candidates
}

/// Identifiers named by module-scope `export default <identifier>;`
fn default_exported_names(module: &Module) -> HashSet<&str> {
    module
        .body
        .iter()
        .filter_map(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                match unwrap_expr(&export.expr) {
                    Expr::Ident(ident) => Some(&*ident.sym),
                    _ => None,
                }
            }
            _ => None,
        })
        .collect()
}

/// Where a function is bound and what that binding says about it
struct Site {
    name: Option<String>,
    span: Span,
    exported: bool,
    decorated: bool,
    top_level: bool,
}

impl Site {
    /// A function with no binding of its own (callbacks, IIFEs)
    fn bare(span: Span, name: Option<String>) -> Self {
        Site {
            name,
            span,
            exported: false,
            decorated: false,
            top_level: false,
        }
    }
}

/// Visitor to collect function candidates from the AST
struct FunctionCollector<'p> {
    parsed: &'p ParsedSource,
    candidates: Vec<Candidate>,
    /// Function nesting depth of the node being visited
    depth: usize,
}

impl FunctionCollector<'_> {
    fn push(&mut self, shape: FunctionShape, site: Site, is_async: bool, renders_markup: bool) {
        let (start, end) = self.parsed.range(site.span);
        self.candidates.push(Candidate {
            shape,
            name: site.name,
            start,
            end,
            is_async,
            is_exported: site.exported,
            has_decorators: site.decorated,
            renders_markup,
            top_level: site.top_level,
        });
    }

    fn record_function(&mut self, shape: FunctionShape, function: &Function, mut site: Site) {
        if let Some(body) = &function.body {
            if let Some(first) = function.decorators.first() {
                site.decorated = true;
                site.span = Span::new(site.span.lo.min(first.span.lo), site.span.hi);
            }
            let renders_markup = block_returns_markup(body);
            self.push(shape, site, function.is_async, renders_markup);
        }

        self.depth += 1;
        function.visit_children_with(self);
        self.depth -= 1;
    }

    fn record_arrow(&mut self, arrow: &ArrowExpr, site: Site) {
        let renders_markup = match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(body) => block_returns_markup(body),
            BlockStmtOrExpr::Expr(expr) => is_markup(expr),
        };
        self.push(FunctionShape::Arrow, site, arrow.is_async, renders_markup);

        self.depth += 1;
        arrow.visit_children_with(self);
        self.depth -= 1;
    }

    /// Visit an expression that sits in a binding position
    fn visit_bound(&mut self, expr: &Expr, site: Site) {
        match unwrap_expr(expr) {
            Expr::Arrow(arrow) => self.record_arrow(arrow, site),
            Expr::Fn(fn_expr) => {
                let site = Site {
                    name: site.name.or_else(|| ident_name(fn_expr.ident.as_ref())),
                    ..site
                };
                self.record_function(FunctionShape::Expression, &fn_expr.function, site);
            }
            _ => expr.visit_with(self),
        }
    }

    fn record_declaration(&mut self, decl: &FnDecl, export_span: Option<Span>) {
        let site = Site {
            name: Some(decl.ident.sym.to_string()),
            span: export_span.unwrap_or(decl.function.span),
            exported: export_span.is_some(),
            decorated: false,
            top_level: self.depth == 0,
        };
        self.record_function(FunctionShape::Declaration, &decl.function, site);
    }

    fn record_var_decl(&mut self, var: &VarDecl, export_span: Option<Span>) {
        let single = var.decls.len() == 1;
        for declarator in &var.decls {
            declarator.name.visit_with(self);
            let Some(init) = &declarator.init else {
                continue;
            };
            let name = match &declarator.name {
                Pat::Ident(binding) => Some(binding.id.sym.to_string()),
                _ => None,
            };
            let span = if single {
                export_span.unwrap_or(var.span)
            } else {
                declarator.span
            };
            let site = Site {
                name,
                span,
                exported: export_span.is_some(),
                decorated: false,
                top_level: self.depth == 0,
            };
            self.visit_bound(init, site);
        }
    }
}

impl Visit for FunctionCollector<'_> {
    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        self.record_declaration(decl, None);
    }

    fn visit_var_decl(&mut self, var: &VarDecl) {
        self.record_var_decl(var, None);
    }

    fn visit_export_decl(&mut self, export: &ExportDecl) {
        match &export.decl {
            Decl::Fn(decl) => self.record_declaration(decl, Some(export.span)),
            Decl::Var(var) => self.record_var_decl(var, Some(export.span)),
            other => other.visit_with(self),
        }
    }

    fn visit_export_default_decl(&mut self, export: &ExportDefaultDecl) {
        match &export.decl {
            DefaultDecl::Fn(fn_expr) => {
                let site = Site {
                    name: ident_name(fn_expr.ident.as_ref()),
                    span: export.span,
                    exported: true,
                    decorated: false,
                    top_level: false,
                };
                self.record_function(FunctionShape::Declaration, &fn_expr.function, site);
            }
            other => other.visit_with(self),
        }
    }

    fn visit_export_default_expr(&mut self, export: &ExportDefaultExpr) {
        let site = Site {
            name: None,
            span: export.span,
            exported: true,
            decorated: false,
            top_level: false,
        };
        self.visit_bound(&export.expr, site);
    }

    fn visit_fn_expr(&mut self, fn_expr: &FnExpr) {
        let site = Site::bare(fn_expr.function.span, ident_name(fn_expr.ident.as_ref()));
        self.record_function(FunctionShape::Expression, &fn_expr.function, site);
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        self.record_arrow(arrow, Site::bare(arrow.span, None));
    }

    fn visit_assign_expr(&mut self, assign: &AssignExpr) {
        assign.left.visit_with(self);
        let site = Site::bare(assign.span, assign_target_name(&assign.left));
        self.visit_bound(&assign.right, site);
    }

    fn visit_key_value_prop(&mut self, prop: &KeyValueProp) {
        prop.key.visit_with(self);
        let span = Span::new(prop.key.span().lo, prop.value.span().hi);
        self.visit_bound(&prop.value, Site::bare(span, prop_name(&prop.key)));
    }

    fn visit_method_prop(&mut self, method: &MethodProp) {
        method.key.visit_with(self);
        let span = Span::new(
            method.key.span().lo.min(method.function.span.lo),
            method.function.span.hi,
        );
        let name = prop_name(&method.key).unwrap_or_else(|| "method".to_string());
        self.record_function(FunctionShape::ObjectMethod, &method.function, Site::bare(span, Some(name)));
    }

    fn visit_class_method(&mut self, method: &ClassMethod) {
        method.key.visit_with(self);
        let name = prop_name(&method.key).unwrap_or_else(|| "method".to_string());
        self.record_function(FunctionShape::Method, &method.function, Site::bare(method.span, Some(name)));
    }

    fn visit_private_method(&mut self, method: &PrivateMethod) {
        let name = format!("#{}", method.key.name);
        self.record_function(FunctionShape::Method, &method.function, Site::bare(method.span, Some(name)));
    }

    fn visit_constructor(&mut self, ctor: &Constructor) {
        if let Some(body) = &ctor.body {
            let site = Site::bare(ctor.span, Some("constructor".to_string()));
            self.push(FunctionShape::Method, site, false, block_returns_markup(body));
        }

        self.depth += 1;
        ctor.visit_children_with(self);
        self.depth -= 1;
    }

    fn visit_class_prop(&mut self, prop: &ClassProp) {
        prop.key.visit_with(self);
        prop.decorators.visit_with(self);
        if let Some(value) = &prop.value {
            let site = Site {
                decorated: !prop.decorators.is_empty(),
                ..Site::bare(prop.span, prop_name(&prop.key))
            };
            self.visit_bound(value, site);
        }
    }
}

/// Look through parentheses and type-only wrappers
fn unwrap_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_expr(&paren.expr),
        Expr::TsAs(ts_as) => unwrap_expr(&ts_as.expr),
        Expr::TsSatisfies(satisfies) => unwrap_expr(&satisfies.expr),
        Expr::TsTypeAssertion(assertion) => unwrap_expr(&assertion.expr),
        _ => expr,
    }
}

fn ident_name(ident: Option<&Ident>) -> Option<String> {
    ident.map(|id| id.sym.to_string())
}

/// Name of an identifier or string-literal key
fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        // Wtf8Atom to String via to_atom_lossy (borrows when possible)
        PropName::Str(str_lit) => Some(str_lit.value.to_atom_lossy().to_string()),
        _ => None,
    }
}

fn assign_target_name(target: &AssignTarget) -> Option<String> {
    match target {
        AssignTarget::Simple(SimpleAssignTarget::Ident(binding)) => Some(binding.id.sym.to_string()),
        AssignTarget::Simple(SimpleAssignTarget::Member(member)) => match &member.prop {
            MemberProp::Ident(ident) => Some(ident.sym.to_string()),
            MemberProp::PrivateName(private) => Some(format!("#{}", private.name)),
            MemberProp::Computed(computed) => match &*computed.expr {
                Expr::Lit(Lit::Str(str_lit)) => Some(str_lit.value.to_atom_lossy().to_string()),
                _ => None,
            },
        },
        _ => None,
    }
}
