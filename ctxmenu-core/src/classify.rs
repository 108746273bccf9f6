//! Function classification
//!
//! Precedence, first match wins:
//! 1. component: the body returns markup
//! 2. hook: the name follows the `useXxx` convention
//! 3. async: declared `async`
//! 4. the structural kind of the node

use crate::ast::{FunctionKind, FunctionShape};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};

/// Classify a discovered function
pub fn classify(shape: FunctionShape, name: &str, is_async: bool, renders_markup: bool) -> FunctionKind {
    if renders_markup {
        FunctionKind::Component
    } else if is_hook_name(name) {
        FunctionKind::Hook
    } else if is_async {
        FunctionKind::Async
    } else {
        shape.structural_kind()
    }
}

/// `use` followed by an uppercase letter, e.g. `useState`
///
/// Bare `use` and `user`/`useful` style names do not qualify.
pub fn is_hook_name(name: &str) -> bool {
    name.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Whether an expression evaluates to JSX
///
/// Looks through parentheses, conditionals and `&&`/`||`/`??`, so
/// `cond ? <A /> : null` and `ready && <A />` both count.
pub fn is_markup(expr: &Expr) -> bool {
    match expr {
        Expr::JSXElement(_) | Expr::JSXFragment(_) => true,
        Expr::Paren(paren) => is_markup(&paren.expr),
        Expr::Cond(cond) => is_markup(&cond.cons) || is_markup(&cond.alt),
        Expr::Bin(bin) => {
            matches!(bin.op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing)
                && (is_markup(&bin.left) || is_markup(&bin.right))
        }
        Expr::TsAs(ts_as) => is_markup(&ts_as.expr),
        Expr::TsNonNull(non_null) => is_markup(&non_null.expr),
        _ => false,
    }
}

/// Whether any `return` in the body hands back markup
///
/// Returns of nested functions belong to those functions and are skipped.
pub fn block_returns_markup(body: &BlockStmt) -> bool {
    let mut finder = MarkupReturnFinder { found: false };
    body.visit_with(&mut finder);
    finder.found
}

struct MarkupReturnFinder {
    found: bool,
}

impl Visit for MarkupReturnFinder {
    fn visit_return_stmt(&mut self, stmt: &ReturnStmt) {
        if stmt.arg.as_deref().is_some_and(is_markup) {
            self.found = true;
        }
    }

    fn visit_function(&mut self, _: &Function) {}
    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}
    fn visit_class(&mut self, _: &Class) {}
    fn visit_getter_prop(&mut self, _: &GetterProp) {}
    fn visit_setter_prop(&mut self, _: &SetterProp) {}
}
