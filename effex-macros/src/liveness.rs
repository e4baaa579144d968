//! # Free Names
//!
//! The live-set half of the live-capture transform: which local names does
//! a piece of code read before (re)binding them?
//!
//! Scoping follows Rust's own rules closely enough for capture decisions:
//!
//! - `let` bindings shadow from the next statement on
//! - closure parameters, `match` arm patterns, `for` patterns and
//!   `if let`/`while let` patterns bind inside their bodies only
//! - nested items never see enclosing locals
//! - macro arguments are scanned token by token, including inline format
//!   arguments such as `"{name}"`
//!
//! Over-approximation is confined to macro bodies; everything else is exact.

use proc_macro2::{Ident, Span, TokenStream, TokenTree};
use rustc_hash::FxHashSet;
use syn::visit::{self, Visit};
use syn::{
    Arm, Expr, ExprClosure, ExprForLoop, ExprIf, ExprLet, ExprPath, ExprWhile, Item, Lit, Local,
    Macro, Pat, Stmt,
};

/// A name introduced by a pattern.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The bound identifier, with its original span.
    pub ident: Ident,
    /// Whether it was bound `mut`.
    pub mutable: bool,
}

/// Every name a pattern binds, left to right.
pub fn pattern_bindings(pat: &Pat) -> Vec<Binding> {
    let mut out = Vec::new();
    collect_bindings(pat, &mut out);
    out
}

fn collect_bindings(pat: &Pat, out: &mut Vec<Binding>) {
    match pat {
        Pat::Ident(p) => {
            let looks_like_path = p.by_ref.is_none()
                && p.mutability.is_none()
                && p.subpat.is_none()
                && p.ident.to_string().starts_with(char::is_uppercase);
            if !looks_like_path {
                out.push(Binding {
                    ident: p.ident.clone(),
                    mutable: p.mutability.is_some(),
                });
            }
            if let Some((_, sub)) = &p.subpat {
                collect_bindings(sub, out);
            }
        }
        Pat::Or(p) => {
            if let Some(first) = p.cases.first() {
                collect_bindings(first, out);
            }
        }
        Pat::Paren(p) => collect_bindings(&p.pat, out),
        Pat::Reference(p) => collect_bindings(&p.pat, out),
        Pat::Slice(p) => p.elems.iter().for_each(|e| collect_bindings(e, out)),
        Pat::Struct(p) => p.fields.iter().for_each(|f| collect_bindings(&f.pat, out)),
        Pat::Tuple(p) => p.elems.iter().for_each(|e| collect_bindings(e, out)),
        Pat::TupleStruct(p) => p.elems.iter().for_each(|e| collect_bindings(e, out)),
        Pat::Type(p) => collect_bindings(&p.pat, out),
        _ => {}
    }
}

/// Names read by `stmts` that are not bound within them first.
pub fn free_in_stmts(stmts: &[Stmt]) -> FxHashSet<String> {
    let mut names = FreeNames::default();
    names.enter();
    for stmt in stmts {
        names.visit_stmt(stmt);
    }
    names.free
}

/// Names read by `expr`.
pub fn free_in_expr(expr: &Expr) -> FxHashSet<String> {
    let mut names = FreeNames::default();
    names.enter();
    names.visit_expr(expr);
    names.free
}

#[derive(Default)]
struct FreeNames {
    scopes: Vec<FxHashSet<String>>,
    free: FxHashSet<String>,
}

impl FreeNames {
    fn enter(&mut self) {
        self.scopes.push(FxHashSet::default());
    }

    fn exit(&mut self) {
        self.scopes.pop();
    }

    fn bind(&mut self, pat: &Pat) {
        let names = pattern_bindings(pat);
        if let Some(scope) = self.scopes.last_mut() {
            scope.extend(names.into_iter().map(|b| b.ident.to_string()));
        }
    }

    fn read(&mut self, name: String) {
        if !self.scopes.iter().any(|scope| scope.contains(&name)) {
            self.free.insert(name);
        }
    }

    fn scan_tokens(&mut self, tokens: TokenStream) {
        let mut after_dot = false;
        for tree in tokens {
            match tree {
                TokenTree::Ident(ident) => {
                    if !after_dot {
                        self.read(ident.to_string());
                    }
                    after_dot = false;
                }
                TokenTree::Group(group) => {
                    self.scan_tokens(group.stream());
                    after_dot = false;
                }
                TokenTree::Punct(punct) => after_dot = punct.as_char() == '.',
                TokenTree::Literal(literal) => {
                    if let Lit::Str(text) = Lit::new(literal) {
                        for name in inline_format_args(&text.value()) {
                            self.read(name);
                        }
                    }
                    after_dot = false;
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for FreeNames {
    fn visit_block(&mut self, block: &'ast syn::Block) {
        self.enter();
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
        self.exit();
    }

    fn visit_local(&mut self, local: &'ast Local) {
        if let Some(init) = &local.init {
            self.visit_expr(&init.expr);
            if let Some((_, diverge)) = &init.diverge {
                self.visit_expr(diverge);
            }
        }
        self.bind(&local.pat);
    }

    fn visit_expr_path(&mut self, expr: &'ast ExprPath) {
        let path = &expr.path;
        if expr.qself.is_none() && path.leading_colon.is_none() && path.segments.len() == 1 {
            let segment = &path.segments[0];
            if segment.arguments.is_none() {
                self.read(segment.ident.to_string());
            }
        }
    }

    fn visit_expr_closure(&mut self, closure: &'ast ExprClosure) {
        self.enter();
        for input in &closure.inputs {
            self.bind(input);
        }
        self.visit_expr(&closure.body);
        self.exit();
    }

    fn visit_arm(&mut self, arm: &'ast Arm) {
        self.enter();
        self.bind(&arm.pat);
        if let Some((_, guard)) = &arm.guard {
            self.visit_expr(guard);
        }
        self.visit_expr(&arm.body);
        self.exit();
    }

    fn visit_expr_for_loop(&mut self, expr: &'ast ExprForLoop) {
        self.visit_expr(&expr.expr);
        self.enter();
        self.bind(&expr.pat);
        self.visit_block(&expr.body);
        self.exit();
    }

    fn visit_expr_if(&mut self, expr: &'ast ExprIf) {
        self.enter();
        self.visit_expr(&expr.cond);
        self.visit_block(&expr.then_branch);
        self.exit();
        if let Some((_, otherwise)) = &expr.else_branch {
            self.visit_expr(otherwise);
        }
    }

    fn visit_expr_while(&mut self, expr: &'ast ExprWhile) {
        self.enter();
        self.visit_expr(&expr.cond);
        self.visit_block(&expr.body);
        self.exit();
    }

    fn visit_expr_let(&mut self, expr: &'ast ExprLet) {
        self.visit_expr(&expr.expr);
        self.bind(&expr.pat);
    }

    fn visit_item(&mut self, _item: &'ast Item) {}

    fn visit_macro(&mut self, mac: &'ast Macro) {
        self.scan_tokens(mac.tokens.clone());
    }
}

/// Identifiers used as inline format arguments: `"{x} and {y:?}"`.
fn inline_format_args(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '{' {
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            continue;
        }
        let mut arg = String::new();
        for c in chars.by_ref() {
            if c == '}' || c == ':' {
                break;
            }
            arg.push(c);
        }
        let arg = arg.trim();
        let is_ident = arg.starts_with(|c: char| c.is_alphabetic() || c == '_')
            && arg.chars().all(|c| c.is_alphanumeric() || c == '_');
        if is_ident {
            names.push(arg.to_string());
        }
    }
    names
}

/// Locate the first `perform!` invocation in `node`, if any.
pub fn find_perform<'ast, N>(node: &'ast N, visit: fn(&mut FindPerform, &'ast N)) -> Option<Span> {
    let mut finder = FindPerform { found: None };
    visit(&mut finder, node);
    finder.found
}

/// Whether a macro invocation is `perform!` (or a path ending in it).
pub fn is_perform(mac: &Macro) -> bool {
    mac.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "perform")
}

/// Visitor behind [`find_perform`].
pub struct FindPerform {
    found: Option<Span>,
}

impl<'ast> Visit<'ast> for FindPerform {
    fn visit_macro(&mut self, mac: &'ast Macro) {
        if self.found.is_none() && is_perform(mac) {
            self.found = mac.path.segments.last().map(|s| s.ident.span());
        }
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        if self.found.is_none() {
            visit::visit_expr(self, expr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use syn::parse_quote;

    fn sorted(set: FxHashSet<String>) -> Vec<String> {
        let mut names: Vec<_> = set.into_iter().collect();
        names.sort();
        names
    }

    #[test]
    fn test_pattern_bindings() {
        let pat: Pat = parse_quote!((mut a, Point { x, y: ref b }, [c, ..], None, d @ Some(_)));
        let names: Vec<_> = pattern_bindings(&pat)
            .into_iter()
            .map(|b| (b.ident.to_string(), b.mutable))
            .collect();
        assert_eq!(
            names,
            vec![
                ("a".into(), true),
                ("x".into(), false),
                ("b".into(), false),
                ("c".into(), false),
                ("d".into(), false),
            ]
        );
    }

    #[test]
    fn test_let_shadows_following_statements() {
        let block: syn::Block = parse_quote!({
            let a = b + 1;
            let b = a;
            b + c
        });
        assert_eq!(sorted(free_in_stmts(&block.stmts)), vec!["b", "c"]);
    }

    #[test]
    fn test_closure_and_arm_scopes() {
        let expr: Expr = parse_quote!({
            let f = |x| x + y;
            match opt {
                Some(v) if v > limit => f(v),
                _ => z,
            }
        });
        assert_eq!(sorted(free_in_expr(&expr)), vec!["limit", "opt", "y", "z"]);
    }

    #[test]
    fn test_if_let_binds_then_branch_only() {
        let expr: Expr = parse_quote!(if let Some(n) = m { n } else { n });
        assert_eq!(sorted(free_in_expr(&expr)), vec!["m", "n"]);
    }

    #[test]
    fn test_for_loop_pattern() {
        let expr: Expr = parse_quote!(for (i, item) in items.iter().enumerate() {
            total += i + item;
        });
        assert_eq!(sorted(free_in_expr(&expr)), vec!["items", "total"]);
    }

    #[test]
    fn test_macro_tokens_and_format_args() {
        let expr: Expr = parse_quote!(format!("{greeting}, {} {{literal}} {n:>4}", who.name));
        assert_eq!(
            sorted(free_in_expr(&expr)),
            vec!["greeting", "n", "who"]
        );
    }

    #[test]
    fn test_method_and_field_names_are_not_reads() {
        let expr: Expr = parse_quote!(a.len() + b.field + Self::X + ::std::f64::consts::PI);
        assert_eq!(sorted(free_in_expr(&expr)), vec!["a", "b"]);
    }

    #[test]
    fn test_nested_items_are_opaque() {
        let block: syn::Block = parse_quote!({
            fn helper() -> u8 { hidden }
            helper()
        });
        assert_eq!(sorted(free_in_stmts(&block.stmts)), vec!["helper"]);
    }

    #[test]
    fn test_find_perform() {
        let expr: Expr = parse_quote!(1 + effex::perform!(Read));
        assert!(find_perform(&expr, Visit::visit_expr).is_some());
        let expr: Expr = parse_quote!(format!("{}", x));
        assert!(find_perform(&expr, Visit::visit_expr).is_none());
    }
}
