//! # Live-Capture Lowering
//!
//! Rewrites the statements of an `effectful!` block into a chain of
//! `Perform` descriptors. Each `perform!` site splits the block:
//!
//! ```text
//! let a = ..; let b = ..;          prefix, runs eagerly
//! let x = perform!(E(a));          boundary
//! use(b, x)                        rest, becomes the continuation
//!
//! => let a = ..; let b = ..;
//!    Perform::new(E(a), (b,), |(b,), x| { Done(use(b, x)) })
//! ```
//!
//! The context record holds exactly the names that are bound earlier in the
//! block *and* read by the rest, in binding order. Names the rest rebinds
//! before reading, or never reads, are not carried.
//!
//! ## Branches
//!
//! An `if` or `match` whose arms perform effects is lowered by pushing the
//! statements that follow it into every arm, then lowering each arm on its
//! own. Arm results are wrapped in `Fork::Left`/`Fork::Right` so that every
//! arm has a distinct chain type. Each arm's boundaries capture only what that
//! arm's own continuation reads.
//!
//! Names an arm binds must not reach the statements pasted after it. When an
//! arm shadows an outer binding that those statements still read, the outer
//! value is moved into a hygienic alias and rebound before them:
//!
//! ```text
//! let a = 1; if c { let a = 5; perform!(E); } a
//!
//! => if c { let (a, outer) = (5, a); perform!(E); let a = outer; a } else { a }
//! ```
//!
//! Patterns of `match` arms and `if let` carry the alias in the scrutinee
//! instead: `match (n, a) { (Some(a), outer) => .., (None, a) => .. }`.
//!
//! ## Rejected Forms
//!
//! - `perform!` nested inside an expression, a loop or a closure
//! - `perform!` in an `if` condition, `match` scrutinee or guard
//! - `return`, `?`, `.await` and loop-escaping `break`/`continue` after the
//!   first boundary, since those would run inside a continuation

use indexmap::IndexMap;
use proc_macro2::{Ident, Span, TokenStream};
use quote::{quote, ToTokens};
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use rustc_hash::FxHashSet;
use syn::{parse_quote, Attribute, BinOp, Expr, ExprIf, ExprMatch, Local, Pat, Stmt};

use crate::error::TransformError;
use crate::liveness::{find_perform, free_in_stmts, is_perform, pattern_bindings, Binding};

/// Output of the transform.
pub struct Lowered {
    /// The rewritten block.
    pub tokens: TokenStream,
    /// One record per boundary, in the order they were lowered.
    pub boundaries: Vec<Boundary>,
}

/// What a single boundary captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub effect: String,
    pub captured: Vec<String>,
}

/// Lower the statements of an `effectful!` block.
pub fn lower_block(stmts: &[Stmt]) -> Result<Lowered, TransformError> {
    let mut lowering = Lowering::default();
    let body = lowering.stmts(Scope::default(), stmts)?;
    Ok(Lowered {
        tokens: quote!({ #body }),
        boundaries: lowering.boundaries,
    })
}

/// Names bound so far, in binding order. Rebinding moves a name to the end.
#[derive(Clone, Default)]
struct Scope {
    names: IndexMap<String, Binding>,
}

impl Scope {
    fn bind(&mut self, pat: &Pat) {
        for binding in pattern_bindings(pat) {
            self.insert(binding);
        }
    }

    fn insert(&mut self, binding: Binding) {
        let name = binding.ident.to_string();
        self.names.shift_remove(&name);
        self.names.insert(name, binding);
    }

    /// Bindings introduced by an `if` condition (`if let`, let chains).
    fn bind_condition(&mut self, cond: &Expr) {
        match cond {
            Expr::Let(guard) => self.bind(&guard.pat),
            Expr::Binary(bin) if matches!(bin.op, BinOp::And(_)) => {
                self.bind_condition(&bin.left);
                self.bind_condition(&bin.right);
            }
            Expr::Paren(inner) => self.bind_condition(&inner.expr),
            _ => {}
        }
    }
}

enum Site<'a> {
    Plain,
    Tail(TokenStream),
    Perform {
        payload: Expr,
        pat: Option<&'a Pat>,
        tail: bool,
    },
    Branch {
        branch: Branch<'a>,
        bind: Bind<'a>,
    },
}

enum Branch<'a> {
    If(&'a ExprIf),
    Match(&'a ExprMatch),
}

/// Where a branch's value goes.
#[derive(Clone, Copy)]
enum Bind<'a> {
    Discard,
    Let(&'a Pat),
    Value,
}

#[derive(Default)]
struct Lowering {
    boundaries: Vec<Boundary>,
    aliases: usize,
}

impl Lowering {
    fn stmts(&mut self, mut scope: Scope, stmts: &[Stmt]) -> Result<TokenStream, TransformError> {
        let mut prefix = TokenStream::new();
        for (index, stmt) in stmts.iter().enumerate() {
            let rest = &stmts[index + 1..];
            match classify(stmt, rest.is_empty())? {
                Site::Plain => {
                    stmt.to_tokens(&mut prefix);
                    if let Stmt::Local(local) = stmt {
                        scope.bind(&local.pat);
                    }
                }
                Site::Tail(value) => return Ok(quote!(#prefix ::effex::Done(#value))),
                Site::Perform { payload, pat, tail } => {
                    let chain = self.boundary(&scope, payload, pat, tail, rest)?;
                    return Ok(quote!(#prefix #chain));
                }
                Site::Branch { branch, bind } => {
                    let chain = match branch {
                        Branch::If(node) => self.lower_if(&scope, node, bind, rest)?,
                        Branch::Match(node) => self.lower_match(&scope, node, bind, rest)?,
                    };
                    return Ok(quote!(#prefix #chain));
                }
            }
        }
        Ok(quote!(#prefix ::effex::Done(())))
    }

    fn boundary(
        &mut self,
        scope: &Scope,
        payload: Expr,
        pat: Option<&Pat>,
        tail: bool,
        rest: &[Stmt],
    ) -> Result<TokenStream, TransformError> {
        check_escapes(rest)?;

        let bound = pat.map(pattern_bindings).unwrap_or_default();
        let live = if tail { Default::default() } else { free_in_stmts(rest) };
        let captured: Vec<&Binding> = scope
            .names
            .iter()
            .filter(|(name, _)| live.contains(*name))
            .filter(|(name, _)| !bound.iter().any(|b| b.ident == name.as_str()))
            .map(|(_, binding)| binding)
            .collect();

        self.boundaries.push(Boundary {
            effect: payload.to_token_stream().to_string(),
            captured: captured.iter().map(|b| b.ident.to_string()).collect(),
        });

        let values = captured.iter().map(|b| &b.ident);
        let params = captured.iter().map(|b| binding_pattern(b));
        let lint = captured
            .iter()
            .any(|b| b.mutable)
            .then(|| quote!(#[allow(unused_mut)]));

        let (result, body) = if tail {
            let value = Ident::new("__effex_value", Span::mixed_site());
            (quote!(#value), quote!(::effex::Done(#value)))
        } else {
            let mut inner = Scope::default();
            for binding in &captured {
                inner.insert((*binding).clone());
            }
            let result = match pat {
                Some(pat) => {
                    inner.bind(pat);
                    pat.to_token_stream()
                }
                None => quote!(_),
            };
            (result, self.stmts(inner, rest)?)
        };

        Ok(quote! {
            ::effex::Perform::new(
                #payload,
                (#(#values,)*),
                |#lint (#(#params,)*), #result| { #body },
            )
        })
    }

    fn lower_if(
        &mut self,
        scope: &Scope,
        node: &ExprIf,
        bind: Bind<'_>,
        rest: &[Stmt],
    ) -> Result<TokenStream, TransformError> {
        if let Some(span) = find_perform(&*node.cond, Visit::visit_expr) {
            return Err(TransformError::InCondition { span });
        }

        let live = live_after(bind, rest);
        let else_body = match &node.else_branch {
            Some((_, otherwise)) => arm_body(otherwise),
            None => Vec::new(),
        };

        if let Expr::Let(guard) = &*node.cond {
            if shadows(scope, &pattern_bindings(&guard.pat), &live) {
                let arms = vec![
                    ArmSource {
                        attrs: &[],
                        pat: (*guard.pat).clone(),
                        guard: None,
                        body: node.then_branch.stmts.clone(),
                    },
                    ArmSource {
                        attrs: &[],
                        pat: parse_quote!(_),
                        guard: None,
                        body: else_body,
                    },
                ];
                return self.lower_arms(scope, &guard.expr, arms, bind, rest, &live);
            }
        }

        let mut then_scope = scope.clone();
        then_scope.bind_condition(&node.cond);
        let then_body = node.then_branch.stmts.clone();
        let then_stmts = self.arm_stmts(scope, then_body, Vec::new(), bind, rest, &live);
        let else_stmts = self.arm_stmts(scope, else_body, Vec::new(), bind, rest, &live);

        let left = self.stmts(then_scope, &then_stmts)?;
        let right = self.stmts(scope.clone(), &else_stmts)?;
        let cond = &node.cond;
        Ok(quote! {
            if #cond {
                ::effex::Fork::Left({ #left })
            } else {
                ::effex::Fork::Right({ #right })
            }
        })
    }

    fn lower_match(
        &mut self,
        scope: &Scope,
        node: &ExprMatch,
        bind: Bind<'_>,
        rest: &[Stmt],
    ) -> Result<TokenStream, TransformError> {
        if let Some(span) = find_perform(&*node.expr, Visit::visit_expr) {
            return Err(TransformError::InCondition { span });
        }
        for arm in &node.arms {
            if let Some((_, guard)) = &arm.guard {
                if let Some(span) = find_perform(&**guard, Visit::visit_expr) {
                    return Err(TransformError::InCondition { span });
                }
            }
        }
        if node.arms.is_empty() {
            return Err(TransformError::EmptyMatch {
                span: node.match_token.span(),
            });
        }

        let arms = node
            .arms
            .iter()
            .map(|arm| ArmSource {
                attrs: &arm.attrs,
                pat: arm.pat.clone(),
                guard: arm
                    .guard
                    .as_ref()
                    .map(|(if_token, guard)| quote!(#if_token #guard)),
                body: arm_body(&arm.body),
            })
            .collect();
        let live = live_after(bind, rest);
        self.lower_arms(scope, &node.expr, arms, bind, rest, &live)
    }

    /// Lower a `match`. Outer bindings that some arm pattern shadows while
    /// the rest still reads them travel in the scrutinee: arms that shadow
    /// them bind an alias, the others rebind the original name.
    fn lower_arms(
        &mut self,
        scope: &Scope,
        scrutinee: &Expr,
        arms: Vec<ArmSource<'_>>,
        bind: Bind<'_>,
        rest: &[Stmt],
        live: &FxHashSet<String>,
    ) -> Result<TokenStream, TransformError> {
        let bound: Vec<Binding> = arms.iter().flat_map(|arm| pattern_bindings(&arm.pat)).collect();
        let carried = self.carry(scope, &bound, live);
        let scrutinee = if carried.is_empty() {
            quote!(#scrutinee)
        } else {
            let outer = carried.iter().map(|(binding, _)| &binding.ident);
            quote!((#scrutinee, #(#outer,)*))
        };

        // arm i of n lowers to Right^i(Left(..)), the last one to Right^(n-1)(..)
        let count = arms.len();
        let mut lowered_arms = Vec::with_capacity(count);
        for (index, arm) in arms.into_iter().enumerate() {
            let names = pattern_bindings(&arm.pat);
            let mut arm_scope = scope.clone();
            arm_scope.bind(&arm.pat);

            let mut saved = Vec::new();
            let mut slots = Vec::with_capacity(carried.len());
            for (binding, alias) in &carried {
                if names.iter().any(|b| b.ident == binding.ident.to_string()) {
                    arm_scope.insert(Binding {
                        ident: alias.clone(),
                        mutable: false,
                    });
                    saved.push((binding.clone(), alias.clone()));
                    slots.push(quote!(#alias));
                } else {
                    arm_scope.insert(binding.clone());
                    slots.push(binding_pattern(binding));
                }
            }

            let stmts = self.arm_stmts(scope, arm.body, saved, bind, rest, live);
            let mut lowered = self.stmts(arm_scope, &stmts)?;
            if index + 1 < count {
                lowered = quote!(::effex::Fork::Left({ #lowered }));
            }
            for _ in 0..index {
                lowered = quote!(::effex::Fork::Right({ #lowered }));
            }

            let pat = &arm.pat;
            let pat = if carried.is_empty() {
                quote!(#pat)
            } else {
                let pat = without_leading_vert(pat);
                quote!((#pat, #(#slots,)*))
            };
            let lint = carried
                .iter()
                .any(|(binding, _)| binding.mutable)
                .then(|| quote!(#[allow(unused_mut)]));
            let attrs = arm.attrs;
            let guard = arm.guard;
            lowered_arms.push(quote!(#(#attrs)* #lint #pat #guard => { #lowered }));
        }

        Ok(quote! {
            match #scrutinee {
                #(#lowered_arms,)*
            }
        })
    }

    /// An arm body followed by everything after the branch, with the arm's
    /// value routed according to `bind`.
    ///
    /// A top-level `let` in the arm that shadows an outer binding the rest
    /// still reads moves that binding into an alias once its initializer has
    /// run. Every alias in `saved` is rebound under its original name before
    /// the rest.
    fn arm_stmts(
        &mut self,
        scope: &Scope,
        body: Vec<Stmt>,
        mut saved: Vec<(Binding, Ident)>,
        bind: Bind<'_>,
        rest: &[Stmt],
        live: &FxHashSet<String>,
    ) -> Vec<Stmt> {
        let mut stmts = Vec::with_capacity(body.len() + saved.len() + rest.len() + 1);
        for stmt in body {
            let local = match stmt {
                Stmt::Local(local) => local,
                other => {
                    stmts.push(other);
                    continue;
                }
            };
            let fresh: Vec<Binding> = pattern_bindings(&local.pat)
                .into_iter()
                .filter(|b| !saved.iter().any(|(outer, _)| outer.ident == b.ident.to_string()))
                .collect();
            let carried = self.carry(scope, &fresh, live);
            if carried.is_empty() {
                stmts.push(Stmt::Local(local));
            } else {
                stmts.extend(shield_local(local, &carried));
                saved.extend(carried);
            }
        }

        let value = match stmts.last() {
            Some(Stmt::Expr(_, None)) => match stmts.pop() {
                Some(Stmt::Expr(expr, None)) => Some(expr),
                _ => None,
            },
            _ => None,
        };
        let restores = saved.iter().map(|(binding, alias)| restore(binding, alias));

        if saved.is_empty() {
            match bind {
                Bind::Discard => {
                    stmts.extend(value.map(|expr| Stmt::Expr(expr, Some(Default::default()))))
                }
                Bind::Let(pat) => {
                    let value = value.unwrap_or_else(|| parse_quote!(()));
                    stmts.push(parse_quote!(let #pat = #value;));
                }
                Bind::Value => stmts.extend(value.map(|expr| Stmt::Expr(expr, None))),
            }
        } else if let Bind::Discard = bind {
            stmts.extend(value.map(|expr| Stmt::Expr(expr, Some(Default::default()))));
            stmts.extend(restores);
        } else {
            // the arm value may read arm locals, so it is taken before restoring
            let held = Ident::new("__effex_arm_value", Span::mixed_site());
            let value = value.unwrap_or_else(|| parse_quote!(()));
            stmts.push(parse_quote!(let #held = #value;));
            stmts.extend(restores);
            match bind {
                Bind::Let(pat) => stmts.push(parse_quote!(let #pat = #held;)),
                _ => stmts.push(Stmt::Expr(parse_quote!(#held), None)),
            }
        }
        stmts.extend_from_slice(rest);
        stmts
    }

    /// Outer bindings in `scope` that `bound` shadows while `live` still reads
    /// them, each paired with a fresh alias.
    fn carry(
        &mut self,
        scope: &Scope,
        bound: &[Binding],
        live: &FxHashSet<String>,
    ) -> Vec<(Binding, Ident)> {
        let outer: Vec<Binding> = scope
            .names
            .iter()
            .filter(|(name, _)| live.contains(*name))
            .filter(|(name, _)| bound.iter().any(|b| b.ident == name.as_str()))
            .map(|(_, binding)| binding.clone())
            .collect();
        outer
            .into_iter()
            .map(|binding| {
                let alias = self.alias(&binding.ident);
                (binding, alias)
            })
            .collect()
    }

    fn alias(&mut self, ident: &Ident) -> Ident {
        let name = ident.to_string();
        let alias = format!(
            "__effex_outer{}_{}",
            self.aliases,
            name.trim_start_matches("r#")
        );
        self.aliases += 1;
        Ident::new(&alias, Span::mixed_site())
    }
}

/// One arm of a branch before lowering.
struct ArmSource<'a> {
    attrs: &'a [Attribute],
    pat: Pat,
    guard: Option<TokenStream>,
    body: Vec<Stmt>,
}

/// Names the statements after a branch read, with the branch's own result
/// binding already in place.
fn live_after(bind: Bind<'_>, rest: &[Stmt]) -> FxHashSet<String> {
    match bind {
        Bind::Let(pat) => {
            let mut stmts: Vec<Stmt> = vec![parse_quote!(let #pat = ();)];
            stmts.extend_from_slice(rest);
            free_in_stmts(&stmts)
        }
        Bind::Discard | Bind::Value => free_in_stmts(rest),
    }
}

fn shadows(scope: &Scope, bound: &[Binding], live: &FxHashSet<String>) -> bool {
    bound.iter().any(|b| {
        let name = b.ident.to_string();
        live.contains(&name) && scope.names.contains_key(&name)
    })
}

/// Rewrite a shadowing `let` so that the carried outer bindings are moved
/// into their aliases right after the initializer is evaluated:
/// `let a = f(a);` becomes `let (a, alias) = (f(a), a);`.
fn shield_local(local: Local, carried: &[(Binding, Ident)]) -> Vec<Stmt> {
    let outer: Vec<&Ident> = carried.iter().map(|(binding, _)| &binding.ident).collect();
    let aliases: Vec<&Ident> = carried.iter().map(|(_, alias)| alias).collect();
    let Local { attrs, pat, init, .. } = local;

    let Some(init) = init else {
        return vec![
            parse_quote!(let (#(#aliases,)*) = (#(#outer,)*);),
            parse_quote!(#(#attrs)* let #pat;),
        ];
    };

    if init.diverge.is_none() {
        if let Expr::Macro(node) = &*init.expr {
            if is_perform(&node.mac) {
                if let Ok(payload) = node.mac.parse_body::<Expr>() {
                    let held = Ident::new("__effex_payload", Span::mixed_site());
                    let path = &node.mac.path;
                    return vec![
                        parse_quote!(let (#held, #(#aliases,)*) = (#payload, #(#outer,)*);),
                        parse_quote!(#(#attrs)* let #pat = #path!(#held);),
                    ];
                }
            }
        }
        if as_branch(&init.expr).is_some() {
            let expr = &init.expr;
            return vec![
                parse_quote!(let (#(#aliases,)*) = (#(#outer,)*);),
                parse_quote!(#(#attrs)* let #pat = #expr;),
            ];
        }
    }

    let (pat, ty) = match pat {
        Pat::Type(typed) => (*typed.pat, Some(typed.ty)),
        pat => (pat, None),
    };
    let pat = without_leading_vert(&pat);
    let ty = ty.map(|ty| {
        let holes = aliases.iter().map(|_| quote!(_));
        quote!(: (#ty, #(#holes,)*))
    });
    let expr = &init.expr;
    let diverge = init
        .diverge
        .map(|(else_token, diverge)| quote!(#else_token #diverge));
    vec![parse_quote!(#(#attrs)* let (#pat, #(#aliases,)*) #ty = (#expr, #(#outer,)*) #diverge;)]
}

fn restore(binding: &Binding, alias: &Ident) -> Stmt {
    let pattern = binding_pattern(binding);
    let lint = binding.mutable.then(|| quote!(#[allow(unused_mut)]));
    parse_quote!(#lint let #pattern = #alias;)
}

fn binding_pattern(binding: &Binding) -> TokenStream {
    let ident = &binding.ident;
    if binding.mutable {
        quote!(mut #ident)
    } else {
        quote!(#ident)
    }
}

fn without_leading_vert(pat: &Pat) -> Pat {
    match pat {
        Pat::Or(or) if or.leading_vert.is_some() => {
            let mut or = or.clone();
            or.leading_vert = None;
            Pat::Or(or)
        }
        other => other.clone(),
    }
}

fn classify(stmt: &Stmt, last: bool) -> Result<Site<'_>, TransformError> {
    match stmt {
        Stmt::Local(local) => {
            let Some(init) = &local.init else {
                return Ok(Site::Plain);
            };
            if let Some((_, diverge)) = &init.diverge {
                reject_nested(&init.expr)?;
                reject_nested(diverge)?;
                return Ok(Site::Plain);
            }
            if let Some(payload) = perform_payload(&init.expr)? {
                return Ok(Site::Perform {
                    payload,
                    pat: Some(&local.pat),
                    tail: false,
                });
            }
            if let Some(branch) = as_branch(&init.expr) {
                return Ok(Site::Branch {
                    branch,
                    bind: Bind::Let(&local.pat),
                });
            }
            reject_nested(&init.expr)?;
            Ok(Site::Plain)
        }
        Stmt::Expr(expr, semi) => {
            let tail = last && semi.is_none();
            if let Some(payload) = perform_payload(expr)? {
                return Ok(Site::Perform {
                    payload,
                    pat: None,
                    tail,
                });
            }
            if let Some(branch) = as_branch(expr) {
                let bind = if tail { Bind::Value } else { Bind::Discard };
                return Ok(Site::Branch { branch, bind });
            }
            reject_nested(expr)?;
            Ok(if tail {
                Site::Tail(expr.to_token_stream())
            } else {
                Site::Plain
            })
        }
        Stmt::Macro(node) if is_perform(&node.mac) => Ok(Site::Perform {
            payload: node.mac.parse_body()?,
            pat: None,
            tail: last && node.semi_token.is_none(),
        }),
        Stmt::Macro(node) if last && node.semi_token.is_none() => {
            Ok(Site::Tail(node.mac.to_token_stream()))
        }
        Stmt::Macro(_) | Stmt::Item(_) => Ok(Site::Plain),
    }
}

fn perform_payload(expr: &Expr) -> Result<Option<Expr>, TransformError> {
    match expr {
        Expr::Macro(node) if is_perform(&node.mac) => Ok(Some(node.mac.parse_body()?)),
        _ => Ok(None),
    }
}

fn as_branch(expr: &Expr) -> Option<Branch<'_>> {
    let performs = || find_perform(expr, Visit::visit_expr).is_some();
    match expr {
        Expr::If(node) if performs() => Some(Branch::If(node)),
        Expr::Match(node) if performs() => Some(Branch::Match(node)),
        _ => None,
    }
}

fn reject_nested(expr: &Expr) -> Result<(), TransformError> {
    match find_perform(expr, Visit::visit_expr) {
        Some(span) => Err(TransformError::Misplaced { span }),
        None => Ok(()),
    }
}

/// The statements of an arm or `else` body.
fn arm_body(body: &Expr) -> Vec<Stmt> {
    match body {
        Expr::Block(block) if block.label.is_none() && block.attrs.is_empty() => {
            block.block.stmts.clone()
        }
        other => vec![Stmt::Expr(other.clone(), None)],
    }
}

fn check_escapes(rest: &[Stmt]) -> Result<(), TransformError> {
    let mut escapes = Escapes::default();
    for stmt in rest {
        escapes.visit_stmt(stmt);
    }
    match escapes.found {
        Some((what, span)) => Err(TransformError::Escape { what, span }),
        None => Ok(()),
    }
}

/// Finds control flow that would have to leave a continuation closure.
#[derive(Default)]
struct Escapes {
    loops: usize,
    found: Option<(&'static str, Span)>,
}

impl Escapes {
    fn note(&mut self, what: &'static str, span: Span) {
        self.found.get_or_insert((what, span));
    }

    fn in_loop(&mut self, walk: impl FnOnce(&mut Self)) {
        self.loops += 1;
        walk(self);
        self.loops -= 1;
    }
}

impl<'ast> Visit<'ast> for Escapes {
    fn visit_expr_return(&mut self, node: &'ast syn::ExprReturn) {
        self.note("return", node.return_token.span());
    }

    fn visit_expr_try(&mut self, node: &'ast syn::ExprTry) {
        self.note("?", node.question_token.span());
        visit::visit_expr_try(self, node);
    }

    fn visit_expr_await(&mut self, node: &'ast syn::ExprAwait) {
        self.note(".await", node.await_token.span());
    }

    fn visit_expr_break(&mut self, node: &'ast syn::ExprBreak) {
        if self.loops == 0 {
            self.note("break", node.break_token.span());
        }
        visit::visit_expr_break(self, node);
    }

    fn visit_expr_continue(&mut self, node: &'ast syn::ExprContinue) {
        if self.loops == 0 {
            self.note("continue", node.continue_token.span());
        }
    }

    fn visit_expr_loop(&mut self, node: &'ast syn::ExprLoop) {
        self.in_loop(|this| visit::visit_expr_loop(this, node));
    }

    fn visit_expr_while(&mut self, node: &'ast syn::ExprWhile) {
        self.in_loop(|this| visit::visit_expr_while(this, node));
    }

    fn visit_expr_for_loop(&mut self, node: &'ast syn::ExprForLoop) {
        self.in_loop(|this| visit::visit_expr_for_loop(this, node));
    }

    fn visit_expr_block(&mut self, node: &'ast syn::ExprBlock) {
        if node.label.is_some() {
            self.in_loop(|this| visit::visit_expr_block(this, node));
        } else {
            visit::visit_expr_block(self, node);
        }
    }

    fn visit_expr_closure(&mut self, _node: &'ast syn::ExprClosure) {}

    fn visit_expr_async(&mut self, _node: &'ast syn::ExprAsync) {}

    fn visit_item(&mut self, _node: &'ast syn::Item) {}
}
