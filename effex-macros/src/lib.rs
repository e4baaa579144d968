//! Procedural macros for `effex`.
//!
//! - [`effectful!`](macro@effectful) - the live-capture transform
//! - [`row!`](macro@row) - named effect row constraints
//! - [`Effect`](derive@Effect) - effect payload types
//!
//! Generated code refers to the runtime as `::effex`; use these macros
//! through the re-exports in that crate.

use proc_macro::TokenStream;
use syn::parse::Parser;
use syn::Block;

mod derive;
mod error;
mod liveness;
mod lower;
mod row;

/// Turn a block in direct style into an effect chain.
///
/// Every `perform!(payload)` becomes a boundary: the code after it becomes
/// the continuation, and only the bindings the continuation reads are
/// carried across. Code before the first boundary runs immediately.
///
/// Continuations are plain `fn` pointers, so they cannot capture the
/// enclosing function's locals; rebind what you need at the top of the
/// block (`let limit = limit;`).
#[proc_macro]
pub fn effectful(input: TokenStream) -> TokenStream {
    let stmts = match Block::parse_within.parse(input) {
        Ok(stmts) => stmts,
        Err(err) => return err.to_compile_error().into(),
    };
    match lower::lower_block(&stmts) {
        Ok(lowered) => lowered.tokens.into(),
        Err(err) => err.into_syn().to_compile_error().into(),
    }
}

/// Declare a named row constraint.
///
/// ```text
/// row! { pub Interactive: returns(i32), can(Print, Read), before(Read => Print) }
/// ```
#[proc_macro]
pub fn row(input: TokenStream) -> TokenStream {
    match syn::parse::<row::RowDecl>(input) {
        Ok(decl) => quote::quote!(#decl).into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Implement `Effect` for a payload type.
///
/// `#[effect(output = T)]` sets the result type (default `()`);
/// `#[effect(name = "..")]` overrides the display name.
///
/// The generated `KIND` is identified by `module_path!()` and the type's
/// name, so two same-named effects declared inside different functions of
/// one module share a kind.
#[proc_macro_derive(Effect, attributes(effect))]
pub fn derive_effect(input: TokenStream) -> TokenStream {
    derive::effect(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
