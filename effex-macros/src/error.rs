//! Errors raised by the live-capture transform.
//!
//! Every error carries the span it is reported at and turns into a
//! `compile_error!` through [`TransformError::into_syn`].

use proc_macro2::Span;
use thiserror::Error;

/// A statically rejected `effectful!` block.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(
        "`perform!` must be a statement, a `let` initializer, the block's tail, \
         or inside the branches of an `if` or `match`"
    )]
    Misplaced { span: Span },

    #[error("`perform!` cannot appear in an `if` condition, `match` scrutinee or arm guard")]
    InCondition { span: Span },

    #[error(
        "`{what}` cannot cross an effect boundary: code after `perform!` runs \
         inside a continuation"
    )]
    Escape { what: &'static str, span: Span },

    #[error("a `match` that performs effects needs at least one arm")]
    EmptyMatch { span: Span },

    #[error(transparent)]
    Syntax(#[from] syn::Error),
}

impl TransformError {
    /// Where the error is reported.
    pub fn span(&self) -> Span {
        match self {
            TransformError::Misplaced { span }
            | TransformError::InCondition { span }
            | TransformError::Escape { span, .. }
            | TransformError::EmptyMatch { span } => *span,
            TransformError::Syntax(err) => err.span(),
        }
    }

    /// Convert into a spanned `syn::Error`.
    pub fn into_syn(self) -> syn::Error {
        match self {
            TransformError::Syntax(err) => err,
            other => syn::Error::new(other.span(), other.to_string()),
        }
    }
}
