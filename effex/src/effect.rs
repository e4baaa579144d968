//! # Effects and Effect Kinds
//!
//! An effect is an ordinary Rust type (the *payload*) that names a request
//! for an externally handled action, together with the type of value the
//! handler answers with.
//!
//! ```text
//! #[derive(Effect)]
//! #[effect(output = String)]
//! struct Read;            // perform!(Read) evaluates to a String
//! ```
//!
//! Every effect carries a [`Kind`]: a static identity that survives into
//! `const` evaluation, which is what the row checker and printable chain
//! signatures operate on. No kind is ever stored in a value.

use std::fmt;

/// An effect payload type.
///
/// Implemented by hand or with `#[derive(Effect)]`.
pub trait Effect: Sized {
    /// The value a handler resumes the computation with.
    type Output;

    /// Static identity of this effect's type constructor.
    const KIND: Kind;
}

/// Static identity of an effect type constructor.
///
/// Two kinds are the same effect when their fully qualified paths match.
/// Generic effects share one kind across instantiations.
///
/// The path is built from `module_path!()` and the type's name, and
/// `module_path!()` stops at the enclosing module. Same-named effect types
/// declared in different function bodies of one module therefore get the
/// same kind, and the row checker treats them as one effect. Give such
/// types distinct names, or declare them in their own modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kind {
    name: &'static str,
    path: &'static str,
}

impl Kind {
    /// Placeholder used to fill unused slots of fixed-capacity rows.
    pub(crate) const VACANT: Kind = Kind::new("", "");

    /// Create a kind from a short display name and a fully qualified path.
    pub const fn new(name: &'static str, path: &'static str) -> Self {
        Self { name, path }
    }

    /// The short name used in signatures and diagnostics.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The fully qualified path that identifies the effect.
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// `const` equality on the qualified path.
    pub const fn same(&self, other: &Kind) -> bool {
        str_eq(self.path, other.path)
    }

    /// Whether `self` occurs in `kinds`.
    pub const fn is_in(&self, kinds: &[Kind]) -> bool {
        let mut i = 0;
        while i < kinds.len() {
            if self.same(&kinds[i]) {
                return true;
            }
            i += 1;
        }
        false
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Build the [`Kind`] of a locally declared effect type.
///
/// ```
/// let kind = effex::kind!(Beep);
/// assert_eq!(kind.name(), "Beep");
/// ```
#[macro_export]
macro_rules! kind {
    ($ty:ident) => {
        $crate::Kind::new(
            ::core::stringify!($ty),
            ::core::concat!(::core::module_path!(), "::", ::core::stringify!($ty)),
        )
    };
}
