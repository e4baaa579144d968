//! `row!`: named effect row constraints.
//!
//! ```text
//! row! {
//!     /// Console programs that never print before reading.
//!     pub Interactive: returns(i32), can(Print, Read), before(Read => Print)
//! }
//! ```
//!
//! Each option may appear once. `sequence_can`, `sequence_cannot` and
//! `max_context_size` are accepted as long forms of `before`,
//! `never_before` and `max_context`.

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parenthesized, Attribute, Expr, Ident, Token, Type, Visibility};

/// A parsed `row!` invocation.
pub struct RowDecl {
    attrs: Vec<Attribute>,
    vis: Visibility,
    name: Ident,
    returns: Option<Type>,
    can: Option<Vec<Type>>,
    cannot: Vec<Type>,
    before: Vec<(Type, Type)>,
    never_before: Vec<(Type, Type)>,
    max_context: Option<Expr>,
}

struct Pair(Type, Type);

impl Parse for Pair {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let first = input.parse()?;
        input.parse::<Token![=>]>()?;
        let then = input.parse()?;
        Ok(Pair(first, then))
    }
}

fn types(content: ParseStream<'_>) -> syn::Result<Vec<Type>> {
    Ok(Punctuated::<Type, Token![,]>::parse_terminated(content)?
        .into_iter()
        .collect())
}

fn pairs(content: ParseStream<'_>) -> syn::Result<Vec<(Type, Type)>> {
    Ok(Punctuated::<Pair, Token![,]>::parse_terminated(content)?
        .into_iter()
        .map(|Pair(first, then)| (first, then))
        .collect())
}

impl Parse for RowDecl {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis = input.parse()?;
        let name = input.parse()?;
        input.parse::<Token![:]>()?;

        let mut decl = RowDecl {
            attrs,
            vis,
            name,
            returns: None,
            can: None,
            cannot: Vec::new(),
            before: Vec::new(),
            never_before: Vec::new(),
            max_context: None,
        };
        let mut seen: Vec<String> = Vec::new();

        while !input.is_empty() {
            let option: Ident = input.parse()?;
            let content;
            parenthesized!(content in input);

            let key = match option.to_string().as_str() {
                "sequence_can" => "before".to_string(),
                "sequence_cannot" => "never_before".to_string(),
                "max_context_size" => "max_context".to_string(),
                other => other.to_string(),
            };
            if seen.contains(&key) {
                return Err(syn::Error::new(option.span(), format!("duplicate row option `{key}`")));
            }

            match key.as_str() {
                "returns" => decl.returns = Some(content.parse()?),
                "can" => decl.can = Some(types(&content)?),
                "cannot" => decl.cannot = types(&content)?,
                "before" => decl.before = pairs(&content)?,
                "never_before" => decl.never_before = pairs(&content)?,
                "max_context" => decl.max_context = Some(content.parse()?),
                _ => {
                    return Err(syn::Error::new(
                        option.span(),
                        "unknown row option; expected one of `returns`, `can`, `cannot`, \
                         `before`, `never_before`, `max_context`",
                    ))
                }
            }
            seen.push(key);

            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }

        Ok(decl)
    }
}

fn kind_of(ty: &Type) -> TokenStream {
    quote!(<#ty as ::effex::Effect>::KIND)
}

fn pair_of((first, then): &(Type, Type)) -> TokenStream {
    let (first, then) = (kind_of(first), kind_of(then));
    quote!((#first, #then))
}

impl ToTokens for RowDecl {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let RowDecl {
            attrs,
            vis,
            name,
            ..
        } = self;

        let returns = match &self.returns {
            Some(ty) => quote!(::effex::Returns<#ty>),
            None => quote!(::effex::AnyOutput),
        };
        let (can_items, can) = match &self.can {
            Some(kinds) => {
                let kinds = kinds.iter().map(kind_of);
                (
                    quote!(const CAN: &[::effex::Kind] = &[#(#kinds),*];),
                    quote!(::core::option::Option::Some(CAN)),
                )
            }
            None => (TokenStream::new(), quote!(::core::option::Option::None)),
        };
        let cannot = self.cannot.iter().map(kind_of);
        let before = self.before.iter().map(pair_of);
        let never_before = self.never_before.iter().map(pair_of);
        let max_context = match &self.max_context {
            Some(bytes) => quote!(::core::option::Option::Some(#bytes)),
            None => quote!(::core::option::Option::None),
        };

        tokens.extend(quote! {
            #(#attrs)*
            #[derive(Debug, Clone, Copy)]
            #vis struct #name;

            impl ::effex::RowSpec for #name {
                type Returns = #returns;

                const SPEC: ::effex::Constraint = {
                    #can_items
                    const CANNOT: &[::effex::Kind] = &[#(#cannot),*];
                    const BEFORE: &[(::effex::Kind, ::effex::Kind)] = &[#(#before),*];
                    const NEVER_BEFORE: &[(::effex::Kind, ::effex::Kind)] = &[#(#never_before),*];
                    ::effex::Constraint {
                        can: #can,
                        cannot: CANNOT,
                        before: BEFORE,
                        never_before: NEVER_BEFORE,
                        max_context: #max_context,
                    }
                };
            }
        });
    }
}
