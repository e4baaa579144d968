//! `#[derive(Effect)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse2, parse_quote, DeriveInput, LitStr, Type};

/// Expand `#[derive(Effect)]` with its `#[effect(..)]` options:
///
/// - `output = Type` - the result type a rule resumes with (default `()`)
/// - `name = "Name"` - the display name used in signatures and logs
pub fn effect(input: TokenStream) -> syn::Result<TokenStream> {
    let input = parse2::<DeriveInput>(input)?;

    let mut output: Option<Type> = None;
    let mut name: Option<LitStr> = None;
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("effect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("output") {
                output = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported effect option; expected `output` or `name`"))
            }
        })?;
    }

    let ident = &input.ident;
    let output = output.unwrap_or_else(|| parse_quote!(()));
    let display = name.map_or_else(|| ident.to_string(), |lit| lit.value());
    let type_name = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::effex::Effect for #ident #ty_generics #where_clause {
            type Output = #output;

            const KIND: ::effex::Kind = ::effex::Kind::new(
                #display,
                ::core::concat!(::core::module_path!(), "::", #type_name),
            );
        }
    })
}
