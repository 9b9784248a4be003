//! Procedural macros for use in wmdecor.

use proc_macro2::{TokenStream, Span};

use syn::{parse_macro_input, DeriveInput, Data, Fields, Field, FieldsNamed, Meta};
use quote::quote;

/// Derives the `ConfigSection` trait.
///
/// Every field tagged with `#[key]` is exposed under its own name,
/// both through `get_key` and in the list returned by `keys`, in
/// declaration order.
///
/// ## Example
///
/// ```ignore
/// #[derive(ConfigSection)]
/// pub struct SomeSection {
///     #[key] // gets exposed as a key on the section.
///     border_size: BorderSize,
///     #[key]
///     close_on_double_click: bool,
///
///     scale: i32 // fields with no attribute tags do not get exposed.
/// }
/// ```
#[proc_macro_derive(ConfigSection, attributes(key))]
pub fn configsection_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_configsection(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_configsection(input: DeriveInput) -> syn::Result<TokenStream> {
    let Data::Struct(datastruct) = input.data else {
        return Err(syn::Error::new(
            Span::call_site(), "ConfigSection can only be derived on structs"))
    };

    let Fields::Named(fields) = datastruct.fields else {
        return Err(syn::Error::new(
            Span::call_site(), "ConfigSection cannot be derived on structs with unnamed fields"))
    };

    let keyed = keyed_fields(&fields);

    let arms = keyed.iter().map(|(ident, name)| quote! { #name => Some(&self.#ident), });
    let names = keyed.iter().map(|(_, name)| quote! { #name });

    let name = input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let tokens = quote! {
        impl #impl_generics ConfigSection for #name #ty_generics #where_clause {
            fn get_key(&self, name: &str) -> Option<&dyn std::any::Any> {
                match name {
                    #(#arms)*
                    _ => None
                }
            }

            fn keys(&self) -> &'static [&'static str] {
                &[#(#names),*]
            }
        }
    };

    Ok(tokens)
}

/// Collects the identifiers and key names of every `#[key]` field.
fn keyed_fields(fields: &FieldsNamed) -> Vec<(syn::Ident, String)> {
    fields.named
        .iter()
        .filter(|field| field_has_helper(field, "key"))
        .filter_map(|field| field.ident.clone())
        .map(|ident| {
            let name = ident.to_string();
            (ident, name)
        })
        .collect()
}

/// Looks for `#[key]` on a given Field.
fn field_has_helper(field: &Field, helper: &str) -> bool {
    field.attrs.iter().any(|attr| match &attr.meta {
        Meta::Path(p) => p.is_ident(helper),
        _ => false,
    })
}
