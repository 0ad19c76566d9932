use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Ident};

const CANCELED: &str = "canceled";

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    let flag = match cancel_flag(&input) {
        Ok(flag) => flag,
        Err(err) => return err.to_compile_error(),
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        #[automatically_derived]
        impl #impl_generics ::herald_bus::Event for #name #ty_generics #where_clause {
            #[inline]
            fn is_canceled(&self) -> bool {
                self.#flag
            }

            #[inline]
            fn set_canceled(&mut self, canceled: bool) {
                self.#flag = canceled;
            }
        }
    }
}

fn cancel_flag(input: &DeriveInput) -> syn::Result<&Ident> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(&input.ident, "Event can only be derived for structs"));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Event requires a struct with named fields",
        ));
    };

    let mut marked = Vec::new();
    for field in &fields.named {
        if is_marked(field)? {
            marked.push(field);
        }
    }

    let field = match marked.as_slice() {
        [field] => *field,
        [] => fields
            .named
            .iter()
            .find(|f| f.ident.as_ref().is_some_and(|ident| ident == CANCELED))
            .ok_or_else(|| {
                syn::Error::new_spanned(
                    &input.ident,
                    "Event requires a `canceled: bool` field or a field marked #[event(canceled)]",
                )
            })?,
        [_, second, ..] => {
            return Err(syn::Error::new_spanned(
                second,
                "only one field may be marked #[event(canceled)]",
            ));
        },
    };

    field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "cancel flag must be a named field"))
}

fn is_marked(field: &Field) -> syn::Result<bool> {
    let mut marked = false;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("event")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(CANCELED) {
                marked = true;
                Ok(())
            } else {
                Err(meta.error("unsupported event attribute, expected `canceled`"))
            }
        })?;
    }
    Ok(marked)
}
