//! ReloadProxy derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, GenericArgument, PathArguments, Type};

use crate::parse::{parse_reload_proxy, ProxyFieldArgs, ReloadProxyArgs};

/// Extract `T` from `TargetCell<T>`
fn target_cell_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "TargetCell" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// Generate the ReloadProxy implementation
pub fn derive_reload_proxy(input: DeriveInput) -> TokenStream {
    match parse_reload_proxy(&input) {
        Ok(args) => generate_impl(args),
        Err(e) => e.write_errors(),
    }
}

fn generate_impl(args: ReloadProxyArgs) -> TokenStream {
    let struct_name = &args.ident;
    let (impl_generics, ty_generics, where_clause) = args.generics.split_for_impl();

    let fields = match &args.data {
        darling::ast::Data::Struct(fields) => &fields.fields,
        _ => {
            return syn::Error::new_spanned(
                &args.ident,
                "ReloadProxy can only be derived for structs",
            )
            .to_compile_error()
        }
    };

    let targets: Vec<&ProxyFieldArgs> = fields.iter().filter(|f| f.target).collect();
    let target = match targets.as_slice() {
        [target] => *target,
        [] => {
            return syn::Error::new_spanned(
                &args.ident,
                "ReloadProxy needs one field marked #[proxy(target)]",
            )
            .to_compile_error()
        }
        [_, extra, ..] => {
            return syn::Error::new_spanned(
                &extra.ty,
                "only one field may be marked #[proxy(target)]",
            )
            .to_compile_error()
        }
    };

    let Some(interface) = target_cell_inner(&target.ty) else {
        return syn::Error::new_spanned(&target.ty, "#[proxy(target)] field must be a TargetCell<T>")
            .to_compile_error();
    };
    let target_ident = &target.ident;

    let other_inits = fields
        .iter()
        .filter(|f| !f.target)
        .filter_map(|f| f.ident.as_ref())
        .map(|ident| quote! { #ident: ::std::default::Default::default() });

    quote! {
        impl #impl_generics ::hermes_core::sdk::ReloadProxy<#interface>
            for #struct_name #ty_generics #where_clause
        {
            fn reload_target(&self) -> ::std::option::Option<::std::sync::Arc<#interface>> {
                self.#target_ident.get()
            }

            fn set_reload_target(&self, target: ::std::sync::Arc<#interface>) {
                self.#target_ident.set(target);
            }
        }

        impl #impl_generics ::std::convert::From<::std::sync::Arc<#interface>>
            for #struct_name #ty_generics #where_clause
        {
            fn from(target: ::std::sync::Arc<#interface>) -> Self {
                Self {
                    #target_ident: ::hermes_core::sdk::TargetCell::new(target),
                    #(#other_inits),*
                }
            }
        }

        impl #impl_generics #struct_name #ty_generics #where_clause {
            /// Proxy class descriptor built around existing backing objects
            pub fn proxy_class() -> ::hermes_core::engine::ProxyClass<#interface> {
                ::hermes_core::engine::ProxyClass::wrapping::<Self>()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_target_cell_inner() {
        let ty: Type = parse_quote!(::hermes_core::TargetCell<dyn CounterService>);
        let expected: Type = parse_quote!(dyn CounterService);
        assert_eq!(target_cell_inner(&ty), Some(&expected));

        let ty: Type = parse_quote!(Option<u32>);
        assert!(target_cell_inner(&ty).is_none());
    }
}
