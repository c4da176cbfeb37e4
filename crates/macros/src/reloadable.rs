//! Reloadable derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{parse_reloadable, ReloadFieldArgs, ReloadableArgs};

/// Generate the Reloadable implementation
pub fn derive_reloadable(input: DeriveInput) -> TokenStream {
    match parse_reloadable(&input) {
        Ok(args) => generate_impl(args),
        Err(e) => e.write_errors(),
    }
}

fn generate_impl(args: ReloadableArgs) -> TokenStream {
    let struct_name = &args.ident;
    let type_name = args.state_type_name();
    let (impl_generics, ty_generics, where_clause) = args.generics.split_for_impl();

    let fields = match &args.data {
        darling::ast::Data::Struct(fields) => &fields.fields,
        _ => {
            return syn::Error::new_spanned(
                &args.ident,
                "Reloadable can only be derived for structs",
            )
            .to_compile_error()
        }
    };

    let state_fields: Vec<&ReloadFieldArgs> = fields.iter().filter(|f| f.state).collect();

    let captures = state_fields.iter().map(|f| generate_capture(f));
    let restores = state_fields
        .iter()
        .map(|f| generate_restore(&type_name, f));

    let implements = args.implements.iter().map(|interface| {
        quote! {
            impl #impl_generics ::hermes_core::sdk::Implements<#interface>
                for #struct_name #ty_generics #where_clause
            {
                fn upcast(
                    self: ::std::boxed::Box<Self>,
                ) -> ::std::boxed::Box<#interface> {
                    self
                }
            }
        }
    });

    quote! {
        impl #impl_generics ::hermes_core::sdk::Reloadable for #struct_name #ty_generics #where_clause {
            fn capture_state(&self) -> ::hermes_core::sdk::ObjectState {
                let mut state = ::hermes_core::sdk::ObjectState::new(#type_name);
                #(#captures)*
                state
            }

            fn restore_state(
                &mut self,
                state: &::hermes_core::sdk::ObjectState,
            ) -> ::std::result::Result<(), ::hermes_core::sdk::MergeError> {
                #(#restores)*
                ::std::result::Result::Ok(())
            }

            fn type_name(&self) -> &'static str {
                #type_name
            }
        }

        #(#implements)*
    }
}

fn generate_capture(field: &ReloadFieldArgs) -> TokenStream {
    let ident = &field.ident;
    let key = field.key();

    quote! {
        state.insert(#key, ::hermes_core::sdk::StateValue::to_value(&self.#ident));
    }
}

/// Fields missing from the source state keep their constructed value
fn generate_restore(type_name: &str, field: &ReloadFieldArgs) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    let key = field.key();

    quote! {
        if let ::std::option::Option::Some(value) = state.get(#key) {
            self.#ident = <#ty as ::hermes_core::sdk::StateValue>::from_value(value)
                .ok_or_else(|| ::hermes_core::sdk::MergeError::FieldTypeMismatch {
                    target: #type_name,
                    source_type: state.type_name(),
                    field: ::std::string::String::from(#key),
                    found: ::std::format!("{:?}", value),
                })?;
        }
    }
}
