//! Attribute parsing for the derive macros

use darling::{FromDeriveInput, FromField};
use syn::{DeriveInput, Generics, Ident, Type};

/// Parsed #[reload(...)] attributes on the struct
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(reload), supports(struct_named))]
pub struct ReloadableArgs {
    /// Struct identifier
    pub ident: Ident,

    pub generics: Generics,

    /// Struct fields
    pub data: darling::ast::Data<(), ReloadFieldArgs>,

    /// Interfaces to emit `Implements` for (e.g. "dyn CounterService")
    #[darling(multiple)]
    pub implements: Vec<Type>,

    /// State type name reported by `type_name` (defaults to the struct name)
    pub name: Option<String>,
}

impl ReloadableArgs {
    pub fn state_type_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.ident.to_string())
    }
}

/// Parsed #[reload(...)] attributes on a field
#[derive(Debug, FromField)]
#[darling(attributes(reload))]
pub struct ReloadFieldArgs {
    /// Field identifier
    pub ident: Option<Ident>,

    /// Field type
    pub ty: Type,

    /// Whether this field is carried across a swap
    #[darling(default)]
    pub state: bool,

    /// Key used in the captured state (defaults to the field name)
    pub rename: Option<String>,
}

impl ReloadFieldArgs {
    /// State key of this field
    pub fn key(&self) -> String {
        match (&self.rename, &self.ident) {
            (Some(rename), _) => rename.clone(),
            (None, Some(ident)) => ident.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Parsed #[proxy(...)] attributes on the struct
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(proxy), supports(struct_named))]
pub struct ReloadProxyArgs {
    pub ident: Ident,

    pub generics: Generics,

    pub data: darling::ast::Data<(), ProxyFieldArgs>,
}

/// Parsed #[proxy(...)] attributes on a field
#[derive(Debug, FromField)]
#[darling(attributes(proxy))]
pub struct ProxyFieldArgs {
    pub ident: Option<Ident>,

    pub ty: Type,

    /// Marks the `TargetCell<T>` holding the backing object
    #[darling(default)]
    pub target: bool,
}

pub fn parse_reloadable(input: &DeriveInput) -> darling::Result<ReloadableArgs> {
    ReloadableArgs::from_derive_input(input)
}

pub fn parse_reload_proxy(input: &DeriveInput) -> darling::Result<ReloadProxyArgs> {
    ReloadProxyArgs::from_derive_input(input)
}
