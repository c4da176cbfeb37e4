//! Hermes Proc Macros
//!
//! This crate provides derive macros for hot-swappable types:
//!
//! - `#[derive(Reloadable)]` - Carry selected fields across an implementation swap
//! - `#[derive(ReloadProxy)]` - Turn a struct holding a `TargetCell<T>` into a proxy
//!
//! # Example
//!
//! ```ignore
//! use hermes_core::{Reloadable, ReloadProxy, TargetCell};
//!
//! pub trait CounterService: hermes_core::sdk::Reloadable {
//!     fn increment(&self) -> i64;
//! }
//!
//! #[derive(Reloadable)]
//! #[reload(implements = "dyn CounterService")]
//! pub struct Counter {
//!     #[reload(state)]
//!     count: AtomicI64,
//!
//!     step: i64,
//! }
//!
//! #[derive(ReloadProxy)]
//! pub struct CounterProxy {
//!     #[proxy(target)]
//!     target: TargetCell<dyn CounterService>,
//! }
//! ```
//!
//! # Attributes
//!
//! ## Struct Attributes (Reloadable)
//!
//! - `#[reload(implements = "dyn Trait")]` - Also implement `Implements<dyn Trait>`. May repeat.
//! - `#[reload(name = "Counter")]` - State type name (default: the struct name).
//!
//! ## Field Attributes (Reloadable)
//!
//! - `#[reload(state)]` - Capture and restore this field on swap.
//! - `#[reload(state, rename = "count")]` - Use a different key in the captured state.
//!
//! ## Field Attributes (ReloadProxy)
//!
//! - `#[proxy(target)]` - **Required** on exactly one `TargetCell<T>` field.

mod parse;
mod reload_proxy;
mod reloadable;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for swappable backing objects
///
/// Fields marked `#[reload(state)]` form the state handed from the old
/// backing object to its replacement. Their types must implement
/// `StateValue`. On restore, fields absent from the old object's state keep
/// the value the new constructor gave them, and a field whose value cannot
/// be converted fails the merge with `MergeError::FieldTypeMismatch`.
///
/// # Example
///
/// ```ignore
/// #[derive(Reloadable)]
/// #[reload(implements = "dyn CounterService")]
/// pub struct FastCounter {
///     #[reload(state)]
///     count: AtomicI64,
/// }
/// ```
///
/// # Generated Code
///
/// - A `Reloadable` implementation (`capture_state`, `restore_state`, `type_name`)
/// - One `Implements<I>` implementation per `implements` attribute
#[proc_macro_derive(Reloadable, attributes(reload))]
pub fn derive_reloadable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    reloadable::derive_reloadable(input).into()
}

/// Derive macro for proxy types
///
/// The struct must have exactly one field marked `#[proxy(target)]` of type
/// `TargetCell<T>`. Every other field must implement `Default`.
///
/// # Generated Code
///
/// - `ReloadProxy<T>` reading and replacing the target cell
/// - `From<Arc<T>>` building a proxy around a backing object
/// - `fn proxy_class() -> ProxyClass<T>` for `ClassManager::with_proxy`
#[proc_macro_derive(ReloadProxy, attributes(proxy))]
pub fn derive_reload_proxy(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    reload_proxy::derive_reload_proxy(input).into()
}
