//! Capability traits for hot-swappable types
//!
//! - [`Reloadable`] - implemented by backing objects, exports and imports state
//! - [`Implements`] - upcasts a concrete implementation to the service interface
//! - [`ReloadProxy`] - implemented by proxy types, exposes the target hooks
//! - [`TargetCell`] - ready-made storage for a proxy's backing object

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::MergeError;
use crate::state::ObjectState;

/// State transfer capability of a backing object
///
/// Usually derived with `#[derive(Reloadable)]`.
pub trait Reloadable: Send + Sync + 'static {
    /// Export the observable state of this object
    fn capture_state(&self) -> ObjectState;

    /// Overwrite this object's state with an exported one
    ///
    /// Fields absent from `state` keep their constructed value.
    fn restore_state(&mut self, state: &ObjectState) -> Result<(), MergeError>;

    /// Concrete type name of this object
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Upcast from a concrete implementation `Self` to the interface `T`
///
/// For `T = dyn Trait` the body is just `self`; `#[reload(implements = "...")]`
/// generates it.
pub trait Implements<T: ?Sized>: 'static {
    fn upcast(self: Box<Self>) -> Box<T>;
}

impl<C: 'static> Implements<C> for C {
    fn upcast(self: Box<Self>) -> Box<C> {
        self
    }
}

/// Hook pair every hot-swappable proxy exposes
///
/// Usually derived with `#[derive(ReloadProxy)]`.
pub trait ReloadProxy<T: ?Sized>: Send + Sync + 'static {
    /// Current backing object, `None` before the first one is installed
    fn reload_target(&self) -> Option<Arc<T>>;

    /// Install a new backing object
    fn set_reload_target(&self, target: Arc<T>);
}

/// Swappable slot holding a proxy's backing object
pub struct TargetCell<T: ?Sized> {
    target: RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> TargetCell<T> {
    /// Cell already holding a backing object
    pub fn new(target: Arc<T>) -> Self {
        Self {
            target: RwLock::new(Some(target)),
        }
    }

    /// Cell with no backing object yet
    pub fn empty() -> Self {
        Self {
            target: RwLock::new(None),
        }
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.target.read().clone()
    }

    /// Replace the backing object, returning the previous one
    pub fn set(&self, target: Arc<T>) -> Option<Arc<T>> {
        self.target.write().replace(target)
    }

    pub fn is_empty(&self) -> bool {
        self.target.read().is_none()
    }
}

impl<T: ?Sized> Default for TargetCell<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> fmt::Debug for TargetCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetCell")
            .field("occupied", &!self.is_empty())
            .finish()
    }
}
