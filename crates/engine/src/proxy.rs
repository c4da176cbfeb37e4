//! Proxy class descriptors
//!
//! A [`ProxyClass`] bundles the hooks the manager needs to drive a proxy type:
//! reading and replacing its backing object, and the ways a fresh proxy can be
//! built. Proxies are handled as type-erased [`ProxyObject`]s so a manager can
//! work with any proxy type chosen at runtime.
//!
//! Descriptors derived from the [`ReloadProxy`] trait always carry both hooks.
//! [`ProxyClass::builder`] assembles a descriptor by hand, possibly missing
//! hooks or construction paths; whether the result is usable is decided by the
//! capability probe in `hermes-core`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use hermes_sdk::ReloadProxy;

use crate::error::HookError;

/// Type-erased proxy instance
pub type ProxyObject = dyn Any + Send + Sync;

/// Descriptor of a proxy type for backing objects of interface `T`
pub struct ProxyClass<T: ?Sized> {
    name: &'static str,
    get_target: Option<fn(&ProxyObject) -> Result<Arc<T>, HookError>>,
    set_target: Option<fn(&ProxyObject, Arc<T>) -> Result<(), HookError>>,
    new_empty: Option<fn() -> Arc<ProxyObject>>,
    new_with_target: Option<fn(Arc<T>) -> Arc<ProxyObject>>,
}

impl<T: ?Sized + 'static> ProxyClass<T> {
    /// Start assembling a descriptor by hand
    pub fn builder(name: &'static str) -> ProxyClassBuilder<T> {
        ProxyClassBuilder {
            class: ProxyClass {
                name,
                get_target: None,
                set_target: None,
                new_empty: None,
                new_with_target: None,
            },
        }
    }

    /// Descriptor for a proxy built around an existing backing object
    pub fn wrapping<P>() -> Self
    where
        P: ReloadProxy<T> + From<Arc<T>>,
    {
        Self::hooks_of::<P>()
            .new_with_target(wrap_target::<T, P>)
            .build()
    }

    /// Descriptor for a proxy built empty and filled through `set_reload_target`
    pub fn defaulted<P>() -> Self
    where
        P: ReloadProxy<T> + Default,
    {
        Self::hooks_of::<P>().new_empty(new_default::<P>).build()
    }

    /// Descriptor offering both construction paths
    pub fn of<P>() -> Self
    where
        P: ReloadProxy<T> + From<Arc<T>> + Default,
    {
        Self::hooks_of::<P>()
            .new_with_target(wrap_target::<T, P>)
            .new_empty(new_default::<P>)
            .build()
    }

    fn hooks_of<P: ReloadProxy<T>>() -> ProxyClassBuilder<T> {
        Self::builder(std::any::type_name::<P>())
            .get_target(get_target::<T, P>)
            .set_target(set_target::<T, P>)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get_target_hook(&self) -> Option<fn(&ProxyObject) -> Result<Arc<T>, HookError>> {
        self.get_target
    }

    pub fn set_target_hook(&self) -> Option<fn(&ProxyObject, Arc<T>) -> Result<(), HookError>> {
        self.set_target
    }

    /// Zero-argument construction path
    pub fn empty_constructor(&self) -> Option<fn() -> Arc<ProxyObject>> {
        self.new_empty
    }

    /// One-argument construction path taking the backing object
    pub fn target_constructor(&self) -> Option<fn(Arc<T>) -> Arc<ProxyObject>> {
        self.new_with_target
    }
}

impl<T: ?Sized> Clone for ProxyClass<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ProxyClass<T> {}

impl<T: ?Sized> fmt::Debug for ProxyClass<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyClass")
            .field("name", &self.name)
            .field("get_target", &self.get_target.is_some())
            .field("set_target", &self.set_target.is_some())
            .field("new_empty", &self.new_empty.is_some())
            .field("new_with_target", &self.new_with_target.is_some())
            .finish()
    }
}

/// Builder for hand-assembled [`ProxyClass`] descriptors
pub struct ProxyClassBuilder<T: ?Sized> {
    class: ProxyClass<T>,
}

impl<T: ?Sized + 'static> ProxyClassBuilder<T> {
    pub fn get_target(mut self, hook: fn(&ProxyObject) -> Result<Arc<T>, HookError>) -> Self {
        self.class.get_target = Some(hook);
        self
    }

    pub fn set_target(mut self, hook: fn(&ProxyObject, Arc<T>) -> Result<(), HookError>) -> Self {
        self.class.set_target = Some(hook);
        self
    }

    pub fn new_empty(mut self, constructor: fn() -> Arc<ProxyObject>) -> Self {
        self.class.new_empty = Some(constructor);
        self
    }

    pub fn new_with_target(mut self, constructor: fn(Arc<T>) -> Arc<ProxyObject>) -> Self {
        self.class.new_with_target = Some(constructor);
        self
    }

    pub fn build(self) -> ProxyClass<T> {
        self.class
    }
}

/// Borrow a type-erased proxy as `P`
pub fn downcast_proxy<P: Any>(object: &ProxyObject) -> Result<&P, HookError> {
    object.downcast_ref::<P>().ok_or(HookError::ProxyTypeMismatch {
        expected: std::any::type_name::<P>(),
    })
}

fn get_target<T: ?Sized + 'static, P: ReloadProxy<T>>(
    object: &ProxyObject,
) -> Result<Arc<T>, HookError> {
    downcast_proxy::<P>(object)?
        .reload_target()
        .ok_or(HookError::EmptyTarget {
            proxy: std::any::type_name::<P>(),
        })
}

fn set_target<T: ?Sized + 'static, P: ReloadProxy<T>>(
    object: &ProxyObject,
    target: Arc<T>,
) -> Result<(), HookError> {
    downcast_proxy::<P>(object)?.set_reload_target(target);
    Ok(())
}

fn wrap_target<T: ?Sized + 'static, P: ReloadProxy<T> + From<Arc<T>>>(
    target: Arc<T>,
) -> Arc<ProxyObject> {
    Arc::new(P::from(target))
}

fn new_default<P: Default + Send + Sync + 'static>() -> Arc<ProxyObject> {
    Arc::new(P::default())
}
