//! Handles returned by the class manager

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use hermes_engine::{HookError, ProxyObject};

use crate::probe::ProxyCapability;

use super::ManagerId;

/// A proxy built by a reloadable manager
///
/// Cloning is cheap and keeps pointing at the same proxy object.
pub struct Proxy<T: ?Sized> {
    object: Arc<ProxyObject>,
    capability: ProxyCapability<T>,
    owner: ManagerId,
}

impl<T: ?Sized + 'static> Proxy<T> {
    pub(crate) fn new(
        object: Arc<ProxyObject>,
        capability: ProxyCapability<T>,
        owner: ManagerId,
    ) -> Self {
        Self {
            object,
            capability,
            owner,
        }
    }

    /// Manager that built this proxy
    pub(crate) fn owner(&self) -> ManagerId {
        self.owner
    }

    /// The type-erased proxy object
    pub fn object(&self) -> &Arc<ProxyObject> {
        &self.object
    }

    pub fn into_object(self) -> Arc<ProxyObject> {
        self.object
    }

    /// Current backing object
    pub fn target(&self) -> Result<Arc<T>, HookError> {
        self.capability.get_target(&*self.object)
    }

    /// Borrow the proxy as its concrete type
    pub fn downcast_ref<P: Any>(&self) -> Option<&P> {
        self.object.downcast_ref::<P>()
    }

    /// Shared handle to the proxy as its concrete type
    pub fn downcast<P: Any + Send + Sync>(&self) -> Option<Arc<P>> {
        Arc::clone(&self.object).downcast::<P>().ok()
    }

    /// `true` if both handles point at the same proxy object
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl<T: ?Sized> Clone for Proxy<T> {
    fn clone(&self) -> Self {
        Self {
            object: Arc::clone(&self.object),
            capability: self.capability,
            owner: self.owner,
        }
    }
}

impl<T: ?Sized + 'static> fmt::Debug for Proxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("class", &self.capability.class().name())
            .field("object", &Arc::as_ptr(&self.object))
            .finish()
    }
}

/// Result of [`ClassManager::create_instance`](crate::ClassManager::create_instance)
///
/// A plain manager hands out bare backing objects, a reloadable one hands out
/// proxies.
pub enum Instance<T: ?Sized> {
    Bare(Arc<T>),
    Proxied(Proxy<T>),
}

impl<T: ?Sized + 'static> Instance<T> {
    pub fn is_proxied(&self) -> bool {
        matches!(self, Instance::Proxied(_))
    }

    /// The backing object currently behind this instance
    pub fn target(&self) -> Result<Arc<T>, HookError> {
        match self {
            Instance::Bare(target) => Ok(Arc::clone(target)),
            Instance::Proxied(proxy) => proxy.target(),
        }
    }

    pub fn as_proxy(&self) -> Option<&Proxy<T>> {
        match self {
            Instance::Proxied(proxy) => Some(proxy),
            Instance::Bare(_) => None,
        }
    }

    pub fn into_proxy(self) -> Option<Proxy<T>> {
        match self {
            Instance::Proxied(proxy) => Some(proxy),
            Instance::Bare(_) => None,
        }
    }

    pub fn into_bare(self) -> Option<Arc<T>> {
        match self {
            Instance::Bare(target) => Some(target),
            Instance::Proxied(_) => None,
        }
    }
}

impl<T: ?Sized> Clone for Instance<T> {
    fn clone(&self) -> Self {
        match self {
            Instance::Bare(target) => Instance::Bare(Arc::clone(target)),
            Instance::Proxied(proxy) => Instance::Proxied(proxy.clone()),
        }
    }
}

impl<T: ?Sized + 'static> fmt::Debug for Instance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instance::Bare(target) => f.debug_tuple("Bare").field(&Arc::as_ptr(target)).finish(),
            Instance::Proxied(proxy) => f.debug_tuple("Proxied").field(proxy).finish(),
        }
    }
}
