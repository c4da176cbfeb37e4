//! Capability probe for proxy classes
//!
//! Decides once, when a manager is created, whether a proxy class can take
//! part in hot-swapping. A usable proxy class has both target hooks and at
//! least one way to build a proxy: around an existing backing object, or empty
//! and then filled through the set hook.
//!
//! An unusable class is not an error. The manager logs the reason and runs
//! without proxies.

use std::sync::Arc;

use hermes_engine::{HookError, ProxyClass, ProxyObject};

/// How the manager builds a fresh proxy
enum ProxyConstruction<T: ?Sized> {
    /// One-argument path taking the backing object
    WithTarget(fn(Arc<T>) -> Arc<ProxyObject>),
    /// Zero-argument path followed by the set hook
    Empty(fn() -> Arc<ProxyObject>),
}

impl<T: ?Sized> Clone for ProxyConstruction<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ProxyConstruction<T> {}

/// A proxy class that passed the probe
pub struct ProxyCapability<T: ?Sized> {
    class: ProxyClass<T>,
    get_target: fn(&ProxyObject) -> Result<Arc<T>, HookError>,
    set_target: fn(&ProxyObject, Arc<T>) -> Result<(), HookError>,
    construction: ProxyConstruction<T>,
}

impl<T: ?Sized> Clone for ProxyCapability<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ProxyCapability<T> {}

impl<T: ?Sized + 'static> ProxyCapability<T> {
    /// The probed descriptor
    pub fn class(&self) -> &ProxyClass<T> {
        &self.class
    }

    /// Read a proxy's current backing object
    pub fn get_target(&self, proxy: &ProxyObject) -> Result<Arc<T>, HookError> {
        (self.get_target)(proxy)
    }

    /// Install a new backing object into a proxy
    pub fn set_target(&self, proxy: &ProxyObject, target: Arc<T>) -> Result<(), HookError> {
        (self.set_target)(proxy, target)
    }

    /// `true` if proxies are built around their backing object directly
    pub fn wraps_target(&self) -> bool {
        matches!(self.construction, ProxyConstruction::WithTarget(_))
    }

    /// Build a proxy backed by `target`
    pub fn instantiate(&self, target: Arc<T>) -> Result<Arc<ProxyObject>, HookError> {
        match self.construction {
            ProxyConstruction::WithTarget(new) => Ok(new(target)),
            ProxyConstruction::Empty(new) => {
                let proxy = new();
                (self.set_target)(&*proxy, target)?;
                Ok(proxy)
            }
        }
    }
}

/// Probe a proxy class for hot-swap support
///
/// Returns `None` if either hook or every construction path is missing. The
/// one-argument construction path is preferred when both exist.
pub fn probe<T: ?Sized + 'static>(class: &ProxyClass<T>) -> Option<ProxyCapability<T>> {
    let (Some(get_target), Some(set_target)) = (class.get_target_hook(), class.set_target_hook())
    else {
        tracing::debug!(
            "probe({}): missing reload target hooks, proxying disabled",
            class.name()
        );
        return None;
    };

    let construction = match (class.target_constructor(), class.empty_constructor()) {
        (Some(new), _) => ProxyConstruction::WithTarget(new),
        (None, Some(new)) => ProxyConstruction::Empty(new),
        (None, None) => {
            tracing::debug!("probe({}): no proxy constructor, proxying disabled", class.name());
            return None;
        }
    };

    tracing::debug!("probe({}): reloadable", class.name());
    Some(ProxyCapability {
        class: *class,
        get_target,
        set_target,
        construction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_sdk::{ReloadProxy, TargetCell};

    struct Target(&'static str);

    #[derive(Default)]
    struct Slot {
        target: TargetCell<Target>,
    }

    impl ReloadProxy<Target> for Slot {
        fn reload_target(&self) -> Option<Arc<Target>> {
            self.target.get()
        }

        fn set_reload_target(&self, target: Arc<Target>) {
            self.target.set(target);
        }
    }

    impl From<Arc<Target>> for Slot {
        fn from(target: Arc<Target>) -> Self {
            Self {
                target: TargetCell::new(target),
            }
        }
    }

    fn get_slot(proxy: &ProxyObject) -> Result<Arc<Target>, HookError> {
        hermes_engine::downcast_proxy::<Slot>(proxy)?
            .reload_target()
            .ok_or(HookError::EmptyTarget { proxy: "Slot" })
    }

    fn set_slot(proxy: &ProxyObject, target: Arc<Target>) -> Result<(), HookError> {
        hermes_engine::downcast_proxy::<Slot>(proxy)?.set_reload_target(target);
        Ok(())
    }

    fn new_slot() -> Arc<ProxyObject> {
        Arc::new(Slot::default())
    }

    #[test]
    fn test_probe_accepts_trait_derived_classes() {
        assert!(probe(&ProxyClass::<Target>::wrapping::<Slot>()).is_some());
        assert!(probe(&ProxyClass::<Target>::defaulted::<Slot>()).is_some());
        assert!(probe(&ProxyClass::<Target>::of::<Slot>()).unwrap().wraps_target());
    }

    #[test]
    fn test_probe_rejects_missing_set_hook() {
        let class = ProxyClass::<Target>::builder("NoSet")
            .get_target(get_slot)
            .new_empty(new_slot)
            .build();
        assert!(probe(&class).is_none());
    }

    #[test]
    fn test_probe_rejects_missing_get_hook() {
        let class = ProxyClass::<Target>::builder("NoGet")
            .set_target(set_slot)
            .new_empty(new_slot)
            .build();
        assert!(probe(&class).is_none());
    }

    #[test]
    fn test_probe_rejects_missing_constructors() {
        let class = ProxyClass::<Target>::builder("NoCtor")
            .get_target(get_slot)
            .set_target(set_slot)
            .build();
        assert!(probe(&class).is_none());
    }

    #[test]
    fn test_empty_path_fills_through_set_hook() {
        let class = ProxyClass::<Target>::builder("Empty")
            .get_target(get_slot)
            .set_target(set_slot)
            .new_empty(new_slot)
            .build();
        let capability = probe(&class).unwrap();
        assert!(!capability.wraps_target());

        let proxy = capability.instantiate(Arc::new(Target("a"))).unwrap();
        assert_eq!(capability.get_target(&*proxy).unwrap().0, "a");
    }
}
