//! Class manager
//!
//! Holds the active implementation class of a service interface `T` and swaps
//! it at runtime. The (class, catalogue) pair sits behind one `RwLock` as a
//! single `Arc`, so readers see either the old pair or the new one.
//!
//! A manager created with a usable [`ProxyClass`] hands out proxies and keeps
//! an [`InstanceRegistry`] of them. On [`ClassManager::update`] every live
//! registered proxy gets a new backing object built from its recorded
//! arguments, with the old object's state merged in. The sweep runs without
//! the lock held.
//!
//! # Example
//!
//! ```ignore
//! use hermes_core::{ClassManager, ProxyClass, Value};
//!
//! let manager = ClassManager::<dyn CounterService>::with_proxy(
//!     ProxyClass::wrapping::<CounterProxy>(),
//! );
//! manager.update(counter_class());
//!
//! let counter = manager.create_registered_instance(&[Value::from(5)]).unwrap();
//!
//! // Later: every registered proxy now runs on FastCounter
//! let report = manager.update(fast_counter_class());
//! tracing::info!("{}", report);
//! ```

mod instance;
mod listeners;
mod report;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hermes_engine::{Constructor, ImplementClass, ProxyClass};
use hermes_sdk::{Reloadable, Value};
use parking_lot::RwLock;

use crate::catalogue::ConstructorCatalogue;
use crate::config::CoreConfig;
use crate::error::{ManagerError, MatchError};
use crate::probe::{probe, ProxyCapability};
use crate::registry::{InstanceRegistry, LiveEntry, ProxyKey, DEFAULT_COMPACT_EVERY};

pub use instance::{Instance, Proxy};
pub use listeners::{ListenerKey, SwapCallback};
pub use report::{ManagerMode, SwapFailure, SwapReport};

use listeners::SwapListeners;

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a manager, stamped on every proxy it builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ManagerId(u64);

impl ManagerId {
    fn next() -> Self {
        Self(NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The installed class and the catalogue computed for it
struct ClassState<T: ?Sized> {
    class: ImplementClass<T>,
    catalogue: ConstructorCatalogue<T>,
}

/// Runtime replacement manager for implementations of `T`
pub struct ClassManager<T: ?Sized> {
    id: ManagerId,
    current: RwLock<Option<Arc<ClassState<T>>>>,
    capability: Option<ProxyCapability<T>>,
    registry: Option<InstanceRegistry>,
    listeners: SwapListeners,
}

impl<T: ?Sized + Reloadable> ClassManager<T> {
    /// Create a plain manager that hands out bare backing objects
    pub fn new() -> Self {
        Self {
            id: ManagerId::next(),
            current: RwLock::new(None),
            capability: None,
            registry: None,
            listeners: SwapListeners::default(),
        }
    }

    /// Create a manager that wraps backing objects in `proxy_class`
    ///
    /// If the proxy class fails the capability probe the manager silently
    /// runs in [`ManagerMode::Plain`].
    pub fn with_proxy(proxy_class: ProxyClass<T>) -> Self {
        let capability = probe(&proxy_class);
        if capability.is_none() {
            tracing::debug!(
                "ClassManager({}): proxy class not usable, falling back to plain mode",
                proxy_class.name()
            );
        }

        Self {
            id: ManagerId::next(),
            current: RwLock::new(None),
            registry: capability.map(|_| InstanceRegistry::new(DEFAULT_COMPACT_EVERY)),
            capability,
            listeners: SwapListeners::default(),
        }
    }

    /// Apply framework configuration
    pub fn with_config(mut self, config: &CoreConfig) -> Self {
        if let Some(registry) = &mut self.registry {
            registry.set_compact_every(config.compact_every);
        }
        self
    }

    pub fn mode(&self) -> ManagerMode {
        if self.capability.is_some() {
            ManagerMode::Reloadable
        } else {
            ManagerMode::Plain
        }
    }

    pub fn is_reloadable(&self) -> bool {
        self.mode() == ManagerMode::Reloadable
    }

    /// The proxy class, if it passed the probe
    pub fn proxy_class(&self) -> Option<ProxyClass<T>> {
        self.capability.map(|capability| *capability.class())
    }

    /// The active implementation class
    pub fn implement_class(&self) -> Option<ImplementClass<T>> {
        self.state().map(|state| state.class.clone())
    }

    /// Snapshot of the (class, catalogue) pair
    fn state(&self) -> Option<Arc<ClassState<T>>> {
        self.current.read().clone()
    }

    /// Resolve the constructor the active class would use for `args`
    pub fn match_constructor(&self, args: &[Value]) -> Result<Constructor<T>, MatchError> {
        let state = self.state().ok_or(MatchError::NoImplementation)?;
        state.catalogue.match_constructor(args).cloned()
    }

    /// Build a backing object of the active class
    fn build_target(&self, args: &[Value]) -> Result<Box<T>, ManagerError> {
        let state = self.state().ok_or(MatchError::NoImplementation)?;
        let constructor = state.catalogue.match_constructor(args)?;
        tracing::trace!("build_target -> {:?}", constructor);
        Ok(hermes_engine::construct(constructor, args)?)
    }

    /// Build an instance, reporting why it could not be built
    pub fn try_create_instance(&self, args: &[Value]) -> Result<Instance<T>, ManagerError> {
        let target: Arc<T> = Arc::from(self.build_target(args)?);

        match self.capability {
            Some(capability) => {
                let object = capability.instantiate(target)?;
                Ok(Instance::Proxied(Proxy::new(object, capability, self.id)))
            }
            None => Ok(Instance::Bare(target)),
        }
    }

    /// Build an instance of the active class
    ///
    /// Returns `None` when no class is installed, no constructor accepts
    /// `args`, or construction fails. The proxy is not registered; see
    /// [`register`](Self::register) and
    /// [`create_registered_instance`](Self::create_registered_instance).
    pub fn create_instance(&self, args: &[Value]) -> Option<Instance<T>> {
        tracing::debug!("create_instance({})", hermes_engine::describe_args(args));
        match self.try_create_instance(args) {
            Ok(instance) => Some(instance),
            Err(e) => {
                tracing::debug!("create_instance failed: {}", e);
                None
            }
        }
    }

    /// Build an instance and register it for future swaps
    ///
    /// In plain mode this is the same as [`create_instance`](Self::create_instance).
    pub fn create_registered_instance(&self, args: &[Value]) -> Option<Instance<T>> {
        let instance = self.create_instance(args)?;
        if let (Instance::Proxied(proxy), Some(registry)) = (&instance, &self.registry) {
            registry.register(proxy.object(), args.to_vec());
        }
        Some(instance)
    }

    /// Record `proxy` with the arguments its backing object was built from
    ///
    /// Only proxies built by this manager are accepted.
    pub fn register(
        &self,
        proxy: &Proxy<T>,
        args: impl Into<Arc<[Value]>>,
    ) -> Result<ProxyKey, ManagerError> {
        let registry = self.registry.as_ref().ok_or(ManagerError::NotReloadable)?;
        if proxy.owner() != self.id {
            return Err(ManagerError::ForeignProxy);
        }
        Ok(registry.register(proxy.object(), args))
    }

    /// Stop tracking a proxy
    pub fn deregister(&self, key: ProxyKey) -> bool {
        self.registry
            .as_ref()
            .is_some_and(|registry| registry.deregister(key))
    }

    /// Registry key of `proxy`, if registered
    pub fn key_of(&self, proxy: &Proxy<T>) -> Option<ProxyKey> {
        self.registry.as_ref()?.key_of(proxy.object())
    }

    /// Number of registered proxies still alive
    pub fn registered_count(&self) -> usize {
        self.registry
            .as_ref()
            .map_or(0, InstanceRegistry::live_count)
    }

    /// Drop registry entries of dead proxies, returning how many were removed
    pub fn compact(&self) -> usize {
        self.registry.as_ref().map_or(0, InstanceRegistry::compact)
    }

    /// Install `class` and swap every registered proxy onto it
    ///
    /// Never fails once the class is installed. Proxies that cannot be
    /// swapped keep their old backing object and are listed in the report.
    #[tracing::instrument(skip_all, fields(class = class.name()))]
    pub fn update(&self, class: ImplementClass<T>) -> SwapReport {
        let name = class.name();
        let catalogue = ConstructorCatalogue::collect(&class);
        tracing::debug!("Collected {} constructors", catalogue.len());

        *self.current.write() = Some(Arc::new(ClassState { class, catalogue }));

        let mut report = SwapReport::new(name, self.mode());
        if let (Some(capability), Some(registry)) = (&self.capability, &self.registry) {
            let (entries, pruned) = registry.snapshot();
            report.pruned = pruned;

            for entry in &entries {
                match self.swap(capability, entry) {
                    Ok(()) => report.swapped += 1,
                    Err(error) => {
                        tracing::warn!("Failed to swap proxy {:?}: {}", entry.key, error);
                        report.failures.push(SwapFailure {
                            key: entry.key,
                            error,
                        });
                    }
                }
            }
            tracing::info!("Swapped to {}", report);
        } else {
            tracing::info!("Installed {}", name);
        }

        self.listeners.fire(&report);
        report
    }

    /// Rebuild one proxy's backing object on the active class
    ///
    /// A panic in a proxy hook or a state hook is caught and reported as
    /// [`ManagerError::Panicked`].
    fn swap(&self, capability: &ProxyCapability<T>, entry: &LiveEntry) -> Result<(), ManagerError> {
        panic::catch_unwind(AssertUnwindSafe(|| -> Result<(), ManagerError> {
            let old = capability.get_target(&*entry.proxy)?;
            let mut new = self.build_target(&entry.args)?;
            hermes_engine::merge_object(&*old, &mut *new)?;
            capability.set_target(&*entry.proxy, Arc::from(new))?;
            Ok(())
        }))
        .unwrap_or_else(|payload| {
            Err(ManagerError::Panicked {
                message: hermes_engine::panic_message(&*payload),
            })
        })
    }

    /// Register a callback run after every update
    pub fn on_swap<F>(&self, callback: F) -> ListenerKey
    where
        F: Fn(&SwapReport) + Send + Sync + 'static,
    {
        self.listeners.insert(callback)
    }

    /// Remove a swap listener
    ///
    /// Returns `true` if the listener was found and removed.
    pub fn remove_listener(&self, key: ListenerKey) -> bool {
        self.listeners.remove(key)
    }
}

impl<T: ?Sized + Reloadable> Default for ClassManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Reloadable> std::fmt::Debug for ClassManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassManager")
            .field("mode", &self.mode())
            .field("class", &self.state().map(|state| state.class.name()))
            .field("registry", &self.registry)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
