//! Instance registry
//!
//! Tracks every live proxy together with the arguments its backing object was
//! built from, so a later swap can rebuild it. Entries live in a slot map and
//! hold the proxy weakly: dropping the last external handle lets the proxy go,
//! and the dead entry is pruned on the next compaction.
//!
//! Compaction is lazy. It runs every `compact_every` registrations, whenever a
//! sweep takes a snapshot, and on explicit [`InstanceRegistry::compact`].

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use hermes_engine::ProxyObject;
use hermes_sdk::Value;
use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key for registered proxies, used for deregistration
    pub struct ProxyKey;
}

/// Default number of registrations between compactions
pub const DEFAULT_COMPACT_EVERY: usize = 64;

struct Entry {
    proxy: Weak<ProxyObject>,
    args: Arc<[Value]>,
}

struct RegistryInner {
    entries: SlotMap<ProxyKey, Entry>,
    /// Proxy allocation address -> key
    by_identity: HashMap<usize, ProxyKey>,
    since_compact: usize,
}

impl RegistryInner {
    /// Drop entries whose proxy is gone, returning how many were removed
    fn compact(&mut self) -> usize {
        let before = self.entries.len();
        let by_identity = &mut self.by_identity;
        self.entries.retain(|_, entry| {
            let alive = entry.proxy.strong_count() > 0;
            if !alive {
                by_identity.remove(&identity(entry.proxy.as_ptr()));
            }
            alive
        });
        self.since_compact = 0;
        before - self.entries.len()
    }
}

/// A live registry entry taken by [`InstanceRegistry::snapshot`]
pub struct LiveEntry {
    pub key: ProxyKey,
    pub proxy: Arc<ProxyObject>,
    pub args: Arc<[Value]>,
}

/// Weak proxy -> construction arguments map
pub struct InstanceRegistry {
    inner: Mutex<RegistryInner>,
    compact_every: usize,
}

/// Identity of a proxy allocation
///
/// A registered allocation cannot be reused while its `Weak` is held, so the
/// address is unique among current entries.
fn identity(ptr: *const ProxyObject) -> usize {
    ptr as *const () as usize
}

impl InstanceRegistry {
    pub fn new(compact_every: usize) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                entries: SlotMap::with_key(),
                by_identity: HashMap::new(),
                since_compact: 0,
            }),
            compact_every: compact_every.max(1),
        }
    }

    pub fn compact_every(&self) -> usize {
        self.compact_every
    }

    pub(crate) fn set_compact_every(&mut self, compact_every: usize) {
        self.compact_every = compact_every.max(1);
    }

    /// Record `proxy` with the arguments used for its backing object
    ///
    /// Registering a proxy that is already present replaces its arguments and
    /// keeps its key.
    pub fn register(&self, proxy: &Arc<ProxyObject>, args: impl Into<Arc<[Value]>>) -> ProxyKey {
        let args = args.into();
        let id = identity(Arc::as_ptr(proxy));
        let mut inner = self.inner.lock();

        let existing = inner.by_identity.get(&id).copied();
        if let Some(key) = existing {
            if let Some(entry) = inner.entries.get_mut(key) {
                entry.args = args;
                return key;
            }
        }

        let key = inner.entries.insert(Entry {
            proxy: Arc::downgrade(proxy),
            args,
        });
        inner.by_identity.insert(id, key);

        inner.since_compact += 1;
        if inner.since_compact >= self.compact_every {
            let pruned = inner.compact();
            if pruned > 0 {
                tracing::trace!("Registry compaction pruned {} dead entries", pruned);
            }
        }
        key
    }

    /// Remove an entry, returns `true` if it existed
    pub fn deregister(&self, key: ProxyKey) -> bool {
        let mut inner = self.inner.lock();
        match inner.entries.remove(key) {
            Some(entry) => {
                inner.by_identity.remove(&identity(entry.proxy.as_ptr()));
                true
            }
            None => false,
        }
    }

    /// Key of a registered proxy
    pub fn key_of(&self, proxy: &Arc<ProxyObject>) -> Option<ProxyKey> {
        let inner = self.inner.lock();
        inner.by_identity.get(&identity(Arc::as_ptr(proxy))).copied()
    }

    /// Recorded arguments of a registered proxy
    pub fn args(&self, key: ProxyKey) -> Option<Arc<[Value]>> {
        self.inner
            .lock()
            .entries
            .get(key)
            .map(|entry| Arc::clone(&entry.args))
    }

    /// `true` if `key` is registered and its proxy is still alive
    pub fn is_live(&self, key: ProxyKey) -> bool {
        self.inner
            .lock()
            .entries
            .get(key)
            .is_some_and(|entry| entry.proxy.strong_count() > 0)
    }

    /// Number of entries, dead ones included until the next compaction
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries whose proxy is alive
    pub fn live_count(&self) -> usize {
        self.inner
            .lock()
            .entries
            .values()
            .filter(|entry| entry.proxy.strong_count() > 0)
            .count()
    }

    /// Prune dead entries now
    pub fn compact(&self) -> usize {
        self.inner.lock().compact()
    }

    /// Upgrade every live entry and prune the dead ones
    ///
    /// Returns the live entries and the number of pruned entries. The lock is
    /// released before the caller works through the snapshot.
    pub fn snapshot(&self) -> (Vec<LiveEntry>, usize) {
        let mut inner = self.inner.lock();
        let pruned = inner.compact();
        let live = inner
            .entries
            .iter()
            .filter_map(|(key, entry)| {
                entry.proxy.upgrade().map(|proxy| LiveEntry {
                    key,
                    proxy,
                    args: Arc::clone(&entry.args),
                })
            })
            .collect();
        (live, pruned)
    }
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_COMPACT_EVERY)
    }
}

impl std::fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("entries", &self.len())
            .field("compact_every", &self.compact_every)
            .finish()
    }
}
