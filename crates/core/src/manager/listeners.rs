//! Swap listeners
//!
//! Callbacks registered on a manager run after every update with the update's
//! [`SwapReport`].

use std::sync::Arc;

use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};

use super::report::SwapReport;

new_key_type! {
    /// Key for registered swap listeners, used for removal
    pub struct ListenerKey;
}

pub type SwapCallback = Arc<dyn Fn(&SwapReport) + Send + Sync>;

#[derive(Default)]
pub(crate) struct SwapListeners {
    callbacks: RwLock<SlotMap<ListenerKey, SwapCallback>>,
}

impl SwapListeners {
    pub fn insert<F>(&self, callback: F) -> ListenerKey
    where
        F: Fn(&SwapReport) + Send + Sync + 'static,
    {
        self.callbacks.write().insert(Arc::new(callback))
    }

    pub fn remove(&self, key: ListenerKey) -> bool {
        self.callbacks.write().remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Call every listener
    ///
    /// Callbacks run on a snapshot, so a listener may add or remove listeners.
    pub fn fire(&self, report: &SwapReport) {
        let callbacks: Vec<SwapCallback> = self.callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(report);
        }
    }
}
