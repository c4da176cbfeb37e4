//! End-to-end hot-swap tests against the derive macros

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use hermes_core::{
    ClassManager, ConstructionError, HookError, ImplementClass, ManagerError, ManagerMode,
    MatchError, MergeError, ObjectState, ParamType, ProxyClass, ProxyObject, ReloadProxy,
    Reloadable, StateValue, TargetCell, Value,
};

pub trait CounterService: Reloadable {
    fn increment(&self) -> i64;
    fn count(&self) -> i64;
    fn kind(&self) -> &'static str;
}

#[derive(Reloadable)]
#[reload(implements = "dyn CounterService")]
pub struct Counter {
    #[reload(state)]
    count: AtomicI64,

    #[reload(state, rename = "title")]
    label: String,
}

impl Counter {
    fn new(start: i64) -> Self {
        Self {
            count: AtomicI64::new(start),
            label: "counter".to_string(),
        }
    }
}

impl CounterService for Counter {
    fn increment(&self) -> i64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn count(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }

    fn kind(&self) -> &'static str {
        "Counter"
    }
}

#[derive(Reloadable)]
#[reload(implements = "dyn CounterService", name = "FastCounter")]
pub struct FastCounter {
    #[reload(state)]
    count: AtomicI64,

    #[reload(state, rename = "title")]
    title: String,

    step: i64,
}

impl CounterService for FastCounter {
    fn increment(&self) -> i64 {
        self.count.fetch_add(self.step, Ordering::SeqCst) + self.step
    }

    fn count(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }

    fn kind(&self) -> &'static str {
        "FastCounter"
    }
}

/// Refuses to take over a negative count
pub struct CheckedCounter {
    count: AtomicI64,
}

impl Reloadable for CheckedCounter {
    fn capture_state(&self) -> ObjectState {
        let mut state = ObjectState::new("CheckedCounter");
        state.insert("count", self.count.to_value());
        state
    }

    fn restore_state(&mut self, state: &ObjectState) -> Result<(), MergeError> {
        let count = state.get("count").and_then(i64::from_value).unwrap_or(0);
        if count < 0 {
            return Err(MergeError::Incompatible {
                target: "CheckedCounter",
                source_type: state.type_name(),
            });
        }
        self.count = AtomicI64::new(count);
        Ok(())
    }
}

impl CounterService for CheckedCounter {
    fn increment(&self) -> i64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn count(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }

    fn kind(&self) -> &'static str {
        "CheckedCounter"
    }
}

impl hermes_core::Implements<dyn CounterService> for CheckedCounter {
    fn upcast(self: Box<Self>) -> Box<dyn CounterService> {
        self
    }
}

/// Panics when asked to take over a count of 13
pub struct SuperstitiousCounter {
    count: AtomicI64,
}

impl Reloadable for SuperstitiousCounter {
    fn capture_state(&self) -> ObjectState {
        let mut state = ObjectState::new("SuperstitiousCounter");
        state.insert("count", self.count.to_value());
        state
    }

    fn restore_state(&mut self, state: &ObjectState) -> Result<(), MergeError> {
        let count = state.get("count").and_then(i64::from_value).unwrap_or(0);
        assert_ne!(count, 13, "unlucky count");
        self.count = AtomicI64::new(count);
        Ok(())
    }
}

impl CounterService for SuperstitiousCounter {
    fn increment(&self) -> i64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn count(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }

    fn kind(&self) -> &'static str {
        "SuperstitiousCounter"
    }
}

impl hermes_core::Implements<dyn CounterService> for SuperstitiousCounter {
    fn upcast(self: Box<Self>) -> Box<dyn CounterService> {
        self
    }
}

#[derive(Default, ReloadProxy)]
pub struct CounterProxy {
    #[proxy(target)]
    target: TargetCell<dyn CounterService>,

    calls: AtomicI64,
}

impl CounterProxy {
    fn increment(&self) -> i64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.target.get().map_or(0, |target| target.increment())
    }
}

fn counter_class() -> ImplementClass<dyn CounterService> {
    ImplementClass::<dyn CounterService>::builder::<Counter>()
        .named("Counter")
        .constructor([], |_| Ok(Counter::new(0)))
        .constructor([ParamType::Int], |args| Ok(Counter::new(args.int(0)?)))
        .constructor([ParamType::Str], |args| {
            let mut counter = Counter::new(0);
            counter.label = args.str(0)?.to_string();
            Ok(counter)
        })
        .constructor([ParamType::Int.nullable(), ParamType::Str], |args| {
            let start = if args.is_null(0) { 0 } else { args.int(0)? };
            let mut counter = Counter::new(start);
            counter.label = args.str(1)?.to_string();
            Ok(counter)
        })
        .build()
}

fn fast_counter_class() -> ImplementClass<dyn CounterService> {
    ImplementClass::<dyn CounterService>::builder::<FastCounter>()
        .named("FastCounter")
        .constructor([ParamType::Int], |args| {
            Ok(FastCounter {
                count: AtomicI64::new(args.int(0)?),
                title: "fast".to_string(),
                step: 10,
            })
        })
        .build()
}

fn checked_counter_class() -> ImplementClass<dyn CounterService> {
    ImplementClass::<dyn CounterService>::builder::<CheckedCounter>()
        .named("CheckedCounter")
        .constructor([ParamType::Int], |args| {
            Ok(CheckedCounter {
                count: AtomicI64::new(args.int(0)?),
            })
        })
        .build()
}

fn superstitious_counter_class() -> ImplementClass<dyn CounterService> {
    ImplementClass::<dyn CounterService>::builder::<SuperstitiousCounter>()
        .named("SuperstitiousCounter")
        .constructor([ParamType::Int], |args| {
            Ok(SuperstitiousCounter {
                count: AtomicI64::new(args.int(0)?),
            })
        })
        .build()
}

fn reloadable_manager() -> ClassManager<dyn CounterService> {
    let manager = ClassManager::with_proxy(CounterProxy::proxy_class());
    manager.update(counter_class());
    manager
}

fn target_of(proxy: &hermes_core::Proxy<dyn CounterService>) -> Arc<dyn CounterService> {
    proxy.target().unwrap()
}

#[test]
fn test_counter_scenario() {
    let manager = reloadable_manager();
    assert!(manager.is_reloadable());

    let proxy = manager
        .create_registered_instance(&[Value::from(5)])
        .unwrap()
        .into_proxy()
        .unwrap();
    assert_eq!(target_of(&proxy).kind(), "Counter");
    assert_eq!(target_of(&proxy).count(), 5);

    let handle = proxy.downcast::<CounterProxy>().unwrap();
    assert_eq!(handle.increment(), 6);
    assert_eq!(handle.increment(), 7);

    let report = manager.update(fast_counter_class());
    assert_eq!(report.class, "FastCounter");
    assert_eq!(report.swapped, 1);
    assert!(report.is_clean());

    // Same proxy, new backing object, running count carried over
    let target = target_of(&proxy);
    assert_eq!(target.kind(), "FastCounter");
    assert_eq!(target.count(), 7);
    assert_eq!(handle.increment(), 17);
    assert_eq!(handle.calls.load(Ordering::SeqCst), 3);

    // Renamed state key carried the label across
    let state = target.capture_state();
    assert_eq!(state.type_name(), "FastCounter");
    assert_eq!(state.get("title").and_then(Value::as_str), Some("counter"));
}

#[test]
fn test_create_after_update_uses_new_class() {
    let manager = reloadable_manager();
    manager.update(fast_counter_class());

    let instance = manager.create_instance(&[Value::from(1)]).unwrap();
    assert_eq!(instance.target().unwrap().kind(), "FastCounter");

    // Counter's zero-argument constructor is gone with the old class
    assert!(manager.create_instance(&[]).is_none());
    assert_eq!(
        manager.match_constructor(&[]).unwrap_err(),
        MatchError::ArityMismatch {
            class: "FastCounter",
            arity: 0,
        }
    );
}

#[test]
fn test_zero_arity_never_looks_past_first() {
    let manager = reloadable_manager();
    let constructor = manager.match_constructor(&[]).unwrap();
    assert_eq!(constructor.signature(), "()");
    assert_eq!(constructor.class_name(), "Counter");
}

#[test]
fn test_first_assignable_constructor_wins() {
    let manager = reloadable_manager();

    let by_int = manager.match_constructor(&[Value::from(3)]).unwrap();
    assert_eq!(by_int.signature(), "(int)");

    let by_str = manager.match_constructor(&[Value::from("x")]).unwrap();
    assert_eq!(by_str.signature(), "(str)");

    assert!(matches!(
        manager.match_constructor(&[Value::from(1.5)]),
        Err(MatchError::NoAssignableConstructor { .. })
    ));
}

#[test]
fn test_null_argument_policy() {
    let manager = reloadable_manager();

    // A null never matches a plain parameter
    assert!(manager.create_instance(&[Value::Null]).is_none());
    assert!(matches!(
        manager.try_create_instance(&[Value::Null]),
        Err(ManagerError::Match(MatchError::NoAssignableConstructor { .. }))
    ));

    // but is accepted by a nullable one
    let instance = manager
        .create_instance(&[Value::Null, Value::from("named")])
        .unwrap();
    assert_eq!(instance.target().unwrap().count(), 0);

    let instance = manager
        .create_instance(&[Value::from(4), Value::from("named")])
        .unwrap();
    assert_eq!(instance.target().unwrap().count(), 4);
}

#[test]
fn test_proxy_without_set_hook_is_plain() {
    fn get_target(proxy: &ProxyObject) -> Result<Arc<dyn CounterService>, HookError> {
        hermes_core::engine::downcast_proxy::<CounterProxy>(proxy)?
            .reload_target()
            .ok_or(HookError::EmptyTarget { proxy: "CounterProxy" })
    }

    fn new_empty() -> Arc<ProxyObject> {
        Arc::new(CounterProxy::default())
    }

    let class = ProxyClass::<dyn CounterService>::builder("ReadOnlyProxy")
        .get_target(get_target)
        .new_empty(new_empty)
        .build();
    let manager = ClassManager::with_proxy(class);
    manager.update(counter_class());

    assert!(!manager.is_reloadable());
    assert_eq!(manager.mode(), ManagerMode::Plain);
    assert!(manager.proxy_class().is_none());

    let instance = manager.create_registered_instance(&[Value::from(2)]).unwrap();
    assert!(!instance.is_proxied());
    assert_eq!(instance.into_bare().unwrap().count(), 2);
    assert_eq!(manager.registered_count(), 0);

    let report = manager.update(fast_counter_class());
    assert_eq!(report.mode, ManagerMode::Plain);
    assert_eq!(report.visited(), 0);
}

#[test]
fn test_defaulted_proxy_construction() {
    let manager = ClassManager::with_proxy(ProxyClass::defaulted::<CounterProxy>());
    manager.update(counter_class());

    let instance = manager.create_registered_instance(&[Value::from(9)]).unwrap();
    assert!(instance.is_proxied());
    assert_eq!(instance.target().unwrap().count(), 9);

    manager.update(fast_counter_class());
    assert_eq!(instance.target().unwrap().kind(), "FastCounter");
    assert_eq!(instance.target().unwrap().count(), 9);
}

#[test]
fn test_update_is_idempotent() {
    let manager = reloadable_manager();
    let signatures = |manager: &ClassManager<dyn CounterService>| {
        manager
            .implement_class()
            .unwrap()
            .constructors()
            .iter()
            .map(|c| c.signature())
            .collect::<Vec<_>>()
    };

    manager.update(fast_counter_class());
    let first = signatures(&manager);
    let first_match = manager.match_constructor(&[Value::from(1)]).unwrap().signature();

    manager.update(fast_counter_class());
    assert_eq!(signatures(&manager), first);
    assert_eq!(
        manager.match_constructor(&[Value::from(1)]).unwrap().signature(),
        first_match
    );
}

#[test]
fn test_failed_merge_is_isolated() {
    let manager = reloadable_manager();

    let healthy = manager.create_registered_instance(&[Value::from(3)]).unwrap();
    let negative = manager.create_registered_instance(&[Value::from(-4)]).unwrap();
    let other = manager.create_registered_instance(&[Value::from(8)]).unwrap();
    let negative_key = manager.key_of(negative.as_proxy().unwrap()).unwrap();

    let report = manager.update(checked_counter_class());
    assert_eq!(report.swapped, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].key, negative_key);
    assert!(matches!(
        report.failures[0].error,
        ManagerError::Merge(MergeError::Incompatible { .. })
    ));

    assert_eq!(healthy.target().unwrap().kind(), "CheckedCounter");
    assert_eq!(other.target().unwrap().count(), 8);

    // The failed proxy keeps its old backing object
    assert_eq!(negative.target().unwrap().kind(), "Counter");
    assert_eq!(negative.target().unwrap().count(), -4);
}

#[test]
fn test_state_hook_panic_is_isolated() {
    let manager = reloadable_manager();
    let fired = Arc::new(AtomicI64::new(0));
    let sink = Arc::clone(&fired);
    manager.on_swap(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    let unlucky = manager.create_registered_instance(&[Value::from(13)]).unwrap();
    let unlucky_key = manager.key_of(unlucky.as_proxy().unwrap()).unwrap();
    let others: Vec<_> = (0..8)
        .map(|n| manager.create_registered_instance(&[Value::from(n)]).unwrap())
        .collect();

    let report = manager.update(superstitious_counter_class());
    assert_eq!(report.swapped, 8);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].key, unlucky_key);
    assert!(matches!(
        &report.failures[0].error,
        ManagerError::Panicked { message } if message.contains("unlucky count")
    ));
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    for (n, other) in others.iter().enumerate() {
        assert_eq!(other.target().unwrap().kind(), "SuperstitiousCounter");
        assert_eq!(other.target().unwrap().count(), n as i64);
    }
    assert_eq!(unlucky.target().unwrap().kind(), "Counter");
    assert_eq!(unlucky.target().unwrap().count(), 13);
}

#[test]
fn test_failed_rebuild_is_isolated() {
    let manager = reloadable_manager();

    let by_int = manager.create_registered_instance(&[Value::from(1)]).unwrap();
    let by_str = manager.create_registered_instance(&[Value::from("x")]).unwrap();

    let report = manager.update(fast_counter_class());
    assert_eq!(report.swapped, 1);
    assert!(matches!(
        report.failures[0].error,
        ManagerError::Match(MatchError::NoAssignableConstructor { .. })
    ));
    assert_eq!(by_int.target().unwrap().kind(), "FastCounter");
    assert_eq!(by_str.target().unwrap().kind(), "Counter");
}

#[test]
fn test_dropped_proxy_is_not_swept() {
    let manager = reloadable_manager();

    let kept = manager.create_registered_instance(&[Value::from(1)]).unwrap();
    let dropped = manager.create_registered_instance(&[Value::from(2)]).unwrap();
    let weak = Arc::downgrade(dropped.as_proxy().unwrap().object());
    assert_eq!(manager.registered_count(), 2);

    drop(dropped);
    assert!(weak.upgrade().is_none());
    assert_eq!(manager.registered_count(), 1);

    let report = manager.update(fast_counter_class());
    assert_eq!(report.swapped, 1);
    assert_eq!(report.pruned, 1);
    assert_eq!(kept.target().unwrap().kind(), "FastCounter");
}

#[test]
fn test_unregistered_proxy_keeps_old_class() {
    let manager = reloadable_manager();
    let untracked = manager.create_instance(&[Value::from(1)]).unwrap();

    let report = manager.update(fast_counter_class());
    assert_eq!(report.visited(), 0);
    assert_eq!(untracked.target().unwrap().kind(), "Counter");

    // Registering afterwards opts it into the next swap
    manager
        .register(untracked.as_proxy().unwrap(), vec![Value::from(1)])
        .unwrap();
    manager.update(fast_counter_class());
    assert_eq!(untracked.target().unwrap().kind(), "FastCounter");
}

#[test]
fn test_listeners_see_reports() {
    let manager = reloadable_manager();
    let _proxy = manager.create_registered_instance(&[Value::from(1)]).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    manager.on_swap(move |report| {
        sink.lock().unwrap().push((report.class, report.swapped));
    });

    manager.update(fast_counter_class());
    manager.update(counter_class());

    assert_eq!(
        *seen.lock().unwrap(),
        vec![("FastCounter", 1), ("Counter", 1)]
    );
}

#[test]
fn test_constructor_panic_yields_no_instance() {
    let manager = reloadable_manager();
    let exploding = ImplementClass::<dyn CounterService>::builder::<Counter>()
        .named("Exploding")
        .constructor([ParamType::Int], |_| -> Result<Counter, ConstructionError> {
            panic!("constructor exploded")
        })
        .build();

    let proxy = manager.create_registered_instance(&[Value::from(1)]).unwrap();
    let report = manager.update(exploding);

    assert!(manager.create_instance(&[Value::from(1)]).is_none());
    assert!(matches!(
        report.failures[0].error,
        ManagerError::Construction(ConstructionError::Panicked { .. })
    ));
    assert_eq!(proxy.target().unwrap().kind(), "Counter");
}

#[test]
fn test_concurrent_create_and_update() {
    const WORKERS: usize = 4;
    const ROUNDS: usize = 50;

    let manager = Arc::new(reloadable_manager());
    let barrier = Arc::new(Barrier::new(WORKERS + 1));

    let workers: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut proxies = Vec::new();
                for round in 0..ROUNDS {
                    let start = (worker * ROUNDS + round) as i64;
                    let instance = manager
                        .create_registered_instance(&[Value::from(start)])
                        .unwrap();
                    let kind = instance.target().unwrap().kind();
                    assert!(kind == "Counter" || kind == "FastCounter");
                    proxies.push(instance);
                }
                proxies
            })
        })
        .collect();

    barrier.wait();
    for round in 0..ROUNDS {
        if round % 2 == 0 {
            manager.update(fast_counter_class());
        } else {
            manager.update(counter_class());
        }
    }

    let proxies: Vec<_> = workers
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();

    // One quiet sweep moves everything onto the final class
    let report = manager.update(fast_counter_class());
    assert!(report.is_clean());
    assert_eq!(report.swapped, WORKERS * ROUNDS);
    for proxy in &proxies {
        assert_eq!(proxy.target().unwrap().kind(), "FastCounter");
    }
}
