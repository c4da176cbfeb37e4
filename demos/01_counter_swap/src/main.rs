//! # Counter Swap Demo
//!
//! Creates a few counters behind proxies, bumps them, then installs
//! `FastCounter`. Every proxy keeps its identity and its running count while
//! the implementation behind it changes.
//!
//! ## Features Demonstrated
//! - `#[derive(Reloadable)]` with `#[reload(state)]` fields
//! - `#[derive(ReloadProxy)]` and the generated `proxy_class()`
//! - `ClassManager::update` and its `SwapReport`
//! - Swap listeners
//!
//! Run with `RUST_LOG=debug cargo run -p counter_swap` for the manager's logs.

use std::sync::atomic::{AtomicI64, Ordering};

use hermes_core::{
    ClassManager, CoreConfig, ImplementClass, ParamType, ReloadProxy, Reloadable, TargetCell,
    Value,
};
use tracing::info;

pub trait CounterService: Reloadable {
    fn increment(&self) -> i64;
    fn describe(&self) -> String;
}

#[derive(Reloadable)]
#[reload(implements = "dyn CounterService")]
pub struct Counter {
    #[reload(state)]
    count: AtomicI64,
}

impl CounterService for Counter {
    fn increment(&self) -> i64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn describe(&self) -> String {
        format!("Counter({})", self.count.load(Ordering::SeqCst))
    }
}

#[derive(Reloadable)]
#[reload(implements = "dyn CounterService")]
pub struct FastCounter {
    #[reload(state)]
    count: AtomicI64,

    step: i64,
}

impl CounterService for FastCounter {
    fn increment(&self) -> i64 {
        self.count.fetch_add(self.step, Ordering::SeqCst) + self.step
    }

    fn describe(&self) -> String {
        format!(
            "FastCounter({}, step {})",
            self.count.load(Ordering::SeqCst),
            self.step
        )
    }
}

#[derive(ReloadProxy)]
pub struct CounterProxy {
    #[proxy(target)]
    target: TargetCell<dyn CounterService>,
}

impl CounterProxy {
    fn increment(&self) -> i64 {
        self.target.get().map_or(0, |target| target.increment())
    }

    fn describe(&self) -> String {
        self.target
            .get()
            .map_or_else(|| "<empty>".to_string(), |target| target.describe())
    }
}

fn counter_class() -> ImplementClass<dyn CounterService> {
    ImplementClass::<dyn CounterService>::builder::<Counter>()
        .named("Counter")
        .constructor([], |_| Ok(Counter { count: AtomicI64::new(0) }))
        .constructor([ParamType::Int], |args| {
            Ok(Counter {
                count: AtomicI64::new(args.int(0)?),
            })
        })
        .build()
}

fn fast_counter_class() -> ImplementClass<dyn CounterService> {
    ImplementClass::<dyn CounterService>::builder::<FastCounter>()
        .named("FastCounter")
        .constructor([ParamType::Int], |args| {
            Ok(FastCounter {
                count: AtomicI64::new(args.int(0)?),
                step: 10,
            })
        })
        .build()
}

fn main() {
    let config = CoreConfig::load().unwrap_or_default();
    hermes_core::logging::init(&config);

    let manager =
        ClassManager::with_proxy(CounterProxy::proxy_class()).with_config(&config);
    manager.on_swap(|report| info!("Swap finished: {}", report));
    manager.update(counter_class());

    let counters: Vec<_> = (0..3)
        .filter_map(|i| manager.create_registered_instance(&[Value::from(i * 5)]))
        .filter_map(|instance| instance.into_proxy()?.downcast::<CounterProxy>())
        .collect();

    for counter in &counters {
        counter.increment();
        counter.increment();
        info!("Before swap: {}", counter.describe());
    }

    let report = manager.update(fast_counter_class());
    if !report.is_clean() {
        for failure in &report.failures {
            tracing::warn!("Proxy {:?} kept its old counter: {}", failure.key, failure.error);
        }
    }

    for counter in &counters {
        counter.increment();
        info!("After swap: {}", counter.describe());
    }
}
