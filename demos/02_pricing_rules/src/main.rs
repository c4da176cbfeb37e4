//! # Pricing Rules Demo
//!
//! A checkout service quotes prices through a proxy. Editing `pricing.toml`
//! and calling `update` switches the rule behind every quote handle while the
//! number of quotes served carries over.
//!
//! ## Features Demonstrated
//! - Constructor arguments recorded at registration and replayed on swap
//! - Float parameters and overload resolution by argument type
//! - `CoreConfig` plus a demo-specific TOML file

mod config;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use hermes_core::{
    ClassManager, CoreConfig, ImplementClass, ParamType, ReloadProxy, Reloadable, TargetCell,
    Value,
};
use tracing::info;

use config::{PricingConfig, RuleKind};

pub trait PricingRule: Reloadable {
    fn quote(&self, base: f64) -> f64;
}

#[derive(Reloadable)]
#[reload(implements = "dyn PricingRule")]
pub struct FlatDiscount {
    amount: f64,

    #[reload(state)]
    served: AtomicU64,
}

impl PricingRule for FlatDiscount {
    fn quote(&self, base: f64) -> f64 {
        self.served.fetch_add(1, Ordering::Relaxed);
        (base - self.amount).max(0.0)
    }
}

#[derive(Reloadable)]
#[reload(implements = "dyn PricingRule")]
pub struct PercentageDiscount {
    percent: f64,

    #[reload(state)]
    served: AtomicU64,
}

impl PricingRule for PercentageDiscount {
    fn quote(&self, base: f64) -> f64 {
        self.served.fetch_add(1, Ordering::Relaxed);
        base * (1.0 - self.percent / 100.0)
    }
}

#[derive(ReloadProxy)]
pub struct Checkout {
    #[proxy(target)]
    rule: TargetCell<dyn PricingRule>,
}

fn rule_class(config: &PricingConfig) -> ImplementClass<dyn PricingRule> {
    let amount = config.amount;
    match config.rule {
        RuleKind::Flat => ImplementClass::<dyn PricingRule>::builder::<FlatDiscount>()
            .named("FlatDiscount")
            .constructor([ParamType::Float], |args| {
                Ok(FlatDiscount {
                    amount: args.float(0)?,
                    served: AtomicU64::new(0),
                })
            })
            .constructor([], move |_| {
                Ok(FlatDiscount {
                    amount,
                    served: AtomicU64::new(0),
                })
            })
            .build(),
        RuleKind::Percentage => ImplementClass::<dyn PricingRule>::builder::<PercentageDiscount>()
            .named("PercentageDiscount")
            .constructor([], move |_| {
                Ok(PercentageDiscount {
                    percent: amount,
                    served: AtomicU64::new(0),
                })
            })
            .build(),
    }
}

fn main() -> hermes_core::ConfigResult<()> {
    let core = CoreConfig::load().unwrap_or_default();
    hermes_core::logging::init(&core);

    let path = PathBuf::from("pricing.toml");
    let mut pricing = PricingConfig::load_from(&path)?;

    let manager = ClassManager::with_proxy(Checkout::proxy_class()).with_config(&core);
    manager.update(rule_class(&pricing));

    let Some(checkout) = manager.create_registered_instance(&[]) else {
        tracing::error!("No pricing rule accepts an empty argument list");
        return Ok(());
    };

    for base in [20.0, 50.0] {
        let rule = checkout.target().map_err(|e| std::io::Error::other(e.to_string()))?;
        info!("{} -> {:.2}", base, rule.quote(base));
    }

    pricing.rule = match pricing.rule {
        RuleKind::Flat => RuleKind::Percentage,
        RuleKind::Percentage => RuleKind::Flat,
    };
    pricing.save_to(&path)?;

    let report = manager.update(rule_class(&PricingConfig::load_from(&path)?));
    info!("Switched rule: {}", report);

    let rule = checkout.target().map_err(|e| std::io::Error::other(e.to_string()))?;
    info!("{} -> {:.2}", 50.0, rule.quote(50.0));
    info!(
        "Quotes served across both rules: {:?}",
        rule.capture_state().get("served").and_then(Value::as_int)
    );
    Ok(())
}
