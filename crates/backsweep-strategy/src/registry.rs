//! Process-wide, insertion-ordered strategy registry.
//!
//! Rust has no import-side-effect module discovery, so registration is
//! explicit: `backsweep-strategies::register_all()` calls [`register`] once
//! per strategy at process startup rather than relying on each strategy
//! module registering itself as a side effect of being loaded.

use std::sync::Mutex;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::traits::Strategy;

/// Constructs a fresh, default-parameterized strategy instance.
pub type StrategyCtor = fn() -> Box<dyn Strategy>;

static REGISTRY: Lazy<Mutex<IndexMap<String, StrategyCtor>>> =
    Lazy::new(|| Mutex::new(IndexMap::new()));

/// Register `ctor` under `name`. Re-registering an existing name overwrites
/// its constructor.
pub fn register(name: &str, ctor: StrategyCtor) {
    let mut registry = REGISTRY.lock().expect("strategy registry poisoned");
    if registry.insert(name.to_string(), ctor).is_some() {
        tracing::debug!(name, "overwrote existing strategy registration");
    } else {
        tracing::debug!(name, "registered strategy");
    }
}

/// Look up the constructor registered under `name`.
pub fn get(name: &str) -> Option<StrategyCtor> {
    let registry = REGISTRY.lock().expect("strategy registry poisoned");
    registry.get(name).copied()
}

/// Names currently registered, in registration order.
pub fn names() -> Vec<String> {
    let registry = REGISTRY.lock().expect("strategy registry poisoned");
    registry.keys().cloned().collect()
}
