//! Reference strategies and the explicit strategy-registration entry point.

pub mod arbitrage;
pub mod bollinger_reversion;
pub mod ofi_momentum;

pub use arbitrage::CrossVenueArbitrage;
pub use bollinger_reversion::BollingerReversion;
pub use ofi_momentum::OfiMomentum;

/// Registers every reference strategy under its canonical name.
///
/// Rust has no import-side-effect module discovery, so this is the single
/// explicit entry point a binary calls once at startup in place of scanning
/// a `strategies/` package for self-registering modules.
pub fn register_all() {
    backsweep_strategy::register("ofi_momentum", OfiMomentum::boxed);
    backsweep_strategy::register("bollinger_reversion", BollingerReversion::boxed);
    backsweep_strategy::register("cross_venue_arbitrage", CrossVenueArbitrage::boxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_all_populates_the_three_reference_strategies() {
        register_all();
        for name in ["ofi_momentum", "bollinger_reversion", "cross_venue_arbitrage"] {
            assert!(
                backsweep_strategy::registry::get(name).is_some(),
                "missing registration for {name}"
            );
        }
    }
}
