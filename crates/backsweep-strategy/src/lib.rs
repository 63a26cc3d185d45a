//! Strategy lifecycle contract, shared economics, and process-wide registry.

pub mod base;
pub mod registry;
pub mod traits;

pub use base::BaseBook;
pub use registry::{register, StrategyCtor};
pub use traits::{Strategy, StrategyContext, StrategyStats};
