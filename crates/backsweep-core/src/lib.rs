//! Core data model for the backsweep parameter-sweep backtesting engine.
//!
//! Provides the fixed-point codec, the canonical tick batch schema, and the
//! performance metrics shared by every other crate in the workspace.

pub mod batch;
pub mod fixed_point;
pub mod metrics;

pub use batch::{BatchError, TickBatch, TickBatchBuilder};
pub use fixed_point::{to_fixed, to_real, FixedPoint, SCALE};
