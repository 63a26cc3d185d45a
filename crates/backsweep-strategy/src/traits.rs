//! The strategy lifecycle contract.

use backsweep_sampler::ParamAssignment;
use indexmap::IndexMap;

/// Context passed to every lifecycle hook. Currently empty — it exists so
/// the trait's shape has room to grow (e.g. a clock or a logger handle)
/// without a breaking signature change.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrategyContext;

/// Per-instance results returned after the stream exhausts.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StrategyStats {
    pub name: String,
    pub roi: f64,
    pub trades: u64,
    /// Strategy-specific metrics beyond the required `roi`/`trades` pair
    /// (`max_dd`, `sharpe`, `pnl`, and echoed parameter values).
    pub extra: IndexMap<String, f64>,
}

impl StrategyStats {
    pub fn new(name: impl Into<String>, roi: f64, trades: u64) -> Self {
        Self {
            name: name.into(),
            roi,
            trades,
            extra: IndexMap::new(),
        }
    }

    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Lifecycle every strategy implements. The executor calls these in order:
/// `set_params` once, then `on_start`, then `on_ticks` once per batch, then
/// `on_finish`, then `get_stats`.
///
/// Deliberately infallible: a strategy signals a defect by panicking, which
/// the executor converts into a typed error at the call site rather than
/// threading a `Result` through every hook.
pub trait Strategy: Send {
    fn set_params(&mut self, params: &ParamAssignment);
    fn on_start(&mut self, ctx: &StrategyContext);
    /// `symbol_id` is the batch's raw symbol/venue column, passed through
    /// unscaled. Single-asset strategies ignore it; multi-venue strategies
    /// (e.g. cross-venue arbitrage) resolve it against their own venue table.
    fn on_ticks(
        &mut self,
        prices: &[f64],
        qtys: &[f64],
        sides: &[i8],
        symbol_id: &[i64],
        ctx: &StrategyContext,
    );
    fn on_finish(&mut self, ctx: &StrategyContext);
    fn get_stats(&self) -> StrategyStats;
}
