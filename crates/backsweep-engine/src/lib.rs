//! Multi-strategy fan-out executor.
//!
//! [`run_experiment`] amortizes one pass over a tick stream across N strategy
//! instances: every batch's columns are decoded from fixed-point exactly
//! once and the resulting read-only views are handed to every strategy in
//! instantiation order, so total work is `O(stream_length + N * batch_count *
//! strategy_cost)` rather than `O(N * stream_length * per_row_cost)`.

use std::panic::{catch_unwind, AssertUnwindSafe};

use backsweep_config::ExperimentConfig;
use backsweep_io::{CsvTickStreamer, IoError, DEFAULT_BATCH_SIZE};
use backsweep_sampler::{sample, SamplerError};
use backsweep_strategy::{registry, Strategy, StrategyContext, StrategyStats};
use thiserror::Error;

/// Which lifecycle hook a strategy was in when it panicked
/// (`on_start`/`on_ticks`/`on_finish`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyPhase {
    OnStart,
    OnTicks,
    OnFinish,
}

impl std::fmt::Display for StrategyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StrategyPhase::OnStart => "on_start",
            StrategyPhase::OnTicks => "on_ticks",
            StrategyPhase::OnFinish => "on_finish",
        };
        write!(f, "{s}")
    }
}

/// Errors raised while running an experiment.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("strategy {0:?} is not registered")]
    UnknownStrategy(String),
    #[error(transparent)]
    Sampler(#[from] SamplerError),
    #[error(transparent)]
    Io(#[from] IoError),
    /// A strategy callback panicked. Fatal to the whole run: partial results
    /// are discarded: a run either fully succeeds or reports nothing.
    #[error("strategy {name:?} failed in {phase}: {message}")]
    Strategy {
        name: String,
        phase: StrategyPhase,
        message: String,
    },
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "strategy callback panicked with a non-string payload".to_string()
    }
}

/// One instance under management by the executor: its instantiation label
/// (`Config_<i>`) alongside the boxed strategy itself.
struct Instance {
    label: String,
    strategy: Box<dyn Strategy>,
}

/// Run a single experiment to completion: resolve the strategy, sample its
/// parameter space, stream the tick data once, and collect each instance's
/// stats in instantiation order.
pub fn run_experiment(config: &ExperimentConfig) -> Result<Vec<StrategyStats>, EngineError> {
    let ctor = registry::get(&config.strategy)
        .ok_or_else(|| EngineError::UnknownStrategy(config.strategy.clone()))?;

    let assignments = sample(&config.parameters, &config.optimization.to_sampler_config())?;
    tracing::info!(
        strategy = %config.strategy,
        count = assignments.len(),
        "sampled parameter assignments"
    );

    let ctx = StrategyContext;
    let mut instances = Vec::with_capacity(assignments.len());
    for (i, assignment) in assignments.iter().enumerate() {
        let label = format!("Config_{i}");
        let mut strategy = ctor();
        strategy.set_params(assignment);
        catch_unwind(AssertUnwindSafe(|| strategy.on_start(&ctx))).map_err(|payload| {
            EngineError::Strategy {
                name: label.clone(),
                phase: StrategyPhase::OnStart,
                message: panic_message(payload),
            }
        })?;
        instances.push(Instance { label, strategy });
    }

    let streamer = CsvTickStreamer::with_batch_size(&config.data.path, DEFAULT_BATCH_SIZE)?;
    let mut batches = 0u64;
    for batch in streamer {
        let batch = batch?;
        batches += 1;
        let prices = batch.decode_prices();
        let qtys = batch.decode_qtys();
        let sides = batch.sides();
        let symbol_id = batch.symbol_id();

        for instance in &mut instances {
            let strategy = &mut instance.strategy;
            catch_unwind(AssertUnwindSafe(|| {
                strategy.on_ticks(&prices, &qtys, sides, symbol_id, &ctx)
            }))
            .map_err(|payload| EngineError::Strategy {
                name: instance.label.clone(),
                phase: StrategyPhase::OnTicks,
                message: panic_message(payload),
            })?;
        }
    }
    tracing::info!(batches, "stream exhausted");

    for instance in &mut instances {
        let strategy = &mut instance.strategy;
        catch_unwind(AssertUnwindSafe(|| strategy.on_finish(&ctx))).map_err(|payload| {
            EngineError::Strategy {
                name: instance.label.clone(),
                phase: StrategyPhase::OnFinish,
                message: panic_message(payload),
            }
        })?;
    }

    Ok(instances
        .iter()
        .map(|instance| {
            let mut stats = instance.strategy.get_stats();
            stats.name = instance.label.clone();
            stats
        })
        .collect())
}

/// Run many independent experiments concurrently. Embarrassingly parallel
/// each experiment owns its own strategy instances and
/// stream, so there is no shared mutable state across the fan-out — only
/// the single-pass fan-out *within* a run stays single-threaded.
pub fn run_experiments_parallel(
    configs: &[ExperimentConfig],
) -> Vec<Result<Vec<StrategyStats>, EngineError>> {
    use rayon::prelude::*;
    configs.par_iter().map(run_experiment).collect()
}
