//! Console table and JSON report writer.
//!
//! `Reporter` prints a ranked console table sorted by ROI descending, then
//! writes a `{experiment_id, timestamp, results}` JSON document under
//! `reports/<experiment_id>/results.json`.

use std::fs;
use std::path::{Path, PathBuf};

use backsweep_strategy::StrategyStats;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use thiserror::Error;

/// Widest a console-printed strategy name is allowed to get before being
/// truncated with an ellipsis.
const MAX_NAME_WIDTH: usize = 25;

/// How many top-ranked rows the console table prints.
const CONSOLE_TOP_N: usize = 15;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write report file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    experiment_id: &'a str,
    timestamp: String,
    results: &'a [StrategyStats],
}

pub struct Reporter {
    experiment_id: String,
    report_dir: PathBuf,
}

impl Reporter {
    pub fn new(experiment_id: impl Into<String>) -> Self {
        Self::with_base_dir(experiment_id, "reports")
    }

    pub fn with_base_dir(experiment_id: impl Into<String>, base_dir: impl AsRef<Path>) -> Self {
        let experiment_id = experiment_id.into();
        let report_dir = base_dir.as_ref().join(&experiment_id);
        Self {
            experiment_id,
            report_dir,
        }
    }

    /// Print a ranked console table of the top [`CONSOLE_TOP_N`] results,
    /// sorted by ROI descending.
    pub fn print_console(&self, results: &[StrategyStats]) {
        if results.is_empty() {
            println!("No results to report.");
            return;
        }

        let mut ranked: Vec<&StrategyStats> = results.iter().collect();
        ranked.sort_by(|a, b| b.roi.partial_cmp(&a.roi).unwrap_or(std::cmp::Ordering::Equal));

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["RANK", "STRATEGY", "ROI", "MAX DD", "SHARPE", "TRADES"]);

        for (i, stats) in ranked.iter().take(CONSOLE_TOP_N).enumerate() {
            let mut name = stats.name.clone();
            if name.len() > MAX_NAME_WIDTH {
                name.truncate(MAX_NAME_WIDTH - 3);
                name.push_str("...");
            }
            let max_dd = stats.extra.get("max_dd").copied().unwrap_or(0.0);
            let sharpe = stats.extra.get("sharpe").copied().unwrap_or(0.0);
            table.add_row(vec![
                Cell::new(format!("#{}", i + 1)),
                Cell::new(name),
                Cell::new(format!("{:.2}%", stats.roi)),
                Cell::new(format!("{max_dd:.2}%")),
                Cell::new(format!("{sharpe:.2}")),
                Cell::new(stats.trades.to_string()),
            ]);
        }

        println!("{table}");

        if let Some(best) = ranked.first() {
            println!("\nWINNER: {} -> ROI: {:.2}%", best.name, best.roi);
        }
    }

    /// Write `reports/<experiment_id>/results.json`.
    pub fn save_json(&self, results: &[StrategyStats], now_iso8601: &str) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.report_dir).map_err(|source| ReportError::CreateDir {
            path: self.report_dir.clone(),
            source,
        })?;
        let path = self.report_dir.join("results.json");
        let document = ReportDocument {
            experiment_id: &self.experiment_id,
            timestamp: now_iso8601.to_string(),
            results,
        };
        let body = serde_json::to_string_pretty(&document)?;
        fs::write(&path, body).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn make_stats(name: &str, roi: f64, trades: u64) -> StrategyStats {
        let mut extra = IndexMap::new();
        extra.insert("max_dd".to_string(), 1.5);
        extra.insert("sharpe".to_string(), 0.3);
        StrategyStats {
            name: name.to_string(),
            roi,
            trades,
            extra,
        }
    }

    #[test]
    fn save_json_writes_expected_shape() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::with_base_dir("test-experiment", dir.path());
        let results = vec![make_stats("Config_0", 5.0, 3), make_stats("Config_1", -1.0, 1)];
        let path = reporter.save_json(&results, "2026-07-26T00:00:00Z").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();

        assert_eq!(parsed["experiment_id"], "test-experiment");
        assert_eq!(parsed["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn empty_results_does_not_panic() {
        let reporter = Reporter::new("empty");
        reporter.print_console(&[]);
    }
}
