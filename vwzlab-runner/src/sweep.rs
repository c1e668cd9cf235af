//! Parameter sweeps over exit rates, z-score period and condition pairs.
//!
//! Every configuration replays the same pre-loaded bars, so a sweep costs
//! one load and N engine runs. Runs are independent and execute on the
//! rayon pool unless parallelism is switched off.

use anyhow::Result;
use rayon::prelude::*;
use std::collections::HashMap;

use vwzlab_core::config::StrategyConfig;
use vwzlab_core::Bar;

use crate::config::{strategy_run_id, DataConfig};
use crate::runner::{run_on_bars, RunReport};

/// Values to sweep. An empty axis keeps the base config's value.
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    pub take_profit_rates: Vec<f64>,
    pub stop_loss_rates: Vec<f64>,
    pub zscore_periods: Vec<usize>,
    /// `(long_condition, short_condition)` name pairs.
    pub condition_pairs: Vec<(String, String)>,
}

impl ParamGrid {
    /// Exit rates 0.5/1/2 % on both sides with the base conditions.
    pub fn exit_rates_default() -> Self {
        Self {
            take_profit_rates: vec![0.005, 0.01, 0.02],
            stop_loss_rates: vec![0.005, 0.01, 0.02],
            ..Self::default()
        }
    }

    /// Number of grid points, invalid combinations included.
    pub fn size(&self) -> usize {
        self.take_profit_rates.len().max(1)
            * self.stop_loss_rates.len().max(1)
            * self.zscore_periods.len().max(1)
            * self.condition_pairs.len().max(1)
    }

    /// Every valid configuration in the grid, in axis order.
    pub fn generate_configs(&self, base: &StrategyConfig) -> Vec<StrategyConfig> {
        let tps = axis(&self.take_profit_rates, base.exit.take_profit_rate);
        let sls = axis(&self.stop_loss_rates, base.exit.stop_loss_rate);
        let periods = axis(&self.zscore_periods, base.indicators.zscore_period);
        let pairs = axis(
            &self.condition_pairs,
            (base.entry.long_condition.clone(), base.entry.short_condition.clone()),
        );

        let mut configs = Vec::with_capacity(self.size());
        for &tp in &tps {
            for &sl in &sls {
                for &period in &periods {
                    for (long, short) in &pairs {
                        let mut config = base.clone();
                        config.exit.take_profit_rate = tp;
                        config.exit.stop_loss_rate = sl;
                        config.indicators.zscore_period = period;
                        config.entry.long_condition = long.clone();
                        config.entry.short_condition = short.clone();

                        if let Err(err) = config.validate() {
                            tracing::debug!(%err, "skipping invalid grid point");
                            continue;
                        }
                        configs.push(config);
                    }
                }
            }
        }
        configs
    }
}

fn axis<T: Clone>(values: &[T], base: T) -> Vec<T> {
    if values.is_empty() {
        vec![base]
    } else {
        values.to_vec()
    }
}

/// Runs every configuration of a grid, optionally in parallel.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run the grid over `bars`. `data` only feeds the run ids.
    ///
    /// The first failing configuration aborts the sweep.
    pub fn sweep(
        &self,
        bars: &[Bar],
        data: &DataConfig,
        grid: &ParamGrid,
        base: &StrategyConfig,
    ) -> Result<SweepResults> {
        self.sweep_with_progress(bars, data, grid, base, |_, _, _| {})
    }

    /// Like [`sweep`](Self::sweep), calling `progress(index, total, report)`
    /// after each run. Under parallel execution calls arrive out of order.
    pub fn sweep_with_progress<F>(
        &self,
        bars: &[Bar],
        data: &DataConfig,
        grid: &ParamGrid,
        base: &StrategyConfig,
        progress: F,
    ) -> Result<SweepResults>
    where
        F: Fn(usize, usize, &RunReport) + Send + Sync,
    {
        let configs = grid.generate_configs(base);
        let total = configs.len();
        tracing::info!(configs = total, bars = bars.len(), parallel = self.parallel, "starting sweep");

        let run = |(idx, config): (usize, &StrategyConfig)| -> Result<RunReport> {
            let report = run_on_bars(bars, config, strategy_run_id(data, config))?;
            progress(idx, total, &report);
            Ok(report)
        };

        let reports: Vec<RunReport> = if self.parallel {
            configs
                .par_iter()
                .enumerate()
                .map(run)
                .collect::<Result<Vec<_>>>()?
        } else {
            configs
                .iter()
                .enumerate()
                .map(run)
                .collect::<Result<Vec<_>>>()?
        };

        Ok(SweepResults::new(reports))
    }
}

/// Reports from a sweep, in grid order.
#[derive(Debug)]
pub struct SweepResults {
    reports: Vec<RunReport>,
    by_run_id: HashMap<String, usize>,
}

impl SweepResults {
    fn new(reports: Vec<RunReport>) -> Self {
        let by_run_id = reports
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.run_id.clone(), idx))
            .collect();
        Self { reports, by_run_id }
    }

    pub fn all(&self) -> &[RunReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn get(&self, run_id: &str) -> Option<&RunReport> {
        self.by_run_id.get(run_id).map(|&idx| &self.reports[idx])
    }

    /// Descending by fitness; ties keep grid order.
    pub fn sorted_by_fitness(&self) -> Vec<&RunReport> {
        let mut sorted: Vec<_> = self.reports.iter().collect();
        sorted.sort_by(|a, b| {
            b.statistics
                .fitness()
                .partial_cmp(&a.statistics.fitness())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    pub fn top_n(&self, n: usize) -> Vec<&RunReport> {
        self.sorted_by_fitness().into_iter().take(n).collect()
    }

    pub fn best(&self) -> Option<&RunReport> {
        self.sorted_by_fitness().into_iter().next()
    }
}
