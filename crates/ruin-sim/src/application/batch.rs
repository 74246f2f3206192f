//! Batch runs
//!
//! Runs one configuration under many seeds and summarises how often each
//! exchange explodes and what each trader ends up with.
//!
//! ## Metrics
//! - Explosion frequency and mean death step per exchange
//! - Mean terminal wealth per trader
//! - Pooled terminal wealth percentiles (5%, 50%, 95%)

use super::SimulationConfig;
use super::simulation::Simulation;
use crate::error::{ConfigError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub runs: usize,
    /// Risk parameter per exchange
    pub z: Vec<f64>,
    /// Fraction of runs in which each exchange exploded
    pub explosion_frequency: Vec<f64>,
    /// Mean death step per exchange over the runs where it exploded
    pub mean_death_step: Vec<Option<f64>>,
    /// Mean terminal wealth per trader
    pub mean_final_wealth: Vec<f64>,
    pub wealth_p05: f64,
    pub wealth_p50: f64,
    pub wealth_p95: f64,
}

impl BatchSummary {
    pub fn print(&self) {
        println!("  Runs:                    {}", self.runs);
        println!("  Terminal wealth p05:     {:.4}", self.wealth_p05);
        println!("  Terminal wealth p50:     {:.4}", self.wealth_p50);
        println!("  Terminal wealth p95:     {:.4}", self.wealth_p95);
        println!();
        println!("  | Exchange |     z | P(explode) | Mean death step |");
        println!("  |----------|-------|------------|-----------------|");
        for (i, freq) in self.explosion_frequency.iter().enumerate() {
            let death = self.mean_death_step[i]
                .map(|d| format!("{:.0}", d))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  | {:>8} | {:.3} | {:>9.1}% | {:>15} |",
                format!("E{}", i),
                self.z[i],
                freq * 100.0,
                death
            );
        }
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Run `config` once per seed, overriding `config.seed`
pub fn run_batch(
    config: &SimulationConfig,
    seeds: impl IntoIterator<Item = u64>,
) -> Result<BatchSummary> {
    config.validate()?;

    let n_exchanges = config.num_exchanges;
    let n_traders = config.num_traders;
    let mut explosions = vec![0usize; n_exchanges];
    let mut death_sums = vec![0.0f64; n_exchanges];
    let mut wealth_sums = vec![0.0f64; n_traders];
    let mut pooled = Vec::new();
    let mut runs = 0usize;

    for seed in seeds {
        let history = Simulation::new(SimulationConfig {
            seed: Some(seed),
            ..config.clone()
        })?
        .run()?;

        for (i, exchange) in history.exchanges.iter().enumerate() {
            if let Some(step) = exchange.death_step {
                explosions[i] += 1;
                death_sums[i] += step as f64;
            }
        }
        for (i, wealth) in history.final_wealth().into_iter().enumerate() {
            wealth_sums[i] += wealth;
            pooled.push(wealth);
        }

        runs += 1;
        debug!("Batch run {} (seed {}) complete", runs, seed);
    }

    if runs == 0 {
        return Err(ConfigError::InvalidCount {
            field: "batch seeds",
            value: 0,
        }
        .into());
    }

    pooled.sort_by(|a, b| a.total_cmp(b));

    let summary = BatchSummary {
        runs,
        z: config.z_values(),
        explosion_frequency: explosions.iter().map(|&c| c as f64 / runs as f64).collect(),
        mean_death_step: explosions
            .iter()
            .zip(&death_sums)
            .map(|(&c, &sum)| (c > 0).then(|| sum / c as f64))
            .collect(),
        mean_final_wealth: wealth_sums.iter().map(|s| s / runs as f64).collect(),
        wealth_p05: percentile(&pooled, 0.05),
        wealth_p50: percentile(&pooled, 0.50),
        wealth_p95: percentile(&pooled, 0.95),
    };

    info!(
        "Batch of {} runs finished: median terminal wealth {:.4}",
        runs, summary.wealth_p50
    );
    Ok(summary)
}
