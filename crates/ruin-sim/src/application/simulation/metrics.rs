use super::History;
use crate::domain::TraderId;
use serde::{Deserialize, Serialize};

/// Simulation metrics aggregated over a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    /// Total steps processed
    pub total_steps: u64,
    /// Exchanges that exploded
    pub explosions: usize,
    /// Exchanges alive at the end
    pub surviving_exchanges: usize,
    /// Traders whose every exchange exploded
    pub ruined_traders: usize,
    pub mean_final_wealth: f64,
    pub min_final_wealth: f64,
    pub max_final_wealth: f64,
    /// Mean of (final - initial) wealth
    pub mean_excess_return: f64,
}

impl SimulationMetrics {
    pub fn from_history(history: &History) -> Self {
        let finals = history.final_wealth();
        let n = finals.len().max(1) as f64;

        let explosions = history
            .exchanges
            .iter()
            .filter(|e| e.death_step.is_some())
            .count();

        let last_step = history.steps.saturating_sub(1);
        let ruined_traders = if history.steps == 0 {
            0
        } else {
            history
                .traders
                .iter()
                .filter(|t| history.is_ruined_at(t.id, last_step))
                .count()
        };

        let excess: f64 = history
            .traders
            .iter()
            .map(|t| t.final_wealth() - t.initial_wealth)
            .sum();

        Self {
            total_steps: history.steps,
            explosions,
            surviving_exchanges: history.exchanges.len() - explosions,
            ruined_traders,
            mean_final_wealth: finals.iter().sum::<f64>() / n,
            min_final_wealth: finals.iter().cloned().fold(f64::INFINITY, f64::min),
            max_final_wealth: finals.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            mean_excess_return: excess / n,
        }
    }

    /// Trader with the highest final wealth
    pub fn best_trader(history: &History) -> Option<TraderId> {
        history
            .traders
            .iter()
            .max_by(|a, b| a.final_wealth().total_cmp(&b.final_wealth()))
            .map(|t| t.id)
    }
}
