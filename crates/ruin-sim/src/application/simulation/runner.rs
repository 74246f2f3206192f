//! Simulation Runner
//!
//! The step loop that resolves exchanges and applies their outcomes to
//! traders.

use super::{History, SimulationMetrics};
use crate::application::SimulationConfig;
use crate::domain::{
    Allocation, AllocationPolicy, Exchange, ExchangeId, Outcome, Trader, TraderId,
};
use crate::error::{ConfigError, Result, SimError};
use log::{info, trace};
use rand::prelude::*;
use rand_distr::{Distribution, Normal};

/// Result of a single step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Step number
    pub step: u64,
    /// Exchanges that exploded on this step
    pub explosions: usize,
    /// Exchanges still alive after this step
    pub alive_exchanges: usize,
    /// Sum of all trader wealth after this step
    pub total_wealth: f64,
}

/// One run of the simulation
///
/// Exchanges, traders and the per-step outcome buffer are fixed-size and
/// indexed by id. The generator is owned by the run and drawn in exchange
/// order, so a seeded run is reproducible.
pub struct Simulation<R: Rng = StdRng> {
    config: SimulationConfig,
    exchanges: Vec<Exchange>,
    traders: Vec<Trader>,
    outcomes: Vec<Outcome>,
    noise: Option<Normal<f64>>,
    rng: R,
    step: u64,
}

impl Simulation<StdRng> {
    /// Create a simulation seeded from `config.seed`
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Simulation<R> {
    /// Create a simulation drawing from the given generator
    pub fn with_rng(config: SimulationConfig, rng: R) -> Result<Self> {
        let policy = config.allocation.clone();
        Self::with_policy(config, &policy, rng)
    }

    /// Create a simulation with a custom allocation policy
    pub fn with_policy(
        config: SimulationConfig,
        policy: &dyn AllocationPolicy,
        rng: R,
    ) -> Result<Self> {
        config.validate()?;

        let model = config.risk_model()?;
        let exchanges = config
            .z_values()
            .into_iter()
            .enumerate()
            .map(|(i, z)| Exchange::new(ExchangeId(i), z, &model))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let bet_size = config.bet_size();
        let steps = usize::try_from(config.num_steps).map_err(|_| ConfigError::CountTooLarge {
            field: "num_steps",
            value: config.num_steps,
            max: usize::MAX as u64,
        })?;
        let traders = (0..config.num_traders)
            .map(|i| -> std::result::Result<Trader, ConfigError> {
                let allocation =
                    policy.allocate(i, config.num_exchanges, config.bets_per_trader)?;
                check_allocation(&allocation, i, &config, policy)?;
                Ok(
                    Trader::new(TraderId(i), allocation, bet_size, config.explosion_loss)
                        .with_capacity(steps),
                )
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let noise = config
            .return_noise
            .map(|n| {
                Normal::new(n.mean, n.std_dev).map_err(|_| ConfigError::InvalidParameter {
                    field: "return_noise.std_dev",
                    value: n.std_dev,
                    reason: "not a valid normal distribution",
                })
            })
            .transpose()?;

        info!(
            "Simulation ready: {} exchanges, {} traders x {} bets, {} steps, {} allocation",
            exchanges.len(),
            traders.len(),
            config.bets_per_trader,
            config.num_steps,
            policy.name()
        );

        let outcomes = vec![Outcome::Dead; exchanges.len()];

        Ok(Self {
            config,
            exchanges,
            traders,
            outcomes,
            noise,
            rng,
            step: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn traders(&self) -> &[Trader] {
        &self.traders
    }

    /// Number of steps completed so far
    pub fn current_step(&self) -> u64 {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.config.num_steps
    }

    /// Outcomes of the most recent step, indexed by exchange id
    pub fn last_outcomes(&self) -> Option<&[Outcome]> {
        (self.step > 0).then_some(self.outcomes.as_slice())
    }

    /// Run one step. Returns `None` once all configured steps are done.
    pub fn step(&mut self) -> Result<Option<StepResult>> {
        if self.is_finished() {
            return Ok(None);
        }
        let step = self.step;

        // Resolve phase: one draw per exchange, in index order
        let mut explosions = 0;
        for (exchange, slot) in self.exchanges.iter_mut().zip(self.outcomes.iter_mut()) {
            let was_alive = exchange.is_alive();
            let draw: f64 = self.rng.r#gen();
            let mut outcome = exchange.resolve(step, draw);

            check_transition(exchange, was_alive, &outcome, step)?;

            if let Some(noise) = &self.noise {
                if matches!(outcome, Outcome::Paid { .. }) {
                    outcome = outcome.perturbed(noise.sample(&mut self.rng));
                }
            }
            if outcome.is_explosion() {
                explosions += 1;
            }
            *slot = outcome;
        }

        // Apply phase: every trader sees the complete set of outcomes
        let mut total_wealth = 0.0;
        for trader in &mut self.traders {
            total_wealth += trader.apply(step, &self.outcomes)?;
        }

        self.step += 1;

        let alive_exchanges = self.exchanges.iter().filter(|e| e.is_alive()).count();
        trace!(
            "Step {}: explosions={}, alive={}, wealth={:.6}",
            step, explosions, alive_exchanges, total_wealth
        );

        Ok(Some(StepResult {
            step,
            explosions,
            alive_exchanges,
            total_wealth,
        }))
    }

    /// Run all remaining steps and return the full history
    pub fn run(mut self) -> Result<History> {
        while self.step()?.is_some() {}

        let history = History::from_parts(self.step, self.exchanges, self.traders);
        let metrics = SimulationMetrics::from_history(&history);
        info!(
            "Simulation finished after {} steps: {} explosions, {} exchanges alive, mean wealth {:.4}",
            metrics.total_steps,
            metrics.explosions,
            metrics.surviving_exchanges,
            metrics.mean_final_wealth
        );
        Ok(history)
    }

    /// History of the steps completed so far
    pub fn history(&self) -> History {
        History::capture(self.step, &self.exchanges, &self.traders)
    }
}

/// Run a full simulation from configuration
pub fn run(config: SimulationConfig) -> Result<History> {
    Simulation::new(config)?.run()
}

/// A policy must place exactly the configured bets across exactly the
/// configured exchanges
fn check_allocation(
    allocation: &Allocation,
    trader: usize,
    config: &SimulationConfig,
    policy: &dyn AllocationPolicy,
) -> std::result::Result<(), ConfigError> {
    if allocation.len() != config.num_exchanges {
        return Err(ConfigError::InvalidAllocation(format!(
            "{} policy gave trader {} an allocation over {} exchanges, expected {}",
            policy.name(),
            trader,
            allocation.len(),
            config.num_exchanges
        )));
    }
    if allocation.total() != config.bets_per_trader {
        return Err(ConfigError::InvalidAllocation(format!(
            "{} policy gave trader {} {} bets, expected {}",
            policy.name(),
            trader,
            allocation.total(),
            config.bets_per_trader
        )));
    }
    Ok(())
}

fn check_transition(
    exchange: &Exchange,
    was_alive: bool,
    outcome: &Outcome,
    step: u64,
) -> Result<()> {
    let consistent = match outcome {
        Outcome::Paid { .. } => was_alive && exchange.is_alive(),
        Outcome::Exploded => was_alive && exchange.death_step() == Some(step),
        Outcome::Dead => !was_alive && !exchange.is_alive(),
    };
    if consistent {
        Ok(())
    } else {
        Err(SimError::InvariantViolation(format!(
            "{} produced {:?} at step {} (alive before: {}, state now: {:?})",
            exchange.id(),
            outcome,
            step,
            was_alive,
            exchange.state()
        )))
    }
}
