//! Simulation configuration
//!
//! Every field has a documented default so partial JSON files load cleanly.
//! [`SimulationConfig::validate`] is the single gate: nothing runs on a
//! configuration it rejects.

use crate::domain::{AllocationStrategy, ExplosionLoss, RiskModel};
use crate::error::ConfigError;
use log::warn;
use serde::{Deserialize, Serialize};

/// Longest run accepted. Each trader stores one wealth value per step.
pub const MAX_STEPS: u64 = 100_000_000;

/// Gaussian shock added to every paid premium
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnNoise {
    pub mean: f64,
    pub std_dev: f64,
}

impl Default for ReturnNoise {
    fn default() -> Self {
        Self {
            mean: 0.0,
            std_dev: 0.007,
        }
    }
}

/// Configuration for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of exchanges, spread evenly over [z_min, z_max]
    pub num_exchanges: usize,
    /// Number of traders
    pub num_traders: usize,
    /// Bets each trader allocates
    pub bets_per_trader: u32,
    /// Capital each trader starts with, split evenly across its bets
    pub initial_capital: f64,
    /// Explosion probability of the riskiest exchange (z = 0)
    pub max_risk: f64,
    /// Exponential decay of explosion probability in z
    pub ruin_decay: f64,
    /// Premium of the riskiest exchange (z = 0)
    pub max_premium: f64,
    /// Exponential decay of the premium in z
    pub premium_decay: f64,
    /// Lowest risk parameter (riskiest exchange)
    pub z_min: f64,
    /// Highest risk parameter (safest exchange)
    pub z_max: f64,
    /// Number of steps to simulate
    pub num_steps: u64,
    /// Random seed for determinism (None = seeded from entropy)
    pub seed: Option<u64>,
    /// Optional noise on paid premiums
    pub return_noise: Option<ReturnNoise>,
    /// What an explosion takes from a trader
    pub explosion_loss: ExplosionLoss,
    /// How traders spread their bets
    pub allocation: AllocationStrategy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_exchanges: 8,
            num_traders: 15, // one per sliding window over 8 exchanges x 2 bets
            bets_per_trader: 2,
            initial_capital: 1.0,
            max_risk: 0.001,
            ruin_decay: 2.0,
            max_premium: 0.0009,
            premium_decay: 2.6,
            z_min: 0.0,
            z_max: 1.0,
            num_steps: 2600,
            seed: Some(42),
            return_noise: None,
            explosion_loss: ExplosionLoss::Stake,
            allocation: AllocationStrategy::SlidingWindow,
        }
    }
}

impl SimulationConfig {
    /// Value of a single bet
    pub fn bet_size(&self) -> f64 {
        self.initial_capital / f64::from(self.bets_per_trader)
    }

    /// Risk curves described by this configuration
    pub fn risk_model(&self) -> Result<RiskModel, ConfigError> {
        RiskModel::new(
            self.max_risk,
            self.ruin_decay,
            self.max_premium,
            self.premium_decay,
        )
    }

    /// Risk parameter of each exchange, evenly spaced from z_min to z_max
    pub fn z_values(&self) -> Vec<f64> {
        let n = self.num_exchanges;
        if n == 1 {
            return vec![self.z_min];
        }
        let span = self.z_max - self.z_min;
        (0..n)
            .map(|i| self.z_min + span * i as f64 / (n - 1) as f64)
            .collect()
    }

    /// Check every parameter. Called before a simulation is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_count("num_exchanges", self.num_exchanges as u64)?;
        positive_count("num_traders", self.num_traders as u64)?;
        positive_count("bets_per_trader", u64::from(self.bets_per_trader))?;
        positive_count("num_steps", self.num_steps)?;
        if self.num_steps > MAX_STEPS {
            return Err(ConfigError::CountTooLarge {
                field: "num_steps",
                value: self.num_steps,
                max: MAX_STEPS,
            });
        }

        if !(self.initial_capital > 0.0 && self.initial_capital.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                field: "initial_capital",
                value: self.initial_capital,
                reason: "must be finite and positive",
            });
        }

        self.risk_model()?;

        if !(self.z_min >= 0.0 && self.z_min.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                field: "z_min",
                value: self.z_min,
                reason: "risk parameter must be finite and non-negative",
            });
        }
        if !(self.z_max >= self.z_min && self.z_max.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                field: "z_max",
                value: self.z_max,
                reason: "must be finite and at least z_min",
            });
        }

        if let Some(noise) = &self.return_noise {
            if !noise.mean.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    field: "return_noise.mean",
                    value: noise.mean,
                    reason: "must be finite",
                });
            }
            if !(noise.std_dev >= 0.0 && noise.std_dev.is_finite()) {
                return Err(ConfigError::InvalidParameter {
                    field: "return_noise.std_dev",
                    value: noise.std_dev,
                    reason: "must be finite and non-negative",
                });
            }
        }

        if let AllocationStrategy::Explicit { allocations } = &self.allocation {
            if allocations.len() != self.num_traders {
                return Err(ConfigError::InvalidAllocation(format!(
                    "{} explicit allocations for {} traders",
                    allocations.len(),
                    self.num_traders
                )));
            }
        }

        if self.max_risk >= 1.0 && self.ruin_decay == 0.0 {
            warn!("max_risk = 1 with no decay: every exchange explodes on step 0");
        }

        Ok(())
    }
}

fn positive_count(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::InvalidCount { field, value })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_valid() {
        let config = SimulationConfig::default();
        config.validate().unwrap();
        assert_relative_eq!(config.bet_size(), 0.5);
        assert_eq!(
            config.num_traders,
            AllocationStrategy::window_count(config.num_exchanges, config.bets_per_trader)
        );
    }

    #[test]
    fn test_z_values_evenly_spaced() {
        let config = SimulationConfig {
            num_exchanges: 5,
            ..Default::default()
        };
        let z = config.z_values();
        assert_eq!(z.len(), 5);
        for (i, expected) in [0.0, 0.25, 0.5, 0.75, 1.0].iter().enumerate() {
            assert_relative_eq!(z[i], *expected);
        }
    }

    #[test]
    fn test_single_exchange_at_z_min() {
        let config = SimulationConfig {
            num_exchanges: 1,
            z_min: 0.3,
            ..Default::default()
        };
        assert_eq!(config.z_values(), vec![0.3]);
    }

    #[test]
    fn test_zero_counts_rejected() {
        for config in [
            SimulationConfig {
                num_exchanges: 0,
                ..Default::default()
            },
            SimulationConfig {
                num_traders: 0,
                ..Default::default()
            },
            SimulationConfig {
                bets_per_trader: 0,
                ..Default::default()
            },
            SimulationConfig {
                num_steps: 0,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidCount { .. })
            ));
        }
    }

    #[test]
    fn test_bad_parameters_rejected() {
        for config in [
            SimulationConfig {
                max_risk: -0.1,
                ..Default::default()
            },
            SimulationConfig {
                max_risk: 1.1,
                ..Default::default()
            },
            SimulationConfig {
                ruin_decay: -1.0,
                ..Default::default()
            },
            SimulationConfig {
                max_premium: -0.001,
                ..Default::default()
            },
            SimulationConfig {
                premium_decay: -2.0,
                ..Default::default()
            },
            SimulationConfig {
                initial_capital: 0.0,
                ..Default::default()
            },
            SimulationConfig {
                z_min: -0.5,
                ..Default::default()
            },
            SimulationConfig {
                z_min: 0.8,
                z_max: 0.2,
                ..Default::default()
            },
            SimulationConfig {
                return_noise: Some(ReturnNoise {
                    mean: 0.0,
                    std_dev: -1.0,
                }),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_step_count_capped() {
        let config = SimulationConfig {
            num_steps: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CountTooLarge {
                field: "num_steps",
                max: MAX_STEPS,
                ..
            })
        ));

        let at_limit = SimulationConfig {
            num_steps: MAX_STEPS,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_explicit_allocation_count_checked() {
        let config = SimulationConfig {
            num_exchanges: 2,
            num_traders: 2,
            bets_per_trader: 1,
            allocation: AllocationStrategy::Explicit {
                allocations: vec![vec![1, 0]],
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAllocation(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"num_exchanges": 3, "seed": null}"#).unwrap();
        assert_eq!(config.num_exchanges, 3);
        assert_eq!(config.seed, None);
        assert_eq!(config.num_steps, 2600);
        assert_eq!(config.allocation, AllocationStrategy::SlidingWindow);
    }
}
