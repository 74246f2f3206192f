//! Exchange
//!
//! A venue with a fixed risk parameter `z`. Each step it either pays its
//! premium or explodes; an explosion is terminal.

use super::{RiskModel, RiskProfile};
use crate::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};

/// Ordinal position of an exchange, stable for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExchangeId(pub usize);

impl ExchangeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Lifecycle of an exchange. `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeState {
    Alive,
    Dead {
        /// Step on which the exchange exploded
        step: u64,
    },
}

impl ExchangeState {
    pub fn is_alive(&self) -> bool {
        matches!(self, ExchangeState::Alive)
    }
}

/// Result of resolving one exchange for one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// Survived; each bet earns `premium` this step
    Paid { premium: f64 },
    /// Exploded this step; every bet on the exchange is lost
    Exploded,
    /// Exploded on an earlier step; pays nothing
    Dead,
}

impl Outcome {
    /// Add a return shock to a paid premium. Other outcomes are unchanged.
    pub fn perturbed(self, shock: f64) -> Self {
        match self {
            Outcome::Paid { premium } => Outcome::Paid {
                premium: premium + shock,
            },
            other => other,
        }
    }

    pub fn is_explosion(&self) -> bool {
        matches!(self, Outcome::Exploded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    id: ExchangeId,
    z: f64,
    profile: RiskProfile,
    state: ExchangeState,
}

impl Exchange {
    /// Create a live exchange, deriving its risk and premium from `model`
    pub fn new(id: ExchangeId, z: f64, model: &RiskModel) -> Result<Self, ConfigError> {
        let profile = model.profile(z)?;
        Ok(Self {
            id,
            z,
            profile,
            state: ExchangeState::Alive,
        })
    }

    pub fn id(&self) -> ExchangeId {
        self.id
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn risk(&self) -> f64 {
        self.profile.risk
    }

    pub fn premium(&self) -> f64 {
        self.profile.premium
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    /// Step on which the exchange exploded, if it has
    pub fn death_step(&self) -> Option<u64> {
        match self.state {
            ExchangeState::Alive => None,
            ExchangeState::Dead { step } => Some(step),
        }
    }

    /// Resolve this step given a uniform draw in [0, 1)
    pub fn resolve(&mut self, step: u64, draw: f64) -> Outcome {
        match self.state {
            ExchangeState::Dead { .. } => Outcome::Dead,
            ExchangeState::Alive if draw < self.profile.risk => {
                self.state = ExchangeState::Dead { step };
                debug!(
                    "{} exploded at step {} (z={:.3}, risk={:.6})",
                    self.id, step, self.z, self.profile.risk
                );
                Outcome::Exploded
            }
            ExchangeState::Alive => Outcome::Paid {
                premium: self.profile.premium,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(max_risk: f64) -> Exchange {
        let model = RiskModel::new(max_risk, 0.0, 0.001, 0.0).unwrap();
        Exchange::new(ExchangeId(0), 0.0, &model).unwrap()
    }

    #[test]
    fn test_pays_premium_when_draw_above_risk() {
        let mut ex = exchange(0.1);
        assert_eq!(ex.resolve(0, 0.5), Outcome::Paid { premium: 0.001 });
        assert!(ex.is_alive());
        assert_eq!(ex.death_step(), None);
    }

    #[test]
    fn test_explodes_when_draw_below_risk() {
        let mut ex = exchange(0.1);
        assert_eq!(ex.resolve(3, 0.05), Outcome::Exploded);
        assert_eq!(ex.state(), ExchangeState::Dead { step: 3 });
        assert_eq!(ex.death_step(), Some(3));
    }

    #[test]
    fn test_death_is_terminal() {
        let mut ex = exchange(0.1);
        ex.resolve(0, 0.0);

        // Even a draw that would have paid leaves it dead
        for step in 1..50 {
            assert_eq!(ex.resolve(step, 0.99), Outcome::Dead);
            assert_eq!(ex.death_step(), Some(0));
        }
    }

    #[test]
    fn test_certain_risk_always_explodes() {
        let mut ex = exchange(1.0);
        assert_eq!(ex.resolve(0, 0.999_999), Outcome::Exploded);
    }

    #[test]
    fn test_zero_risk_never_explodes() {
        let mut ex = exchange(0.0);
        assert_eq!(ex.resolve(0, 0.0), Outcome::Paid { premium: 0.001 });
    }

    #[test]
    fn test_perturbed_only_touches_paid() {
        assert_eq!(
            Outcome::Paid { premium: 0.5 }.perturbed(0.25),
            Outcome::Paid { premium: 0.75 }
        );
        assert_eq!(Outcome::Exploded.perturbed(1.0), Outcome::Exploded);
        assert_eq!(Outcome::Dead.perturbed(1.0), Outcome::Dead);
    }

    #[test]
    fn test_negative_z_rejected() {
        let model = RiskModel::new(0.1, 1.0, 0.001, 1.0).unwrap();
        assert!(Exchange::new(ExchangeId(0), -1.0, &model).is_err());
    }
}
