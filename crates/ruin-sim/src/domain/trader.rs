//! Trader
//!
//! Holds a fixed allocation of bets and turns each step's exchange outcomes
//! into a wealth trajectory.

use super::{Allocation, ExchangeId, Outcome};
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Unique identifier for a trader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraderId(pub usize);

impl std::fmt::Display for TraderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// What a trader forfeits when an exchange it holds explodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplosionLoss {
    /// The allocated unit value of the bets; premium already earned is kept
    #[default]
    Stake,
    /// Everything held on the exchange, stake and earned premium alike.
    /// Balances are also floored at zero when a negative return is paid.
    Balance,
}

/// Capital held on one exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Position {
    exchange: ExchangeId,
    bets: u32,
    balance: f64,
    lost: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trader {
    id: TraderId,
    allocation: Allocation,
    bet_size: f64,
    explosion_loss: ExplosionLoss,
    positions: Vec<Position>,
    initial_wealth: f64,
    wealth: f64,
    history: Vec<f64>,
}

impl Trader {
    pub fn new(
        id: TraderId,
        allocation: Allocation,
        bet_size: f64,
        explosion_loss: ExplosionLoss,
    ) -> Self {
        let positions: Vec<Position> = allocation
            .exchanges()
            .map(|(exchange, bets)| Position {
                exchange,
                bets,
                balance: f64::from(bets) * bet_size,
                lost: false,
            })
            .collect();
        let initial_wealth = positions.iter().map(|p| p.balance).sum();

        Self {
            id,
            allocation,
            bet_size,
            explosion_loss,
            positions,
            initial_wealth,
            wealth: initial_wealth,
            history: Vec::new(),
        }
    }

    /// Pre-size the history for a run of known length
    pub fn with_capacity(mut self, steps: usize) -> Self {
        self.history.reserve_exact(steps);
        self
    }

    pub fn id(&self) -> TraderId {
        self.id
    }

    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    pub fn bet_size(&self) -> f64 {
        self.bet_size
    }

    pub fn initial_wealth(&self) -> f64 {
        self.initial_wealth
    }

    pub fn wealth(&self) -> f64 {
        self.wealth
    }

    /// Wealth after each applied step
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Give up the allocation and wealth history, consuming the trader
    pub fn into_parts(self) -> (Allocation, Vec<f64>) {
        (self.allocation, self.history)
    }

    /// True once every exchange this trader holds has exploded
    pub fn is_ruined(&self) -> bool {
        self.positions.iter().all(|p| p.lost)
    }

    /// Apply one step's outcomes, indexed by exchange id
    ///
    /// Returns the trader's wealth after the step. An outcome that
    /// contradicts what the trader already observed (a lost exchange paying
    /// or exploding again, or a held exchange dying unannounced) is an
    /// invariant violation.
    pub fn apply(&mut self, step: u64, outcomes: &[Outcome]) -> Result<f64> {
        for position in &mut self.positions {
            let outcome = outcomes.get(position.exchange.index()).ok_or_else(|| {
                SimError::InvariantViolation(format!(
                    "{} holds {} but step {} has no outcome for it",
                    self.id, position.exchange, step
                ))
            })?;

            match (position.lost, outcome) {
                (false, Outcome::Paid { premium }) => {
                    position.balance += f64::from(position.bets) * premium;
                    if self.explosion_loss == ExplosionLoss::Balance {
                        position.balance = position.balance.max(0.0);
                    }
                }
                (false, Outcome::Exploded) => {
                    position.lost = true;
                    position.balance = match self.explosion_loss {
                        ExplosionLoss::Stake => {
                            position.balance - f64::from(position.bets) * self.bet_size
                        }
                        ExplosionLoss::Balance => 0.0,
                    };
                }
                (true, Outcome::Dead) => {}
                (false, Outcome::Dead) => {
                    return Err(SimError::InvariantViolation(format!(
                        "{} reported dead at step {} without exploding",
                        position.exchange, step
                    )));
                }
                (true, Outcome::Paid { .. } | Outcome::Exploded) => {
                    return Err(SimError::InvariantViolation(format!(
                        "{} was active at step {} after exploding",
                        position.exchange, step
                    )));
                }
            }
        }

        self.wealth = self.positions.iter().map(|p| p.balance).sum();
        self.history.push(self.wealth);
        Ok(self.wealth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn trader(bets: Vec<u32>, loss: ExplosionLoss) -> Trader {
        let budget = bets.iter().sum();
        let allocation = Allocation::new(bets, budget).unwrap();
        let bet_size = 1.0 / f64::from(budget);
        Trader::new(TraderId(0), allocation, bet_size, loss)
    }

    #[test]
    fn test_initial_wealth_is_stake() {
        let t = trader(vec![1, 1], ExplosionLoss::Stake);
        assert_relative_eq!(t.initial_wealth(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(t.wealth(), 1.0);
        assert!(t.history().is_empty());
    }

    #[test]
    fn test_premium_scales_with_bet_count() {
        let mut t = trader(vec![2, 0], ExplosionLoss::Stake);
        let outcomes = [Outcome::Paid { premium: 0.01 }, Outcome::Paid { premium: 0.5 }];
        let w = t.apply(0, &outcomes).unwrap();
        assert_relative_eq!(w, 1.02, epsilon = 1e-12);
        assert_eq!(t.history(), &[w]);
    }

    #[test]
    fn test_explosion_loses_stake_only() {
        let mut t = trader(vec![1, 1], ExplosionLoss::Stake);
        let paid = Outcome::Paid { premium: 0.1 };
        t.apply(0, &[paid, paid]).unwrap();
        let w = t.apply(1, &[Outcome::Exploded, paid]).unwrap();

        // Lost 0.5 stake on E0, kept its 0.1 premium; E1 earned again
        assert_relative_eq!(w, 0.8, epsilon = 1e-12);
        assert!(!t.is_ruined());
    }

    #[test]
    fn test_explosion_loses_balance() {
        let mut t = trader(vec![1, 1], ExplosionLoss::Balance);
        let paid = Outcome::Paid { premium: 0.1 };
        t.apply(0, &[paid, paid]).unwrap();
        let w = t.apply(1, &[Outcome::Exploded, paid]).unwrap();
        assert_relative_eq!(w, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_balance_mode_floors_negative_returns() {
        let mut t = trader(vec![1, 1], ExplosionLoss::Balance);
        let loss = Outcome::Paid { premium: -0.8 };
        let gain = Outcome::Paid { premium: 0.1 };
        let w = t.apply(0, &[loss, gain]).unwrap();
        // E0 floored at zero instead of going to -0.3
        assert_relative_eq!(w, 0.6, epsilon = 1e-12);

        let recovery = Outcome::Paid { premium: 0.2 };
        let flat = Outcome::Paid { premium: 0.0 };
        let w = t.apply(1, &[recovery, flat]).unwrap();
        assert_relative_eq!(w, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_stake_mode_allows_negative_balance() {
        let mut t = trader(vec![1, 1], ExplosionLoss::Stake);
        let loss = Outcome::Paid { premium: -0.8 };
        let gain = Outcome::Paid { premium: 0.1 };
        let w = t.apply(0, &[loss, gain]).unwrap();
        assert_relative_eq!(w, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_ruined_trader_is_flat() {
        let mut t = trader(vec![1], ExplosionLoss::Stake);
        let w0 = t.apply(0, &[Outcome::Exploded]).unwrap();
        assert_relative_eq!(w0, 0.0);
        assert!(t.is_ruined());
        for step in 1..10 {
            assert_eq!(t.apply(step, &[Outcome::Dead]).unwrap(), w0);
        }
        assert_eq!(t.history().len(), 10);
    }

    #[test]
    fn test_unheld_exchanges_ignored() {
        let mut t = trader(vec![0, 1], ExplosionLoss::Stake);
        let w = t.apply(0, &[Outcome::Exploded, Outcome::Paid { premium: 0.0 }]).unwrap();
        assert_relative_eq!(w, 1.0);
    }

    #[test]
    fn test_payment_after_explosion_is_violation() {
        let mut t = trader(vec![1], ExplosionLoss::Stake);
        t.apply(0, &[Outcome::Exploded]).unwrap();
        assert!(matches!(
            t.apply(1, &[Outcome::Paid { premium: 0.1 }]),
            Err(SimError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_unannounced_death_is_violation() {
        let mut t = trader(vec![1], ExplosionLoss::Stake);
        assert!(t.apply(0, &[Outcome::Dead]).is_err());
    }

    #[test]
    fn test_missing_outcome_is_violation() {
        let mut t = trader(vec![0, 1], ExplosionLoss::Stake);
        assert!(t.apply(0, &[Outcome::Dead]).is_err());
    }
}
