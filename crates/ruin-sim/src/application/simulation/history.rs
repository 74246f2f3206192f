//! Run history
//!
//! Read-only record of a run for reporting. Exchange state per step is
//! recovered from the death step: an exchange is alive after step `s` iff it
//! has not died or died after `s`.

use crate::domain::{Allocation, Exchange, ExchangeId, Trader, TraderId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: ExchangeId,
    pub z: f64,
    pub risk: f64,
    pub premium: f64,
    /// Step on which the exchange exploded, if it did
    pub death_step: Option<u64>,
}

impl ExchangeRecord {
    /// Whether the exchange was alive at the end of `step`
    pub fn alive_at(&self, step: u64) -> bool {
        self.death_step.is_none_or(|death| step < death)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderRecord {
    pub id: TraderId,
    pub allocation: Allocation,
    pub initial_wealth: f64,
    /// Wealth at the end of each step
    pub wealth: Vec<f64>,
}

impl TraderRecord {
    /// Wealth after the last recorded step (initial wealth if none ran)
    pub fn final_wealth(&self) -> f64 {
        self.wealth.last().copied().unwrap_or(self.initial_wealth)
    }
}

impl From<&Exchange> for ExchangeRecord {
    fn from(e: &Exchange) -> Self {
        Self {
            id: e.id(),
            z: e.z(),
            risk: e.risk(),
            premium: e.premium(),
            death_step: e.death_step(),
        }
    }
}

/// Cross-section of a run at one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepView {
    pub step: u64,
    /// Alive flag per exchange, indexed by exchange id
    pub alive: Vec<bool>,
    /// Wealth per trader, indexed by trader id
    pub wealth: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    /// Number of steps recorded
    pub steps: u64,
    pub exchanges: Vec<ExchangeRecord>,
    pub traders: Vec<TraderRecord>,
}

impl History {
    /// Snapshot a run in progress
    pub fn capture(steps: u64, exchanges: &[Exchange], traders: &[Trader]) -> Self {
        Self {
            steps,
            exchanges: exchanges.iter().map(ExchangeRecord::from).collect(),
            traders: traders
                .iter()
                .map(|t| TraderRecord {
                    id: t.id(),
                    allocation: t.allocation().clone(),
                    initial_wealth: t.initial_wealth(),
                    wealth: t.history().to_vec(),
                })
                .collect(),
        }
    }

    /// Take ownership of a finished run's state, moving the wealth series
    pub fn from_parts(steps: u64, exchanges: Vec<Exchange>, traders: Vec<Trader>) -> Self {
        Self {
            steps,
            exchanges: exchanges.iter().map(ExchangeRecord::from).collect(),
            traders: traders
                .into_iter()
                .map(|t| {
                    let id = t.id();
                    let initial_wealth = t.initial_wealth();
                    let (allocation, wealth) = t.into_parts();
                    TraderRecord {
                        id,
                        allocation,
                        initial_wealth,
                        wealth,
                    }
                })
                .collect(),
        }
    }

    pub fn exchange_alive_at(&self, exchange: ExchangeId, step: u64) -> Option<bool> {
        if step >= self.steps {
            return None;
        }
        self.exchanges
            .get(exchange.index())
            .map(|e| e.alive_at(step))
    }

    pub fn wealth_at(&self, trader: TraderId, step: u64) -> Option<f64> {
        self.traders
            .get(trader.0)
            .and_then(|t| t.wealth.get(step as usize).copied())
    }

    pub fn final_wealth(&self) -> Vec<f64> {
        self.traders.iter().map(TraderRecord::final_wealth).collect()
    }

    /// Alive flags and wealth at `step`, or `None` past the recorded range
    pub fn step_view(&self, step: u64) -> Option<StepView> {
        if step >= self.steps {
            return None;
        }
        let wealth = self
            .traders
            .iter()
            .map(|t| t.wealth.get(step as usize).copied())
            .collect::<Option<Vec<_>>>()?;

        Some(StepView {
            step,
            alive: self.exchanges.iter().map(|e| e.alive_at(step)).collect(),
            wealth,
        })
    }

    /// Exchanges that never exploded
    pub fn survivors(&self) -> impl Iterator<Item = &ExchangeRecord> {
        self.exchanges.iter().filter(|e| e.death_step.is_none())
    }

    /// Whether every exchange the trader holds exploded by the end of `step`
    pub fn is_ruined_at(&self, trader: TraderId, step: u64) -> bool {
        self.traders.get(trader.0).is_some_and(|t| {
            t.allocation
                .exchanges()
                .all(|(id, _)| self.exchanges.get(id.index()).is_some_and(|e| !e.alive_at(step)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> History {
        History {
            steps: 4,
            exchanges: vec![
                ExchangeRecord {
                    id: ExchangeId(0),
                    z: 0.0,
                    risk: 0.5,
                    premium: 0.1,
                    death_step: Some(2),
                },
                ExchangeRecord {
                    id: ExchangeId(1),
                    z: 1.0,
                    risk: 0.0,
                    premium: 0.01,
                    death_step: None,
                },
            ],
            traders: vec![
                TraderRecord {
                    id: TraderId(0),
                    allocation: Allocation::new(vec![1, 0], 1).unwrap(),
                    initial_wealth: 1.0,
                    wealth: vec![1.1, 1.2, 0.2, 0.2],
                },
                TraderRecord {
                    id: TraderId(1),
                    allocation: Allocation::new(vec![0, 1], 1).unwrap(),
                    initial_wealth: 1.0,
                    wealth: vec![1.01, 1.02, 1.03, 1.04],
                },
            ],
        }
    }

    #[test]
    fn test_alive_flags_follow_death_step() {
        let h = history();
        assert_eq!(h.exchange_alive_at(ExchangeId(0), 1), Some(true));
        assert_eq!(h.exchange_alive_at(ExchangeId(0), 2), Some(false));
        assert_eq!(h.exchange_alive_at(ExchangeId(0), 3), Some(false));
        assert_eq!(h.exchange_alive_at(ExchangeId(1), 3), Some(true));
        assert_eq!(h.exchange_alive_at(ExchangeId(0), 4), None);
        assert_eq!(h.exchange_alive_at(ExchangeId(5), 0), None);
    }

    #[test]
    fn test_step_view() {
        let view = history().step_view(2).unwrap();
        assert_eq!(view.alive, vec![false, true]);
        assert_eq!(view.wealth, vec![0.2, 1.03]);
        assert!(history().step_view(4).is_none());
    }

    #[test]
    fn test_final_wealth_and_survivors() {
        let h = history();
        assert_eq!(h.final_wealth(), vec![0.2, 1.04]);
        assert_eq!(h.wealth_at(TraderId(1), 0), Some(1.01));
        let survivors: Vec<_> = h.survivors().map(|e| e.id).collect();
        assert_eq!(survivors, vec![ExchangeId(1)]);
    }

    #[test]
    fn test_ruin_detection() {
        let h = history();
        assert!(!h.is_ruined_at(TraderId(0), 1));
        assert!(h.is_ruined_at(TraderId(0), 2));
        assert!(!h.is_ruined_at(TraderId(1), 3));
    }

    #[test]
    fn test_from_parts_matches_capture() {
        use crate::domain::{ExplosionLoss, RiskModel};

        let model = RiskModel::new(0.1, 0.0, 0.01, 0.0).unwrap();
        let mut exchange = Exchange::new(ExchangeId(0), 0.0, &model).unwrap();
        let allocation = Allocation::new(vec![2], 2).unwrap();
        let mut trader = Trader::new(TraderId(0), allocation, 0.5, ExplosionLoss::Stake);

        for (step, draw) in [0.5, 0.9, 0.01].into_iter().enumerate() {
            let outcome = exchange.resolve(step as u64, draw);
            trader.apply(step as u64, &[outcome]).unwrap();
        }

        let captured = History::capture(
            3,
            std::slice::from_ref(&exchange),
            std::slice::from_ref(&trader),
        );
        let owned = History::from_parts(3, vec![exchange], vec![trader]);
        assert_eq!(captured, owned);
        assert_eq!(owned.exchanges[0].death_step, Some(2));
        assert_eq!(owned.traders[0].wealth.len(), 3);
    }

    #[test]
    fn test_final_wealth_without_steps() {
        let record = TraderRecord {
            id: TraderId(0),
            allocation: Allocation::new(vec![1], 1).unwrap(),
            initial_wealth: 1.0,
            wealth: vec![],
        };
        assert_eq!(record.final_wealth(), 1.0);
    }
}
