//! Bet allocation
//!
//! How each trader spreads its fixed budget of bets across the exchanges.
//! Allocations are decided once, at setup, and never change.
//!
//! # Strategies
//!
//! - **SlidingWindow**: every exchange repeated `bets` times in order, traders
//!   take consecutive windows of length `bets` (neighbouring risk levels)
//! - **RoundRobin**: bets dealt onto exchanges one at a time
//! - **Concentrated**: all bets on a single exchange
//! - **Explicit**: per-trader bet counts supplied in configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

use super::ExchangeId;

/// Bet counts indexed by exchange id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    bets: Vec<u32>,
}

impl Allocation {
    /// Build an allocation, checking it spends exactly `budget` bets
    pub fn new(bets: Vec<u32>, budget: u32) -> Result<Self, ConfigError> {
        let total: u64 = bets.iter().map(|&b| u64::from(b)).sum();
        if total != u64::from(budget) {
            return Err(ConfigError::InvalidAllocation(format!(
                "allocation places {} bets, expected {}",
                total, budget
            )));
        }
        Ok(Self { bets })
    }

    /// Bets placed on an exchange (zero for unknown ids)
    pub fn bets_on(&self, exchange: ExchangeId) -> u32 {
        self.bets.get(exchange.index()).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.bets.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.bets
    }

    /// Exchanges holding at least one bet, with their counts
    pub fn exchanges(&self) -> impl Iterator<Item = (ExchangeId, u32)> + '_ {
        self.bets
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b > 0)
            .map(|(i, &b)| (ExchangeId(i), b))
    }
}

/// Decides a trader's allocation at setup
pub trait AllocationPolicy {
    /// Allocation for the trader at ordinal `trader`
    fn allocate(
        &self,
        trader: usize,
        num_exchanges: usize,
        bets: u32,
    ) -> Result<Allocation, ConfigError>;

    /// Policy name (for logging/reports)
    fn name(&self) -> &'static str;
}

/// Built-in, configurable allocation strategies
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllocationStrategy {
    #[default]
    SlidingWindow,
    RoundRobin,
    Concentrated,
    Explicit {
        /// One bet-count vector per trader, indexed by exchange id
        allocations: Vec<Vec<u32>>,
    },
}

impl AllocationStrategy {
    /// Number of distinct allocations the sliding window produces
    pub fn window_count(num_exchanges: usize, bets: u32) -> usize {
        let bets = bets as usize;
        (num_exchanges.saturating_sub(1)) * bets + 1
    }
}

impl AllocationPolicy for AllocationStrategy {
    fn allocate(
        &self,
        trader: usize,
        num_exchanges: usize,
        bets: u32,
    ) -> Result<Allocation, ConfigError> {
        if num_exchanges == 0 {
            return Err(ConfigError::InvalidAllocation(
                "no exchanges to allocate bets to".to_string(),
            ));
        }

        let mut counts = vec![0u32; num_exchanges];
        match self {
            AllocationStrategy::SlidingWindow => {
                // Slot k of the repeated layout belongs to exchange k / bets
                let start = trader % Self::window_count(num_exchanges, bets);
                for slot in start..start + bets as usize {
                    counts[slot / bets as usize] += 1;
                }
            }
            AllocationStrategy::RoundRobin => {
                let first = trader * bets as usize;
                for k in 0..bets as usize {
                    counts[(first + k) % num_exchanges] += 1;
                }
            }
            AllocationStrategy::Concentrated => {
                counts[trader % num_exchanges] = bets;
            }
            AllocationStrategy::Explicit { allocations } => {
                let row = allocations.get(trader).ok_or_else(|| {
                    ConfigError::InvalidAllocation(format!(
                        "no explicit allocation for trader {}",
                        trader
                    ))
                })?;
                if row.len() != num_exchanges {
                    return Err(ConfigError::InvalidAllocation(format!(
                        "trader {} allocation covers {} exchanges, expected {}",
                        trader,
                        row.len(),
                        num_exchanges
                    )));
                }
                counts.copy_from_slice(row);
            }
        }

        Allocation::new(counts, bets)
    }

    fn name(&self) -> &'static str {
        match self {
            AllocationStrategy::SlidingWindow => "sliding_window",
            AllocationStrategy::RoundRobin => "round_robin",
            AllocationStrategy::Concentrated => "concentrated",
            AllocationStrategy::Explicit { .. } => "explicit",
        }
    }
}
