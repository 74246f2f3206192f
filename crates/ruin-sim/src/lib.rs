//! Ruin simulation
//!
//! Traders with a fixed budget of bets spread them across exchanges. Each
//! exchange pays a premium every step it survives and may explode, taking
//! the bets placed on it. Riskier exchanges (low `z`) pay more and explode
//! more often; both decay exponentially as `z` grows.
//!
//! ## Architecture
//!
//! ```text
//!   SimulationConfig ──validate──▶ Simulation
//!                                    │
//!              ┌─────────────────────┼─────────────────────┐
//!              ▼                     ▼                     ▼
//!         RiskModel ──▶ Exchange::resolve ──▶ Outcome[] ──▶ Trader::apply
//!                                                              │
//!                                                              ▼
//!                                                           History
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-export key types at crate root
pub use application::simulation::{ExchangeRecord, StepView, TraderRecord, run};
pub use application::{
    BatchSummary, History, MAX_STEPS, ReturnNoise, Simulation, SimulationConfig, SimulationMetrics,
    StepResult, run_batch,
};
pub use domain::{
    Allocation, AllocationPolicy, AllocationStrategy, Exchange, ExchangeId, ExchangeState,
    ExplosionLoss, Outcome, RiskModel, RiskProfile, Trader, TraderId,
};
pub use error::{ConfigError, Result, SimError};
pub use infrastructure::{config_from_json, load_config};
