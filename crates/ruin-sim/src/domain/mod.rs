//! Domain layer: exchanges, traders and the curves that price their risk

mod allocation;
mod exchange;
mod risk_model;
mod trader;

pub use allocation::{Allocation, AllocationPolicy, AllocationStrategy};
pub use exchange::{Exchange, ExchangeId, ExchangeState, Outcome};
pub use risk_model::{RiskModel, RiskProfile};
pub use trader::{ExplosionLoss, Trader, TraderId};
