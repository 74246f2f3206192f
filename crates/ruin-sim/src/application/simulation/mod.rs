//! Simulation Framework
//!
//! Provides the step loop and the record it produces.
//!
//! # Step
//!
//! Each step has two phases separated by a barrier:
//! - **Resolve**: every exchange draws once (in id order) and explodes or pays
//! - **Apply**: every trader folds the step's outcomes into its wealth
//!
//! An explosion on step `k` is therefore visible to every trader before
//! step `k + 1` starts.

mod history;
mod metrics;
mod runner;

pub use history::{ExchangeRecord, History, StepView, TraderRecord};
pub use metrics::SimulationMetrics;
pub use runner::{Simulation, StepResult, run};
