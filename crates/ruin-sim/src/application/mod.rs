//! Application layer: configuration and orchestration
//!
//! Contains:
//! - **config**: SimulationConfig and its validation
//! - **simulation**: the step loop, its history and metrics
//! - **batch**: repeated seeded runs of one configuration

pub mod batch;
pub mod config;
pub mod simulation;

pub use batch::{BatchSummary, run_batch};
pub use config::{MAX_STEPS, ReturnNoise, SimulationConfig};
pub use simulation::{History, Simulation, SimulationMetrics, StepResult};
