pub mod core;
pub mod queueing;

// Re-export commonly used types
pub use crate::core::error::SimError;
pub use crate::core::process::{Process, ProcessContext, Yield};
pub use crate::core::resource_pool::{RequestOutcome, ResourcePool};
pub use crate::core::simulation_engine::{SimulationEngine, SimulationObserver};
pub use crate::core::types::{PoolId, ProcessId, SimTime};
pub use crate::queueing::config::{BatchConfig, ConcurrencyMode, ScenarioConfig};
pub use crate::queueing::metrics::{CustomerRecord, ScenarioResult};
pub use crate::queueing::runner::{run_batch, run_scenario, run_scenario_detailed, ScenarioRun};
