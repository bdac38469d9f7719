use super::arrivals::ArrivalProcess;
use super::config::{BatchConfig, ConcurrencyMode, ScenarioConfig};
use super::metrics::{CustomerRecord, ScenarioResult};
use super::state::CounterState;
use crate::core::error::SimError;
use crate::core::resource_pool::ResourcePool;
use crate::core::simulation_engine::{SimulationEngine, SimulationObserver};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Engine-level facts about a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub events_processed: u64,
    /// Processes still suspended when the horizon was reached
    pub abandoned_processes: usize,
    pub queue_at_horizon: usize,
    pub busy_servers_at_horizon: usize,
    pub max_queue_length: usize,
}

/// Summary plus the per-customer trace of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub result: ScenarioResult,
    pub customers: Vec<CustomerRecord>,
    pub stats: RunStats,
}

/// Run one scenario from a fresh engine and return its summary
pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioResult, SimError> {
    run_scenario_detailed(config).map(|run| run.result)
}

pub fn run_scenario_detailed(config: &ScenarioConfig) -> Result<ScenarioRun, SimError> {
    run_with_observers(config, Vec::new())
}

/// Run one scenario with observers attached to its engine
pub fn run_with_observers(
    config: &ScenarioConfig,
    observers: Vec<Box<dyn SimulationObserver>>,
) -> Result<ScenarioRun, SimError> {
    config.validate()?;
    info!(
        "[{}] starting: {} cashier(s), mean interarrival {}, mean service {}, horizon {}, seed {}",
        config.label,
        config.server_count,
        config.mean_interarrival,
        config.mean_service,
        config.horizon,
        config.seed
    );

    let state = CounterState::new(config.seed, config.horizon);
    let mut engine = SimulationEngine::new(config.horizon, state)?;
    for observer in observers {
        engine.add_observer(observer);
    }

    let cashiers = engine.add_pool(ResourcePool::new("cashiers", config.server_count)?);
    engine.spawn(Box::new(ArrivalProcess::new(
        cashiers,
        config.mean_interarrival,
        config.mean_service,
    )));
    engine.run()?;

    let pool = engine.pool(cashiers)?;
    let stats = RunStats {
        events_processed: engine.events_processed(),
        abandoned_processes: engine.live_processes(),
        queue_at_horizon: pool.queue_len(),
        busy_servers_at_horizon: pool.held(),
        max_queue_length: pool.max_queue_len(),
    };

    let metrics = engine.into_state().metrics;
    let result = metrics.summarize(config)?;

    let censored = result.total_arrivals - result.total_served;
    if censored > 0 {
        warn!(
            "[{}] {} customer(s) still waiting at the horizon",
            config.label, censored
        );
    }
    info!(
        "[{}] finished: {} arrived, {} served, avg wait {:.2}",
        config.label, result.total_arrivals, result.total_served, result.avg_wait
    );

    Ok(ScenarioRun {
        result,
        customers: metrics.into_customers(),
        stats,
    })
}

/// Run independent scenarios; results are returned in input order
pub fn run_batch(
    scenarios: &[ScenarioConfig],
    batch: &BatchConfig,
) -> Vec<Result<ScenarioResult, SimError>> {
    match batch.concurrency_mode {
        ConcurrencyMode::Sequential => scenarios.iter().map(run_scenario).collect(),
        ConcurrencyMode::Rayon => {
            let run_parallel = || -> Vec<Result<ScenarioResult, SimError>> {
                scenarios.par_iter().map(run_scenario).collect()
            };
            match batch.thread_pool_size {
                Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                    Ok(pool) => pool.install(run_parallel),
                    Err(e) => {
                        warn!("Could not build a {}-thread pool ({}), using the global pool", threads, e);
                        run_parallel()
                    }
                },
                None => run_parallel(),
            }
        }
    }
}
