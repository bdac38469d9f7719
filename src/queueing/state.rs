use super::metrics::MetricsCollector;
use super::variates::VariateSource;

/// Mutable model state of one scenario run, handed to every process by the engine
#[derive(Debug, Clone)]
pub struct CounterState {
    pub variates: VariateSource,
    pub metrics: MetricsCollector,
}

impl CounterState {
    pub fn new(seed: u64, horizon: f64) -> Self {
        Self {
            variates: VariateSource::new(seed),
            metrics: MetricsCollector::new(horizon),
        }
    }
}
