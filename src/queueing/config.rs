use crate::core::error::SimError;
use serde::{Deserialize, Serialize};

/// One staffing/load scenario for the service counter.
///
/// Times are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub label: String,
    pub server_count: usize,
    pub mean_interarrival: f64,
    pub mean_service: f64,
    pub horizon: f64,
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            label: "Base Case".to_string(),
            server_count: 1,
            mean_interarrival: 3.0,
            mean_service: 4.0,
            horizon: 120.0,
            seed: 42,
        }
    }
}

impl ScenarioConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_server_count(mut self, servers: usize) -> Self {
        self.server_count = servers;
        self
    }

    pub fn with_mean_interarrival(mut self, minutes: f64) -> Self {
        self.mean_interarrival = minutes;
        self
    }

    pub fn with_mean_service(mut self, minutes: f64) -> Self {
        self.mean_service = minutes;
        self
    }

    pub fn with_horizon(mut self, minutes: f64) -> Self {
        self.horizon = minutes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The four scenarios compared by the fast-food study, all over 120 minutes with seed 42
    pub fn reference_batch() -> Vec<ScenarioConfig> {
        vec![
            ScenarioConfig::new("Base Case"),
            ScenarioConfig::new("More Cashiers").with_server_count(2),
            ScenarioConfig::new("Peak Time").with_mean_interarrival(2.0),
            ScenarioConfig::new("Peak + More Cashiers")
                .with_server_count(2)
                .with_mean_interarrival(2.0),
        ]
    }

    /// Reject configurations that cannot be simulated.
    ///
    /// A zero horizon is accepted and yields an empty run.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.server_count == 0 {
            return Err(SimError::Configuration(format!(
                "scenario '{}': server count must be at least 1",
                self.label
            )));
        }
        check_positive(&self.label, "mean interarrival time", self.mean_interarrival)?;
        check_positive(&self.label, "mean service time", self.mean_service)?;
        if !self.horizon.is_finite() || self.horizon < 0.0 {
            return Err(SimError::Configuration(format!(
                "scenario '{}': horizon must be finite and non-negative, got {}",
                self.label, self.horizon
            )));
        }
        Ok(())
    }
}

fn check_positive(label: &str, what: &str, value: f64) -> Result<(), SimError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimError::Configuration(format!(
            "scenario '{}': {} must be positive, got {}",
            label, what, value
        )));
    }
    Ok(())
}

/// Enumeration of supported concurrency modes for running a batch of scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    /// Scenarios run one after another on the calling thread
    #[default]
    Sequential,
    /// Independent scenarios run on a Rayon thread pool
    Rayon,
}

/// How a batch of scenarios is executed.
///
/// Each scenario owns all of its mutable state, so the mode never changes the results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub concurrency_mode: ConcurrencyMode,
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_base_case() {
        let config = ScenarioConfig::default();
        assert_eq!(config.label, "Base Case");
        assert_eq!(config.server_count, 1);
        assert_eq!(config.mean_interarrival, 3.0);
        assert_eq!(config.mean_service, 4.0);
        assert_eq!(config.horizon, 120.0);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reference_batch() {
        let batch = ScenarioConfig::reference_batch();
        let shapes: Vec<(usize, f64, f64)> = batch
            .iter()
            .map(|c| (c.server_count, c.mean_interarrival, c.mean_service))
            .collect();
        assert_eq!(shapes, vec![(1, 3.0, 4.0), (2, 3.0, 4.0), (1, 2.0, 4.0), (2, 2.0, 4.0)]);
        assert_eq!(batch[3].label, "Peak + More Cashiers");
        assert!(batch.iter().all(|c| c.horizon == 120.0 && c.seed == 42));
    }

    #[test]
    fn test_validation() {
        let base = ScenarioConfig::default();
        assert!(base.clone().with_server_count(0).validate().unwrap_err().is_configuration());
        assert!(base.clone().with_mean_interarrival(0.0).validate().is_err());
        assert!(base.clone().with_mean_service(-4.0).validate().is_err());
        assert!(base.clone().with_mean_service(f64::NAN).validate().is_err());
        assert!(base.clone().with_horizon(-1.0).validate().is_err());
        assert!(base.with_horizon(0.0).validate().is_ok());
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new()
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(4);
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Rayon);
        assert_eq!(config.thread_pool_size, Some(4));
        assert_eq!(BatchConfig::default().concurrency_mode, ConcurrencyMode::Sequential);
    }

    #[test]
    fn test_scenarios_load_from_json() {
        let json = r#"[{"label":"Lunch","server_count":3,"mean_interarrival":1.5,"mean_service":4.0,"horizon":60.0,"seed":7}]"#;
        let scenarios: Vec<ScenarioConfig> = serde_json::from_str(json).unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].server_count, 3);
        assert_eq!(scenarios[0].seed, 7);
    }
}
