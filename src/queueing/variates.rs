use crate::core::error::SimError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Exp;

/// Which purpose a draw serves. Each purpose has its own stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Interarrival,
    Service,
}

/// Exponential duration generator for one scenario run.
///
/// Interarrival and service draws come from two generators derived from the scenario
/// seed (common random numbers). Scenarios that share a seed therefore see the same
/// arrival instants and hand the n-th served customer the same service draw, whatever
/// their server count.
#[derive(Debug, Clone)]
pub struct VariateSource {
    interarrival_rng: StdRng,
    service_rng: StdRng,
    draws: u64,
}

impl VariateSource {
    pub fn new(seed: u64) -> Self {
        let mut root = StdRng::seed_from_u64(seed);
        Self {
            interarrival_rng: StdRng::seed_from_u64(root.gen()),
            service_rng: StdRng::seed_from_u64(root.gen()),
            draws: 0,
        }
    }

    /// Draw from an exponential distribution with the given mean (rate `1 / mean`)
    pub fn exponential(&mut self, stream: Stream, mean: f64) -> Result<f64, SimError> {
        let dist = exponential_with_mean(mean)?;
        self.draws += 1;
        let rng = match stream {
            Stream::Interarrival => &mut self.interarrival_rng,
            Stream::Service => &mut self.service_rng,
        };
        Ok(rng.sample(dist))
    }

    pub fn interarrival(&mut self, mean: f64) -> Result<f64, SimError> {
        self.exponential(Stream::Interarrival, mean)
    }

    pub fn service(&mut self, mean: f64) -> Result<f64, SimError> {
        self.exponential(Stream::Service, mean)
    }

    /// Total number of variates drawn so far
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

fn exponential_with_mean(mean: f64) -> Result<Exp<f64>, SimError> {
    if !mean.is_finite() || mean <= 0.0 {
        return Err(SimError::Configuration(format!(
            "exponential mean must be positive, got {}",
            mean
        )));
    }
    Exp::new(1.0 / mean)
        .map_err(|e| SimError::Configuration(format!("exponential mean {}: {}", mean, e)))
}
