use super::error::SimError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// Identifier of a process, assigned in spawn order
pub type ProcessId = u64;

/// Index of a resource pool registered with the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(pub(crate) usize);

impl PoolId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// Point in simulated time.
///
/// Always finite and non-negative, which is what makes the total order below sound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimTime(f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// Create a SimTime, rejecting negative, NaN and infinite values
    pub fn new(value: f64) -> Result<Self, SimError> {
        if !value.is_finite() || value < 0.0 {
            return Err(SimError::Configuration(format!(
                "simulation time must be finite and non-negative, got {value}"
            )));
        }
        Ok(SimTime(value))
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Elapsed time since `earlier`, clamped at zero
    pub fn since(&self, earlier: SimTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::ZERO
    }
}

impl Add<f64> for SimTime {
    type Output = SimTime;

    /// Advance by a non-negative duration. Callers validate the delay first.
    fn add(self, delay: f64) -> Self::Output {
        SimTime(self.0 + delay)
    }
}

impl Sub<SimTime> for SimTime {
    type Output = f64;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
