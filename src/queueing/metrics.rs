use super::config::ScenarioConfig;
use crate::core::error::SimError;
use crate::core::types::SimTime;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slack allowed when checking utilization against 100 % (float summation)
const UTILIZATION_TOLERANCE: f64 = 1e-9;

/// Lifecycle of one customer as observed during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: u64,
    pub arrival: f64,
    /// Set when a cashier is granted; `None` for a censored customer
    pub wait: Option<f64>,
    pub service: Option<f64>,
    /// Set when the cashier is released before the horizon
    pub departure: Option<f64>,
}

impl CustomerRecord {
    pub fn is_served(&self) -> bool {
        self.wait.is_some()
    }

    pub fn grant_time(&self) -> Option<f64> {
        self.wait.map(|wait| self.arrival + wait)
    }
}

/// Raw samples collected while a single scenario runs.
///
/// Owned by that run's model state; nothing here is shared between runs.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    horizon: f64,
    wait_times: Vec<f64>,
    queue_lengths: Vec<usize>,
    service_times: Vec<f64>,
    /// Service time delivered before the horizon
    busy_time: f64,
    arrivals: u64,
    departures: u64,
    customers: Vec<CustomerRecord>,
}

impl MetricsCollector {
    pub fn new(horizon: f64) -> Self {
        Self {
            horizon,
            wait_times: Vec::new(),
            queue_lengths: Vec::new(),
            service_times: Vec::new(),
            busy_time: 0.0,
            arrivals: 0,
            departures: 0,
            customers: Vec::new(),
        }
    }

    /// Count one arrival and sample the queue length seen right after it
    pub fn record_arrival(&mut self, queue_length: usize) {
        self.arrivals += 1;
        self.queue_lengths.push(queue_length);
    }

    /// Open the record of a customer that just arrived; returns its slot
    pub fn open_customer(&mut self, id: u64, arrival: SimTime) -> usize {
        self.customers.push(CustomerRecord {
            id,
            arrival: arrival.as_f64(),
            wait: None,
            service: None,
            departure: None,
        });
        self.customers.len() - 1
    }

    /// Record a grant: one wait sample and one service sample
    pub fn record_grant(
        &mut self,
        slot: usize,
        grant_time: SimTime,
        service: f64,
    ) -> Result<f64, SimError> {
        let horizon = self.horizon;
        let record = self.customer_mut(slot)?;
        let wait = grant_time.as_f64() - record.arrival;
        if wait < 0.0 {
            return Err(SimError::InvariantViolation(format!(
                "customer {} granted at {} before arriving at {:.2}",
                record.id, grant_time, record.arrival
            )));
        }
        record.wait = Some(wait);
        record.service = Some(service);

        self.wait_times.push(wait);
        self.service_times.push(service);
        self.busy_time += service.min((horizon - grant_time.as_f64()).max(0.0));
        Ok(wait)
    }

    pub fn record_departure(&mut self, slot: usize, time: SimTime) -> Result<(), SimError> {
        self.customer_mut(slot)?.departure = Some(time.as_f64());
        self.departures += 1;
        Ok(())
    }

    fn customer_mut(&mut self, slot: usize) -> Result<&mut CustomerRecord, SimError> {
        self.customers
            .get_mut(slot)
            .ok_or_else(|| SimError::InvariantViolation(format!("no customer record in slot {}", slot)))
    }

    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn served(&self) -> u64 {
        self.wait_times.len() as u64
    }

    pub fn departures(&self) -> u64 {
        self.departures
    }

    pub fn wait_times(&self) -> &[f64] {
        &self.wait_times
    }

    pub fn queue_lengths(&self) -> &[usize] {
        &self.queue_lengths
    }

    pub fn service_times(&self) -> &[f64] {
        &self.service_times
    }

    pub fn busy_time(&self) -> f64 {
        self.busy_time
    }

    pub fn customers(&self) -> &[CustomerRecord] {
        &self.customers
    }

    pub fn into_customers(self) -> Vec<CustomerRecord> {
        self.customers
    }

    /// Reduce the collected samples into the scenario's summary record
    pub fn summarize(&self, config: &ScenarioConfig) -> Result<ScenarioResult, SimError> {
        let served = self.served();
        let arrivals = self.arrivals;
        if served > arrivals {
            return Err(SimError::InvariantViolation(format!(
                "{} customers served but only {} arrived",
                served, arrivals
            )));
        }

        let horizon = config.horizon;
        let capacity_time = config.server_count as f64 * horizon;
        let throughput = if horizon > 0.0 { served as f64 / horizon } else { 0.0 };
        let utilization = if capacity_time > 0.0 {
            self.busy_time / capacity_time * 100.0
        } else {
            0.0
        };
        if utilization > 100.0 + UTILIZATION_TOLERANCE {
            return Err(SimError::InvariantViolation(format!(
                "utilization {:.4}% exceeds the available server time",
                utilization
            )));
        }
        let served_percentage = if arrivals > 0 {
            served as f64 / arrivals as f64 * 100.0
        } else {
            0.0
        };

        let result = ScenarioResult {
            label: config.label.clone(),
            server_count: config.server_count,
            avg_wait: mean(self.wait_times.iter().copied()),
            avg_queue_length: mean(self.queue_lengths.iter().map(|&len| len as f64)),
            throughput,
            utilization,
            total_arrivals: arrivals,
            total_served: served,
            served_percentage,
            customers_completed: self.departures,
            max_queue_length: self.queue_lengths.iter().copied().max().unwrap_or(0),
        };
        debug!("[{}] summarized {:?}", config.label, result);
        Ok(result)
    }
}

/// Arithmetic mean, 0 for an empty series
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Steady-state performance summary of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub label: String,
    pub server_count: usize,
    /// Minutes, over served customers
    pub avg_wait: f64,
    /// Mean of the queue lengths sampled at each arrival (not time-weighted)
    pub avg_queue_length: f64,
    /// Served customers per minute
    pub throughput: f64,
    /// Percent of available server time spent serving
    pub utilization: f64,
    pub total_arrivals: u64,
    pub total_served: u64,
    pub served_percentage: f64,
    /// Customers whose service also finished before the horizon
    pub customers_completed: u64,
    pub max_queue_length: usize,
}

impl fmt::Display for ScenarioResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Simulation Summary: {} ---", self.label)?;
        writeln!(f, "Cashiers: {}", self.server_count)?;
        writeln!(f, "Average Wait Time: {:.2} minutes", self.avg_wait)?;
        writeln!(f, "Average Queue Length: {:.2}", self.avg_queue_length)?;
        writeln!(f, "Throughput: {:.3} customers/minute", self.throughput)?;
        writeln!(f, "Utilization: {:.1}%", self.utilization)?;
        write!(
            f,
            "Customers Served: {} of {} ({:.1}%)",
            self.total_served, self.total_arrivals, self.served_percentage
        )
    }
}
