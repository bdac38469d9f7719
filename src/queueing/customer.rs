use super::state::CounterState;
use crate::core::error::SimError;
use crate::core::process::{Process, ProcessContext, Yield};
use crate::core::types::{PoolId, SimTime};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Not yet run
    Arriving,
    /// Waiting for a cashier
    Queued { arrival: SimTime, slot: usize },
    /// Holding a cashier until the service timeout fires
    InService { slot: usize },
    Departed,
}

/// One customer: arrive, queue for a cashier, get served, leave
#[derive(Debug)]
pub struct CustomerProcess {
    id: u64,
    name: String,
    cashiers: PoolId,
    mean_service: f64,
    phase: Phase,
}

impl CustomerProcess {
    pub fn new(id: u64, cashiers: PoolId, mean_service: f64) -> Self {
        Self {
            id,
            name: format!("Customer {}", id),
            cashiers,
            mean_service,
            phase: Phase::Arriving,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Process<CounterState> for CustomerProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, CounterState>) -> Result<Yield, SimError> {
        let now = ctx.now();
        match self.phase {
            Phase::Arriving => {
                let slot = ctx.state_mut().metrics.open_customer(self.id, now);
                debug!("{} arrives at {}", self.name, now);
                self.phase = Phase::Queued { arrival: now, slot };
                Ok(Yield::Request(self.cashiers))
            }
            Phase::Queued { arrival, slot } => {
                let state = ctx.state_mut();
                let service = state.variates.service(self.mean_service)?;
                let wait = state.metrics.record_grant(slot, now, service)?;
                debug!(
                    "{} waited {:.2} minutes (arrived {}), service {:.2}",
                    self.name, wait, arrival, service
                );
                self.phase = Phase::InService { slot };
                Ok(Yield::Timeout(service))
            }
            Phase::InService { slot } => {
                ctx.release(self.cashiers)?;
                ctx.state_mut().metrics.record_departure(slot, now)?;
                debug!("{} finished service at {}", self.name, now);
                self.phase = Phase::Departed;
                Ok(Yield::Done)
            }
            Phase::Departed => Err(SimError::InvariantViolation(format!(
                "{} resumed after departing",
                self.name
            ))),
        }
    }
}
