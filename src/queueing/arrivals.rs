use super::customer::CustomerProcess;
use super::state::CounterState;
use crate::core::error::SimError;
use crate::core::process::{Process, ProcessContext, Yield};
use crate::core::types::PoolId;
use log::trace;

/// Perpetual customer generator.
///
/// Sleeps for an exponential interarrival gap, spawns the next customer, samples the
/// cashier queue, repeats. It only stops when the horizon abandons it.
#[derive(Debug)]
pub struct ArrivalProcess {
    cashiers: PoolId,
    mean_interarrival: f64,
    mean_service: f64,
    spawned: u64,
    started: bool,
}

impl ArrivalProcess {
    pub fn new(cashiers: PoolId, mean_interarrival: f64, mean_service: f64) -> Self {
        Self {
            cashiers,
            mean_interarrival,
            mean_service,
            spawned: 0,
            started: false,
        }
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }
}

impl Process<CounterState> for ArrivalProcess {
    fn name(&self) -> &str {
        "Customer Arrivals"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, CounterState>) -> Result<Yield, SimError> {
        if self.started {
            self.spawned += 1;
            let customer = CustomerProcess::new(self.spawned, self.cashiers, self.mean_service);
            ctx.spawn(Box::new(customer));

            // The new customer has not run yet, so it is not part of this sample
            let queue_length = ctx.queue_len(self.cashiers)?;
            ctx.state_mut().metrics.record_arrival(queue_length);
            trace!("Arrival {} at {} sees {} waiting", self.spawned, ctx.now(), queue_length);
        }
        self.started = true;

        let gap = ctx.state_mut().variates.interarrival(self.mean_interarrival)?;
        Ok(Yield::Timeout(gap))
    }
}
