use super::error::SimError;
use super::event::{Event, EventKind};
use super::event_scheduler::EventScheduler;
use super::process::{pool_mut, pool_ref, Process, ProcessContext, Yield};
use super::resource_pool::{RequestOutcome, ResourcePool};
use super::types::{PoolId, ProcessId, SimTime};
use log::{debug, info, trace};
use std::collections::HashMap;

/// Observer trait for simulation events
pub trait SimulationObserver {
    /// Called when the simulation clock advances
    fn on_time_advance(&mut self, old_time: SimTime, new_time: SimTime);

    /// Called when a simulation step completes
    fn on_step_complete(&mut self, time: SimTime, events_processed: usize, pools: &[ResourcePool]);
}

/// Single-threaded discrete-event engine over a per-run model state `S`.
///
/// Events due at or after the horizon are never processed; any process still suspended
/// at that point is abandoned.
pub struct SimulationEngine<S> {
    scheduler: EventScheduler,
    processes: HashMap<ProcessId, Box<dyn Process<S>>>,
    pools: Vec<ResourcePool>,
    state: S,
    now: SimTime,
    horizon: SimTime,
    next_process_id: ProcessId,
    events_processed: u64,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl<S: 'static> SimulationEngine<S> {
    /// Create a new SimulationEngine that stops at `horizon`
    pub fn new(horizon: f64, state: S) -> Result<Self, SimError> {
        Ok(Self {
            scheduler: EventScheduler::new(),
            processes: HashMap::new(),
            pools: Vec::new(),
            state,
            now: SimTime::ZERO,
            horizon: SimTime::new(horizon)?,
            next_process_id: 0,
            events_processed: 0,
            observers: Vec::new(),
        })
    }

    /// Register a resource pool and return its handle
    pub fn add_pool(&mut self, pool: ResourcePool) -> PoolId {
        self.pools.push(pool);
        PoolId(self.pools.len() - 1)
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Start a process at the current instant
    pub fn spawn(&mut self, process: Box<dyn Process<S>>) -> ProcessId {
        let id = self.next_process_id;
        self.next_process_id += 1;
        debug!("Spawning process {} ({}) at {}", id, process.name(), self.now);
        self.scheduler.schedule_event(Event::start(id), self.now);
        self.processes.insert(id, process);
        id
    }

    /// Notify all observers of a clock advance
    fn notify_time_advance(&mut self, old_time: SimTime, new_time: SimTime) {
        for observer in &mut self.observers {
            observer.on_time_advance(old_time, new_time);
        }
    }

    /// Notify all observers of step completion
    fn notify_step_complete(&mut self, events_processed: usize) {
        for observer in &mut self.observers {
            observer.on_step_complete(self.now, events_processed, &self.pools);
        }
    }

    /// Run the simulation up to the horizon, returns the final clock value
    pub fn run(&mut self) -> Result<SimTime, SimError> {
        info!(
            "Running simulation to horizon {} with {} process(es) and {} pool(s)",
            self.horizon,
            self.processes.len(),
            self.pools.len()
        );

        while self.step()? {}

        if self.now < self.horizon {
            let old_time = self.now;
            self.now = self.horizon;
            self.notify_time_advance(old_time, self.horizon);
        }

        info!(
            "Simulation reached horizon {} after {} event(s); {} process(es) abandoned",
            self.now,
            self.events_processed,
            self.processes.len()
        );
        Ok(self.now)
    }

    /// Process every event due at the next instant, returns false once the run is over
    pub fn step(&mut self) -> Result<bool, SimError> {
        let next_time = match self.scheduler.peek_next_time() {
            Some(time) if time < self.horizon => time,
            _ => return Ok(false),
        };

        if next_time < self.now {
            return Err(SimError::InvariantViolation(format!(
                "event scheduled at {} behind the clock at {}",
                next_time, self.now
            )));
        }
        if next_time > self.now {
            let old_time = self.now;
            self.now = next_time;
            self.notify_time_advance(old_time, next_time);
        }

        debug!("=== Simulation time {} ===", self.now);

        let events = self.scheduler.get_next_time_events();
        let events_count = events.len();

        for event in events {
            self.dispatch(event)?;
        }

        for pool in &self.pools {
            pool.check_invariants()?;
        }

        self.events_processed += events_count as u64;
        self.notify_step_complete(events_count);

        Ok(self.has_pending_events())
    }

    /// Resume the target process until it suspends again
    fn dispatch(&mut self, event: Event) -> Result<(), SimError> {
        let pid = event.target;
        let mut process = self.processes.remove(&pid).ok_or_else(|| {
            SimError::InvariantViolation(format!("{} addressed to an unknown process", event))
        })?;

        trace!("Resuming {} on {} at {}", process.name(), event, self.now);
        if event.kind == EventKind::Grant && pool_waiting(&self.pools, pid) {
            return Err(SimError::InvariantViolation(format!(
                "process {} granted while still queued",
                pid
            )));
        }

        let mut spawned = Vec::new();
        let finished = loop {
            let yielded = {
                let mut ctx = ProcessContext {
                    process_id: pid,
                    now: self.now,
                    state: &mut self.state,
                    pools: &mut self.pools,
                    scheduler: &mut self.scheduler,
                    next_process_id: &mut self.next_process_id,
                    spawned: &mut spawned,
                };
                process.resume(&mut ctx)?
            };

            match yielded {
                Yield::Timeout(delay) => {
                    if !delay.is_finite() || delay < 0.0 {
                        return Err(SimError::InvariantViolation(format!(
                            "{} asked for an invalid delay {}",
                            process.name(),
                            delay
                        )));
                    }
                    self.scheduler.schedule_event(Event::timeout(pid), self.now + delay);
                    break false;
                }
                Yield::Request(pool) => match pool_mut(&mut self.pools, pool)?.request(pid)? {
                    // Granted in the same instant, keep running
                    RequestOutcome::Granted => continue,
                    RequestOutcome::Queued { position } => {
                        trace!("{} waits on {} at position {}", process.name(), pool, position);
                        break false;
                    }
                },
                Yield::Done => break true,
            }
        };

        for (id, child) in spawned {
            debug!("Spawned process {} ({}) at {}", id, child.name(), self.now);
            self.processes.insert(id, child);
        }
        if finished {
            trace!("{} finished at {}", process.name(), self.now);
        } else {
            self.processes.insert(pid, process);
        }
        Ok(())
    }

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    /// Check if there are pending events in the scheduler
    pub fn has_pending_events(&self) -> bool {
        self.scheduler.has_events()
    }

    pub fn pending_events(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Processes that have not terminated (suspended or not yet started)
    pub fn live_processes(&self) -> usize {
        self.processes.len()
    }

    pub fn pool(&self, pool: PoolId) -> Result<&ResourcePool, SimError> {
        pool_ref(&self.pools, pool)
    }

    pub fn pools(&self) -> &[ResourcePool] {
        &self.pools
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Consume the engine, handing back the model state
    pub fn into_state(self) -> S {
        self.state
    }
}

fn pool_waiting(pools: &[ResourcePool], pid: ProcessId) -> bool {
    pools.iter().any(|pool| pool.is_waiting(pid))
}
