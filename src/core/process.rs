//! Resumable processes driven by the simulation engine.
//!
//! A process is an explicit state machine. Each call to [`Process::resume`] runs it up to its
//! next suspension point and reports that point as a [`Yield`]. The engine decides when the
//! process is resumed again: after a timed wait, once a resource pool grants it a slot, or never
//! (when it is done or the horizon is reached first).

use super::error::SimError;
use super::event::Event;
use super::event_scheduler::EventScheduler;
use super::resource_pool::ResourcePool;
use super::types::{PoolId, ProcessId, SimTime};

/// Suspension point reported by a process
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Yield {
    /// Resume after this many time units
    Timeout(f64),
    /// Resume once the pool has granted a slot (possibly right away)
    Request(PoolId),
    /// The process has terminated
    Done,
}

pub trait Process<S> {
    fn name(&self) -> &str;

    fn resume(&mut self, ctx: &mut ProcessContext<'_, S>) -> Result<Yield, SimError>;
}

/// Everything a process may touch while it is the one running
pub struct ProcessContext<'a, S> {
    pub(crate) process_id: ProcessId,
    pub(crate) now: SimTime,
    pub(crate) state: &'a mut S,
    pub(crate) pools: &'a mut [ResourcePool],
    pub(crate) scheduler: &'a mut EventScheduler,
    pub(crate) next_process_id: &'a mut ProcessId,
    pub(crate) spawned: &'a mut Vec<(ProcessId, Box<dyn Process<S>>)>,
}

impl<'a, S> ProcessContext<'a, S> {
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn self_id(&self) -> ProcessId {
        self.process_id
    }

    pub fn state(&self) -> &S {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut *self.state
    }

    /// Start a new process at the current instant.
    ///
    /// The caller keeps running; the new process first runs after every event already
    /// scheduled for this instant.
    pub fn spawn(&mut self, process: Box<dyn Process<S>>) -> ProcessId {
        let id = *self.next_process_id;
        *self.next_process_id += 1;
        self.scheduler.schedule_event(Event::start(id), self.now);
        self.spawned.push((id, process));
        id
    }

    /// Release one slot of `pool`; a queued waiter that receives it resumes at this instant
    pub fn release(&mut self, pool: PoolId) -> Result<Option<ProcessId>, SimError> {
        let granted = pool_mut(self.pools, pool)?.release()?;
        if let Some(waiter) = granted {
            self.scheduler.schedule_event(Event::grant(waiter), self.now);
        }
        Ok(granted)
    }

    pub fn queue_len(&self, pool: PoolId) -> Result<usize, SimError> {
        Ok(pool_ref(self.pools, pool)?.queue_len())
    }

    pub fn held(&self, pool: PoolId) -> Result<usize, SimError> {
        Ok(pool_ref(self.pools, pool)?.held())
    }
}

pub(crate) fn pool_ref(pools: &[ResourcePool], pool: PoolId) -> Result<&ResourcePool, SimError> {
    pools
        .get(pool.0)
        .ok_or_else(|| SimError::InvariantViolation(format!("unknown resource {}", pool)))
}

pub(crate) fn pool_mut(pools: &mut [ResourcePool], pool: PoolId) -> Result<&mut ResourcePool, SimError> {
    pools
        .get_mut(pool.0)
        .ok_or_else(|| SimError::InvariantViolation(format!("unknown resource {}", pool)))
}
