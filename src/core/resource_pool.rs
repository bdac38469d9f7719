use super::error::SimError;
use super::types::ProcessId;
use log::trace;
use std::collections::VecDeque;

/// Result of asking a pool for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A slot was free and is now held by the requester
    Granted,
    /// All slots are held; the requester waits at this queue position (0 = head)
    Queued { position: usize },
}

/// Bounded set of interchangeable servers with a strict FIFO wait queue.
///
/// A release hands the freed slot straight to the queue head, so `held` stays at
/// `capacity` while anyone is waiting and a newcomer can never overtake the queue.
#[derive(Debug, Clone)]
pub struct ResourcePool {
    name: String,
    capacity: usize,
    held: usize,
    queue: VecDeque<ProcessId>,
    total_requests: u64,
    total_granted: u64,
    max_queue_len: usize,
}

impl ResourcePool {
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self, SimError> {
        let name = name.into();
        if capacity == 0 {
            return Err(SimError::Configuration(format!(
                "resource pool '{}' needs a capacity of at least 1",
                name
            )));
        }
        Ok(Self {
            name,
            capacity,
            held: 0,
            queue: VecDeque::new(),
            total_requests: 0,
            total_granted: 0,
            max_queue_len: 0,
        })
    }

    /// Ask for a slot on behalf of `requester`
    pub fn request(&mut self, requester: ProcessId) -> Result<RequestOutcome, SimError> {
        self.total_requests += 1;

        if self.held < self.capacity {
            self.held += 1;
            self.total_granted += 1;
            trace!("[{}] granted process {} immediately ({}/{})", self.name, requester, self.held, self.capacity);
            self.check_invariants()?;
            return Ok(RequestOutcome::Granted);
        }

        self.queue.push_back(requester);
        self.max_queue_len = self.max_queue_len.max(self.queue.len());
        let position = self.queue.len() - 1;
        trace!("[{}] process {} queued at position {}", self.name, requester, position);
        Ok(RequestOutcome::Queued { position })
    }

    /// Give back one slot. Returns the waiter that received it, if any.
    pub fn release(&mut self) -> Result<Option<ProcessId>, SimError> {
        if self.held == 0 {
            return Err(SimError::InvariantViolation(format!(
                "release on pool '{}' with no slot held",
                self.name
            )));
        }
        self.held -= 1;

        let granted = self.queue.pop_front();
        if let Some(waiter) = granted {
            self.held += 1;
            self.total_granted += 1;
            trace!("[{}] slot passed to queued process {}", self.name, waiter);
        }
        self.check_invariants()?;
        Ok(granted)
    }

    pub fn check_invariants(&self) -> Result<(), SimError> {
        if self.held > self.capacity {
            return Err(SimError::InvariantViolation(format!(
                "pool '{}' holds {} slots with capacity {}",
                self.name, self.held, self.capacity
            )));
        }
        if !self.queue.is_empty() && self.held < self.capacity {
            return Err(SimError::InvariantViolation(format!(
                "pool '{}' has {} waiters while {} of {} slots are free",
                self.name,
                self.queue.len(),
                self.capacity - self.held,
                self.capacity
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn held(&self) -> usize {
        self.held
    }

    pub fn available(&self) -> usize {
        self.capacity - self.held
    }

    /// Current wait-queue length
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_waiting(&self, process: ProcessId) -> bool {
        self.queue.contains(&process)
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn total_granted(&self) -> u64 {
        self.total_granted
    }

    pub fn max_queue_len(&self) -> usize {
        self.max_queue_len
    }
}
