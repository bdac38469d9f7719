use super::types::ProcessId;
use std::fmt;

/// Why a process is being woken up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// First resumption of a freshly spawned process
    Start,
    /// A timed wait has elapsed
    Timeout,
    /// A queued resource request was granted by a release
    Grant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub target: ProcessId,
    pub kind: EventKind,
}

impl Event {
    pub fn new(target: ProcessId, kind: EventKind) -> Self {
        Self { target, kind }
    }

    pub fn start(target: ProcessId) -> Self {
        Self::new(target, EventKind::Start)
    }

    pub fn timeout(target: ProcessId) -> Self {
        Self::new(target, EventKind::Timeout)
    }

    pub fn grant(target: ProcessId) -> Self {
        Self::new(target, EventKind::Grant)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(process {})", self.kind, self.target)
    }
}
