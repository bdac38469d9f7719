use super::event::Event;
use super::types::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct ScheduledEvent {
    pub time: SimTime,
    pub sequence_num: u64,
    pub event: Event,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence_num == other.sequence_num
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Time-ordered queue of pending wake-ups, FIFO among equal times
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
}

impl EventScheduler {
    /// Create a new EventScheduler
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Schedule an event to fire at the given absolute time
    pub fn schedule_event(&mut self, event: Event, time: SimTime) {
        let scheduled_event = ScheduledEvent {
            time,
            sequence_num: self.sequence_counter,
            event,
        };

        self.event_queue.push(scheduled_event);
        self.sequence_counter += 1;
    }

    /// Pop all events scheduled for the earliest pending time, in scheduling order
    pub fn get_next_time_events(&mut self) -> Vec<Event> {
        let mut events = Vec::new();

        if let Some(next_time) = self.peek_next_time() {
            while let Some(scheduled_event) = self.event_queue.peek() {
                if scheduled_event.time != next_time {
                    break;
                }
                if let Some(scheduled_event) = self.event_queue.pop() {
                    events.push(scheduled_event.event);
                }
            }
        }

        events
    }

    /// Check if there are any events remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    /// Number of pending events
    pub fn pending(&self) -> usize {
        self.event_queue.len()
    }

    /// Get the next event time without removing events
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|event| event.time)
    }

    /// Total number of events ever scheduled
    pub fn scheduled_total(&self) -> u64 {
        self.sequence_counter
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}
