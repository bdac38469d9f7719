//! Service-counter queueing model built on the core engine.
//!
//! Customers arrive with exponential interarrival gaps, queue FIFO for one of
//! `server_count` cashiers, hold it for an exponential service time and leave.

pub mod arrivals;
pub mod config;
pub mod customer;
pub mod metrics;
pub mod runner;
pub mod state;
pub mod variates;
