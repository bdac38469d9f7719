pub mod error;
pub mod event;
pub mod event_scheduler;
pub mod process;
pub mod resource_pool;
pub mod simulation_engine;
pub mod types;
