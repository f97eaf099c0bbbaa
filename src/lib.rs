// Library exports for the snake arena
// The CLI binaries and integration tests use the simulation core through this crate

pub mod baseline;
pub mod config;
pub mod decider;
pub mod engine;
pub mod grid;
pub mod oracle;
pub mod replay;
pub mod runner;
pub mod scenario;
pub mod simulator;
pub mod suite;
pub mod tournament;
pub mod trial_log;
pub mod types;
