//! Shared library surface for the trackmiles driver and its tests.

pub mod config;
pub mod error;
pub mod loops;
pub mod scenario;
pub mod simulation;
pub mod state;
pub mod traffic;

pub use error::SimError;
pub use simulation::Simulation;
