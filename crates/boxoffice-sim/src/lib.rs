//! # boxoffice-sim
//!
//! Drives a [`Venue`](boxoffice_venue::Venue) with simulated customers until
//! it sells out or shutdown is requested.
//!
//! - [`customer`]: one simulated customer repeatedly holding and confirming.
//! - [`monitor`]: periodic venue reports.
//! - [`registry`]: background task lifecycle with graceful shutdown.
//! - [`simulator`]: wires the above together and watches for sell-out.

pub mod customer;
pub mod monitor;
pub mod registry;
pub mod simulator;

pub use customer::{Customer, Visit};
pub use registry::{ShutdownReport, TaskRegistry};
pub use simulator::{SimulationOutcome, SimulationReport, Simulator};
