//! Simulation driver: spawn the monitor and customers, stop at sell-out.

use std::future::Future;

use tracing::info;

use boxoffice_core::config::SimulatorConfig;
use boxoffice_venue::{Venue, VenueStats};

use crate::customer::Customer;
use crate::monitor;
use crate::registry::{ShutdownReport, TaskRegistry};

/// Why a simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationOutcome {
    /// Every seat was held or reserved.
    SoldOut,
    /// The external shutdown signal fired first.
    Interrupted,
}

/// Summary returned by [`Simulator::run`].
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Why the simulation ended.
    pub outcome: SimulationOutcome,
    /// Venue state after the background tasks stopped.
    pub final_stats: VenueStats,
    /// How the background tasks shut down.
    pub tasks: ShutdownReport,
}

/// Runs simulated customers against a venue.
#[derive(Debug)]
pub struct Simulator {
    venue: Venue,
    config: SimulatorConfig,
}

impl Simulator {
    /// Create a simulator for `venue`.
    pub fn new(venue: Venue, config: SimulatorConfig) -> Self {
        Self { venue, config }
    }

    /// Run until the venue sells out or `shutdown` resolves, then stop every
    /// background task within the configured grace period.
    pub async fn run<S>(self, shutdown: S) -> SimulationReport
    where
        S: Future<Output = ()>,
    {
        info!(
            workers = self.config.workers,
            capacity = self.venue.capacity(),
            "Starting simulation"
        );

        let mut registry = TaskRegistry::new();
        let cancel = registry.subscribe();
        registry.spawn(
            "monitor",
            monitor::run(self.venue.clone(), self.config.monitor_interval(), cancel),
        );
        for i in 0..self.config.workers {
            let name = format!("customer-{i}");
            let customer = Customer::new(name.clone(), self.venue.clone(), self.config.clone());
            let cancel = registry.subscribe();
            registry.spawn(name, customer.run(cancel));
        }

        let outcome = tokio::select! {
            _ = shutdown => {
                info!("Shutdown requested, stopping simulation");
                SimulationOutcome::Interrupted
            }
            _ = self.wait_for_sell_out() => {
                info!("Sold out!");
                SimulationOutcome::SoldOut
            }
        };

        let tasks = registry.shutdown(self.config.shutdown_grace()).await;
        let final_stats = monitor::report(&self.venue);

        SimulationReport {
            outcome,
            final_stats,
            tasks,
        }
    }

    /// Poll `seats_available` until it reads zero.
    async fn wait_for_sell_out(&self) {
        loop {
            let open = self.venue.seats_available();
            if open == 0 {
                return;
            }
            info!(open, "Seats still available");
            tokio::time::sleep(self.config.availability_poll()).await;
        }
    }
}
