//! Load simulator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the simulated customers, the monitor, and shutdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Number of concurrent simulated customers.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Upper bound (inclusive) on the seats a single customer asks for.
    #[serde(default = "default_max_seats")]
    pub max_seats_per_hold: u32,
    /// Delay in milliseconds between a customer's attempts.
    #[serde(default = "default_hold_interval")]
    pub hold_interval_millis: u64,
    /// Upper bound (exclusive) in milliseconds on how long a customer
    /// sits on a hold before confirming it.
    #[serde(default = "default_max_think")]
    pub max_think_millis: u64,
    /// Interval in seconds between monitor reports.
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_seconds: u64,
    /// Interval in milliseconds between sold-out checks.
    #[serde(default = "default_availability_poll")]
    pub availability_poll_millis: u64,
    /// Seconds each task is given to finish after shutdown is signalled.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl SimulatorConfig {
    /// Delay between a customer's attempts.
    pub fn hold_interval(&self) -> Duration {
        Duration::from_millis(self.hold_interval_millis)
    }

    /// Interval between monitor reports.
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_seconds)
    }

    /// Interval between sold-out checks.
    pub fn availability_poll(&self) -> Duration {
        Duration::from_millis(self.availability_poll_millis)
    }

    /// Grace period granted to each task on shutdown.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_seats_per_hold: default_max_seats(),
            hold_interval_millis: default_hold_interval(),
            max_think_millis: default_max_think(),
            monitor_interval_seconds: default_monitor_interval(),
            availability_poll_millis: default_availability_poll(),
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

fn default_workers() -> usize {
    4
}

fn default_max_seats() -> u32 {
    4
}

fn default_hold_interval() -> u64 {
    2_000
}

fn default_max_think() -> u64 {
    10_000
}

fn default_monitor_interval() -> u64 {
    10
}

fn default_availability_poll() -> u64 {
    5_000
}

fn default_shutdown_grace() -> u64 {
    5
}
