//! Seat hold expiration configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lifetime of unconfirmed holds and the cadence of the expiry sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldConfig {
    /// Milliseconds an unconfirmed hold lives before its seats are released.
    #[serde(default = "default_ttl")]
    pub ttl_millis: u64,
    /// Milliseconds between background expiry sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_millis: u64,
}

impl HoldConfig {
    /// Hold time-to-live as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_millis)
    }

    /// Sweep interval as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_millis)
    }
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            ttl_millis: default_ttl(),
            sweep_interval_millis: default_sweep_interval(),
        }
    }
}

fn default_ttl() -> u64 {
    10_000
}

fn default_sweep_interval() -> u64 {
    5
}
