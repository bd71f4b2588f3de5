//! Venue layout configuration.

use serde::{Deserialize, Serialize};

/// Seating grid dimensions, fixed for the lifetime of a venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Number of rows in the venue.
    #[serde(default = "default_rows")]
    pub rows: u32,
    /// Number of seats in every row.
    #[serde(default = "default_seats_per_row")]
    pub seats_per_row: u32,
}

impl VenueConfig {
    /// Total number of seats in the grid.
    pub fn capacity(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.seats_per_row)
    }
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            seats_per_row: default_seats_per_row(),
        }
    }
}

fn default_rows() -> u32 {
    10
}

fn default_seats_per_row() -> u32 {
    50
}
