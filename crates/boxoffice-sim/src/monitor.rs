//! Periodic venue reports.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use boxoffice_venue::{Venue, VenueStats};

use crate::registry::cancelled;

/// Log the seat map and a stats line for `venue`, returning the stats.
pub fn report(venue: &Venue) -> VenueStats {
    let stats = venue.stats();
    debug!("Current venue map:\n{venue}");
    info!(
        available = stats.available_seats,
        total = stats.total_seats,
        free_blocks = stats.free_blocks,
        held_blocks = stats.held_blocks,
        reserved_blocks = stats.reserved_blocks,
        outstanding_holds = stats.outstanding_holds,
        reservations = stats.reservations,
        "Venue status"
    );
    stats
}

/// Report immediately, then every `every`, until shutdown.
pub async fn run(venue: Venue, every: Duration, mut cancel: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => break,
            _ = ticker.tick() => {
                report(&venue);
            }
        }
    }

    info!("Monitor stopped");
}
