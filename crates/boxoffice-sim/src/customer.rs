//! Simulated customer: hold a random party size, think, then confirm.

use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use boxoffice_core::config::SimulatorConfig;
use boxoffice_core::result::AppResult;
use boxoffice_core::types::{ConfirmationId, HoldId};
use boxoffice_venue::Venue;

use crate::registry::cancelled;

/// Domain used for generated customer identities.
const IDENTITY_DOMAIN: &str = "boxoffice.test";

/// What happened during one visit to the box office.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    /// No row could seat the party.
    Refused { seats: u32 },
    /// The hold was placed and confirmed in time.
    Confirmed {
        hold_id: HoldId,
        confirmation_id: ConfirmationId,
    },
    /// The hold expired before the customer came back.
    Lapsed { hold_id: HoldId },
    /// Shutdown arrived while the customer was thinking.
    Interrupted { hold_id: HoldId },
}

/// One simulated customer loop.
#[derive(Debug, Clone)]
pub struct Customer {
    name: String,
    venue: Venue,
    config: SimulatorConfig,
}

impl Customer {
    /// Create a customer driving `venue`.
    pub fn new(name: impl Into<String>, venue: Venue, config: SimulatorConfig) -> Self {
        Self {
            name: name.into(),
            venue,
            config,
        }
    }

    /// Visit the box office every `hold_interval` until shutdown.
    pub async fn run(self, mut cancel: watch::Receiver<bool>) {
        info!(customer = %self.name, "Customer started");

        loop {
            match self.visit(&mut cancel).await {
                Ok(Visit::Interrupted { .. }) => break,
                Ok(_) => {}
                Err(e) => warn!(customer = %self.name, error = %e, "Visit failed"),
            }

            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => break,
                _ = tokio::time::sleep(self.config.hold_interval()) => {}
            }
        }

        info!(customer = %self.name, "Customer stopped");
    }

    /// Hold a random number of seats under a fresh identity, wait a random
    /// think time, then try to confirm.
    pub async fn visit(&self, cancel: &mut watch::Receiver<bool>) -> AppResult<Visit> {
        let (seats, think) = self.draw();
        let identity = format!("{}@{IDENTITY_DOMAIN}", Uuid::new_v4());

        let Some(hold) = self.venue.hold(seats, &identity)? else {
            info!(customer = %self.name, seats, identity = %identity, "Could not hold seats");
            return Ok(Visit::Refused { seats });
        };
        let hold_id = hold.id();
        debug!(
            customer = %self.name,
            hold_id = %hold_id,
            think_ms = think.as_millis() as u64,
            "Thinking"
        );

        tokio::select! {
            biased;
            _ = cancelled(cancel) => {
                debug!(
                    customer = %self.name,
                    hold_id = %hold_id,
                    "Interrupted, leaving hold to expire"
                );
                return Ok(Visit::Interrupted { hold_id });
            }
            _ = tokio::time::sleep(think) => {}
        }

        match self.venue.confirm(hold_id, &identity)? {
            Some(confirmation_id) => {
                info!(
                    customer = %self.name,
                    seats,
                    identity = %identity,
                    confirmation_id = %confirmation_id,
                    "Reservation confirmed"
                );
                Ok(Visit::Confirmed {
                    hold_id,
                    confirmation_id,
                })
            }
            None => {
                info!(
                    customer = %self.name,
                    hold_id = %hold_id,
                    identity = %identity,
                    "Hold lapsed before confirmation"
                );
                Ok(Visit::Lapsed { hold_id })
            }
        }
    }

    /// Party size in `1..=max_seats_per_hold` and think time below
    /// `max_think_millis`.
    fn draw(&self) -> (u32, Duration) {
        let mut rng = rand::rng();
        let seats = rng.random_range(1..=self.config.max_seats_per_hold.max(1));
        let think = rng.random_range(0..self.config.max_think_millis.max(1));
        (seats, Duration::from_millis(think))
    }
}
