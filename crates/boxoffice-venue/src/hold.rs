//! Outstanding holds and confirmed reservations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use boxoffice_core::types::{ConfirmationId, HoldId};

use crate::block::SeatBlock;

/// A time-bounded claim on a HELD block, bound to the customer who made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatHold {
    /// Hold identifier, unique among all holds issued by a venue.
    id: HoldId,
    /// The HELD block this hold claimed.
    block: SeatBlock,
    /// Identity (usually an email) of the customer who placed the hold.
    identity: String,
    /// When the hold was placed.
    held_at: DateTime<Utc>,
}

impl SeatHold {
    pub(crate) fn new(id: HoldId, block: SeatBlock, identity: impl Into<String>) -> Self {
        Self {
            id,
            block,
            identity: identity.into(),
            held_at: Utc::now(),
        }
    }

    /// Hold identifier to pass to `Venue::confirm`.
    pub fn id(&self) -> HoldId {
        self.id
    }

    /// The HELD block.
    pub fn block(&self) -> &SeatBlock {
        &self.block
    }

    /// Customer identity that owns the hold.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// When the hold was placed.
    pub fn held_at(&self) -> DateTime<Utc> {
        self.held_at
    }

    /// Number of seats held.
    pub fn seat_count(&self) -> u32 {
        self.block.seat_count()
    }
}

/// A confirmed, final claim on a RESERVED block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Confirmation code returned to the customer.
    pub confirmation_id: ConfirmationId,
    /// The hold this reservation replaced.
    pub hold_id: HoldId,
    /// The RESERVED block.
    pub block: SeatBlock,
    /// Customer identity that owns the reservation.
    pub identity: String,
    /// When the hold was confirmed.
    pub confirmed_at: DateTime<Utc>,
}
