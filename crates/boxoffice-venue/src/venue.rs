//! Venue-level orchestration of holds, confirmations, and expiry.
//!
//! The venue is the single synchronization boundary for seat state. Its
//! ledger lock serializes `hold`, `confirm`, and expiry releases; row
//! versions are only ever installed while that lock is held.
//!
//! Hold lifetimes are owned by a [`TtlCache`]. Confirmation and expiry race
//! for the cache entry: the cache hands an entry to exactly one of an
//! explicit `remove` (confirm wins) or the sweep (expiry wins), so a block
//! is never both reserved and released.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use boxoffice_cache::TtlCache;
use boxoffice_core::config::{AppConfig, HoldConfig, VenueConfig};
use boxoffice_core::error::AppError;
use boxoffice_core::result::AppResult;
use boxoffice_core::types::{ConfirmationId, HoldId};

use crate::block::{SeatBlock, SeatState};
use crate::hold::{Reservation, SeatHold};
use crate::row::Row;

/// Point-in-time summary of the venue, for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueStats {
    /// Seats in the whole grid.
    pub total_seats: u64,
    /// Seats in FREE blocks.
    pub available_seats: u64,
    /// Number of FREE blocks.
    pub free_blocks: usize,
    /// Number of HELD blocks.
    pub held_blocks: usize,
    /// Number of RESERVED blocks.
    pub reserved_blocks: usize,
    /// Holds not yet confirmed or swept, including expired ones awaiting
    /// the sweep.
    pub outstanding_holds: usize,
    /// Confirmed reservations.
    pub reservations: usize,
}

/// State guarded by the venue lock.
#[derive(Debug, Default)]
struct Ledger {
    /// Sequence number of the next hold.
    next_hold_id: u64,
    /// Confirmed reservations by confirmation code.
    reservations: HashMap<ConfirmationId, Reservation>,
}

impl Ledger {
    fn issue_hold_id(&mut self) -> HoldId {
        self.next_hold_id += 1;
        HoldId::from_raw(self.next_hold_id)
    }

    fn issue_confirmation_id(&self) -> ConfirmationId {
        loop {
            let id = ConfirmationId::new();
            if !self.reservations.contains_key(&id) {
                return id;
            }
        }
    }
}

#[derive(Debug)]
struct VenueInner {
    /// Seats per row.
    width: u32,
    /// Current row version per row index. Replaced only under `ledger`.
    rows: Vec<RwLock<Arc<Row>>>,
    /// The venue lock.
    ledger: Mutex<Ledger>,
    /// Outstanding holds, expiring after the configured TTL.
    holds: TtlCache<HoldId, SeatHold>,
}

impl VenueInner {
    fn lock_ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn slot(&self, row: u32) -> AppResult<&RwLock<Arc<Row>>> {
        self.rows
            .get(row as usize)
            .ok_or_else(|| AppError::invariant(format!("Row {row} does not exist")))
    }

    fn current(slot: &RwLock<Arc<Row>>) -> Arc<Row> {
        Arc::clone(&slot.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Replace a row version. Callers must hold the venue lock.
    fn install(slot: &RwLock<Arc<Row>>, row: Row) {
        *slot.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(row);
    }

    fn snapshot(&self) -> Vec<Arc<Row>> {
        self.rows.iter().map(Self::current).collect()
    }

    /// Expiry path: return a swept hold's seats to the FREE pool.
    fn release_expired(&self, hold: &SeatHold) -> AppResult<()> {
        let _ledger = self.lock_ledger();
        let slot = self.slot(hold.block().row())?;
        let next = Self::current(slot).with_block_state(hold.block(), SeatState::Free)?;
        Self::install(slot, next);

        info!(
            hold_id = %hold.id(),
            row = hold.block().row(),
            start = hold.block().start(),
            seats = hold.seat_count(),
            identity = hold.identity(),
            "Hold expired, seats released"
        );
        Ok(())
    }
}

/// A venue of equal-width rows offering two-phase seat allocation.
///
/// Cloning yields another handle to the same venue.
#[derive(Debug, Clone)]
pub struct Venue {
    inner: Arc<VenueInner>,
}

impl Venue {
    /// Build a venue with every seat FREE and start its hold sweeper.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(layout: &VenueConfig, holds: &HoldConfig) -> AppResult<Self> {
        if layout.rows == 0 {
            return Err(AppError::configuration("A venue needs at least one row"));
        }

        let rows = (0..layout.rows)
            .map(|number| Row::new(number, layout.seats_per_row).map(|r| RwLock::new(Arc::new(r))))
            .collect::<AppResult<Vec<_>>>()?;
        let cache = TtlCache::new(holds.ttl(), holds.sweep_interval())?;

        info!(
            rows = layout.rows,
            seats_per_row = layout.seats_per_row,
            ttl_ms = holds.ttl_millis,
            "Venue initialized"
        );

        Ok(Self {
            inner: Arc::new(VenueInner {
                width: layout.seats_per_row,
                rows,
                ledger: Mutex::new(Ledger::default()),
                holds: cache,
            }),
        })
    }

    /// Build a venue from the `venue` and `holds` sections of `config`.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(&config.venue, &config.holds)
    }

    /// Seats in the whole grid.
    pub fn capacity(&self) -> u64 {
        self.inner.rows.len() as u64 * u64::from(self.inner.width)
    }

    /// Number of FREE seats.
    ///
    /// Deliberately reads without the venue lock: the result may be stale
    /// while a hold, confirm, or expiry is in flight, and is never a
    /// guarantee that a subsequent hold will succeed.
    pub fn seats_available(&self) -> u64 {
        self.inner
            .rows
            .iter()
            .map(|slot| u64::from(VenueInner::current(slot).available_count()))
            .sum()
    }

    /// Hold `seats` contiguous seats for `identity`.
    ///
    /// Takes the first FREE block large enough in the first row that has
    /// one. Returns `Ok(None)` when no single row can seat the party; a
    /// request for zero seats is a validation error.
    pub fn hold(&self, seats: u32, identity: &str) -> AppResult<Option<SeatHold>> {
        if seats == 0 {
            return Err(AppError::validation("Cannot hold zero seats"));
        }

        let mut ledger = self.inner.lock_ledger();

        for slot in &self.inner.rows {
            let row = VenueInner::current(slot);
            let Some(block) = row.first_fit_candidates(seats).next().cloned() else {
                continue;
            };

            let hold_id = ledger.issue_hold_id();
            let (next, hold) = row.claim(&block, seats, hold_id, identity)?;
            VenueInner::install(slot, next);

            let venue = Arc::downgrade(&self.inner);
            self.inner
                .holds
                .put_with_callback(hold_id, hold.clone(), move |expired: SeatHold| {
                    match venue.upgrade() {
                        Some(venue) => venue.release_expired(&expired),
                        None => Ok(()),
                    }
                });

            info!(
                hold_id = %hold_id,
                row = row.number(),
                start = block.start(),
                seats,
                identity,
                "Seats held"
            );
            return Ok(Some(hold));
        }

        debug!(seats, identity, "No row can seat the party");
        Ok(None)
    }

    /// Confirm an outstanding hold, turning its seats RESERVED.
    ///
    /// Returns `Ok(None)` if the hold is unknown or has already expired.
    /// Fails with an identity-mismatch error, leaving the hold untouched,
    /// if `identity` is not the customer who placed it.
    pub fn confirm(&self, hold_id: HoldId, identity: &str) -> AppResult<Option<ConfirmationId>> {
        let mut ledger = self.inner.lock_ledger();

        let Some(hold) = self.inner.holds.get(&hold_id) else {
            debug!(hold_id = %hold_id, "Hold not found or expired");
            return Ok(None);
        };
        if hold.identity() != identity {
            warn!(hold_id = %hold_id, identity, "Confirmation attempted by non-owner");
            return Err(AppError::identity_mismatch(format!(
                "Hold {hold_id} does not belong to {identity}"
            )));
        }
        // The sweep may have claimed the entry since the lookup.
        if self.inner.holds.remove(&hold_id).is_none() {
            debug!(hold_id = %hold_id, "Hold expired during confirmation");
            return Ok(None);
        }

        let slot = self.inner.slot(hold.block().row())?;
        let next = VenueInner::current(slot).with_block_state(hold.block(), SeatState::Reserved)?;
        VenueInner::install(slot, next);

        let confirmation_id = ledger.issue_confirmation_id();
        ledger.reservations.insert(
            confirmation_id,
            Reservation {
                confirmation_id,
                hold_id,
                block: hold.block().with_state(SeatState::Reserved),
                identity: identity.to_string(),
                confirmed_at: Utc::now(),
            },
        );

        info!(
            hold_id = %hold_id,
            confirmation_id = %confirmation_id,
            seats = hold.seat_count(),
            identity,
            "Hold confirmed"
        );
        Ok(Some(confirmation_id))
    }

    /// Look up a confirmed reservation.
    pub fn reservation(&self, confirmation_id: &ConfirmationId) -> Option<Reservation> {
        self.inner
            .lock_ledger()
            .reservations
            .get(confirmation_id)
            .cloned()
    }

    /// Number of holds that are neither confirmed nor swept yet.
    ///
    /// A hold past its TTL still counts until the sweep releases its seats.
    pub fn outstanding_holds(&self) -> usize {
        self.inner.holds.len()
    }

    /// Every block in `state`, across all rows, in row then seat order.
    ///
    /// Diagnostic read; not part of the allocation protocol.
    pub fn find_blocks(&self, state: SeatState) -> Vec<SeatBlock> {
        self.inner
            .snapshot()
            .iter()
            .flat_map(|row| row.blocks_in(state).cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Current version of every row.
    pub fn rows(&self) -> Vec<Arc<Row>> {
        self.inner.snapshot()
    }

    /// Monitoring summary taken from one snapshot of the rows.
    pub fn stats(&self) -> VenueStats {
        let rows = self.inner.snapshot();
        let count = |state: SeatState| -> usize {
            rows.iter().map(|r| r.blocks_in(state).count()).sum()
        };
        let reservations = self.inner.lock_ledger().reservations.len();

        VenueStats {
            total_seats: self.capacity(),
            available_seats: rows.iter().map(|r| u64::from(r.available_count())).sum(),
            free_blocks: count(SeatState::Free),
            held_blocks: count(SeatState::Held),
            reserved_blocks: count(SeatState::Reserved),
            outstanding_holds: self.outstanding_holds(),
            reservations,
        }
    }

    /// Verify that the rows partition the full grid exactly.
    pub fn check_partition(&self) -> AppResult<()> {
        let _ledger = self.inner.lock_ledger();
        for (index, row) in self.inner.snapshot().iter().enumerate() {
            if row.number() as usize != index || row.width() != self.inner.width {
                return Err(AppError::invariant(format!(
                    "Slot {index} holds row {} of width {}",
                    row.number(),
                    row.width()
                )));
            }
            row.check_partition()?;
        }
        Ok(())
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.inner.snapshot() {
            writeln!(f, "{:>4} {row}", row.number())?;
        }
        Ok(())
    }
}
