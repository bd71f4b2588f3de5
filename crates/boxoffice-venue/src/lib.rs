//! # boxoffice-venue
//!
//! Seat allocation for a venue laid out as rows of equal width.
//!
//! - [`block`]: contiguous runs of same-state seats.
//! - [`row`]: the gap-free partition of one row into blocks, with pure
//!   split/release/promote transitions that return a new row version.
//! - [`hold`]: outstanding holds and confirmed reservations.
//! - [`venue`]: the synchronization boundary that finds seats, installs
//!   row versions, and reconciles confirmation with hold expiry.

pub mod block;
pub mod hold;
pub mod row;
pub mod venue;

pub use block::{BlockToken, SeatBlock, SeatState};
pub use hold::{Reservation, SeatHold};
pub use row::Row;
pub use venue::{Venue, VenueStats};
