//! # boxoffice-cache
//!
//! In-process expiring map used to own the lifetime of seat holds.
//!
//! Entries are removed by a background sweep once their age reaches the
//! configured TTL, and each entry may carry a callback that fires exactly
//! once when (and only when) the sweep expires it.

pub mod ttl;

pub use ttl::{ExpiryCallback, TtlCache};
