//! Shared value types.

pub mod id;

pub use id::{ConfirmationId, HoldId};
