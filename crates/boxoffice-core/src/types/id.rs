//! Typed identifiers for holds and reservations.
//!
//! Hold ids are issued monotonically by the venue that owns them, so two
//! outstanding holds can never share one. Confirmation ids are random UUIDs;
//! the venue checks them against its reservation map before handing one out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an outstanding seat hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoldId(pub u64);

impl HoldId {
    /// Wrap a raw sequence number.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw sequence number.
    pub fn into_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HoldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HoldId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Identifier handed back to a customer once a hold is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfirmationId(pub Uuid);

impl ConfirmationId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return a reference to the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConfirmationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConfirmationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConfirmationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_id_parses_its_display_form() {
        let id = HoldId::from_raw(42);
        assert_eq!(id.to_string().parse::<HoldId>().unwrap(), id);
        assert_eq!(id.into_raw(), 42);
    }

    #[test]
    fn test_confirmation_ids_are_distinct() {
        let id = ConfirmationId::new();
        assert_ne!(id, ConfirmationId::new());
        assert_eq!(id.as_uuid().get_version_num(), 4);
        assert_eq!(id.to_string().parse::<ConfirmationId>().unwrap(), id);
        assert!("not-a-uuid".parse::<ConfirmationId>().is_err());
    }
}
