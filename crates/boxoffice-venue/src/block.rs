//! Seat blocks: maximal runs of same-state seats within one row.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use boxoffice_core::error::AppError;
use boxoffice_core::result::AppResult;

/// Lifecycle state of a run of seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatState {
    /// Open for anyone to hold.
    Free,
    /// Claimed by an unconfirmed hold.
    Held,
    /// Confirmed. Never released.
    Reserved,
}

impl SeatState {
    /// Single-character glyph used in seat maps.
    pub fn glyph(self) -> char {
        match self {
            Self::Free => '.',
            Self::Held => 'h',
            Self::Reserved => 'R',
        }
    }
}

impl fmt::Display for SeatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "FREE"),
            Self::Held => write!(f, "HELD"),
            Self::Reserved => write!(f, "RESERVED"),
        }
    }
}

/// Opaque identity of a block, unique within the row that minted it.
///
/// Two blocks with the same state and length are still different blocks;
/// rows locate "the same block" by token, never by shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockToken(pub(crate) u64);

/// An immutable, non-empty run of seats sharing one state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatBlock {
    token: BlockToken,
    state: SeatState,
    row: u32,
    start: u32,
    seat_count: u32,
}

impl SeatBlock {
    pub(crate) fn new(
        token: BlockToken,
        state: SeatState,
        row: u32,
        start: u32,
        seat_count: u32,
    ) -> Self {
        debug_assert!(seat_count > 0, "seat blocks are never empty");
        Self {
            token,
            state,
            row,
            start,
            seat_count,
        }
    }

    /// Identity token of this block.
    pub fn token(&self) -> BlockToken {
        self.token
    }

    /// Current state of every seat in the block.
    pub fn state(&self) -> SeatState {
        self.state
    }

    /// Row index the block lives in.
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Offset of the first seat.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Number of seats in the block (always positive).
    pub fn seat_count(&self) -> u32 {
        self.seat_count
    }

    /// Offset one past the last seat.
    pub fn end(&self) -> u32 {
        self.start + self.seat_count
    }

    /// Seat offsets covered by the block.
    pub fn seats(&self) -> Range<u32> {
        self.start..self.end()
    }

    /// Returns `true` if the two blocks share at least one seat.
    pub fn overlaps(&self, other: &SeatBlock) -> bool {
        self.row == other.row && self.start < other.end() && other.start < self.end()
    }

    /// Copy of this block, same identity, carrying `state`.
    pub(crate) fn with_state(&self, state: SeatState) -> Self {
        Self { state, ..self.clone() }
    }

    /// Coalesce two adjacent FREE blocks of one row into a single FREE block.
    ///
    /// The merged block keeps the left block's token. Fails with an
    /// invariant error if either block is not FREE, the rows differ, or
    /// `left` does not end exactly where `right` starts.
    pub fn merge(left: &SeatBlock, right: &SeatBlock) -> AppResult<SeatBlock> {
        if left.state != SeatState::Free || right.state != SeatState::Free {
            return Err(AppError::invariant(format!(
                "Cannot merge {} block with {} block",
                left.state, right.state
            )));
        }
        if left.row != right.row {
            return Err(AppError::invariant(format!(
                "Cannot merge blocks from rows {} and {}",
                left.row, right.row
            )));
        }
        if left.end() != right.start {
            return Err(AppError::invariant(format!(
                "Blocks {:?} and {:?} are not adjacent",
                left.seats(),
                right.seats()
            )));
        }

        Ok(Self::new(
            left.token,
            SeatState::Free,
            left.row,
            left.start,
            left.seat_count + right.seat_count,
        ))
    }
}

impl fmt::Display for SeatBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{}+{}",
            self.state, self.row, self.start, self.seat_count
        )
    }
}
