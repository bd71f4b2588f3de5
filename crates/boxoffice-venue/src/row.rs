//! One row of seats as an ordered, gap-free partition of blocks.
//!
//! A [`Row`] is a value: every transition returns a new version and leaves
//! the receiver untouched, so a reader holding an older version never sees
//! a half-applied split or merge.
//!
//! Partition invariants, checked by [`Row::check_partition`]:
//! - blocks are sorted by start, contiguous, and cover `0..width`;
//! - every block is non-empty and belongs to this row;
//! - no two adjacent blocks are both FREE.

use std::fmt;

use boxoffice_core::error::AppError;
use boxoffice_core::result::AppResult;
use boxoffice_core::types::HoldId;

use crate::block::{BlockToken, SeatBlock, SeatState};
use crate::hold::SeatHold;

/// An immutable version of one row's partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    number: u32,
    width: u32,
    blocks: Vec<SeatBlock>,
    /// Next token to mint; carried across versions so tokens never repeat.
    next_token: u64,
}

impl Row {
    /// Create a row whose seats form a single FREE block.
    pub fn new(number: u32, width: u32) -> AppResult<Self> {
        if width == 0 {
            return Err(AppError::configuration(format!(
                "Row {number} must have at least one seat"
            )));
        }

        Ok(Self {
            number,
            width,
            blocks: vec![SeatBlock::new(
                BlockToken(0),
                SeatState::Free,
                number,
                0,
                width,
            )],
            next_token: 1,
        })
    }

    /// Row index within the venue.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Number of seats in the row.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The partition, in seat order.
    pub fn blocks(&self) -> &[SeatBlock] {
        &self.blocks
    }

    /// Total seats across FREE blocks.
    pub fn available_count(&self) -> u32 {
        self.blocks_in(SeatState::Free).map(SeatBlock::seat_count).sum()
    }

    /// Blocks in the given state, in seat order.
    pub fn blocks_in(&self, state: SeatState) -> impl Iterator<Item = &SeatBlock> + '_ {
        self.blocks.iter().filter(move |b| b.state() == state)
    }

    /// FREE blocks large enough for `seats`, in seat order.
    pub fn first_fit_candidates(&self, seats: u32) -> impl Iterator<Item = &SeatBlock> + '_ {
        self.blocks_in(SeatState::Free)
            .filter(move |b| b.seat_count() >= seats)
    }

    /// Claim the first `seats` seats of a FREE block for `identity`.
    ///
    /// The block is replaced by a HELD block of `seats` seats at the same
    /// start, followed by a FREE remainder when the block was larger.
    /// Returns the new row version and the hold wrapping the HELD block.
    pub fn claim(
        &self,
        block: &SeatBlock,
        seats: u32,
        hold_id: HoldId,
        identity: &str,
    ) -> AppResult<(Row, SeatHold)> {
        let index = self.position_of(block).ok_or_else(|| {
            AppError::validation(format!("Block {block} is not part of row {}", self.number))
        })?;
        if block.state() != SeatState::Free {
            return Err(AppError::validation(format!(
                "Cannot claim seats from {block}: block is not free"
            )));
        }
        if seats == 0 || seats > block.seat_count() {
            return Err(AppError::validation(format!(
                "Cannot claim {seats} seats from {block}"
            )));
        }

        let mut next = self.clone();
        let held = SeatBlock::new(
            next.mint(),
            SeatState::Held,
            self.number,
            block.start(),
            seats,
        );

        let mut replacement = vec![held.clone()];
        if block.seat_count() > seats {
            replacement.push(SeatBlock::new(
                next.mint(),
                SeatState::Free,
                self.number,
                block.start() + seats,
                block.seat_count() - seats,
            ));
        }
        next.blocks.splice(index..=index, replacement);
        debug_assert!(next.check_partition().is_ok(), "claim broke {next:?}");

        Ok((next, SeatHold::new(hold_id, held, identity)))
    }

    /// Replace `target` with a copy carrying `state`.
    ///
    /// Moving a block to FREE coalesces it with FREE neighbours on either
    /// side. Fails with an invariant error if `target` is not in this
    /// version of the row.
    pub fn with_block_state(&self, target: &SeatBlock, state: SeatState) -> AppResult<Row> {
        let index = self.position_of(target).ok_or_else(|| {
            AppError::invariant(format!(
                "Block {target} not found in row {}",
                self.number
            ))
        })?;

        let mut next = self.clone();
        if state != SeatState::Free {
            next.blocks[index] = target.with_state(state);
            debug_assert!(next.check_partition().is_ok(), "transition broke {next:?}");
            return Ok(next);
        }

        let mut merged = target.with_state(SeatState::Free);
        let mut first = index;
        let mut last = index;

        if let Some(left) = index.checked_sub(1).map(|i| &self.blocks[i]) {
            if left.state() == SeatState::Free {
                merged = SeatBlock::merge(left, &merged)?;
                first -= 1;
            }
        }
        if let Some(right) = self.blocks.get(index + 1) {
            if right.state() == SeatState::Free {
                merged = SeatBlock::merge(&merged, right)?;
                last += 1;
            }
        }

        next.blocks.splice(first..=last, [merged]);
        debug_assert!(next.check_partition().is_ok(), "release broke {next:?}");
        Ok(next)
    }

    /// Verify every partition invariant, reporting the first violation.
    pub fn check_partition(&self) -> AppResult<()> {
        let mut expected_start = 0u32;
        let mut previous: Option<&SeatBlock> = None;

        for block in &self.blocks {
            if block.row() != self.number {
                return Err(AppError::invariant(format!(
                    "Block {block} found in row {}",
                    self.number
                )));
            }
            if block.seat_count() == 0 {
                return Err(AppError::invariant(format!("Empty block {block}")));
            }
            if block.start() != expected_start {
                return Err(AppError::invariant(format!(
                    "Block {block} should start at {expected_start}"
                )));
            }
            if let Some(prev) = previous {
                if prev.state() == SeatState::Free && block.state() == SeatState::Free {
                    return Err(AppError::invariant(format!(
                        "Adjacent free blocks {prev} and {block}"
                    )));
                }
                if prev.token() == block.token() {
                    return Err(AppError::invariant(format!(
                        "Blocks {prev} and {block} share a token"
                    )));
                }
            }
            expected_start = block.end();
            previous = Some(block);
        }

        if expected_start != self.width {
            return Err(AppError::invariant(format!(
                "Row {} covers {expected_start} of {} seats",
                self.number, self.width
            )));
        }
        Ok(())
    }

    /// Index of `block` in this version, matching identity and contents.
    fn position_of(&self, block: &SeatBlock) -> Option<usize> {
        self.blocks.iter().position(|b| b == block)
    }

    fn mint(&mut self) -> BlockToken {
        let token = BlockToken(self.next_token);
        self.next_token += 1;
        token
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            let glyph = block.state().glyph();
            for _ in block.seats() {
                write!(f, "{glyph}")?;
            }
        }
        Ok(())
    }
}
