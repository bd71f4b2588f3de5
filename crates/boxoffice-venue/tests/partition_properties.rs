//! Property-based tests for row partition invariants using proptest.
//!
//! # Invariants tested:
//! - Coverage: blocks stay sorted, contiguous, and cover the whole row
//! - Maximality: no two adjacent blocks are both FREE
//! - Accounting: free seats equal width minus held and reserved seats
//!
//! Reproducible: set PROPTEST_SEED for deterministic runs.

use boxoffice_core::types::HoldId;
use boxoffice_venue::{Row, SeatBlock, SeatState};
use proptest::prelude::*;

/// One step applied to a row. Indices are reduced modulo the number of
/// eligible blocks at the time the step runs.
#[derive(Debug, Clone)]
enum Step {
    Claim { block: usize, seats: u32 },
    Release { hold: usize },
    Promote { hold: usize },
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (any::<usize>(), 1u32..=12).prop_map(|(block, seats)| Step::Claim { block, seats }),
        2 => any::<usize>().prop_map(|hold| Step::Release { hold }),
        1 => any::<usize>().prop_map(|hold| Step::Promote { hold }),
    ]
}

/// Replay `steps`, returning the final row, the blocks still HELD, and the
/// number of RESERVED seats.
fn replay(width: u32, steps: &[Step]) -> (Row, Vec<SeatBlock>, u32) {
    let mut row = Row::new(0, width).unwrap();
    let mut held: Vec<SeatBlock> = Vec::new();
    let mut reserved_seats = 0u32;
    let mut next_hold = 0u64;

    for step in steps {
        match *step {
            Step::Claim { block, seats } => {
                let free: Vec<SeatBlock> = row.blocks_in(SeatState::Free).cloned().collect();
                if free.is_empty() {
                    continue;
                }
                let target = &free[block % free.len()];
                let seats = 1 + (seats - 1) % target.seat_count();

                next_hold += 1;
                let (next, hold) = row
                    .claim(target, seats, HoldId(next_hold), "prop@boxoffice.test")
                    .unwrap();
                row = next;
                held.push(hold.block().clone());
            }
            Step::Release { hold } => {
                if held.is_empty() {
                    continue;
                }
                let block = held.remove(hold % held.len());
                row = row.with_block_state(&block, SeatState::Free).unwrap();
            }
            Step::Promote { hold } => {
                if held.is_empty() {
                    continue;
                }
                let block = held.remove(hold % held.len());
                row = row.with_block_state(&block, SeatState::Reserved).unwrap();
                reserved_seats += block.seat_count();
            }
        }
        row.check_partition().unwrap();
    }

    (row, held, reserved_seats)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_partition_holds_after_any_sequence(
        width in 1u32..=40,
        steps in prop::collection::vec(step_strategy(), 0..60),
    ) {
        let (row, _, _) = replay(width, &steps);

        let blocks = row.blocks();
        prop_assert_eq!(blocks.first().map(SeatBlock::start), Some(0));
        prop_assert_eq!(blocks.last().map(SeatBlock::end), Some(width));
        for pair in blocks.windows(2) {
            prop_assert_eq!(pair[0].end(), pair[1].start());
            prop_assert!(
                !(pair[0].state() == SeatState::Free && pair[1].state() == SeatState::Free),
                "adjacent free blocks {} and {}", pair[0], pair[1]
            );
        }
    }

    #[test]
    fn prop_free_seats_are_accounted(
        width in 1u32..=40,
        steps in prop::collection::vec(step_strategy(), 0..60),
    ) {
        let (row, held, reserved_seats) = replay(width, &steps);

        let held_seats: u32 = held.iter().map(SeatBlock::seat_count).sum();
        prop_assert_eq!(row.available_count() + held_seats + reserved_seats, width);
        prop_assert_eq!(row.blocks_in(SeatState::Held).count(), held.len());
    }

    #[test]
    fn prop_releasing_everything_restores_one_free_block(
        width in 1u32..=40,
        steps in prop::collection::vec(step_strategy(), 0..60),
    ) {
        let steps: Vec<Step> = steps
            .into_iter()
            .filter(|step| !matches!(step, Step::Promote { .. }))
            .collect();
        let (mut row, held, _) = replay(width, &steps);

        for block in &held {
            row = row.with_block_state(block, SeatState::Free).unwrap();
        }

        prop_assert_eq!(row.blocks().len(), 1);
        prop_assert_eq!(row.available_count(), width);
    }
}
