//! Integration tests for venue hold, confirm, and expiry.

use std::collections::HashSet;
use std::time::Duration;

use boxoffice_core::config::{HoldConfig, VenueConfig};
use boxoffice_core::error::ErrorKind;
use boxoffice_core::types::HoldId;
use boxoffice_venue::{SeatBlock, SeatState, Venue};

fn venue_with(rows: u32, seats_per_row: u32, ttl_millis: u64, sweep_interval_millis: u64) -> Venue {
    Venue::new(
        &VenueConfig {
            rows,
            seats_per_row,
        },
        &HoldConfig {
            ttl_millis,
            sweep_interval_millis,
        },
    )
    .unwrap()
}

fn venue(rows: u32, seats_per_row: u32) -> Venue {
    venue_with(rows, seats_per_row, 60_000, 5)
}

#[tokio::test]
async fn test_new_venue_is_all_free() {
    let venue = venue(10, 50);

    assert_eq!(venue.capacity(), 500);
    assert_eq!(venue.seats_available(), 500);
    assert_eq!(venue.find_blocks(SeatState::Free).len(), 10);
    assert!(venue.find_blocks(SeatState::Held).is_empty());
    venue.check_partition().unwrap();
}

#[tokio::test]
async fn test_seats_available_is_a_pure_read() {
    let venue = venue(2, 10);
    venue.hold(3, "a@a.com").unwrap().unwrap();

    assert_eq!(venue.seats_available(), 17);
    assert_eq!(venue.seats_available(), 17);
    assert_eq!(venue.outstanding_holds(), 1);
}

#[tokio::test]
async fn test_hold_splits_free_block() {
    let venue = venue(1, 30);
    let hold = venue.hold(10, "a@a.com").unwrap().unwrap();

    assert_eq!(hold.seat_count(), 10);
    assert_eq!(hold.identity(), "a@a.com");
    assert_eq!(hold.block().state(), SeatState::Held);
    assert_eq!(hold.block().seats(), 0..10);

    let free = venue.find_blocks(SeatState::Free);
    assert_eq!(free.len(), 1);
    assert_eq!(free[0].seats(), 10..30);
    assert_eq!(venue.seats_available(), 20);
    venue.check_partition().unwrap();
}

#[tokio::test]
async fn test_party_larger_than_any_row_is_refused() {
    let venue = venue(2, 10);

    assert!(venue.hold(11, "a@a.com").unwrap().is_none());
    assert_eq!(venue.seats_available(), 20);
    assert_eq!(venue.outstanding_holds(), 0);
}

#[tokio::test]
async fn test_fragmented_row_cannot_seat_party() {
    let venue = venue(1, 10);
    let first = venue.hold(4, "a@a.com").unwrap().unwrap();
    venue.hold(2, "b@b.com").unwrap().unwrap();
    venue.confirm(first.id(), "a@a.com").unwrap().unwrap();

    // Four seats remain, all at the end of the row.
    assert_eq!(venue.seats_available(), 4);
    assert!(venue.hold(5, "c@c.com").unwrap().is_none());
    assert!(venue.hold(4, "c@c.com").unwrap().is_some());
    assert_eq!(venue.seats_available(), 0);
}

#[tokio::test]
async fn test_confirm_reserves_seats_once() {
    let venue = venue(1, 10);
    let hold = venue.hold(4, "a@a.com").unwrap().unwrap();

    let code = venue.confirm(hold.id(), "a@a.com").unwrap();
    assert!(code.is_some());
    assert_eq!(venue.outstanding_holds(), 0);
    assert_eq!(venue.seats_available(), 6);

    let reserved = venue.find_blocks(SeatState::Reserved);
    assert_eq!(reserved.len(), 1);
    assert_eq!(reserved[0].seats(), 0..4);
    assert_eq!(reserved[0].token(), hold.block().token());

    assert!(venue.confirm(hold.id(), "a@a.com").unwrap().is_none());
    assert_eq!(venue.stats().reservations, 1);
}

#[tokio::test]
async fn test_confirm_unknown_hold() {
    let venue = venue(1, 10);
    assert!(venue.confirm(HoldId(42), "a@a.com").unwrap().is_none());
}

#[tokio::test]
async fn test_confirm_by_other_identity_keeps_hold() {
    let venue = venue(1, 10);
    let hold = venue.hold(2, "a@a.com").unwrap().unwrap();

    let err = venue.confirm(hold.id(), "b@b.com").unwrap_err();
    assert_eq!(err.kind, ErrorKind::IdentityMismatch);
    assert_eq!(venue.outstanding_holds(), 1);
    assert_eq!(venue.find_blocks(SeatState::Held).len(), 1);

    assert!(venue.confirm(hold.id(), "a@a.com").unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_expired_hold_releases_seats() {
    let venue = venue_with(1, 10, 100, 5);
    let hold = venue.hold(6, "a@a.com").unwrap().unwrap();
    assert_eq!(venue.seats_available(), 4);

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(venue.seats_available(), 10);
    assert_eq!(venue.outstanding_holds(), 0);
    assert!(venue.find_blocks(SeatState::Held).is_empty());
    // The freed seats coalesce with the remainder.
    assert_eq!(venue.find_blocks(SeatState::Free).len(), 1);
    assert!(venue.confirm(hold.id(), "a@a.com").unwrap().is_none());
    venue.check_partition().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_hold_survives_ttl() {
    let venue = venue_with(1, 10, 100, 5);
    let hold = venue.hold(6, "a@a.com").unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(venue.confirm(hold.id(), "a@a.com").unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(venue.seats_available(), 4);
    assert_eq!(venue.find_blocks(SeatState::Reserved).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_confirm_after_ttl_fails_before_sweep() {
    // Sweep far in the future so the held block stays put.
    let venue = venue_with(1, 10, 100, 3_600_000);
    tokio::task::yield_now().await;
    let hold = venue.hold(3, "a@a.com").unwrap().unwrap();

    tokio::time::advance(Duration::from_millis(150)).await;

    assert!(venue.confirm(hold.id(), "a@a.com").unwrap().is_none());
    // Seats return to the pool only once the sweep runs.
    assert_eq!(venue.find_blocks(SeatState::Held).len(), 1);
    assert_eq!(venue.outstanding_holds(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_release_merges_between_free_neighbours() {
    let venue = venue_with(1, 9, 60_000, 100);
    let left = venue.hold(3, "a@a.com").unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(30_000)).await;
    let middle = venue.hold(3, "b@b.com").unwrap().unwrap();
    venue.hold(3, "c@c.com").unwrap().unwrap();
    assert_eq!(middle.block().seats(), 3..6);

    // Only the left hold has expired so far.
    tokio::time::sleep(Duration::from_millis(31_000)).await;
    assert!(venue.confirm(left.id(), "a@a.com").unwrap().is_none());
    assert_eq!(venue.seats_available(), 3);

    tokio::time::sleep(Duration::from_millis(30_000)).await;
    assert_eq!(venue.seats_available(), 9);
    assert_eq!(venue.find_blocks(SeatState::Free).len(), 1);
    venue.check_partition().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_confirm_racing_expiry_has_one_winner() {
    let (mut confirmed, mut expired) = (0, 0);

    for i in 0..300u64 {
        let venue = venue_with(1, 10, 2, 1);
        let hold = venue.hold(4, "a@a.com").unwrap().unwrap();

        let racer = venue.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            std::thread::sleep(Duration::from_micros(1_500 + (i % 10) * 100));
            racer.confirm(hold.id(), "a@a.com").unwrap()
        })
        .await
        .unwrap();

        // A lost race leaves the release to the sweep; give it time to run.
        for _ in 0..1_000 {
            if venue.find_blocks(SeatState::Held).is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert!(venue.find_blocks(SeatState::Held).is_empty());
        match outcome {
            Some(_) => {
                confirmed += 1;
                assert_eq!(venue.find_blocks(SeatState::Reserved).len(), 1);
                assert_eq!(venue.seats_available(), 6);
            }
            None => {
                expired += 1;
                assert!(venue.find_blocks(SeatState::Reserved).is_empty());
                assert_eq!(venue.seats_available(), 10);
            }
        }
        venue.check_partition().unwrap();
    }

    assert_eq!(confirmed + expired, 300);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_holds_never_overlap() {
    let venue = venue(10, 50);

    let mut tasks = Vec::new();
    for worker in 0..16 {
        let venue = venue.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            let identity = format!("worker{worker}@boxoffice.test");
            let mut held = Vec::new();
            while let Some(hold) = venue.hold(3, &identity).unwrap() {
                if held.len() % 2 == 0 {
                    venue.confirm(hold.id(), &identity).unwrap().unwrap();
                }
                held.push(hold);
            }
            held
        }));
    }

    let mut holds = Vec::new();
    for task in tasks {
        holds.extend(task.await.unwrap());
    }

    let ids: HashSet<HoldId> = holds.iter().map(|h| h.id()).collect();
    assert_eq!(ids.len(), holds.len());

    let blocks: Vec<&SeatBlock> = holds.iter().map(|h| h.block()).collect();
    for (i, a) in blocks.iter().enumerate() {
        for b in &blocks[i + 1..] {
            assert!(!a.overlaps(b), "{a} overlaps {b}");
        }
    }

    // 50 = 16 * 3 + 2, so each row ends with two unusable seats.
    assert_eq!(holds.len(), 160);
    assert_eq!(venue.seats_available(), 20);
    venue.check_partition().unwrap();
}

#[tokio::test]
async fn test_stats_track_holds() {
    let venue = venue(1, 10);
    venue.hold(2, "a@a.com").unwrap().unwrap();

    let stats = venue.stats();
    assert_eq!(stats.available_seats, 8);
    assert_eq!(stats.held_blocks, 1);
    assert_eq!(stats.free_blocks, 1);
    assert_eq!(stats.outstanding_holds, 1);
}
