//! Database-backed tests for hold expiry: the durable sweep, lazy
//! re-acquisition of lapsed seats, and finalize racing the deadline.
//!
//! Ignored by default; see `helpers` for how to run them.

use std::time::Duration;

mod helpers;

use helpers::TestRig;

use seathold_core::error::ErrorKind;
use seathold_core::types::id::{BookingId, HolderId};
use seathold_core::types::status::SeatStatus;
use seathold_engine::ExpiredRelease;

#[tokio::test]
#[ignore]
async fn test_sweep_releases_lapsed_hold_without_timers() {
    let rig = TestRig::new().await;
    let seats = rig.seed_seats(2).await;
    let hold = rig.must_acquire(&seats, HolderId::new(), 1).await;

    // As after a process restart: no in-process timer survives, only
    // the queue entry.
    rig.timers.cancel(hold);
    tokio::time::sleep(Duration::from_secs(2)).await;

    rig.sweeper().sweep_once().await.unwrap();

    for id in &seats {
        assert_eq!(rig.seat_status(*id).await, SeatStatus::Available);
    }
    assert_eq!(rig.hold_status(hold).await, "expired");
    assert_eq!(rig.queue_len(hold).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_lapsed_seat_is_lazily_acquirable() {
    let rig = TestRig::new().await;
    let seats = rig.seed_seats(1).await;
    let first = rig.must_acquire(&seats, HolderId::new(), 60).await;
    rig.timers.cancel(first);
    rig.lapse_hold(first).await;

    let second_holder = HolderId::new();
    rig.must_acquire(&seats, second_holder, 60).await;

    let views = rig.inventory.get_seat_status(&seats).await.unwrap();
    assert_eq!(views[0].status, SeatStatus::Locked);
    assert_eq!(views[0].holder_id, Some(second_holder));
}

#[tokio::test]
#[ignore]
async fn test_finalize_after_deadline_fails_and_books_nothing() {
    let rig = TestRig::new().await;
    let seats = rig.seed_seats(1).await;
    let hold = rig.must_acquire(&seats, HolderId::new(), 60).await;
    rig.timers.cancel(hold);
    rig.lapse_hold(hold).await;

    let err = rig
        .finalizer
        .finalize(hold, BookingId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::HoldExpired);

    // Nothing was mutated: the seat keeps its lapsed-lock projection
    // until the sweep reconciles it.
    assert_eq!(rig.seat_status(seats[0]).await, SeatStatus::Locked);
    assert_eq!(rig.hold_status(hold).await, "pending");

    rig.sweeper().sweep_once().await.unwrap();
    assert_eq!(rig.seat_status(seats[0]).await, SeatStatus::Available);
    assert_eq!(rig.hold_status(hold).await, "expired");
}

#[tokio::test]
#[ignore]
async fn test_expired_release_skips_reacquired_seats() {
    let rig = TestRig::new().await;
    let seats = rig.seed_seats(1).await;
    let holder = HolderId::new();

    // The holder's first attempt lapses, then they retry and take the
    // same seat again under a new hold via the lazy-expiry rule.
    let first = rig.must_acquire(&seats, holder, 60).await;
    rig.timers.cancel(first);
    rig.lapse_hold(first).await;
    let second = rig.must_acquire(&seats, holder, 60).await;
    rig.timers.cancel(second);

    // The stale release for the first hold fires late. It must expire
    // the first hold without touching the seat, which now carries the
    // second hold's deadline.
    match rig.expiry.release_expired(first).await.unwrap() {
        ExpiredRelease::Released { seat_ids } => assert!(seat_ids.is_empty()),
        ExpiredRelease::Noop => panic!("first hold was still pending"),
    }

    assert_eq!(rig.hold_status(first).await, "expired");
    assert_eq!(rig.hold_status(second).await, "pending");
    let views = rig.inventory.get_seat_status(&seats).await.unwrap();
    assert_eq!(views[0].status, SeatStatus::Locked);
    assert_eq!(views[0].holder_id, Some(holder));

    // The surviving hold is still good for checkout.
    let booking = BookingId::new();
    let outcome = rig.finalizer.finalize(second, booking).await.unwrap();
    assert_eq!(outcome.booked, seats);
}

#[tokio::test]
#[ignore]
async fn test_release_expired_noops_on_terminal_hold() {
    let rig = TestRig::new().await;
    let seats = rig.seed_seats(1).await;
    let hold = rig.must_acquire(&seats, HolderId::new(), 60).await;
    rig.finalizer.finalize(hold, BookingId::new()).await.unwrap();

    let outcome = rig.expiry.release_expired(hold).await.unwrap();
    assert!(matches!(outcome, ExpiredRelease::Noop));
    assert_eq!(rig.seat_status(seats[0]).await, SeatStatus::Booked);
}
