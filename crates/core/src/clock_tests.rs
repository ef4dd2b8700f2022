// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_returns_increasing_time() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(2));
    let t2 = clock.now();
    assert!(t2 > t1);
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::new();
    let t1 = clock.now();
    clock.advance(Duration::from_secs(60));
    let t2 = clock.now();
    assert_eq!(elapsed_secs(t1, t2), 60);
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now();
    clock2.advance(Duration::from_secs(30));
    let t2 = clock1.now();
    assert_eq!(elapsed_secs(t1, t2), 30);
}

#[test]
fn fake_clock_at_timestamp_is_frozen() {
    let clock = FakeClock::at_timestamp(1_700_000_000);
    assert_eq!(clock.now().timestamp(), 1_700_000_000);
    assert_eq!(clock.now(), clock.now());
}

#[test]
fn elapsed_secs_clamps_negative_to_zero() {
    let clock = FakeClock::at_timestamp(1_000);
    let earlier = clock.now();
    clock.advance(Duration::from_secs(5));
    assert_eq!(elapsed_secs(clock.now(), earlier), 0);
    assert_eq!(elapsed_secs(earlier, clock.now()), 5);
}
