// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 libsix contributors
//
// Mode transitions: downgrade, try_upgrade, try_convert, recursive intent
// and held-count increments.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use libsix::{LockCounts, LockType, SixLock};

#[test]
fn downgrade_keeps_the_object_covered() {
    let lock = Arc::new(SixLock::new());
    lock.lock_intent();

    lock.downgrade();
    let counts = lock.counts();
    assert_eq!(counts.read, 1);
    assert_eq!(counts.intent, 0);

    // Intent is free again for someone else while we keep reading.
    let l = Arc::clone(&lock);
    let got = thread::spawn(move || {
        let ok = l.trylock_intent();
        if ok {
            l.unlock_intent();
        }
        ok
    })
    .join()
    .unwrap();
    assert!(got);

    lock.unlock_read();
    assert_eq!(lock.counts(), LockCounts::default());
}

#[test]
fn upgrade_consumes_the_read_unit() {
    let lock = SixLock::new();
    lock.lock_read();

    assert!(lock.try_upgrade());
    let counts = lock.counts();
    assert_eq!(counts.read, 0);
    assert_eq!(counts.intent, 1);

    lock.unlock_intent();
    assert_eq!(lock.counts(), LockCounts::default());
}

#[test]
fn upgrade_fails_when_intent_is_taken() {
    let lock = Arc::new(SixLock::new());

    let l = Arc::clone(&lock);
    let release = Arc::new(AtomicBool::new(false));
    let rel = Arc::clone(&release);
    let holder = thread::spawn(move || {
        l.lock_intent();
        while !rel.load(Ordering::Acquire) {
            thread::yield_now();
        }
        l.unlock_intent();
    });

    while lock.counts().intent == 0 {
        thread::yield_now();
    }

    lock.lock_read();
    assert!(!lock.try_upgrade());
    // The failed upgrade must leave our read hold untouched.
    assert_eq!(lock.counts().read, 1);
    lock.unlock_read();

    release.store(true, Ordering::Release);
    holder.join().unwrap();
}

#[test]
fn upgrade_does_not_wait_for_other_readers() {
    let lock = Arc::new(SixLock::new());
    let other_done = Arc::new(AtomicBool::new(false));

    lock.lock_read();

    let l = Arc::clone(&lock);
    let od = Arc::clone(&other_done);
    let other_reader = thread::spawn(move || {
        l.lock_read();
        thread::sleep(Duration::from_millis(100));
        od.store(true, Ordering::Release);
        l.unlock_read();
    });

    while lock.counts().read < 2 {
        thread::yield_now();
    }

    // Upgrade succeeds immediately, other reader still inside.
    assert!(lock.try_upgrade());
    assert!(!other_done.load(Ordering::Acquire));

    // The write, however, has to wait the other reader out.
    lock.lock_write();
    assert!(other_done.load(Ordering::Acquire));

    lock.unlock_write();
    lock.unlock_intent();
    other_reader.join().unwrap();
    assert_eq!(lock.counts(), LockCounts::default());
}

#[test]
fn recursive_intent() {
    let lock = Arc::new(SixLock::new());

    lock.lock_intent();
    lock.increment(LockType::Intent);
    assert_eq!(lock.counts().intent, 2);

    // First release: still held.
    lock.unlock_intent();
    assert_eq!(lock.counts().intent, 1);

    let l = Arc::clone(&lock);
    assert!(!thread::spawn(move || l.trylock_intent()).join().unwrap());

    // Second release: gone.
    lock.unlock_intent();
    assert_eq!(lock.counts().intent, 0);

    let l = Arc::clone(&lock);
    let got = thread::spawn(move || {
        let ok = l.trylock_intent();
        if ok {
            l.unlock_intent();
        }
        ok
    })
    .join()
    .unwrap();
    assert!(got);
}

#[test]
fn increment_read_round_trips() {
    let lock = SixLock::new();
    lock.lock_read();
    lock.increment(LockType::Read);
    assert_eq!(lock.counts().read, 2);

    lock.unlock_read();
    assert_eq!(lock.counts().read, 1);
    lock.unlock_read();
    assert_eq!(lock.counts(), LockCounts::default());
}

#[test]
fn increment_read_under_intent_only() {
    // An intent holder may mint itself a read unit without holding read.
    let lock = SixLock::new();
    lock.lock_intent();
    lock.increment(LockType::Read);

    let counts = lock.counts();
    assert_eq!(counts.read, 1);
    assert_eq!(counts.intent, 1);

    lock.unlock_read();
    lock.unlock_intent();
    assert_eq!(lock.counts(), LockCounts::default());
}

#[test]
fn convert_between_read_and_intent() {
    let lock = SixLock::new();

    lock.lock_read();
    assert!(lock.try_convert(LockType::Read, LockType::Intent));
    assert_eq!(lock.counts().intent, 1);

    assert!(lock.try_convert(LockType::Intent, LockType::Read));
    assert_eq!(lock.counts().read, 1);
    assert_eq!(lock.counts().intent, 0);

    // Same-mode conversion is a no-op.
    assert!(lock.try_convert(LockType::Read, LockType::Read));
    assert_eq!(lock.counts().read, 1);

    lock.unlock_read();
    assert_eq!(lock.counts(), LockCounts::default());
}

#[test]
fn upgrade_downgrade_preserves_seq() {
    let lock = SixLock::new();
    let seq = lock.seq();

    lock.lock_read();
    assert!(lock.try_upgrade());
    lock.downgrade();
    lock.unlock_read();

    // Mode shuffling is not writing.
    assert_eq!(lock.seq(), seq);
}

#[test]
fn downgrade_has_no_unlocked_window() {
    // A writer queued behind our intent must not slip in during downgrade:
    // the read unit is added before intent is released.
    let lock = Arc::new(SixLock::new());
    lock.lock_intent();

    let l = Arc::clone(&lock);
    let mutator = thread::spawn(move || {
        l.lock_intent();
        l.lock_write();
        l.unlock_write();
        l.unlock_intent();
    });

    thread::sleep(Duration::from_millis(50));
    let seq_before = lock.seq();
    lock.downgrade();

    // We still hold read, so the mutator's write cannot have happened yet.
    assert_eq!(lock.seq(), seq_before);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(lock.seq(), seq_before);

    lock.unlock_read();
    mutator.join().unwrap();
    assert!(lock.seq() > seq_before);
}

#[test]
fn upgrade_then_write_blocks_until_reader_leaves() {
    let lock = Arc::new(SixLock::new());
    lock.lock_read();

    let l = Arc::clone(&lock);
    let reader = thread::spawn(move || {
        l.lock_read();
        thread::sleep(Duration::from_millis(80));
        l.unlock_read();
    });

    while lock.counts().read < 2 {
        thread::yield_now();
    }

    assert!(lock.try_upgrade());
    let start = Instant::now();
    lock.lock_write();
    // We cannot have entered before the other reader left.
    assert!(start.elapsed() >= Duration::from_millis(40));

    lock.unlock_write();
    lock.unlock_intent();
    reader.join().unwrap();
}
