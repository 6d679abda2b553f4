// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 libsix contributors
//
// Sequence counter semantics: parity tracks the writer, relock succeeds
// exactly when nothing was written since the sequence was observed.

use std::sync::Arc;
use std::thread;

use libsix::{LockCounts, SixLock};

fn write_cycle(lock: &SixLock) {
    lock.lock_intent();
    lock.lock_write();
    lock.unlock_write();
    lock.unlock_intent();
}

#[test]
fn relock_read_with_current_seq() {
    let lock = SixLock::new();
    let seq = lock.seq();

    assert!(lock.relock_read(seq));
    lock.unlock_read();

    // No write happened; the same sequence is still good.
    assert!(lock.relock_read(seq));
    lock.unlock_read();
}

#[test]
fn relock_read_fails_after_write() {
    let lock = SixLock::new();
    let seq = lock.seq();

    write_cycle(&lock);

    assert!(!lock.relock_read(seq));
    assert_eq!(lock.counts(), LockCounts::default());

    // The new sequence works.
    assert!(lock.relock_read(lock.seq()));
    lock.unlock_read();
}

#[test]
fn relock_intent_fails_after_write() {
    let lock = SixLock::new();
    let seq = lock.seq();

    write_cycle(&lock);

    assert!(!lock.relock_intent(seq));
    assert!(lock.relock_intent(lock.seq()));
    lock.unlock_intent();
}

#[test]
fn relock_read_ok_while_intent_held_elsewhere() {
    let lock = Arc::new(SixLock::new());
    let seq = lock.seq();
    lock.lock_intent();

    // Intent does not exclude readers and does not advance the sequence.
    let l = Arc::clone(&lock);
    let got = thread::spawn(move || {
        let ok = l.relock_read(seq);
        if ok {
            l.unlock_read();
        }
        ok
    })
    .join()
    .unwrap();
    assert!(got);

    lock.unlock_intent();
}

#[test]
fn relock_intent_fails_while_intent_held_elsewhere() {
    let lock = Arc::new(SixLock::new());
    let seq = lock.seq();
    lock.lock_intent();

    let l = Arc::clone(&lock);
    let got = thread::spawn(move || l.relock_intent(seq)).join().unwrap();
    assert!(!got);

    lock.unlock_intent();
}

#[test]
fn relock_read_fails_while_write_held() {
    let lock = Arc::new(SixLock::new());
    let seq = lock.seq();
    lock.lock_intent();
    lock.lock_write();

    let l = Arc::clone(&lock);
    let got = thread::spawn(move || l.relock_read(seq)).join().unwrap();
    assert!(!got);

    lock.unlock_write();
    lock.unlock_intent();
}

#[test]
fn reads_do_not_advance_seq() {
    let lock = SixLock::new();
    let seq = lock.seq();

    for _ in 0..100 {
        lock.lock_read();
        lock.unlock_read();
    }
    lock.lock_intent();
    lock.unlock_intent();

    assert_eq!(lock.seq(), seq);
}

#[test]
fn seq_strictly_increases_across_writes() {
    let lock = SixLock::new();
    let mut last = lock.seq();

    for _ in 0..10 {
        lock.lock_intent();
        lock.lock_write();
        let held = lock.seq();
        assert!(held > last);
        assert_eq!(held % 2, 1);
        lock.unlock_write();
        lock.unlock_intent();

        let released = lock.seq();
        assert!(released > held);
        assert_eq!(released % 2, 0);
        last = released;
    }
}

#[test]
fn stale_observation_detected_across_threads() {
    let lock = Arc::new(SixLock::new());
    let seq = lock.seq();

    let l = Arc::clone(&lock);
    thread::spawn(move || write_cycle(&l)).join().unwrap();

    assert!(!lock.relock_read(seq));
}
