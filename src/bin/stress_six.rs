// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 libsix contributors
//
// Stress driver: hammer one lock with reader threads while a single mutator
// cycles intent and write, and verify the exclusion invariants as we go.
//
// Usage: stress_six [readers] [reader_iters] [writes] [--shard]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use libsix::SixLock;

fn main() {
    let mut readers = 4usize;
    let mut reader_iters = 100_000usize;
    let mut writes = 1_000usize;
    let mut shard = false;

    let mut positional = 0;
    for arg in std::env::args().skip(1) {
        if arg == "--shard" {
            shard = true;
            continue;
        }
        let v: usize = match arg.parse() {
            Ok(v) => v,
            Err(_) => {
                eprintln!("usage: stress_six [readers] [reader_iters] [writes] [--shard]");
                std::process::exit(2);
            }
        };
        match positional {
            0 => readers = v,
            1 => reader_iters = v,
            _ => writes = v,
        }
        positional += 1;
    }

    let lock = Arc::new(SixLock::new());
    if shard {
        lock.shard_alloc();
    }

    // Two values only ever updated together under write; readers must never
    // observe them out of sync.
    let a = Arc::new(AtomicU64::new(0));
    let b = Arc::new(AtomicU64::new(0));
    let violation = Arc::new(AtomicBool::new(false));

    let start = Instant::now();

    let mut threads = Vec::new();
    for _ in 0..readers {
        let lock = Arc::clone(&lock);
        let a = Arc::clone(&a);
        let b = Arc::clone(&b);
        let violation = Arc::clone(&violation);
        threads.push(thread::spawn(move || {
            for _ in 0..reader_iters {
                lock.lock_read();
                if a.load(Ordering::Relaxed) != b.load(Ordering::Relaxed) {
                    violation.store(true, Ordering::Relaxed);
                }
                lock.unlock_read();
            }
        }));
    }

    for _ in 0..writes {
        lock.lock_intent();
        lock.lock_write();
        a.fetch_add(1, Ordering::Relaxed);
        b.fetch_add(1, Ordering::Relaxed);
        lock.unlock_write();
        lock.unlock_intent();
    }

    for t in threads {
        t.join().unwrap();
    }

    let elapsed = start.elapsed();
    let counts = lock.counts();

    println!(
        "readers={readers} reader_iters={reader_iters} writes={writes} shard={shard}"
    );
    println!(
        "elapsed={:.3}s seq={} counts: read={} intent={} write={}",
        elapsed.as_secs_f64(),
        lock.seq(),
        counts.read,
        counts.intent,
        counts.write
    );

    if violation.load(Ordering::Relaxed) {
        eprintln!("FAILED: reader observed torn write");
        std::process::exit(1);
    }
    assert_eq!(lock.seq(), 2 * writes as u32);
    assert_eq!(counts, Default::default());
    println!("OK");
}
