// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 libsix contributors
//
// Waiter records for the lock's wait list, plus the thread tokens and the
// monotonic clock used to order them. A waiter is allocated by the caller
// and shared with the waker, which hands the lock over by setting
// `lock_acquired` before unparking the sleeping thread.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::Thread;
use std::time::Instant;

use crate::six_lock::LockType;

/// Shared waiter state, visible to both the blocked caller and the waker.
pub(crate) struct WaitEntry {
    /// Set by the waker immediately before unparking: the lock has already
    /// been acquired on the waiter's behalf (direct handoff). The woken
    /// thread never re-runs the acquisition.
    pub(crate) lock_acquired: AtomicBool,

    /// Monotonic enqueue timestamp in nanoseconds. Strictly increasing along
    /// the queue: ties with the previous tail are bumped to `last + 1`.
    pub(crate) start_time: AtomicU64,

    /// The mode this waiter is after, as `LockType as u8`.
    pub(crate) lock_want: AtomicU8,
}

impl WaitEntry {
    fn new() -> Self {
        Self {
            lock_acquired: AtomicBool::new(false),
            start_time: AtomicU64::new(0),
            lock_want: AtomicU8::new(LockType::Read as u8),
        }
    }
}

/// A caller-allocated waiter record.
///
/// Passing one to [`SixLock::lock_waiter`](crate::SixLock::lock_waiter) lets
/// the caller inspect its queue position afterwards: `start_time` gives a
/// total order over waiters that callers can use for lock ordering schemes.
/// A `LockWaiter` must not be used by two threads at once; reuse across
/// sequential waits is fine.
pub struct LockWaiter {
    pub(crate) entry: Arc<WaitEntry>,
}

impl LockWaiter {
    pub fn new() -> Self {
        Self {
            entry: Arc::new(WaitEntry::new()),
        }
    }

    /// Enqueue timestamp of the most recent wait, or 0 if the last
    /// acquisition never reached the wait list.
    pub fn start_time(&self) -> u64 {
        self.entry.start_time.load(Ordering::Relaxed)
    }

    /// The mode requested by the most recent wait.
    pub fn lock_want(&self) -> LockType {
        match self.entry.lock_want.load(Ordering::Relaxed) {
            0 => LockType::Read,
            1 => LockType::Intent,
            _ => LockType::Write,
        }
    }

    /// Whether the most recent wait ended with the lock handed over by a
    /// releaser (as opposed to an uncontended acquisition or a cancellation).
    pub fn lock_acquired(&self) -> bool {
        self.entry.lock_acquired.load(Ordering::Acquire)
    }
}

impl Default for LockWaiter {
    fn default() -> Self {
        Self::new()
    }
}

/// One queued waiter. Lives in the wait list under the wait lock; `entry` is
/// shared with the caller's `LockWaiter`.
pub(crate) struct WaitNode {
    pub(crate) thread: Thread,
    pub(crate) token: u64,
    pub(crate) want: LockType,
    pub(crate) entry: Arc<WaitEntry>,
}

pub(crate) type WaitList = Vec<WaitNode>;

// ---------------------------------------------------------------------------
// Thread tokens — process-unique nonzero ids for owner tracking.
// ---------------------------------------------------------------------------

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static TOKEN: u64 = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
}

/// Nonzero token identifying the current thread.
pub(crate) fn current_token() -> u64 {
    TOKEN.with(|t| *t)
}

// ---------------------------------------------------------------------------
// Monotonic clock — nanoseconds since a process-wide epoch.
// ---------------------------------------------------------------------------

static EPOCH: OnceLock<Instant> = OnceLock::new();

pub(crate) fn now_ns() -> u64 {
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_nanos() as u64
}
