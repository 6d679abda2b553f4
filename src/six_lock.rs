// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 libsix contributors
//
// Three-mode lock over a single 64-bit state word.
//
// - Read:   shared, any number of holders.
// - Intent: held by at most one thread, but coexists with readers. A thread
//           that plans to modify the protected object takes intent early to
//           reserve it without blocking lookups.
// - Write:  fully exclusive. Only the intent holder may take it, so write is
//           an upgrade, never an independent acquisition.
//
// Every write acquire and release increments the sequence counter, so a
// caller can later `relock` a mode iff nothing was written in the interim.
// Blocked callers sit in a FIFO wait list; a releaser acquires the lock on
// behalf of the first eligible waiter and only then wakes it, so a woken
// thread never races for the lock it was promised.

use std::sync::atomic::{fence, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_utils::CachePadded;

use crate::pcpu::ReaderShard;
use crate::spin_lock::SpinLock;
use crate::state::{self, State, LOCK_VALS};
use crate::waiter::{current_token, now_ns, LockWaiter, WaitEntry, WaitList, WaitNode};

/// The three lock modes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum LockType {
    Read = 0,
    Intent = 1,
    Write = 2,
}

/// Snapshot of the holder counts, as reported by [`SixLock::counts`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct LockCounts {
    pub read: usize,
    pub intent: usize,
    pub write: usize,
}

/// Outcome of one acquisition attempt.
///
/// `FailedWake(t)` means the attempt failed but may have caused a spurious
/// failure for a waiter of mode `t` (e.g. a reader's transient shard bump
/// inflating an announced writer's sum), so that wait list must be nudged.
#[derive(Clone, Copy, PartialEq, Eq)]
enum TryResult {
    Acquired,
    Failed,
    FailedWake(LockType),
}

impl TryResult {
    #[inline]
    fn acquired(self) -> bool {
        matches!(self, TryResult::Acquired)
    }
}

/// How long a sleeper waits between re-checks of its cancellation predicate.
/// Wake-ups are explicit unparks; the tick only bounds predicate staleness.
const SLEEP_TICK: Duration = Duration::from_millis(1);

/// Iteration budget for the optimistic spin. Standing in for "the owner went
/// off CPU": past this, sleeping is cheaper than burning the core.
const SPIN_LIMIT: u32 = 1 << 10;

/// A three-mode sequenced lock.
///
/// The lock carries no data; callers pair it with the object it protects.
/// All methods take `&self` and acquisitions are released manually with
/// [`unlock`](SixLock::unlock), mirroring how the modes outlive any single
/// scope (intent is typically held across unrelated work).
///
/// Contract violations (releasing a mode that is not held, taking write
/// without intent) are programmer errors: debug builds panic, release
/// builds misbehave.
pub struct SixLock {
    state: AtomicU64,
    /// Thread token of the intent holder, 0 when intent is free. Written
    /// only under the intent-held invariant.
    owner: AtomicU64,
    /// Recursion depth of the intent holder beyond the first acquisition.
    /// Mutated only by the holder.
    intent_recurse: AtomicU32,
    readers: ReaderShard,
    wait_lock: SpinLock<WaitList>,
}

impl SixLock {
    /// A new, idle lock: no holders, no waiters, sequence 0.
    pub const fn new() -> Self {
        Self {
            state: AtomicU64::new(0),
            owner: AtomicU64::new(0),
            intent_recurse: AtomicU32::new(0),
            readers: ReaderShard::new(),
            wait_lock: SpinLock::new(Vec::new()),
        }
    }

    #[inline]
    fn load_state(&self) -> State {
        State(self.state.load(Ordering::Relaxed))
    }

    /// Current sequence number. Even iff no writer is in its critical
    /// section; two equal observations imply no write completed in between.
    pub fn seq(&self) -> u32 {
        State(self.state.load(Ordering::Acquire)).seq()
    }

    fn set_owner(&self, t: LockType, old: State, token: u64) {
        if t != LockType::Intent {
            return;
        }

        if !old.intent_lock() {
            debug_assert_eq!(self.owner.load(Ordering::Relaxed), 0);
            self.owner.store(token, Ordering::Relaxed);
        } else {
            debug_assert_eq!(self.owner.load(Ordering::Relaxed), token);
        }
    }

    // -----------------------------------------------------------------------
    // Acquisition engine
    // -----------------------------------------------------------------------

    /// One acquisition attempt on behalf of `token`, common to the fast
    /// path, the slow-path retry and the waker's direct handoff.
    ///
    /// `try_` distinguishes a plain trylock from a queued attempt: a queued
    /// writer has already announced `write_locking`, a queued attempt may
    /// set the mode's waiter bit, and only a trylock write announces (and
    /// retracts) `write_locking` itself.
    fn trylock_inner(&self, t: LockType, token: u64, try_: bool) -> TryResult {
        let vals = &LOCK_VALS[t as usize];

        debug_assert!(t != LockType::Write || self.owner.load(Ordering::Relaxed) == token);
        debug_assert!(t != LockType::Write || !self.load_state().write_held());
        debug_assert!(t != LockType::Write || try_ != self.load_state().write_locking());

        if t == LockType::Read {
            if let Some(slots) = self.readers.get() {
                // Sharded reader protocol: bump our slot to claim the lock,
                // then a full fence, then check whether a writer objects.
                // Either the writer's announcement is visible to us here, or
                // our bump is visible to the writer's shard sum; both missing
                // each other is impossible.
                let slot = ReaderShard::slot(slots);
                slot.fetch_add(1, Ordering::Relaxed);

                fence(Ordering::SeqCst);

                let old = State(self.state.load(Ordering::Acquire));
                if old.0 & vals.lock_fail == 0 {
                    return TryResult::Acquired;
                }

                slot.fetch_sub(1, Ordering::Relaxed);

                // Our retracted bump may have made an announced writer's sum
                // transiently nonzero; tell it to look again.
                if old.write_locking() {
                    return TryResult::FailedWake(LockType::Write);
                }
                return TryResult::Failed;
            }
        }

        if t == LockType::Write {
            if let Some(slots) = self.readers.get() {
                return self.trylock_write_sharded(slots, try_);
            }
        }

        // Shared path: one CAS loop over the whole word. Either add the
        // mode's lock value, or (for a queued attempt) set its waiter bit.
        let mut v = self.state.load(Ordering::Relaxed);
        let old = loop {
            let old = State(v);
            let mut new = old.0;

            if old.0 & vals.lock_fail == 0 {
                new = new.wrapping_add(vals.lock_val);
                if t == LockType::Write {
                    // Any announcement is ours: write requires intent and
                    // intent is exclusive, so at most one announcer exists.
                    new &= !state::WRITE_LOCKING;
                }
            } else if !try_ && !old.has_waiter(t) {
                new |= state::waiter_bit(t);
            } else {
                // Waiter bit already set, or a plain trylock failure.
                break old;
            }

            match self
                .state
                .compare_exchange_weak(old.0, new, Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) => break old,
                Err(cur) => v = cur,
            }
        };

        if old.0 & vals.lock_fail == 0 {
            debug_assert!(self.load_state().0 & vals.held_mask != 0);
            self.set_owner(t, old, token);
            TryResult::Acquired
        } else {
            TryResult::Failed
        }
    }

    /// Write attempt while the reader shard is enabled: two-phase. The
    /// announcement (made here on a trylock, earlier in the slow path for a
    /// queued writer) stops new readers; the shard sum then decides.
    fn trylock_write_sharded(&self, slots: &[CachePadded<AtomicU64>], try_: bool) -> TryResult {
        if try_ {
            self.state.fetch_add(state::WRITE_LOCKING, Ordering::AcqRel);
            fence(Ordering::SeqCst);
        }

        let ok = ReaderShard::sum(slots) == 0;

        // Pairs with the fence before a departing reader's decrement, so a
        // zero sum orders that reader's critical section before ours.
        fence(Ordering::SeqCst);

        // On success we bump the sequence; we also retract the announcement
        // unless we are a queued writer that failed (it stays announced
        // until the wait is over).
        let mut v: u64 = 0;
        if ok {
            v = v.wrapping_add(state::SEQ_ONE);
        }
        if ok || try_ {
            v = v.wrapping_sub(state::WRITE_LOCKING);
        }

        // Queued attempts are serialized by the wait lock, so checking then
        // setting the waiter bit here cannot double-set it.
        if !ok && !try_ && !self.load_state().has_waiter(LockType::Write) {
            v = v.wrapping_add(state::waiter_bit(LockType::Write));
        }

        if try_ && !ok {
            let new = State(self.state.fetch_add(v, Ordering::AcqRel).wrapping_add(v));
            // Readers that queued behind our transient announcement need a
            // nudge now that it is gone.
            if new.has_waiter(LockType::Read) {
                return TryResult::FailedWake(LockType::Read);
            }
            return TryResult::Failed;
        }

        self.state.fetch_add(v, Ordering::AcqRel);
        if ok {
            debug_assert!(!self.load_state().write_locking());
            TryResult::Acquired
        } else {
            TryResult::Failed
        }
    }

    fn do_trylock(&self, t: LockType, try_: bool) -> bool {
        let res = self.trylock_inner(t, current_token(), try_);
        if let TryResult::FailedWake(m) = res {
            self.wakeup_queued(m);
        }
        res.acquired()
    }

    /// Non-blocking acquire. True on success.
    pub fn trylock(&self, t: LockType) -> bool {
        self.do_trylock(t, true)
    }

    /// Acquire `t` iff the sequence still equals `seq` and `t` is currently
    /// compatible. Never sleeps and never queues. Write cannot be relocked;
    /// re-take it through intent.
    pub fn relock(&self, t: LockType, seq: u32) -> bool {
        debug_assert!(t != LockType::Write);
        let vals = &LOCK_VALS[t as usize];

        if t == LockType::Read {
            if let Some(slots) = self.readers.get() {
                let slot = ReaderShard::slot(slots);
                slot.fetch_add(1, Ordering::Relaxed);

                fence(Ordering::SeqCst);

                let old = State(self.state.load(Ordering::Acquire));
                let ok = old.0 & vals.lock_fail == 0 && old.seq() == seq;
                if !ok {
                    slot.fetch_sub(1, Ordering::Relaxed);
                }

                // Same spurious-failure case as the lock path.
                if old.write_locking() {
                    self.wakeup(old, LockType::Write);
                }
                return ok;
            }
        }

        let mut v = self.state.load(Ordering::Relaxed);
        loop {
            let old = State(v);

            if old.seq() != seq || old.0 & vals.lock_fail != 0 {
                return false;
            }

            match self.state.compare_exchange_weak(
                old.0,
                old.0.wrapping_add(vals.lock_val),
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    self.set_owner(t, old, current_token());
                    return true;
                }
                Err(cur) => v = cur,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Wait list and wake-up
    // -----------------------------------------------------------------------

    /// Walk the wait list and hand the lock to eligible waiters of mode `t`:
    /// every consecutive reader, at most one intent or write waiter. The
    /// acquisition is performed here, on the waiter's behalf; the waiter is
    /// then unlinked, flagged and unparked, in that order.
    fn wakeup_queued(&self, mut t: LockType) {
        loop {
            let mut res = TryResult::Failed;
            let mut saw_one = false;
            let mut full_scan = true;

            {
                let mut q = self.wait_lock.lock();
                let mut i = 0;
                while i < q.len() {
                    if q[i].want != t {
                        i += 1;
                        continue;
                    }

                    if saw_one && t != LockType::Read {
                        full_scan = false;
                        break;
                    }
                    saw_one = true;

                    res = self.trylock_inner(t, q[i].token, false);
                    if !res.acquired() {
                        full_scan = false;
                        break;
                    }

                    let node = q.remove(i);
                    // The unlink above must be visible before the flag: the
                    // woken thread is free to reuse the record immediately.
                    node.entry.lock_acquired.store(true, Ordering::Release);
                    node.thread.unpark();
                }

                if full_scan {
                    // Walked the whole list: no waiter of this mode remains.
                    // The bit is pessimistic, so clearing is only safe here.
                    self.state
                        .fetch_and(!state::waiter_bit(t), Ordering::Relaxed);
                }
            }

            match res {
                TryResult::FailedWake(next) => t = next,
                _ => break,
            }
        }
    }

    /// Wake-up guarded by the released state: skipped when no one waits for
    /// `t`, or when waking writers while readers are still outstanding.
    fn wakeup(&self, s: State, t: LockType) {
        if t == LockType::Write && s.read_lock() != 0 {
            return;
        }
        if !s.has_waiter(t) {
            return;
        }
        self.wakeup_queued(t);
    }

    // -----------------------------------------------------------------------
    // Slow path
    // -----------------------------------------------------------------------

    /// Bounded busy-wait on the current owner instead of sleeping. Only
    /// meaningful for read waiters and for the intent waiter at the head of
    /// the queue; writers are blocked by readers, not by an owner.
    fn optimistic_spin(&self, entry: &Arc<WaitEntry>, want: LockType) -> bool {
        match want {
            LockType::Read => {}
            LockType::Intent => {
                let q = self.wait_lock.lock();
                let is_head = q.first().is_some_and(|n| Arc::ptr_eq(&n.entry, entry));
                drop(q);
                if !is_head {
                    return false;
                }
            }
            LockType::Write => return false,
        }

        let owner = self.owner.load(Ordering::Relaxed);
        let mut spins = 0u32;

        while owner != 0 && self.owner.load(Ordering::Relaxed) == owner {
            if entry.lock_acquired.load(Ordering::Acquire) {
                break;
            }
            if spins >= SPIN_LIMIT {
                break;
            }
            spins += 1;
            std::hint::spin_loop();
        }

        entry.lock_acquired.load(Ordering::Acquire)
    }

    fn lock_slowpath(
        &self,
        t: LockType,
        entry: &Arc<WaitEntry>,
        mut should_sleep: Option<&mut dyn FnMut(&SixLock) -> i32>,
    ) -> i32 {
        let token = current_token();

        if t == LockType::Write {
            debug_assert!(!self.load_state().write_locking());
            // Announce: stops new readers so a steady read stream cannot
            // starve us.
            self.state.fetch_add(state::WRITE_LOCKING, Ordering::AcqRel);
            fence(Ordering::SeqCst);
        }

        entry.lock_acquired.store(false, Ordering::Relaxed);
        entry.lock_want.store(t as u8, Ordering::Relaxed);

        let res;
        {
            let mut q = self.wait_lock.lock();

            if !self.load_state().has_waiter(t) {
                self.state.fetch_or(state::waiter_bit(t), Ordering::Relaxed);
            }

            // Retry with the wait lock held; we may have raced with an
            // unlock between our failed trylock and here.
            res = self.trylock_inner(t, token, false);
            if !res.acquired() {
                let mut start = now_ns();
                if let Some(last) = q.last() {
                    // Keep start times strictly increasing along the queue
                    // even when the clock ties.
                    let last_start = last.entry.start_time.load(Ordering::Relaxed);
                    if start <= last_start {
                        start = last_start + 1;
                    }
                }
                entry.start_time.store(start, Ordering::Relaxed);

                q.push(WaitNode {
                    thread: thread::current(),
                    token,
                    want: t,
                    entry: Arc::clone(entry),
                });
            }
        }

        let mut ret = 0;
        let mut acquired = res.acquired();

        if !acquired {
            if let TryResult::FailedWake(m) = res {
                self.wakeup_queued(m);
            }
            acquired = self.optimistic_spin(entry, t);
        }

        while !acquired {
            if entry.lock_acquired.load(Ordering::Acquire) {
                break;
            }

            ret = match should_sleep.as_mut() {
                Some(f) => f(self),
                None => 0,
            };
            if ret != 0 {
                // Cancelled. Leave the queue, unless a waker already handed
                // the lock over; then we own it and must release it.
                let handed_over;
                {
                    let mut q = self.wait_lock.lock();
                    handed_over = entry.lock_acquired.load(Ordering::Acquire);
                    if !handed_over {
                        q.retain(|n| !Arc::ptr_eq(&n.entry, entry));
                    }
                }
                if handed_over {
                    self.do_unlock(t);
                }
                break;
            }

            thread::park_timeout(SLEEP_TICK);
        }

        if ret != 0 && t == LockType::Write && self.load_state().write_locking() {
            let new = State(
                self.state
                    .fetch_sub(state::WRITE_LOCKING, Ordering::AcqRel)
                    .wrapping_sub(state::WRITE_LOCKING),
            );
            // Readers that queued behind our announcement can go again.
            self.wakeup(new, LockType::Read);
        }

        ret
    }

    fn do_lock(
        &self,
        t: LockType,
        waiter: &LockWaiter,
        should_sleep: Option<&mut dyn FnMut(&SixLock) -> i32>,
    ) -> i32 {
        waiter.entry.start_time.store(0, Ordering::Relaxed);

        if self.do_trylock(t, true) {
            0
        } else {
            self.lock_slowpath(t, &waiter.entry, should_sleep)
        }
    }

    /// Blocking acquire with no cancellation; returns once the lock is held.
    pub fn lock(&self, t: LockType) {
        let waiter = LockWaiter::new();
        let ret = self.do_lock(t, &waiter, None);
        debug_assert_eq!(ret, 0);
    }

    /// Blocking acquire with a cancellation predicate.
    ///
    /// `should_sleep` is consulted before every sleep; a nonzero return
    /// cancels the wait and is handed back verbatim as `Err`. On `Err` the
    /// lock is not held and no waiter state remains queued.
    pub fn lock_with<F>(&self, t: LockType, mut should_sleep: F) -> Result<(), i32>
    where
        F: FnMut(&SixLock) -> i32,
    {
        let waiter = LockWaiter::new();
        match self.do_lock(t, &waiter, Some(&mut should_sleep)) {
            0 => Ok(()),
            cause => Err(cause),
        }
    }

    /// Like [`lock_with`](SixLock::lock_with), but waiting through a
    /// caller-allocated [`LockWaiter`], which can afterwards be inspected
    /// for its queue position (`start_time`).
    pub fn lock_waiter<F>(&self, t: LockType, waiter: &LockWaiter, mut should_sleep: F) -> Result<(), i32>
    where
        F: FnMut(&SixLock) -> i32,
    {
        match self.do_lock(t, waiter, Some(&mut should_sleep)) {
            0 => Ok(()),
            cause => Err(cause),
        }
    }

    // -----------------------------------------------------------------------
    // Release
    // -----------------------------------------------------------------------

    fn do_unlock(&self, t: LockType) {
        let vals = &LOCK_VALS[t as usize];

        if t == LockType::Intent {
            self.owner.store(0, Ordering::Relaxed);
        }

        if t == LockType::Read {
            if let Some(slots) = self.readers.get() {
                // Order the critical section before the decrement, and the
                // decrement before the waiter check.
                fence(Ordering::SeqCst);
                ReaderShard::slot(slots).fetch_sub(1, Ordering::Relaxed);
                fence(Ordering::SeqCst);

                let s = State(self.state.load(Ordering::Relaxed));
                self.wakeup(s, vals.unlock_wakeup);
                return;
            }
        }

        debug_assert!(self.load_state().0 & vals.held_mask != 0);
        let s = State(
            self.state
                .fetch_add(vals.unlock_val, Ordering::Release)
                .wrapping_add(vals.unlock_val),
        );
        self.wakeup(s, vals.unlock_wakeup);
    }

    /// Release mode `t`.
    ///
    /// Releasing a read wakes queued writers once the reader count reaches
    /// zero; releasing write wakes readers; releasing intent wakes the next
    /// intent waiter. Releasing a mode not held by the caller is a contract
    /// violation.
    pub fn unlock(&self, t: LockType) {
        debug_assert!(t != LockType::Write || self.load_state().intent_lock());
        debug_assert!(t == LockType::Read || self.owner.load(Ordering::Relaxed) == current_token());

        if t == LockType::Intent && self.intent_recurse.load(Ordering::Relaxed) > 0 {
            self.intent_recurse.fetch_sub(1, Ordering::Relaxed);
            return;
        }

        self.do_unlock(t);
    }

    // -----------------------------------------------------------------------
    // Mode transitions
    // -----------------------------------------------------------------------

    /// Convert intent to read without a window in which neither is held.
    pub fn downgrade(&self) {
        self.increment(LockType::Read);
        self.unlock(LockType::Intent);
    }

    /// Try to convert a held read into intent. Succeeds iff no other intent
    /// is held; other readers do not block the upgrade (they only block a
    /// later write).
    pub fn try_upgrade(&self) -> bool {
        let shard = self.readers.get();

        let mut v = self.state.load(Ordering::Relaxed);
        let old = loop {
            let old = State(v);

            if old.intent_lock() {
                return false;
            }

            let mut new = old.0;
            if shard.is_none() {
                // Our own read unit lives in the shared counter; fold it
                // into the intent in the same CAS.
                debug_assert!(old.read_lock() > 0);
                new = new.wrapping_sub(state::ONE_READ);
            }
            new |= state::INTENT_LOCK;

            match self
                .state
                .compare_exchange_weak(old.0, new, Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) => break old,
                Err(cur) => v = cur,
            }
        };

        if let Some(slots) = shard {
            // Our read unit lives in the shard instead.
            ReaderShard::slot(slots).fetch_sub(1, Ordering::Relaxed);
        }

        self.set_owner(LockType::Intent, old, current_token());
        true
    }

    /// The two valid conversions: downgrade (always succeeds) and upgrade
    /// (may fail). Converting to the currently held mode is a no-op.
    pub fn try_convert(&self, from: LockType, to: LockType) -> bool {
        debug_assert!(from != LockType::Write && to != LockType::Write);

        if to == from {
            return true;
        }
        if to == LockType::Read {
            self.downgrade();
            true
        } else {
            self.try_upgrade()
        }
    }

    /// Bump the held count of a mode the caller already holds: reads gain
    /// another shared unit, intent recurses. Write cannot recurse.
    pub fn increment(&self, t: LockType) {
        match t {
            LockType::Read => {
                if let Some(slots) = self.readers.get() {
                    ReaderShard::slot(slots).fetch_add(1, Ordering::Relaxed);
                } else {
                    let s = self.load_state();
                    debug_assert!(s.read_lock() > 0 || s.intent_lock());
                    self.state.fetch_add(state::ONE_READ, Ordering::Relaxed);
                }
            }
            LockType::Intent => {
                debug_assert!(self.load_state().intent_lock());
                self.intent_recurse.fetch_add(1, Ordering::Relaxed);
            }
            LockType::Write => panic!("write locks cannot be incremented"),
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Wake every sleeper regardless of mode. Handed-over locks are handed
    /// over as usual; the rest wake without the lock and re-run their
    /// cancellation predicate. Used to propagate shutdown.
    pub fn wakeup_all(&self) {
        let s = self.load_state();
        self.wakeup(s, LockType::Read);
        self.wakeup(s, LockType::Intent);
        self.wakeup(s, LockType::Write);

        let q = self.wait_lock.lock();
        for node in q.iter() {
            node.thread.unpark();
        }
    }

    /// Current holder counts for all three modes.
    ///
    /// Observational: concurrent acquisitions make the numbers stale by the
    /// time they are returned. The read count includes units added by
    /// [`increment`](SixLock::increment); the intent count includes
    /// recursion.
    pub fn counts(&self) -> LockCounts {
        let s = self.load_state();

        let read = match self.readers.get() {
            Some(slots) => ReaderShard::sum(slots) as usize,
            None => s.read_lock() as usize,
        };

        LockCounts {
            read,
            intent: s.intent_lock() as usize + self.intent_recurse.load(Ordering::Relaxed) as usize,
            write: (s.seq() & 1) as usize,
        }
    }

    /// Enable the per-CPU reader shard. Idempotent. No read holder may be
    /// outstanding: their units live in the shared counter and would be
    /// released against the shard.
    pub fn shard_alloc(&self) {
        debug_assert_eq!(self.load_state().read_lock(), 0);
        self.readers.alloc();
    }

    /// Disable the per-CPU reader shard. Panics if any reader is
    /// outstanding; enable-disable-enable round trips are idempotent.
    pub fn shard_free(&self) {
        if let Some(slots) = self.readers.get() {
            assert_eq!(
                ReaderShard::sum(slots),
                0,
                "freeing reader shard with outstanding readers"
            );
        }
        assert_eq!(
            self.load_state().read_lock(),
            0,
            "freeing reader shard with outstanding readers"
        );
        self.readers.free();
    }
}

impl Default for SixLock {
    fn default() -> Self {
        Self::new()
    }
}

// Per-mode entry points, for callers that prefer `lock_read()` over
// `lock(LockType::Read)`.
macro_rules! six_lock_mode {
    ($mode:expr, $trylock:ident, $relock:ident, $lock:ident, $lock_with:ident,
     $lock_waiter:ident, $unlock:ident) => {
        impl SixLock {
            /// Non-blocking acquire of this mode.
            pub fn $trylock(&self) -> bool {
                self.trylock($mode)
            }

            /// Acquire this mode iff the sequence still equals `seq`.
            pub fn $relock(&self, seq: u32) -> bool {
                self.relock($mode, seq)
            }

            /// Blocking acquire of this mode.
            pub fn $lock(&self) {
                self.lock($mode)
            }

            /// Blocking acquire of this mode with a cancellation predicate.
            pub fn $lock_with<F: FnMut(&SixLock) -> i32>(&self, should_sleep: F) -> Result<(), i32> {
                self.lock_with($mode, should_sleep)
            }

            /// Blocking acquire through a caller-allocated waiter record.
            pub fn $lock_waiter<F: FnMut(&SixLock) -> i32>(
                &self,
                waiter: &LockWaiter,
                should_sleep: F,
            ) -> Result<(), i32> {
                self.lock_waiter($mode, waiter, should_sleep)
            }

            /// Release this mode.
            pub fn $unlock(&self) {
                self.unlock($mode)
            }
        }
    };
}

six_lock_mode!(
    LockType::Read,
    trylock_read,
    relock_read,
    lock_read,
    lock_read_with,
    lock_read_waiter,
    unlock_read
);
six_lock_mode!(
    LockType::Intent,
    trylock_intent,
    relock_intent,
    lock_intent,
    lock_intent_with,
    lock_intent_waiter,
    unlock_intent
);
six_lock_mode!(
    LockType::Write,
    trylock_write,
    relock_write,
    lock_write,
    lock_write_with,
    lock_write_waiter,
    unlock_write
);
