// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 libsix contributors
//
// Per-CPU reader shard: one padded counter per CPU so that taking a read
// lock is a local counter bump plus a fence instead of contending on the
// shared state word. The rare writer sums every slot.
//
// A thread can migrate between its increment and its decrement, so a single
// slot may go transiently "negative" (wrap); only the wrapping sum over all
// slots is meaningful, and it is exact.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;

use crossbeam_utils::CachePadded;

use crate::platform;

/// Optional sharded reader count. Disabled by default; all lock operations
/// behave identically (just slower under read contention) when disabled.
pub(crate) struct ReaderShard {
    enabled: AtomicBool,
    slots: OnceLock<Box<[CachePadded<AtomicU64>]>>,
}

impl ReaderShard {
    pub(crate) const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            slots: OnceLock::new(),
        }
    }

    /// Enable the shard, allocating the slot array on first use. Idempotent.
    pub(crate) fn alloc(&self) {
        self.slots.get_or_init(|| {
            (0..platform::cpu_count().max(1))
                .map(|_| CachePadded::new(AtomicU64::new(0)))
                .collect()
        });
        self.enabled.store(true, Ordering::Release);
    }

    /// Disable the shard. The slot array is kept for re-enabling; the caller
    /// is responsible for the no-outstanding-readers contract.
    pub(crate) fn free(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    /// The slot array, iff the shard is enabled.
    #[inline]
    pub(crate) fn get(&self) -> Option<&[CachePadded<AtomicU64>]> {
        if !self.enabled.load(Ordering::Acquire) {
            return None;
        }
        self.slots.get().map(|s| &s[..])
    }

    /// The calling thread's slot.
    #[inline]
    pub(crate) fn slot(slots: &[CachePadded<AtomicU64>]) -> &AtomicU64 {
        &slots[platform::current_cpu() % slots.len()]
    }

    /// Wrapping sum over all slots. Zero iff no reader is outstanding.
    /// Only stable while `write_locking` keeps new readers out.
    pub(crate) fn sum(slots: &[CachePadded<AtomicU64>]) -> u64 {
        slots
            .iter()
            .fold(0u64, |acc, s| acc.wrapping_add(s.load(Ordering::Relaxed)))
    }
}
