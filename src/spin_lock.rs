// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 libsix contributors
//
// Small data-carrying spin lock with adaptive backoff: pause, then yield,
// then sleep. Protects the wait list; never held across blocking calls.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU32, Ordering};

/// Adaptive backoff.
///
/// - k < 4:  busy spin (do nothing)
/// - k < 16: CPU pause hint
/// - k < 32: thread yield
/// - k >= 32: sleep 1ms
#[inline]
pub(crate) fn adaptive_yield(k: &mut u32) {
    if *k < 4 {
        // busy spin
    } else if *k < 16 {
        std::hint::spin_loop();
    } else if *k < 32 {
        std::thread::yield_now();
    } else {
        std::thread::sleep(std::time::Duration::from_millis(1));
        return;
    }
    *k += 1;
}

/// A spin lock guarding a value of type `T`.
///
/// An `AtomicU32` exchanged to 1 on lock, stored to 0 on unlock, with
/// adaptive yield between retries. Const-constructable for `static` use.
pub(crate) struct SpinLock<T> {
    lc: AtomicU32,
    data: UnsafeCell<T>,
}

// SAFETY: the lock hands out exclusive access to `T`, one guard at a time.
unsafe impl<T: Send> Send for SpinLock<T> {}
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Create a new unlocked spin lock wrapping `value`.
    pub(crate) const fn new(value: T) -> Self {
        Self {
            lc: AtomicU32::new(0),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquire the lock (spinning with adaptive backoff).
    pub(crate) fn lock(&self) -> SpinGuard<'_, T> {
        let mut k = 0u32;
        while self.lc.swap(1, Ordering::Acquire) != 0 {
            adaptive_yield(&mut k);
        }
        SpinGuard { lock: self }
    }
}

/// RAII guard; releases the lock on drop.
pub(crate) struct SpinGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> Deref for SpinGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard holds the lock.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SpinGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard holds the lock.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SpinGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.lc.store(0, Ordering::Release);
    }
}
