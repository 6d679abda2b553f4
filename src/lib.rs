// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 libsix contributors
//
// A three-mode lock for objects that are read often and reserved long before
// they are written: shared read, exclusive-among-writers intent, and fully
// exclusive write (an upgrade from intent). Writes are counted by a sequence
// number so callers can re-acquire optimistically iff nothing changed, and
// an optional per-CPU reader shard turns read acquisition into a local
// counter bump.

mod platform;

mod state;

mod spin_lock;

mod pcpu;

pub mod waiter;
pub use waiter::LockWaiter;

mod six_lock;
pub use six_lock::{LockCounts, LockType, SixLock};
