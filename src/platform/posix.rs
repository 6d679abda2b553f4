// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 libsix contributors
//
// POSIX implementation of CPU identity for the reader shard.
// Linux reports the real CPU via sched_getcpu(); other unixes fall back to
// spreading threads across slots by thread token, which keeps the shard
// correct (any slot works) at some cost in locality.

/// Index of the CPU the calling thread is running on. Callers reduce the
/// result modulo the shard slot count.
#[cfg(target_os = "linux")]
pub(crate) fn current_cpu() -> usize {
    // SAFETY: no preconditions; returns the current CPU or -1.
    let cpu = unsafe { libc::sched_getcpu() };
    if cpu >= 0 {
        cpu as usize
    } else {
        fallback_cpu()
    }
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn current_cpu() -> usize {
    fallback_cpu()
}

fn fallback_cpu() -> usize {
    crate::waiter::current_token() as usize
}

/// Number of CPUs the shard allocates slots for (configured, not online:
/// a thread may report a CPU that is currently offline).
pub(crate) fn cpu_count() -> usize {
    // SAFETY: sysconf with a valid name; returns -1 on failure.
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_CONF) };
    if n > 0 {
        n as usize
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
