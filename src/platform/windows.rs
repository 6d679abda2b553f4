// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 libsix contributors
//
// Windows implementation of CPU identity for the reader shard.

use windows_sys::Win32::System::Threading::GetCurrentProcessorNumber;

/// Index of the CPU the calling thread is running on. Callers reduce the
/// result modulo the shard slot count.
pub(crate) fn current_cpu() -> usize {
    // SAFETY: no arguments, no failure mode; returns the current processor.
    unsafe { GetCurrentProcessorNumber() as usize }
}

/// Number of CPUs the shard allocates slots for.
pub(crate) fn cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
