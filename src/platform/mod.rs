// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 libsix contributors

#[cfg(unix)]
pub(crate) mod posix;

#[cfg(windows)]
pub(crate) mod windows;

// Re-export the platform-specific implementations under a uniform name.

#[cfg(unix)]
pub(crate) use posix::{cpu_count, current_cpu};

#[cfg(windows)]
pub(crate) use windows::{cpu_count, current_cpu};
