//! Kernel error type.

use core::fmt;

/// Failure of a kernel task operation.
///
/// A failed spawn is reported only through this value; the task lifecycle
/// observers are never notified for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KernelError {
    /// Every slot in the task table is occupied.
    TaskTableFull,
    /// The handle does not name a live task.
    InvalidHandle,
    /// The idle task cannot be deleted.
    IdleTaskProtected,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskTableFull => f.write_str("task table full"),
            Self::InvalidHandle => f.write_str("no live task for handle"),
            Self::IdleTaskProtected => f.write_str("idle task cannot be deleted"),
        }
    }
}
