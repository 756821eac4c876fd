//! # Synchronization Primitives
//!
//! Interrupt-safe critical section abstraction. Kernel state shared with
//! the SysTick and PendSV handlers must only be touched inside one.
//!
//! On target the implementation comes from `cortex-m`'s
//! `critical-section-single-core` feature (interrupts masked); host tests
//! link the `std` implementation of the `critical-section` crate.

pub use critical_section::{CriticalSection, Mutex};

/// Execute a closure within a critical section.
///
/// # Usage
/// ```ignore
/// sync::critical_section(|cs| {
///     // Access shared state safely
/// });
/// ```
///
/// Keep critical sections as short as possible; the SysTick handler is
/// held off for their whole duration.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(CriticalSection<'_>) -> R,
{
    critical_section::with(f)
}
