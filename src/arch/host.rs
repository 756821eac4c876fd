//! Host stand-ins for the Cortex-M4 port. There is no context switch on
//! the host; the scheduler is driven directly by tests.

/// No PendSV on the host.
#[inline]
pub fn trigger_pendsv() {}

#[inline]
pub fn wait_for_interrupt() {
    core::hint::spin_loop();
}
