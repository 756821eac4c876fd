//! # Architecture Abstraction Layer
//!
//! Hardware boundary for the kernel. The Cortex-M4 port is built for
//! bare-metal targets; host builds (unit tests) get inert stand-ins with
//! the same names so the kernel and scheduler compile unchanged.

#[cfg(target_os = "none")]
pub mod cortex_m4;

#[cfg(target_os = "none")]
pub use cortex_m4::{trigger_pendsv, wait_for_interrupt};

#[cfg(not(target_os = "none"))]
pub mod host;

#[cfg(not(target_os = "none"))]
pub use host::{trigger_pendsv, wait_for_interrupt};
