//! # Configuration
//!
//! Compile-time constants governing the kernel and the status panel.
//! All limits are fixed at compile time — no dynamic allocation.

/// Maximum number of tasks the kernel can hold, including the idle task
/// in slot 0. A spawn beyond this limit fails with
/// [`KernelError::TaskTableFull`](crate::error::KernelError::TaskTableFull).
pub const MAX_TASKS: usize = 8;

/// SysTick frequency in Hz. Also the divisor that turns the tick count
/// into whole seconds of uptime.
pub const TICK_HZ: u32 = 1000;

/// Default time slice in ticks for tasks that do not request one.
pub const DEFAULT_TIME_SLICE: u32 = 10;

/// Per-task stack size in bytes. Must be large enough for the
/// deepest call chain plus the hardware exception frame (32 bytes)
/// and the software-saved context (32 bytes for R4–R11).
pub const STACK_SIZE: usize = 1024;

/// Priority of the idle task. Every spawned task must sit above it.
pub const IDLE_PRIORITY: u8 = 0;

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;
