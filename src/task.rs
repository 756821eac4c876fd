//! # Task Control Block
//!
//! Per-task state kept by the scheduler: execution state, priority, time
//! slice bookkeeping and the inline stack. Slot 0 of the task table always
//! holds the idle task.

use crate::config::{DEFAULT_TIME_SLICE, IDLE_PRIORITY, STACK_SIZE};

// ---------------------------------------------------------------------------
// Task handle
// ---------------------------------------------------------------------------

/// Opaque reference to a task slot, handed out by `spawn` and passed to
/// the deletion notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskHandle(usize);

impl TaskHandle {
    /// Handle of the idle task.
    pub const IDLE: Self = Self(0);

    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Slot index in the scheduler's task table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Task state machine
// ---------------------------------------------------------------------------

/// Execution state of a task.
///
/// ```text
///   ┌──────────┐     schedule()      ┌─────────┐
///   │  Ready   │ ──────────────────► │ Running │
///   └──────────┘                     └─────────┘
///        ▲         preempt / yield        │
///        ├────────────────────────────────┤
///        │       wake tick reached        │ sleep()
///        │                          ┌──────────┐
///        └───────────────────────── │ Blocked  │
///                                   └──────────┘
/// ```
///
/// Deleted tasks move to `Terminated` and their slot becomes free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    /// Task is ready to run and waiting for the CPU.
    Ready,
    /// Task is currently executing on the CPU.
    Running,
    /// Task is sleeping until `wake_tick`.
    Blocked,
    /// Slot is free, or the task has been deleted.
    Terminated,
}

// ---------------------------------------------------------------------------
// Task configuration (immutable after creation)
// ---------------------------------------------------------------------------

/// Static configuration for a task, set at spawn time.
#[derive(Debug, Clone, Copy)]
pub struct TaskConfig {
    /// Priority (higher = more important). Must be above `IDLE_PRIORITY`.
    pub priority: u8,

    /// Time slice in ticks. If 0, uses `DEFAULT_TIME_SLICE`.
    pub time_slice: u32,
}

impl TaskConfig {
    /// Returns the effective time slice, falling back to the system default.
    #[inline]
    pub const fn effective_time_slice(&self) -> u32 {
        if self.time_slice > 0 {
            self.time_slice
        } else {
            DEFAULT_TIME_SLICE
        }
    }
}

// ---------------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------------

/// Per-task stack memory, 8-byte aligned as required by the ARM AAPCS.
#[repr(C, align(8))]
pub struct TaskStack(pub [u8; STACK_SIZE]);

// ---------------------------------------------------------------------------
// Task Control Block
// ---------------------------------------------------------------------------

/// Task Control Block (TCB).
///
/// TCBs are stored in a static array in the scheduler — no heap allocation.
/// `stack_pointer` points into `stack` and is updated on every context
/// switch.
pub struct TaskControlBlock {
    /// Current execution state.
    pub state: TaskState,

    /// Static configuration.
    pub config: TaskConfig,

    /// Saved stack pointer (PSP).
    pub stack_pointer: *mut u32,

    /// Per-task stack memory.
    pub stack: TaskStack,

    /// Remaining ticks in the current time slice.
    pub ticks_remaining: u32,

    /// Tick at which a `Blocked` task becomes `Ready` again.
    pub wake_tick: u64,
}

// Safety: `stack_pointer` always points into the task's own stack array,
// and TCBs are only accessed within critical sections or from PendSV.
unsafe impl Send for TaskControlBlock {}
unsafe impl Sync for TaskControlBlock {}

impl TaskControlBlock {
    /// An unallocated slot. Used to initialize the static array.
    pub const EMPTY: Self = Self {
        state: TaskState::Terminated,
        config: TaskConfig {
            priority: IDLE_PRIORITY,
            time_slice: 0,
        },
        stack_pointer: core::ptr::null_mut(),
        stack: TaskStack([0u8; STACK_SIZE]),
        ticks_remaining: 0,
        wake_tick: 0,
    };

    /// Initialize the TCB for a new task. The stack frame is set up
    /// separately by the scheduler.
    pub fn init(&mut self, config: TaskConfig) {
        self.state = TaskState::Ready;
        self.config = config;
        self.ticks_remaining = config.effective_time_slice();
        self.wake_tick = 0;
    }

    /// Free the slot.
    pub fn terminate(&mut self) {
        self.state = TaskState::Terminated;
        self.stack_pointer = core::ptr::null_mut();
    }

    /// Whether this slot holds a live (not yet deleted) task.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state != TaskState::Terminated
    }

    /// Whether this task can be picked by `schedule()`.
    #[inline]
    pub fn is_runnable(&self) -> bool {
        matches!(self.state, TaskState::Ready | TaskState::Running)
    }

    /// Refill the time slice.
    #[inline]
    pub fn reset_slice(&mut self) {
        self.ticks_remaining = self.config.effective_time_slice();
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcb_initialization() {
        let mut tcb = TaskControlBlock::EMPTY;
        assert!(!tcb.is_alive());
        assert!(!tcb.is_runnable());

        tcb.init(TaskConfig {
            priority: 5,
            time_slice: 15,
        });

        assert!(tcb.is_alive());
        assert!(tcb.is_runnable());
        assert_eq!(tcb.state, TaskState::Ready);
        assert_eq!(tcb.config.priority, 5);
        assert_eq!(tcb.ticks_remaining, 15);
    }

    #[test]
    fn test_blocked_is_alive_but_not_runnable() {
        let mut tcb = TaskControlBlock::EMPTY;
        tcb.init(TaskConfig {
            priority: 1,
            time_slice: 0,
        });
        tcb.state = TaskState::Blocked;

        assert!(tcb.is_alive());
        assert!(!tcb.is_runnable());
    }

    #[test]
    fn test_terminate_frees_slot() {
        let mut tcb = TaskControlBlock::EMPTY;
        tcb.init(TaskConfig {
            priority: 1,
            time_slice: 0,
        });
        tcb.terminate();

        assert!(!tcb.is_alive());
        assert!(tcb.stack_pointer.is_null());
    }

    #[test]
    fn test_effective_time_slice_default() {
        let config = TaskConfig {
            priority: 1,
            time_slice: 0,
        };
        assert_eq!(config.effective_time_slice(), DEFAULT_TIME_SLICE);
    }

    #[test]
    fn test_stack_alignment() {
        assert_eq!(core::mem::align_of::<TaskStack>(), 8);
    }
}
