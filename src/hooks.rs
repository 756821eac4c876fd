//! # Runtime Hooks
//!
//! Observer interfaces the kernel calls into. They are the only coupling
//! between the scheduler and the status monitor:
//!
//! ```text
//!   Scheduler::spawn() ──ok──► TaskLifecycle::on_task_created()
//!   Scheduler::delete_task() ─► TaskLifecycle::on_task_deleted(handle)
//!   idle task loop ──────────► IdleHook::on_idle(tick_count)
//! ```

use crate::task::TaskHandle;

/// Notified of task creation and teardown.
///
/// Both methods take `&self` and may run from any context, including the
/// SysTick handler or with interrupts masked. Implementations must not block.
pub trait TaskLifecycle: Sync {
    /// A spawn has been confirmed successful. Never called for a failed one.
    fn on_task_created(&self);

    /// `task` is being torn down. Called exactly once per deleted task.
    fn on_task_deleted(&self, task: TaskHandle);
}

/// Run repeatedly by the idle task whenever no other task is runnable.
///
/// Never reentered. Must return promptly so the scheduler can pick up
/// newly runnable tasks.
pub trait IdleHook {
    fn on_idle(&mut self, tick_count: u64);
}
