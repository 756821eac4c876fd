//! # Task Registry
//!
//! Count of tasks currently alive. Incremented after each confirmed spawn,
//! decremented from the kernel's deletion path, and read once per idle pass
//! by the status panel.
//!
//! The counter is a single `AtomicU32`, so every operation is lock-free and
//! safe from thread mode, the SysTick handler, or inside a critical section.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::hooks::TaskLifecycle;
use crate::task::TaskHandle;

/// Number of live tasks, maintained from lifecycle notifications.
///
/// Invariant: `current_count() == registrations − unregistrations`, never
/// below zero.
#[derive(Debug)]
pub struct TaskRegistry {
    active_count: AtomicU32,
}

impl TaskRegistry {
    pub const fn new() -> Self {
        Self {
            active_count: AtomicU32::new(0),
        }
    }

    /// Record a confirmed successful spawn.
    pub fn register_task(&self) {
        self.active_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Record the teardown of `task`. Saturates at zero.
    pub fn unregister_task(&self, task: TaskHandle) {
        let result = self
            .active_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            });

        if result.is_err() {
            crate::log_warn!("unregister of task {} with no live tasks", task.index());
        }
    }

    /// Non-blocking read of the live task count.
    #[inline]
    pub fn current_count(&self) -> u32 {
        self.active_count.load(Ordering::Acquire)
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskLifecycle for TaskRegistry {
    fn on_task_created(&self) {
        self.register_task();
    }

    fn on_task_deleted(&self, task: TaskHandle) {
        self.unregister_task(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let registry = TaskRegistry::new();
        assert_eq!(registry.current_count(), 0);
    }

    #[test]
    fn test_interleaved_create_and_delete() {
        let registry = TaskRegistry::new();
        let mut created = 0u32;
        let mut deleted = 0u32;

        // create, create, delete, create, delete, delete, create
        for (step, create) in [true, true, false, true, false, false, true]
            .into_iter()
            .enumerate()
        {
            if create {
                registry.on_task_created();
                created += 1;
            } else {
                registry.on_task_deleted(TaskHandle::new(step));
                deleted += 1;
            }
            assert_eq!(registry.current_count(), created - deleted);
        }

        assert_eq!(registry.current_count(), 1);
    }

    #[test]
    fn test_unregister_saturates_at_zero() {
        let registry = TaskRegistry::new();
        registry.unregister_task(TaskHandle::new(1));
        assert_eq!(registry.current_count(), 0);

        registry.register_task();
        registry.unregister_task(TaskHandle::new(1));
        registry.unregister_task(TaskHandle::new(1));
        assert_eq!(registry.current_count(), 0);
    }

    #[test]
    fn test_shared_across_threads() {
        static REGISTRY: TaskRegistry = TaskRegistry::new();

        let workers: std::vec::Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    for _ in 0..1000 {
                        REGISTRY.register_task();
                    }
                    for i in 0..500 {
                        REGISTRY.unregister_task(TaskHandle::new(i));
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(REGISTRY.current_count(), 2000);
    }
}
