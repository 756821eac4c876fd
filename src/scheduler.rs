//! # Scheduler
//!
//! Preemptive, priority-based scheduler with round-robin among equal
//! priorities. It is the part of the runtime the status monitor observes:
//! every successful spawn and every deletion is reported to the installed
//! [`TaskLifecycle`] observer, and slot 0 holds the idle task that runs the
//! [`IdleHook`](crate::hooks::IdleHook) whenever nothing else is runnable.
//!
//! ## Scheduling Algorithm
//!
//! At each SysTick interrupt:
//! 1. **Advance time**: Increment the monotonic tick counter
//! 2. **Wake sleepers**: Blocked tasks whose wake tick has passed become Ready
//! 3. **Decrement time slice**: If expired, request a reschedule
//! 4. **Select next task**: Highest-priority runnable task, rotating among
//!    equals; the idle task only when nothing else can run
//! 5. **Context switch**: PendSV swaps stacks if the selection changed

use crate::config::{IDLE_PRIORITY, MAX_TASKS, STACK_SIZE};
use crate::error::KernelError;
use crate::hooks::TaskLifecycle;
use crate::task::{TaskConfig, TaskControlBlock, TaskHandle, TaskState};

/// Task table slot reserved for the idle task.
pub const IDLE_SLOT: usize = 0;

// ---------------------------------------------------------------------------
// Scheduler struct
// ---------------------------------------------------------------------------

/// The central scheduler state. Stored as a global `static mut` in
/// `kernel.rs` and accessed from critical sections, SysTick and PendSV.
pub struct Scheduler {
    /// Fixed-size array of TCBs. Index 0 is reserved for the idle task.
    pub tasks: [TaskControlBlock; MAX_TASKS],

    /// Index of the currently running task.
    pub current_task: usize,

    /// Monotonic tick counter.
    pub tick_count: u64,

    /// Flag set when a context switch should happen at the next PendSV.
    pub needs_reschedule: bool,

    /// Observer notified of spawns and deletions.
    lifecycle: Option<&'static dyn TaskLifecycle>,
}

impl Scheduler {
    /// Create an empty scheduler. The idle task is installed separately.
    pub const fn new() -> Self {
        Self {
            tasks: [TaskControlBlock::EMPTY; MAX_TASKS],
            current_task: IDLE_SLOT,
            tick_count: 0,
            needs_reschedule: false,
            lifecycle: None,
        }
    }

    /// Install the observer for spawn and deletion events.
    pub fn set_lifecycle(&mut self, observer: &'static dyn TaskLifecycle) {
        self.lifecycle = Some(observer);
    }

    /// Place the idle task in slot 0. It never expires its slice and is
    /// not counted as a spawned task.
    pub fn install_idle(&mut self, entry: extern "C" fn() -> !) {
        let idle = &mut self.tasks[IDLE_SLOT];
        idle.init(TaskConfig {
            priority: IDLE_PRIORITY,
            time_slice: 0,
        });
        init_task_stack(idle, entry);
    }

    /// Create a task in the first free slot.
    ///
    /// The lifecycle observer is notified only after the task has been
    /// fully set up; a failed spawn leaves it untouched.
    ///
    /// # Returns
    /// - `Ok(handle)` — the newly created task
    /// - `Err(KernelError::TaskTableFull)` — no free slot
    pub fn spawn(
        &mut self,
        entry: extern "C" fn() -> !,
        config: TaskConfig,
    ) -> Result<TaskHandle, KernelError> {
        let Some(slot) = (IDLE_SLOT + 1..MAX_TASKS).find(|&i| !self.tasks[i].is_alive()) else {
            crate::log_warn!("spawn failed: task table full");
            return Err(KernelError::TaskTableFull);
        };

        let config = TaskConfig {
            priority: config.priority.max(IDLE_PRIORITY + 1),
            ..config
        };
        self.tasks[slot].init(config);
        init_task_stack(&mut self.tasks[slot], entry);

        if let Some(observer) = self.lifecycle {
            observer.on_task_created();
        }

        crate::log_info!("task {} spawned at priority {}", slot, config.priority);
        Ok(TaskHandle::new(slot))
    }

    /// Tear down a task and notify the lifecycle observer exactly once.
    ///
    /// Deleting the running task requests a reschedule; the caller is
    /// responsible for pending the context switch.
    pub fn delete_task(&mut self, handle: TaskHandle) -> Result<(), KernelError> {
        let slot = handle.index();
        if slot == IDLE_SLOT {
            return Err(KernelError::IdleTaskProtected);
        }
        if slot >= MAX_TASKS || !self.tasks[slot].is_alive() {
            return Err(KernelError::InvalidHandle);
        }

        self.tasks[slot].terminate();
        if slot == self.current_task {
            self.needs_reschedule = true;
        }

        if let Some(observer) = self.lifecycle {
            observer.on_task_deleted(handle);
        }

        crate::log_info!("task {} deleted", slot);
        Ok(())
    }

    /// Called from the SysTick handler every tick.
    pub fn tick(&mut self) {
        self.tick_count += 1;
        let now = self.tick_count;

        // --- Wake sleeping tasks ---
        for task in self.tasks.iter_mut() {
            if task.state == TaskState::Blocked && now >= task.wake_tick {
                task.state = TaskState::Ready;
                task.reset_slice();
                self.needs_reschedule = true;
            }
        }

        let current = self.current_task;
        if current == IDLE_SLOT {
            // The idle task gives way as soon as anything else can run
            if self.tasks[IDLE_SLOT + 1..].iter().any(TaskControlBlock::is_runnable) {
                self.needs_reschedule = true;
            }
            return;
        }

        // --- Time slice accounting ---
        let task = &mut self.tasks[current];
        if task.state == TaskState::Running {
            task.ticks_remaining = task.ticks_remaining.saturating_sub(1);
            if task.ticks_remaining == 0 {
                task.reset_slice();
                self.needs_reschedule = true;
            }
        }
    }

    /// Select the next task to run.
    ///
    /// Scans the table starting after the current task so that tasks of
    /// equal priority take turns. Falls back to the idle task.
    ///
    /// # Returns
    /// Index of the next task to run.
    pub fn schedule(&mut self) -> usize {
        let mut best: Option<(usize, u8)> = None;

        for offset in 1..=MAX_TASKS {
            let i = (self.current_task + offset) % MAX_TASKS;
            if i == IDLE_SLOT || !self.tasks[i].is_runnable() {
                continue;
            }

            let priority = self.tasks[i].config.priority;
            if best.map_or(true, |(_, p)| priority > p) {
                best = Some((i, priority));
            }
        }

        let next = best.map_or(IDLE_SLOT, |(i, _)| i);

        // Mark previous task as Ready (if it was Running)
        let prev = self.current_task;
        if self.tasks[prev].state == TaskState::Running {
            self.tasks[prev].state = TaskState::Ready;
        }

        self.tasks[next].state = TaskState::Running;
        self.current_task = next;
        self.needs_reschedule = false;

        next
    }

    /// Voluntary yield from the current task.
    pub fn yield_current(&mut self) {
        let task = &mut self.tasks[self.current_task];
        if task.is_runnable() {
            task.state = TaskState::Ready;
            task.reset_slice();
            self.needs_reschedule = true;
        }
    }

    /// Block the current task for at least `ticks` ticks. The idle task
    /// never sleeps.
    pub fn sleep_current(&mut self, ticks: u32) {
        let current = self.current_task;
        if current == IDLE_SLOT {
            return;
        }

        let task = &mut self.tasks[current];
        task.state = TaskState::Blocked;
        task.wake_tick = self.tick_count + u64::from(ticks.max(1));
        self.needs_reschedule = true;
    }

    /// Handle of the running task.
    #[inline]
    pub fn current_handle(&self) -> TaskHandle {
        TaskHandle::new(self.current_task)
    }

    /// Number of live tasks, not counting the idle task.
    pub fn live_tasks(&self) -> usize {
        self.tasks[IDLE_SLOT + 1..]
            .iter()
            .filter(|task| task.is_alive())
            .count()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Stack initialization helper
// ---------------------------------------------------------------------------

/// Initialize a task's stack frame for first-time context switch.
///
/// ## Stack Layout (top = high address, growing down)
///
/// ```text
/// [Hardware stacked frame]
///   xPSR  (Thumb bit set)
///   PC    (task entry point)
///   LR    (task_exit)
///   R12, R3, R2, R1, R0   (0)
/// [Software saved context]
///   R11 .. R4             (0)   <- stack_pointer after init
/// ```
fn init_task_stack(tcb: &mut TaskControlBlock, entry: extern "C" fn() -> !) {
    let stack_top = tcb.stack.0.as_mut_ptr() as usize + STACK_SIZE;
    // Align to 8 bytes (AAPCS requirement)
    let aligned_top = stack_top & !0x07;

    // 16 registers: 8 software-saved + 8 hardware-stacked
    let frame_ptr = (aligned_top - 16 * 4) as *mut u32;

    unsafe {
        // R4–R11, then R0–R3 and R12
        for i in 0..13 {
            *frame_ptr.add(i) = 0;
        }
        *frame_ptr.add(13) = task_exit as *const () as usize as u32; // LR
        *frame_ptr.add(14) = entry as *const () as usize as u32; // PC
        *frame_ptr.add(15) = 0x0100_0000; // xPSR — Thumb bit set
    }

    tcb.stack_pointer = frame_ptr;
}

/// Fallback for tasks that return (they can't — entry is `fn() -> !`).
extern "C" fn task_exit() -> ! {
    loop {
        crate::arch::wait_for_interrupt();
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TaskRegistry;

    extern "C" fn noop_task() -> ! {
        loop {
            core::hint::spin_loop();
        }
    }

    fn config(priority: u8) -> TaskConfig {
        TaskConfig {
            priority,
            time_slice: 2,
        }
    }

    /// Scheduler with the idle task installed and a fresh registry attached.
    /// Boxed: the task table carries every stack inline.
    fn scheduler() -> (Box<Scheduler>, &'static TaskRegistry) {
        let registry: &'static TaskRegistry = Box::leak(Box::new(TaskRegistry::new()));
        let mut scheduler = Box::new(Scheduler::new());
        scheduler.set_lifecycle(registry);
        scheduler.install_idle(noop_task);
        (scheduler, registry)
    }

    #[test]
    fn test_spawn_notifies_registry() {
        let (mut s, registry) = scheduler();

        let a = s.spawn(noop_task, config(1)).unwrap();
        let b = s.spawn(noop_task, config(2)).unwrap();

        assert_eq!(a.index(), 1);
        assert_eq!(b.index(), 2);
        assert_eq!(registry.current_count(), 2);
        assert_eq!(s.live_tasks(), 2);
    }

    #[test]
    fn test_failed_spawn_leaves_count_unchanged() {
        let (mut s, registry) = scheduler();

        for _ in 1..MAX_TASKS {
            s.spawn(noop_task, config(1)).unwrap();
        }
        let before = registry.current_count();
        assert_eq!(before, (MAX_TASKS - 1) as u32);

        assert_eq!(s.spawn(noop_task, config(1)), Err(KernelError::TaskTableFull));
        assert_eq!(registry.current_count(), before);
    }

    #[test]
    fn test_delete_notifies_once() {
        let (mut s, registry) = scheduler();
        let task = s.spawn(noop_task, config(1)).unwrap();

        assert_eq!(s.delete_task(task), Ok(()));
        assert_eq!(registry.current_count(), 0);

        // Second delete of the same handle is rejected and not reported
        assert_eq!(s.delete_task(task), Err(KernelError::InvalidHandle));
        assert_eq!(registry.current_count(), 0);
    }

    #[test]
    fn test_delete_rejects_idle_and_out_of_range() {
        let (mut s, registry) = scheduler();
        s.spawn(noop_task, config(1)).unwrap();

        assert_eq!(s.delete_task(TaskHandle::IDLE), Err(KernelError::IdleTaskProtected));
        assert_eq!(
            s.delete_task(TaskHandle::new(MAX_TASKS + 3)),
            Err(KernelError::InvalidHandle)
        );
        assert_eq!(registry.current_count(), 1);
    }

    #[test]
    fn test_deleted_slot_is_reused() {
        let (mut s, registry) = scheduler();
        let first = s.spawn(noop_task, config(1)).unwrap();
        s.spawn(noop_task, config(1)).unwrap();

        s.delete_task(first).unwrap();
        let reused = s.spawn(noop_task, config(1)).unwrap();

        assert_eq!(reused, first);
        assert_eq!(registry.current_count(), 2);
    }

    #[test]
    fn test_idle_runs_only_when_nothing_else_can() {
        let (mut s, _) = scheduler();
        assert_eq!(s.schedule(), IDLE_SLOT);

        let task = s.spawn(noop_task, config(1)).unwrap();
        s.tick();
        assert!(s.needs_reschedule);
        assert_eq!(s.schedule(), task.index());

        s.sleep_current(5);
        assert_eq!(s.schedule(), IDLE_SLOT);
    }

    #[test]
    fn test_sleeping_task_wakes_after_ticks() {
        let (mut s, _) = scheduler();
        let task = s.spawn(noop_task, config(1)).unwrap();
        assert_eq!(s.schedule(), task.index());

        s.sleep_current(3);
        assert_eq!(s.schedule(), IDLE_SLOT);

        s.tick();
        s.tick();
        assert_eq!(s.tasks[task.index()].state, TaskState::Blocked);
        s.tick();
        assert_eq!(s.tasks[task.index()].state, TaskState::Ready);
        assert!(s.needs_reschedule);
        assert_eq!(s.schedule(), task.index());
    }

    #[test]
    fn test_higher_priority_wins() {
        let (mut s, _) = scheduler();
        s.spawn(noop_task, config(1)).unwrap();
        let high = s.spawn(noop_task, config(4)).unwrap();

        assert_eq!(s.schedule(), high.index());
        assert_eq!(s.schedule(), high.index());
    }

    #[test]
    fn test_round_robin_among_equals() {
        let (mut s, _) = scheduler();
        let a = s.spawn(noop_task, config(2)).unwrap();
        let b = s.spawn(noop_task, config(2)).unwrap();

        assert_eq!(s.schedule(), a.index());
        // Slice of 2 ticks expires
        s.tick();
        assert!(!s.needs_reschedule);
        s.tick();
        assert!(s.needs_reschedule);
        assert_eq!(s.schedule(), b.index());
        s.yield_current();
        assert_eq!(s.schedule(), a.index());
    }

    #[test]
    fn test_spawn_priority_raised_above_idle() {
        let (mut s, _) = scheduler();
        let task = s.spawn(noop_task, config(IDLE_PRIORITY)).unwrap();
        assert!(s.tasks[task.index()].config.priority > IDLE_PRIORITY);
    }

    #[test]
    fn test_stack_frame_layout() {
        let (mut s, _) = scheduler();
        let task = s.spawn(noop_task, config(1)).unwrap();
        let tcb = &s.tasks[task.index()];

        let base = tcb.stack.0.as_ptr() as usize;
        let sp = tcb.stack_pointer as usize;
        assert_eq!(sp % 8, 0);
        assert!(sp >= base && sp + 16 * 4 <= base + STACK_SIZE);

        let (lr, pc, xpsr) = unsafe {
            (
                *tcb.stack_pointer.add(13),
                *tcb.stack_pointer.add(14),
                *tcb.stack_pointer.add(15),
            )
        };
        assert_eq!(lr, task_exit as *const () as usize as u32);
        assert_eq!(pc, noop_task as *const () as usize as u32);
        assert_eq!(xpsr, 0x0100_0000);
    }
}
