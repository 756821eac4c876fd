//! # Kernel
//!
//! Global scheduler instance and the public task API.
//!
//! ## Startup Sequence
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► kernel::init(&REGISTRY)  ← Install lifecycle observer + idle task
//!         ├─► kernel::spawn()          ← Register tasks (×N)
//!         └─► kernel::start(cp, panel) ← Hand the idle hook over, launch (no return)
//! ```
//!
//! The idle task takes ownership of the [`IdleHook`] on its first run and
//! calls it in a loop. It is the only context that ever draws.

use core::cell::Cell;

use crate::arch;
use crate::error::KernelError;
use crate::hooks::{IdleHook, TaskLifecycle};
use crate::scheduler::Scheduler;
use crate::sync::{self, Mutex};
use crate::task::{TaskConfig, TaskHandle};

// ---------------------------------------------------------------------------
// Global state
// ---------------------------------------------------------------------------

/// Global scheduler instance.
///
/// # Safety
/// Accessed through [`scheduler_ptr`] only: from critical sections in
/// thread mode, or from the SysTick and PendSV handlers, which run at the
/// same (lowest) priority and therefore never nest.
static mut SCHEDULER: Scheduler = Scheduler::new();

/// Idle hook waiting to be picked up by the idle task.
static IDLE_HOOK: Mutex<Cell<Option<&'static mut (dyn IdleHook + Send)>>> =
    Mutex::new(Cell::new(None));

/// Raw pointer to the global scheduler, for the arch layer.
#[inline]
pub(crate) fn scheduler_ptr() -> *mut Scheduler {
    core::ptr::addr_of_mut!(SCHEDULER)
}

/// Run `f` against the scheduler inside a critical section.
fn with_scheduler<R>(f: impl FnOnce(&mut Scheduler) -> R) -> R {
    sync::critical_section(|_cs| unsafe { f(&mut *scheduler_ptr()) })
}

// ---------------------------------------------------------------------------
// Kernel API
// ---------------------------------------------------------------------------

/// Initialize the kernel: install the lifecycle observer and the idle task.
///
/// Must be called once, from `main`, before any other kernel function.
pub fn init(lifecycle: &'static dyn TaskLifecycle) {
    with_scheduler(|scheduler| {
        scheduler.set_lifecycle(lifecycle);
        scheduler.install_idle(idle_task);
    });
    crate::log_info!("kernel initialized");
}

/// Create a new task.
///
/// On success the lifecycle observer has already been notified. On
/// failure nothing is notified and the error is returned to the caller.
///
/// # Example
/// ```ignore
/// let config = TaskConfig { priority: 2, time_slice: 10 };
/// kernel::spawn(worker, config)?;
/// ```
pub fn spawn(entry: extern "C" fn() -> !, config: TaskConfig) -> Result<TaskHandle, KernelError> {
    with_scheduler(|scheduler| scheduler.spawn(entry, config))
}

/// Delete another task (or the caller). The lifecycle observer is
/// notified exactly once.
pub fn delete(task: TaskHandle) -> Result<(), KernelError> {
    let reschedule = with_scheduler(|scheduler| {
        scheduler.delete_task(task)?;
        Ok(scheduler.needs_reschedule)
    })?;

    if reschedule {
        arch::trigger_pendsv();
    }
    Ok(())
}

/// Delete the calling task. **Does not return.**
pub fn exit() -> ! {
    if retire_current().is_ok() {
        arch::trigger_pendsv();
    }

    loop {
        arch::wait_for_interrupt();
    }
}

/// Delete whichever task is running. The idle task is never retired.
fn retire_current() -> Result<(), KernelError> {
    let result = with_scheduler(|scheduler| {
        let current = scheduler.current_handle();
        scheduler.delete_task(current).map_err(|err| (current, err))
    });

    result.map_err(|(current, err)| {
        crate::log_warn!("exit from task {} refused", current.index());
        err
    })
}

/// Voluntarily give the CPU to the next runnable task.
pub fn yield_task() {
    with_scheduler(Scheduler::yield_current);
    arch::trigger_pendsv();
}

/// Block the calling task for at least `ticks` scheduler ticks.
pub fn sleep(ticks: u32) {
    with_scheduler(|scheduler| scheduler.sleep_current(ticks));
    arch::trigger_pendsv();
}

/// Monotonic scheduler tick count.
pub fn tick_count() -> u64 {
    with_scheduler(|scheduler| scheduler.tick_count)
}

/// Start the scheduler. **Does not return.**
///
/// `idle` is handed to the idle task, which invokes it whenever no
/// spawned task is runnable.
///
/// # Safety
/// - `init()` must have been called.
/// - Must be called from the main thread (not from an ISR).
#[cfg(target_os = "none")]
pub fn start(
    mut core_peripherals: cortex_m::Peripherals,
    idle: &'static mut (dyn IdleHook + Send),
) -> ! {
    use crate::arch::cortex_m4;

    install_idle_hook(idle);

    cortex_m4::configure_systick(&mut core_peripherals.SYST);
    cortex_m4::set_interrupt_priorities();

    let first_sp = with_scheduler(|scheduler| {
        let first = scheduler.schedule();
        scheduler.tasks[first].stack_pointer as *const u32
    });

    crate::log_info!("scheduler started");
    unsafe { cortex_m4::start_first_task(first_sp) }
}

// ---------------------------------------------------------------------------
// Idle task
// ---------------------------------------------------------------------------

/// Park `idle` until the idle task picks it up. Replaces any hook not yet
/// taken.
#[cfg(any(target_os = "none", test))]
fn install_idle_hook(idle: &'static mut (dyn IdleHook + Send)) {
    sync::critical_section(|cs| IDLE_HOOK.borrow(cs).set(Some(idle)));
}

/// Take ownership of the parked hook. Only the first caller gets it.
fn take_idle_hook() -> Option<&'static mut (dyn IdleHook + Send)> {
    sync::critical_section(|cs| IDLE_HOOK.borrow(cs).take())
}

/// Body of the idle task in slot 0.
extern "C" fn idle_task() -> ! {
    let mut hook = take_idle_hook();

    loop {
        match hook.as_mut() {
            Some(hook) => hook.on_idle(tick_count()),
            None => arch::wait_for_interrupt(),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

    use super::*;
    use crate::registry::TaskRegistry;
    use crate::scheduler::IDLE_SLOT;

    extern "C" fn worker() -> ! {
        loop {
            core::hint::spin_loop();
        }
    }

    static IDLE_CALLS: AtomicU32 = AtomicU32::new(0);
    static LAST_IDLE_TICK: AtomicU64 = AtomicU64::new(0);

    struct CountingHook;

    impl IdleHook for CountingHook {
        fn on_idle(&mut self, tick_count: u64) {
            IDLE_CALLS.fetch_add(1, Ordering::Relaxed);
            LAST_IDLE_TICK.store(tick_count, Ordering::Relaxed);
        }
    }

    // The global scheduler is shared by the whole test binary, so every
    // check against it lives in this one test.
    #[test]
    fn test_kernel_api_against_global_scheduler() {
        let registry: &'static TaskRegistry = Box::leak(Box::new(TaskRegistry::new()));
        init(registry);
        assert_eq!(tick_count(), 0);

        let config = TaskConfig {
            priority: 2,
            time_slice: 4,
        };
        let a = spawn(worker, config).unwrap();
        let b = spawn(worker, config).unwrap();
        assert_eq!(registry.current_count(), 2);

        // Idle is current before anything is scheduled; exit is refused
        assert_eq!(with_scheduler(|s| s.current_task), IDLE_SLOT);
        assert_eq!(retire_current(), Err(KernelError::IdleTaskProtected));
        assert_eq!(delete(TaskHandle::IDLE), Err(KernelError::IdleTaskProtected));
        assert_eq!(registry.current_count(), 2);

        // Deleting a task that is not running leaves no switch pending
        assert_eq!(delete(b), Ok(()));
        assert!(!with_scheduler(|s| s.needs_reschedule));
        assert_eq!(delete(b), Err(KernelError::InvalidHandle));
        assert_eq!(registry.current_count(), 1);

        // Retiring the running task requests a switch back to idle
        assert_eq!(with_scheduler(Scheduler::schedule), a.index());
        assert_eq!(retire_current(), Ok(()));
        assert!(with_scheduler(|s| s.needs_reschedule));
        assert_eq!(registry.current_count(), 0);
        assert_eq!(with_scheduler(Scheduler::schedule), IDLE_SLOT);

        // The idle hook is handed over exactly once
        install_idle_hook(Box::leak(Box::new(CountingHook)));
        let hook = take_idle_hook().unwrap();
        assert!(take_idle_hook().is_none());

        hook.on_idle(7);
        assert_eq!(IDLE_CALLS.load(Ordering::Relaxed), 1);
        assert_eq!(LAST_IDLE_TICK.load(Ordering::Relaxed), 7);
    }
}
