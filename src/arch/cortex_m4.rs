//! # Cortex-M4 Port Layer
//!
//! Hardware-specific code for the ARM Cortex-M4 (Thumb-2) processor:
//! context switching via PendSV, SysTick configuration and the first task
//! launch.
//!
//! ## Context Switch Mechanism
//!
//! - **MSP** (Main Stack Pointer): kernel and interrupt handlers
//! - **PSP** (Process Stack Pointer): tasks in Thread mode
//!
//! On exception entry the hardware stacks R0–R3, R12, LR, PC and xPSR onto
//! the process stack. PendSV saves and restores R4–R11 by hand.
//!
//! ## Interrupt Priorities
//!
//! SysTick and PendSV both run at 0xFF (lowest), so a context switch never
//! preempts an application interrupt handler.

use core::arch::{asm, naked_asm};

use cortex_m::peripheral::syst::SystClkSource;

use crate::config::{SYSTEM_CLOCK_HZ, TICK_HZ};
use crate::kernel;

// ---------------------------------------------------------------------------
// SysTick configuration
// ---------------------------------------------------------------------------

/// Configure SysTick to fire at `TICK_HZ` from the processor clock.
pub fn configure_systick(syst: &mut cortex_m::peripheral::SYST) {
    let reload = SYSTEM_CLOCK_HZ / TICK_HZ - 1;
    syst.set_reload(reload);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

// ---------------------------------------------------------------------------
// PendSV trigger
// ---------------------------------------------------------------------------

/// Pend a context switch. Sets PENDSVSET (bit 28) in ICSR.
#[inline]
pub fn trigger_pendsv() {
    const ICSR: *mut u32 = 0xE000_ED04 as *mut u32;
    unsafe {
        core::ptr::write_volatile(ICSR, 1 << 28);
    }
}

#[inline]
pub fn wait_for_interrupt() {
    cortex_m::asm::wfi();
}

// ---------------------------------------------------------------------------
// Interrupt priority configuration
// ---------------------------------------------------------------------------

/// Set PendSV and SysTick to the lowest interrupt priority.
pub fn set_interrupt_priorities() {
    unsafe {
        // SHPR3: bits [23:16] = PendSV, bits [31:24] = SysTick
        let shpr3: *mut u32 = 0xE000_ED20 as *mut u32;
        let val = core::ptr::read_volatile(shpr3);
        core::ptr::write_volatile(shpr3, val | (0xFF << 16) | (0xFF << 24));
    }
}

// ---------------------------------------------------------------------------
// First task launch
// ---------------------------------------------------------------------------

/// Switch Thread mode to PSP and branch into the first task.
///
/// # Safety
/// Must only be called once, with a stack pointer prepared by the
/// scheduler's stack initialization.
pub unsafe fn start_first_task(psp: *const u32) -> ! {
    asm!(
        // Skip the software-saved R4-R11
        "adds r0, #32",
        "msr psp, r0",

        // CONTROL.SPSEL = 1
        "movs r0, #2",
        "msr control, r0",
        "isb",

        // Unwind the prepared hardware frame by hand
        "pop {{r0-r3, r12}}",
        "pop {{r4}}",          // LR (task_exit, unused)
        "pop {{r5}}",          // PC (task entry point)
        "pop {{r6}}",          // xPSR (discarded)

        "cpsie i",
        "bx r5",

        in("r0") psp,
        options(noreturn)
    );
}

// ---------------------------------------------------------------------------
// PendSV handler (context switch)
// ---------------------------------------------------------------------------

/// PendSV exception handler.
///
/// 1. Save R4–R11 onto the outgoing task's stack
/// 2. Store the updated PSP into its TCB
/// 3. Ask the scheduler for the next task
/// 4. Restore R4–R11 from the incoming task's stack
/// 5. Exception return to Thread mode on PSP
///
/// # Safety
/// Entered only by the NVIC.
#[no_mangle]
#[unsafe(naked)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn PendSV() {
    naked_asm!(
        "mrs r0, psp",
        "stmdb r0!, {{r4-r11}}",
        "bl {save_context}",

        "bl {do_schedule}",

        "ldmia r0!, {{r4-r11}}",
        "msr psp, r0",

        // EXC_RETURN: Thread mode, PSP
        "ldr r0, =0xFFFFFFFD",
        "bx r0",

        save_context = sym save_current_context,
        do_schedule = sym do_context_switch,
    );
}

/// Store the outgoing task's stack pointer. Called from PendSV.
unsafe extern "C" fn save_current_context(psp: *mut u32) {
    let scheduler = &mut *kernel::scheduler_ptr();
    let current = scheduler.current_task;
    scheduler.tasks[current].stack_pointer = psp;
}

/// Pick the next task and return its saved PSP. Called from PendSV.
unsafe extern "C" fn do_context_switch() -> *mut u32 {
    let scheduler = &mut *kernel::scheduler_ptr();
    let next = scheduler.schedule();
    scheduler.tasks[next].stack_pointer
}

// ---------------------------------------------------------------------------
// SysTick handler
// ---------------------------------------------------------------------------

/// Scheduler tick at `TICK_HZ`. Pends a context switch when one is due.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn SysTick() {
    let scheduler = &mut *kernel::scheduler_ptr();
    scheduler.tick();

    if scheduler.needs_reschedule {
        trigger_pendsv();
    }
}
