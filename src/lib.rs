//! # idlestat
//!
//! Task lifecycle counting and an idle-time status panel for a small
//! preemptive RTOS on ARM Cortex-M4.
//!
//! ## Overview
//!
//! The kernel reports every successful spawn and every deletion to a
//! [`TaskRegistry`](registry::TaskRegistry). Whenever no task is runnable
//! the idle task runs the [`StatusPanel`](panel::StatusPanel), which keeps
//! a status bar along the bottom of a 320×240 display up to date:
//!
//! ```text
//! ┌────────┬─────┬────────────┬──────┬──────┐
//! │ Uptime │Tasks│ IP Address │  TX  │  RX  │
//! │00:12:07│  3  │            │   41 │   17 │
//! └────────┴─────┴────────────┴──────┴──────┘
//! ```
//!
//! Only fields whose value changed since the previous idle pass are
//! repainted; the frame and labels are drawn once.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    Application Tasks                    │
//! ├────────────────────────────────────────────────────────┤
//! │                 Kernel API (kernel.rs)                  │
//! │   init() · spawn() · delete() · exit() · sleep() · start() │
//! ├──────────────┬──────────────────┬─────────────────────┤
//! │  Scheduler   │  Hooks           │  Status Monitor     │
//! │  scheduler.rs│  hooks.rs        │  registry.rs        │
//! │  ─ spawn()   │  ─ TaskLifecycle │  panel.rs           │
//! │  ─ tick()    │  ─ IdleHook      │  format.rs          │
//! │  ─ schedule()│                  │  layout.rs          │
//! ├──────────────┴──────────────────┴─────────────────────┤
//! │              Task Model (task.rs)                       │
//! ├────────────────────────────────────────────────────────┤
//! │            Arch Port (arch/cortex_m4.rs)                │
//! │    PendSV · SysTick · Context Switch · Stack Init      │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Memory Model
//!
//! - **No heap**: All state is statically allocated
//! - **Fixed-size TCB array**: `[TaskControlBlock; MAX_TASKS]`
//! - **Lock-free counters**: the registry and link counters are atomics,
//!   safe to touch from any context
//! - **Critical sections**: `critical_section::with()` for scheduler state

#![cfg_attr(not(test), no_std)]

pub mod log;

pub mod arch;
pub mod config;
pub mod counters;
pub mod display;
pub mod error;
pub mod format;
pub mod hooks;
pub mod kernel;
pub mod layout;
pub mod panel;
pub mod registry;
pub mod scheduler;
pub mod sync;
pub mod task;
