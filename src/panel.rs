//! # Status Panel
//!
//! The idle-time renderer. Each pass it recomputes uptime and the live
//! task count and repaints only the fields whose value changed since the
//! last pass.
//!
//! ```text
//!   ┌───────────────┐  first pass: box, dividers, labels  ┌──────────┐
//!   │ Uninitialized │ ──────────────────────────────────► │  Steady  │
//!   └───────────────┘                                      └──────────┘
//!                                                           │  ▲
//!                                        changed fields only └──┘
//! ```
//!
//! Uptime and task count are repainted as fixed-width strings so a shorter
//! value always covers a longer one. TX/RX totals only grow, so their
//! right-aligned digits are never narrower than what they replace.

use bitflags::bitflags;

use crate::counters::LinkCounters;
use crate::display::Canvas;
use crate::format::{format_number, format_task_count, format_uptime};
use crate::hooks::IdleHook;
use crate::layout::{
    self, Field, BAR_BOTTOM, BAR_RIGHT, BAR_TOP, DIVIDERS, LABELS, LABEL_ROW, UPTIME_COLUMN,
    VALUE_ROW,
};
use crate::registry::TaskRegistry;

bitflags! {
    /// Parts of the panel painted by one pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Redraw: u8 {
        /// Static frame: box, dividers and labels
        const FRAME = 0b0000_0001;
        const UPTIME = 0b0000_0010;
        const TASKS = 0b0000_0100;
        const TX = 0b0000_1000;
        const RX = 0b0001_0000;
    }
}

/// Whether the static frame has been drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameState {
    Uninitialized,
    Steady,
}

/// Values currently on screen. `None` means the field has never been
/// painted, so the first pass always paints it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    pub frame: FrameState,
    pub last_uptime_seconds: Option<u64>,
    pub last_task_count: Option<u32>,
    pub last_tx: Option<u32>,
    pub last_rx: Option<u32>,
}

impl RenderState {
    pub const fn new() -> Self {
        Self {
            frame: FrameState::Uninitialized,
            last_uptime_seconds: None,
            last_task_count: None,
            last_tx: None,
            last_rx: None,
        }
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

/// Status bar renderer, run from the idle task.
pub struct StatusPanel<'a, C: Canvas> {
    canvas: C,
    registry: &'a TaskRegistry,
    counters: Option<&'a LinkCounters>,
    ticks_per_second: u32,
    state: RenderState,
}

impl<'a, C: Canvas> StatusPanel<'a, C> {
    /// `ticks_per_second` converts the scheduler tick count into uptime.
    pub fn new(canvas: C, registry: &'a TaskRegistry, ticks_per_second: u32) -> Self {
        Self {
            canvas,
            registry,
            counters: None,
            ticks_per_second: ticks_per_second.max(1),
            state: RenderState::new(),
        }
    }

    /// Show `counters` in the TX and RX cells. Without this those cells
    /// keep only their labels.
    pub fn with_counters(mut self, counters: &'a LinkCounters) -> Self {
        self.counters = Some(counters);
        self
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// One idle pass. Returns what was painted.
    pub fn render(&mut self, tick_count: u64) -> Redraw {
        let mut painted = Redraw::empty();

        if self.state.frame == FrameState::Uninitialized {
            self.draw_frame();
            self.state.frame = FrameState::Steady;
            painted |= Redraw::FRAME;
            crate::log_info!("status panel frame drawn");
        }

        let seconds = tick_count / u64::from(self.ticks_per_second);
        if self.state.last_uptime_seconds != Some(seconds) {
            let text = format_uptime(seconds);
            self.canvas.draw_text(UPTIME_COLUMN, VALUE_ROW, &text);
            self.state.last_uptime_seconds = Some(seconds);
            painted |= Redraw::UPTIME;
        }

        let count = self.registry.current_count();
        if self.state.last_task_count != Some(count) {
            let text = format_task_count(count);
            let x = layout::task_count_column(text.width);
            self.canvas.draw_text(x, VALUE_ROW, &text.text);
            self.state.last_task_count = Some(count);
            painted |= Redraw::TASKS;
            crate::log_debug!("task count now {}", count);
        }

        if let Some(counters) = self.counters {
            let link = counters.snapshot();
            if self.state.last_tx != Some(link.tx) {
                self.draw_number(Field::Tx, link.tx);
                self.state.last_tx = Some(link.tx);
                painted |= Redraw::TX;
            }
            if self.state.last_rx != Some(link.rx) {
                self.draw_number(Field::Rx, link.rx);
                self.state.last_rx = Some(link.rx);
                painted |= Redraw::RX;
            }
        }

        painted
    }

    fn draw_frame(&mut self) {
        let canvas = &mut self.canvas;

        canvas.move_cursor(0, BAR_TOP);
        canvas.draw_line_to(BAR_RIGHT, BAR_TOP);
        canvas.draw_line_to(BAR_RIGHT, BAR_BOTTOM);
        canvas.draw_line_to(0, BAR_BOTTOM);
        canvas.draw_line_to(0, BAR_TOP);

        for x in DIVIDERS {
            canvas.move_cursor(x, BAR_TOP);
            canvas.draw_line_to(x, BAR_BOTTOM);
        }

        for label in LABELS {
            canvas.draw_text(label.x, LABEL_ROW, label.text);
        }
    }

    fn draw_number(&mut self, field: Field, value: u32) {
        let Some(origin) = layout::number_origin(field) else {
            return;
        };
        let number = format_number(value);
        let x = layout::number_column(origin, number.width);
        self.canvas.draw_text(x, VALUE_ROW, &number.digits);
    }
}

impl<C: Canvas> IdleHook for StatusPanel<'_, C> {
    fn on_idle(&mut self, tick_count: u64) {
        self.render(tick_count);
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
