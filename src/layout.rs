//! # Status Bar Layout
//!
//! Geometry of the status bar along the bottom of a 320×240 display.
//! All positions are pixel coordinates; rendering code looks them up here
//! instead of branching on widths inline.
//!
//! ```text
//!  y=220 ┌────────┬─────┬────────────┬──────┬──────┐
//!        │ Uptime │Tasks│ IP Address │  TX  │  RX  │  labels  y=222
//!        │HH:MM:SS│  n  │            │  nnn │  nnn │  values  y=230
//!  y=239 └────────┴─────┴────────────┴──────┴──────┘
//!        0       64    110          215    267    319
//! ```

use crate::format::{TaskCountWidth, MAX_DIGITS};

pub const SCREEN_WIDTH: u16 = 320;
pub const SCREEN_HEIGHT: u16 = 240;
pub const STATUS_BAR_HEIGHT: u16 = 20;

/// Top edge of the status bar.
pub const BAR_TOP: u16 = SCREEN_HEIGHT - STATUS_BAR_HEIGHT;
/// Bottom edge of the status bar.
pub const BAR_BOTTOM: u16 = SCREEN_HEIGHT - 1;
pub const BAR_RIGHT: u16 = SCREEN_WIDTH - 1;

/// Baseline row of the field titles.
pub const LABEL_ROW: u16 = SCREEN_HEIGHT - 18;
/// Baseline row of the field values.
pub const VALUE_ROW: u16 = SCREEN_HEIGHT - 10;

/// x positions of the vertical dividers between the five cells.
pub const DIVIDERS: [u16; 4] = [64, 110, 215, 267];

/// Cells of the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Uptime,
    Tasks,
    IpAddress,
    Tx,
    Rx,
}

/// A static field title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub field: Field,
    pub x: u16,
    pub text: &'static str,
}

pub const LABELS: [Label; 5] = [
    Label { field: Field::Uptime, x: 14, text: "Uptime" },
    Label { field: Field::Tasks, x: 72, text: "Tasks" },
    Label { field: Field::IpAddress, x: 133, text: "IP Address" },
    Label { field: Field::Tx, x: 235, text: "TX" },
    Label { field: Field::Rx, x: 287, text: "RX" },
];

/// Column of the `HH:MM:SS` uptime text.
pub const UPTIME_COLUMN: u16 = 8;

/// Task-count columns, keyed by width class.
pub const TASK_COUNT_COLUMNS: [(TaskCountWidth, u16); 2] = [
    (TaskCountWidth::Single, 78),
    (TaskCountWidth::Double, 81),
];

/// Offset from a field's number origin for each digit count 1..=6, so
/// numbers of every width line up on the same column of the cell.
pub const NUMBER_OFFSETS: [u16; MAX_DIGITS] = [15, 12, 9, 6, 3, 0];

/// Origin (six-digit column) of the numeric fields.
pub const NUMBER_ORIGINS: [(Field, u16); 2] = [(Field::Tx, 223), (Field::Rx, 275)];

/// Column for a task count of the given width class.
pub fn task_count_column(width: TaskCountWidth) -> u16 {
    TASK_COUNT_COLUMNS
        .iter()
        .find(|(w, _)| *w == width)
        .map_or(TASK_COUNT_COLUMNS[0].1, |&(_, x)| x)
}

/// Column at which a number `width` digits wide starts within a field
/// whose six-digit origin is `origin`. Widths outside 1..=6 are clamped.
pub fn number_column(origin: u16, width: usize) -> u16 {
    let index = width.clamp(1, MAX_DIGITS) - 1;
    origin + NUMBER_OFFSETS[index]
}

/// Six-digit origin of a numeric field, if the field holds a number.
pub fn number_origin(field: Field) -> Option<u16> {
    NUMBER_ORIGINS
        .iter()
        .find(|(f, _)| *f == field)
        .map(|&(_, x)| x)
}
