//! # Link Counters
//!
//! Running TX/RX totals for the two telemetry cells of the status bar.
//! Producers bump them from any context; the status panel reads them on
//! its idle pass. Totals only grow and stop at `u32::MAX`.

use core::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug)]
pub struct LinkCounters {
    tx: AtomicU32,
    rx: AtomicU32,
}

/// Point-in-time copy of both totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkSnapshot {
    pub tx: u32,
    pub rx: u32,
}

impl LinkCounters {
    pub const fn new() -> Self {
        Self {
            tx: AtomicU32::new(0),
            rx: AtomicU32::new(0),
        }
    }

    pub fn record_tx(&self, count: u32) {
        saturating_add(&self.tx, count);
    }

    pub fn record_rx(&self, count: u32) {
        saturating_add(&self.rx, count);
    }

    pub fn snapshot(&self) -> LinkSnapshot {
        LinkSnapshot {
            tx: self.tx.load(Ordering::Acquire),
            rx: self.rx.load(Ordering::Acquire),
        }
    }
}

impl Default for LinkCounters {
    fn default() -> Self {
        Self::new()
    }
}

fn saturating_add(counter: &AtomicU32, count: u32) {
    // The closure always returns Some, so this cannot fail
    let _ = counter.fetch_update(Ordering::AcqRel, Ordering::Acquire, |value| {
        Some(value.saturating_add(count))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_accumulate() {
        let counters = LinkCounters::new();
        counters.record_tx(3);
        counters.record_tx(4);
        counters.record_rx(1);

        assert_eq!(counters.snapshot(), LinkSnapshot { tx: 7, rx: 1 });
    }

    #[test]
    fn test_totals_saturate() {
        let counters = LinkCounters::new();
        counters.record_rx(u32::MAX - 1);
        counters.record_rx(5);

        assert_eq!(counters.snapshot().rx, u32::MAX);
    }
}
