//! # idlestat Demo Firmware
//!
//! Brings up the kernel with three small tasks and the status panel as the
//! idle hook:
//!
//! | Task | Priority | Behavior |
//! |------|----------|----------|
//! | `heartbeat_task` | 2 | Counts one TX per second, forever |
//! | `listener_task` | 2 | Counts one RX every 3 s, forever |
//! | `transient_task` | 1 | Lives 10 s, then exits |
//!
//! The task count on the panel starts at 3 and drops to 2 once the
//! transient task exits. The display driver is outside this crate;
//! [`TraceCanvas`] forwards every draw call to the log instead.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use cortex_m_rt::entry;
    use panic_halt as _;
    use static_cell::StaticCell;

    #[cfg(feature = "defmt")]
    use defmt_rtt as _;

    use idlestat::config::TICK_HZ;
    use idlestat::counters::LinkCounters;
    use idlestat::display::Canvas;
    use idlestat::kernel;
    use idlestat::panel::StatusPanel;
    use idlestat::registry::TaskRegistry;
    use idlestat::task::TaskConfig;

    static REGISTRY: TaskRegistry = TaskRegistry::new();
    static LINK: LinkCounters = LinkCounters::new();
    static PANEL: StaticCell<StatusPanel<'static, TraceCanvas>> = StaticCell::new();

    /// Stand-in for a display driver: logs each primitive.
    pub struct TraceCanvas;

    impl Canvas for TraceCanvas {
        fn move_cursor(&mut self, x: u16, y: u16) {
            idlestat::log_debug!("move {} {}", x, y);
        }

        fn draw_line_to(&mut self, x: u16, y: u16) {
            idlestat::log_debug!("line {} {}", x, y);
        }

        fn draw_text(&mut self, x: u16, y: u16, text: &str) {
            idlestat::log_info!("text {} {} {}", x, y, text);
        }
    }

    // -----------------------------------------------------------------------
    // Task entry points
    // -----------------------------------------------------------------------

    extern "C" fn heartbeat_task() -> ! {
        loop {
            LINK.record_tx(1);
            kernel::sleep(TICK_HZ);
        }
    }

    extern "C" fn listener_task() -> ! {
        loop {
            kernel::sleep(3 * TICK_HZ);
            LINK.record_rx(1);
        }
    }

    extern "C" fn transient_task() -> ! {
        kernel::sleep(10 * TICK_HZ);
        kernel::exit()
    }

    // -----------------------------------------------------------------------
    // Main entry point
    // -----------------------------------------------------------------------

    #[entry]
    fn main() -> ! {
        let cp = cortex_m::Peripherals::take().unwrap();

        kernel::init(&REGISTRY);

        let tasks: [(extern "C" fn() -> !, u8); 3] = [
            (heartbeat_task, 2),
            (listener_task, 2),
            (transient_task, 1),
        ];
        for (entry, priority) in tasks {
            if let Err(err) = kernel::spawn(entry, TaskConfig { priority, time_slice: 10 }) {
                idlestat::log_warn!("spawn failed: {}", err);
            }
        }

        let panel = PANEL.init(StatusPanel::new(TraceCanvas, &REGISTRY, TICK_HZ).with_counters(&LINK));

        kernel::start(cp, panel)
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
