//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::info;

use crate::app::events::{AppEvent, CycleReport};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// One-line rendering of a cycle report.  `IR` shows the digital pin
/// level, so `0` means an object is present.
pub fn format_cycle(r: &CycleReport) -> String {
    format!(
        "CYCLE | {} | Sonar F:{:.1} L:{:.1} R:{:.1} | IR L:{} R:{} | Analog L:{} R:{} | {}",
        r.state.label(),
        r.sonar.front,
        r.sonar.left,
        r.sonar.right,
        u8::from(!r.proximity.left_blocked),
        u8::from(!r.proximity.right_blocked),
        r.proximity.left_analog,
        r.proximity.right_analog,
        r.branch,
    )
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Cycle(r) => {
                info!("{}", format_cycle(r));
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from.label(), to.label());
            }
            AppEvent::GrabCompleted { ignore_ir_until_ms } => {
                info!("GRAB | object secured, IR ignored until {} ms", ignore_ir_until_ms);
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state.label());
            }
        }
    }
}
