//! Console event sink adapter.
//!
//! Implements [`EventSink`] by printing each reading to standard output in
//! the field-tested line format, and routing lifecycle and stats events to
//! the logger (UART / USB-CDC in production, stderr on the host).

use core::fmt::Write;

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Longest report line: the error prefix plus a pin fault message.
pub type ReportLine = heapless::String<160>;

/// Format a per-cycle report line.  `None` for events that are not
/// per-cycle readings.
pub fn report_line(event: &AppEvent) -> Option<ReportLine> {
    let mut line = ReportLine::new();
    let written = match event {
        AppEvent::Reading { distance_cm } => {
            write!(line, "Distance to water surface: {:.2} cm", distance_cm)
        }
        AppEvent::MeasurementFailed(e) => write!(line, "Error measuring distance: {}", e),
        AppEvent::Started | AppEvent::Stats(_) => return None,
    };
    if written.is_err() {
        warn!("report line truncated");
    }
    Some(line)
}

/// Adapter that prints readings to stdout.
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: &AppEvent) {
        if let Some(line) = report_line(event) {
            println!("{}", line);
            return;
        }
        match event {
            AppEvent::Started => info!("START | sampling"),
            AppEvent::Stats(stats) => stats.log_summary(),
            AppEvent::Reading { .. } | AppEvent::MeasurementFailed(_) => {}
        }
    }
}
