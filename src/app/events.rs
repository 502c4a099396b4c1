//! Outbound application events.
//!
//! The [`MeasurementService`](super::service::MeasurementService) emits
//! these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them.

use crate::diagnostics::MeasurementStats;
use crate::error::MeasureError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service is ready; the trigger line has been driven low.
    Started,

    /// A cycle produced a distance (centimetres).
    Reading { distance_cm: f64 },

    /// A cycle ended in a classified failure.
    MeasurementFailed(MeasureError),

    /// Periodic counters summary.
    Stats(MeasurementStats),
}
