//! Observability module for metrics.
//!
//! Counters are recorded through the `metrics` facade; without an installed
//! recorder every call is a no-op, so the core never depends on the exporter
//! being up.

mod metrics;

pub use self::metrics::{
    MetricsError, init_metrics, record_dual_leg_outcome, record_lot_size,
    record_order_rejection, record_order_submission, record_read_retry,
    record_transport_failure,
};

#[cfg(test)]
pub(crate) use self::metrics::capture;
