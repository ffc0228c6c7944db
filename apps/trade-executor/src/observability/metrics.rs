//! Prometheus exporter and the counters the execution core records.
//!
//! | Metric | Kind | Labels |
//! |--------|------|--------|
//! | `order_submissions_total` | counter | `leg`, `status` |
//! | `order_rejections_total` | counter | `leg` |
//! | `broker_transport_failures_total` | counter | `operation` |
//! | `dual_leg_outcomes_total` | counter | `outcome` |
//! | `read_retries_total` | counter | `operation` |
//! | `lot_size` | histogram | `symbol` |

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

use crate::config::MetricsConfig;

const LOT_SIZE: &str = "lot_size";

/// Why the exporter could not be started.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// The lot histogram buckets were rejected.
    #[error("invalid lot_size buckets: {0}")]
    Buckets(String),
    /// The listener or the global recorder could not be installed.
    #[error("failed to start metrics exporter on {addr}: {message}")]
    Install {
        /// Listen address that was requested.
        addr: SocketAddr,
        /// Exporter message.
        message: String,
    },
}

/// Start the Prometheus exporter, serving `/metrics` on `listen_addr`.
///
/// A disabled config leaves the `metrics` facade without a recorder, which
/// turns every `record_*` call into a no-op.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        tracing::debug!("Metrics exporter disabled");
        return Ok(());
    }

    let builder = PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets_for_metric(Matcher::Full(LOT_SIZE.to_string()), &config.lot_buckets)
        .map_err(|e| MetricsError::Buckets(e.to_string()))?;

    builder.install().map_err(|e| MetricsError::Install {
        addr: config.listen_addr,
        message: e.to_string(),
    })?;

    tracing::info!(addr = %config.listen_addr, "Metrics exporter listening");
    Ok(())
}

/// Count a trade request by leg (`market`, `limit`, `modify`, `close`) and
/// status (`done`, `rejected`, `transport_error`).
pub fn record_order_submission(leg: &str, status: &str) {
    counter!(
        "order_submissions_total",
        "leg" => leg.to_owned(),
        "status" => status.to_owned()
    )
    .increment(1);
}

/// Count a non-success retcode.
pub fn record_order_rejection(leg: &str) {
    counter!("order_rejections_total", "leg" => leg.to_owned()).increment(1);
}

/// Count a broker call that got no reply.
pub fn record_transport_failure(operation: &str) {
    counter!("broker_transport_failures_total", "operation" => operation.to_owned())
        .increment(1);
}

/// Count a finished dual-leg open by its terminal stage.
pub fn record_dual_leg_outcome(outcome: &str) {
    counter!("dual_leg_outcomes_total", "outcome" => outcome.to_owned()).increment(1);
}

/// Count one retry of a read-only call.
pub fn record_read_retry(operation: &str) {
    counter!("read_retries_total", "operation" => operation.to_owned()).increment(1);
}

/// Observe the lot of an accepted order.
pub fn record_lot_size(symbol: &str, lot: f64) {
    histogram!(LOT_SIZE, "symbol" => symbol.to_owned()).record(lot);
}

/// Captures counter registrations on the current thread.
#[cfg(test)]
pub(crate) mod capture {
    use std::sync::Mutex;

    use metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };

    #[derive(Default)]
    struct CounterLog {
        entries: Mutex<Vec<String>>,
    }

    impl Recorder for CounterLog {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            let labels: Vec<String> = key
                .labels()
                .map(|label| format!("{}={}", label.key(), label.value()))
                .collect();
            let entry = format!("{}{{{}}}", key.name(), labels.join(","));
            if let Ok(mut entries) = self.entries.lock() {
                entries.push(entry);
            }
            Counter::noop()
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    /// Run `f` and return every counter it touched as `name{label=value,...}`.
    pub(crate) fn counters<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        let log = CounterLog::default();
        let out = metrics::with_local_recorder(&log, f);
        let entries = log.entries.into_inner().unwrap_or_default();
        (out, entries)
    }
}
