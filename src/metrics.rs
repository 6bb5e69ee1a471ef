//! Prometheus metrics collection for parlor.
//!
//! Exposed on an HTTP endpoint (see [`crate::http`]). Tracks request volume,
//! delivery throughput, rate limiting and storage health.
//!
//! - `parlor_requests_total{target}` - Requests processed by target
//! - `parlor_request_duration_seconds{target}` - Request latency histogram
//! - `parlor_registered_sessions` - Sessions in the registry (gauge)
//! - `parlor_broadcast_fanout` - Recipients per broadcast (histogram)

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::{Once, OnceLock};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Lines successfully queued to a session.
pub static MESSAGES_DELIVERED: OnceLock<IntCounter> = OnceLock::new();

/// Broadcasts refused because the sender hit the per-period limit.
pub static RATE_LIMITED: OnceLock<IntCounter> = OnceLock::new();

/// Accepted client connections.
pub static CONNECTIONS_ACCEPTED: OnceLock<IntCounter> = OnceLock::new();

/// Requests processed by target.
pub static REQUEST_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Request errors by target and error kind.
pub static REQUEST_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Storage failures by operation.
pub static STORAGE_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

/// Sessions currently registered.
pub static REGISTERED_SESSIONS: OnceLock<IntGauge> = OnceLock::new();

/// Request processing latency by target.
pub static REQUEST_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Recipients per broadcast or join announcement.
pub static BROADCAST_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup. Repeat calls are no-ops.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(register_all);
}

fn register_all() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(MESSAGES_DELIVERED, IntCounter::new("parlor_messages_delivered_total", "Lines queued to sessions"));
    register!(RATE_LIMITED, IntCounter::new("parlor_rate_limited_total", "Broadcasts refused by the message limit"));
    register!(CONNECTIONS_ACCEPTED, IntCounter::new("parlor_connections_accepted_total", "Accepted client connections"));
    register!(REQUEST_COUNTER, IntCounterVec::new(Opts::new("parlor_requests_total", "Requests processed by target"), &["target"]));
    register!(REQUEST_ERRORS, IntCounterVec::new(Opts::new("parlor_request_errors_total", "Request errors by target"), &["target", "error"]));
    register!(STORAGE_ERRORS, IntCounterVec::new(Opts::new("parlor_storage_errors_total", "Storage failures by operation"), &["op"]));
    register!(REGISTERED_SESSIONS, IntGauge::new("parlor_registered_sessions", "Sessions in the registry"));
    register!(REQUEST_LATENCY, HistogramVec::new(
        HistogramOpts::new("parlor_request_duration_seconds", "Request latency by target")
            .buckets(vec![0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        &["target"]));
    register!(BROADCAST_FANOUT, Histogram::with_opts(
        HistogramOpts::new("parlor_broadcast_fanout", "Recipients per broadcast")
            .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Update helpers. All are no-ops until `init` has run.
// ============================================================================

/// Record a processed request with its latency.
#[inline]
pub fn record_request(target: &str, duration_secs: f64) {
    if let Some(c) = REQUEST_COUNTER.get() {
        c.with_label_values(&[target]).inc();
    }
    if let Some(h) = REQUEST_LATENCY.get() {
        h.with_label_values(&[target]).observe(duration_secs);
    }
}

/// Record a request that ended in an error.
#[inline]
pub fn record_request_error(target: &str, error: &str) {
    if let Some(c) = REQUEST_ERRORS.get() {
        c.with_label_values(&[target, error]).inc();
    }
}

/// Record a failed storage operation.
#[inline]
pub fn record_storage_error(op: &str) {
    if let Some(c) = STORAGE_ERRORS.get() {
        c.with_label_values(&[op]).inc();
    }
}

#[inline]
pub fn record_delivered() {
    if let Some(c) = MESSAGES_DELIVERED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_rate_limited() {
    if let Some(c) = RATE_LIMITED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_connection() {
    if let Some(c) = CONNECTIONS_ACCEPTED.get() {
        c.inc();
    }
}

/// Set the registered-sessions gauge.
#[inline]
pub fn set_registered_sessions(count: usize) {
    if let Some(g) = REGISTERED_SESSIONS.get() {
        g.set(i64::try_from(count).unwrap_or(i64::MAX));
    }
}

/// Record how many sessions one fan-out reached.
#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(h) = BROADCAST_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();
        init();

        record_request("all", 0.001);
        record_storage_error("fetch_user");
        set_registered_sessions(3);

        let output = gather_metrics();
        assert!(output.contains("parlor_requests_total"));
        assert!(output.contains("parlor_storage_errors_total"));
        assert!(output.contains("parlor_registered_sessions"));
    }
}
