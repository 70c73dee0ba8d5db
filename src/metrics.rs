//! Prometheus metrics collection for ts-activity.
//!
//! - `ts_events_total{kind}` - Roster events applied, by kind
//! - `ts_events_malformed_total` - Events dropped at the transport boundary
//! - `ts_notifications_total{result}` - Webhook deliveries
//! - `ts_banner_updates_total{result}` - Banner writes
//! - `ts_resolve_failures_total` - Identity lookups that failed
//! - `ts_roster_size` - Currently tracked voice clients
//!
//! Recording before [`init`] is a no-op, so tests and runs with metrics
//! disabled pay nothing.

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

pub static EVENTS: OnceLock<IntCounterVec> = OnceLock::new();

pub static EVENTS_MALFORMED: OnceLock<IntCounter> = OnceLock::new();

pub static NOTIFICATIONS: OnceLock<IntCounterVec> = OnceLock::new();

pub static BANNER_UPDATES: OnceLock<IntCounterVec> = OnceLock::new();

pub static RESOLVE_FAILURES: OnceLock<IntCounter> = OnceLock::new();

pub static ROSTER_SIZE: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(EVENTS, IntCounterVec::new(Opts::new("ts_events_total", "Roster events applied by kind"), &["kind"]));
    register!(EVENTS_MALFORMED, IntCounter::new("ts_events_malformed_total", "Events dropped for missing or invalid fields"));
    register!(NOTIFICATIONS, IntCounterVec::new(Opts::new("ts_notifications_total", "Presence notifications by result"), &["result"]));
    register!(BANNER_UPDATES, IntCounterVec::new(Opts::new("ts_banner_updates_total", "Banner writes by result"), &["result"]));
    register!(RESOLVE_FAILURES, IntCounter::new("ts_resolve_failures_total", "Failed identity lookups"));
    register!(ROSTER_SIZE, IntGauge::new("ts_roster_size", "Voice clients currently tracked"));
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

#[inline]
pub fn record_event(kind: &str) {
    if let Some(c) = EVENTS.get() {
        c.with_label_values(&[kind]).inc();
    }
}

#[inline]
pub fn record_malformed_event() {
    if let Some(c) = EVENTS_MALFORMED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_notification(result: &str) {
    if let Some(c) = NOTIFICATIONS.get() {
        c.with_label_values(&[result]).inc();
    }
}

#[inline]
pub fn record_banner_update(result: &str) {
    if let Some(c) = BANNER_UPDATES.get() {
        c.with_label_values(&[result]).inc();
    }
}

#[inline]
pub fn record_resolve_failure() {
    if let Some(c) = RESOLVE_FAILURES.get() {
        c.inc();
    }
}

#[inline]
pub fn set_roster_size(size: usize) {
    if let Some(g) = ROSTER_SIZE.get() {
        g.set(size as i64);
    }
}
