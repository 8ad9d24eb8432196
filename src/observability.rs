use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: bookings created.
pub const BOOKINGS_CREATED_TOTAL: &str = "innkeep_bookings_created_total";

/// Counter: bookings cancelled.
pub const BOOKINGS_CANCELLED_TOTAL: &str = "innkeep_bookings_cancelled_total";

/// Counter: bookings hard-deleted.
pub const BOOKINGS_DELETED_TOTAL: &str = "innkeep_bookings_deleted_total";

/// Counter: create/update attempts rejected because the room was taken.
pub const BOOKING_CONFLICTS_TOTAL: &str = "innkeep_booking_conflicts_total";

/// Counter: availability checks served.
pub const AVAILABILITY_CHECKS_TOTAL: &str = "innkeep_availability_checks_total";

// ── Concurrency-control metrics ─────────────────────────────────

/// Counter: store overlap constraint hits that triggered the one-shot
/// re-check-and-retry path.
pub const STORE_CONFLICT_RETRIES_TOTAL: &str = "innkeep_store_conflict_retries_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
