// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for the ledger
// ============================================================================
//
// Covers:
// - Orders placed per payment method
// - Status transitions and refused commands
// - Points moved in and out of balances, units shipped out of stock
// - Storage conflicts and command latency
//
// All metrics are registered with one registry and scraped via /metrics
// ============================================================================

/// Central metrics registry for the ledger
pub struct Metrics {
    registry: Registry,

    // Order Metrics
    pub orders_placed: IntCounterVec,
    pub order_transitions: IntCounterVec,
    pub rejections: IntCounterVec,

    // Balance and Stock Metrics
    pub points_debited: IntCounter,
    pub points_refunded: IntCounter,
    pub units_delivered: IntCounter,

    // Storage Metrics
    pub storage_conflicts: IntCounter,
    pub command_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_placed = IntCounterVec::new(
            Opts::new("ledger_orders_placed_total", "Orders created at checkout"),
            &["method"],
        )?;
        registry.register(Box::new(orders_placed.clone()))?;

        let order_transitions = IntCounterVec::new(
            Opts::new("ledger_order_transitions_total", "Committed order status changes"),
            &["status"],
        )?;
        registry.register(Box::new(order_transitions.clone()))?;

        let rejections = IntCounterVec::new(
            Opts::new("ledger_rejections_total", "Ledger commands refused, by error kind"),
            &["kind"],
        )?;
        registry.register(Box::new(rejections.clone()))?;

        let points_debited = IntCounter::new(
            "ledger_points_debited_total",
            "Points debited from balances at checkout",
        )?;
        registry.register(Box::new(points_debited.clone()))?;

        let points_refunded = IntCounter::new(
            "ledger_points_refunded_total",
            "Points credited back on cancellation",
        )?;
        registry.register(Box::new(points_refunded.clone()))?;

        let units_delivered = IntCounter::new(
            "ledger_units_delivered_total",
            "Stock units decremented by deliveries",
        )?;
        registry.register(Box::new(units_delivered.clone()))?;

        let storage_conflicts = IntCounter::new(
            "ledger_storage_conflicts_total",
            "Change sets rejected by optimistic concurrency",
        )?;
        registry.register(Box::new(storage_conflicts.clone()))?;

        let command_duration = HistogramVec::new(
            HistogramOpts::new("ledger_command_duration_seconds", "Ledger command duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["command"],
        )?;
        registry.register(Box::new(command_duration.clone()))?;

        Ok(Self {
            registry,
            orders_placed,
            order_transitions,
            rejections,
            points_debited,
            points_refunded,
            units_delivered,
            storage_conflicts,
            command_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_placed(&self, method: &str) {
        self.orders_placed.with_label_values(&[method]).inc();
    }

    pub fn record_transition(&self, status: &str) {
        self.order_transitions.with_label_values(&[status]).inc();
    }

    pub fn record_rejection(&self, kind: &str) {
        self.rejections.with_label_values(&[kind]).inc();
    }

    pub fn record_points_debited(&self, points: u64) {
        self.points_debited.inc_by(points);
    }

    pub fn record_points_refunded(&self, points: u64) {
        self.points_refunded.inc_by(points);
    }

    pub fn record_units_delivered(&self, units: u32) {
        self.units_delivered.inc_by(u64::from(units));
    }

    pub fn record_storage_conflict(&self) {
        self.storage_conflicts.inc();
    }

    pub fn observe_command(&self, command: &str, duration_secs: f64) {
        self.command_duration.with_label_values(&[command]).observe(duration_secs);
    }
}
