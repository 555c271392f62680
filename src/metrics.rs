//! Metrics collection and export module

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Instant;

/// Global metrics registry
pub struct Metrics {
    registry: Registry,

    // Counters
    pub transactions_built: IntCounter,
    pub transactions_submitted: IntCounter,
    pub transactions_confirmed: IntCounter,
    pub transactions_failed: IntCounterVec,
    pub underfunded_creations: IntCounter,

    // Histograms
    pub build_latency: Histogram,
    pub confirmation_latency: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let transactions_built = IntCounter::with_opts(Opts::new(
            "txkit_transactions_built_total",
            "Number of transactions assembled",
        ))?;

        let transactions_submitted = IntCounter::with_opts(Opts::new(
            "txkit_transactions_submitted_total",
            "Number of transactions handed to the ledger",
        ))?;

        let transactions_confirmed = IntCounter::with_opts(Opts::new(
            "txkit_transactions_confirmed_total",
            "Number of transactions that reached the target commitment",
        ))?;

        let transactions_failed = IntCounterVec::new(
            Opts::new(
                "txkit_transactions_failed_total",
                "Number of failed submissions by error category",
            ),
            &["category"],
        )?;

        let underfunded_creations = IntCounter::with_opts(Opts::new(
            "txkit_underfunded_creations_total",
            "Account creations funded below the rent-exempt minimum",
        ))?;

        let build_latency = Histogram::with_opts(
            HistogramOpts::new("txkit_build_latency_seconds", "Transaction build latency")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;

        let confirmation_latency = Histogram::with_opts(
            HistogramOpts::new(
                "txkit_confirmation_latency_seconds",
                "Time from submission to target commitment",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        )?;

        // Register all metrics
        registry.register(Box::new(transactions_built.clone()))?;
        registry.register(Box::new(transactions_submitted.clone()))?;
        registry.register(Box::new(transactions_confirmed.clone()))?;
        registry.register(Box::new(transactions_failed.clone()))?;
        registry.register(Box::new(underfunded_creations.clone()))?;
        registry.register(Box::new(build_latency.clone()))?;
        registry.register(Box::new(confirmation_latency.clone()))?;

        Ok(Self {
            registry,
            transactions_built,
            transactions_submitted,
            transactions_confirmed,
            transactions_failed,
            underfunded_creations,
            build_latency,
            confirmation_latency,
        })
    }

    /// Get the registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Count a failed submission under its error category
    pub fn record_failure(&self, category: &str) {
        self.transactions_failed.with_label_values(&[category]).inc();
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}

/// Global metrics instance
pub fn metrics() -> &'static Metrics {
    static METRICS: once_cell::sync::Lazy<Metrics> =
        once_cell::sync::Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
    &METRICS
}

/// Timer helper for measuring operation duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn observe_duration(&self, histogram: &Histogram) {
        histogram.observe(self.elapsed_secs());
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
