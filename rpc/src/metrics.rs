//! Prometheus metrics for the verification server.
//!
//! [`ServiceMetrics`] owns a dedicated [`Registry`] that the `/metrics`
//! endpoint encodes into the Prometheus text exposition format.

use std::time::Duration;

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry, Encoder,
    Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::RpcError;

/// Every outcome label, so all series exist from the first scrape.
pub const OUTCOMES: [&str; 6] = [
    "found",
    "not_found",
    "invalid_request",
    "unauthenticated",
    "storage_unavailable",
    "internal",
];

pub struct ServiceMetrics {
    pub registry: Registry,

    /// Verification requests by outcome.
    pub verifications: IntCounterVec,

    /// End-to-end handling time of a verification request, in seconds.
    pub verification_duration: Histogram,
}

impl ServiceMetrics {
    pub fn new() -> Result<Self, RpcError> {
        let registry = Registry::new();

        let verifications = register_int_counter_vec_with_registry!(
            Opts::new(
                "proshow_verifications_total",
                "Verification requests by outcome"
            ),
            &["outcome"],
            registry
        )?;
        for outcome in OUTCOMES {
            verifications.with_label_values(&[outcome]);
        }

        // Argon2 dominates, so buckets span 1 ms to ~4 s.
        let verification_duration = register_histogram_with_registry!(
            HistogramOpts::new(
                "proshow_verification_duration_seconds",
                "Verification request handling time in seconds"
            )
            .buckets(prometheus::exponential_buckets(0.001, 2.0, 13)?),
            registry
        )?;

        Ok(Self {
            registry,
            verifications,
            verification_duration,
        })
    }

    pub fn record(&self, outcome: &str, elapsed: Duration) {
        self.verifications.with_label_values(&[outcome]).inc();
        self.verification_duration.observe(elapsed.as_secs_f64());
    }

    /// Count an outcome whose duration is unknown, e.g. a request that panicked.
    pub fn record_unfinished(&self, outcome: &str) {
        self.verifications.with_label_values(&[outcome]).inc();
    }

    /// Text exposition of everything in the registry.
    pub fn encode(&self) -> Result<String, RpcError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| RpcError::Server(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_outcome_series_start_at_zero() {
        let metrics = ServiceMetrics::new().unwrap();
        let text = metrics.encode().unwrap();
        for outcome in OUTCOMES {
            assert!(
                text.contains(&format!("proshow_verifications_total{{outcome=\"{outcome}\"}} 0")),
                "missing series for {outcome}"
            );
        }
    }

    #[test]
    fn record_counts_and_times() {
        let metrics = ServiceMetrics::new().unwrap();
        metrics.record("found", Duration::from_millis(20));
        metrics.record("found", Duration::from_millis(30));
        metrics.record("not_found", Duration::from_millis(5));

        assert_eq!(metrics.verifications.with_label_values(&["found"]).get(), 2);
        assert_eq!(metrics.verifications.with_label_values(&["not_found"]).get(), 1);
        assert_eq!(metrics.verification_duration.get_sample_count(), 3);

        let text = metrics.encode().unwrap();
        assert!(text.contains("proshow_verification_duration_seconds_count 3"));
    }

    #[test]
    fn unfinished_requests_count_without_timing() {
        let metrics = ServiceMetrics::new().unwrap();
        metrics.record_unfinished("internal");
        assert_eq!(metrics.verifications.with_label_values(&["internal"]).get(), 1);
        assert_eq!(metrics.verification_duration.get_sample_count(), 0);
    }
}
