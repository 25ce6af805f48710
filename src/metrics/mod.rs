//! Metrics collection for observability

use crate::answering::AnswerSource;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_histogram_with_registry, CounterVec, Histogram, HistogramVec, Opts, Registry,
};
use serde::Serialize;
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Run endpoint metrics
    pub run_requests: CounterVec,
    pub run_request_duration: HistogramVec,

    // Answer metrics
    pub answers: CounterVec,
    pub rule_hits: CounterVec,

    // Document metrics
    pub document_loads: CounterVec,
    pub document_load_duration: Histogram,
}

/// Counter snapshot served by the stats endpoint
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub failed_requests: u64,
    pub total_questions: u64,
    pub rule_answers: u64,
    pub ranked_answers: u64,
    pub not_found_answers: u64,
    pub failed_answers: u64,
    pub documents_loaded: u64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        let run_requests = register_counter_vec_with_registry!(
            Opts::new("policy_qa_run_requests_total", "Total run requests"),
            &["status"],
            registry
        )?;

        let run_request_duration = register_histogram_vec_with_registry!(
            "policy_qa_run_request_duration_seconds",
            "Run request duration in seconds",
            &["status"],
            registry
        )?;

        let answers = register_counter_vec_with_registry!(
            Opts::new("policy_qa_answers_total", "Answers produced by source"),
            &["source"],
            registry
        )?;

        let rule_hits = register_counter_vec_with_registry!(
            Opts::new("policy_qa_rule_hits_total", "Rule matches by category"),
            &["category"],
            registry
        )?;

        let document_loads = register_counter_vec_with_registry!(
            Opts::new("policy_qa_document_loads_total", "Document loads by outcome"),
            &["status"],
            registry
        )?;

        let document_load_duration = register_histogram_with_registry!(
            "policy_qa_document_load_duration_seconds",
            "Document download and extraction duration in seconds",
            registry
        )?;

        Ok(Self {
            registry,
            run_requests,
            run_request_duration,
            answers,
            rule_hits,
            document_loads,
            document_load_duration,
        })
    }

    /// Record a completed run request
    pub fn record_run(&self, success: bool, seconds: f64) {
        let status = if success { "success" } else { "error" };
        self.run_requests.with_label_values(&[status]).inc();
        self.run_request_duration
            .with_label_values(&[status])
            .observe(seconds);
    }

    /// Record one answered question
    pub fn record_answer(&self, source: AnswerSource) {
        self.answers.with_label_values(&[source.as_str()]).inc();
        if let AnswerSource::Rule(category) = source {
            self.rule_hits.with_label_values(&[category.as_str()]).inc();
        }
    }

    /// Record a document load attempt
    pub fn record_document_load(&self, success: bool, seconds: f64) {
        let status = if success { "success" } else { "error" };
        self.document_loads.with_label_values(&[status]).inc();
        self.document_load_duration.observe(seconds);
    }

    /// Current counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        let count = |vec: &CounterVec, label: &str| vec.with_label_values(&[label]).get() as u64;

        let success = count(&self.run_requests, "success");
        let failed = count(&self.run_requests, "error");
        let rule = count(&self.answers, "rule");
        let ranked = count(&self.answers, "ranked");
        let not_found = count(&self.answers, "not_found");
        let failed_answers = count(&self.answers, "failed");

        StatsSnapshot {
            total_requests: success + failed,
            failed_requests: failed,
            total_questions: rule + ranked + not_found + failed_answers,
            rule_answers: rule,
            ranked_answers: ranked,
            not_found_answers: not_found,
            failed_answers,
            documents_loaded: count(&self.document_loads, "success"),
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
