use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vibes_core::IntentSource;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    keyword_intents_total: AtomicU64,
    classifier_intents_total: AtomicU64,
    default_intents_total: AtomicU64,
    candidates_total: AtomicU64,
    recommendations_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub keyword_intents_total: u64,
    pub classifier_intents_total: u64,
    pub default_intents_total: u64,
    pub candidates_total: u64,
    pub recommendations_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_intent(&self, source: IntentSource) {
        let counter = match source {
            IntentSource::Keyword => &self.keyword_intents_total,
            IntentSource::Classifier => &self.classifier_intents_total,
            IntentSource::Default => &self.default_intents_total,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_candidates(&self, count: usize) {
        self.candidates_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn add_recommendations(&self, count: usize) {
        self.recommendations_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            keyword_intents_total: self.keyword_intents_total.load(Ordering::Relaxed),
            classifier_intents_total: self.classifier_intents_total.load(Ordering::Relaxed),
            default_intents_total: self.default_intents_total.load(Ordering::Relaxed),
            candidates_total: self.candidates_total.load(Ordering::Relaxed),
            recommendations_total: self.recommendations_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,vibes_agents=info,vibes_places=info,vibes_intent=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
