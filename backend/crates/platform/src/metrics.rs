//! HTTP Metrics
//!
//! Request counters and latency histogram on an owned prometheus registry,
//! plus the middleware that feeds them.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Content type of the text exposition format
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Process-wide HTTP counters
///
/// Each instance owns its registry, so tests can build as many as they like.
#[derive(Clone)]
pub struct HttpMetrics {
    registry: Registry,
    requests_received: IntCounter,
    responses_sent: IntCounter,
    processing_time: Histogram,
    responses_by_status: IntCounterVec,
}

impl HttpMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_received = IntCounter::new(
            "http_requests_received_total",
            "Total number of HTTP requests received",
        )?;
        let responses_sent = IntCounter::new(
            "http_responses_sent_total",
            "Total number of HTTP responses sent",
        )?;
        let processing_time = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "Time spent processing HTTP requests",
        ))?;
        let responses_by_status = IntCounterVec::new(
            Opts::new(
                "http_responses_sent_by_status_total",
                "Total number of HTTP responses sent, by status code",
            ),
            &["status"],
        )?;

        registry.register(Box::new(requests_received.clone()))?;
        registry.register(Box::new(responses_sent.clone()))?;
        registry.register(Box::new(processing_time.clone()))?;
        registry.register(Box::new(responses_by_status.clone()))?;

        Ok(Self {
            registry,
            requests_received,
            responses_sent,
            processing_time,
            responses_by_status,
        })
    }

    pub fn record_request(&self) {
        self.requests_received.inc();
    }

    pub fn record_response(&self, status: u16, started: Instant) {
        self.responses_sent.inc();
        self.processing_time
            .observe(started.elapsed().as_secs_f64());
        self.responses_by_status
            .with_label_values(&[status.to_string().as_str()])
            .inc();
    }

    pub fn requests_received(&self) -> u64 {
        self.requests_received.get()
    }

    pub fn responses_sent(&self) -> u64 {
        self.responses_sent.get()
    }

    pub fn responses_with_status(&self, status: u16) -> u64 {
        self.responses_by_status
            .with_label_values(&[status.to_string().as_str()])
            .get()
    }

    /// Render every metric in the text exposition format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Counting middleware; passes through untouched when metrics are disabled.
pub async fn track_metrics(
    State(metrics): State<Option<Arc<HttpMetrics>>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(metrics) = metrics else {
        return next.run(req).await;
    };

    let started = Instant::now();
    metrics.record_request();

    let response = next.run(req).await;

    metrics.record_response(response.status().as_u16(), started);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use tower::ServiceExt;

    fn app(metrics: Option<Arc<HttpMetrics>>) -> Router {
        Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
            .layer(from_fn_with_state(metrics, track_metrics))
    }

    #[test]
    fn test_registries_are_independent() {
        let a = HttpMetrics::new().unwrap();
        let b = HttpMetrics::new().unwrap();
        a.record_request();
        assert_eq!(a.requests_received(), 1);
        assert_eq!(b.requests_received(), 0);
    }

    #[tokio::test]
    async fn test_middleware_counts_requests_and_statuses() {
        let metrics = Arc::new(HttpMetrics::new().unwrap());
        let app = app(Some(metrics.clone()));

        for uri in ["/ok", "/ok", "/teapot"] {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            app.clone().oneshot(req).await.unwrap();
        }

        assert_eq!(metrics.requests_received(), 3);
        assert_eq!(metrics.responses_sent(), 3);
        assert_eq!(metrics.responses_with_status(200), 2);
        assert_eq!(metrics.responses_with_status(418), 1);

        let text = metrics.encode().unwrap();
        assert!(text.contains("http_requests_received_total 3"));
        assert!(text.contains("http_request_duration_seconds_count 3"));
    }

    #[tokio::test]
    async fn test_middleware_disabled_passes_through() {
        let req = Request::builder().uri("/ok").body(Body::empty()).unwrap();
        let response = app(None).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
