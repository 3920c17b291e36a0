use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::services::analytics_service;

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);

pub fn increment_request_count() {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn request_count() -> u64 {
    REQUEST_COUNT.load(Ordering::Relaxed)
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MetricsResponse {
    pub http_requests_total: u64,
    pub analytics_runs_total: u64,
    pub analytics_failures_total: u64,
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus text exposition of request and aggregation counters")
    )
)]
pub async fn get_metrics() -> HttpResponse {
    let (runs, failures) = analytics_service::run_counters();

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(render(&MetricsResponse {
            http_requests_total: request_count(),
            analytics_runs_total: runs,
            analytics_failures_total: failures,
        }))
}

fn render(metrics: &MetricsResponse) -> String {
    format!(
        "# HELP http_requests_total Total number of HTTP requests\n\
         # TYPE http_requests_total counter\n\
         http_requests_total {}\n\
         \n\
         # HELP analytics_runs_total Total number of aggregation runs started\n\
         # TYPE analytics_runs_total counter\n\
         analytics_runs_total {}\n\
         \n\
         # HELP analytics_failures_total Total number of aggregation runs that failed\n\
         # TYPE analytics_failures_total counter\n\
         analytics_failures_total {}\n",
        metrics.http_requests_total, metrics.analytics_runs_total, metrics.analytics_failures_total
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_exposition() {
        let text = render(&MetricsResponse {
            http_requests_total: 40,
            analytics_runs_total: 12,
            analytics_failures_total: 1,
        });

        assert!(text.contains("http_requests_total 40\n"));
        assert!(text.contains("analytics_runs_total 12\n"));
        assert!(text.contains("analytics_failures_total 1\n"));
        assert!(text.contains("# TYPE analytics_failures_total counter"));
    }
}
