//! Metrics collection for chirp.
//!
//! In-process counters for request traffic and engagement activity, exported
//! in Prometheus text format.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Global metrics instance.
static METRICS: std::sync::OnceLock<Arc<Metrics>> = std::sync::OnceLock::new();

/// Get the global metrics instance.
pub fn get_metrics() -> &'static Arc<Metrics> {
    METRICS.get_or_init(|| Arc::new(Metrics::new()))
}

/// Application metrics collector.
#[derive(Debug)]
pub struct Metrics {
    // === Request Metrics ===
    /// Total HTTP requests received
    pub http_requests_total: AtomicU64,
    /// HTTP requests by status code category (2xx, 4xx, 5xx)
    pub http_requests_2xx: AtomicU64,
    pub http_requests_4xx: AtomicU64,
    pub http_requests_5xx: AtomicU64,
    /// Total request latency in microseconds
    pub http_request_latency_us_total: AtomicU64,

    // === Content Metrics ===
    pub users_registered: AtomicU64,
    pub tweets_created: AtomicU64,
    pub tweets_deleted: AtomicU64,

    // === Engagement Metrics ===
    pub likes_created: AtomicU64,
    pub likes_removed: AtomicU64,
    pub retweets_created: AtomicU64,
    pub retweets_removed: AtomicU64,
    pub follows_created: AtomicU64,
    pub follows_removed: AtomicU64,

    // === Notification Metrics ===
    pub notifications_created: AtomicU64,
    /// Creations that failed and were skipped
    pub notification_create_failures: AtomicU64,
    pub notifications_retracted: AtomicU64,
    /// Retractions that failed and were skipped
    pub notification_retraction_failures: AtomicU64,
}

impl Metrics {
    /// Create a new metrics instance with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            http_requests_total: AtomicU64::new(0),
            http_requests_2xx: AtomicU64::new(0),
            http_requests_4xx: AtomicU64::new(0),
            http_requests_5xx: AtomicU64::new(0),
            http_request_latency_us_total: AtomicU64::new(0),

            users_registered: AtomicU64::new(0),
            tweets_created: AtomicU64::new(0),
            tweets_deleted: AtomicU64::new(0),

            likes_created: AtomicU64::new(0),
            likes_removed: AtomicU64::new(0),
            retweets_created: AtomicU64::new(0),
            retweets_removed: AtomicU64::new(0),
            follows_created: AtomicU64::new(0),
            follows_removed: AtomicU64::new(0),

            notifications_created: AtomicU64::new(0),
            notifications_retracted: AtomicU64::new(0),
            notification_retraction_failures: AtomicU64::new(0),
            notification_create_failures: AtomicU64::new(0),
        }
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, status_code: u16, latency: Duration) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);

        match status_code {
            200..=299 => self.http_requests_2xx.fetch_add(1, Ordering::Relaxed),
            400..=499 => self.http_requests_4xx.fetch_add(1, Ordering::Relaxed),
            500..=599 => self.http_requests_5xx.fetch_add(1, Ordering::Relaxed),
            _ => 0,
        };

        self.http_request_latency_us_total
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
    }

    /// Bump a counter by one.
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Bump a counter by `n`.
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        let total = load(&self.http_requests_total);

        MetricsSnapshot {
            http_requests_total: total,
            http_requests_2xx: load(&self.http_requests_2xx),
            http_requests_4xx: load(&self.http_requests_4xx),
            http_requests_5xx: load(&self.http_requests_5xx),
            http_request_latency_avg_us: if total > 0 {
                load(&self.http_request_latency_us_total) / total
            } else {
                0
            },
            users_registered: load(&self.users_registered),
            tweets_created: load(&self.tweets_created),
            tweets_deleted: load(&self.tweets_deleted),
            likes_created: load(&self.likes_created),
            likes_removed: load(&self.likes_removed),
            retweets_created: load(&self.retweets_created),
            retweets_removed: load(&self.retweets_removed),
            follows_created: load(&self.follows_created),
            follows_removed: load(&self.follows_removed),
            notifications_created: load(&self.notifications_created),
            notifications_retracted: load(&self.notifications_retracted),
            notification_retraction_failures: load(&self.notification_retraction_failures),
            notification_create_failures: load(&self.notification_create_failures),
        }
    }

    /// Export metrics in Prometheus format.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let s = self.snapshot();
        let mut output = String::new();

        let mut metric = |name: &str, kind: &str, help: &str, value: u64| {
            output.push_str(&format!("# HELP chirp_{name} {help}\n"));
            output.push_str(&format!("# TYPE chirp_{name} {kind}\n"));
            output.push_str(&format!("chirp_{name} {value}\n"));
        };

        metric("http_requests_total", "counter", "Total HTTP requests", s.http_requests_total);
        metric(
            "http_request_latency_avg_us",
            "gauge",
            "Average request latency",
            s.http_request_latency_avg_us,
        );
        metric("users_registered", "counter", "Users registered", s.users_registered);
        metric("tweets_created", "counter", "Tweets created", s.tweets_created);
        metric("tweets_deleted", "counter", "Tweets deleted", s.tweets_deleted);
        metric("likes_created", "counter", "Likes added", s.likes_created);
        metric("likes_removed", "counter", "Likes removed", s.likes_removed);
        metric("retweets_created", "counter", "Retweets created", s.retweets_created);
        metric("retweets_removed", "counter", "Retweets removed", s.retweets_removed);
        metric("follows_created", "counter", "Follow edges created", s.follows_created);
        metric("follows_removed", "counter", "Follow edges removed", s.follows_removed);
        metric(
            "notifications_created",
            "counter",
            "Notifications created",
            s.notifications_created,
        );
        metric(
            "notification_create_failures",
            "counter",
            "Notification inserts that failed",
            s.notification_create_failures,
        );
        metric(
            "notifications_retracted",
            "counter",
            "Notifications retracted",
            s.notifications_retracted,
        );
        metric(
            "notification_retraction_failures",
            "counter",
            "Notification retractions that failed",
            s.notification_retraction_failures,
        );

        output.push_str("# HELP chirp_http_requests_by_status HTTP requests by status\n");
        output.push_str("# TYPE chirp_http_requests_by_status counter\n");
        for (class, value) in [
            ("2xx", s.http_requests_2xx),
            ("4xx", s.http_requests_4xx),
            ("5xx", s.http_requests_5xx),
        ] {
            output.push_str(&format!(
                "chirp_http_requests_by_status{{status=\"{class}\"}} {value}\n"
            ));
        }

        output
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of all metrics at a point in time.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    // HTTP
    pub http_requests_total: u64,
    pub http_requests_2xx: u64,
    pub http_requests_4xx: u64,
    pub http_requests_5xx: u64,
    pub http_request_latency_avg_us: u64,

    // Content
    pub users_registered: u64,
    pub tweets_created: u64,
    pub tweets_deleted: u64,

    // Engagement
    pub likes_created: u64,
    pub likes_removed: u64,
    pub retweets_created: u64,
    pub retweets_removed: u64,
    pub follows_created: u64,
    pub follows_removed: u64,

    // Notifications
    pub notifications_created: u64,
    pub notification_create_failures: u64,
    pub notifications_retracted: u64,
    pub notification_retraction_failures: u64,
}

/// Timer guard for measuring operation duration.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_http_request() {
        let metrics = Metrics::new();

        metrics.record_http_request(200, Duration::from_millis(50));
        metrics.record_http_request(409, Duration::from_millis(10));
        metrics.record_http_request(500, Duration::from_millis(100));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.http_requests_total, 3);
        assert_eq!(snapshot.http_requests_2xx, 1);
        assert_eq!(snapshot.http_requests_4xx, 1);
        assert_eq!(snapshot.http_requests_5xx, 1);
        assert_eq!(snapshot.http_request_latency_avg_us, 53_333);
    }

    #[test]
    fn test_incr() {
        let metrics = Metrics::new();
        Metrics::incr(&metrics.likes_created);
        Metrics::incr(&metrics.likes_created);
        Metrics::incr(&metrics.notification_retraction_failures);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.likes_created, 2);
        assert_eq!(snapshot.notification_retraction_failures, 1);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        Metrics::incr(&metrics.tweets_created);
        metrics.record_http_request(201, Duration::from_millis(1));

        let output = metrics.to_prometheus();
        assert!(output.contains("# TYPE chirp_tweets_created counter"));
        assert!(output.contains("chirp_tweets_created 1\n"));
        assert!(output.contains("chirp_http_requests_by_status{status=\"2xx\"} 1\n"));
    }
}
