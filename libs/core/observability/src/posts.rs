//! Domain metrics for blog posts and events.

use metrics::counter;

/// Counters for post lifecycle operations. `kind` is the post discriminator
/// (`blog` or `event`).
pub struct PostMetrics;

impl PostMetrics {
    pub fn record_created(kind: &str) {
        counter!("posts_created_total", "type" => kind.to_string()).increment(1);
    }

    pub fn record_updated(kind: &str) {
        counter!("posts_updated_total", "type" => kind.to_string()).increment(1);
    }

    /// `mode` is `single` or `author`.
    pub fn record_deleted(mode: &'static str, count: u64) {
        counter!("posts_deleted_total", "mode" => mode).increment(count);
    }

    pub fn record_listed(kind: &str, scope: &str, returned: usize) {
        counter!(
            "post_queries_total",
            "type" => kind.to_string(),
            "scope" => scope.to_string()
        )
        .increment(1);

        tracing::debug!(kind, scope, returned, "Listed posts");
    }
}
