// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{BlogSource, RawPost};
use metrics::{counter, describe_counter, describe_gauge};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_posts_total", "Total posts parsed from blog endpoints.");
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_counter!(
            "detect_unseen_total",
            "Posts classified as never seen before."
        );
        describe_counter!(
            "detect_changed_total",
            "Posts whose trending flag flipped since last seen."
        );
        describe_counter!("notify_sent_total", "Notifications delivered to Discord.");
        describe_counter!("notify_errors_total", "Notification delivery failures.");
        describe_gauge!("poll_last_run_ts", "Unix ts when the poll cycle last ran.");
    });
}

/// Fetch results for one source, in declaration order.
#[derive(Debug)]
pub struct SourceBatch {
    pub source: String,
    pub category: String,
    pub posts: Vec<RawPost>,
}

/// Fan out all sources concurrently, then collect in declaration order.
/// A failed source yields an empty batch; the cycle must go on.
pub async fn fetch_all(sources: &[Arc<dyn BlogSource>]) -> Vec<SourceBatch> {
    ensure_metrics_described();

    let mut handles = Vec::with_capacity(sources.len());
    for s in sources {
        let name = s.name().to_string();
        let category = s.category().to_string();
        let s = Arc::clone(s);
        let handle = tokio::spawn(async move { s.fetch_latest().await });
        handles.push((name, category, handle));
    }

    let mut out = Vec::with_capacity(handles.len());
    for (source, category, handle) in handles {
        let posts = match handle.await {
            Ok(Ok(posts)) => {
                tracing::debug!(source = %source, count = posts.len(), "fetched posts");
                posts
            }
            Ok(Err(e)) => {
                tracing::warn!(error = ?e, source = %source, "provider error");
                counter!("ingest_provider_errors_total").increment(1);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = %source, "provider task panicked");
                counter!("ingest_provider_errors_total").increment(1);
                Vec::new()
            }
        };
        out.push(SourceBatch {
            source,
            category,
            posts,
        });
    }
    out
}
