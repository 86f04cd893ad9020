//! Blog Monitor — Binary Entrypoint
//! Loads configuration, wires the Discord notifier and blog providers, and
//! hands control to the polling scheduler.

use std::sync::Arc;
use std::time::Duration;

use blog_monitor::ingest::providers::blog_api::BlogApiProvider;
use blog_monitor::ingest::types::BlogSource;
use blog_monitor::notify::discord::DiscordNotifier;
use blog_monitor::{MonitorConfig, Scheduler, SchedulerCfg, SeenStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("blog_monitor=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Expose Prometheus metrics when METRICS_ADDR is set (e.g. 0.0.0.0:9184).
fn install_metrics_exporter() {
    let Ok(addr) = std::env::var("METRICS_ADDR") else {
        return;
    };
    match addr.parse::<std::net::SocketAddr>() {
        Ok(sock) => {
            if let Err(e) = metrics_exporter_prometheus::PrometheusBuilder::new()
                .with_http_listener(sock)
                .install()
            {
                tracing::warn!(error = ?e, "failed to install metrics exporter");
            }
        }
        Err(e) => tracing::warn!(error = ?e, addr = %addr, "METRICS_ADDR is not a socket address"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = MonitorConfig::load_default()?;
    tracing::info!(
        sources = cfg.sources.len(),
        interval_secs = cfg.poll_interval_secs,
        "starting blog monitor"
    );

    install_metrics_exporter();

    let notifier = DiscordNotifier::new(cfg.webhook_url.clone())
        .with_timeout(cfg.request_timeout_secs);

    // Confirm the destination is reachable before entering the loop. A
    // failed probe is logged, not fatal: the webhook may come up later.
    match notifier.probe().await {
        Ok(()) => tracing::info!("notification channel ready"),
        Err(e) => tracing::warn!(error = ?e, "webhook probe failed"),
    }

    let store = SeenStore::load(&cfg.state_path).await;
    tracing::info!(entries = store.len(), "seen-state loaded");

    let sources: Vec<Arc<dyn BlogSource>> = cfg
        .sources
        .iter()
        .map(|s| {
            Arc::new(BlogApiProvider::from_url(
                s.name.clone(),
                s.category.clone(),
                s.url.clone(),
                cfg.request_timeout_secs,
            )) as Arc<dyn BlogSource>
        })
        .collect();

    let scheduler = Scheduler::new(
        SchedulerCfg {
            poll_interval: Duration::from_secs(cfg.poll_interval_secs),
            message_delay: Duration::from_secs(cfg.message_delay_secs),
        },
        sources,
        Arc::new(notifier),
        cfg.roles.clone(),
        store,
    );

    scheduler.run().await;
    Ok(())
}
