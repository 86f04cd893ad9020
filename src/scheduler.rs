// src/scheduler.rs
//! Drives the poll cycle: concurrent fetch, in-order change detection,
//! delay-paced delivery, lazy state flush. The outer loop is the only
//! long-lived unit in the process and must survive every failure below it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::time::{self, MissedTickBehavior};

use crate::change_detector::{self, Classification};
use crate::ingest::{self, types::BlogSource};
use crate::normalize;
use crate::notify::{self, NotificationEvent, Notifier};
use crate::state::SeenStore;

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub poll_interval: Duration,
    pub message_delay: Duration,
}

/// Outcome of one cycle, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub changed: usize,
    pub sent: usize,
    pub send_errors: usize,
}

pub struct Scheduler {
    cfg: SchedulerCfg,
    sources: Vec<Arc<dyn BlogSource>>,
    notifier: Arc<dyn Notifier>,
    roles: HashMap<String, u64>,
    store: SeenStore,
}

impl Scheduler {
    pub fn new(
        cfg: SchedulerCfg,
        sources: Vec<Arc<dyn BlogSource>>,
        notifier: Arc<dyn Notifier>,
        roles: HashMap<String, u64>,
        store: SeenStore,
    ) -> Self {
        Self {
            cfg,
            sources,
            notifier,
            roles,
            store,
        }
    }

    /// Run forever. Ticks are paced cycle-start to cycle-start; an
    /// overrunning cycle delays the next tick, it is never skipped or
    /// stacked.
    pub async fn run(mut self) {
        let mut ticker = time::interval(self.cfg.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let report = self.run_cycle().await;
            if report.changed == 0 {
                tracing::info!("no new posts found");
            } else {
                tracing::info!(
                    changed = report.changed,
                    sent = report.sent,
                    send_errors = report.send_errors,
                    "cycle delivered updates"
                );
            }
        }
    }

    /// One fetch -> detect -> deliver -> persist pass.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let mut pending: Vec<NotificationEvent> = Vec::new();

        let batches = ingest::fetch_all(&self.sources).await;

        for batch in &batches {
            report.fetched += batch.posts.len();
            for post in &batch.posts {
                // no identity -> not trackable, skipped without noise
                let Some(canonical) = normalize::canonicalize(post, &batch.category) else {
                    continue;
                };
                match change_detector::observe(&mut self.store, &canonical.identity, post.trending)
                {
                    Classification::Unchanged => {}
                    Classification::Unseen => {
                        tracing::debug!(id = %canonical.identity, source = %batch.source, "new post");
                        counter!("detect_unseen_total").increment(1);
                        pending.push(notify::compose(&canonical));
                    }
                    Classification::Changed => {
                        tracing::debug!(id = %canonical.identity, source = %batch.source, "trending flip");
                        counter!("detect_changed_total").increment(1);
                        pending.push(notify::compose(&canonical));
                    }
                }
            }
        }

        report.changed = pending.len();

        for (idx, ev) in pending.iter().enumerate() {
            // exactly one mention per cycle, on the first message
            let mention = if idx == 0 {
                self.roles.get(&ev.category).copied()
            } else {
                None
            };
            match self.notifier.send(ev, mention).await {
                Ok(()) => {
                    report.sent += 1;
                    counter!("notify_sent_total").increment(1);
                }
                Err(e) => {
                    report.send_errors += 1;
                    counter!("notify_errors_total").increment(1);
                    tracing::warn!(error = ?e, title = %ev.title, "failed to send notification");
                }
            }
            // pace every send, including the last
            time::sleep(self.cfg.message_delay).await;
        }

        if self.store.is_dirty() {
            if let Err(e) = self.store.save().await {
                tracing::warn!(error = ?e, "failed to persist seen-state");
            }
        }

        gauge!("poll_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        report
    }

    pub fn store(&self) -> &SeenStore {
        &self.store
    }
}
