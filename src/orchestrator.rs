use chrono::Utc;
use std::time::Duration;
use tokio::signal;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::collector::CollectItems;
use crate::composer::ComposeDigest;
use crate::config::Config;
use crate::notifier::{escape_markdown_v2, Notify};
use crate::schedule::DailySchedule;

/// How often the recurring loop consults the schedule.
pub const SCHEDULE_POLL_SECS: u64 = 30;

/// Outcome of a single pipeline run. Distinguishes the degenerate
/// zero-item run from actual failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Sent,
    NoItems,
    CompositionFailed,
    DeliveryFailed,
}

impl RunOutcome {
    pub fn message_sent(self) -> bool {
        self == RunOutcome::Sent
    }

    /// Zero items is a valid (if degenerate) outcome, not a failure.
    pub fn is_failure(self) -> bool {
        matches!(self, RunOutcome::CompositionFailed | RunOutcome::DeliveryFailed)
    }
}

/// Drives collect, compose and notify in sequence, once per run.
pub struct Orchestrator<C, D, N> {
    collector: C,
    composer: D,
    notifier: N,
}

impl<C, D, N> Orchestrator<C, D, N>
where
    C: CollectItems,
    D: ComposeDigest,
    N: Notify,
{
    pub fn new(collector: C, composer: D, notifier: N) -> Self {
        Self { collector, composer, notifier }
    }

    pub async fn run_once(&self) -> RunOutcome {
        info!("Starting digest run");

        let items = self.collector.collect().await;
        if items.is_empty() {
            info!("No items found; skipping digest generation");
            return RunOutcome::NoItems;
        }

        let digest = match self.composer.compose(&items).await {
            Ok(text) => text,
            Err(e) => {
                error!("Digest generation failed: {}", e);
                return RunOutcome::CompositionFailed;
            }
        };

        match self.notifier.notify(&digest).await {
            Ok(()) => {
                info!("Digest run completed");
                RunOutcome::Sent
            }
            Err(e) => {
                error!("Digest delivery failed: {}", e);
                RunOutcome::DeliveryFailed
            }
        }
    }

    /// Recurring mode: announce startup, then poll the daily schedule until
    /// an interrupt arrives. Failed runs are logged and left for the next
    /// scheduled attempt.
    pub async fn run_scheduled(&self, config: &Config) {
        let startup = format!(
            "Bot online. Daily digest scheduled for {} UTC.",
            config.digest_time.format("%H:%M")
        );
        if let Err(e) = self.notifier.notify(&escape_markdown_v2(&startup)).await {
            warn!("Startup notification failed: {}", e);
        }

        let mut schedule = DailySchedule::new(config.digest_time, Utc::now());
        let mut poll = interval(Duration::from_secs(SCHEDULE_POLL_SECS));
        info!("Scheduling loop started (digest at {} UTC)", config.digest_time.format("%H:%M"));

        loop {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("Interrupt received; shutting down");
                    break;
                }
                _ = poll.tick() => {
                    if schedule.due(Utc::now()) {
                        self.run_once().await;
                    }
                }
            }
        }
    }
}
