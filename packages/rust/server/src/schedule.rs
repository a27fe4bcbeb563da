//! Periodic regeneration of every language.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{info, warn};

use llmstxt_core::{GenerationReport, Generator, SilentProgress};

/// Regenerate all languages every `period`, first run one period from now.
pub fn spawn_scheduler(generator: Arc<Generator>, period: Duration) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), "regeneration scheduled");

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let _ = regenerate(Arc::clone(&generator)).await;
        }
    })
}

/// Run one full generation pass off the async runtime.
///
/// Returns `None` when the blocking task itself did not complete.
pub async fn regenerate(generator: Arc<Generator>) -> Option<GenerationReport> {
    match tokio::task::spawn_blocking(move || generator.generate_all(&SilentProgress)).await {
        Ok(report) => {
            if report.is_success() {
                info!(languages = report.outcomes.len(), "scheduled regeneration finished");
            } else {
                warn!(failed = ?report.failed(), "{}", report.message());
            }
            Some(report)
        }
        Err(e) => {
            warn!(error = %e, "scheduled regeneration task failed");
            None
        }
    }
}
