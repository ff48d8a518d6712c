//! Background removal of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use fgw_admin::inbound::http::session_manager::SessionManager;

/// Handle to the running sweep task.
pub struct Sweeper {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Sweeper {
    /// Start sweeping `sessions` every `period`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(sessions: Arc<SessionManager>, period: Duration) -> Self {
        let (stop, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticks = interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it.
            ticks.tick().await;
            loop {
                tokio::select! {
                    _ = ticks.tick() => {
                        let removed = sessions.cleanup_expired();
                        if removed > 0 {
                            info!(removed, remaining = sessions.len(), "expired sessions removed");
                        } else {
                            debug!(remaining = sessions.len(), "session sweep found nothing");
                        }
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("session sweeper stopped");
        });
        Self { stop, task }
    }

    /// Signal the task and wait for it to finish.
    pub async fn stop(self) {
        if self.stop.send(true).is_err() {
            debug!("session sweeper already gone");
        }
        if let Err(error) = self.task.await {
            warn!(%error, "session sweeper ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fgw_admin::domain::PerformerId;
    use mockable::Clock;
    use rstest::rstest;
    use std::sync::Mutex;

    struct StepClock(Mutex<chrono::DateTime<Utc>>);

    impl Clock for StepClock {
        fn local(&self) -> chrono::DateTime<chrono::Local> {
            self.utc().with_timezone(&chrono::Local)
        }

        fn utc(&self) -> chrono::DateTime<Utc> {
            *self.0.lock().expect("clock lock")
        }
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn sweeps_idle_sessions_on_each_tick() {
        let clock = Arc::new(StepClock(Mutex::new(Utc::now())));
        let sessions = Arc::new(SessionManager::new(clock.clone()));
        sessions.create(PerformerId::new(1042));
        *clock.0.lock().expect("clock lock") += chrono::TimeDelta::minutes(31);

        let sweeper = Sweeper::spawn(Arc::clone(&sessions), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert!(sessions.is_empty());
        sweeper.stop().await;
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_task() {
        let sessions = Arc::new(SessionManager::new(Arc::new(mockable::DefaultClock)));
        let sweeper = Sweeper::spawn(sessions, Duration::from_secs(300));
        tokio::time::timeout(Duration::from_secs(1), sweeper.stop())
            .await
            .expect("sweeper stops promptly");
    }
}
